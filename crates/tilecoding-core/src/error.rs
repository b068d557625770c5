//! Error types for the tile coding library

use thiserror::Error;

/// Core error type for tile coding operations
#[derive(Error, Debug)]
pub enum TileCodingError {
    /// A strict index hash table has no room for a new tile
    #[error("Capacity exceeded: index hash table holds at most {capacity} tiles")]
    CapacityExceeded { capacity: usize },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid construction or configuration parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid action
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for tile coding operations
pub type Result<T> = std::result::Result<T, TileCodingError>;
