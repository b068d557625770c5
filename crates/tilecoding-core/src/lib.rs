//! Tile coding feature encoder
//!
//! This crate converts continuous feature vectors into sparse tile indices
//! for linear value-function approximation. It provides:
//! - a memoizing, capacity-bounded Index Hash Table
//! - hashed tile coding with interleaved asymmetric offsets
//! - explicit grid tilings with per-tiling offsets

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

pub mod config;
pub mod error;
pub mod hash_table;
pub mod tiles;
pub mod tiling;

// Re-export core traits and types
pub use config::TileCoderConfig;
pub use error::{Result, TileCodingError};
pub use hash_table::{IndexHashTable, ModuloHasher, OverflowPolicy, TileIndexer, TileKey};
pub use tiles::{tile_keys, tiles, tiles_read_only, tiles_wrap, TileCoder};
pub use tiling::{tiling_boundaries, FeatureRange, Tiling, Tilings};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        tiles, FeatureRange, IndexHashTable, OverflowPolicy, Result, TileCoder,
        TileCoderConfig, TileCodingError, TileIndexer, Tilings,
    };
}
