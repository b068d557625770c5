//! Linear value-function approximation over tile-coded features
//!
//! This crate provides the learners that consume tile indices:
//! - a hashed, summed linear Q function with a bounded weight vector
//! - an averaged Q function over explicit grid tilings
//! - a Sarsa(λ) variant with accumulating or replacing traces
//! - epsilon-greedy action selection
//! - n-step and differential TD helpers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

pub mod grid;
pub mod linear;
pub mod policy;
pub mod returns;
pub mod trace;
pub mod value;

// Re-export approximators
pub use grid::TilingQFunction;
pub use linear::TileCodedQFunction;
pub use policy::{greedy, EpsilonGreedy};
pub use returns::{discounted_returns, n_step_return, DifferentialTd};
pub use trace::{TraceConfig, TraceMode, TracedQFunction};
pub use value::{ActionValueFunction, DiscreteAction};

// Re-export core types
pub use tilecoding_core::{
    FeatureRange, IndexHashTable, OverflowPolicy, Result, TileCoderConfig, TileCodingError,
    Tilings,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ActionValueFunction, DiscreteAction, EpsilonGreedy, TileCodedQFunction, TilingQFunction,
        TraceConfig, TraceMode, TracedQFunction,
    };
    pub use tilecoding_core::prelude::*;
}
