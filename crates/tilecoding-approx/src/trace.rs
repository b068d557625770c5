//! Sarsa(λ) over hashed tiles
//!
//! A [`TracedQFunction`] keeps one eligibility value per weight. Every learning
//! step decays the whole trace by `gamma * lambda`, marks the active tiles and
//! moves all weights by `step * delta * z`, so earlier visits share the credit
//! of the current TD error.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tilecoding_core::{Result, TileCoderConfig, TileCodingError};
use tracing::debug;

use crate::linear::TileCodedQFunction;
use crate::value::{ActionValueFunction, DiscreteAction};

/// How active tiles are marked in the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    /// Add one to the decayed trace of every active tile
    Accumulating,
    /// Reset the trace of every active tile to one
    #[default]
    Replacing,
}

/// Trace-decay parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Trace-decay rate λ
    pub lambda: f64,
    /// Discount factor
    pub gamma: f64,
    /// Marking rule for active tiles
    pub mode: TraceMode,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            lambda: 0.9,
            gamma: 1.0,
            mode: TraceMode::Replacing,
        }
    }
}

impl TraceConfig {
    /// Check that both rates lie in `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("lambda", self.lambda), ("gamma", self.gamma)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TileCodingError::InvalidParameter(format!(
                    "{name} {value} must lie in [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// Factor applied to the whole trace once per step
    #[must_use]
    pub fn decay(&self) -> f64 {
        self.gamma * self.lambda
    }
}

/// Tile-coded Q function with an eligibility trace
#[derive(Debug, Clone)]
pub struct TracedQFunction {
    q: TileCodedQFunction,
    trace: Array1<f64>,
    params: TraceConfig,
}

impl TracedQFunction {
    /// Create a zero-initialized function with an empty trace
    pub fn new(config: &TileCoderConfig, dims: usize, params: TraceConfig) -> Result<Self> {
        params.validate()?;
        let q = TileCodedQFunction::new(config, dims)?;
        debug!(
            lambda = params.lambda,
            gamma = params.gamma,
            mode = ?params.mode,
            "creating traced Q function"
        );

        Ok(Self {
            trace: Array1::zeros(q.weights().len()),
            q,
            params,
        })
    }

    /// Underlying linear function
    #[must_use]
    pub fn linear(&self) -> &TileCodedQFunction {
        &self.q
    }

    /// Eligibility trace, one entry per weight
    #[must_use]
    pub fn trace(&self) -> &Array1<f64> {
        &self.trace
    }

    /// Trace parameters
    #[must_use]
    pub fn params(&self) -> TraceConfig {
        self.params
    }

    /// Clear the trace; call at the start of every episode
    pub fn reset_trace(&mut self) {
        self.trace.fill(0.0);
    }

    fn mark(&mut self, active: &[usize]) {
        let decay = self.params.decay();
        self.trace.mapv_inplace(|z| z * decay);
        for &i in active {
            match self.params.mode {
                TraceMode::Accumulating => self.trace[i] += 1.0,
                TraceMode::Replacing => self.trace[i] = 1.0,
            }
        }
    }
}

impl ActionValueFunction for TracedQFunction {
    fn q_value(&self, features: &[f64], action: DiscreteAction) -> Result<f64> {
        self.q.value(features, action)
    }

    fn learn(&mut self, features: &[f64], action: DiscreteAction, target: f64) -> Result<()> {
        let active = self.q.active_tiles(features, action)?;
        self.mark(&active);

        let estimate: f64 = active.iter().map(|&i| self.q.weights()[i]).sum();
        let step = self.q.step_size() * (target - estimate);
        self.q.weights_mut().scaled_add(step, &self.trace);
        Ok(())
    }
}
