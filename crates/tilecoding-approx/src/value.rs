//! Value functions over tile-coded features

use serde::{Deserialize, Serialize};
use tilecoding_core::{Result, TileCodingError};

/// Discrete action, folded into tile keys as an integer tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscreteAction(pub i64);

impl DiscreteAction {
    /// Integer tag used in tile keys
    #[must_use]
    pub fn tag(self) -> i64 {
        self.0
    }
}

impl From<i64> for DiscreteAction {
    fn from(tag: i64) -> Self {
        Self(tag)
    }
}

/// Action value function Q(s, a) over continuous features
pub trait ActionValueFunction {
    /// Estimate the value of taking `action` in the state described by `features`
    fn q_value(&self, features: &[f64], action: DiscreteAction) -> Result<f64>;

    /// Move the estimate for `(features, action)` toward `target`
    fn learn(&mut self, features: &[f64], action: DiscreteAction, target: f64) -> Result<()>;

    /// Q-values for every action in `actions`, in order
    fn all_q_values(&self, features: &[f64], actions: &[DiscreteAction]) -> Result<Vec<f64>> {
        actions
            .iter()
            .map(|&action| self.q_value(features, action))
            .collect()
    }

    /// First action with the highest value, and that value
    fn best_action_value(
        &self,
        features: &[f64],
        actions: &[DiscreteAction],
    ) -> Result<(DiscreteAction, f64)> {
        let values = self.all_q_values(features, actions)?;

        actions
            .iter()
            .copied()
            .zip(values)
            .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })
            .ok_or_else(|| TileCodingError::InvalidAction("empty action set".to_string()))
    }
}
