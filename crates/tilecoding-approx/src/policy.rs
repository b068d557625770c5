//! Action selection over learned action values

use rand::Rng;
use tilecoding_core::{Result, TileCodingError};

use crate::value::{ActionValueFunction, DiscreteAction};

/// Epsilon-greedy action selection with random tie-breaking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Create a selector; `epsilon` is clamped to `[0, 1]`
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.clamp(0.0, 1.0),
        }
    }

    /// Exploration rate
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Set the exploration rate
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    /// Explore with probability epsilon, otherwise act greedily
    pub fn select<Q, R>(
        &self,
        q: &Q,
        features: &[f64],
        actions: &[DiscreteAction],
        rng: &mut R,
    ) -> Result<DiscreteAction>
    where
        Q: ActionValueFunction + ?Sized,
        R: Rng,
    {
        if actions.is_empty() {
            return Err(TileCodingError::InvalidAction("empty action set".to_string()));
        }

        if rng.gen::<f64>() < self.epsilon {
            Ok(actions[rng.gen_range(0..actions.len())])
        } else {
            greedy(q, features, actions, rng)
        }
    }
}

/// One of the highest-valued actions, ties broken uniformly at random
pub fn greedy<Q, R>(
    q: &Q,
    features: &[f64],
    actions: &[DiscreteAction],
    rng: &mut R,
) -> Result<DiscreteAction>
where
    Q: ActionValueFunction + ?Sized,
    R: Rng,
{
    let values = q.all_q_values(features, actions)?;
    let best = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let candidates: Vec<DiscreteAction> = actions
        .iter()
        .zip(&values)
        .filter(|(_, &v)| v == best)
        .map(|(&a, _)| a)
        .collect();

    if candidates.is_empty() {
        return Err(TileCodingError::InvalidAction(
            "no action has a comparable value".to_string(),
        ));
    }
    Ok(candidates[rng.gen_range(0..candidates.len())])
}
