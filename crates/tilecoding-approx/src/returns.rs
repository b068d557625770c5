//! Return and TD-error helpers for learning loops

use tilecoding_core::{Result, TileCodingError};

/// n-step return for the state visited at time `tau`.
///
/// `rewards[i]` is the reward received on arriving at time `i`, so
/// `rewards[0]` is never read. Rewards `tau + 1 ..= min(tau + n, T)` are
/// discounted and summed; when `tau + n < T` the discounted `bootstrap`
/// estimate of the state at `tau + n` is added. `terminal` is `T`, or `None`
/// while the episode is still running.
pub fn n_step_return(
    rewards: &[f64],
    tau: usize,
    n: usize,
    terminal: Option<usize>,
    gamma: f64,
    bootstrap: f64,
) -> Result<f64> {
    let horizon = tau + n;
    let last = terminal.map_or(horizon, |t| horizon.min(t));
    if rewards.len() <= last {
        return Err(TileCodingError::DimensionMismatch {
            expected: last + 1,
            actual: rewards.len(),
        });
    }

    let mut g = 0.0;
    let mut discount = 1.0;
    let start = (tau + 1).min(last + 1);
    for reward in &rewards[start..=last] {
        g += discount * reward;
        discount *= gamma;
    }

    if terminal.map_or(true, |t| horizon < t) {
        g += gamma.powi(n as i32) * bootstrap;
    }
    Ok(g)
}

/// Monte Carlo return of every step of a finished episode.
///
/// `rewards[i]` follows the action taken at step `i`; `terminal_value` is the
/// estimate after the last reward (zero for a true terminal state).
#[must_use]
pub fn discounted_returns(rewards: &[f64], gamma: f64, terminal_value: f64) -> Vec<f64> {
    let mut returns: Vec<f64> = rewards
        .iter()
        .rev()
        .scan(terminal_value, |g, reward| {
            *g = reward + gamma * *g;
            Some(*g)
        })
        .collect();
    returns.reverse();
    returns
}

/// TD error for average-reward (differential) learning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialTd {
    /// Running estimate of the average reward per step
    pub average_reward: f64,
    /// Step size of the average-reward estimate
    pub beta: f64,
}

impl DifferentialTd {
    /// Start from a zero average reward
    #[must_use]
    pub fn new(beta: f64) -> Self {
        Self {
            average_reward: 0.0,
            beta,
        }
    }

    /// `reward - average + next_q - q`; also moves the average by
    /// `beta * delta`
    pub fn error(&mut self, reward: f64, next_q: f64, q: f64) -> f64 {
        let delta = reward - self.average_reward + next_q - q;
        self.average_reward += self.beta * delta;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const REWARDS: [f64; 5] = [-1.0, -1.0, -1.0, -1.0, 0.0];

    #[test]
    fn test_n_step_bootstraps_before_terminal() {
        let g = n_step_return(&REWARDS, 0, 2, None, 1.0, 5.0).unwrap();
        assert_relative_eq!(g, 3.0);

        let g = n_step_return(&REWARDS, 1, 2, Some(4), 0.9, 5.0).unwrap();
        assert_relative_eq!(g, -1.0 - 0.9 + 0.81 * 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_n_step_truncates_at_terminal() {
        let g = n_step_return(&REWARDS, 0, 2, Some(2), 1.0, 100.0).unwrap();
        assert_relative_eq!(g, -2.0);

        let g = n_step_return(&REWARDS, 2, 4, Some(4), 1.0, 100.0).unwrap();
        assert_relative_eq!(g, -1.0);
    }

    #[test]
    fn test_n_step_needs_rewards() {
        assert!(matches!(
            n_step_return(&REWARDS[..2], 0, 3, None, 1.0, 0.0),
            Err(TileCodingError::DimensionMismatch { expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn test_discounted_returns() {
        let returns = discounted_returns(&[1.0, 1.0, 1.0], 0.5, 0.0);
        assert_eq!(returns, vec![1.75, 1.5, 1.0]);
    }

    #[test]
    fn test_differential_td() {
        let mut td = DifferentialTd::new(0.1);
        let delta = td.error(1.0, 2.0, 0.5);
        assert_relative_eq!(delta, 2.5);
        assert_relative_eq!(td.average_reward, 0.25);

        let delta = td.error(0.0, 0.0, 0.0);
        assert_relative_eq!(delta, -0.25);
        assert_relative_eq!(td.average_reward, 0.225, epsilon = 1e-12);
    }
}
