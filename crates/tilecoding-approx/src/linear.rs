//! Linear action-value function over hashed tiles
//!
//! `Q(s, a)` is the sum of the weights of the active tiles of `(s, a)`. The
//! step size is divided by the number of tilings once, at construction, so an
//! update moves every active weight by the same per-tile amount.

use ndarray::Array1;
use tilecoding_core::{IndexHashTable, Result, TileCoder, TileCoderConfig, TileCodingError};
use tracing::debug;

use crate::value::{ActionValueFunction, DiscreteAction};

/// Tile-coded linear Q function backed by an index hash table
#[derive(Debug, Clone)]
pub struct TileCodedQFunction {
    coder: TileCoder<IndexHashTable>,
    weights: Array1<f64>,
    step_size: f64,
    scales: Vec<f64>,
}

impl TileCodedQFunction {
    /// Create a zero-initialized Q function over `dims` features
    pub fn new(config: &TileCoderConfig, dims: usize) -> Result<Self> {
        config.validate()?;

        let scales = config.scales();
        if !scales.is_empty() && scales.len() != dims {
            return Err(TileCodingError::DimensionMismatch {
                expected: dims,
                actual: scales.len(),
            });
        }

        let table = IndexHashTable::with_policy(config.max_size, config.overflow)?;
        debug!(
            num_tilings = config.num_tilings,
            max_size = config.max_size,
            dims,
            "creating tile-coded Q function"
        );

        Ok(Self {
            coder: TileCoder::new(config.num_tilings, dims, table)?,
            weights: Array1::zeros(config.max_size),
            step_size: config.per_tile_step_size(),
            scales,
        })
    }

    /// Number of tilings
    #[must_use]
    pub fn num_tilings(&self) -> usize {
        self.coder.num_tilings()
    }

    /// Step size applied to each active tile
    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Weight vector
    #[must_use]
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub(crate) fn weights_mut(&mut self) -> &mut Array1<f64> {
        &mut self.weights
    }

    /// Index hash table
    #[must_use]
    pub fn table(&self) -> &IndexHashTable {
        self.coder.indexer()
    }

    fn scaled(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.coder.dims() {
            return Err(TileCodingError::DimensionMismatch {
                expected: self.coder.dims(),
                actual: features.len(),
            });
        }
        if self.scales.is_empty() {
            return Ok(features.to_vec());
        }
        Ok(features.iter().zip(&self.scales).map(|(x, s)| x * s).collect())
    }

    /// Indices of the active tiles of `(features, action)`, allocating them
    pub fn active_tiles(&mut self, features: &[f64], action: DiscreteAction) -> Result<Vec<usize>> {
        let scaled = self.scaled(features)?;
        self.coder.encode(&scaled, &[action.tag()])
    }

    /// Sum of the active weights. Tiles never seen contribute nothing.
    pub fn value(&self, features: &[f64], action: DiscreteAction) -> Result<f64> {
        let scaled = self.scaled(features)?;
        Ok(self
            .coder
            .encode_read_only(&scaled, &[action.tag()])?
            .into_iter()
            .flatten()
            .map(|i| self.weights[i])
            .sum())
    }

    /// Add `step_size * delta` to every active weight
    pub fn update(&mut self, features: &[f64], action: DiscreteAction, delta: f64) -> Result<()> {
        let step = self.step_size * delta;
        for i in self.active_tiles(features, action)? {
            self.weights[i] += step;
        }
        Ok(())
    }

    /// Highest value over `actions`
    pub fn max_value(&self, features: &[f64], actions: &[DiscreteAction]) -> Result<f64> {
        self.best_action_value(features, actions).map(|(_, v)| v)
    }

    /// Negated highest value, i.e. the expected number of steps left when
    /// every step costs one
    pub fn cost_to_go(&self, features: &[f64], actions: &[DiscreteAction]) -> Result<f64> {
        self.max_value(features, actions).map(|v| -v)
    }
}

impl ActionValueFunction for TileCodedQFunction {
    fn q_value(&self, features: &[f64], action: DiscreteAction) -> Result<f64> {
        self.value(features, action)
    }

    fn learn(&mut self, features: &[f64], action: DiscreteAction, target: f64) -> Result<()> {
        let estimate = self.value(features, action)?;
        self.update(features, action, target - estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tilecoding_core::{FeatureRange, OverflowPolicy};

    const ACTIONS: [DiscreteAction; 3] = [DiscreteAction(-1), DiscreteAction(0), DiscreteAction(1)];

    fn mountain_car(step_size: f64) -> TileCodedQFunction {
        let config = TileCoderConfig {
            step_size,
            bounds: Some(vec![
                FeatureRange::new(-1.2, 0.5).unwrap(),
                FeatureRange::new(-0.07, 0.07).unwrap(),
            ]),
            ..TileCoderConfig::default()
        };
        TileCodedQFunction::new(&config, 2).unwrap()
    }

    #[test]
    fn test_starts_at_zero() {
        let q = mountain_car(0.3);
        assert_relative_eq!(q.value(&[-0.5, 0.0], ACTIONS[0]).unwrap(), 0.0);
        assert_eq!(q.weights().len(), 2048);
        assert_relative_eq!(q.step_size(), 0.3 / 8.0);
    }

    #[test]
    fn test_update_adds_step_to_each_tile() {
        let mut q = mountain_car(0.8);
        q.update(&[-0.5, 0.01], ACTIONS[2], 1.0).unwrap();

        // 8 tiles, each moved by 0.8 / 8
        assert_relative_eq!(q.value(&[-0.5, 0.01], ACTIONS[2]).unwrap(), 0.8, epsilon = 1e-12);
        assert_relative_eq!(q.weights().sum(), 0.8, epsilon = 1e-12);
        assert_eq!(q.table().count(), 8);
    }

    #[test]
    fn test_learn_unit_step_reaches_target() {
        let mut q = mountain_car(1.0);
        q.learn(&[-0.3, 0.02], ACTIONS[1], -5.0).unwrap();
        assert_relative_eq!(q.q_value(&[-0.3, 0.02], ACTIONS[1]).unwrap(), -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_generalizes_within_action_only() {
        let mut q = mountain_car(0.5);
        q.learn(&[-0.5, 0.0], ACTIONS[2], 10.0).unwrap();

        let near = q.value(&[-0.49, 0.0], ACTIONS[2]).unwrap();
        assert!(near > 0.0);
        assert_relative_eq!(q.value(&[-0.49, 0.0], ACTIONS[0]).unwrap(), 0.0);
        assert_relative_eq!(q.value(&[0.4, 0.06], ACTIONS[2]).unwrap(), 0.0);
    }

    #[test]
    fn test_value_is_read_only() {
        let q = mountain_car(0.3);
        q.value(&[0.1, 0.01], ACTIONS[1]).unwrap();
        assert_eq!(q.table().count(), 0);
    }

    #[test]
    fn test_cost_to_go() {
        let mut q = mountain_car(1.0);
        let state = [-0.6, 0.001];
        q.learn(&state, ACTIONS[0], -40.0).unwrap();
        q.learn(&state, ACTIONS[1], -25.0).unwrap();
        q.learn(&state, ACTIONS[2], -30.0).unwrap();

        assert_relative_eq!(q.max_value(&state, &ACTIONS).unwrap(), -25.0, epsilon = 1e-9);
        assert_relative_eq!(q.cost_to_go(&state, &ACTIONS).unwrap(), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_differential_update_with_raw_features() {
        // Server-access style: features pre-scaled by the caller
        let config = TileCoderConfig {
            step_size: 0.01,
            ..TileCoderConfig::default()
        };
        let mut q = TileCodedQFunction::new(&config, 2).unwrap();
        let state = [10.0 * 0.8, 2.0 * 8.0 / 3.0];

        q.update(&state, DiscreteAction(1), 4.0).unwrap();
        assert_relative_eq!(q.value(&state, DiscreteAction(1)).unwrap(), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_dimension_checks() {
        let config = TileCoderConfig {
            bounds: Some(vec![FeatureRange::new(0.0, 1.0).unwrap()]),
            ..TileCoderConfig::default()
        };
        assert!(matches!(
            TileCodedQFunction::new(&config, 2),
            Err(TileCodingError::DimensionMismatch { expected: 2, actual: 1 })
        ));

        let q = mountain_car(0.3);
        assert!(matches!(
            q.value(&[0.0], ACTIONS[0]),
            Err(TileCodingError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_strict_table_capacity() {
        let config = TileCoderConfig {
            num_tilings: 4,
            max_size: 4,
            overflow: OverflowPolicy::Strict,
            ..TileCoderConfig::default()
        };
        let mut q = TileCodedQFunction::new(&config, 1).unwrap();
        q.update(&[0.0], DiscreteAction(0), 1.0).unwrap();

        let err = q.update(&[0.0], DiscreteAction(1), 1.0).unwrap_err();
        assert!(matches!(err, TileCodingError::CapacityExceeded { capacity: 4 }));
    }

    #[test]
    fn test_collide_table_keeps_learning_when_full() {
        let config = TileCoderConfig {
            num_tilings: 4,
            max_size: 4,
            step_size: 1.0,
            ..TileCoderConfig::default()
        };
        let mut q = TileCodedQFunction::new(&config, 1).unwrap();
        q.learn(&[0.0], DiscreteAction(0), 1.0).unwrap();
        assert!(q.table().is_full());

        // Every slot holds 0.25, so the unseen action reads through collisions
        let before = q.value(&[0.0], DiscreteAction(1)).unwrap();
        assert_relative_eq!(before, 1.0, epsilon = 1e-12);

        q.learn(&[0.0], DiscreteAction(1), 2.0).unwrap();
        assert!(q.table().overfull_count() > 0);
        assert!(q.value(&[0.0], DiscreteAction(1)).unwrap() > before);
    }
}
