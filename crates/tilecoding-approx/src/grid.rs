//! Averaged action-value function over explicit grid tilings
//!
//! Every tiling owns a dense table indexed by its bucket coordinates plus the
//! action. The estimate is the mean of the per-tiling entries, and each entry
//! is learned toward the target independently.

use ndarray::{ArrayD, IxDyn};
use tilecoding_core::{Result, TileCodingError, Tilings};
use tracing::debug;

use crate::value::{ActionValueFunction, DiscreteAction};

/// Q function with one table per grid tiling
#[derive(Debug, Clone)]
pub struct TilingQFunction {
    tilings: Tilings,
    actions: Vec<DiscreteAction>,
    learning_rate: f64,
    tables: Vec<ArrayD<f64>>,
}

impl TilingQFunction {
    /// Create zero tables for `tilings` and `actions`
    pub fn new(tilings: Tilings, actions: Vec<DiscreteAction>, learning_rate: f64) -> Result<Self> {
        if actions.is_empty() {
            return Err(TileCodingError::InvalidAction("empty action set".to_string()));
        }

        let tables = tilings
            .shapes()
            .into_iter()
            .map(|mut shape| {
                shape.push(actions.len());
                ArrayD::zeros(IxDyn(&shape))
            })
            .collect();
        debug!(
            num_tilings = tilings.num_tilings(),
            actions = actions.len(),
            "creating grid Q function"
        );

        Ok(Self {
            tilings,
            actions,
            learning_rate,
            tables,
        })
    }

    /// Grid tilings
    #[must_use]
    pub fn tilings(&self) -> &Tilings {
        &self.tilings
    }

    /// Action set
    #[must_use]
    pub fn actions(&self) -> &[DiscreteAction] {
        &self.actions
    }

    /// Table of tiling `t`
    #[must_use]
    pub fn table(&self, t: usize) -> Option<&ArrayD<f64>> {
        self.tables.get(t)
    }

    fn action_index(&self, action: DiscreteAction) -> Result<usize> {
        self.actions
            .iter()
            .position(|&a| a == action)
            .ok_or_else(|| TileCodingError::InvalidAction(format!("{action:?} is not in the action set")))
    }

    // One table coordinate per tiling.
    fn cells(&self, features: &[f64], action: DiscreteAction) -> Result<Vec<Vec<usize>>> {
        let action_idx = self.action_index(action)?;
        let mut codings = self.tilings.encode(features)?;
        for coding in &mut codings {
            coding.push(action_idx);
        }
        Ok(codings)
    }

    /// Mean of the per-tiling entries
    pub fn value(&self, features: &[f64], action: DiscreteAction) -> Result<f64> {
        let cells = self.cells(features, action)?;
        let total: f64 = cells
            .iter()
            .zip(&self.tables)
            .map(|(cell, table)| table[cell.as_slice()])
            .sum();
        Ok(total / self.tables.len() as f64)
    }
}

impl ActionValueFunction for TilingQFunction {
    fn q_value(&self, features: &[f64], action: DiscreteAction) -> Result<f64> {
        self.value(features, action)
    }

    fn learn(&mut self, features: &[f64], action: DiscreteAction, target: f64) -> Result<()> {
        let cells = self.cells(features, action)?;
        for (cell, table) in cells.iter().zip(&mut self.tables) {
            let q = &mut table[cell.as_slice()];
            *q += self.learning_rate * (target - *q);
        }
        Ok(())
    }
}
