//! Configuration for tile-coded value functions

use serde::{Deserialize, Serialize};

use crate::hash_table::OverflowPolicy;
use crate::tiling::FeatureRange;
use crate::{Result, TileCodingError};

/// Configuration shared by tile-coded approximators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileCoderConfig {
    /// Number of tilings
    pub num_tilings: usize,
    /// Size of the index space and of the weight vector
    pub max_size: usize,
    /// Step size before it is split across the tilings
    pub step_size: f64,
    /// Behaviour of a full index hash table
    pub overflow: OverflowPolicy,
    /// Feature bounds used to scale raw features into tile units
    pub bounds: Option<Vec<FeatureRange>>,
}

impl Default for TileCoderConfig {
    fn default() -> Self {
        Self {
            num_tilings: 8,
            max_size: 2048,
            step_size: 0.3,
            overflow: OverflowPolicy::Collide,
            bounds: None,
        }
    }
}

impl TileCoderConfig {
    /// Parse a JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field
    pub fn validate(&self) -> Result<()> {
        if self.num_tilings == 0 {
            return Err(TileCodingError::InvalidParameter(
                "num_tilings must be positive".to_string(),
            ));
        }
        if self.max_size == 0 {
            return Err(TileCodingError::InvalidParameter(
                "max_size must be positive".to_string(),
            ));
        }
        if !self.step_size.is_finite() || self.step_size < 0.0 {
            return Err(TileCodingError::InvalidParameter(format!(
                "step_size {} must be finite and non-negative",
                self.step_size
            )));
        }
        if let Some(bounds) = &self.bounds {
            for range in bounds {
                range.validate()?;
            }
        }
        Ok(())
    }

    /// Step size applied to each active tile
    #[must_use]
    pub fn per_tile_step_size(&self) -> f64 {
        self.step_size / self.num_tilings as f64
    }

    /// Per-dimension feature scales, empty when no bounds are configured
    #[must_use]
    pub fn scales(&self) -> Vec<f64> {
        self.bounds
            .iter()
            .flatten()
            .map(|range| range.scale(self.num_tilings))
            .collect()
    }
}
