//! Explicit grid tilings
//!
//! Each tiling is a list of interior bin boundaries per dimension. A feature
//! vector is digitized into one bucket per dimension per tiling.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Result, TileCodingError};

/// Closed `[min, max]` interval of one feature dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl FeatureRange {
    /// Create a validated range
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Width of the interval
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Factor that maps this range onto `num_tilings` tile widths
    #[must_use]
    pub fn scale(&self, num_tilings: usize) -> f64 {
        num_tilings as f64 / self.width()
    }

    /// Check that the range is finite and non-empty
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(TileCodingError::InvalidParameter(format!(
                "feature range [{}, {}] must be finite with min < max",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Interior boundaries of `bins` evenly sized buckets over `range`, shifted by
/// `offset`. Both endpoints of the range are left out.
#[must_use]
pub fn tiling_boundaries(range: &FeatureRange, bins: usize, offset: f64) -> Vec<f64> {
    let step = range.width() / bins as f64;
    (1..bins)
        .map(|i| i as f64 * step + range.min + offset)
        .collect()
}

/// One grid tiling: per-dimension boundary arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tiling {
    boundaries: Vec<Vec<f64>>,
}

impl Tiling {
    /// Number of dimensions
    #[must_use]
    pub fn dims(&self) -> usize {
        self.boundaries.len()
    }

    /// Boundaries of dimension `dim`
    #[must_use]
    pub fn boundaries(&self, dim: usize) -> Option<&[f64]> {
        self.boundaries.get(dim).map(Vec::as_slice)
    }

    /// Number of buckets per dimension
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        self.boundaries.iter().map(|b| b.len() + 1).collect()
    }

    // Caller checks the feature length.
    fn digitize(&self, feature: &[f64]) -> Vec<usize> {
        feature
            .iter()
            .zip(&self.boundaries)
            .map(|(&x, bounds)| bounds.partition_point(|&b| b <= x))
            .collect()
    }
}

/// Ordered set of grid tilings over the same feature space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tilings {
    tilings: Vec<Tiling>,
    dims: usize,
}

impl Tilings {
    /// Build `num_tilings` tilings. `bins[t][d]` and `offsets[t][d]` give the
    /// bucket count and shift of dimension `d` in tiling `t`.
    pub fn build(
        ranges: &[FeatureRange],
        num_tilings: usize,
        bins: &[Vec<usize>],
        offsets: &[Vec<f64>],
    ) -> Result<Self> {
        if num_tilings == 0 {
            return Err(TileCodingError::InvalidParameter(
                "at least one tiling is required".to_string(),
            ));
        }
        for rows in [bins.len(), offsets.len()] {
            if rows != num_tilings {
                return Err(TileCodingError::DimensionMismatch {
                    expected: num_tilings,
                    actual: rows,
                });
            }
        }
        for range in ranges {
            range.validate()?;
        }

        let mut tilings = Vec::with_capacity(num_tilings);
        for (tiling_bins, tiling_offsets) in bins.iter().zip(offsets) {
            for cols in [tiling_bins.len(), tiling_offsets.len()] {
                if cols != ranges.len() {
                    return Err(TileCodingError::DimensionMismatch {
                        expected: ranges.len(),
                        actual: cols,
                    });
                }
            }

            let mut boundaries = Vec::with_capacity(ranges.len());
            for ((range, &n), &offset) in ranges.iter().zip(tiling_bins).zip(tiling_offsets) {
                if n == 0 {
                    return Err(TileCodingError::InvalidParameter(
                        "bin count must be positive".to_string(),
                    ));
                }
                boundaries.push(tiling_boundaries(range, n, offset));
            }
            tilings.push(Tiling { boundaries });
        }

        debug!(num_tilings, dims = ranges.len(), "built grid tilings");
        Ok(Self {
            tilings,
            dims: ranges.len(),
        })
    }

    /// Build tilings that share the same bin counts, tiling `t` shifted by
    /// `t / num_tilings` of a bucket width in every dimension
    pub fn uniform(ranges: &[FeatureRange], num_tilings: usize, bins: &[usize]) -> Result<Self> {
        if bins.len() != ranges.len() {
            return Err(TileCodingError::DimensionMismatch {
                expected: ranges.len(),
                actual: bins.len(),
            });
        }
        if bins.contains(&0) {
            return Err(TileCodingError::InvalidParameter(
                "bin count must be positive".to_string(),
            ));
        }

        let all_bins = vec![bins.to_vec(); num_tilings];
        let offsets: Vec<Vec<f64>> = (0..num_tilings)
            .map(|t| {
                ranges
                    .iter()
                    .zip(bins)
                    .map(|(range, &n)| {
                        t as f64 * range.width() / n as f64 / num_tilings as f64
                    })
                    .collect()
            })
            .collect();

        Self::build(ranges, num_tilings, &all_bins, &offsets)
    }

    /// Number of tilings
    #[must_use]
    pub fn num_tilings(&self) -> usize {
        self.tilings.len()
    }

    /// Number of feature dimensions
    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Tiling `t`
    #[must_use]
    pub fn tiling(&self, t: usize) -> Option<&Tiling> {
        self.tilings.get(t)
    }

    /// Iterate over the tilings in order
    pub fn iter(&self) -> impl Iterator<Item = &Tiling> {
        self.tilings.iter()
    }

    /// Bucket counts per dimension, for every tiling
    #[must_use]
    pub fn shapes(&self) -> Vec<Vec<usize>> {
        self.tilings.iter().map(Tiling::shape).collect()
    }

    /// Bucket coordinates of `feature` in every tiling
    pub fn encode(&self, feature: &[f64]) -> Result<Vec<Vec<usize>>> {
        if feature.len() != self.dims {
            return Err(TileCodingError::DimensionMismatch {
                expected: self.dims,
                actual: feature.len(),
            });
        }
        Ok(self.tilings.iter().map(|t| t.digitize(feature)).collect())
    }
}
