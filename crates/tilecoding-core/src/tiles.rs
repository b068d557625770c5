//! Hashed tile coding with interleaved asymmetric offsets
//!
//! Features are given in tile-width units. Tiling `t` is displaced by
//! `t * (2d + 1) / num_tilings` of a tile width along dimension `d`, and every
//! tile is identified by `[t, coords..., ints...]` before being resolved to a
//! weight index through a [`TileIndexer`].

use serde::{Deserialize, Serialize};

use crate::hash_table::{IndexHashTable, TileIndexer, TileKey};
use crate::{Result, TileCodingError};

fn check_tilings(num_tilings: usize) -> Result<i64> {
    if num_tilings == 0 {
        return Err(TileCodingError::InvalidParameter(
            "at least one tiling is required".to_string(),
        ));
    }
    Ok(num_tilings as i64)
}

// Saturates at the i64 range; NaN lands on 0.
fn quantize(floats: &[f64], n: i64) -> Vec<i64> {
    floats.iter().map(|f| (f * n as f64).floor() as i64).collect()
}

/// Structural keys of the active tiles, one per tiling
pub fn tile_keys(num_tilings: usize, floats: &[f64], ints: &[i64]) -> Result<Vec<TileKey>> {
    let n = check_tilings(num_tilings)?;
    let qfloats = quantize(floats, n);

    Ok((0..n)
        .map(|tiling| {
            let mut coords = Vec::with_capacity(1 + qfloats.len() + ints.len());
            coords.push(tiling);
            let mut b = tiling;
            for q in &qfloats {
                coords.push(q.saturating_add(b).div_euclid(n));
                b += tiling * 2;
            }
            coords.extend_from_slice(ints);
            TileKey(coords)
        })
        .collect())
}

/// Indices of the active tiles for `floats` tagged with `ints`.
///
/// The result always holds `num_tilings` entries. New tiles are allocated in
/// `indexer`; a strict, full table yields
/// [`TileCodingError::CapacityExceeded`].
pub fn tiles<I: TileIndexer + ?Sized>(
    indexer: &mut I,
    num_tilings: usize,
    floats: &[f64],
    ints: &[i64],
) -> Result<Vec<usize>> {
    tile_keys(num_tilings, floats, ints)?
        .into_iter()
        .map(|key| indexer.get_index(key))
        .collect()
}

/// Like [`tiles`], but never allocates. Tiles the indexer cannot resolve are
/// `None`.
pub fn tiles_read_only<I: TileIndexer + ?Sized>(
    indexer: &I,
    num_tilings: usize,
    floats: &[f64],
    ints: &[i64],
) -> Result<Vec<Option<usize>>> {
    Ok(tile_keys(num_tilings, floats, ints)?
        .iter()
        .map(|key| indexer.lookup(key))
        .collect())
}

/// Like [`tiles`], but dimensions with a wrap width are periodic: their tile
/// coordinate is taken modulo the width, so `x` and `x + width` share tiles.
pub fn tiles_wrap<I: TileIndexer + ?Sized>(
    indexer: &mut I,
    num_tilings: usize,
    floats: &[f64],
    wrap_widths: &[Option<i64>],
    ints: &[i64],
) -> Result<Vec<usize>> {
    let n = check_tilings(num_tilings)?;
    if wrap_widths.len() != floats.len() {
        return Err(TileCodingError::DimensionMismatch {
            expected: floats.len(),
            actual: wrap_widths.len(),
        });
    }
    if wrap_widths.iter().flatten().any(|&w| w <= 0) {
        return Err(TileCodingError::InvalidParameter(
            "wrap widths must be positive".to_string(),
        ));
    }

    let qfloats = quantize(floats, n);
    let mut indices = Vec::with_capacity(num_tilings);
    for tiling in 0..n {
        let mut coords = Vec::with_capacity(1 + qfloats.len() + ints.len());
        coords.push(tiling);
        let mut b = tiling;
        for (q, width) in qfloats.iter().zip(wrap_widths) {
            let c = q.saturating_add(b % n).div_euclid(n);
            coords.push(match width {
                Some(w) => c.rem_euclid(*w),
                None => c,
            });
            b += tiling * 2;
        }
        coords.extend_from_slice(ints);
        indices.push(indexer.get_index(TileKey(coords))?);
    }
    Ok(indices)
}

/// Tile coder for a fixed number of tilings and feature dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileCoder<I = IndexHashTable> {
    num_tilings: usize,
    dims: usize,
    indexer: I,
}

impl<I: TileIndexer> TileCoder<I> {
    /// Create a coder over `dims` features backed by `indexer`
    pub fn new(num_tilings: usize, dims: usize, indexer: I) -> Result<Self> {
        check_tilings(num_tilings)?;
        Ok(Self {
            num_tilings,
            dims,
            indexer,
        })
    }

    /// Number of tilings
    #[must_use]
    pub fn num_tilings(&self) -> usize {
        self.num_tilings
    }

    /// Number of feature dimensions
    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// The backing indexer
    pub fn indexer(&self) -> &I {
        &self.indexer
    }

    fn check_dims(&self, floats: &[f64]) -> Result<()> {
        if floats.len() != self.dims {
            return Err(TileCodingError::DimensionMismatch {
                expected: self.dims,
                actual: floats.len(),
            });
        }
        Ok(())
    }

    /// Active tiles, allocating new ones as needed
    pub fn encode(&mut self, floats: &[f64], ints: &[i64]) -> Result<Vec<usize>> {
        self.check_dims(floats)?;
        tiles(&mut self.indexer, self.num_tilings, floats, ints)
    }

    /// Active tiles without touching the indexer
    pub fn encode_read_only(&self, floats: &[f64], ints: &[i64]) -> Result<Vec<Option<usize>>> {
        self.check_dims(floats)?;
        tiles_read_only(&self.indexer, self.num_tilings, floats, ints)
    }
}
