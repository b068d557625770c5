//! Memoizing, capacity-bounded tile index allocation
//!
//! The [`IndexHashTable`] interns tile keys into dense indices `0, 1, 2, ...`
//! so that a fixed-size weight vector can serve an unbounded set of tiles.
//! Once every slot has been handed out, the table either fails or falls back
//! to hashing, depending on its [`OverflowPolicy`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{Result, TileCodingError};

/// Structural identity of a single tile: `[tiling, coords..., tags...]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey(pub Vec<i64>);

impl TileKey {
    /// Tiling number this key belongs to
    #[must_use]
    pub fn tiling(&self) -> Option<i64> {
        self.0.first().copied()
    }

    /// Raw key components
    #[must_use]
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Hash the key into `[0, size)`.
    ///
    /// `DefaultHasher::new` uses fixed keys, so the result is the same for
    /// every table instance within a build.
    fn hash_into(&self, size: usize) -> usize {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        (hasher.finish() % size as u64) as usize
    }
}

impl From<Vec<i64>> for TileKey {
    fn from(coords: Vec<i64>) -> Self {
        Self(coords)
    }
}

/// What a full table does with a key it has never seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Hash the key into the table range and share a weight with whatever
    /// tile already owns that slot
    #[default]
    Collide,
    /// Refuse with [`TileCodingError::CapacityExceeded`]
    Strict,
}

/// Anything that can turn a tile key into a weight index
pub trait TileIndexer {
    /// Resolve a key, allocating a new index if the indexer allows it
    fn get_index(&mut self, key: TileKey) -> Result<usize>;

    /// Resolve a key without side effects
    fn lookup(&self, key: &TileKey) -> Option<usize>;

    /// Size of the index space; every returned index is below this
    fn capacity(&self) -> usize;
}

/// Index Hash Table (IHT)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "IndexHashTableRepr")]
pub struct IndexHashTable {
    size: usize,
    policy: OverflowPolicy,
    overfull_count: usize,
    dictionary: IndexSet<TileKey>,
}

#[derive(Deserialize)]
struct IndexHashTableRepr {
    size: usize,
    #[serde(default)]
    policy: OverflowPolicy,
    #[serde(default)]
    overfull_count: usize,
    dictionary: IndexSet<TileKey>,
}

impl TryFrom<IndexHashTableRepr> for IndexHashTable {
    type Error = TileCodingError;

    fn try_from(repr: IndexHashTableRepr) -> Result<Self> {
        let mut table = Self::with_policy(repr.size, repr.policy)?;
        if repr.dictionary.len() > repr.size {
            return Err(TileCodingError::InvalidParameter(format!(
                "{} stored tiles exceed table size {}",
                repr.dictionary.len(),
                repr.size
            )));
        }
        table.overfull_count = repr.overfull_count;
        table.dictionary = repr.dictionary;
        Ok(table)
    }
}

impl IndexHashTable {
    /// Create a table with the default collide policy
    pub fn new(max_size: usize) -> Result<Self> {
        Self::with_policy(max_size, OverflowPolicy::default())
    }

    /// Create a table with an explicit overflow policy
    pub fn with_policy(max_size: usize, policy: OverflowPolicy) -> Result<Self> {
        if max_size == 0 {
            return Err(TileCodingError::InvalidParameter(
                "index hash table size must be positive".to_string(),
            ));
        }
        debug!(max_size, ?policy, "creating index hash table");
        Ok(Self {
            size: max_size,
            policy,
            overfull_count: 0,
            dictionary: IndexSet::with_capacity(max_size),
        })
    }

    /// Number of distinct keys that own an index
    #[must_use]
    pub fn count(&self) -> usize {
        self.dictionary.len()
    }

    /// Whether every index has been handed out
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.dictionary.len() >= self.size
    }

    /// Number of lookups that had to fall back to hashing
    #[must_use]
    pub fn overfull_count(&self) -> usize {
        self.overfull_count
    }

    /// Overflow policy of this table
    #[must_use]
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Key that owns `index`, if one was assigned
    #[must_use]
    pub fn key_of(&self, index: usize) -> Option<&TileKey> {
        self.dictionary.get_index(index)
    }
}

impl TileIndexer for IndexHashTable {
    fn get_index(&mut self, key: TileKey) -> Result<usize> {
        if let Some(index) = self.dictionary.get_index_of(&key) {
            return Ok(index);
        }

        if self.is_full() {
            return match self.policy {
                OverflowPolicy::Strict => Err(TileCodingError::CapacityExceeded {
                    capacity: self.size,
                }),
                OverflowPolicy::Collide => {
                    if self.overfull_count == 0 {
                        warn!(capacity = self.size, "index hash table full, allowing collisions");
                    }
                    self.overfull_count += 1;
                    Ok(key.hash_into(self.size))
                }
            };
        }

        let (index, _) = self.dictionary.insert_full(key);
        trace!(index, "assigned tile index");
        Ok(index)
    }

    fn lookup(&self, key: &TileKey) -> Option<usize> {
        match self.dictionary.get_index_of(key) {
            Some(index) => Some(index),
            None if self.is_full() && self.policy == OverflowPolicy::Collide => {
                Some(key.hash_into(self.size))
            }
            None => None,
        }
    }

    fn capacity(&self) -> usize {
        self.size
    }
}

/// Stateless indexer that hashes every key straight into `[0, size)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ModuloHasherRepr")]
pub struct ModuloHasher {
    size: usize,
}

#[derive(Deserialize)]
struct ModuloHasherRepr {
    size: usize,
}

impl TryFrom<ModuloHasherRepr> for ModuloHasher {
    type Error = TileCodingError;

    fn try_from(repr: ModuloHasherRepr) -> Result<Self> {
        Self::new(repr.size)
    }
}

impl ModuloHasher {
    /// Create a hasher over `size` slots
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(TileCodingError::InvalidParameter(
                "hash space size must be positive".to_string(),
            ));
        }
        Ok(Self { size })
    }
}

impl TileIndexer for ModuloHasher {
    fn get_index(&mut self, key: TileKey) -> Result<usize> {
        Ok(key.hash_into(self.size))
    }

    fn lookup(&self, key: &TileKey) -> Option<usize> {
        Some(key.hash_into(self.size))
    }

    fn capacity(&self) -> usize {
        self.size
    }
}
