//! Capacity ladders.
//!
//! Every table in this crate sizes its slot array from an ascending list of
//! capacities and climbs one rung at a time when its load factor is crossed.
//! Growth is bounded: once the last rung is reached the table stays at that
//! size and inserts that cannot find a slot fail with [`Error::TableFull`].
//!
//! [`Error::TableFull`]: crate::Error::TableFull

use crate::error::{Error, Result};

/// Default rungs, roughly doubling primes. No workload should need more than
/// about a million entries per table.
pub const DEFAULT_TABLE_SIZES: [usize; 19] = [
    5, 13, 29, 53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613,
    393241, 786433, 1572869,
];

/// A validated, strictly increasing list of table capacities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityLadder {
    sizes: Box<[usize]>,
}

impl CapacityLadder {
    /// Build a ladder from raw sizes.
    ///
    /// Sizes must be non-empty, strictly increasing and at least 2: the
    /// polynomial hashes step their multiplier modulo `capacity - 1`.
    pub fn new(sizes: Vec<usize>) -> Result<Self> {
        if sizes.is_empty() {
            return Err(Error::InvalidLadder("ladder has no capacities".into()));
        }
        if sizes[0] < 2 {
            return Err(Error::InvalidLadder(format!(
                "smallest capacity must be at least 2, got {}",
                sizes[0]
            )));
        }
        if let Some(w) = sizes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::InvalidLadder(format!(
                "capacities must strictly increase, got {} then {}",
                w[0], w[1]
            )));
        }
        Ok(Self {
            sizes: sizes.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn capacity(&self, index: usize) -> Option<usize> {
        self.sizes.get(index).copied()
    }

    #[inline]
    pub fn first(&self) -> usize {
        self.sizes[0]
    }

    /// Index of the largest rung.
    #[inline]
    pub fn last_index(&self) -> usize {
        self.sizes.len() - 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }
}

impl Default for CapacityLadder {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_TABLE_SIZES.to_vec().into_boxed_slice(),
        }
    }
}
