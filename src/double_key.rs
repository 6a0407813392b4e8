//! Composite-key hash table.
//!
//! `(K1, K2) -> V` stored as an outer linear-probe array whose slots hold
//! `(K1, LinearProbeTable<V>)`. The inner table for a K1 is created on the
//! first insert under that K1 and the outer slot is cleared the moment its
//! inner table becomes empty, so an outer slot is occupied exactly when its
//! inner table has entries.
//!
//! Both levels share one rolling-hash scheme ([`composite_hash`]). The inner
//! tables receive it as their [`KeyHasher`](crate::probe::KeyHasher), and it is
//! always evaluated against the capacity of the array being probed.
//!
//! ```rust
//! use keyed_tables::DoubleKeyTable;
//!
//! let mut t: DoubleKeyTable<u32> = DoubleKeyTable::new();
//! t.set("alice", "math", 91).unwrap();
//! t.set("alice", "art", 78).unwrap();
//! t.set("bob", "math", 64).unwrap();
//!
//! assert_eq!(t.get("alice", "art"), Ok(&78));
//! assert_eq!(t.len(), 3);
//! assert_eq!(t.outer_len(), 2);
//!
//! t.delete("bob", "math").unwrap();
//! assert!(!t.contains("bob", "math"));
//! ```

use std::fmt;

use crate::array::FixedArray;
use crate::error::{Error, Result};
use crate::ladder::CapacityLadder;
use crate::probe::{polynomial_hash, LinearProbeTable};

const HASH_SEED: u64 = 31417;
const HASH_BASE: u64 = 31;

/// Hash used at both levels of a [`DoubleKeyTable`].
///
/// The multiplier is stepped modulo `capacity - 1` while the running value is
/// reduced modulo `capacity`; slot assignments depend on both.
pub fn composite_hash(key: &str, capacity: usize) -> usize {
    polynomial_hash(key, capacity, HASH_SEED, HASH_BASE)
}

/// Capacity ladders for both levels.
#[derive(Debug, Clone, Default)]
pub struct DoubleKeyConfig {
    /// Ladder for the outer (K1) array.
    pub outer: CapacityLadder,
    /// Ladder every inner (K2) table starts from.
    pub inner: CapacityLadder,
}

/// Slot positions of a key pair: the outer slot, and the inner slot when a
/// second key was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub outer: usize,
    pub inner: Option<usize>,
}

pub struct DoubleKeyTable<V> {
    slots: FixedArray<(String, LinearProbeTable<V>)>,
    config: DoubleKeyConfig,
    size_index: usize,
    /// Occupied outer slots (distinct K1s).
    outer_count: usize,
    /// Total (K1, K2) entries.
    count: usize,
}

/// Re-tag an inner table's overflow so it is distinguishable from the outer one.
fn inner_error(key1: &str, err: Error) -> Error {
    match err {
        Error::TableFull { capacity } => Error::InnerTableFull {
            key1: key1.to_owned(),
            capacity,
        },
        other => other,
    }
}

impl<V> DoubleKeyTable<V> {
    pub fn new() -> Self {
        Self::with_config(DoubleKeyConfig::default())
    }

    pub fn with_config(config: DoubleKeyConfig) -> Self {
        Self {
            slots: FixedArray::new(config.outer.first()),
            config,
            size_index: 0,
            outer_count: 0,
            count: 0,
        }
    }

    /// Build from raw capacity lists. Inner tables reuse the outer list when
    /// `internal_sizes` is `None`.
    pub fn with_sizes(sizes: Vec<usize>, internal_sizes: Option<Vec<usize>>) -> Result<Self> {
        let outer = CapacityLadder::new(sizes)?;
        let inner = match internal_sizes {
            Some(sizes) => CapacityLadder::new(sizes)?,
            None => outer.clone(),
        };
        Ok(Self::with_config(DoubleKeyConfig { outer, inner }))
    }

    /// Total number of (K1, K2) entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Number of distinct K1s, i.e. occupied outer slots.
    #[inline]
    pub fn outer_len(&self) -> usize {
        self.outer_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current outer array size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn inner_capacity(&self, key1: &str) -> Result<usize> {
        Ok(self.inner_table(key1)?.capacity())
    }

    pub fn hash1(&self, key1: &str) -> usize {
        composite_hash(key1, self.capacity())
    }

    pub fn hash2(key2: &str, inner: &LinearProbeTable<V>) -> usize {
        composite_hash(key2, inner.capacity())
    }

    fn probe_outer(&self, key1: &str, for_insert: bool) -> Result<usize> {
        let cap = self.capacity();
        let mut pos = self.hash1(key1);
        for _ in 0..cap {
            match self.slots.get(pos) {
                None if for_insert => return Ok(pos),
                None => return Err(Error::not_found(key1)),
                Some((k, _)) if k == key1 => return Ok(pos),
                Some(_) => pos = (pos + 1) % cap,
            }
        }
        Err(Error::TableFull { capacity: cap })
    }

    fn inner_table(&self, key1: &str) -> Result<&LinearProbeTable<V>> {
        let pos = self.probe_outer(key1, false)?;
        self.slots
            .get(pos)
            .map(|(_, inner)| inner)
            .ok_or_else(|| Error::not_found(key1))
    }

    fn inner_table_mut(&mut self, key1: &str) -> Result<&mut LinearProbeTable<V>> {
        let pos = self.probe_outer(key1, false)?;
        self.slots
            .get_mut(pos)
            .map(|(_, inner)| inner)
            .ok_or_else(|| Error::not_found(key1))
    }

    /// Slot positions of `key1` and, if given, `key2` under it.
    pub fn locate(&self, key1: &str, key2: Option<&str>) -> Result<Location> {
        let outer = self.probe_outer(key1, false)?;
        let inner = match key2 {
            Some(key2) => {
                let table = self.inner_table(key1)?;
                Some(table.probe(key2, false).map_err(|e| inner_error(key1, e))?)
            }
            None => None,
        };
        Ok(Location { outer, inner })
    }

    pub fn get(&self, key1: &str, key2: &str) -> Result<&V> {
        self.inner_table(key1)?
            .get(key2)
            .map_err(|e| inner_error(key1, e))
    }

    pub fn get_mut(&mut self, key1: &str, key2: &str) -> Result<&mut V> {
        self.inner_table_mut(key1)?
            .get_mut(key2)
            .map_err(|e| inner_error(key1, e))
    }

    pub fn contains(&self, key1: &str, key2: &str) -> bool {
        self.get(key1, key2).is_ok()
    }

    /// Insert or overwrite. Returns the previous value if the pair existed.
    ///
    /// Grows the outer array to the next ladder rung once more than half of
    /// its slots are in use.
    pub fn set(
        &mut self,
        key1: impl Into<String>,
        key2: impl Into<String>,
        value: V,
    ) -> Result<Option<V>> {
        let previous = self.insert_entry(key1.into(), key2.into(), value)?;
        while self.outer_count * 2 > self.capacity() {
            if !self.grow()? {
                break;
            }
        }
        Ok(previous)
    }

    fn insert_entry(&mut self, key1: String, key2: String, value: V) -> Result<Option<V>> {
        let pos = self.probe_outer(&key1, true)?;
        let previous = match self.slots.get_mut(pos) {
            Some((_, inner)) => inner.set(key2, value).map_err(|e| inner_error(&key1, e))?,
            None => {
                let mut inner =
                    LinearProbeTable::with_hasher(self.config.inner.clone(), composite_hash);
                inner.set(key2, value).map_err(|e| inner_error(&key1, e))?;
                self.slots.set(pos, (key1, inner));
                self.outer_count += 1;
                None
            }
        };
        if previous.is_none() {
            self.count += 1;
        }
        Ok(previous)
    }

    /// Remove a pair. When it was the last entry under `key1`, the outer slot
    /// is cleared and the rest of its outer probe cluster is re-homed.
    pub fn delete(&mut self, key1: &str, key2: &str) -> Result<V> {
        let pos = self.probe_outer(key1, false)?;
        let (_, inner) = self
            .slots
            .get_mut(pos)
            .ok_or_else(|| Error::not_found(key1))?;
        let value = inner.delete(key2).map_err(|e| inner_error(key1, e))?;
        let emptied = inner.is_empty();
        self.count -= 1;

        if emptied {
            self.slots.take(pos);
            self.outer_count -= 1;
            self.rehome_outer_cluster(pos)?;
        }
        Ok(value)
    }

    fn rehome_outer_cluster(&mut self, vacated: usize) -> Result<()> {
        let cap = self.capacity();
        let mut next = (vacated + 1) % cap;
        while let Some((key1, inner)) = self.slots.take(next) {
            let home = self.probe_outer(&key1, true)?;
            self.slots.set(home, (key1, inner));
            next = (next + 1) % cap;
        }
        Ok(())
    }

    /// Climb one ladder rung and reinsert every entry. Returns `false` when
    /// the ladder is exhausted.
    fn grow(&mut self) -> Result<bool> {
        let Some(new_cap) = self.config.outer.capacity(self.size_index + 1) else {
            tracing::warn!(
                target: "keyed_tables::double_key",
                capacity = self.capacity(),
                outer_len = self.outer_count,
                "capacity ladder exhausted; outer table will not grow"
            );
            return Ok(false);
        };

        tracing::debug!(
            target: "keyed_tables::double_key",
            from = self.capacity(),
            to = new_cap,
            outer_len = self.outer_count,
            len = self.count,
            "growing outer table"
        );
        self.size_index += 1;
        let old = std::mem::replace(&mut self.slots, FixedArray::new(new_cap));
        self.outer_count = 0;
        self.count = 0;
        for (key1, inner) in old.into_occupied() {
            for (key2, value) in inner.into_entries() {
                self.insert_entry(key1.clone(), key2, value)?;
            }
        }
        Ok(true)
    }

    /// All first-level keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.occupied().map(|(_, (k1, _))| k1.as_str())
    }

    /// All second-level keys stored under `key1`.
    pub fn inner_keys(&self, key1: &str) -> Result<impl Iterator<Item = &str>> {
        Ok(self.inner_table(key1)?.keys())
    }

    /// All `(key1, key2)` pairs stored under `key1`.
    pub fn pairs<'a>(
        &'a self,
        key1: &str,
    ) -> Result<impl Iterator<Item = (&'a str, &'a str)>> {
        let pos = self.probe_outer(key1, false)?;
        let (k1, inner) = self
            .slots
            .get(pos)
            .ok_or_else(|| Error::not_found(key1))?;
        Ok(inner.keys().map(move |k2| (k1.as_str(), k2)))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots
            .occupied()
            .flat_map(|(_, (_, inner))| inner.values())
    }

    pub fn inner_values(&self, key1: &str) -> Result<impl Iterator<Item = &V>> {
        Ok(self.inner_table(key1)?.values())
    }

    /// Every `(key1, key2, value)` triple, outer slot order first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &V)> {
        self.slots.occupied().flat_map(|(_, (k1, inner))| {
            inner.iter().map(move |(k2, v)| (k1.as_str(), k2, v))
        })
    }
}

impl<V> Default for DoubleKeyTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for DoubleKeyTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k1, k2, v)| ((k1, k2), v)))
            .finish()
    }
}
