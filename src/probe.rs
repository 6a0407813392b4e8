//! Single-key open-addressing table with linear probing.
//!
//! Keys are strings. The slot index comes from a pluggable [`KeyHasher`] that
//! is always called with the table's *current* capacity, so a table that has
//! grown never hashes against a stale size. Deletion re-homes the rest of the
//! probe cluster instead of leaving tombstones.

use std::fmt;

use crate::array::FixedArray;
use crate::error::{Error, Result};
use crate::ladder::CapacityLadder;

/// Hash strategy: maps a key to a slot in `0..capacity`.
pub type KeyHasher = fn(key: &str, capacity: usize) -> usize;

/// Rolling polynomial string hash.
///
/// `value = (c + a * value) mod capacity` per character, with the multiplier
/// stepped as `a = a * base mod (capacity - 1)`.
#[inline]
pub(crate) fn polynomial_hash(key: &str, capacity: usize, seed: u64, base: u64) -> usize {
    debug_assert!(capacity >= 2);
    let cap = capacity as u128;
    let mut value: u128 = 0;
    let mut a = seed as u128;
    for c in key.chars() {
        value = (c as u128 + a * value) % cap;
        a = a * base as u128 % (cap - 1);
    }
    value as usize
}

/// Default [`KeyHasher`] for standalone probe tables.
pub fn default_hash(key: &str, capacity: usize) -> usize {
    polynomial_hash(key, capacity, 31415, 27183)
}

/// Open-addressing table over `String` keys whose capacity follows a
/// [`CapacityLadder`].
pub struct LinearProbeTable<V> {
    slots: FixedArray<(String, V)>,
    ladder: CapacityLadder,
    size_index: usize,
    count: usize,
    hasher: KeyHasher,
}

impl<V> LinearProbeTable<V> {
    pub fn new() -> Self {
        Self::with_ladder(CapacityLadder::default())
    }

    pub fn with_ladder(ladder: CapacityLadder) -> Self {
        Self::with_hasher(ladder, default_hash)
    }

    /// Create a table that places keys with `hasher` instead of [`default_hash`].
    pub fn with_hasher(ladder: CapacityLadder, hasher: KeyHasher) -> Self {
        Self {
            slots: FixedArray::new(ladder.first()),
            ladder,
            size_index: 0,
            count: 0,
            hasher,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current slot array size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn home(&self, key: &str) -> usize {
        (self.hasher)(key, self.capacity()) % self.capacity()
    }

    /// Find the slot for `key`.
    ///
    /// Stops at the slot holding `key`, or at the first empty slot. An empty
    /// slot is the insertion point when `for_insert` is set and a
    /// [`Error::NotFound`] otherwise. A full cycle without either is
    /// [`Error::TableFull`].
    pub fn probe(&self, key: &str, for_insert: bool) -> Result<usize> {
        let cap = self.capacity();
        let mut pos = self.home(key);
        for _ in 0..cap {
            match self.slots.get(pos) {
                None if for_insert => return Ok(pos),
                None => return Err(Error::not_found(key)),
                Some((k, _)) if k == key => return Ok(pos),
                Some(_) => pos = (pos + 1) % cap,
            }
        }
        Err(Error::TableFull { capacity: cap })
    }

    pub fn get(&self, key: &str) -> Result<&V> {
        let pos = self.probe(key, false)?;
        self.slots
            .get(pos)
            .map(|(_, v)| v)
            .ok_or_else(|| Error::not_found(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut V> {
        let pos = self.probe(key, false)?;
        self.slots
            .get_mut(pos)
            .map(|(_, v)| v)
            .ok_or_else(|| Error::not_found(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.probe(key, false).is_ok()
    }

    /// Insert or overwrite. Returns the previous value if the key existed.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Result<Option<V>> {
        let key = key.into();
        let pos = self.probe(&key, true)?;
        if let Some((_, slot_value)) = self.slots.get_mut(pos) {
            return Ok(Some(std::mem::replace(slot_value, value)));
        }

        self.slots.set(pos, (key, value));
        self.count += 1;
        if self.count * 2 > self.capacity() {
            self.grow()?;
        }
        Ok(None)
    }

    /// Remove `key`, re-homing every entry in the rest of its probe cluster.
    pub fn delete(&mut self, key: &str) -> Result<V> {
        let pos = self.probe(key, false)?;
        let (_, value) = self.slots.take(pos).ok_or_else(|| Error::not_found(key))?;
        self.count -= 1;

        let cap = self.capacity();
        let mut next = (pos + 1) % cap;
        while let Some((k, v)) = self.slots.take(next) {
            let home = self.probe(&k, true)?;
            self.slots.set(home, (k, v));
            next = (next + 1) % cap;
        }
        Ok(value)
    }

    /// Move to the next ladder rung and re-place every entry.
    fn grow(&mut self) -> Result<()> {
        let Some(new_cap) = self.ladder.capacity(self.size_index + 1) else {
            tracing::warn!(
                target: "keyed_tables::probe",
                capacity = self.capacity(),
                len = self.count,
                "capacity ladder exhausted; table will not grow"
            );
            return Ok(());
        };

        tracing::debug!(
            target: "keyed_tables::probe",
            from = self.capacity(),
            to = new_cap,
            len = self.count,
            "growing probe table"
        );
        self.size_index += 1;
        let old = std::mem::replace(&mut self.slots, FixedArray::new(new_cap));
        for (k, v) in old.into_occupied() {
            let pos = self.probe(&k, true)?;
            self.slots.set(pos, (k, v));
        }
        Ok(())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.occupied().map(|(_, (k, _))| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots.occupied().map(|(_, (_, v))| v)
    }

    /// Entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.slots.occupied().map(|(_, (k, v))| (k.as_str(), v))
    }

    /// Consume the table, yielding its entries in slot order.
    pub fn into_entries(self) -> impl Iterator<Item = (String, V)> {
        self.slots.into_occupied()
    }
}

impl<V> Default for LinearProbeTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for LinearProbeTable<V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            ladder: self.ladder.clone(),
            size_index: self.size_index,
            count: self.count,
            hasher: self.hasher,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for LinearProbeTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
