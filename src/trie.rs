//! Unbounded trie of hash tables.
//!
//! Every node is a 27-slot table. A node at level `L` places a key by its
//! byte at position `L`: ASCII letters case-insensitively into slots 0..=25,
//! other bytes into `byte % 26`, and keys that end at `L` into the terminal
//! slot 26. A slot is empty, a leaf holding a full key and its value, or a
//! branch owning a child node one level deeper.
//!
//! Branches only appear when two keys land in the same slot, and disappear
//! again as soon as deletions leave them with a single key: that key is
//! promoted back into the parent's slot.
//!
//! ```rust
//! use keyed_tables::TrieHashTable;
//!
//! let mut t: TrieHashTable<u32> = TrieHashTable::new();
//! t.set("cat", 1).unwrap();
//! t.set("car", 2).unwrap();
//! assert_eq!(t.get_location("cat").unwrap().as_slice(), &[2, 0, 19]);
//!
//! t.delete("car").unwrap();
//! assert_eq!(t.get_location("cat").unwrap().as_slice(), &[2]);
//! assert_eq!(t.sort_keys(), vec!["cat"]);
//! ```

use std::fmt;

use smallvec::SmallVec;

use crate::array::FixedArray;
use crate::error::{Error, Result};

/// Slots per node: 26 letter buckets plus the terminal slot.
pub const TABLE_SIZE: usize = 27;

/// Slot for keys that end at a node's level.
pub const TERMINAL: usize = TABLE_SIZE - 1;

/// Slot indices from the root down to the slot holding a key.
pub type SlotPath = SmallVec<[usize; 16]>;

/// Slot index of `key` at `level`.
#[inline]
pub fn slot_index(key: &[u8], level: usize) -> usize {
    match key.get(level) {
        Some(b) if b.is_ascii_alphabetic() => (b.to_ascii_lowercase() - b'a') as usize,
        Some(b) => (*b as usize) % TERMINAL,
        None => TERMINAL,
    }
}

/// Whether two keys that share a slot at `level - 1` separate somewhere at or
/// after `level`.
fn separable(a: &[u8], b: &[u8], level: usize) -> bool {
    a.len() != b.len() || (level..a.len()).any(|l| slot_index(a, l) != slot_index(b, l))
}

enum Entry<V> {
    Leaf {
        key: String,
        value: V,
    },
    Branch {
        /// Leading bytes of the key that caused the split, through the
        /// branch's own slot.
        prefix: Box<[u8]>,
        node: Box<Node<V>>,
    },
}

struct Node<V> {
    slots: FixedArray<Entry<V>>,
    level: usize,
    /// Leaves reachable from this node.
    count: usize,
}

impl<V> Node<V> {
    fn new(level: usize) -> Self {
        Self {
            slots: FixedArray::new(TABLE_SIZE),
            level,
            count: 0,
        }
    }

    fn get(&self, key: &str) -> Option<&V> {
        match self.slots.get(slot_index(key.as_bytes(), self.level))? {
            Entry::Leaf { key: k, value } if k == key => Some(value),
            Entry::Leaf { .. } => None,
            Entry::Branch { node, .. } => node.get(key),
        }
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        match self.slots.get_mut(slot_index(key.as_bytes(), self.level))? {
            Entry::Leaf { key: k, value } if k == key => Some(value),
            Entry::Leaf { .. } => None,
            Entry::Branch { node, .. } => node.get_mut(key),
        }
    }

    fn locate(&self, key: &str, path: &mut SlotPath) -> bool {
        let idx = slot_index(key.as_bytes(), self.level);
        match self.slots.get(idx) {
            Some(Entry::Leaf { key: k, .. }) if k == key => {
                path.push(idx);
                true
            }
            Some(Entry::Branch { node, .. }) => {
                path.push(idx);
                node.locate(key, path)
            }
            _ => false,
        }
    }

    fn set(&mut self, key: String, value: V) -> Result<Option<V>> {
        let idx = slot_index(key.as_bytes(), self.level);
        let previous = match self.slots.get_mut(idx) {
            None => {
                self.slots.set(idx, Entry::Leaf { key, value });
                None
            }
            Some(Entry::Leaf { key: k, value: v }) if *k == key => {
                return Ok(Some(std::mem::replace(v, value)));
            }
            Some(Entry::Leaf { key: k, .. }) => {
                if !separable(k.as_bytes(), key.as_bytes(), self.level + 1) {
                    return Err(Error::TableFull {
                        capacity: TABLE_SIZE,
                    });
                }
                self.split(idx, key, value)?;
                None
            }
            Some(Entry::Branch { node, .. }) => node.set(key, value)?,
        };
        if previous.is_none() {
            self.count += 1;
        }
        Ok(previous)
    }

    /// Replace the leaf at `idx` with a branch holding it and the new key.
    fn split(&mut self, idx: usize, key: String, value: V) -> Result<()> {
        let Some(Entry::Leaf {
            key: old_key,
            value: old_value,
        }) = self.slots.take(idx)
        else {
            return Err(Error::not_found(key));
        };

        tracing::trace!(
            target: "keyed_tables::trie",
            level = self.level,
            slot = idx,
            "splitting slot into child node"
        );
        let prefix_len = (self.level + 1).min(old_key.len());
        let prefix: Box<[u8]> = old_key.as_bytes()[..prefix_len].into();
        let mut node = Box::new(Node::new(self.level + 1));
        node.set(old_key, old_value)?;
        node.set(key, value)?;
        self.slots.set(idx, Entry::Branch { prefix, node });
        Ok(())
    }

    /// Remove the leaf at the end of `path`.
    ///
    /// Returns the removed value, plus the sole surviving entry when this node
    /// drops to one leaf and `collapse` is set; the caller then puts that
    /// entry in place of this node.
    fn remove(
        &mut self,
        key: &str,
        path: &[usize],
        collapse: bool,
    ) -> Result<(V, Option<Entry<V>>)> {
        let (&idx, rest) = path.split_first().ok_or_else(|| Error::not_found(key))?;

        let value = if rest.is_empty() {
            match self.slots.take(idx) {
                Some(Entry::Leaf { value, .. }) => value,
                Some(other) => {
                    self.slots.set(idx, other);
                    return Err(Error::not_found(key));
                }
                None => return Err(Error::not_found(key)),
            }
        } else {
            let Some(Entry::Branch { node, .. }) = self.slots.get_mut(idx) else {
                return Err(Error::not_found(key));
            };
            let (value, promoted) = node.remove(key, rest, true)?;
            if let Some(entry) = promoted {
                tracing::trace!(
                    target: "keyed_tables::trie",
                    level = self.level + 1,
                    slot = idx,
                    "collapsing child node into parent slot"
                );
                self.slots.set(idx, entry);
            }
            value
        };

        self.count -= 1;
        if collapse && self.count == 1 {
            let survivor = (0..TABLE_SIZE)
                .find(|&i| self.slots.is_occupied(i))
                .and_then(|i| self.slots.take(i));
            return Ok((value, survivor));
        }
        Ok((value, None))
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result
    where
        V: fmt::Display,
    {
        let ordered = std::iter::once(TERMINAL).chain(0..TERMINAL);
        for idx in ordered {
            match self.slots.get(idx) {
                None => {}
                Some(Entry::Leaf { key, value }) => {
                    writeln!(f, "{:indent$}{key:?}: {value}", "", indent = depth * 2)?;
                }
                Some(Entry::Branch { prefix, node }) => {
                    let prefix = String::from_utf8_lossy(prefix);
                    writeln!(
                        f,
                        "{:indent$}{prefix:?}* ({} keys)",
                        "",
                        node.count,
                        indent = depth * 2
                    )?;
                    node.render(f, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn collect<'a>(&'a self, out: &mut Vec<(&'a str, &'a V)>) {
        let ordered = std::iter::once(TERMINAL).chain(0..TERMINAL);
        for idx in ordered {
            match self.slots.get(idx) {
                None => {}
                Some(Entry::Leaf { key, value }) => out.push((key.as_str(), value)),
                Some(Entry::Branch { node, .. }) => node.collect(out),
            }
        }
    }
}

/// String-keyed map built from nested 27-slot nodes.
pub struct TrieHashTable<V> {
    root: Node<V>,
}

impl<V> TrieHashTable<V> {
    pub fn new() -> Self {
        Self { root: Node::new(0) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.root.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.count == 0
    }

    pub fn get(&self, key: &str) -> Result<&V> {
        self.root.get(key).ok_or_else(|| Error::not_found(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut V> {
        self.root.get_mut(key).ok_or_else(|| Error::not_found(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.root.get(key).is_some()
    }

    /// Insert or overwrite. Returns the previous value if the key existed.
    ///
    /// Fails with [`Error::TableFull`], leaving the table untouched, when the
    /// key cannot be told apart from a stored key by slot index alone (for
    /// example `"Cat"` and `"cat"`).
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Result<Option<V>> {
        self.root.set(key.into(), value)
    }

    /// Slot indices visited from the root to the slot holding `key`.
    pub fn get_location(&self, key: &str) -> Result<SlotPath> {
        let mut path = SlotPath::new();
        if self.root.locate(key, &mut path) {
            Ok(path)
        } else {
            Err(Error::not_found(key))
        }
    }

    /// Remove `key`, collapsing every node left holding a single key.
    pub fn delete(&mut self, key: &str) -> Result<V> {
        let path = self.get_location(key)?;
        let (value, _) = self.root.remove(key, &path, false)?;
        Ok(value)
    }

    /// All keys, shortest-first within each node then by slot order.
    ///
    /// For keys made of ASCII letters of one case this is lexicographic order.
    pub fn sort_keys(&self) -> Vec<&str> {
        self.iter().map(|(k, _)| k).collect()
    }

    /// Entries in [`sort_keys`](Self::sort_keys) order.
    pub fn iter(&self) -> std::vec::IntoIter<(&str, &V)> {
        let mut out = Vec::with_capacity(self.len());
        self.root.collect(&mut out);
        out.into_iter()
    }
}

impl<V> Default for TrieHashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for TrieHashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// One line per slot in use, indented by depth: leaves as `"key": value`,
/// branches as `"prefix"* (n keys)` followed by their children.
impl<V: fmt::Display> fmt::Display for TrieHashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.render(f, 0)
    }
}
