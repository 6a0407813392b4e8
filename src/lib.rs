//! # keyed-tables
//!
//! Two open-addressing associative containers over string keys:
//!
//! - [`DoubleKeyTable`]: a composite-key `(K1, K2) -> V` table. An outer
//!   linear-probe array holds one inner [`LinearProbeTable`] per distinct K1.
//! - [`TrieHashTable`]: a trie of 27-slot hash tables indexed by successive
//!   key bytes, growing child nodes where keys share a prefix and collapsing
//!   them again on deletion.
//!
//! Table sizes climb a fixed [`CapacityLadder`]; a table that overflows its
//! last rung reports [`Error::TableFull`] instead of growing.
//!
//! ## Example
//!
//! ```rust
//! use keyed_tables::{DoubleKeyTable, TrieHashTable};
//!
//! let mut grades: DoubleKeyTable<u32> = DoubleKeyTable::new();
//! grades.set("alice", "math", 91).unwrap();
//! assert_eq!(grades.get("alice", "math"), Ok(&91));
//!
//! let mut words: TrieHashTable<u32> = TrieHashTable::new();
//! for w in ["dog", "cat", "ant", "apple"] {
//!     words.set(w, w.len() as u32).unwrap();
//! }
//! assert_eq!(words.sort_keys(), vec!["ant", "apple", "cat", "dog"]);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

pub mod array;
pub mod double_key;
pub mod error;
pub mod ladder;
pub mod probe;
pub mod trie;

pub use array::FixedArray;
pub use double_key::{composite_hash, DoubleKeyConfig, DoubleKeyTable, Location};
pub use error::{Error, Result};
pub use ladder::{CapacityLadder, DEFAULT_TABLE_SIZES};
pub use probe::{default_hash, KeyHasher, LinearProbeTable};
pub use trie::{SlotPath, TrieHashTable};



#[cfg(test)]
mod proptests;
