use super::*;

use crate::double_key::validate::validate_double_key;
use crate::trie::validate::validate_trie;
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, HashMap};

// Lowercase-only words: every distinct key gets a distinct trie slot path, and
// slot order matches byte order.
fn word_strategy() -> impl Strategy<Value = String> {
    "[a-d]{0,5}"
}

fn outer_key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}"
}

fn inner_key_strategy() -> impl Strategy<Value = String> {
    "[a-c]{0,2}"
}

#[derive(Clone, Debug, Arbitrary)]
enum TrieOp {
    #[proptest(weight = 50)]
    Insert(#[proptest(strategy = "word_strategy()")] String, u32),
    #[proptest(weight = 25)]
    Remove(#[proptest(strategy = "word_strategy()")] String),
    #[proptest(weight = 24)]
    Get(#[proptest(strategy = "word_strategy()")] String),
    #[proptest(weight = 1)]
    SortKeys,
}

#[derive(Clone, Debug, Arbitrary)]
enum PairOp {
    #[proptest(weight = 50)]
    Insert(
        #[proptest(strategy = "outer_key_strategy()")] String,
        #[proptest(strategy = "inner_key_strategy()")] String,
        u32,
    ),
    #[proptest(weight = 25)]
    Remove(
        #[proptest(strategy = "outer_key_strategy()")] String,
        #[proptest(strategy = "inner_key_strategy()")] String,
    ),
    #[proptest(weight = 25)]
    Get(
        #[proptest(strategy = "outer_key_strategy()")] String,
        #[proptest(strategy = "inner_key_strategy()")] String,
    ),
}

#[derive(Clone, Debug, Arbitrary)]
enum ProbeOp {
    #[proptest(weight = 50)]
    Insert(#[proptest(strategy = "word_strategy()")] String, u32),
    #[proptest(weight = 25)]
    Remove(#[proptest(strategy = "word_strategy()")] String),
    #[proptest(weight = 25)]
    Get(#[proptest(strategy = "word_strategy()")] String),
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_trie_equivalence(ops in prop::collection::vec(any::<TrieOp>(), 0..=1000)) {
        let mut t: TrieHashTable<u32> = TrieHashTable::new();
        let mut m: BTreeMap<String, u32> = BTreeMap::new();

        for op in ops {
            match op {
                TrieOp::Insert(key, value) => {
                    let old_t = t.set(key.as_str(), value).unwrap();
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                }
                TrieOp::Remove(key) => {
                    let old_t = t.delete(&key).ok();
                    let old_m = m.remove(&key);
                    prop_assert_eq!(old_t, old_m);
                }
                TrieOp::Get(key) => {
                    let got_t = t.get(&key).ok().copied();
                    let got_m = m.get(&key).copied();
                    prop_assert_eq!(got_t, got_m);
                    prop_assert_eq!(t.get_location(&key).is_ok(), got_m.is_some());
                }
                TrieOp::SortKeys => {
                    let expected: Vec<&str> = m.keys().map(String::as_str).collect();
                    prop_assert_eq!(t.sort_keys(), expected);
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_trie(&t);
        let got: Vec<(&str, u32)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(&str, u32)> = m.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_double_key_equivalence(ops in prop::collection::vec(any::<PairOp>(), 0..=1000)) {
        let mut t: DoubleKeyTable<u32> = DoubleKeyTable::new();
        let mut m: HashMap<(String, String), u32> = HashMap::new();

        for op in ops {
            match op {
                PairOp::Insert(k1, k2, value) => {
                    let old_t = t.set(k1.as_str(), k2.as_str(), value).unwrap();
                    let old_m = m.insert((k1, k2), value);
                    prop_assert_eq!(old_t, old_m);
                }
                PairOp::Remove(k1, k2) => {
                    let old_t = t.delete(&k1, &k2).ok();
                    let old_m = m.remove(&(k1, k2));
                    prop_assert_eq!(old_t, old_m);
                }
                PairOp::Get(k1, k2) => {
                    let got_t = t.get(&k1, &k2).ok().copied();
                    prop_assert_eq!(t.contains(&k1, &k2), got_t.is_some());
                    let got_m = m.get(&(k1, k2)).copied();
                    prop_assert_eq!(got_t, got_m);
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_double_key(&t);
        let mut got: Vec<(String, String, u32)> = t
            .iter()
            .map(|(k1, k2, v)| (k1.to_owned(), k2.to_owned(), *v))
            .collect();
        got.sort();
        let mut expected: Vec<(String, String, u32)> = m
            .into_iter()
            .map(|((k1, k2), v)| (k1, k2, v))
            .collect();
        expected.sort();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_probe_table_equivalence(ops in prop::collection::vec(any::<ProbeOp>(), 0..=1000)) {
        let mut t: LinearProbeTable<u32> = LinearProbeTable::new();
        let mut m: HashMap<String, u32> = HashMap::new();

        for op in ops {
            match op {
                ProbeOp::Insert(key, value) => {
                    let old_t = t.set(key.as_str(), value).unwrap();
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                }
                ProbeOp::Remove(key) => {
                    prop_assert_eq!(t.delete(&key).ok(), m.remove(&key));
                }
                ProbeOp::Get(key) => {
                    prop_assert_eq!(t.get(&key).ok().copied(), m.get(&key).copied());
                }
            }

            prop_assert_eq!(t.len(), m.len());
            prop_assert!(t.len() * 2 <= t.capacity());
        }

        for (key, value) in &m {
            prop_assert_eq!(t.get(key), Ok(value));
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

const TRIE_KEYS: [&str; 6] = ["a", "b", "ab", "abc", "abd", "ba"];

#[test]
fn exhaustive_trie_insert_order_small_set() {
    for_each_permutation(&TRIE_KEYS, |perm| {
        let mut t: TrieHashTable<u64> = TrieHashTable::new();
        let mut m: BTreeMap<&str, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.set(k, v).unwrap(), m.insert(k, v));
        }

        validate_trie(&t);
        let got: Vec<(&str, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(&str, u64)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_trie_remove_order_small_set() {
    for_each_permutation(&TRIE_KEYS, |perm| {
        let mut t: TrieHashTable<u64> = TrieHashTable::new();
        let mut m: BTreeMap<&str, u64> = BTreeMap::new();
        for (i, k) in TRIE_KEYS.iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.set(*k, v).unwrap(), m.insert(*k, v));
        }

        for k in perm {
            assert_eq!(t.delete(k).ok(), m.remove(k));
            assert_eq!(t.len(), m.len());
            validate_trie(&t);
            for (other, v) in &m {
                assert_eq!(t.get(other), Ok(v));
            }
        }
        assert!(t.is_empty());
    });
}

#[test]
fn exhaustive_double_key_remove_order_small_set() {
    let pairs: [(&str, &str); 6] = [
        ("a", "x"),
        ("a", "y"),
        ("b", "x"),
        ("c", "z"),
        ("d", "w"),
        ("e", "v"),
    ];

    for_each_permutation(&pairs, |perm| {
        let mut t: DoubleKeyTable<usize> =
            DoubleKeyTable::with_sizes(vec![5, 13], Some(vec![5, 13])).unwrap();
        let mut m: HashMap<(&str, &str), usize> = HashMap::new();
        for (i, (k1, k2)) in pairs.iter().enumerate() {
            t.set(*k1, *k2, i).unwrap();
            m.insert((*k1, *k2), i);
        }
        validate_double_key(&t);

        for (k1, k2) in perm {
            assert_eq!(t.delete(k1, k2).ok(), m.remove(&(k1, k2)));
            validate_double_key(&t);
            for ((o1, o2), v) in &m {
                assert_eq!(t.get(o1, o2), Ok(v));
            }
        }
        assert!(t.is_empty());
        assert_eq!(t.outer_len(), 0);
    });
}
