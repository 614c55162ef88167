// Property tests shared by both maps.
//
// Model: a std HashMap mirrors every put/remove/clear; resize must not
// change it. After every operation:
//  - len() equals the model's size and every model key reads back its value;
//  - capacity() is prime;
//  - empty_buckets() accounts for every bucket not holding a pair.
#![allow(clippy::missing_docs_in_private_items, clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};

use primemap::{ChainedMap, OpenAddressingMap, StringMap, is_prime, positional_hash};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Put(String, i32),
    Remove(String),
    Resize(usize),
    Clear,
}

// Short keys over a tiny alphabet so collisions and repeats are common.
fn key() -> impl Strategy<Value = String> {
    "[a-d]{0,3}"
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (key(), any::<i32>()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => key().prop_map(Op::Remove),
        1 => (0usize..120).prop_map(Op::Resize),
        1 => Just(Op::Clear),
    ]
}

fn check_against_model<M: StringMap<i32>>(
    map: &M,
    model: &HashMap<String, i32>,
) -> Result<(), TestCaseError> {
    prop_assert_eq!(map.len(), model.len());
    prop_assert!(is_prime(map.capacity()));
    for (k, v) in model {
        prop_assert_eq!(map.get(k), Some(v));
    }
    let mut exported = map.export_entries();
    exported.sort();
    let mut expected: Vec<(String, i32)> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
    expected.sort();
    prop_assert_eq!(exported, expected);
    Ok(())
}

fn apply<M: StringMap<i32>>(map: &mut M, model: &mut HashMap<String, i32>, op: Op) {
    match op {
        Op::Put(k, v) => {
            let expected = model.insert(k.clone(), v);
            assert_eq!(map.put(k, v), expected);
        }
        Op::Remove(k) => {
            let expected = model.remove(&k);
            assert_eq!(map.remove(&k), expected);
        }
        Op::Resize(n) => map.resize(n),
        Op::Clear => {
            model.clear();
            map.clear();
        }
    }
}

proptest! {
    #[test]
    fn prop_open_addressing_matches_model(ops in proptest::collection::vec(op(), 1..200)) {
        let mut map = OpenAddressingMap::new(3, positional_hash);
        let mut model = HashMap::new();
        for op in ops {
            apply(&mut map, &mut model, op);
            check_against_model(&map, &model)?;
            prop_assert_eq!(map.empty_buckets() + map.len(), map.capacity());
        }
    }

    #[test]
    fn prop_chained_matches_model(ops in proptest::collection::vec(op(), 1..200)) {
        let mut map = ChainedMap::new(3, positional_hash);
        let mut model = HashMap::new();
        for op in ops {
            apply(&mut map, &mut model, op);
            check_against_model(&map, &model)?;

            let occupied: HashSet<usize> =
                model.keys().map(|k| positional_hash(k) % map.capacity()).collect();
            prop_assert_eq!(map.empty_buckets() + occupied.len(), map.capacity());
        }
    }

    #[test]
    fn prop_open_addressing_grows_only_at_half_load(keys in proptest::collection::vec(key(), 1..150)) {
        let mut map = OpenAddressingMap::new(3, positional_hash);
        for (i, k) in keys.into_iter().enumerate() {
            let load_before = map.table_load();
            let capacity_before = map.capacity();
            map.put(k, i32::try_from(i).unwrap());
            prop_assert_eq!(map.capacity() > capacity_before, load_before >= 0.5);
        }
    }

    #[test]
    fn prop_chained_grows_only_when_full(keys in proptest::collection::vec(key(), 1..150)) {
        let mut map = ChainedMap::new(3, positional_hash);
        for (i, k) in keys.into_iter().enumerate() {
            let load_before = map.table_load();
            let capacity_before = map.capacity();
            map.put(k, i32::try_from(i).unwrap());
            prop_assert_eq!(map.capacity() > capacity_before, load_before >= 1.0);
        }
    }

    #[test]
    fn prop_capacity_is_prime_and_large_enough(requested in 0usize..5_000) {
        let open: OpenAddressingMap<i32> = OpenAddressingMap::with_capacity(requested);
        let chained: ChainedMap<i32> = ChainedMap::with_capacity(requested);
        prop_assert!(is_prime(open.capacity()) && open.capacity() >= requested);
        prop_assert!(is_prime(chained.capacity()) && chained.capacity() >= requested);
    }

    #[test]
    fn prop_resize_preserves_content(
        pairs in proptest::collection::vec((key(), any::<i32>()), 0..60),
        target in 1usize..300,
    ) {
        let mut open = OpenAddressingMap::new(7, positional_hash);
        let mut chained = ChainedMap::new(7, positional_hash);
        let mut model = HashMap::new();
        for (k, v) in pairs {
            open.put(k.clone(), v);
            chained.put(k.clone(), v);
            model.insert(k, v);
        }

        open.resize(target);
        chained.resize(target);

        check_against_model(&open, &model)?;
        check_against_model(&chained, &model)?;
        if target >= model.len() {
            prop_assert!(open.capacity() >= target);
        }
        prop_assert!(chained.capacity() >= target);
    }

    #[test]
    fn prop_tombstone_lifecycle(k in key(), v1 in any::<i32>(), v2 in any::<i32>(), others in proptest::collection::vec(key(), 0..20)) {
        let mut map = OpenAddressingMap::new(11, positional_hash);
        for other in others.iter().filter(|other| **other != k) {
            map.put(other.clone(), 0);
        }
        let size = map.len();

        map.put(k.clone(), v1);
        map.remove(&k);
        prop_assert!(!map.contains_key(&k));
        prop_assert_eq!(map.get(&k), None);
        prop_assert_eq!(map.len(), size);

        prop_assert_eq!(map.put(k.clone(), v2), None);
        prop_assert!(map.contains_key(&k));
        prop_assert_eq!(map.get(&k), Some(&v2));
        prop_assert_eq!(map.len(), size + 1);
    }
}
