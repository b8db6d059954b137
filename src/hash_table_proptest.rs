#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can reach the
// chain-walking helpers.

use crate::element::{element_eq, element_hash, Element};
use crate::hash_table::{HashTable, LOAD_FACTOR_THRESHOLD};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations so shrinking moves toward earlier keys and shorter
// op lists.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i64),
    Remove(usize),
    Lookup(usize),
    Mutate(usize, i64),
    Keys,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Element {
    Element::str(&pool[i])
}

fn model_key(pool: &[String], i: usize) -> String {
    pool[i].clone()
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => (idx.clone(), any::<i64>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Lookup),
            1 => (idx.clone(), -100i64..100).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Keys),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn check_against_model(
    sut: &mut HashTable,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i64> = HashMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let cap = sut.capacity();
                let prev = sut.insert(key_from(pool, i), Element::Int(v));
                let mprev = model.insert(model_key(pool, i), v);
                if mprev.is_some() {
                    prop_assert_eq!(sut.capacity(), cap, "overwrite must not grow");
                }
                prop_assert_eq!(prev, mprev.map(Element::Int));
            }
            OpI::Remove(i) => {
                let got = sut.remove(&key_from(pool, i));
                let want = model.remove(&model_key(pool, i));
                prop_assert_eq!(got, want.map(Element::Int));
            }
            OpI::Lookup(i) => {
                let got = sut.lookup(&key_from(pool, i)).cloned();
                let want = model.get(&model_key(pool, i)).copied();
                prop_assert_eq!(got, want.map(Element::Int));
                prop_assert_eq!(sut.has_key(&key_from(pool, i)), want.is_some());
            }
            OpI::Mutate(i, d) => {
                if let Some(Element::Int(v)) = sut.lookup_mut(&key_from(pool, i)) {
                    *v = v.saturating_add(d);
                }
                if let Some(v) = model.get_mut(&model_key(pool, i)) {
                    *v = v.saturating_add(d);
                }
            }
            OpI::Keys => {
                let s_keys: BTreeSet<String> = sut
                    .keys()
                    .iter()
                    .filter_map(|k| k.as_str().map(str::to_owned))
                    .collect();
                let m_keys: BTreeSet<String> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
                for v in model.values() {
                    prop_assert!(sut.has_value(&Element::Int(*v)));
                }
            }
            OpI::Clear => {
                let cap = sut.capacity();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.reachable_entries(), sut.len());
        prop_assert_eq!(sut.iter().count(), sut.len());
        prop_assert!(sut.load_factor() <= LOAD_FACTOR_THRESHOLD);
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - insert returns the overwritten value; last write wins; overwrites
//   never change capacity.
// - remove returns the stored value once, then nothing.
// - size tracking agrees with a full chain walk after every operation.
// - load never exceeds the threshold after an insert.
// - clear keeps capacity.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut = HashTable::new(element_hash, element_eq);
        check_against_model(&mut sut, &pool, ops)?;
    }
}

fn const_hash(_: &Element) -> u64 {
    0
}

// Property: same invariants with every key in one chain, which stresses
// predecessor search and splicing at the head, middle and tail.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut = HashTable::new(const_hash, element_eq);
        check_against_model(&mut sut, &pool, ops)?;
    }
}

// Property: starting from zero buckets behaves the same.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_from_zero_capacity((pool, ops) in arb_scenario()) {
        let mut sut = HashTable::with_capacity(0, element_hash, element_eq);
        check_against_model(&mut sut, &pool, ops)?;
    }
}
