use super::skiplist::SkipList;
use crate::options::SkipListOptions;

use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Put(Vec<u8>, u64),
    Remove(Vec<u8>),
    Get(Vec<u8>),
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // Small alphabet and short keys so puts, overwrites and removes collide often
    prop::collection::vec(prop::sample::select(vec![0u8, b'a', b'b', b'z', 0xFF]), 0..=4)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Put(k, v)),
        30 => key.clone().prop_map(Op::Remove),
        20 => key.prop_map(Op::Get),
    ];
    prop::collection::vec(op, 0..=500)
}

fn options_strategy() -> impl Strategy<Value = SkipListOptions> {
    (1usize..=16, 0.05f64..0.95, any::<u64>()).prop_map(|(max_level, p, seed)| {
        SkipListOptions::default()
            .with_max_level(max_level)
            .with_promotion_probability(p)
            .with_seed(seed)
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_btreemap(opts in options_strategy(), ops in ops_strategy()) {
        let max_level = opts.max_level;
        let mut sl: SkipList<u64> = SkipList::with_options(opts).unwrap();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Put(key, value) => {
                    let old_sl = sl.put(key.clone(), value);
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_sl, old_m);
                }
                Op::Remove(key) => {
                    let old_sl = sl.remove(&key);
                    let old_m = m.remove(key.as_slice());
                    prop_assert_eq!(old_sl, old_m);
                }
                Op::Get(key) => {
                    prop_assert_eq!(sl.get(&key).copied(), m.get(key.as_slice()).copied());
                }
            }

            prop_assert_eq!(sl.len(), m.len());
            prop_assert!(sl.height() <= max_level);
        }

        sl.validate();
        let got: Vec<(Vec<u8>, u64)> = sl.iter().map(|(k, v)| (k.to_vec(), *v)).collect();
        let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_structure_valid_after_every_op(ops in ops_strategy()) {
        let mut sl: SkipList<u64> =
            SkipList::with_options(SkipListOptions::default().with_seed(11)).unwrap();

        for op in ops {
            match op {
                Op::Put(key, value) => { sl.put(key, value); }
                Op::Remove(key) => { sl.remove(&key); }
                Op::Get(key) => { sl.get(&key); }
            }
            sl.validate();
        }
    }
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<Vec<u8>> = vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"c".to_vec(),
        b"aa".to_vec(),
        b"ab".to_vec(),
    ];

    // Remove in every rotation of the key order from a fresh list each time
    for start in 0..keys.len() {
        let mut sl: SkipList<usize> =
            SkipList::with_options(SkipListOptions::default().with_seed(start as u64)).unwrap();
        for (i, k) in keys.iter().enumerate() {
            sl.put(k.clone(), i);
        }
        sl.validate();

        for step in 0..keys.len() {
            let idx = (start + step) % keys.len();
            assert_eq!(sl.remove(&keys[idx]), Some(idx));
            assert_eq!(sl.get(&keys[idx]), None);
            sl.validate();
        }
        assert!(sl.is_empty());
        assert_eq!(sl.height(), 1);
    }
}
