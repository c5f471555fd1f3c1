//! Tests for the transactional stores.

use std::collections::HashMap;

use bitweave::store::TxnMap;
use rand::Rng;

fn snapshot(map: &TxnMap<String, u32>) -> HashMap<String, u32> {
    map.entries().into_iter().collect()
}

#[test]
fn rollback_restores_randomized_mutation_sequences() {
    let mut rng = rand::rng();

    for _ in 0..50 {
        let map: TxnMap<String, u32> = TxnMap::new();
        for i in 0..rng.random_range(0..8) {
            map.set(format!("seed{i}"), rng.random());
        }
        let before = snapshot(&map);

        let mut txn = map.begin_transaction();
        for _ in 0..rng.random_range(1..20) {
            let key = format!("k{}", rng.random_range(0..10));
            match rng.random_range(0..3) {
                0 => map.set(key, rng.random()),
                1 => {
                    let _ = map.insert(key, rng.random());
                }
                _ => {
                    map.remove(&key);
                }
            }
        }
        txn.rollback().unwrap();

        assert_eq!(snapshot(&map), before);
    }
}

#[test]
fn nested_commit_inside_rolled_back_outer_is_undone() {
    let map: TxnMap<String, u32> = TxnMap::new();
    map.set("a".to_string(), 1);

    let mut outer = map.begin_transaction();
    let mut inner = map.begin_transaction();
    map.set("a".to_string(), 2);
    map.set("b".to_string(), 3);
    inner.commit().unwrap();
    assert_eq!(map.get(&"a".to_string()).unwrap(), 2);

    outer.rollback().unwrap();
    assert_eq!(map.get(&"a".to_string()).unwrap(), 1);
    assert!(!map.contains_key(&"b".to_string()));
}

#[test]
fn duplicate_insert_leaves_no_partial_mutation() {
    let map: TxnMap<String, u32> = TxnMap::new();
    map.insert("a".to_string(), 1).unwrap();
    let before = snapshot(&map);
    assert!(map.insert("a".to_string(), 9).is_err());
    assert_eq!(snapshot(&map), before);
}
