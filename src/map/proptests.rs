//! Property-based tests for map implementations using proptest
//!
//! Random operation sequences run against both a [`ConcurrentMap`] and a
//! `HashMap` model. Contents must always agree with the model, and the size
//! counter must follow the per-operation arithmetic exactly.

use super::*;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Set(u8, i32),
    Get(u8),
    GetOrZero(u8),
    Delete(u8),
    GetAndDelete(u8),
    GetOrSet(u8, i32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // A small key space keeps overwrites and absent deletes common
    let key = 0u8..16;
    prop_oneof![
        (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Set(k, v)),
        key.clone().prop_map(Op::Get),
        key.clone().prop_map(Op::GetOrZero),
        key.clone().prop_map(Op::Delete),
        key.clone().prop_map(Op::GetAndDelete),
        (key, any::<i32>()).prop_map(|(k, v)| Op::GetOrSet(k, v)),
    ]
}

proptest! {
    #[test]
    fn test_matches_model(
        stripes in 1usize..32,
        ops in prop::collection::vec(op_strategy(), 1..200)
    ) {
        let map: ConcurrentMap<u8, i32> = ConcurrentMap::with_stripes(stripes);
        let mut model: HashMap<u8, i32> = HashMap::new();
        let mut counter: isize = 0;

        for op in ops {
            match op {
                Op::Set(k, v) => {
                    map.set(k, v);
                    model.insert(k, v);
                    counter += 1;
                }
                Op::Get(k) => {
                    prop_assert_eq!(map.get(&k), model.get(&k).copied());
                }
                Op::GetOrZero(k) => {
                    prop_assert_eq!(map.get_or_zero(&k), model.get(&k).copied().unwrap_or(0));
                }
                Op::Delete(k) => {
                    map.delete(&k);
                    model.remove(&k);
                    counter -= 1;
                }
                Op::GetAndDelete(k) => {
                    let expected = model.remove(&k);
                    if expected.is_some() {
                        counter -= 1;
                    }
                    prop_assert_eq!(map.get_and_delete(&k), expected);
                }
                Op::GetOrSet(k, v) => {
                    let expected = match model.get(&k).copied() {
                        Some(existing) => (existing, true),
                        None => {
                            model.insert(k, v);
                            counter += 1;
                            (v, false)
                        }
                    };
                    prop_assert_eq!(map.get_or_set(k, v), expected);
                }
            }

            prop_assert_eq!(map.size(), counter);
        }

        prop_assert_eq!(map.count_entries(), model.len());
        prop_assert_eq!(map.is_empty(), model.is_empty());

        let mut visited = HashMap::new();
        map.range(|k, v| {
            visited.insert(*k, *v);
            true
        });
        prop_assert_eq!(visited, model);
    }

    #[test]
    fn test_range_stops_when_visitor_declines(
        keys in prop::collection::hash_set(any::<u32>(), 1..100),
        stop_after in 1usize..100
    ) {
        let map: ConcurrentMap<u32, u32> = keys.iter().map(|&k| (k, k)).collect();

        let mut visits = 0;
        map.range(|_, _| {
            visits += 1;
            visits < stop_after
        });

        prop_assert_eq!(visits, stop_after.min(keys.len()));
    }

    #[test]
    fn test_get_or_set_keeps_first_value(
        key in any::<String>(),
        first in any::<u64>(),
        rest in prop::collection::vec(any::<u64>(), 0..10)
    ) {
        let map: ConcurrentMap<String, u64> = ConcurrentMap::new();
        prop_assert_eq!(map.get_or_set(key.clone(), first), (first, false));

        for value in rest {
            prop_assert_eq!(map.get_or_set(key.clone(), value), (first, true));
        }

        prop_assert_eq!(map.get(key.as_str()), Some(first));
        prop_assert_eq!(map.size(), 1);
    }
}
