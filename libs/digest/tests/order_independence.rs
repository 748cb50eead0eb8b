//! Property tests: map entry order never changes the digest, sequence order
//! always does.

use proptest::prelude::*;
use tainers_digest::{hash, ConfigValue};

fn entries() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::btree_map("[A-Za-z_]{1,12}", any::<i64>(), 0..16)
        .prop_map(|m| m.into_iter().collect())
}

fn to_map(entries: &[(String, i64)]) -> ConfigValue {
    ConfigValue::map(entries.iter().map(|(k, v)| (k.clone(), *v)))
}

proptest! {
    #[test]
    fn map_order_is_irrelevant(
        (original, shuffled) in entries().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        prop_assert_eq!(hash(&to_map(&original)), hash(&to_map(&shuffled)));
    }

    #[test]
    fn nested_map_order_is_irrelevant(
        (original, shuffled) in entries().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let outer_a = ConfigValue::map([
            ("Image", ConfigValue::from("x")),
            ("Labels", to_map(&original)),
        ]);
        let outer_b = ConfigValue::map([
            ("Labels", to_map(&shuffled)),
            ("Image", ConfigValue::from("x")),
        ]);
        prop_assert_eq!(hash(&outer_a), hash(&outer_b));
    }

    #[test]
    fn sequence_order_is_relevant(a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(a != b);
        let forward = ConfigValue::from(vec![a, b]);
        let backward = ConfigValue::from(vec![b, a]);
        prop_assert_ne!(hash(&forward), hash(&backward));
    }

    #[test]
    fn repeated_hashing_is_stable(entries in entries()) {
        let value = to_map(&entries);
        prop_assert_eq!(hash(&value), hash(&value.clone()));
    }
}

#[test]
fn same_data_different_key_order_from_json() {
    let a: ConfigValue = serde_json::from_str(r#"{"Image":"x","Cmd":["a","b"]}"#).unwrap();
    let b: ConfigValue = serde_json::from_str(r#"{"Cmd":["a","b"],"Image":"x"}"#).unwrap();
    assert_eq!(hash(&a), hash(&b));
}
