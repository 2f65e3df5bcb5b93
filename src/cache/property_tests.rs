//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key derivation, freshness and statistics over
//! generated inputs.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::{derive_key, CacheEntry, CacheManager, KeyGenerator};
use crate::config::CacheConfig;
use crate::store::LocalStore;

// == Strategies ==
/// Generates arbitrary JSON values a few levels deep.
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z0-9 ]{0,12}".prop_map(Value::String),
    ];

    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,15}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Structurally equal argument lists map to the same key, including after
    // a trip through their serialized form.
    #[test]
    fn prop_key_determinism(
        name in name_strategy(),
        args in prop::collection::vec(json_value_strategy(), 0..5)
    ) {
        let reparsed: Vec<Value> =
            serde_json::from_str(&serde_json::to_string(&args).unwrap()).unwrap();

        prop_assert_eq!(derive_key(&name, &args), derive_key(&name, &args.clone()));
        prop_assert_eq!(derive_key(&name, &args), derive_key(&name, &reparsed));
    }

    // Field insertion order never changes the key.
    #[test]
    fn prop_key_ignores_field_order(
        fields in prop::collection::btree_map("[a-z]{1,8}", json_value_strategy(), 1..8)
    ) {
        let forward: Map<String, Value> =
            fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let backward: Map<String, Value> =
            fields.iter().rev().map(|(k, v)| (k.clone(), v.clone())).collect();

        prop_assert_eq!(
            derive_key("f", &[Value::Object(forward)]),
            derive_key("f", &[Value::Object(backward)])
        );
    }

    // Arguments at skipped positions never influence the key.
    #[test]
    fn prop_skip_args_equivalence(
        a in json_value_strategy(),
        b1 in json_value_strategy(),
        b2 in json_value_strategy()
    ) {
        let keys = KeyGenerator::default();
        // Keep the explicit-key path out of play
        prop_assume!(keys.explicit_key(&a).is_none());

        prop_assert_eq!(
            keys.key_for("f", &[a.clone(), b1], &[1]),
            keys.key_for("f", &[a, b2], &[1])
        );
    }

    // Distinct labels keep otherwise equal calls apart.
    #[test]
    fn prop_label_separates_keys(
        first in name_strategy(),
        second in name_strategy(),
        args in prop::collection::vec(json_value_strategy(), 0..3)
    ) {
        prop_assume!(first != second);
        prop_assert_ne!(derive_key(&first, &args), derive_key(&second, &args));
    }

    // An entry exactly `expiry` seconds old is a hit, one millisecond older
    // is a miss.
    #[test]
    fn prop_freshness_boundary(
        expiry in 1u64..100_000,
        now in 1_000_000_000_000i64..2_000_000_000_000i64,
        value in json_value_strategy()
    ) {
        let window = expiry as i64 * 1000;

        let at_limit = CacheEntry::stamped(value.clone(), now - window);
        let past_limit = CacheEntry::stamped(value.clone(), now - window - 1);
        let just_written = CacheEntry::stamped(value, now);

        prop_assert!(at_limit.is_fresh_at(now, expiry));
        prop_assert!(!past_limit.is_fresh_at(now, expiry));
        prop_assert!(just_written.is_fresh_at(now, expiry));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // Every call counts exactly once: a hit when its argument was seen
    // before, a miss otherwise.
    #[test]
    fn prop_statistics_accuracy(calls in prop::collection::vec(0u8..6, 1..40)) {
        let manager = CacheManager::with_store(
            Arc::new(LocalStore::new(100, None)),
            &CacheConfig::default(),
        );
        let wrapped = manager.wrap("square", |args| async move {
            let n = args.first().and_then(Value::as_i64).unwrap_or(0);
            Ok(Some(json!(n * n)))
        });

        let mut seen = HashSet::new();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for n in calls {
            if seen.insert(n) {
                expected_misses += 1;
            } else {
                expected_hits += 1;
            }

            let result = tokio_test::block_on(wrapped.call(vec![json!(n)])).unwrap();
            prop_assert_eq!(result, Some(json!(i64::from(n) * i64::from(n))));
        }

        let stats = manager.stats();
        prop_assert_eq!(stats.hit, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.miss, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.reset, 0);
    }
}

