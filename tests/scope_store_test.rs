// ABOUTME: Tests for continuation-local scope storage
// ABOUTME: Validates causal-chain isolation, nesting, and typed entry access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::time::Duration;

use armature::scope::ScopeStore;

#[tokio::test]
async fn store_is_visible_across_await_points() {
    common::init_test_logging();
    let store = ScopeStore::new();
    store.insert("answer", 42_u32);

    store
        .run(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            let current = ScopeStore::current().unwrap();
            assert_eq!(*current.get::<u32>("answer").unwrap(), 42);

            tokio::time::sleep(Duration::from_millis(1)).await;
            assert!(ScopeStore::is_active());
        })
        .await;
}

#[tokio::test]
async fn concurrent_runs_never_observe_each_other() {
    common::init_test_logging();
    let store_a = ScopeStore::new();
    let store_b = ScopeStore::new();

    let run_a = store_a.run(async {
        let current = ScopeStore::current().unwrap();
        current.insert("owner", "a".to_owned());
        tokio::time::sleep(Duration::from_millis(5)).await;
        (*current.get::<String>("owner").unwrap()).clone()
    });

    let run_b = store_b.run(async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        let current = ScopeStore::current().unwrap();
        assert!(
            current.get::<String>("owner").is_none(),
            "b must not see a's entry"
        );
        current.insert("owner", "b".to_owned());
        tokio::time::sleep(Duration::from_millis(5)).await;
        (*current.get::<String>("owner").unwrap()).clone()
    });

    let (value_a, value_b) = tokio::join!(run_a, run_b);
    assert_eq!(value_a, "a");
    assert_eq!(value_b, "b");
}

#[tokio::test]
async fn nested_runs_reflect_the_nearest_enclosing_store() {
    common::init_test_logging();
    let outer = ScopeStore::new();
    outer.insert("level", "outer".to_owned());

    outer
        .run(async {
            let inner = ScopeStore::new();
            inner.insert("level", "inner".to_owned());

            inner
                .run(async {
                    let current = ScopeStore::current().unwrap();
                    assert_eq!(*current.get::<String>("level").unwrap(), "inner");
                })
                .await;

            // Back in the outer run after the inner chain unwound
            let current = ScopeStore::current().unwrap();
            assert_eq!(*current.get::<String>("level").unwrap(), "outer");
        })
        .await;
}

#[tokio::test]
async fn outside_any_run_the_store_is_absent() {
    common::init_test_logging();
    assert!(ScopeStore::current().is_none());
    assert!(!ScopeStore::is_active());
}

#[tokio::test]
async fn run_propagates_the_callback_result_and_errors_unchanged() {
    common::init_test_logging();
    let store = ScopeStore::new();

    let ok: Result<u32, String> = store.run(async { Ok(7) }).await;
    assert_eq!(ok.unwrap(), 7);

    let err: Result<u32, String> = store.run(async { Err("boom".to_owned()) }).await;
    assert_eq!(err.unwrap_err(), "boom");
}

#[test]
fn run_sync_scopes_the_store_for_synchronous_callers() {
    common::init_test_logging();
    let store = ScopeStore::new();
    store.insert("mode", "sync".to_owned());

    let seen = store.run_sync(|| {
        let current = ScopeStore::current().unwrap();
        (*current.get::<String>("mode").unwrap()).clone()
    });

    assert_eq!(seen, "sync");
    assert!(!ScopeStore::is_active());
}

#[test]
fn typed_access_and_atomic_insertion() {
    common::init_test_logging();
    let store = ScopeStore::new();

    let first = store.get_or_insert_with("counter", || 1_u32).unwrap();
    let second = store.get_or_insert_with("counter", || 2_u32).unwrap();
    assert_eq!(*first, 1);
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    // An entry of another type under the same key is not `u32`
    assert!(store.get::<String>("counter").is_none());
    assert!(store.get_or_insert_with("counter", String::new).is_none());

    assert!(store.contains_key("counter"));
    assert!(!store.contains_key("missing"));
}
