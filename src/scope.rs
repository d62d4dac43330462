// ABOUTME: Continuation-local key/value storage scoped to an asynchronous call chain
// ABOUTME: Foundation for per-request isolation of registry and transaction state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

//! Continuation-local storage
//!
//! A [`ScopeStore`] carries a key/value map through an asynchronous call chain
//! without explicit parameter threading. [`ScopeStore::run`] executes a future
//! such that any code within its dynamic extent observes exactly that store
//! via [`ScopeStore::current`], across every `.await` point. Nested and
//! concurrent runs never interfere: `current` always reflects the nearest
//! enclosing run along the actual causal chain of the calling code.
//!
//! ```
//! # use armature::scope::ScopeStore;
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = ScopeStore::new();
//! store.insert("request.user", "alice".to_owned());
//!
//! store
//!     .run(async {
//!         let current = ScopeStore::current().unwrap();
//!         assert_eq!(*current.get::<String>("request.user").unwrap(), "alice");
//!     })
//!     .await;
//!
//! assert!(!ScopeStore::is_active());
//! # }
//! ```
//!
//! The store is bound to the awaited future tree. A task started with
//! `tokio::spawn` begins a new causal root and does NOT inherit the store;
//! callers that fan out re-scope explicitly by calling `run` inside the
//! spawned future.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;

tokio::task_local! {
    static CURRENT_STORE: ScopeStore;
}

type Entries = DashMap<String, Arc<dyn Any + Send + Sync>>;

/// Continuation-local key/value store
///
/// Cloning the handle shares the underlying entries; a run and the code
/// executing inside it mutate the same map.
#[derive(Clone, Default)]
pub struct ScopeStore {
    entries: Arc<Entries>,
}

impl ScopeStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes `future` with this store bound as the current scope
    ///
    /// Errors and panics from `future` propagate to the caller unchanged;
    /// `run` adds nothing but the context-propagation effect. The store
    /// handle is captured eagerly, so the returned future does not borrow
    /// `self`.
    pub fn run<F>(&self, future: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        CURRENT_STORE.scope(self.clone(), future)
    }

    /// Synchronous variant of [`run`](Self::run) for non-async callers
    pub fn run_sync<F, R>(&self, callback: F) -> R
    where
        F: FnOnce() -> R,
    {
        CURRENT_STORE.sync_scope(self.clone(), callback)
    }

    /// Returns the store of the nearest enclosing run, or `None` outside any run
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT_STORE.try_with(Clone::clone).ok()
    }

    /// Whether the calling code executes inside a [`run`](Self::run)
    #[must_use]
    pub fn is_active() -> bool {
        CURRENT_STORE.try_with(|_| ()).is_ok()
    }

    /// Stores `value` under `key`, replacing any previous entry
    pub fn insert<T>(&self, key: impl Into<String>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.entries.insert(key.into(), Arc::new(value));
    }

    /// Returns the entry for `key` if present and of type `T`
    #[must_use]
    pub fn get<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let entry = self.entries.get(key)?;
        Arc::clone(entry.value()).downcast::<T>().ok()
    }

    /// Returns the entry for `key`, inserting the result of `init` if absent
    ///
    /// Insertion is atomic per key. Returns `None` only if the existing entry
    /// under `key` holds a value of a different type than `T`.
    pub fn get_or_insert_with<T>(&self, key: &str, init: impl FnOnce() -> T) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let entry = self
            .entries
            .entry(key.to_owned())
            .or_insert_with(|| Arc::new(init()) as Arc<dyn Any + Send + Sync>);
        Arc::clone(entry.value()).downcast::<T>().ok()
    }

    /// Whether an entry exists under `key`
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl fmt::Debug for ScopeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}
