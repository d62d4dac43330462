// ABOUTME: Execution context accessor returning the registry for the current causal scope
// ABOUTME: Root registry outside a run, lazily created per-run child registry inside one
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

//! Execution context accessor
//!
//! [`current`] is the single policy deciding which [`Registry`] "the current
//! context" is. Outside any [`ScopeStore`] run it returns the process-wide
//! root, so startup code transparently reaches process-wide bindings. Inside
//! a run, the first call creates a child of the root, caches it in the run's
//! scope store under [`CONTEXT_REGISTRY_KEY`], and every later call within
//! the same run returns that identical child. Two separate runs always get
//! distinct children, which is what isolates per-request registrations
//! (including the transactional connection handle) from each other.

use std::sync::Arc;

use crate::registry::Registry;
use crate::scope::ScopeStore;

/// Reserved scope-store key caching the per-run child registry
pub const CONTEXT_REGISTRY_KEY: &str = "core.context-registry";

/// Returns the registry for the current execution context
///
/// Exactly one child registry exists per scope-store run, created lazily on
/// first access and never recreated within that run.
#[must_use]
pub fn current() -> Arc<Registry> {
    let Some(store) = ScopeStore::current() else {
        return Registry::root();
    };

    if let Some(cached) = store.get::<Arc<Registry>>(CONTEXT_REGISTRY_KEY) {
        return Arc::clone(&*cached);
    }

    match store.get_or_insert_with(CONTEXT_REGISTRY_KEY, || Registry::root().create_child()) {
        Some(registry) => Arc::clone(&*registry),
        None => {
            // The reserved key held a foreign value. Replace it so the
            // single-instance-per-run invariant holds from here on.
            tracing::warn!(
                key = CONTEXT_REGISTRY_KEY,
                "scope store entry has unexpected type, replacing with fresh context registry"
            );
            let child = Registry::root().create_child();
            store.insert(CONTEXT_REGISTRY_KEY, Arc::clone(&child));
            child
        }
    }
}
