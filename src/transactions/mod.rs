// ABOUTME: Transactional unit-of-work coordinator wrapping work in begin/commit/rollback
// ABOUTME: Rollback failures are never suppressed, the original cause is re-surfaced otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

//! Transactional execution
//!
//! [`transactional`] runs a unit of work "inside a transaction" without the
//! caller managing begin/commit/rollback explicitly. The backend is located
//! by name (or the configured default) through the
//! [`TransactionBackendRegistry`] resolved from the current context; nothing
//! transaction-related is passed through the call stack.
//!
//! A [`TransactionBackend`] maintains the unit of work for one kind of
//! transactional resource. The coordinator threads the opaque [`TxState`]
//! returned by `begin` into `commit`/`rollback` as a local, never storing it
//! anywhere persistent. A concrete backend typically resolves its live
//! connection from [`context::current`](crate::context::current) in `begin`,
//! re-registers a derived transactional handle under the same token (a
//! per-run shadow), and restores the original handle in `commit` and
//! `rollback`, so application code resolving "the connection" transparently
//! gets the transactional one while inside the wrapped call.

pub mod registry;

use std::any::Any;
use std::fmt;
use std::future::Future;

use async_trait::async_trait;

use crate::errors::TransactionError;

pub use registry::TransactionBackendRegistry;

/// Opaque backend-defined state handle
///
/// Created by [`TransactionBackend::begin`], consumed by exactly one of
/// `commit` or `rollback` (plus `rollback` after a failed `commit`), never
/// reused afterward. Only the backend that produced a handle inspects it.
pub struct TxState(Box<dyn Any + Send + Sync>);

impl TxState {
    /// Wraps a backend-defined state value
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self(Box::new(value))
    }

    /// Borrows the state as `T`, if that is what the backend stored
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TxState").finish()
    }
}

/// A pluggable begin/commit/rollback implementation for one kind of
/// transactional resource
#[async_trait]
pub trait TransactionBackend: Send + Sync {
    /// Unique name of the underlying resource kind, e.g. `"relational"`
    ///
    /// Has to be unique across all backends registered in an application.
    fn type_name(&self) -> &str;

    /// Starts a transaction in the resource
    ///
    /// The returned state is passed to [`commit`](Self::commit) and
    /// [`rollback`](Self::rollback), allowing the backend to keep state
    /// between the transaction steps without polluting any shared storage.
    async fn begin(&self) -> anyhow::Result<TxState>;

    /// Commits the transaction
    ///
    /// If this fails, [`rollback`](Self::rollback) is invoked with a
    /// [`TransactionError`] wrapping the commit error.
    async fn commit(&self, state: &TxState) -> anyhow::Result<()>;

    /// Rolls the transaction back
    ///
    /// `error` wraps whatever aborted the transaction: the unit of work's
    /// error, or a failed commit's. A failure here propagates to the caller
    /// of the wrapped unit of work in place of that original error.
    async fn rollback(&self, error: &TransactionError, state: &TxState) -> anyhow::Result<()>;
}

/// Runs `work` inside a transaction on the named backend, or the configured
/// default when `backend_name` is `None`
///
/// `begin` always precedes the work, which always precedes exactly one of
/// `commit`/`rollback`. On success the work's return value is handed back;
/// on failure the original error is re-surfaced after rollback ran.
///
/// # Errors
///
/// - backend resolution failures surface before the work runs;
/// - a failing unit of work triggers rollback and is then re-surfaced
///   unchanged;
/// - a failing commit triggers rollback and the commit error is re-surfaced;
/// - a failing rollback propagates INSTEAD of the error that triggered it.
///   Rollback failures are never suppressed: a failed rollback means a
///   potentially inconsistent resource state that must not be hidden.
pub async fn transactional<T, F, Fut>(backend_name: Option<&str>, work: F) -> anyhow::Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let registry = TransactionBackendRegistry::current()?;
    let backend = match backend_name {
        Some(name) => registry.for_name(name)?,
        None => registry.default_backend()?,
    };

    tracing::debug!(backend = backend.type_name(), "beginning transaction");
    let state = backend.begin().await?;

    match work().await {
        Ok(value) => match backend.commit(&state).await {
            Ok(()) => Ok(value),
            Err(commit_error) => {
                tracing::warn!(
                    backend = backend.type_name(),
                    error = %commit_error,
                    "commit failed, rolling back"
                );
                let error = TransactionError::new(commit_error);
                backend.rollback(&error, &state).await?;
                Err(error.into_cause())
            }
        },
        Err(work_error) => {
            tracing::debug!(
                backend = backend.type_name(),
                error = %work_error,
                "unit of work failed, rolling back"
            );
            let error = TransactionError::new(work_error);
            backend.rollback(&error, &state).await?;
            Err(error.into_cause())
        }
    }
}
