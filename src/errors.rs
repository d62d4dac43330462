// ABOUTME: Unified error types for the runtime: registry, pipeline, transaction, and config errors
// ABOUTME: Central thiserror-based taxonomy so every module fails with a distinguishable error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

//! Unified error handling for the runtime
//!
//! Errors fall into three buckets:
//! - configuration-time errors (duplicate middleware order, duplicate backend
//!   registration, missing default backend) fail fast at setup;
//! - resolution errors surface to whichever caller attempted the resolve;
//! - transactional errors surface the original cause to the caller of the
//!   wrapped unit of work, unless rollback itself fails, in which case the
//!   rollback error takes precedence.
//!
//! Pipeline dispatch errors never leave [`Pipeline::dispatch`](crate::pipeline::Pipeline::dispatch)
//! as raw errors; they are logged and converted to a generic failure response.

use std::fmt;

use thiserror::Error;

/// Errors raised by [`Registry`](crate::registry::Registry) resolution
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No binding exists for the token anywhere in the registry chain
    #[error("no binding registered for token \"{token}\"")]
    UnresolvedToken {
        /// The token that failed to resolve
        token: String,
    },

    /// A factory chain resolved back into itself
    #[error("cyclic dependency while resolving \"{token}\": {}", .chain.join(" -> "))]
    CyclicDependency {
        /// The token whose resolution closed the cycle
        token: String,
        /// The in-flight token chain, outermost first, ending in `token`
        chain: Vec<String>,
    },

    /// The binding exists but holds a value of a different type than requested
    #[error("binding for token \"{token}\" is not of the requested type {expected}")]
    TypeMismatch {
        /// The token that resolved to an unexpected type
        token: String,
        /// The requested Rust type
        expected: &'static str,
    },
}

/// Errors raised during pipeline setup and dispatch
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Two middlewares declare the same order value (startup-time error)
    #[error("two middlewares ({first}, {second}) have the same order {order} assigned")]
    DuplicateOrder {
        /// Token of the first offending declaration
        first: String,
        /// Token of the second offending declaration
        second: String,
        /// The duplicated order value
        order: i32,
    },

    /// The response has been finalized and can no longer be modified
    #[error("response has already been finalized")]
    ResponseFrozen,

    /// Middleware or handler resolution failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Application-level failure from a middleware or handler
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised while loading or traversing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An intermediate segment of a dot-separated lookup path does not exist
    #[error("path segment \"{segment}\" in \"{path}\" does not exist")]
    MissingPathSegment {
        /// The full lookup path
        path: String,
        /// The missing intermediate segment
        segment: String,
    },

    /// No default transaction backend declared in the configuration
    #[error("no default transaction backend declared")]
    MissingDefaultBackend,

    /// The environment value is not one of the known environments
    #[error("invalid value for environment: \"{0}\"")]
    InvalidEnvironment(String),

    /// The configuration value could not be deserialized into the schema
    #[error("configuration could not be deserialized: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Errors raised by the transaction backend registry
#[derive(Debug, Error)]
pub enum TransactionRegistryError {
    /// A backend was registered under a name already taken
    #[error("duplicate transaction backend registration for name \"{0}\"")]
    DuplicateBackend(String),

    /// The configured default backend does not exist at runtime
    #[error("the default transaction backend \"{0}\" does not exist")]
    DefaultBackendMissing(String),

    /// A backend was referenced by name but does not exist
    #[error("the transaction backend \"{0}\" does not exist")]
    BackendMissing(String),

    /// The registry itself could not be located in the current context
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Wraps the error that aborted a transactional unit of work
///
/// A [`TransactionBackend`](crate::transactions::TransactionBackend) receives
/// this wrapper in `rollback`; the coordinator recovers the original cause
/// from it afterwards and re-surfaces that to the caller, not the wrapper.
#[derive(Debug)]
pub struct TransactionError {
    cause: anyhow::Error,
}

impl TransactionError {
    /// Wraps the given cause
    #[must_use]
    pub fn new(cause: anyhow::Error) -> Self {
        Self { cause }
    }

    /// The underlying error that aborted the transaction
    #[must_use]
    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }

    /// Consumes the wrapper and returns the original cause
    #[must_use]
    pub fn into_cause(self) -> anyhow::Error {
        self.cause
    }
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transaction aborted: {}", self.cause)
    }
}

impl std::error::Error for TransactionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}
