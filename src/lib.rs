// ABOUTME: Main library entry point for the armature application runtime
// ABOUTME: Scoped dependency injection, ordered middleware dispatch, transactional units of work
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

#![deny(unsafe_code)]

//! # Armature
//!
//! An in-process application runtime: a dependency registry with
//! hierarchical scoping, a per-request execution context that survives
//! asynchronous suspension points, an ordered request-processing pipeline,
//! and a transactional unit-of-work coordinator.
//!
//! ## Architecture
//!
//! - **scope**: continuation-local storage binding a key/value store to an
//!   asynchronous call chain
//! - **registry**: hierarchical token-to-binding resolver with a lazy
//!   process-wide root
//! - **context**: the "current registry" policy, root outside a run, cached
//!   per-run child inside one
//! - **pipeline**: ordered, short-circuit-capable middleware dispatch over a
//!   terminal handler
//! - **transactions**: begin/commit/rollback coordination against named
//!   backends, rollback failures never suppressed
//! - **config** / **logging**: typed startup configuration and structured
//!   logging setup
//!
//! ## Example
//!
//! ```rust,no_run
//! use armature::config::RuntimeConfig;
//! use armature::logging::LoggingConfig;
//! use armature::registry::Registry;
//! use armature::transactions::TransactionBackendRegistry;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = RuntimeConfig::from_env()?;
//!     LoggingConfig::for_runtime(&config).init()?;
//!
//!     let root = Registry::root();
//!     TransactionBackendRegistry::from_config(&config).install(&root);
//!
//!     Ok(())
//! }
//! ```
//!
//! One incoming unit of work flows as: a scope-store run is started; inside
//! it a fresh child registry is created and cached as the context for this
//! run; the pipeline dispatches through middleware, each resolved from the
//! per-run registry; the terminal handler may invoke code wrapped by the
//! transaction coordinator, which resolves the same per-run registry to
//! stash and restore the live transactional handle.

/// Typed runtime configuration and deep-path lookup
pub mod config;

/// Execution context accessor for the current registry
pub mod context;

/// Unified error types for the runtime
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Ordered request-processing pipeline
pub mod pipeline;

/// Hierarchical dependency registry
pub mod registry;

/// Continuation-local scope storage
pub mod scope;

/// Transactional unit-of-work coordination
pub mod transactions;
