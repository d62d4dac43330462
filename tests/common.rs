// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Quiet logging setup and full runtime state reset between cases
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

#![allow(dead_code)]

use std::sync::Once;

use armature::config::{Environment, LogLevel, RuntimeConfig};
use armature::logging::{LogFormat, LoggingConfig};
use armature::registry::Registry;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let level = match std::env::var("TEST_LOG").as_deref() {
            Ok(value) => LogLevel::from_str_or_default(value),
            Err(_) => LogLevel::Warn,
        };

        let _ = LoggingConfig {
            level,
            format: LogFormat::Compact,
        }
        .init();
    });
}

/// Resets all process-wide runtime state
///
/// Tests that touch the root registry call this first and run serially.
pub fn reset_runtime() {
    init_test_logging();
    Registry::reset_root();
}

/// A minimal valid runtime configuration for tests
pub fn test_config(default_backend: &str) -> RuntimeConfig {
    RuntimeConfig {
        environment: Environment::Development,
        log_level: LogLevel::Warn,
        default_transaction_backend: default_backend.to_owned(),
    }
}
