// ABOUTME: Structured logging setup installing a tracing subscriber from configuration
// ABOUTME: Supports json, pretty, and compact output with env-filter overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

//! Structured logging configuration
//!
//! All runtime components log through `tracing`; this module wires a
//! `tracing-subscriber` formatter from a [`LoggingConfig`]. `RUST_LOG`
//! directives override the configured level when set.

use std::io;

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogLevel, RuntimeConfig};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format for production logging
    Json,
    /// Human-readable format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level emitted
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Derives logging settings from the runtime configuration
    ///
    /// Production environments log JSON, everything else pretty.
    #[must_use]
    pub fn for_runtime(config: &RuntimeConfig) -> Self {
        Self {
            level: config.log_level,
            format: if config.environment.is_production() {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
        }
    }

    /// Reads logging settings from `RUST_LOG` and `LOG_FORMAT`
    #[must_use]
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG")
            .map(|value| LogLevel::from_str_or_default(&value))
            .unwrap_or_default();

        let format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        Self { level, format }
    }

    /// Installs the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Fails if a global subscriber is already installed; test processes
    /// that share one subscriber should ignore that failure by installing
    /// once behind a `Once`.
    pub fn init(&self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()));

        let registry = tracing_subscriber::registry().with(filter);

        let installed = match self.format {
            LogFormat::Json => {
                let layer = fmt::layer()
                    .with_target(true)
                    .with_writer(io::stdout)
                    .json();
                registry.with(layer).try_init()
            }
            LogFormat::Pretty => {
                let layer = fmt::layer().with_target(true).with_writer(io::stdout);
                registry.with(layer).try_init()
            }
            LogFormat::Compact => {
                let layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stdout);
                registry.with(layer).try_init()
            }
        };

        installed.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
    }
}
