// ABOUTME: Typed runtime configuration resolved once at startup
// ABOUTME: Environment, log level, and the default transaction backend name
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

//! Typed runtime configuration
//!
//! Configuration is resolved once at startup into [`RuntimeConfig`] and
//! validated eagerly; nothing downstream consults raw configuration values.
//! [`lookup::get_deep`] provides the dot-separated deep-path traversal for
//! callers that load configuration from nested JSON documents.

pub mod lookup;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::fmt;

use crate::errors::ConfigError;

/// Execution environment the application runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parses an environment name
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvironment`] for unknown names.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvironment(other.to_owned())),
        }
    }

    /// Whether this is the production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Converts to a `tracing` level
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parses from a string, falling back to `Info` for unknown values
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Execution environment
    pub environment: Environment,
    /// Log level for the runtime's structured logging
    #[serde(default)]
    pub log_level: LogLevel,
    /// Name of the transaction backend used when none is given explicitly
    pub default_transaction_backend: String,
}

impl RuntimeConfig {
    /// Deserializes and validates a configuration document
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Deserialize`] for schema mismatches and the
    /// validation errors of [`validate`](Self::validate).
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value.clone())?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from environment variables
    ///
    /// `ENVIRONMENT` (default `development`), `RUST_LOG` (default `info`),
    /// and `DEFAULT_TRANSACTION_BACKEND` (required).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvironment`] for an unknown
    /// `ENVIRONMENT` value and [`ConfigError::MissingDefaultBackend`] when
    /// `DEFAULT_TRANSACTION_BACKEND` is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("ENVIRONMENT") {
            Ok(value) => Environment::parse(&value)?,
            Err(_) => Environment::Development,
        };

        let log_level = env::var("RUST_LOG")
            .map(|value| LogLevel::from_str_or_default(&value))
            .unwrap_or_default();

        let default_transaction_backend = env::var("DEFAULT_TRANSACTION_BACKEND")
            .unwrap_or_default();

        let config = Self {
            environment,
            log_level,
            default_transaction_backend,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates invariants that the schema alone cannot express
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDefaultBackend`] when no default
    /// transaction backend is declared.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_transaction_backend.is_empty() {
            return Err(ConfigError::MissingDefaultBackend);
        }
        Ok(())
    }
}
