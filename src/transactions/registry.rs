// ABOUTME: Name-keyed registry of transaction backends with a configured default
// ABOUTME: Installed into the root registry and located through the current context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::config::RuntimeConfig;
use crate::context;
use crate::errors::TransactionRegistryError;
use crate::transactions::TransactionBackend;

/// Registry of available [`TransactionBackend`]s
///
/// Backends register themselves at startup under their
/// [`type_name`](TransactionBackend::type_name); duplicates are a startup
/// error. The default backend name comes from configuration.
pub struct TransactionBackendRegistry {
    backends: DashMap<String, Arc<dyn TransactionBackend>>,
    default_backend: String,
}

impl TransactionBackendRegistry {
    /// Registry token the installed instance is resolved under
    pub const TOKEN: &'static str = "core.transaction-backend-registry";

    /// Creates a registry with the given default backend name
    #[must_use]
    pub fn new(default_backend: impl Into<String>) -> Self {
        Self {
            backends: DashMap::new(),
            default_backend: default_backend.into(),
        }
    }

    /// Creates a registry with the default backend from configuration
    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.default_transaction_backend.clone())
    }

    /// Installs this registry into the given dependency registry under
    /// [`TOKEN`](Self::TOKEN)
    ///
    /// Install into the root registry at startup; afterwards the coordinator
    /// reaches it through [`current`](Self::current).
    pub fn install(self, registry: &crate::registry::Registry) {
        registry.register_value(Self::TOKEN, self);
    }

    /// Resolves the installed registry from the current context
    ///
    /// # Errors
    ///
    /// Fails if no registry was installed.
    pub fn current() -> Result<Arc<Self>, TransactionRegistryError> {
        Ok(context::current().resolve::<Self>(Self::TOKEN)?)
    }

    /// Registers the given backend under its type name
    ///
    /// # Errors
    ///
    /// Returns [`TransactionRegistryError::DuplicateBackend`] if a backend
    /// with the same type name is already registered.
    pub fn register(
        &self,
        backend: Arc<dyn TransactionBackend>,
    ) -> Result<(), TransactionRegistryError> {
        let name = backend.type_name().to_owned();
        match self.backends.entry(name.clone()) {
            Entry::Occupied(_) => Err(TransactionRegistryError::DuplicateBackend(name)),
            Entry::Vacant(entry) => {
                tracing::debug!(backend = %name, "transaction backend registered");
                entry.insert(backend);
                Ok(())
            }
        }
    }

    /// Returns the backend registered under `name`
    ///
    /// # Errors
    ///
    /// Returns [`TransactionRegistryError::BackendMissing`] for unknown
    /// names.
    pub fn for_name(&self, name: &str) -> Result<Arc<dyn TransactionBackend>, TransactionRegistryError> {
        self.backends
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TransactionRegistryError::BackendMissing(name.to_owned()))
    }

    /// Returns the configured default backend
    ///
    /// # Errors
    ///
    /// Returns [`TransactionRegistryError::DefaultBackendMissing`] if the
    /// configured default is not registered.
    pub fn default_backend(&self) -> Result<Arc<dyn TransactionBackend>, TransactionRegistryError> {
        self.backends
            .get(&self.default_backend)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                TransactionRegistryError::DefaultBackendMissing(self.default_backend.clone())
            })
    }

    /// Name of the configured default backend
    #[must_use]
    pub fn default_backend_name(&self) -> &str {
        &self.default_backend
    }
}

impl std::fmt::Debug for TransactionBackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionBackendRegistry")
            .field("backends", &self.backends.len())
            .field("default_backend", &self.default_backend)
            .finish()
    }
}
