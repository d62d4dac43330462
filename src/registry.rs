// ABOUTME: Hierarchical dependency registry resolving token bindings child-first up to a process root
// ABOUTME: Supports value bindings, per-resolve factories with cycle detection, and child shadowing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

//! Hierarchical dependency registry
//!
//! A [`Registry`] maps string tokens to bindings. A binding is either a
//! concrete value or a factory invoked on every resolve. Any registry may
//! spawn a child whose lookups fall back to the parent on miss; child
//! registrations shadow parent bindings of the same token without mutating
//! the parent. Resolution order is child, parent, grandparent, up to the
//! root; the first match wins, and an unresolvable token is an error.
//!
//! Exactly one root registry exists for the process lifetime, created lazily
//! by [`Registry::root`]. [`Registry::reset_root`] discards it so tests can
//! start from a clean slate.
//!
//! Factories receive a [`Resolver`] bound to the registry the original
//! `resolve` call was made on, so a factory's own dependencies resolve
//! child-first through the same chain. The resolver carries the in-flight
//! token stack; a factory chain that resolves back into itself fails fast
//! with [`RegistryError::CyclicDependency`] instead of overflowing the stack.

use std::any::{self, Any};
use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use dashmap::DashMap;

use crate::errors::RegistryError;

type Erased = Arc<dyn Any + Send + Sync>;
type Constructor = dyn Fn(&Resolver<'_>) -> Result<Erased, RegistryError> + Send + Sync;

#[derive(Clone)]
enum Binding {
    Value(Erased),
    Factory(Arc<Constructor>),
}

/// Hierarchical token-to-binding container
pub struct Registry {
    bindings: DashMap<String, Binding>,
    parent: Option<Arc<Registry>>,
    weak: Weak<Registry>,
}

static ROOT: RwLock<Option<Arc<Registry>>> = RwLock::new(None);

fn read_root() -> RwLockReadGuard<'static, Option<Arc<Registry>>> {
    ROOT.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_root() -> RwLockWriteGuard<'static, Option<Arc<Registry>>> {
    ROOT.write().unwrap_or_else(PoisonError::into_inner)
}

impl Registry {
    fn with_parent(parent: Option<Arc<Registry>>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            bindings: DashMap::new(),
            parent,
            weak: weak.clone(),
        })
    }

    /// Creates a standalone registry with no parent
    ///
    /// Standalone registries are independent of the process-wide root; use
    /// them for self-contained wiring and tests. Request-scoped resolution
    /// goes through [`root`](Self::root) and its per-run children.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_parent(None)
    }

    /// Returns the process-wide root registry, creating it on first access
    ///
    /// The root is kept outside any scope-store run and never has a parent.
    /// Startup code registers process-wide bindings here; per-request code
    /// should go through [`context::current`](crate::context::current)
    /// instead, which returns a per-run child while a run is active.
    #[must_use]
    pub fn root() -> Arc<Self> {
        if let Some(existing) = read_root().as_ref() {
            return Arc::clone(existing);
        }

        let mut guard = write_root();
        Arc::clone(guard.get_or_insert_with(|| Self::with_parent(None)))
    }

    /// Discards the root registry so the next [`root`](Self::root) call
    /// creates a fresh one
    ///
    /// Part of the explicit init/reset lifecycle; tests call this between
    /// cases to fully reset process-wide state.
    pub fn reset_root() {
        write_root().take();
    }

    /// Creates a child registry whose lookups fall back to `self` on miss
    #[must_use]
    pub fn create_child(&self) -> Arc<Self> {
        Self::with_parent(self.weak.upgrade())
    }

    /// Registers `value` under `token`
    ///
    /// Re-registering a token in the same registry overwrites the previous
    /// binding, last write wins. This is the supported override mechanism
    /// for tests and mocking, not an error condition.
    pub fn register_value<T>(&self, token: impl Into<String>, value: T)
    where
        T: Send + Sync + 'static,
    {
        let token = token.into();
        if self
            .bindings
            .insert(token.clone(), Binding::Value(Arc::new(value)))
            .is_some()
        {
            tracing::debug!(token = %token, "binding overwritten");
        }
    }

    /// Registers an already-shared value under `token`
    ///
    /// Like [`register_value`](Self::register_value), but the caller keeps
    /// its handle to the value; resolution yields clones of the same `Arc`.
    pub fn register_arc<T>(&self, token: impl Into<String>, value: Arc<T>)
    where
        T: Send + Sync + 'static,
    {
        let token = token.into();
        if self
            .bindings
            .insert(token.clone(), Binding::Value(value))
            .is_some()
        {
            tracing::debug!(token = %token, "binding overwritten");
        }
    }

    /// Registers a factory invoked on every resolve of `token`
    ///
    /// Each resolve constructs a fresh instance; nothing is cached. The
    /// factory resolves its own dependencies through the given [`Resolver`].
    /// Last write wins on re-registration, same as
    /// [`register_value`](Self::register_value).
    pub fn register_factory<T, F>(&self, token: impl Into<String>, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<T, RegistryError> + Send + Sync + 'static,
    {
        let token = token.into();
        let constructor: Arc<Constructor> =
            Arc::new(move |resolver| Ok(Arc::new(factory(resolver)?) as Erased));
        if self
            .bindings
            .insert(token.clone(), Binding::Factory(constructor))
            .is_some()
        {
            tracing::debug!(token = %token, "binding overwritten");
        }
    }

    /// Resolves `token` against this registry chain
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnresolvedToken`] if no binding exists in the
    /// chain, [`RegistryError::TypeMismatch`] if the binding holds a value of
    /// another type, and [`RegistryError::CyclicDependency`] if factory
    /// resolution closes a cycle.
    pub fn resolve<T>(&self, token: &str) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
    {
        Resolver::new(self).resolve(token)
    }

    /// Whether `token` is bound anywhere in this registry chain
    #[must_use]
    pub fn is_registered(&self, token: &str) -> bool {
        self.find(token).is_some()
    }

    fn find(&self, token: &str) -> Option<Binding> {
        let mut current = Some(self);
        while let Some(registry) = current {
            if let Some(binding) = registry.bindings.get(token) {
                return Some(binding.clone());
            }
            current = registry.parent.as_deref();
        }
        None
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("bindings", &self.bindings.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// Per-call resolution handle passed to factories
///
/// Carries the registry the original resolve was made on and the in-flight
/// token stack used for cycle detection. Factories call
/// [`Resolver::resolve`] for each of their dependency tokens.
pub struct Resolver<'a> {
    origin: &'a Registry,
    stack: RefCell<Vec<String>>,
}

impl<'a> Resolver<'a> {
    fn new(origin: &'a Registry) -> Self {
        Self {
            origin,
            stack: RefCell::new(Vec::new()),
        }
    }

    /// Resolves `token` through the originating registry chain
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Registry::resolve`].
    pub fn resolve<T>(&self, token: &str) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
    {
        self.resolve_erased(token)?
            .downcast::<T>()
            .map_err(|_| RegistryError::TypeMismatch {
                token: token.to_owned(),
                expected: any::type_name::<T>(),
            })
    }

    fn resolve_erased(&self, token: &str) -> Result<Erased, RegistryError> {
        let binding = self
            .origin
            .find(token)
            .ok_or_else(|| RegistryError::UnresolvedToken {
                token: token.to_owned(),
            })?;

        match binding {
            Binding::Value(value) => Ok(value),
            Binding::Factory(constructor) => {
                {
                    let stack = self.stack.borrow();
                    if stack.iter().any(|entry| entry == token) {
                        let mut chain = stack.clone();
                        chain.push(token.to_owned());
                        return Err(RegistryError::CyclicDependency {
                            token: token.to_owned(),
                            chain,
                        });
                    }
                }

                self.stack.borrow_mut().push(token.to_owned());
                let constructed = constructor(self);
                self.stack.borrow_mut().pop();
                constructed
            }
        }
    }
}
