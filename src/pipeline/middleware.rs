// ABOUTME: Middleware and handler traits plus the startup-time middleware declaration list
// ABOUTME: Declarations are ordered by explicit integer order, duplicate orders are a setup error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{PipelineError, RegistryError};
use crate::pipeline::dispatcher::Next;
use crate::pipeline::request::Request;
use crate::pipeline::response::Response;
use crate::registry::{Registry, Resolver};

/// A unit in the request pipeline
///
/// Call `next.run(response)` to let the chain proceed to the next middleware
/// or the terminal handler, or return a response without calling `next` to
/// short-circuit the remainder of the chain.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Middleware handler
    async fn serve(
        &self,
        request: &Request,
        response: Response,
        next: Next<'_>,
    ) -> Result<Response, PipelineError>;
}

/// Terminal request handler invoked after all middlewares ran
#[async_trait]
pub trait Handler: Send + Sync {
    /// Produces the response for the request
    async fn handle(&self, request: &Request, response: Response)
        -> Result<Response, PipelineError>;
}

/// Declaration for one middleware in the pipeline
#[derive(Debug, Clone)]
pub struct MiddlewareDeclaration {
    /// Registry token the middleware instance is resolved under
    pub token: String,
    /// Position in the chain; middlewares execute in ascending order
    pub order: i32,
}

/// Startup-time list of middleware declarations
///
/// Filled by explicit registration calls at process setup; registration
/// order is irrelevant, only `order` matters. Duplicate order values are
/// rejected when the [`Pipeline`](crate::pipeline::Pipeline) is built,
/// before any request is dispatched.
#[derive(Debug, Default)]
pub struct MiddlewareRegistry {
    declarations: Vec<MiddlewareDeclaration>,
}

impl MiddlewareRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a middleware under `token` at the given order
    pub fn register(&mut self, token: impl Into<String>, order: i32) -> &mut Self {
        self.declarations.push(MiddlewareDeclaration {
            token: token.into(),
            order,
        });
        self
    }

    /// The registered declarations, in registration order
    #[must_use]
    pub fn declarations(&self) -> &[MiddlewareDeclaration] {
        &self.declarations
    }

    pub(crate) fn into_ordered(mut self) -> Result<Vec<MiddlewareDeclaration>, PipelineError> {
        self.declarations.sort_by_key(|declaration| declaration.order);

        for pair in self.declarations.windows(2) {
            if pair[0].order == pair[1].order {
                return Err(PipelineError::DuplicateOrder {
                    first: pair[0].token.clone(),
                    second: pair[1].token.clone(),
                    order: pair[0].order,
                });
            }
        }

        Ok(self.declarations)
    }
}

/// Registers a middleware factory under `token`
///
/// The factory runs once per request, immediately before the middleware
/// executes, against the per-run context registry. It resolves the
/// middleware's own dependencies through the given resolver.
pub fn register_middleware<M, F>(registry: &Registry, token: &str, factory: F)
where
    M: Middleware + 'static,
    F: Fn(&Resolver<'_>) -> Result<M, RegistryError> + Send + Sync + 'static,
{
    registry.register_factory(token, move |resolver| {
        Ok(Arc::new(factory(resolver)?) as Arc<dyn Middleware>)
    });
}

/// Registers a terminal handler factory under `token`
///
/// Resolved after all middlewares ran, so registrations they made in the
/// per-run context are visible to the handler.
pub fn register_handler<H, F>(registry: &Registry, token: &str, factory: F)
where
    H: Handler + 'static,
    F: Fn(&Resolver<'_>) -> Result<H, RegistryError> + Send + Sync + 'static,
{
    registry.register_factory(token, move |resolver| {
        Ok(Arc::new(factory(resolver)?) as Arc<dyn Handler>)
    });
}
