// ABOUTME: Ordered middleware dispatch over a terminal handler, one scope-store run per request
// ABOUTME: Catches all chain errors at the boundary and converts them to a generic failure response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::context;
use crate::errors::PipelineError;
use crate::pipeline::middleware::{
    Handler, Middleware, MiddlewareDeclaration, MiddlewareRegistry,
};
use crate::pipeline::request::Request;
use crate::pipeline::response::Response;
use crate::scope::ScopeStore;

/// The request pipeline
///
/// Built once at startup from a [`MiddlewareRegistry`] and a terminal
/// handler token; construction sorts the declarations ascending by order and
/// rejects duplicates. Middleware and handler instances are never
/// pre-instantiated: each is resolved fresh from the current context
/// registry immediately before it executes, so middlewares running earlier
/// in the chain can register values visible to everything resolved later in
/// the same run.
#[derive(Debug)]
pub struct Pipeline {
    middlewares: Vec<MiddlewareDeclaration>,
    handler_token: String,
}

impl Pipeline {
    /// Builds the pipeline, validating the middleware declarations
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DuplicateOrder`] if two middlewares declare
    /// the same order value. This is a startup-time configuration error; no
    /// request is dispatched through an invalid pipeline.
    pub fn new(
        middlewares: MiddlewareRegistry,
        handler_token: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            middlewares: middlewares.into_ordered()?,
            handler_token: handler_token.into(),
        })
    }

    /// Dispatches one request through the chain
    ///
    /// Starts a fresh scope-store run for the request, which gives it an
    /// isolated context registry. Always produces exactly one finalized
    /// response; errors from middlewares, the handler, or resolution are
    /// logged here and converted to a generic failure response, never
    /// surfaced to the transport layer as raw errors.
    pub async fn dispatch(&self, request: Request) -> Response {
        let store = ScopeStore::new();
        store.run(self.serve(request)).await
    }

    async fn serve(&self, request: Request) -> Response {
        let outcome = self.execute(&request).await;

        let mut response = match outcome {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    request_id = request.id(),
                    request = %request,
                    error = %err,
                    "failed to serve request"
                );
                Response::error(500, "unknown")
            }
        };

        if response.finalize().is_err() {
            // A pipeline stage finalized early; the response is already
            // immutable, which is all finalization guarantees.
            tracing::warn!(
                request_id = request.id(),
                "response was finalized before leaving the pipeline"
            );
        }

        response
    }

    async fn execute(&self, request: &Request) -> Result<Response, PipelineError> {
        let next = Next {
            remaining: &self.middlewares,
            handler_token: &self.handler_token,
            request,
        };
        next.run(Response::new()).await
    }
}

/// Continuation to the next pipeline stage
///
/// A middleware calls [`run`](Next::run) with the response it wants the
/// remainder of the chain to see, or returns without calling it to
/// short-circuit. The continuation for the last middleware resolves the
/// terminal handler.
pub struct Next<'a> {
    remaining: &'a [MiddlewareDeclaration],
    handler_token: &'a str,
    request: &'a Request,
}

impl<'a> Next<'a> {
    /// Advances to the next middleware, or the terminal handler once the
    /// chain is exhausted
    pub fn run(self, response: Response) -> BoxFuture<'a, Result<Response, PipelineError>> {
        Box::pin(async move {
            match self.remaining.split_first() {
                None => {
                    let registry = context::current();
                    let handler: Arc<dyn Handler> =
                        Arc::clone(&*registry.resolve::<Arc<dyn Handler>>(self.handler_token)?);
                    handler.handle(self.request, response).await
                }
                Some((declaration, rest)) => {
                    let registry = context::current();
                    let middleware: Arc<dyn Middleware> = Arc::clone(
                        &*registry.resolve::<Arc<dyn Middleware>>(&declaration.token)?,
                    );
                    tracing::debug!(
                        token = %declaration.token,
                        order = declaration.order,
                        "running middleware"
                    );
                    let next = Next {
                        remaining: rest,
                        handler_token: self.handler_token,
                        request: self.request,
                    };
                    middleware.serve(self.request, response, next).await
                }
            }
        })
    }
}
