// ABOUTME: Ordered request-processing pipeline: middleware chain over a terminal handler
// ABOUTME: Per-run instantiation from the context registry, short-circuiting, response freezing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

//! Request pipeline
//!
//! A [`Pipeline`] dispatches `(request, response)` pairs through an ordered
//! chain of [`Middleware`] and a terminal [`Handler`]. Each middleware is
//! resolved fresh from the current context registry immediately before it
//! executes, may register values for later stages, and either calls the
//! [`Next`] continuation to proceed or returns a response directly to
//! short-circuit. The dispatcher never leaks raw errors to the transport:
//! failures become a generic `500 {"error":"unknown"}` response.

pub mod dispatcher;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod response;

pub use dispatcher::{Next, Pipeline};
pub use logging::{RequestLog, RequestLogEntry, RequestLogMiddleware, REQUEST_LOG_TOKEN};
pub use middleware::{
    register_handler, register_middleware, Handler, Middleware, MiddlewareDeclaration,
    MiddlewareRegistry,
};
pub use request::Request;
pub use response::{Response, ResponseBody};
