// ABOUTME: Transport-agnostic request value passed by reference through the pipeline
// ABOUTME: Carries method, path, query parameters, JSON body, and a generated request id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use uuid::Uuid;

/// An incoming request as seen by middlewares and handlers
///
/// Immutable once constructed; middlewares that need to hand information to
/// later pipeline stages register it in the current context registry instead
/// of mutating the request.
#[derive(Debug, Clone)]
pub struct Request {
    id: String,
    method: String,
    path: String,
    query: HashMap<String, String>,
    body: Value,
}

impl Request {
    /// Creates a request with the given method and path
    ///
    /// The method is normalized to lower case. Every request gets a generated
    /// id used for log correlation.
    #[must_use]
    pub fn new(method: &str, path: impl Into<String>) -> Self {
        Self {
            id: format!("req_{}", Uuid::new_v4().simple()),
            method: method.to_lowercase(),
            path: path.into(),
            query: HashMap::new(),
            body: Value::Null,
        }
    }

    /// Sets the request body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Adds a query parameter
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Generated request id (`req_<uuid>`)
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Request method, lower case
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request path
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameter by name
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Request body
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[http request: {} {}]", self.method, self.path)
    }
}
