// ABOUTME: Built-in request logging middleware recording method, path, status, and duration
// ABOUTME: Entries go to a RequestLog sink resolved from the registry under a well-known token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::{PipelineError, RegistryError};
use crate::pipeline::dispatcher::Next;
use crate::pipeline::middleware::Middleware;
use crate::pipeline::request::Request;
use crate::pipeline::response::Response;
use crate::registry::Resolver;

/// Registry token the [`RequestLog`] sink is resolved under
pub const REQUEST_LOG_TOKEN: &str = "http.request-log";

/// One recorded request
#[derive(Debug, Clone)]
pub struct RequestLogEntry {
    /// Request method, lower case
    pub method: String,
    /// Request path
    pub path: String,
    /// Response status code
    pub status: u16,
    /// Wall-clock duration of the downstream chain in milliseconds
    pub duration_ms: u64,
    /// When the entry was recorded
    pub recorded_at: DateTime<Utc>,
}

/// In-memory sink for request log entries
///
/// Registered process-wide (typically in the root registry) so entries from
/// all runs accumulate in one place.
#[derive(Debug, Default)]
pub struct RequestLog {
    entries: Mutex<Vec<RequestLogEntry>>,
}

impl RequestLog {
    /// Creates an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, entry: RequestLogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Snapshot of all recorded entries
    #[must_use]
    pub fn entries(&self) -> Vec<RequestLogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Middleware recording one [`RequestLogEntry`] per served request
pub struct RequestLogMiddleware {
    log: Arc<RequestLog>,
}

impl RequestLogMiddleware {
    /// Creates the middleware with an explicit sink
    #[must_use]
    pub fn new(log: Arc<RequestLog>) -> Self {
        Self { log }
    }

    /// Factory resolving the sink from the registry under
    /// [`REQUEST_LOG_TOKEN`]
    ///
    /// # Errors
    ///
    /// Fails if no sink is registered.
    pub fn from_registry(resolver: &Resolver<'_>) -> Result<Self, RegistryError> {
        Ok(Self::new(resolver.resolve(REQUEST_LOG_TOKEN)?))
    }
}

#[async_trait]
impl Middleware for RequestLogMiddleware {
    async fn serve(
        &self,
        request: &Request,
        response: Response,
        next: Next<'_>,
    ) -> Result<Response, PipelineError> {
        let started = Instant::now();
        let response = next.run(response).await?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            request_id = request.id(),
            method = request.method(),
            path = request.path(),
            status = response.status(),
            duration_ms,
            "request served"
        );

        self.log.record(RequestLogEntry {
            method: request.method().to_owned(),
            path: request.path().to_owned(),
            status: response.status(),
            duration_ms,
            recorded_at: Utc::now(),
        });

        Ok(response)
    }
}
