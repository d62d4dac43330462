// ABOUTME: Response value threaded through the middleware chain, freezable on finalize
// ABOUTME: Every mutator guards against writes to an already-finalized response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::errors::PipelineError;

/// Body payload of a [`Response`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseBody {
    /// No body set
    #[default]
    Empty,
    /// Plain-text body
    Text(String),
    /// JSON body
    Json(Value),
}

/// An outgoing response
///
/// Responses follow chain-of-responsibility semantics: each pipeline stage
/// may produce a new response value, and the dispatcher finalizes the one
/// that leaves the chain. Once finalized, any further mutation fails with
/// [`PipelineError::ResponseFrozen`].
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: Option<u16>,
    headers: HashMap<String, String>,
    body: ResponseBody,
    frozen: bool,
}

impl Response {
    /// Creates an empty, unfinalized response
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a response carrying a `{"error": <message>}` JSON body
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status: Some(status),
            headers: HashMap::from([(
                "content-type".to_owned(),
                "application/json".to_owned(),
            )]),
            body: ResponseBody::Json(json!({ "error": message })),
            frozen: false,
        }
    }

    /// Sets the status code
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::ResponseFrozen`] after finalization.
    pub fn set_status(&mut self, status: u16) -> Result<&mut Self, PipelineError> {
        self.guard()?;
        self.status = Some(status);
        Ok(self)
    }

    /// Sets a header, replacing any previous value
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::ResponseFrozen`] after finalization.
    pub fn set_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, PipelineError> {
        self.guard()?;
        let name: String = name.into();
        self.headers.insert(name.to_lowercase(), value.into());
        Ok(self)
    }

    /// Sets a JSON body and the matching content type
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::ResponseFrozen`] after finalization.
    pub fn json(&mut self, body: Value) -> Result<&mut Self, PipelineError> {
        self.guard()?;
        self.body = ResponseBody::Json(body);
        self.headers
            .insert("content-type".to_owned(), "application/json".to_owned());
        Ok(self)
    }

    /// Sets a plain-text body and the matching content type
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::ResponseFrozen`] after finalization.
    pub fn text(&mut self, body: impl Into<String>) -> Result<&mut Self, PipelineError> {
        self.guard()?;
        self.body = ResponseBody::Text(body.into());
        self.headers
            .insert("content-type".to_owned(), "text/plain".to_owned());
        Ok(self)
    }

    /// Finalizes the response; all further mutation fails
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineError::ResponseFrozen`] if already finalized.
    pub fn finalize(&mut self) -> Result<(), PipelineError> {
        self.guard()?;
        self.frozen = true;
        Ok(())
    }

    /// Status code, defaulting to 200 when none was set
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    /// Header value by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Response body
    #[must_use]
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// JSON body, if the body is JSON
    #[must_use]
    pub fn body_json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the response has been finalized
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn guard(&self) -> Result<(), PipelineError> {
        if self.frozen {
            return Err(PipelineError::ResponseFrozen);
        }
        Ok(())
    }
}
