// ABOUTME: Tests for pipeline construction and dispatch
// ABOUTME: Ordering, duplicate order rejection, short-circuiting, and the failure boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use armature::context;
use armature::errors::PipelineError;
use armature::pipeline::{
    register_handler, register_middleware, Handler, Middleware, MiddlewareRegistry, Next,
    Pipeline, Request, Response,
};
use armature::registry::Registry;
use async_trait::async_trait;
use serde_json::json;
use serial_test::serial;

/// Middleware recording its name before passing through
struct Recording {
    name: &'static str,
    sequence: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl Middleware for Recording {
    async fn serve(
        &self,
        _request: &Request,
        response: Response,
        next: Next<'_>,
    ) -> Result<Response, PipelineError> {
        self.sequence.lock().unwrap().push(self.name);
        next.run(response).await
    }
}

/// Middleware answering directly without calling `next`
struct Rejecting;

#[async_trait]
impl Middleware for Rejecting {
    async fn serve(
        &self,
        _request: &Request,
        mut response: Response,
        _next: Next<'_>,
    ) -> Result<Response, PipelineError> {
        response.set_status(403)?.json(json!({ "rejected": true }))?;
        Ok(response)
    }
}

/// Terminal handler echoing the request path
struct EchoHandler {
    invoked: Arc<AtomicBool>,
}

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(
        &self,
        request: &Request,
        mut response: Response,
    ) -> Result<Response, PipelineError> {
        self.invoked.store(true, Ordering::SeqCst);
        response.json(json!({ "echo": request.path() }))?;
        Ok(response)
    }
}

fn install_echo_handler(invoked: &Arc<AtomicBool>) {
    let invoked = Arc::clone(invoked);
    register_handler(&Registry::root(), "http.handler", move |_| {
        Ok(EchoHandler {
            invoked: Arc::clone(&invoked),
        })
    });
}

fn install_recording(token: &'static str, sequence: &Arc<Mutex<Vec<&'static str>>>) {
    let sequence = Arc::clone(sequence);
    register_middleware(&Registry::root(), token, move |_| {
        Ok(Recording {
            name: token,
            sequence: Arc::clone(&sequence),
        })
    });
}

#[tokio::test]
#[serial]
async fn middlewares_execute_in_ascending_order_regardless_of_registration() {
    common::reset_runtime();
    let sequence = Arc::new(Mutex::new(Vec::new()));
    let invoked = Arc::new(AtomicBool::new(false));

    install_recording("mw.five", &sequence);
    install_recording("mw.one", &sequence);
    install_recording("mw.three", &sequence);
    install_echo_handler(&invoked);

    let mut middlewares = MiddlewareRegistry::new();
    middlewares.register("mw.five", 5);
    middlewares.register("mw.one", 1);
    middlewares.register("mw.three", 3);

    let pipeline = Pipeline::new(middlewares, "http.handler").unwrap();
    let response = pipeline.dispatch(Request::new("GET", "/sequence")).await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        *sequence.lock().unwrap(),
        vec!["mw.one", "mw.three", "mw.five"]
    );
    assert!(invoked.load(Ordering::SeqCst));
}

#[test]
fn duplicate_orders_are_rejected_at_setup() {
    common::init_test_logging();
    let mut middlewares = MiddlewareRegistry::new();
    middlewares.register("mw.first", 2);
    middlewares.register("mw.second", 2);

    let err = Pipeline::new(middlewares, "http.handler").unwrap_err();
    match err {
        PipelineError::DuplicateOrder {
            first,
            second,
            order,
        } => {
            assert_eq!(order, 2);
            assert_eq!(first, "mw.first");
            assert_eq!(second, "mw.second");
        }
        other => panic!("expected duplicate order error, got {other}"),
    }
}

#[tokio::test]
#[serial]
async fn an_empty_chain_invokes_the_terminal_handler_directly() {
    common::reset_runtime();
    let invoked = Arc::new(AtomicBool::new(false));
    install_echo_handler(&invoked);

    let pipeline = Pipeline::new(MiddlewareRegistry::new(), "http.handler").unwrap();
    let response = pipeline.dispatch(Request::new("GET", "/bare")).await;

    assert!(invoked.load(Ordering::SeqCst));
    assert_eq!(response.body_json().unwrap(), &json!({ "echo": "/bare" }));
}

#[tokio::test]
#[serial]
async fn a_middleware_can_short_circuit_the_chain() {
    common::reset_runtime();
    let invoked = Arc::new(AtomicBool::new(false));
    install_echo_handler(&invoked);
    register_middleware(&Registry::root(), "mw.reject", |_| Ok(Rejecting));

    let mut middlewares = MiddlewareRegistry::new();
    middlewares.register("mw.reject", 0);

    let pipeline = Pipeline::new(middlewares, "http.handler").unwrap();
    let response = pipeline.dispatch(Request::new("POST", "/denied")).await;

    assert_eq!(response.status(), 403);
    assert_eq!(response.body_json().unwrap(), &json!({ "rejected": true }));
    assert!(!invoked.load(Ordering::SeqCst), "handler must not run");
}

#[tokio::test]
#[serial]
async fn values_registered_by_middleware_are_visible_to_the_handler() {
    common::reset_runtime();

    struct Tagging;

    #[async_trait]
    impl Middleware for Tagging {
        async fn serve(
            &self,
            _request: &Request,
            response: Response,
            next: Next<'_>,
        ) -> Result<Response, PipelineError> {
            context::current().register_value("request.user", "alice".to_owned());
            next.run(response).await
        }
    }

    struct UserHandler;

    #[async_trait]
    impl Handler for UserHandler {
        async fn handle(
            &self,
            _request: &Request,
            mut response: Response,
        ) -> Result<Response, PipelineError> {
            let user = context::current().resolve::<String>("request.user")?;
            response.json(json!({ "user": user.as_str() }))?;
            Ok(response)
        }
    }

    register_middleware(&Registry::root(), "mw.tag", |_| Ok(Tagging));
    register_handler(&Registry::root(), "http.handler", |_| Ok(UserHandler));

    let mut middlewares = MiddlewareRegistry::new();
    middlewares.register("mw.tag", 0);

    let pipeline = Pipeline::new(middlewares, "http.handler").unwrap();
    let response = pipeline.dispatch(Request::new("GET", "/whoami")).await;

    assert_eq!(response.body_json().unwrap(), &json!({ "user": "alice" }));
}

#[tokio::test]
#[serial]
async fn handler_errors_become_the_generic_failure_response() {
    common::reset_runtime();

    struct Failing;

    #[async_trait]
    impl Handler for Failing {
        async fn handle(
            &self,
            _request: &Request,
            _response: Response,
        ) -> Result<Response, PipelineError> {
            Err(anyhow::anyhow!("database unavailable").into())
        }
    }

    register_handler(&Registry::root(), "http.handler", |_| Ok(Failing));

    let pipeline = Pipeline::new(MiddlewareRegistry::new(), "http.handler").unwrap();
    let response = pipeline.dispatch(Request::new("GET", "/broken")).await;

    assert_eq!(response.status(), 500);
    assert_eq!(response.body_json().unwrap(), &json!({ "error": "unknown" }));
    assert!(response.is_frozen());
}

#[tokio::test]
#[serial]
async fn unresolvable_pipeline_stages_also_become_the_failure_response() {
    common::reset_runtime();

    let pipeline = Pipeline::new(MiddlewareRegistry::new(), "http.unregistered").unwrap();
    let response = pipeline.dispatch(Request::new("GET", "/nowhere")).await;

    assert_eq!(response.status(), 500);
    assert_eq!(response.body_json().unwrap(), &json!({ "error": "unknown" }));
}

#[tokio::test]
#[serial]
async fn dispatched_responses_are_finalized_exactly_once() {
    common::reset_runtime();
    let invoked = Arc::new(AtomicBool::new(false));
    install_echo_handler(&invoked);

    let pipeline = Pipeline::new(MiddlewareRegistry::new(), "http.handler").unwrap();
    let mut response = pipeline.dispatch(Request::new("GET", "/frozen")).await;

    assert!(response.is_frozen());
    assert!(matches!(
        response.set_status(404),
        Err(PipelineError::ResponseFrozen)
    ));
    assert!(matches!(
        response.json(json!({})),
        Err(PipelineError::ResponseFrozen)
    ));
    assert!(matches!(
        response.finalize(),
        Err(PipelineError::ResponseFrozen)
    ));
}

#[test]
fn requests_expose_their_normalized_surface() {
    common::init_test_logging();
    let request = Request::new("POST", "/accounts")
        .with_query("page", "2")
        .with_body(json!({ "name": "alice" }));

    assert!(request.id().starts_with("req_"));
    assert_eq!(request.method(), "post");
    assert_eq!(request.path(), "/accounts");
    assert_eq!(request.query("page"), Some("2"));
    assert_eq!(request.query("missing"), None);
    assert_eq!(request.body(), &json!({ "name": "alice" }));
    assert_eq!(request.to_string(), "[http request: post /accounts]");
}

#[test]
fn responses_guard_every_mutator_after_finalize() {
    common::init_test_logging();
    let mut response = Response::new();
    response.set_status(201).unwrap();
    response.set_header("x-request-id", "req_1").unwrap();
    response.text("created").unwrap();
    response.finalize().unwrap();

    assert_eq!(response.status(), 201);
    assert_eq!(response.header("X-Request-Id"), Some("req_1"));
    assert!(matches!(
        response.set_header("x-other", "nope"),
        Err(PipelineError::ResponseFrozen)
    ));
    assert!(matches!(
        response.text("overwritten"),
        Err(PipelineError::ResponseFrozen)
    ));
}
