#[path = "../common/mod.rs"]
mod common;

use common::{TestService, closed_base_url};
use routescout::core::config::ScoutConfig;
use routescout::core::error::RouteScoutError;
use routescout::core::fallback::FallbackPolicy;
use routescout::core::registry::{EndpointRecord, EndpointRegistry};
use routescout::core::transport::{HttpResponse, HttpTransport, Transport, TransportError};
use routescout::plugins::engage::EngagementSession;
use std::sync::Mutex;

fn registry_of(paths: &[&str]) -> EndpointRegistry {
    paths.iter().map(|p| EndpointRecord::from_probe(*p)).collect()
}

fn fast_config() -> ScoutConfig {
    let mut config = ScoutConfig::default();
    config.retry = FallbackPolicy {
        attempts: 2,
        delay_ms: 0,
    };
    config
}

fn http() -> HttpTransport {
    HttpTransport::with_timeout_ms(2_000).unwrap()
}

#[test]
fn objective_selects_closest_path_and_reinforces_it() {
    let service = TestService::start(&[("/users", 200, "[\"ada\"]"), ("/orders", 200, "[]")]);
    let mut session = EngagementSession::new(
        http(),
        service.base_url(),
        registry_of(&["/users", "/orders"]),
        &fast_config(),
    );

    let first = session.intelligent_request("/users").unwrap();
    assert_eq!(first.path, "/users");
    assert_eq!(first.status, 200);
    assert_eq!(first.content.as_deref(), Some("[\"ada\"]"));
    assert_eq!(first.reinforced, Some(0));
    assert_eq!(session.usage_vector(), vec![1.0, 0.0]);

    let second = session.intelligent_request("/orders").unwrap();
    assert_eq!(second.path, "/orders");
    let usage = session.usage_vector();
    assert!((usage[0] - 0.9).abs() < 1e-12);
    assert!((usage[1] - 1.0).abs() < 1e-12);

    assert_eq!(service.hits(), vec!["/users", "/orders"]);
}

#[test]
fn long_bodies_are_previewed() {
    let body = "z".repeat(800);
    let service = TestService::start(&[("/reports", 200, body.as_str())]);
    let mut session = EngagementSession::new(
        http(),
        service.base_url(),
        registry_of(&["/reports"]),
        &fast_config(),
    );

    let out = session.intelligent_request("/reports").unwrap();
    let content = out.content.unwrap();
    assert_eq!(content.chars().count(), 503);
    assert!(content.ends_with("..."));
}

#[test]
fn empty_registry_requests_root_without_reinforcing() {
    let service = TestService::start(&[("/", 200, "")]);
    let mut session =
        EngagementSession::new(http(), service.base_url(), EndpointRegistry::new(), &fast_config());

    let out = session.intelligent_request("/anything").unwrap();
    assert_eq!(out.path, "/");
    assert_eq!(out.content, None);
    assert_eq!(out.reinforced, None);
    assert!(session.usage_vector().is_empty());
    assert_eq!(service.hits(), vec!["/"]);
}

#[test]
fn error_statuses_are_responses_not_failures() {
    let service = TestService::start(&[]);
    let mut session = EngagementSession::new(
        http(),
        service.base_url(),
        registry_of(&["/users"]),
        &fast_config(),
    );

    let out = session.intelligent_request("/users").unwrap();
    assert_eq!(out.status, 404);
    assert_eq!(out.reinforced, Some(0));
}

#[test]
fn exhausted_retries_leave_weights_untouched() {
    let base = closed_base_url();
    let mut registry = registry_of(&["/users", "/orders"]);
    registry.set_usage("/orders", 2.0);
    let mut session = EngagementSession::new(http(), base, registry, &fast_config());

    let err = session.intelligent_request("/users").unwrap_err();
    match err {
        RouteScoutError::RetryExhausted {
            operation,
            attempts,
            ..
        } => {
            assert_eq!(operation, "GET /users");
            assert_eq!(attempts, 2);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(session.usage_vector(), vec![0.0, 2.0]);
}

/// Refuses the first `failures` calls, then answers 200.
struct FlakyTransport {
    failures: usize,
    calls: Mutex<usize>,
}

impl Transport for FlakyTransport {
    fn get(&self, _url: &str) -> Result<HttpResponse, TransportError> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls <= self.failures {
            Err(TransportError::new("connection reset"))
        } else {
            Ok(HttpResponse {
                status: 200,
                body: "recovered".to_string(),
            })
        }
    }
}

#[test]
fn transient_failures_are_retried() {
    let mut config = fast_config();
    config.retry.attempts = 3;
    let transport = FlakyTransport {
        failures: 2,
        calls: Mutex::new(0),
    };
    let mut session =
        EngagementSession::new(transport, "http://svc", registry_of(&["/users"]), &config);

    let out = session.intelligent_request("/users").unwrap();
    assert_eq!(out.content.as_deref(), Some("recovered"));
    assert_eq!(session.usage_vector(), vec![1.0]);
}

#[test]
fn ranking_orders_by_similarity() {
    let session = EngagementSession::new(
        http(),
        "http://localhost:3000",
        registry_of(&["/orders", "/users"]),
        &fast_config(),
    );
    let ranking = session.rank("/users");
    assert_eq!(ranking[0].path, "/users");
    assert!(ranking[0].score > ranking[1].score);
    assert_eq!(session.optimize_path("/users"), "/users");
}
