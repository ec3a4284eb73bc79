#[path = "../common/mod.rs"]
mod common;

use common::{TestService, closed_base_url};
use routescout::core::constraints::Constraint;
use routescout::core::prober::{ProbeOptions, ProbeOutcome, probe};
use routescout::core::registry::{DiscoveryMethod, EndpointRecord, EndpointRegistry};
use routescout::core::transport::HttpTransport;

fn transport() -> HttpTransport {
    HttpTransport::with_timeout_ms(2_000).unwrap()
}

fn permissive() -> ProbeOptions {
    ProbeOptions {
        constraint: Constraint::Default,
        ..Default::default()
    }
}

#[test]
fn live_candidate_is_recorded_and_explored_one_level_deeper() {
    let service = TestService::start(&[("/29", 200, "ok")]);
    let mut registry = EndpointRegistry::new();

    let report = probe(&transport(), service.base_url(), 3, permissive(), &mut registry).unwrap();

    assert_eq!(report.recorded, vec!["/29"]);
    assert_eq!(report.requests, 16);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 15);

    let hits = service.hits();
    assert_eq!(hits.len(), 16);
    assert_eq!(
        &hits[..8],
        &["/2", "/4", "/6", "/11", "/17", "/29", "/46", "/76"]
    );
    assert!(hits[8..].iter().all(|p| p.starts_with("/29/")));

    let record = &registry.entries()[0].record;
    assert_eq!(record.path, "/29");
    assert_eq!(record.discovery, DiscoveryMethod::Probe);
    assert!(record.source_file.is_none());
}

#[test]
fn recursive_constraint_keeps_digit_paths_out() {
    let service = TestService::start(&[("/2", 200, ""), ("/29", 204, "")]);
    let mut registry = EndpointRegistry::new();

    let report = probe(
        &transport(),
        service.base_url(),
        3,
        ProbeOptions::default(),
        &mut registry,
    )
    .unwrap();

    assert!(registry.is_empty());
    assert_eq!(report.filtered, 2);
    assert_eq!(service.hits().len(), 8);
}

#[test]
fn any_status_below_400_counts_as_live() {
    let service = TestService::start(&[("/6", 201, "")]);
    let mut registry = EndpointRegistry::new();

    let report = probe(&transport(), service.base_url(), 1, permissive(), &mut registry).unwrap();

    assert_eq!(report.recorded, vec!["/6"]);
    let accepted: Vec<_> = report
        .attempts
        .iter()
        .filter(|a| a.outcome.is_accepted())
        .map(|a| a.path.as_str())
        .collect();
    assert_eq!(accepted, vec!["/6"]);
}

#[test]
fn unreachable_service_yields_only_transport_errors() {
    let base = closed_base_url();
    let mut registry = EndpointRegistry::new();

    let report = probe(&transport(), &base, 2, permissive(), &mut registry).unwrap();

    assert_eq!(report.requests, 8);
    assert_eq!(report.transport_errors, 8);
    assert!(registry.is_empty());
    assert!(
        report
            .attempts
            .iter()
            .all(|a| matches!(a.outcome, ProbeOutcome::TransportError { .. }))
    );
}

#[test]
fn static_records_are_not_overwritten_by_probing() {
    let service = TestService::start(&[("/11", 200, "")]);
    let mut registry = EndpointRegistry::new();
    registry.insert(EndpointRecord::from_source(
        "/11",
        "app.py",
        7,
        ["GET".to_string()].into(),
    ));

    let report = probe(&transport(), service.base_url(), 1, permissive(), &mut registry).unwrap();

    assert!(report.recorded.is_empty());
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.entries()[0].record.discovery, DiscoveryMethod::Static);
}

#[test]
fn registry_order_is_depth_first_for_any_concurrency() {
    let routes = [("/2", 200, ""), ("/46", 200, ""), ("/2/17", 200, "")];
    let sequential_service = TestService::start(&routes);
    let parallel_service = TestService::start(&routes);

    let mut sequential = EndpointRegistry::new();
    probe(
        &transport(),
        sequential_service.base_url(),
        2,
        permissive(),
        &mut sequential,
    )
    .unwrap();

    let mut parallel = EndpointRegistry::new();
    let options = ProbeOptions {
        concurrency: 4,
        ..permissive()
    };
    let report = probe(
        &transport(),
        parallel_service.base_url(),
        2,
        options,
        &mut parallel,
    )
    .unwrap();

    let seq: Vec<_> = sequential.paths().collect();
    let par: Vec<_> = parallel.paths().collect();
    assert_eq!(seq, vec!["/2", "/2/17", "/46"]);
    assert_eq!(seq, par);
    assert_eq!(report.requests, 24);
    assert_eq!(parallel_service.hits().len(), 24);
}
