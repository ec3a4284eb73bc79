#[path = "../common/mod.rs"]
mod common;

use common::{TestService, closed_base_url};
use routescout::core::config::{CONFIG_FILE_NAME, ScoutConfig, load_config};
use routescout::core::registry::DiscoveryMethod;
use routescout::core::transport::HttpTransport;
use routescout::plugins::discover::{ProbeArgs, learn};
use std::fs;
use tempfile::tempdir;

fn config_for(base_url: &str, max_depth: usize) -> ScoutConfig {
    let mut config = ScoutConfig::default();
    config.probe.base_url = base_url.to_string();
    config.probe.max_depth = max_depth;
    config.probe.constraint = "default".to_string();
    config
}

#[test]
fn static_records_precede_probe_records() {
    let tmp = tempdir().unwrap();
    fs::write(
        tmp.path().join("app.py"),
        "@app.route('/users')\ndef users(): pass\n\n@app.route('/orders', methods=['POST'])\ndef orders(): pass\n",
    )
    .unwrap();
    let service = TestService::start(&[("/17", 200, "hidden"), ("/users", 200, "[]")]);
    let transport = HttpTransport::with_timeout_ms(2_000).unwrap();

    let discovery = learn(tmp.path(), &config_for(service.base_url(), 1), &transport).unwrap();

    let paths: Vec<_> = discovery.registry.paths().collect();
    assert_eq!(paths, vec!["/users", "/orders", "/17"]);
    assert_eq!(discovery.static_endpoints().len(), 2);
    let dynamic = discovery.dynamic_endpoints();
    assert_eq!(dynamic.len(), 1);
    assert_eq!(dynamic[0].discovery, DiscoveryMethod::Probe);
    assert_eq!(discovery.probe.requests, 8);
    // Every entry starts unused.
    assert_eq!(discovery.registry.usage_vector(), vec![0.0, 0.0, 0.0]);
}

#[test]
fn zero_depth_is_static_only() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("server.js"), "app.get('/health', ok);\n").unwrap();
    let base = closed_base_url();
    let transport = HttpTransport::with_timeout_ms(500).unwrap();

    let discovery = learn(tmp.path(), &config_for(&base, 0), &transport).unwrap();

    assert_eq!(discovery.probe.requests, 0);
    let paths: Vec<_> = discovery.registry.paths().collect();
    assert_eq!(paths, vec!["/health"]);
}

#[test]
fn unreachable_service_still_returns_static_routes() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("app.py"), "@app.route('/status')\n").unwrap();
    let base = closed_base_url();
    let transport = HttpTransport::with_timeout_ms(500).unwrap();

    let discovery = learn(tmp.path(), &config_for(&base, 2), &transport).unwrap();

    assert_eq!(discovery.probe.transport_errors, 8);
    assert_eq!(discovery.registry.len(), 1);
}

#[test]
fn json_report_shape() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("app.py"), "@app.route('/users')\n").unwrap();
    let service = TestService::start(&[]);
    let transport = HttpTransport::with_timeout_ms(2_000).unwrap();

    let discovery = learn(tmp.path(), &config_for(service.base_url(), 1), &transport).unwrap();
    let json = discovery.to_json();

    assert_eq!(json["technology"], "flask");
    assert_eq!(json["static_endpoints"][0]["path"], "/users");
    assert_eq!(json["static_endpoints"][0]["discovery"], "static");
    assert_eq!(json["dynamic_endpoints"].as_array().unwrap().len(), 0);
    assert_eq!(json["probe"]["requests"], 8);
    assert_eq!(json["probe"]["rejected"], 8);
}

#[test]
fn config_file_drives_discovery_and_flags_override_it() {
    let tmp = tempdir().unwrap();
    fs::write(
        tmp.path().join(CONFIG_FILE_NAME),
        "[scan]\nignore = [\"generated\"]\n\n[probe]\nmax_depth = 2\nconstraint = \"default\"\nmax_requests = 5\n",
    )
    .unwrap();
    fs::create_dir_all(tmp.path().join("generated")).unwrap();
    fs::write(tmp.path().join("generated/stub.py"), "@app.route('/generated')\n").unwrap();
    fs::write(tmp.path().join("app.py"), "@app.route('/users')\n").unwrap();
    let service = TestService::start(&[]);

    let mut config = load_config(tmp.path(), None).unwrap();
    let args = ProbeArgs {
        base_url: Some(service.base_url().to_string()),
        max_requests: Some(3),
        ..Default::default()
    };
    args.apply(&mut config.probe);
    assert_eq!(config.probe.max_depth, 2);

    let transport = HttpTransport::with_timeout_ms(2_000).unwrap();
    let discovery = learn(tmp.path(), &config, &transport).unwrap();

    let paths: Vec<_> = discovery.registry.paths().collect();
    assert_eq!(paths, vec!["/users"]);
    assert_eq!(discovery.probe.requests, 3);
    assert!(discovery.probe.budget_exhausted);
    assert_eq!(service.hits(), vec!["/2", "/4", "/6"]);
}
