//! Discovery pipeline: static extraction, then live probing, into one registry.
//!
//! Static records always precede probe records in the registry. Probe records
//! follow frame order (see `core::prober`).

use crate::core::config::{ProbeConfig, ScoutConfig};
use crate::core::error::RouteScoutError;
use crate::core::extractor::{self, Extraction};
use crate::core::output::{compact_line, print_envelope};
use crate::core::prober::{self, ProbeOutcome, ProbeReport};
use crate::core::registry::{DiscoveryMethod, EndpointRecord, EndpointRegistry};
use crate::core::transport::{HttpTransport, Transport, check_base_url};
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Probe settings that override `[probe]` from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ProbeArgs {
    /// Target service, e.g. http://localhost:3000.
    #[clap(long)]
    pub base_url: Option<String>,
    /// Recursion bound for probing (0 disables probing).
    #[clap(long)]
    pub max_depth: Option<usize>,
    /// Worker threads per probe level.
    #[clap(long)]
    pub concurrency: Option<usize>,
    /// Acceptance predicate: recursive, orthogonal, hyperbolic, default.
    #[clap(long)]
    pub constraint: Option<String>,
    /// Per-request timeout in milliseconds.
    #[clap(long)]
    pub timeout_ms: Option<u64>,
    /// Stop after this many probe requests.
    #[clap(long)]
    pub max_requests: Option<usize>,
}

impl ProbeArgs {
    pub fn apply(&self, probe: &mut ProbeConfig) {
        if let Some(v) = &self.base_url {
            probe.base_url = v.clone();
        }
        if let Some(v) = self.max_depth {
            probe.max_depth = v;
        }
        if let Some(v) = self.concurrency {
            probe.concurrency = v;
        }
        if let Some(v) = &self.constraint {
            probe.constraint = v.clone();
        }
        if let Some(v) = self.timeout_ms {
            probe.timeout_ms = v;
        }
        if self.max_requests.is_some() {
            probe.max_requests = self.max_requests;
        }
    }
}

#[derive(Args, Debug)]
pub struct ScanCli {
    /// Source tree to scan (defaults to the current directory).
    #[clap(long)]
    pub root: Option<PathBuf>,
    #[clap(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ProbeCli {
    #[clap(flatten)]
    pub probe: ProbeArgs,
    #[clap(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct LearnCli {
    /// Source tree to scan (defaults to the current directory).
    #[clap(long)]
    pub root: Option<PathBuf>,
    #[clap(flatten)]
    pub probe: ProbeArgs,
    #[clap(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

/// Result of a full discovery run.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub extraction: Extraction,
    pub probe: ProbeReport,
    pub registry: EndpointRegistry,
}

impl Discovery {
    pub fn static_endpoints(&self) -> Vec<EndpointRecord> {
        self.registry.discovered_by(DiscoveryMethod::Static)
    }

    pub fn dynamic_endpoints(&self) -> Vec<EndpointRecord> {
        self.registry.discovered_by(DiscoveryMethod::Probe)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "technology": self.extraction.detection.technology,
            "static_endpoints": self.static_endpoints(),
            "dynamic_endpoints": self.dynamic_endpoints(),
            "endpoints": self.registry.records().collect::<Vec<_>>(),
            "restricted": self.extraction.restricted,
            "probe": probe_summary(&self.probe),
        })
    }
}

/// Static extraction of `root` followed by probing `config.probe.base_url`.
pub fn learn<T: Transport + ?Sized>(
    root: &Path,
    config: &ScoutConfig,
    transport: &T,
) -> Result<Discovery, RouteScoutError> {
    let extraction = extractor::extract(root, &config.scan.ignore);
    let mut registry: EndpointRegistry = extraction.endpoints.iter().cloned().collect();
    let probe = prober::probe(
        transport,
        &config.probe.base_url,
        config.probe.max_depth,
        config.probe.options(),
        &mut registry,
    )?;
    info!(
        static_endpoints = extraction.endpoints.len(),
        probed = probe.recorded.len(),
        total = registry.len(),
        "discovery complete"
    );
    Ok(Discovery {
        extraction,
        probe,
        registry,
    })
}

pub fn probe_summary(report: &ProbeReport) -> serde_json::Value {
    serde_json::json!({
        "requests": report.requests,
        "accepted": report.accepted,
        "filtered": report.filtered,
        "rejected": report.rejected,
        "transport_errors": report.transport_errors,
        "recorded": report.recorded,
        "budget_exhausted": report.budget_exhausted,
    })
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf, RouteScoutError> {
    match root {
        Some(r) => Ok(r),
        None => Ok(std::env::current_dir()?),
    }
}

fn transport_for(probe: &ProbeConfig) -> Result<HttpTransport, RouteScoutError> {
    check_base_url(&probe.base_url)?;
    HttpTransport::with_timeout_ms(probe.timeout_ms)
}

pub fn run_scan_cli(config: &ScoutConfig, cli: ScanCli) -> Result<(), RouteScoutError> {
    let root = resolve_root(cli.root)?;
    let extraction = extractor::extract(&root, &config.scan.ignore);
    match cli.format {
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "root": root,
                "technology": extraction.detection.technology,
                "scores": extraction.detection.scores,
                "files_scanned": extraction.files_scanned,
                "filtered": extraction.filtered,
                "restricted": extraction.restricted,
                "endpoints": extraction.endpoints,
            });
            print_envelope("scan", payload);
        }
        OutputFormat::Text => print_endpoints_text(&extraction.endpoints),
    }
    Ok(())
}

pub fn run_probe_cli(config: &ScoutConfig, cli: ProbeCli) -> Result<(), RouteScoutError> {
    let mut config = config.clone();
    cli.probe.apply(&mut config.probe);
    config.validate()?;
    let transport = transport_for(&config.probe)?;
    let mut registry = EndpointRegistry::new();
    let report = prober::probe(
        &transport,
        &config.probe.base_url,
        config.probe.max_depth,
        config.probe.options(),
        &mut registry,
    )?;
    match cli.format {
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "base_url": config.probe.base_url,
                "max_depth": config.probe.max_depth,
                "constraint": config.probe.options().constraint,
                "summary": probe_summary(&report),
                "attempts": report.attempts,
                "endpoints": registry.records().collect::<Vec<_>>(),
            });
            print_envelope("probe", payload);
        }
        OutputFormat::Text => print_probe_text(&report),
    }
    Ok(())
}

pub fn run_learn_cli(config: &ScoutConfig, cli: LearnCli) -> Result<(), RouteScoutError> {
    let root = resolve_root(cli.root)?;
    let mut config = config.clone();
    cli.probe.apply(&mut config.probe);
    config.validate()?;
    let transport = transport_for(&config.probe)?;
    let discovery = learn(&root, &config, &transport)?;
    match cli.format {
        OutputFormat::Json => {
            print_envelope("learn", discovery.to_json());
        }
        OutputFormat::Text => {
            print_endpoints_text(&discovery.registry.records().cloned().collect::<Vec<_>>());
            print_probe_text(&discovery.probe);
        }
    }
    Ok(())
}

fn print_endpoints_text(endpoints: &[EndpointRecord]) {
    use colored::Colorize;

    if endpoints.is_empty() {
        println!("{}", "no endpoints found".dimmed());
        return;
    }
    for e in endpoints {
        let methods = e.methods.iter().cloned().collect::<Vec<_>>().join(",");
        let origin = match (&e.source_file, e.source_line) {
            (Some(file), Some(line)) => format!("{}:{}", file.display(), line),
            _ => "probe".to_string(),
        };
        println!(
            "{:<8} {} {}",
            methods.bright_cyan(),
            e.path.bold(),
            origin.dimmed()
        );
    }
}

fn print_probe_text(report: &ProbeReport) {
    use colored::Colorize;

    for attempt in &report.attempts {
        let label = match &attempt.outcome {
            ProbeOutcome::Accepted { status } => format!("accepted {}", status).green(),
            ProbeOutcome::Filtered { status } => format!("filtered {}", status).yellow(),
            ProbeOutcome::Rejected { status } => format!("rejected {}", status).dimmed(),
            ProbeOutcome::TransportError { cause } => {
                format!("error {}", compact_line(cause, 60)).red()
            }
        };
        println!("L{} {:<16} {}", attempt.level, attempt.path, label);
    }
    println!(
        "{} requests, {} recorded{}",
        report.requests,
        report.recorded.len(),
        if report.budget_exhausted {
            " (budget exhausted)"
        } else {
            ""
        }
    );
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "discover",
        "version": "0.1.0",
        "description": "Static route extraction and depth-bounded live probing",
        "commands": [
            { "name": "scan", "parameters": ["root", "format"] },
            { "name": "probe", "parameters": ["base_url", "max_depth", "concurrency", "constraint", "timeout_ms", "max_requests"] },
            { "name": "learn", "parameters": ["root", "base_url", "max_depth", "concurrency", "constraint", "timeout_ms", "max_requests"] }
        ],
        "invariants": [
            "Registry entries are unique by exact path; first seen wins",
            "Static records precede probe records",
            "Probe candidates are /{floor(phi^n) mod 10000} for n = 2..=9",
            "Transport failures never abort probing"
        ]
    })
}
