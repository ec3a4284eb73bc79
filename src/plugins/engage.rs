//! Engagement session: pick the best known path for an objective, request it
//! through the retry policy, and reinforce the choice.

use crate::core::config::ScoutConfig;
use crate::core::error::RouteScoutError;
use crate::core::fallback::FallbackPolicy;
use crate::core::optimizer::{self, PathScore};
use crate::core::output::{preview, print_envelope};
use crate::core::registry::EndpointRegistry;
use crate::core::reinforce::Reinforcer;
use crate::core::transport::{HttpTransport, Transport, check_base_url, join_url};
use crate::plugins::discover::{self, ProbeArgs};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Args, Debug)]
pub struct InteractCli {
    /// Objective string ranked against the discovered paths.
    pub objective: String,
    /// Source tree to scan first (defaults to the current directory).
    #[clap(long)]
    pub root: Option<PathBuf>,
    #[clap(flatten)]
    pub probe: ProbeArgs,
    /// Number of consecutive requests for the same objective.
    #[clap(long, default_value_t = 1)]
    pub repeat: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Engagement {
    pub path: String,
    pub status: u16,
    /// Body preview, `None` for an empty body.
    pub content: Option<String>,
    /// Registry index that was reinforced, `None` for the `"/"` fallback.
    pub reinforced: Option<usize>,
}

pub struct EngagementSession<T: Transport> {
    transport: T,
    base_url: String,
    registry: EndpointRegistry,
    reinforcer: Reinforcer,
    retry: FallbackPolicy,
    preview_chars: usize,
}

impl<T: Transport> EngagementSession<T> {
    pub fn new(
        transport: T,
        base_url: impl Into<String>,
        registry: EndpointRegistry,
        config: &ScoutConfig,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            registry,
            reinforcer: config.engage.reinforcer(),
            retry: config.retry,
            preview_chars: config.engage.preview_chars,
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn usage_vector(&self) -> Vec<f64> {
        self.registry.usage_vector()
    }

    pub fn optimize_path(&self, objective: &str) -> String {
        optimizer::optimal_path(objective, &self.registry)
    }

    pub fn rank(&self, objective: &str) -> Vec<PathScore> {
        optimizer::rank(objective, &self.registry)
    }

    /// Optimize, GET, reinforce. Weights change only after a response
    /// arrived; exhausted retries surface as `RetryExhausted`.
    pub fn intelligent_request(&mut self, objective: &str) -> Result<Engagement, RouteScoutError> {
        let path = self.optimize_path(objective);
        let url = join_url(&self.base_url, &path);
        debug!(objective, path = %path, "selected path");

        let transport = &self.transport;
        let response = self
            .retry
            .invoke(&format!("GET {}", path), |u: &str| transport.get(u), url.as_str())?;

        let reinforced = self.reinforcer.reinforce(&path, &mut self.registry);
        info!(path = %path, status = response.status, ?reinforced, "engagement complete");
        Ok(Engagement {
            path,
            status: response.status,
            content: preview(&response.body, self.preview_chars),
            reinforced,
        })
    }

    pub fn into_registry(self) -> EndpointRegistry {
        self.registry
    }
}

pub fn run_interact_cli(config: &ScoutConfig, cli: InteractCli) -> Result<(), RouteScoutError> {
    let root = match cli.root {
        Some(r) => r,
        None => std::env::current_dir()?,
    };
    let mut config = config.clone();
    cli.probe.apply(&mut config.probe);
    config.validate()?;
    check_base_url(&config.probe.base_url)?;
    let transport = HttpTransport::with_timeout_ms(config.probe.timeout_ms)?;

    let discovery = discover::learn(&root, &config, &transport)?;
    let mut session = EngagementSession::new(
        transport,
        config.probe.base_url.clone(),
        discovery.registry,
        &config,
    );

    let ranking = session.rank(&cli.objective);
    let mut results = Vec::new();
    for _ in 0..cli.repeat.max(1) {
        results.push(session.intelligent_request(&cli.objective)?);
    }

    let usage: Vec<_> = session
        .registry()
        .entries()
        .iter()
        .map(|e| serde_json::json!({ "path": e.record.path, "usage": e.usage }))
        .collect();
    print_envelope(
        "interact",
        serde_json::json!({
            "objective": cli.objective,
            "results": results,
            "ranking": ranking,
            "usage": usage,
        }),
    );
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "engage",
        "version": "0.1.0",
        "description": "Objective-driven requests with usage reinforcement",
        "commands": [
            { "name": "interact", "parameters": ["objective", "root", "base_url", "max_depth", "repeat"] }
        ],
        "invariants": [
            "Empty registry selects /",
            "Ties resolve to the first path in registry order",
            "Every weight decays by 0.9 before the selected one gains 1.0",
            "Retry exhaustion is the only hard failure"
        ]
    })
}
