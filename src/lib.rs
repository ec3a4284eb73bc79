//! routescout: endpoint discovery for a target HTTP service.
//!
//! Two discovery channels feed one deduplicated registry:
//!
//! - **Static**: route declarations extracted from a source tree (Flask,
//!   Express or Django templates, whichever dominates).
//! - **Dynamic**: depth-bounded probing of the live service with
//!   golden-ratio candidate paths, gated by a named constraint.
//!
//! The registry then answers objective queries (cosine similarity over
//! character codes) and keeps decayed usage weights per endpoint.
//!
//! # Examples
//!
//! ```bash
//! # Static routes of the current tree
//! routescout scan
//!
//! # Static + dynamic discovery
//! routescout learn --root ./app --base-url http://localhost:3000
//!
//! # Pick and request the best path for an objective
//! routescout interact /users --base-url http://localhost:3000
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: extraction, probing, registry, scoring, reinforcement, config
//! - [`plugins`]: command surfaces (discover, engage, constraint)

pub mod core;
pub mod plugins;

use crate::core::{config, error, output};
use plugins::{constraint, discover, engage};

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[clap(
    name = "routescout",
    version = env!("CARGO_PKG_VERSION"),
    about = "Discover, rank and reinforce the HTTP endpoints of a service"
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence).
    #[clap(long, short, global = true)]
    verbose: bool,
    /// Config file (defaults to <root>/.routescout.toml).
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract declared routes from a source tree
    Scan(discover::ScanCli),

    /// Probe a live service for undeclared endpoints
    Probe(discover::ProbeCli),

    /// Static extraction followed by live probing
    Learn(discover::LearnCli),

    /// Discover, then request the best path for an objective
    Interact(engage::InteractCli),

    /// Evaluate named geometric predicates
    Constraint(constraint::ConstraintCli),

    /// Machine-readable description of all commands
    Schema,

    /// Print version
    Version,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .try_init();
}

/// Root used to look up `.routescout.toml` for a command.
fn config_root(command: &Command) -> Result<PathBuf, error::RouteScoutError> {
    let root = match command {
        Command::Scan(c) => c.root.clone(),
        Command::Learn(c) => c.root.clone(),
        Command::Interact(c) => c.root.clone(),
        _ => None,
    };
    match root {
        Some(r) => Ok(r),
        None => Ok(std::env::current_dir()?),
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "routescout",
        "version": env!("CARGO_PKG_VERSION"),
        "subsystems": [discover::schema(), engage::schema(), constraint::schema()],
        "config_file": config::CONFIG_FILE_NAME,
    })
}

pub fn run() -> Result<(), error::RouteScoutError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Schema => {
            output::print_envelope("schema", schema());
            return Ok(());
        }
        Command::Constraint(c) => return constraint::run_constraint_cli(c),
        _ => {}
    }

    let root = config_root(&cli.command)?;
    let config = config::load_config(&root, cli.config.as_deref())?;

    match cli.command {
        Command::Scan(c) => discover::run_scan_cli(&config, c),
        Command::Probe(c) => discover::run_probe_cli(&config, c),
        Command::Learn(c) => discover::run_learn_cli(&config, c),
        Command::Interact(c) => engage::run_interact_cli(&config, c),
        Command::Constraint(_) | Command::Schema | Command::Version => Ok(()),
    }
}
