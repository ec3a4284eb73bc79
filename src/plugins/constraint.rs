use crate::core::constraints::{Constraint, FeatureMatrix};
use crate::core::error::RouteScoutError;
use crate::core::output::print_envelope;
use clap::Subcommand;

#[derive(clap::Args, Debug)]
pub struct ConstraintCli {
    #[clap(subcommand)]
    pub command: ConstraintCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConstraintCommand {
    /// Evaluate a named predicate over a JSON matrix
    Check {
        /// Predicate name; unknown names use the always-true default.
        #[clap(long)]
        name: String,
        /// JSON array of rows (`[[1,0],[0,1]]`) or a flat array (one column).
        #[clap(long)]
        data: String,
    },
    /// List the available predicates
    List,
}

/// Parse `[[..], ..]` as rows, or `[..]` as a single column.
pub fn parse_matrix(data: &str) -> Result<FeatureMatrix, RouteScoutError> {
    if let Ok(rows) = serde_json::from_str::<Vec<Vec<f64>>>(data) {
        return Ok(FeatureMatrix::new(rows));
    }
    let column: Vec<f64> = serde_json::from_str(data).map_err(|e| {
        RouteScoutError::ValidationError(format!(
            "data must be a JSON array of numbers or of rows: {}",
            e
        ))
    })?;
    Ok(FeatureMatrix::column(&column))
}

pub fn check(name: &str, data: &str) -> Result<serde_json::Value, RouteScoutError> {
    let matrix = parse_matrix(data)?;
    let constraint = Constraint::from_name(name);
    Ok(serde_json::json!({
        "requested": name,
        "constraint": constraint,
        "rows": matrix.row_count(),
        "columns": matrix.width(),
        "accepted": constraint.check(&matrix),
    }))
}

pub fn list() -> serde_json::Value {
    let items: Vec<_> = Constraint::ALL
        .iter()
        .map(|c| serde_json::json!({ "name": c.name(), "description": c.description() }))
        .collect();
    serde_json::json!({ "constraints": items })
}

pub fn run_constraint_cli(cli: ConstraintCli) -> Result<(), RouteScoutError> {
    let (cmd, payload) = match cli.command {
        ConstraintCommand::Check { name, data } => ("constraint.check", check(&name, &data)?),
        ConstraintCommand::List => ("constraint.list", list()),
    };
    print_envelope(cmd, payload);
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "constraint",
        "version": "0.1.0",
        "description": "Named geometric predicates over numeric matrices",
        "commands": [
            { "name": "check", "parameters": ["name", "data"] },
            { "name": "list" }
        ]
    })
}
