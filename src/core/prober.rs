//! Depth-bounded live probing.
//!
//! Candidate suffixes are `/{floor(phi^n) mod 10000}` for `n = 2..=9`, the same
//! at every level. A stack of `(prefix, remaining_depth)` frames replaces
//! recursion. A frame fetches its eight siblings in one batch, then applies
//! the outcomes one at a time; an accepted path is recorded and its child
//! frame is explored before the next sibling is applied. Registry order is
//! therefore depth-first (`/2`, `/2/11`, `/6`, ...) even though requests are
//! issued a frame at a time.
//!
//! The sibling batch may be fetched on a rayon pool. Outcomes come back in
//! candidate order and only the driving thread touches the registry, so
//! insertion order does not depend on `concurrency`.

use crate::core::constraints::{Constraint, FeatureMatrix};
use crate::core::error::RouteScoutError;
use crate::core::registry::{EndpointRecord, EndpointRegistry};
use crate::core::transport::{Transport, join_url};
use rayon::ThreadPool;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

pub const PHI: f64 = 1.618_033_988_749_895;
pub const FIRST_EXPONENT: u32 = 2;
pub const LAST_EXPONENT: u32 = 9;
const CANDIDATE_MODULUS: f64 = 10_000.0;
/// Responses below this status count as live.
pub const STATUS_THRESHOLD: u16 = 400;

/// Probe suffixes in generation order: `/2 /4 /6 /11 /17 /29 /46 /76`.
pub fn candidate_suffixes() -> Vec<String> {
    (FIRST_EXPONENT..=LAST_EXPONENT)
        .map(|n| {
            let value = (PHI.powi(n as i32) % CANDIDATE_MODULUS).floor() as u64;
            format!("/{}", value)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Predicate applied to the char-code column of a live path.
    pub constraint: Constraint,
    /// Worker threads per frame. `1` probes sequentially.
    pub concurrency: usize,
    /// Stop issuing requests once this many were sent.
    pub max_requests: Option<usize>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            constraint: Constraint::Recursive,
            concurrency: 1,
            max_requests: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Live and accepted by the constraint: recorded and explored.
    Accepted { status: u16 },
    /// Live, but the constraint rejected the path.
    Filtered { status: u16 },
    /// Status at or above the threshold.
    Rejected { status: u16 },
    TransportError { cause: String },
}

impl ProbeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeAttempt {
    pub path: String,
    /// 1 for candidates directly under the base URL.
    pub level: usize,
    pub outcome: ProbeOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProbeReport {
    pub requests: usize,
    pub accepted: usize,
    pub filtered: usize,
    pub rejected: usize,
    pub transport_errors: usize,
    /// Paths newly added to the registry, in insertion order.
    pub recorded: Vec<String>,
    pub budget_exhausted: bool,
    pub attempts: Vec<ProbeAttempt>,
}

struct Frame {
    prefix: String,
    depth: usize,
    /// Fetched sibling outcomes not applied yet. `None` until fetched.
    pending: Option<std::vec::IntoIter<(String, ProbeOutcome)>>,
}

impl Frame {
    fn new(prefix: String, depth: usize) -> Self {
        Self {
            prefix,
            depth,
            pending: None,
        }
    }
}

pub struct Prober<'a, T: Transport + ?Sized> {
    transport: &'a T,
    options: ProbeOptions,
    suffixes: Vec<String>,
}

impl<'a, T: Transport + ?Sized> Prober<'a, T> {
    pub fn new(transport: &'a T, options: ProbeOptions) -> Self {
        Self {
            transport,
            options,
            suffixes: candidate_suffixes(),
        }
    }

    pub fn probe(
        &self,
        base_url: &str,
        max_depth: usize,
        registry: &mut EndpointRegistry,
    ) -> Result<ProbeReport, RouteScoutError> {
        let pool = self.build_pool()?;
        let mut report = ProbeReport::default();
        let mut stack = Vec::new();
        if max_depth > 0 {
            stack.push(Frame::new(String::new(), max_depth));
        }

        while let Some(frame) = stack.last_mut() {
            if frame.pending.is_none() {
                let mut paths: Vec<String> = self
                    .suffixes
                    .iter()
                    .map(|s| format!("{}{}", frame.prefix, s))
                    .collect();
                if let Some(limit) = self.options.max_requests {
                    let remaining = limit.saturating_sub(report.requests);
                    if remaining < paths.len() {
                        report.budget_exhausted = true;
                        paths.truncate(remaining);
                    }
                }
                report.requests += paths.len();
                let outcomes = self.fetch_all(base_url, &paths, pool.as_ref());
                let batch: Vec<_> = paths.into_iter().zip(outcomes).collect();
                frame.pending = Some(batch.into_iter());
            }

            let depth = frame.depth;
            let Some((path, outcome)) = frame.pending.as_mut().and_then(Iterator::next) else {
                stack.pop();
                continue;
            };

            let mut child = None;
            match &outcome {
                ProbeOutcome::Accepted { .. } => {
                    report.accepted += 1;
                    if registry.insert(EndpointRecord::from_probe(path.clone())) {
                        report.recorded.push(path.clone());
                    }
                    if depth > 1 {
                        child = Some(Frame::new(path.clone(), depth - 1));
                    }
                }
                ProbeOutcome::Filtered { .. } => report.filtered += 1,
                ProbeOutcome::Rejected { .. } => report.rejected += 1,
                ProbeOutcome::TransportError { .. } => report.transport_errors += 1,
            }
            report.attempts.push(ProbeAttempt {
                path,
                level: max_depth - depth + 1,
                outcome,
            });
            stack.extend(child);
        }

        info!(
            base_url,
            requests = report.requests,
            accepted = report.accepted,
            recorded = report.recorded.len(),
            budget_exhausted = report.budget_exhausted,
            "probe complete"
        );
        Ok(report)
    }

    fn build_pool(&self) -> Result<Option<ThreadPool>, RouteScoutError> {
        if self.options.concurrency <= 1 {
            return Ok(None);
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.concurrency)
            .thread_name(|i| format!("routescout-probe-{}", i))
            .build()
            .map(Some)
            .map_err(|e| RouteScoutError::ThreadPoolError(e.to_string()))
    }

    fn fetch_all(
        &self,
        base_url: &str,
        paths: &[String],
        pool: Option<&ThreadPool>,
    ) -> Vec<ProbeOutcome> {
        match pool {
            Some(pool) => pool.install(|| {
                paths
                    .par_iter()
                    .map(|p| self.attempt(base_url, p))
                    .collect()
            }),
            None => paths.iter().map(|p| self.attempt(base_url, p)).collect(),
        }
    }

    fn attempt(&self, base_url: &str, path: &str) -> ProbeOutcome {
        let outcome = match self.transport.get(&join_url(base_url, path)) {
            Ok(response) => classify(response.status, path, self.options.constraint),
            Err(e) => ProbeOutcome::TransportError { cause: e.cause },
        };
        debug!(path, ?outcome, "probe attempt");
        outcome
    }
}

/// Status and constraint decision for one live response.
pub fn classify(status: u16, path: &str, constraint: Constraint) -> ProbeOutcome {
    if status >= STATUS_THRESHOLD {
        ProbeOutcome::Rejected { status }
    } else if constraint.check(&FeatureMatrix::from_path(path)) {
        ProbeOutcome::Accepted { status }
    } else {
        ProbeOutcome::Filtered { status }
    }
}

/// `probe(base_url, max_depth)` against `registry`.
pub fn probe<T: Transport + ?Sized>(
    transport: &T,
    base_url: &str,
    max_depth: usize,
    options: ProbeOptions,
    registry: &mut EndpointRegistry,
) -> Result<ProbeReport, RouteScoutError> {
    Prober::new(transport, options).probe(base_url, max_depth, registry)
}
