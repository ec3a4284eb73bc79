//! Objective-driven path selection by cosine similarity of character codes.
//!
//! The dot product runs over the overlapping prefix of the two code vectors
//! while each norm covers its whole vector, so extra characters on either
//! side lower the score.

use crate::core::constraints::char_codes;
use crate::core::registry::EndpointRegistry;
use serde::Serialize;

/// Returned when there is nothing to choose from.
pub const FALLBACK_PATH: &str = "/";

/// `dot(a, b) / (|a| * |b|)` with the dot product over the overlapping
/// prefix. Zero-norm inputs score 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathScore {
    pub path: String,
    pub score: f64,
}

/// Similarity of `objective` to every registered path, in registry order.
pub fn rank(objective: &str, registry: &EndpointRegistry) -> Vec<PathScore> {
    let objective = char_codes(objective);
    registry
        .paths()
        .map(|path| PathScore {
            path: path.to_string(),
            score: cosine_similarity(&objective, &char_codes(path)),
        })
        .collect()
}

/// The registered path most similar to `objective`; the first one on ties,
/// `"/"` for an empty registry.
pub fn optimal_path(objective: &str, registry: &EndpointRegistry) -> String {
    let mut best: Option<PathScore> = None;
    for candidate in rank(objective, registry) {
        match &best {
            Some(b) if candidate.score <= b.score => {}
            _ => best = Some(candidate),
        }
    }
    best.map(|b| b.path)
        .unwrap_or_else(|| FALLBACK_PATH.to_string())
}
