//! Usage reinforcement with decay.

use crate::core::registry::EndpointRegistry;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DECAY: f64 = 0.9;
pub const DEFAULT_INCREMENT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reinforcer {
    pub decay: f64,
    pub increment: f64,
}

impl Default for Reinforcer {
    fn default() -> Self {
        Self {
            decay: DEFAULT_DECAY,
            increment: DEFAULT_INCREMENT,
        }
    }
}

impl Reinforcer {
    /// Decay every weight, then reinforce `index`. Out-of-range indices leave
    /// `weights` untouched and return `false`.
    pub fn apply(&self, weights: &mut [f64], index: usize) -> bool {
        if index >= weights.len() {
            return false;
        }
        for w in weights.iter_mut() {
            *w *= self.decay;
        }
        weights[index] += self.increment;
        true
    }

    /// Reinforce the entry for `selected_path`. Returns its index, or `None`
    /// when the path is not registered (weights unchanged).
    pub fn reinforce(&self, selected_path: &str, registry: &mut EndpointRegistry) -> Option<usize> {
        let index = registry.position(selected_path)?;
        for (i, w) in registry.usage_mut().enumerate() {
            *w *= self.decay;
            if i == index {
                *w += self.increment;
            }
        }
        Some(index)
    }
}

/// `decay_and_reinforce(weights, index)` with the default factors.
pub fn decay_and_reinforce(weights: &mut [f64], index: usize) -> bool {
    Reinforcer::default().apply(weights, index)
}

/// `reinforce(selected_path, registry)` with the default factors.
pub fn reinforce(selected_path: &str, registry: &mut EndpointRegistry) -> Option<usize> {
    Reinforcer::default().reinforce(selected_path, registry)
}
