//! Discovery core: extraction, probing, scoring and reinforcement.
//!
//! Everything here is synchronous and in-memory. CLI surfaces live in
//! [`crate::plugins`].

pub mod config;
pub mod constraints;
pub mod error;
pub mod extractor;
pub mod fallback;
pub mod optimizer;
pub mod output;
pub mod prober;
pub mod registry;
pub mod reinforce;
pub mod signatures;
pub mod transport;
