//! Command surfaces built on `core`: discovery, engagement, constraint checks.

pub mod constraint;
pub mod discover;
pub mod engage;
