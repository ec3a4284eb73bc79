use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteScoutError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("HTTP client error: {0}")]
    HttpClientError(String),
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
    /// Every attempt of a retried operation failed. Carries the last cause.
    #[error("{operation} failed after {attempts} attempts: {last_cause}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        last_cause: String,
    },
}
