//! HTTP seam shared by the prober and the engagement session.

use crate::core::error::RouteScoutError;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Connection refused, timeout, unreadable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub cause: String,
}

impl TransportError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl std::error::Error for TransportError {}

/// Blocking GET. Implementations are shared across probe worker threads.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// `reqwest` blocking client reused for every request of a run.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, RouteScoutError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("routescout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RouteScoutError::HttpClientError(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_timeout_ms(timeout_ms: u64) -> Result<Self, RouteScoutError> {
        Self::new(Duration::from_millis(timeout_ms))
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError::new(describe(&e)))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError::new(describe(&e)))?;
        Ok(HttpResponse { status, body })
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timeout: {}", err)
    } else if err.is_connect() {
        format!("connect: {}", err)
    } else {
        err.to_string()
    }
}

/// Join a base URL and a path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Reject base URLs the client cannot use before any request is issued.
pub fn check_base_url(base: &str) -> Result<(), RouteScoutError> {
    if base.starts_with("http://") || base.starts_with("https://") {
        Ok(())
    } else {
        Err(RouteScoutError::ValidationError(format!(
            "base URL must start with http:// or https://, got '{}'",
            base
        )))
    }
}
