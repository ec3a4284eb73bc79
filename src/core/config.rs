use crate::core::constraints::Constraint;
use crate::core::error::RouteScoutError;
use crate::core::fallback::FallbackPolicy;
use crate::core::prober::ProbeOptions;
use crate::core::reinforce::Reinforcer;
use crate::core::transport::DEFAULT_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = ".routescout.toml";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoutConfig {
    pub scan: ScanConfig,
    pub probe: ProbeConfig,
    pub engage: EngageConfig,
    pub retry: FallbackPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Directory names skipped in addition to the built-in list.
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub base_url: String,
    pub max_depth: usize,
    pub timeout_ms: u64,
    pub concurrency: usize,
    pub constraint: String,
    pub max_requests: Option<usize>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_depth: 3,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: 1,
            constraint: Constraint::Recursive.name().to_string(),
            max_requests: None,
        }
    }
}

impl ProbeConfig {
    pub fn options(&self) -> ProbeOptions {
        ProbeOptions {
            constraint: Constraint::from_name(&self.constraint),
            concurrency: self.concurrency,
            max_requests: self.max_requests,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngageConfig {
    pub decay: f64,
    pub increment: f64,
    pub preview_chars: usize,
}

impl Default for EngageConfig {
    fn default() -> Self {
        let reinforcer = Reinforcer::default();
        Self {
            decay: reinforcer.decay,
            increment: reinforcer.increment,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl EngageConfig {
    pub fn reinforcer(&self) -> Reinforcer {
        Reinforcer {
            decay: self.decay,
            increment: self.increment,
        }
    }
}

impl ScoutConfig {
    pub fn validate(&self) -> Result<(), RouteScoutError> {
        if self.probe.concurrency == 0 {
            return Err(RouteScoutError::ConfigError(
                "probe.concurrency must be at least 1".to_string(),
            ));
        }
        if self.probe.timeout_ms == 0 {
            return Err(RouteScoutError::ConfigError(
                "probe.timeout_ms must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.engage.decay) {
            return Err(RouteScoutError::ConfigError(format!(
                "engage.decay must be within [0, 1], got {}",
                self.engage.decay
            )));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<ScoutConfig, RouteScoutError> {
    let config: ScoutConfig =
        toml::from_str(content).map_err(|e| RouteScoutError::ConfigError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file, else from `<root>/.routescout.toml`.
/// An explicit file must exist; a missing default file means defaults.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<ScoutConfig, RouteScoutError> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path).map_err(|e| {
            RouteScoutError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        return parse_config(&content);
    }

    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        let content = fs::read_to_string(&config_path).map_err(RouteScoutError::IoError)?;
        return parse_config(&content);
    }

    Ok(ScoutConfig::default())
}
