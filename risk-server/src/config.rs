//! Configuration module

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use risk_core::EngineConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// JSON file overriding the built-in engine tables
    pub risk_config_path: Option<String>,

    /// Deadline for every collaborator call
    pub collaborator_timeout_ms: u64,

    /// Overrides the anomaly scanner batch cap
    pub anomaly_batch_cap: Option<usize>,

    /// Overrides the credit limit multiplier
    pub credit_limit_multiplier: Option<f64>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Absent variables fall back to defaults; present but malformed ones
    /// are an error so the service refuses to start.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var_os(name).map(|v| v.to_string_lossy().into_owned()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            port: parse_var(&var, "PORT")?.unwrap_or(defaults.port),

            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),

            risk_config_path: var("RISK_CONFIG_PATH"),

            collaborator_timeout_ms: parse_var(&var, "COLLABORATOR_TIMEOUT_MS")?
                .unwrap_or(defaults.collaborator_timeout_ms),

            anomaly_batch_cap: parse_var(&var, "ANOMALY_BATCH_CAP")?,

            credit_limit_multiplier: parse_var(&var, "CREDIT_LIMIT_MULTIPLIER")?,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }

    /// Apply the env-level overrides on top of the loaded engine tables.
    pub fn apply_overrides(&self, engine: &mut EngineConfig) {
        if let Some(cap) = self.anomaly_batch_cap {
            engine.anomaly.batch_cap = cap;
        }
        if let Some(multiplier) = self.credit_limit_multiplier {
            engine.credit.limit_multiplier = multiplier;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8086,
            environment: "development".to_string(),
            risk_config_path: None,
            collaborator_timeout_ms: 2000,
            anomaly_batch_cap: None,
            credit_limit_multiplier: None,
        }
    }
}

fn parse_var<T>(var: impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(name)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("{} has invalid value '{}'", name, raw)))
        .transpose()
}
