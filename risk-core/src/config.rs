//! Engine configuration
//!
//! Every table the pipelines score with, grouped per pipeline. The built-in
//! defaults are the production tables; a JSON file may replace any subset of
//! sections. The whole configuration is validated once before it is used.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assessment::ScoringPipeline;
use crate::error::{RiskError, RiskResult};
use crate::pipelines::{aml, transaction, user};
use crate::pipelines::{AnomalyScanConfig, CreditConfig, FraudConfig, NetworkConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSection {
    pub scoring: ScoringPipeline,
    #[serde(default = "default_connection_saturation")]
    pub connection_saturation: u32,
}

fn default_connection_saturation() -> u32 {
    user::DEFAULT_CONNECTION_SATURATION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub transaction: ScoringPipeline,
    pub user: UserSection,
    pub fraud: FraudConfig,
    pub anomaly: AnomalyScanConfig,
    pub credit: CreditConfig,
    pub network: NetworkConfig,
    pub aml: ScoringPipeline,
}

/// File layout: every section optional, unknown sections rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineOverrides {
    transaction: Option<ScoringPipeline>,
    user: Option<UserSection>,
    fraud: Option<FraudConfig>,
    anomaly: Option<AnomalyScanConfig>,
    credit: Option<CreditConfig>,
    network: Option<NetworkConfig>,
    aml: Option<ScoringPipeline>,
}

impl EngineConfig {
    pub fn builtin() -> RiskResult<Self> {
        Ok(Self {
            transaction: transaction::default_scoring()?,
            user: UserSection {
                scoring: user::default_scoring()?,
                connection_saturation: user::DEFAULT_CONNECTION_SATURATION,
            },
            fraud: FraudConfig::builtin()?,
            anomaly: AnomalyScanConfig::builtin()?,
            credit: CreditConfig::builtin()?,
            network: NetworkConfig::builtin()?,
            aml: aml::default_scoring()?,
        })
    }

    /// Built-in tables with the sections present in `json` replaced.
    pub fn from_json_str(json: &str) -> RiskResult<Self> {
        let overrides: EngineOverrides = serde_json::from_str(json)
            .map_err(|e| RiskError::configuration(format!("invalid engine configuration: {}", e)))?;

        let mut config = Self::builtin()?;
        if let Some(section) = overrides.transaction {
            config.transaction = section;
        }
        if let Some(section) = overrides.user {
            config.user = section;
        }
        if let Some(section) = overrides.fraud {
            config.fraud = section;
        }
        if let Some(section) = overrides.anomaly {
            config.anomaly = section;
        }
        if let Some(section) = overrides.credit {
            config.credit = section;
        }
        if let Some(section) = overrides.network {
            config.network = section;
        }
        if let Some(section) = overrides.aml {
            config.aml = section;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> RiskResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RiskError::configuration(format!("cannot read {}: {}", path.display(), e)))?;

        let config = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), "engine configuration loaded");
        Ok(config)
    }

    /// `path` when given, built-in tables otherwise.
    pub fn load(path: Option<&Path>) -> RiskResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let config = Self::builtin()?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self) -> RiskResult<()> {
        self.transaction.validate_for(&transaction::SIGNALS, &[])?;
        self.user.scoring.validate_for(&user::SIGNALS, &user::FLAGS)?;
        if self.user.connection_saturation == 0 {
            return Err(RiskError::configuration("user connection_saturation must be at least 1"));
        }
        self.fraud.validate()?;
        self.anomaly.validate()?;
        self.credit.validate()?;
        self.network.validate()?;
        self.aml.validate_for(&aml::SIGNALS, &aml::FLAGS)
    }
}
