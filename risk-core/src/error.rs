//! Error taxonomy for the decisioning core
//!
//! Three kinds only:
//! - `Configuration`: malformed tables, fatal at startup
//! - `Validation`: bad per-request input, recoverable
//! - `Dependency`: an external collaborator failed or timed out, recoverable

use thiserror::Error;

pub type RiskResult<T> = Result<T, RiskError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Dependency error: {0}")]
    Dependency(String),
}

impl RiskError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn dependency(msg: impl Into<String>) -> Self {
        Self::Dependency(msg.into())
    }

    /// Stable, client-facing error kind
    pub fn kind(&self) -> &'static str {
        match self {
            RiskError::Configuration(_) => "configuration_error",
            RiskError::Validation(_) => "validation_error",
            RiskError::Dependency(_) => "dependency_error",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RiskError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinct() {
        let kinds = [
            RiskError::configuration("x").kind(),
            RiskError::validation("x").kind(),
            RiskError::dependency("x").kind(),
        ];
        assert_eq!(kinds, ["configuration_error", "validation_error", "dependency_error"]);
    }

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(RiskError::configuration("bad table").is_fatal());
        assert!(!RiskError::validation("missing id").is_fatal());
        assert!(!RiskError::dependency("graph store down").is_fatal());
    }

    #[test]
    fn test_display_includes_message() {
        let err = RiskError::dependency("graph store timed out");
        assert_eq!(err.to_string(), "Dependency error: graph store timed out");
    }
}
