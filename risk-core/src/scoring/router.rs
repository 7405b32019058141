//! Action Router
//!
//! Precedence:
//! 1. any designated hard flag raised -> the override action
//! 2. otherwise -> the tier's mapped action

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};
use crate::features::FeatureVector;
use super::thresholds::{ThresholdTable, Tier};

// ============================================================================
// ACTION
// ============================================================================

/// Terminal decision emitted for a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Approve,
    Review,
    Block,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Approve => "approve",
            Action::Review => "review",
            Action::Block => "block",
        }
    }

    pub fn is_approval(&self) -> bool {
        matches!(self, Action::Approve)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ROUTER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRouter {
    /// Tier label -> action
    pub tier_actions: BTreeMap<String, Action>,
    /// Boolean features that force `override_action` when raised
    #[serde(default)]
    pub hard_flags: Vec<String>,
    pub override_action: Action,
}

impl ActionRouter {
    pub fn new<S: Into<String>>(
        tier_actions: impl IntoIterator<Item = (S, Action)>,
        override_action: Action,
    ) -> Self {
        Self {
            tier_actions: tier_actions.into_iter().map(|(t, a)| (t.into(), a)).collect(),
            hard_flags: Vec::new(),
            override_action,
        }
    }

    pub fn with_hard_flags<S: Into<String>>(mut self, flags: impl IntoIterator<Item = S>) -> Self {
        self.hard_flags = flags.into_iter().map(Into::into).collect();
        self
    }

    /// Designated hard flags that are raised in `features`.
    pub fn triggered_flags(&self, features: &FeatureVector) -> RiskResult<Vec<String>> {
        let mut raised = Vec::new();
        for name in &self.hard_flags {
            match features.flag(name) {
                Some(true) => raised.push(name.clone()),
                Some(false) => {}
                None => {
                    return Err(RiskError::configuration(format!(
                        "hard flag '{}' missing from feature vector",
                        name
                    )))
                }
            }
        }
        Ok(raised)
    }

    pub fn route(&self, tier: &Tier, features: &FeatureVector) -> RiskResult<Action> {
        if !self.triggered_flags(features)?.is_empty() {
            return Ok(self.override_action);
        }
        self.tier_action(tier)
    }

    pub fn tier_action(&self, tier: &Tier) -> RiskResult<Action> {
        self.tier_actions
            .get(&tier.label)
            .copied()
            .ok_or_else(|| RiskError::configuration(format!("no action mapped for tier '{}'", tier.label)))
    }

    /// Every tier of `thresholds` must have a mapped action.
    pub fn validate_tiers(&self, thresholds: &ThresholdTable) -> RiskResult<()> {
        thresholds.tiers().try_for_each(|tier| self.tier_action(&tier).map(|_| ()))
    }
}
