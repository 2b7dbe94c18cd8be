//! Application and challenge configuration.

use crate::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parameters of the Duplicador challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Flip at which the challenge counts as completed (default: 21).
    pub max_flips: u32,
    /// Symbolic goal shown to the user (default: 1,000,000).
    pub target_amount: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            max_flips: 21,
            target_amount: 1_000_000,
        }
    }
}

impl ChallengeConfig {
    /// The doubling must stay within `u64`, and a challenge needs at least one flip.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(2..=64).contains(&self.max_flips) {
            return Err(ValidationError::InvalidMaxFlips(self.max_flips));
        }
        Ok(())
    }
}

/// Top-level configuration, typically read from `patripoly.yaml`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding one JSON document per store key.
    pub data_dir: PathBuf,
    /// Duplicador parameters.
    pub challenge: ChallengeConfig,
    /// Monthly cost of living assumed when no lifestyle items exist.
    pub default_monthly_cost: Decimal,
    /// Passive-income goal per month.
    pub monthly_cashflow_goal: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./patripoly-data"),
            challenge: ChallengeConfig::default(),
            default_monthly_cost: Decimal::new(2500, 0),
            monthly_cashflow_goal: Decimal::new(2000, 0),
        }
    }
}

impl AppConfig {
    /// Validate nested sections and monetary defaults.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.challenge.validate()?;
        if self.default_monthly_cost < Decimal::ZERO || self.monthly_cashflow_goal < Decimal::ZERO
        {
            return Err(ValidationError::NegativeAmount);
        }
        Ok(())
    }
}
