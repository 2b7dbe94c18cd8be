#![deny(warnings)]

//! Core domain models and invariants for Patripoly.
//!
//! This crate defines the serializable types shared by the level resolver,
//! the Duplicador challenge, the achievement evaluator and the ledger, along
//! with validation helpers that guard the user-facing invariants.

mod config;
mod format;
mod notify;

pub use config::{AppConfig, ChallengeConfig};
pub use format::{
    format_compact, format_compact_eur, format_currency, format_grouped, format_percent,
    round_whole,
};
pub use notify::{LogNotifier, Notification, Notifier, RecordingNotifier};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// One documented action taken during a Duplicador flip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLog {
    /// Unique identifier within the challenge instance.
    pub id: String,
    /// Flip the action was logged against.
    pub flip: u32,
    /// Free-form description entered by the user (never empty).
    pub description: String,
    /// Calendar date chosen by the user.
    pub date: NaiveDate,
    /// Challenge amount at the time the action was logged.
    pub amount: u64,
}

/// Persisted progress of a Duplicador challenge.
///
/// Serialized in camelCase so previously stored browser data
/// (`{"currentFlip":3,"currentAmount":4,...}`) loads unchanged. Missing
/// fields fall back to the initial state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChallengeSnapshot {
    /// Current flip in `[1, max_flips]`.
    pub current_flip: u32,
    /// Always `2^(current_flip - 1)`.
    pub current_amount: u64,
    /// Actions in the order they were logged.
    pub action_logs: Vec<ActionLog>,
    /// True exactly when `current_flip == max_flips`.
    pub is_completed: bool,
}

impl Default for ChallengeSnapshot {
    fn default() -> Self {
        Self {
            current_flip: 1,
            current_amount: 1,
            action_logs: Vec::new(),
            is_completed: false,
        }
    }
}

impl ChallengeSnapshot {
    /// Number of actions logged against `flip`.
    pub fn actions_for_flip(&self, flip: u32) -> usize {
        self.action_logs.iter().filter(|l| l.flip == flip).count()
    }
}

/// Aggregate wealth figures consumed by the dashboard.
///
/// All figures are monthly where that makes sense (`cashflow`,
/// `ingresos_activos`, `gastos`) and default to zero when absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WealthAggregate {
    /// Net worth: assets minus liabilities.
    pub patrimonio_total: Decimal,
    /// Passive income normalized to a month.
    pub cashflow: Decimal,
    /// Active (work) income normalized to a month.
    pub ingresos_activos: Decimal,
    /// Expenses recorded for the selected month.
    pub gastos: Decimal,
    /// Current savings balance.
    pub nivel_ahorro: Decimal,
    /// Share of the desired lifestyle already owned, in percent.
    pub progreso_calidad_vida: Decimal,
}

impl WealthAggregate {
    /// Months of expenses the savings balance covers.
    ///
    /// Returns `None` when there are no expenses to cover.
    pub fn months_covered(&self) -> Option<Decimal> {
        if self.gastos <= Decimal::ZERO {
            return None;
        }
        Some(self.nivel_ahorro / self.gastos)
    }
}

/// Validation errors for user input and persisted state.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Action descriptions must contain visible text.
    #[error("action description must not be empty")]
    EmptyDescription,
    /// Record names must contain visible text.
    #[error("name must not be empty")]
    EmptyName,
    /// Payouts, savings and withdrawals must be strictly positive.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    /// Costs and values must be non-negative.
    #[error("amount must not be negative")]
    NegativeAmount,
    /// Withdrawals cannot exceed the saved balance.
    #[error("cannot withdraw {requested}: only {available} saved")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },
    /// Flip outside `[1, max_flips]`.
    #[error("flip {flip} is outside [1, {max}]")]
    FlipOutOfRange { flip: u32, max: u32 },
    /// Stored amount disagrees with the doubling rule.
    #[error("flip {flip} must hold {expected}, found {found}")]
    AmountMismatch { flip: u32, expected: u64, found: u64 },
    /// Completion flag disagrees with the flip counter.
    #[error("completion flag inconsistent with flip {0}")]
    CompletionMismatch(u32),
    /// An action was logged against a flip not yet reached.
    #[error("action {id} references future flip {flip}")]
    FutureAction { id: String, flip: u32 },
    /// Two records share an identifier.
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    /// The challenge length must fit the doubling range of `u64`.
    #[error("max flips {0} must be within [2, 64]")]
    InvalidMaxFlips(u32),
}

/// Amount held at `flip`: `2^(flip - 1)`. Flip 0 is treated as flip 1.
pub fn expected_amount(flip: u32) -> u64 {
    let exp = flip.max(1) - 1;
    1u64 << exp.min(63)
}

/// Validate a free-text action description.
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(())
}

/// Validate a record name.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

/// Validate a strictly positive monetary amount.
pub fn validate_positive(amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(())
}

/// Validate a non-negative monetary amount.
pub fn validate_non_negative(amount: Decimal) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount);
    }
    Ok(())
}

/// Validate a persisted challenge against the doubling and completion rules.
pub fn validate_snapshot(
    snapshot: &ChallengeSnapshot,
    config: &ChallengeConfig,
) -> Result<(), ValidationError> {
    config.validate()?;
    let flip = snapshot.current_flip;
    if !(1..=config.max_flips).contains(&flip) {
        return Err(ValidationError::FlipOutOfRange {
            flip,
            max: config.max_flips,
        });
    }
    let expected = expected_amount(flip);
    if snapshot.current_amount != expected {
        return Err(ValidationError::AmountMismatch {
            flip,
            expected,
            found: snapshot.current_amount,
        });
    }
    if snapshot.is_completed != (flip == config.max_flips) {
        return Err(ValidationError::CompletionMismatch(flip));
    }
    let mut ids = BTreeSet::new();
    for log in &snapshot.action_logs {
        validate_description(&log.description)?;
        if log.flip > flip || log.flip == 0 {
            return Err(ValidationError::FutureAction {
                id: log.id.clone(),
                flip: log.flip,
            });
        }
        if !ids.insert(log.id.as_str()) {
            return Err(ValidationError::DuplicateId(log.id.clone()));
        }
    }
    Ok(())
}

/// Percentage `part / whole * 100`, or zero when `whole` is not positive.
pub fn ratio_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part / whole * Decimal::ONE_HUNDRED
}

/// Generate a record id from the wall clock in milliseconds, skipping ids
/// already present in `existing`.
pub fn next_record_id<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: BTreeSet<&str> = existing.into_iter().collect();
    let mut candidate = Utc::now().timestamp_millis().max(0);
    loop {
        let id = candidate.to_string();
        if !taken.contains(id.as_str()) {
            return id;
        }
        candidate += 1;
    }
}
