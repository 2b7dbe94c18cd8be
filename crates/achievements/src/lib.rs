#![deny(warnings)]

//! Duplicador badges: a YAML-configured rule table and its evaluator.
//!
//! Evaluation is stateless. Every call checks every rule against the
//! current [`ChallengeSnapshot`] and partitions the table into unlocked and
//! locked badges, keeping table order within each side.

use patri_core::ChallengeSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

const STANDARD_TABLE: &str = include_str!("../../../assets/achievements.yaml");

/// What a badge requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// At least `count` flips completed (`current_flip - 1 >= count`).
    FlipsCompleted { count: u32 },
    /// Current flip is `flip` or later.
    ReachedFlip { flip: u32 },
    /// Current amount is at least `amount`.
    AmountAtLeast { amount: u64 },
    /// At least `count` actions logged across all flips.
    ActionsLogged { count: usize },
}

impl Condition {
    pub fn is_met(&self, snapshot: &ChallengeSnapshot) -> bool {
        match *self {
            Condition::FlipsCompleted { count } => {
                snapshot.current_flip.saturating_sub(1) >= count
            }
            Condition::ReachedFlip { flip } => snapshot.current_flip >= flip,
            Condition::AmountAtLeast { amount } => snapshot.current_amount >= amount,
            Condition::ActionsLogged { count } => snapshot.action_logs.len() >= count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub condition: Condition,
}

#[derive(Debug, Error)]
pub enum AchievementError {
    #[error("achievement table is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("achievement table is empty")]
    Empty,
    #[error("duplicate achievement id {0:?}")]
    DuplicateId(String),
    #[error("achievement {0:?} has an empty name")]
    EmptyName(String),
}

/// Validated, ordered badge table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AchievementTable {
    rules: Vec<AchievementRule>,
}

/// Partition produced by [`AchievementTable::evaluate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AchievementReport<'a> {
    pub unlocked: Vec<&'a AchievementRule>,
    pub locked: Vec<&'a AchievementRule>,
}

impl AchievementReport<'_> {
    pub fn total(&self) -> usize {
        self.unlocked.len() + self.locked.len()
    }

    /// Header text such as `3/10`.
    pub fn counter(&self) -> String {
        format!("{}/{}", self.unlocked.len(), self.total())
    }
}

impl AchievementTable {
    /// The ten built-in badges.
    pub fn standard() -> Result<Self, AchievementError> {
        Self::from_yaml(STANDARD_TABLE)
    }

    pub fn from_yaml(text: &str) -> Result<Self, AchievementError> {
        let rules: Vec<AchievementRule> = serde_yaml::from_str(text)?;
        Self::new(rules)
    }

    pub fn new(rules: Vec<AchievementRule>) -> Result<Self, AchievementError> {
        if rules.is_empty() {
            return Err(AchievementError::Empty);
        }
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(AchievementError::DuplicateId(rule.id.clone()));
            }
            if rule.name.trim().is_empty() {
                return Err(AchievementError::EmptyName(rule.id.clone()));
            }
        }
        debug!(count = rules.len(), "achievement table loaded");
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[AchievementRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn evaluate(&self, snapshot: &ChallengeSnapshot) -> AchievementReport<'_> {
        let (unlocked, locked) = self
            .rules
            .iter()
            .partition(|r| r.condition.is_met(snapshot));
        AchievementReport { unlocked, locked }
    }

    /// Badges unlocked in `after` that were locked in `before`.
    pub fn newly_unlocked(
        &self,
        before: &ChallengeSnapshot,
        after: &ChallengeSnapshot,
    ) -> Vec<&AchievementRule> {
        self.rules
            .iter()
            .filter(|r| !r.condition.is_met(before) && r.condition.is_met(after))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use patri_core::{expected_amount, ActionLog};
    use proptest::prelude::*;

    fn snapshot(flip: u32, logs: usize) -> ChallengeSnapshot {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        ChallengeSnapshot {
            current_flip: flip,
            current_amount: expected_amount(flip),
            action_logs: (0..logs)
                .map(|i| ActionLog {
                    id: i.to_string(),
                    flip: 1,
                    description: "acción".into(),
                    date,
                    amount: 1,
                })
                .collect(),
            is_completed: flip == 21,
        }
    }

    fn ids<'a>(rules: &[&'a AchievementRule]) -> Vec<&'a str> {
        rules.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn standard_table_has_ten_badges() {
        let table = AchievementTable::standard().unwrap();
        assert_eq!(table.len(), 10);
        assert_eq!(table.rules()[0].id, "first_flip");
        assert_eq!(table.rules()[9].id, "rocket");
    }

    #[test]
    fn nothing_unlocked_at_start() {
        let table = AchievementTable::standard().unwrap();
        let report = table.evaluate(&snapshot(1, 0));
        assert!(report.unlocked.is_empty());
        assert_eq!(report.counter(), "0/10");
    }

    #[test]
    fn flip_eleven_unlocks_expected_set() {
        let table = AchievementTable::standard().unwrap();
        // flip 11 holds 1024
        let report = table.evaluate(&snapshot(11, 3));
        assert_eq!(
            ids(&report.unlocked),
            vec!["first_flip", "five_flips", "ten_flips", "halfway", "thousand"]
        );
        assert_eq!(report.total(), 10);
    }

    #[test]
    fn completion_unlocks_everything_but_documenter() {
        let table = AchievementTable::standard().unwrap();
        let report = table.evaluate(&snapshot(21, 9));
        assert_eq!(ids(&report.locked), vec!["documenter"]);
        let report = table.evaluate(&snapshot(21, 10));
        assert!(report.locked.is_empty());
    }

    #[test]
    fn boundaries_follow_strict_and_inclusive_checks() {
        let table = AchievementTable::standard().unwrap();
        let at = |flip| ids(&table.evaluate(&snapshot(flip, 0)).unlocked).contains(&"rocket");
        assert!(!at(15));
        assert!(at(16));
        let five = |flip| ids(&table.evaluate(&snapshot(flip, 0)).unlocked).contains(&"five_flips");
        assert!(!five(5));
        assert!(five(6));
    }

    #[test]
    fn newly_unlocked_reports_the_difference() {
        let table = AchievementTable::standard().unwrap();
        let fresh = table.newly_unlocked(&snapshot(1, 0), &snapshot(2, 1));
        assert_eq!(ids(&fresh), vec!["first_flip"]);
        assert!(table
            .newly_unlocked(&snapshot(3, 0), &snapshot(3, 0))
            .is_empty());
    }

    #[test]
    fn rejects_bad_tables() {
        let dup = "
- {id: a, name: A, description: '', icon: x, color: y, condition: {kind: reached_flip, flip: 2}}
- {id: a, name: B, description: '', icon: x, color: y, condition: {kind: reached_flip, flip: 3}}
";
        assert!(matches!(
            AchievementTable::from_yaml(dup),
            Err(AchievementError::DuplicateId(id)) if id == "a"
        ));
        let unnamed = "
- {id: a, name: ' ', description: '', icon: x, color: y, condition: {kind: actions_logged, count: 1}}
";
        assert!(matches!(
            AchievementTable::from_yaml(unnamed),
            Err(AchievementError::EmptyName(_))
        ));
        assert!(matches!(
            AchievementTable::from_yaml("[]"),
            Err(AchievementError::Empty)
        ));
        assert!(matches!(
            AchievementTable::from_yaml("- {id: a, condition: {kind: nope}}"),
            Err(AchievementError::Parse(_))
        ));
    }

    proptest! {
        #[test]
        fn unlocks_are_monotonic(flip in 1u32..21, logs in 0usize..15, step in 1u32..5) {
            let table = AchievementTable::standard().unwrap();
            let before = snapshot(flip, logs);
            let after = snapshot((flip + step).min(21), logs + 1);
            let earlier = table.evaluate(&before);
            let later = table.evaluate(&after);
            for rule in &earlier.unlocked {
                prop_assert!(later.unlocked.contains(rule));
            }
            prop_assert_eq!(later.total(), table.len());
        }
    }
}
