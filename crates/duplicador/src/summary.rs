//! Derived display figures for the Duplicador screen.

use patri_core::{expected_amount, ChallengeConfig, ChallengeSnapshot};
use patri_levels::{flip_tier, flip_tier_progress, next_flip_tier, FlipTier};
use serde::Serialize;

/// Upcoming flips listed after the current one.
const UPCOMING: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct UpcomingFlip {
    pub flip: u32,
    pub amount: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChallengeStats {
    pub flips_completed: u32,
    pub actions_logged: usize,
    /// Current multiplier over the initial 1€, shown as `×N`.
    pub multiplier: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FlipStatus {
    Completed,
    Current,
    Locked,
}

/// One step of the journey map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct JourneyStop {
    pub flip: u32,
    pub amount: u64,
    pub status: FlipStatus,
    pub has_actions: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChallengeSummary {
    pub current_flip: u32,
    pub current_amount: u64,
    pub is_completed: bool,
    /// `round(flip / max_flips * 100)`.
    pub overall_progress: u8,
    pub remaining_to_target: u64,
    pub upcoming: Vec<UpcomingFlip>,
    pub stats: ChallengeStats,
    pub tier: &'static FlipTier,
    pub tier_progress: u8,
    pub next_tier: &'static FlipTier,
    pub journey: Vec<JourneyStop>,
}

impl ChallengeSummary {
    pub fn new(snapshot: &ChallengeSnapshot, config: &ChallengeConfig) -> Self {
        let max = config.max_flips.max(1);
        let flip = snapshot.current_flip.clamp(1, max);
        let amount = snapshot.current_amount;

        let overall = (200 * u64::from(flip) + u64::from(max)) / (2 * u64::from(max));
        let upcoming = (flip + 1..=max)
            .take(UPCOMING as usize)
            .map(|f| UpcomingFlip {
                flip: f,
                amount: expected_amount(f),
            })
            .collect();
        let journey = (1..=max)
            .map(|f| JourneyStop {
                flip: f,
                amount: expected_amount(f),
                status: if snapshot.is_completed || f < flip {
                    FlipStatus::Completed
                } else if f == flip {
                    FlipStatus::Current
                } else {
                    FlipStatus::Locked
                },
                has_actions: snapshot.actions_for_flip(f) > 0,
            })
            .collect();

        Self {
            current_flip: flip,
            current_amount: amount,
            is_completed: snapshot.is_completed,
            overall_progress: overall.min(100) as u8,
            remaining_to_target: config.target_amount.saturating_sub(amount),
            upcoming,
            stats: ChallengeStats {
                flips_completed: flip - 1,
                actions_logged: snapshot.action_logs.len(),
                multiplier: amount,
            },
            tier: flip_tier(flip),
            tier_progress: flip_tier_progress(flip),
            next_tier: next_flip_tier(flip),
            journey,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use patri_core::ActionLog;

    fn at(flip: u32, completed: bool) -> ChallengeSnapshot {
        ChallengeSnapshot {
            current_flip: flip,
            current_amount: expected_amount(flip),
            action_logs: vec![],
            is_completed: completed,
        }
    }

    #[test]
    fn fresh_challenge() {
        let s = ChallengeSummary::new(&ChallengeSnapshot::default(), &ChallengeConfig::default());
        assert_eq!(s.overall_progress, 5);
        assert_eq!(s.remaining_to_target, 999_999);
        assert_eq!(
            s.upcoming.iter().map(|u| u.amount).collect::<Vec<_>>(),
            vec![2, 4, 8, 16, 32]
        );
        assert_eq!(s.stats.flips_completed, 0);
        assert_eq!(s.tier.name, "Semilla");
        assert_eq!(s.tier_progress, 50);
        assert_eq!(s.next_tier.name, "Brote");
        assert_eq!(s.journey.len(), 21);
        assert_eq!(s.journey[0].status, FlipStatus::Current);
        assert_eq!(s.journey[1].status, FlipStatus::Locked);
    }

    #[test]
    fn near_the_end_upcoming_shrinks() {
        let s = ChallengeSummary::new(&at(19, false), &ChallengeConfig::default());
        assert_eq!(s.upcoming.len(), 2);
        assert_eq!(s.overall_progress, 90);
        assert_eq!(s.journey[17].status, FlipStatus::Completed);
        assert_eq!(s.journey[18].status, FlipStatus::Current);
    }

    #[test]
    fn completed_challenge() {
        let s = ChallengeSummary::new(&at(21, true), &ChallengeConfig::default());
        assert_eq!(s.overall_progress, 100);
        assert_eq!(s.remaining_to_target, 0);
        assert!(s.upcoming.is_empty());
        assert_eq!(s.stats.flips_completed, 20);
        assert_eq!(s.stats.multiplier, 1_048_576);
        assert_eq!(s.tier.name, "Leyenda");
        assert!(s.journey.iter().all(|j| j.status == FlipStatus::Completed));
    }

    #[test]
    fn journey_marks_documented_flips() {
        let mut snap = at(3, false);
        snap.action_logs.push(ActionLog {
            id: "1".into(),
            flip: 2,
            description: "venta".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            amount: 2,
        });
        let s = ChallengeSummary::new(&snap, &ChallengeConfig::default());
        assert!(!s.journey[0].has_actions);
        assert!(s.journey[1].has_actions);
        assert_eq!(s.stats.actions_logged, 1);
    }
}
