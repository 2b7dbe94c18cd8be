#![deny(warnings)]

//! The Duplicador challenge: double a symbolic 1€ until it passes one million.
//!
//! The engine is a small state machine (`Intro → InProgress → Completed`)
//! over a [`ChallengeSnapshot`]. Every mutation is written to the injected
//! [`Store`] before it becomes visible, so a reopened engine always resumes
//! exactly where the previous one stopped. Badges a transition unlocks are
//! announced through the [`Notifier`] right after the write.

mod summary;

pub use summary::{ChallengeStats, ChallengeSummary, FlipStatus, JourneyStop, UpcomingFlip};

use achievements::{AchievementError, AchievementTable};
use chrono::NaiveDate;
use patri_core::{
    expected_amount, format_currency, next_record_id, validate_description, validate_snapshot,
    ActionLog, ChallengeConfig, ChallengeSnapshot, Notifier, ValidationError,
};
use persistence::{keys, Store, StoreError, StoreExt};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Message callers must show before [`DuplicadorEngine::reset`].
pub const RESET_WARNING: &str =
    "Reiniciar borra todos los flips y acciones registradas. Esta acción no se puede deshacer.";

/// Where the challenge stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ChallengeState {
    /// Not started, or reset.
    Intro,
    /// Working on `flip`, currently holding `amount`.
    InProgress { flip: u32, amount: u64 },
    /// Final flip reached.
    Completed { amount: u64 },
}

/// Errors produced by challenge transitions.
#[derive(Debug, Error)]
pub enum ChallengeError {
    #[error("the challenge has not been started")]
    NotStarted,
    #[error("the challenge is already running")]
    AlreadyStarted,
    #[error("the challenge is already completed")]
    AlreadyCompleted,
    /// A flip can only be completed after documenting at least one action.
    #[error("flip {0} has no logged actions yet")]
    NoActionsForFlip(u32),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Achievements(#[from] AchievementError),
}

/// Proof that the caller showed [`RESET_WARNING`]; obtained from
/// [`DuplicadorEngine::reset_warning`].
#[derive(Debug)]
pub struct ResetConfirmation {
    _private: (),
}

/// Read the persisted challenge. `None` means the challenge is still at the
/// intro.
///
/// Flip, amount and completion flag are derived from each other, so a stored
/// snapshot that contradicts the doubling rule is repaired from its flip.
/// Action logs cannot be repaired: empty descriptions, duplicate ids or
/// actions on flips not yet reached are reported as validation errors.
pub fn load_progress<S: Store + ?Sized>(
    store: &S,
    config: &ChallengeConfig,
) -> Result<Option<ChallengeSnapshot>, ChallengeError> {
    let stored: Option<ChallengeSnapshot> = store.load_as(keys::DUPLICADOR_PROGRESS)?;
    let Some(stored) = stored else {
        return Ok(None);
    };
    if let Err(err) = validate_snapshot(&stored, config) {
        warn!(%err, "stored challenge is inconsistent");
    }
    let snap = normalize(stored, config);
    validate_snapshot(&snap, config)?;
    Ok(Some(snap))
}

fn normalize(mut snap: ChallengeSnapshot, config: &ChallengeConfig) -> ChallengeSnapshot {
    snap.current_flip = snap.current_flip.clamp(1, config.max_flips);
    snap.current_amount = expected_amount(snap.current_flip);
    snap.is_completed = snap.current_flip == config.max_flips;
    snap
}

/// Duplicador state machine bound to a store and a notifier.
pub struct DuplicadorEngine<S, N> {
    store: S,
    notifier: N,
    config: ChallengeConfig,
    badges: AchievementTable,
    progress: Option<ChallengeSnapshot>,
}

impl<S: Store, N: Notifier> DuplicadorEngine<S, N> {
    /// Load persisted progress from `store`, or start at the intro.
    pub fn open(store: S, notifier: N, config: ChallengeConfig) -> Result<Self, ChallengeError> {
        Self::with_badges(store, notifier, config, AchievementTable::standard()?)
    }

    /// Like [`open`](Self::open), announcing unlocks from a custom badge table.
    pub fn with_badges(
        store: S,
        notifier: N,
        config: ChallengeConfig,
        badges: AchievementTable,
    ) -> Result<Self, ChallengeError> {
        config.validate()?;
        let progress = load_progress(&store, &config)?;
        info!(
            started = progress.is_some(),
            flip = progress.as_ref().map_or(0, |p| p.current_flip),
            "duplicador loaded"
        );
        Ok(Self {
            store,
            notifier,
            config,
            badges,
            progress,
        })
    }

    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    pub fn state(&self) -> ChallengeState {
        match &self.progress {
            None => ChallengeState::Intro,
            Some(p) if p.is_completed => ChallengeState::Completed {
                amount: p.current_amount,
            },
            Some(p) => ChallengeState::InProgress {
                flip: p.current_flip,
                amount: p.current_amount,
            },
        }
    }

    /// Persisted progress, `None` at the intro.
    pub fn progress(&self) -> Option<&ChallengeSnapshot> {
        self.progress.as_ref()
    }

    /// Current progress, or the initial snapshot at the intro.
    pub fn snapshot(&self) -> ChallengeSnapshot {
        self.progress.clone().unwrap_or_default()
    }

    /// Display figures derived from the current snapshot.
    pub fn summary(&self) -> ChallengeSummary {
        ChallengeSummary::new(&self.snapshot(), &self.config)
    }

    /// Intro → flip 1 holding 1.
    pub fn start(&mut self) -> Result<(), ChallengeError> {
        if self.progress.is_some() {
            return Err(ChallengeError::AlreadyStarted);
        }
        self.persist(ChallengeSnapshot::default())?;
        info!("duplicador started");
        Ok(())
    }

    /// Document an action for the current flip. Flip and amount are unchanged.
    pub fn log_action(
        &mut self,
        description: &str,
        date: NaiveDate,
    ) -> Result<ActionLog, ChallengeError> {
        let mut next = self.running()?.clone();
        validate_description(description)?;
        let log = ActionLog {
            id: next_record_id(next.action_logs.iter().map(|l| l.id.as_str())),
            flip: next.current_flip,
            description: description.trim().to_string(),
            date,
            amount: next.current_amount,
        };
        next.action_logs.push(log.clone());
        self.persist(next)?;
        info!(flip = log.flip, id = %log.id, "action logged");
        self.notifier.notify(
            "Acción registrada",
            &format!("Flip {} documentado exitosamente", log.flip),
        );
        Ok(log)
    }

    /// True when the current flip is running and has at least one action.
    pub fn can_complete_flip(&self) -> bool {
        self.running()
            .map(|p| p.actions_for_flip(p.current_flip) > 0)
            .unwrap_or(false)
    }

    /// Advance to the next flip, doubling the amount.
    pub fn complete_flip(&mut self) -> Result<ChallengeState, ChallengeError> {
        let mut next = self.running()?.clone();
        let done = next.current_flip;
        if next.actions_for_flip(done) == 0 {
            return Err(ChallengeError::NoActionsForFlip(done));
        }
        next.current_flip = done + 1;
        next.current_amount = expected_amount(next.current_flip);
        next.is_completed = next.current_flip == self.config.max_flips;
        let (flip, amount, completed) = (next.current_flip, next.current_amount, next.is_completed);
        self.persist(next)?;
        info!(flip, amount, completed, "flip completed");
        if completed {
            self.notifier
                .notify("¡Felicitaciones!", "¡Has completado el Duplicador Challenge!");
        } else {
            self.notifier.notify(
                "Flip completado",
                &format!(
                    "Flip {done} superado. Ahora vas por el flip {flip} con {}",
                    format_currency(Decimal::from(amount))
                ),
            );
        }
        Ok(self.state())
    }

    /// The warning to show and the token [`reset`](Self::reset) requires.
    pub fn reset_warning(&self) -> (&'static str, ResetConfirmation) {
        (RESET_WARNING, ResetConfirmation { _private: () })
    }

    /// Back to the intro, discarding every flip and action.
    pub fn reset(&mut self, _confirmed: ResetConfirmation) -> Result<(), ChallengeError> {
        self.store.remove(keys::DUPLICADOR_PROGRESS)?;
        let discarded = self.progress.take().map_or(0, |p| p.action_logs.len());
        warn!(discarded, "duplicador reset");
        Ok(())
    }

    /// Actions logged against `flip`, oldest first.
    pub fn logs_for_flip(&self, flip: u32) -> Vec<&ActionLog> {
        self.progress
            .iter()
            .flat_map(|p| p.action_logs.iter())
            .filter(|l| l.flip == flip)
            .collect()
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn running(&self) -> Result<&ChallengeSnapshot, ChallengeError> {
        match &self.progress {
            None => Err(ChallengeError::NotStarted),
            Some(p) if p.is_completed => Err(ChallengeError::AlreadyCompleted),
            Some(p) => Ok(p),
        }
    }

    /// Save `next`, then announce the badges it unlocks.
    fn persist(&mut self, next: ChallengeSnapshot) -> Result<(), ChallengeError> {
        self.store.save_as(keys::DUPLICADOR_PROGRESS, &next)?;
        let before = self.progress.take().unwrap_or_default();
        for badge in self.badges.newly_unlocked(&before, &next) {
            info!(badge = %badge.id, "achievement unlocked");
            self.notifier.notify(
                "¡Logro desbloqueado!",
                &format!("{} {}: {}", badge.icon, badge.name, badge.description),
            );
        }
        self.progress = Some(next);
        Ok(())
    }
}
