#![deny(warnings)]

//! Dashboard render model for Patripoly.
//!
//! The [`Dashboard`] owns the store behind an [`ObservableStore`] and keeps a
//! cached [`DashboardView`]. Writes to ledger or challenge keys mark the cache
//! stale through a subscription; the next [`Dashboard::view`] recomputes it and
//! runs level-up detection.

mod levelup;

pub use levelup::{check_level_up, LevelUp};

use achievements::{AchievementError, AchievementRule, AchievementTable};
use duplicador::{load_progress, ChallengeError, ChallengeSummary};
use ledger::{EmergencyFund, FinancialHealth, Ledger, LedgerError, NetWorthRank, YearMonth};
use patri_core::{
    format_currency, format_percent, round_whole, AppConfig, Notifier, ValidationError,
    WealthAggregate,
};
use patri_levels::{LevelPalette, LevelStyle, LevelTableError, WealthLevel, WealthLevelTable};
use persistence::{keys, ObservableStore, Store, StoreError, StoreEvent, SubscriptionId};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Challenge(#[from] ChallengeError),
    #[error(transparent)]
    Achievements(#[from] AchievementError),
    #[error(transparent)]
    Levels(#[from] LevelTableError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Trend {
    Up,
    Down,
}

/// One summary card: formatted value plus trend arrow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryCard {
    pub id: &'static str,
    pub title: &'static str,
    pub value: String,
    pub description: &'static str,
    pub trend: Trend,
}

fn trend(up: bool) -> Trend {
    if up {
        Trend::Up
    } else {
        Trend::Down
    }
}

/// Summary cards shown at the top of the dashboard.
pub fn summary_cards(agg: &WealthAggregate) -> Vec<SummaryCard> {
    let quality = round_whole(agg.progreso_calidad_vida)
        .to_u8()
        .unwrap_or(0)
        .min(100);
    vec![
        SummaryCard {
            id: "patrimonio",
            title: "Patrimonio Total",
            value: format_currency(agg.patrimonio_total),
            description: "Valor neto total",
            trend: trend(agg.patrimonio_total > Decimal::ZERO),
        },
        SummaryCard {
            id: "cashflow",
            title: "Cashflow Mensual",
            value: format_currency(agg.cashflow),
            description: "Ingresos pasivos",
            trend: trend(agg.cashflow > Decimal::ZERO),
        },
        SummaryCard {
            id: "ingresos-activos",
            title: "Ingresos Activos",
            value: format_currency(agg.ingresos_activos),
            description: "Ingresos del trabajo",
            trend: Trend::Up,
        },
        SummaryCard {
            id: "gastos",
            title: "Gastos del Mes",
            value: format_currency(agg.gastos),
            description: "Gastos registrados",
            trend: trend(agg.gastos <= agg.ingresos_activos + agg.cashflow),
        },
        SummaryCard {
            id: "ahorros",
            title: "Nivel de Ahorro",
            value: format_currency(agg.nivel_ahorro),
            description: "Fondo de emergencia",
            trend: trend(agg.nivel_ahorro > agg.gastos * Decimal::from(3)),
        },
        SummaryCard {
            id: "calidad",
            title: "Calidad de Vida",
            value: format_percent(quality),
            description: "Objetivo alcanzado",
            trend: trend(quality > 50),
        },
    ]
}

/// Current level block.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelView {
    pub current: WealthLevel,
    pub next: Option<WealthLevel>,
    pub progress: u8,
    pub style: Option<LevelStyle>,
    /// Amount still missing to reach the next level.
    pub to_next: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AchievementsView {
    pub unlocked: Vec<AchievementRule>,
    pub locked: Vec<AchievementRule>,
    pub counter: String,
}

/// Everything the dashboard screen renders.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub month: YearMonth,
    pub aggregate: WealthAggregate,
    pub cards: Vec<SummaryCard>,
    pub rank: NetWorthRank,
    pub level: LevelView,
    pub health: FinancialHealth,
    pub emergency_fund: EmergencyFund,
    pub cashflow_goal_progress: Decimal,
    pub challenge: ChallengeSummary,
    pub achievements: AchievementsView,
    pub level_up: Option<LevelUp>,
}

fn watched(key: &str) -> bool {
    key == keys::DUPLICADOR_PROGRESS || keys::LEDGER.contains(&key)
}

pub struct Dashboard<S, N> {
    store: ObservableStore<S>,
    notifier: N,
    config: AppConfig,
    levels: WealthLevelTable,
    palette: LevelPalette,
    achievements: AchievementTable,
    stale: Rc<Cell<bool>>,
    subscription: SubscriptionId,
    cached: Option<DashboardView>,
    renders: u64,
}

impl<S: Store, N: Notifier> Dashboard<S, N> {
    /// Dashboard over the standard level and achievement tables.
    pub fn open(store: S, notifier: N, config: AppConfig) -> Result<Self, DashboardError> {
        Self::with_tables(
            store,
            notifier,
            config,
            WealthLevelTable::standard(),
            LevelPalette::standard(),
            AchievementTable::standard()?,
        )
    }

    pub fn with_tables(
        store: S,
        notifier: N,
        config: AppConfig,
        levels: WealthLevelTable,
        palette: LevelPalette,
        achievements: AchievementTable,
    ) -> Result<Self, DashboardError> {
        config.validate()?;
        palette.check_covers(&levels)?;
        let mut store = ObservableStore::new(store);
        let stale = Rc::new(Cell::new(true));
        let flag = Rc::clone(&stale);
        let subscription = store.subscribe(move |event: &StoreEvent| {
            if watched(&event.key) {
                debug!(key = %event.key, "dashboard inputs changed");
                flag.set(true);
            }
        });
        Ok(Self {
            store,
            notifier,
            config,
            levels,
            palette,
            achievements,
            stale,
            subscription,
            cached: None,
            renders: 0,
        })
    }

    /// Store handle for writers; writes through it invalidate the view.
    pub fn store_mut(&mut self) -> &mut ObservableStore<S> {
        &mut self.store
    }

    pub fn store(&self) -> &ObservableStore<S> {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn levels(&self) -> &WealthLevelTable {
        &self.levels
    }

    pub fn achievements(&self) -> &AchievementTable {
        &self.achievements
    }

    /// True when a watched key changed since the last render.
    pub fn is_stale(&self) -> bool {
        self.stale.get()
    }

    /// How many times the view was recomputed.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// The view for `month`, recomputed only when inputs changed.
    pub fn view(&mut self, month: YearMonth) -> Result<&DashboardView, DashboardError> {
        let view = match self.cached.take() {
            Some(view) if !self.stale.get() && view.month == month => view,
            _ => {
                let view = self.render(month)?;
                self.stale.set(false);
                self.renders += 1;
                view
            }
        };
        Ok(self.cached.insert(view))
    }

    fn render(&mut self, month: YearMonth) -> Result<DashboardView, DashboardError> {
        let ledger = Ledger::load(&self.store)?;
        let aggregate = ledger.aggregate(month);
        let wealth = aggregate.patrimonio_total;

        let status = self.levels.status(wealth);
        let level = LevelView {
            current: status.current.clone(),
            next: status.next.cloned(),
            progress: status.progress,
            style: self.palette.style(status.current.level).cloned(),
            to_next: status.next.map(|n| (n.min_wealth - wealth).max(Decimal::ZERO)),
        };
        let level_up = check_level_up(&mut self.store, &self.notifier, &level.current)?;

        let snapshot = load_progress(&self.store, &self.config.challenge)?.unwrap_or_default();
        let report = self.achievements.evaluate(&snapshot);
        let achievements = AchievementsView {
            counter: report.counter(),
            unlocked: report.unlocked.into_iter().cloned().collect(),
            locked: report.locked.into_iter().cloned().collect(),
        };

        info!(
            %month,
            level = level.current.level,
            progress = level.progress,
            badges = achievements.unlocked.len(),
            "dashboard rendered"
        );
        Ok(DashboardView {
            month,
            cards: summary_cards(&aggregate),
            rank: NetWorthRank::for_net_worth(wealth),
            health: FinancialHealth::assess(&aggregate),
            emergency_fund: ledger.emergency_fund(self.config.default_monthly_cost),
            cashflow_goal_progress: ledger.cashflow_goal(&self.config),
            challenge: ChallengeSummary::new(&snapshot, &self.config.challenge),
            achievements,
            level,
            level_up,
            aggregate,
        })
    }

    /// Stop listening for changes and hand back the store.
    pub fn into_store(mut self) -> S {
        self.store.unsubscribe(self.subscription);
        self.store.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_follow_aggregate() {
        let agg = WealthAggregate {
            patrimonio_total: Decimal::from(25_000),
            cashflow: Decimal::from(850),
            ingresos_activos: Decimal::from(3_200),
            gastos: Decimal::from(1_000),
            nivel_ahorro: Decimal::from(1_500),
            progreso_calidad_vida: Decimal::from(35),
        };
        let cards = summary_cards(&agg);
        assert_eq!(cards.len(), 6);
        assert_eq!(cards[0].value, "25.000\u{a0}€");
        assert_eq!(cards[1].value, "850\u{a0}€");
        assert_eq!(cards[4].trend, Trend::Down);
        assert_eq!(cards[5].value, "35%");
        assert_eq!(cards[5].trend, Trend::Down);
    }

    #[test]
    fn empty_aggregate_cards() {
        let cards = summary_cards(&WealthAggregate::default());
        assert_eq!(cards[0].value, "0\u{a0}€");
        assert_eq!(cards[0].trend, Trend::Down);
        assert_eq!(cards[3].trend, Trend::Up);
    }

    #[test]
    fn watched_keys() {
        assert!(watched(keys::DUPLICADOR_PROGRESS));
        assert!(watched(keys::EXPENSES));
        assert!(!watched(keys::PREVIOUS_LEVEL));
        assert!(!watched(keys::EXPENSE_CATEGORIES));
    }
}
