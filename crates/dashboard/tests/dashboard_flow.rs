use chrono::NaiveDate;
use dashboard::{Dashboard, DashboardError};
use duplicador::DuplicadorEngine;
use ledger::{HoldingKind, Ledger, YearMonth};
use patri_core::{AppConfig, RecordingNotifier};
use patri_levels::{LevelPalette, LevelStyle, WealthLevelTable};
use persistence::{keys, JsonDirStore, MemoryStore, Store};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;

fn march() -> YearMonth {
    "2024-03".parse().unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

#[test]
fn empty_store_renders_the_starting_point() {
    let notes = RecordingNotifier::new();
    let mut dash = Dashboard::open(MemoryStore::new(), &notes, AppConfig::default()).unwrap();
    let view = dash.view(march()).unwrap();
    assert_eq!(view.level.current.level, 1);
    assert_eq!(view.level.current.name, "Iniciador");
    assert_eq!(view.level.progress, 0);
    assert_eq!(view.level.to_next, Some(Decimal::from(500)));
    assert_eq!(view.challenge.current_flip, 1);
    assert_eq!(view.achievements.counter, "0/10");
    assert_eq!(view.emergency_fund.goal, Decimal::from(15_000));
    assert!(view.level_up.is_none());
    assert!(notes.sent().is_empty());
}

#[test]
fn ledger_writes_invalidate_and_level_up_notifies() {
    let notes = RecordingNotifier::new();
    let mut dash = Dashboard::open(MemoryStore::new(), &notes, AppConfig::default()).unwrap();
    dash.view(march()).unwrap();
    assert_eq!(dash.renders(), 1);

    // Nothing changed: cached view is reused.
    dash.view(march()).unwrap();
    assert_eq!(dash.renders(), 1);
    assert!(!dash.is_stale());

    let mut ledger = Ledger::load(dash.store()).unwrap();
    ledger
        .add_holding(
            dash.store_mut(),
            "Cuenta",
            Decimal::from(25_000),
            "savings",
            HoldingKind::Asset,
        )
        .unwrap();
    assert!(dash.is_stale());

    let view = dash.view(march()).unwrap();
    assert_eq!(view.level.current.name, "Estratega");
    assert_eq!(view.cards[0].value, "25.000\u{a0}€");
    let up = view.level_up.clone().unwrap();
    assert_eq!((up.from, up.to), (1, 5));
    assert_eq!(dash.renders(), 2);

    let sent = notes.take();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message, "¡Has alcanzado el nivel Estratega!");

    // Recording the level must not re-trigger a render.
    assert!(!dash.is_stale());
}

#[test]
fn month_change_recomputes_expenses() {
    let notes = RecordingNotifier::new();
    let mut dash = Dashboard::open(MemoryStore::new(), &notes, AppConfig::default()).unwrap();
    let mut ledger = Ledger::default();
    ledger
        .add_expense(dash.store_mut(), Decimal::from(700), "housing", Some("Alquiler"), day())
        .unwrap();
    assert_eq!(dash.view(march()).unwrap().aggregate.gastos, Decimal::from(700));
    let april: YearMonth = "2024-04".parse().unwrap();
    assert_eq!(dash.view(april).unwrap().aggregate.gastos, Decimal::ZERO);
    assert_eq!(dash.renders(), 2);
}

#[test]
fn challenge_progress_flows_into_badges() {
    let notes = RecordingNotifier::new();
    let mut dash = Dashboard::open(MemoryStore::new(), &notes, AppConfig::default()).unwrap();
    dash.view(march()).unwrap();
    let challenge = dash.config().challenge.clone();
    {
        let mut engine = DuplicadorEngine::open(dash.store_mut(), &notes, challenge).unwrap();
        engine.start().unwrap();
        for i in 0..6 {
            engine.log_action(&format!("acción {i}"), day()).unwrap();
            engine.complete_flip().unwrap();
        }
    }
    assert!(dash.is_stale());
    let view = dash.view(march()).unwrap();
    assert_eq!(view.challenge.current_flip, 7);
    assert_eq!(view.challenge.current_amount, 64);
    let unlocked: Vec<_> = view
        .achievements
        .unlocked
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(unlocked, vec!["first_flip", "five_flips"]);
    assert_eq!(view.achievements.counter, "2/10");
}

#[test]
fn palette_must_cover_the_table() {
    let short = LevelPalette::for_table(
        vec![LevelStyle {
            level: 1,
            icon: "star".into(),
            color: "bg-slate-500".into(),
        }],
        &WealthLevelTable::standard(),
    );
    assert!(short.is_err());
}

#[test]
fn broken_challenge_data_surfaces_as_error() {
    let mut store = MemoryStore::new();
    store
        .save(keys::DUPLICADOR_PROGRESS, json!({"currentFlip": "x"}))
        .unwrap();
    let notes = RecordingNotifier::new();
    let mut dash = Dashboard::open(store, &notes, AppConfig::default()).unwrap();
    assert!(matches!(
        dash.view(march()),
        Err(DashboardError::Challenge(_))
    ));
}

#[test]
fn state_survives_on_disk() {
    let dir = std::env::temp_dir().join(format!("patripoly-dash-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let notes = RecordingNotifier::new();
    {
        let store = JsonDirStore::open(&dir).unwrap();
        let mut dash = Dashboard::open(store, &notes, AppConfig::default()).unwrap();
        let mut ledger = Ledger::default();
        ledger
            .add_saving(dash.store_mut(), "colchón", Decimal::from(5_000))
            .unwrap();
        ledger
            .add_holding(
                dash.store_mut(),
                "Fondo",
                Decimal::from(1_200),
                "funds",
                HoldingKind::Asset,
            )
            .unwrap();
        assert_eq!(dash.view(march()).unwrap().level.current.level, 3);
    }
    let store = JsonDirStore::open(&dir).unwrap();
    assert_eq!(store.load(keys::PREVIOUS_LEVEL).unwrap(), Some(json!(3)));
    let mut dash = Dashboard::open(store, &notes, AppConfig::default()).unwrap();
    let view = dash.view(march()).unwrap();
    assert_eq!(view.aggregate.nivel_ahorro, Decimal::from(5_000));
    assert!(view.level_up.is_none());
    let _ = std::fs::remove_dir_all(&dir);
}

proptest! {
    #[test]
    fn view_rerenders_exactly_after_watched_writes(ops in prop::collection::vec(0u8..5, 1..40)) {
        let notes = RecordingNotifier::new();
        let mut dash = Dashboard::open(MemoryStore::new(), &notes, AppConfig::default()).unwrap();
        let mut dirty = true;
        let mut expected = 0;
        for op in ops {
            match op {
                0 => {
                    dash.store_mut().save(keys::EXPENSES, json!([])).unwrap();
                    dirty = true;
                }
                1 => {
                    dash.store_mut()
                        .save(keys::DUPLICADOR_PROGRESS, json!({"currentFlip": 1}))
                        .unwrap();
                    dirty = true;
                }
                2 => dash.store_mut().save("unrelated", json!(1)).unwrap(),
                3 => dash.store_mut().save(keys::EXPENSE_CATEGORIES, json!([])).unwrap(),
                _ => {
                    dash.view(march()).unwrap();
                    if dirty {
                        expected += 1;
                        dirty = false;
                    }
                    prop_assert_eq!(dash.renders(), expected);
                }
            }
            prop_assert_eq!(dash.is_stale(), dirty);
        }
    }
}
