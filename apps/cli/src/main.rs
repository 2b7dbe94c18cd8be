#![deny(warnings)]

//! Patripoly command-line front end: levels, the Duplicador challenge,
//! achievements, the personal ledger and the dashboard.

mod args;

use anyhow::{bail, Context, Result};
use args::{ChallengeCmd, Cli, Command, LedgerCmd, RecordKind, USAGE};
use achievements::AchievementTable;
use chrono::{NaiveDate, Utc};
use dashboard::Dashboard;
use duplicador::{load_progress, ChallengeState, ChallengeSummary, DuplicadorEngine, FlipStatus};
use ledger::{HoldingKind, Ledger, YearMonth};
use patri_core::{
    format_compact_eur, format_currency, format_percent, round_whole, AppConfig, Notifier,
};
use patri_levels::{LevelPalette, Standing, WealthLevelTable};
use persistence::JsonDirStore;
use rust_decimal::Decimal;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DATA_DIR_ENV: &str = "PATRIPOLY_DATA_DIR";

/// Prints notifications straight to the terminal.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) {
        println!("* {title} {message}");
    }
}

/// Defaults, then the YAML file, then the environment, then `--data-dir`.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => AppConfig::default(),
    };
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        config.data_dir = dir.into();
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn open_store(config: &AppConfig) -> Result<JsonDirStore> {
    JsonDirStore::open(&config.data_dir)
        .with_context(|| format!("opening data dir {}", config.data_dir.display()))
}

fn percent(value: Decimal) -> String {
    format!("{}%", round_whole(value))
}

fn print_level(wealth: Decimal) {
    let table = WealthLevelTable::standard();
    let palette = LevelPalette::standard();
    let status = table.status(wealth);
    let icon = palette
        .style(status.current.level)
        .map_or("", |s| s.icon.as_str());
    println!(
        "Nivel {} {} ({icon}) con {}",
        status.current.level,
        status.current.name,
        format_currency(wealth)
    );
    println!("  {}", status.current.message);
    match status.next {
        Some(next) => println!(
            "  {} hacia {} ({} restantes)",
            format_percent(status.progress),
            next.name,
            format_currency(next.min_wealth - wealth)
        ),
        None => println!("  Nivel máximo alcanzado"),
    }
}

fn print_levels(wealth: Decimal) {
    let table = WealthLevelTable::standard();
    for row in table.overview(wealth) {
        let mark = match row.standing {
            Standing::Completed => "✓",
            Standing::Current => "▶",
            Standing::Upcoming => " ",
        };
        println!(
            "{mark} {:>2} {:<22} {}",
            row.level.level,
            row.level.name,
            row.level.range_label()
        );
    }
}

fn print_challenge(state: ChallengeState, summary: &ChallengeSummary) {
    match state {
        ChallengeState::Intro => {
            println!("Duplicador sin iniciar: empieza con 1€ y duplícalo en cada flip.");
            return;
        }
        ChallengeState::InProgress { flip, amount } => println!(
            "Flip {flip}: {} (progreso {})",
            format_currency(Decimal::from(amount)),
            format_percent(summary.overall_progress)
        ),
        ChallengeState::Completed { amount } => println!(
            "Reto completado con {}",
            format_currency(Decimal::from(amount))
        ),
    }
    println!(
        "  {} {} ({} del tramo), faltan {} para la meta",
        summary.tier.icon,
        summary.tier.name,
        format_percent(summary.tier_progress),
        format_compact_eur(Decimal::from(summary.remaining_to_target))
    );
    println!(
        "  flips completados {} · acciones {} · ×{}",
        summary.stats.flips_completed, summary.stats.actions_logged, summary.stats.multiplier
    );
    let journey: Vec<String> = summary
        .journey
        .iter()
        .map(|stop| {
            let mark = match stop.status {
                FlipStatus::Completed => "✓",
                FlipStatus::Current => "▶",
                FlipStatus::Locked => "·",
            };
            format!("{mark}{}", format_compact_eur(Decimal::from(stop.amount)))
        })
        .collect();
    println!("  {}", journey.join(" "));
}

fn run_challenge(config: &AppConfig, cmd: ChallengeCmd) -> Result<()> {
    let store = open_store(config)?;
    let mut engine = DuplicadorEngine::open(store, ConsoleNotifier, config.challenge.clone())?;
    match cmd {
        ChallengeCmd::Status => {}
        ChallengeCmd::Start => engine.start()?,
        ChallengeCmd::Log { description, date } => {
            engine.log_action(&description, date.unwrap_or_else(today))?;
        }
        ChallengeCmd::Complete => {
            engine.complete_flip()?;
        }
        ChallengeCmd::Reset { confirmed } => {
            let (warning, token) = engine.reset_warning();
            if !confirmed {
                bail!("{warning}\nre-run with --yes to confirm");
            }
            engine.reset(token)?;
            println!("Reto reiniciado.");
            return Ok(());
        }
    }
    print_challenge(engine.state(), &engine.summary());
    Ok(())
}

fn run_achievements(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;
    let snapshot = load_progress(&store, &config.challenge)?.unwrap_or_default();
    let table = AchievementTable::standard()?;
    let report = table.evaluate(&snapshot);
    println!("Logros {}", report.counter());
    for rule in &report.unlocked {
        println!("  ✓ {} {}: {}", rule.icon, rule.name, rule.description);
    }
    for rule in &report.locked {
        println!("  · {}: {}", rule.name, rule.description);
    }
    Ok(())
}

fn run_ledger(config: &AppConfig, cmd: LedgerCmd) -> Result<()> {
    let mut store = open_store(config)?;
    let mut ledger = Ledger::load(&store)?;
    match cmd {
        LedgerCmd::AddHolding {
            kind,
            name,
            value,
            category,
        } => {
            let h = ledger.add_holding(&mut store, &name, value, &category, kind)?;
            let label = match kind {
                HoldingKind::Asset => "Activo",
                HoldingKind::Liability => "Pasivo",
            };
            println!("{label} {} añadido: {}", h.id, format_currency(h.value));
        }
        LedgerCmd::AddIncome {
            name,
            amount,
            frequency,
        } => {
            let i = ledger.add_active_income(&mut store, &name, amount, frequency)?;
            println!(
                "Ingreso {} ({}): {} al mes",
                i.id,
                frequency.label(),
                format_currency(i.monthly())
            );
        }
        LedgerCmd::AddPassive {
            name,
            amount,
            frequency,
            category,
        } => {
            let p = ledger.add_passive_income(
                &mut store, &name, amount, frequency, &category, today(),
            )?;
            println!(
                "Fuente de cashflow {} ({}): {} al mes",
                p.id,
                frequency.label(),
                format_currency(p.monthly())
            );
        }
        LedgerCmd::AddExpense {
            amount,
            category,
            note,
            date,
        } => {
            let e = ledger.add_expense(
                &mut store,
                amount,
                &category,
                note.as_deref(),
                date.unwrap_or_else(today),
            )?;
            let label = ledger
                .category(&e.category_id)
                .map_or(e.category_id.as_str(), |c| c.name.as_str());
            println!(
                "Gasto {} del {} en {label}: {}",
                e.id,
                e.date,
                format_currency(e.amount)
            );
        }
        LedgerCmd::AddSaving { name, amount } => {
            ledger.add_saving(&mut store, &name, amount)?;
        }
        LedgerCmd::Withdraw { name, amount } => {
            ledger.add_withdrawal(&mut store, &name, amount)?;
        }
        LedgerCmd::AddItem {
            name,
            monthly_cost,
            owned,
        } => {
            let item = ledger.add_lifestyle_item(&mut store, &name, monthly_cost, owned)?;
            println!("Elemento {} añadido: {}/mes", item.id, format_currency(monthly_cost));
        }
        LedgerCmd::EditItem {
            id,
            name,
            monthly_cost,
        } => {
            let item = ledger.update_lifestyle_item(&mut store, &id, &name, monthly_cost, None)?;
            println!("Elemento {} actualizado: {}", item.id, item.name);
        }
        LedgerCmd::OwnItem { id, owned } => ledger.set_item_owned(&mut store, &id, owned)?,
        LedgerCmd::Remove { kind, id } => {
            match kind {
                RecordKind::Income => {
                    ledger.delete_active_income(&mut store, &id)?;
                }
                RecordKind::Expense => {
                    ledger.delete_expense(&mut store, &id)?;
                }
                RecordKind::Saving => {
                    ledger.delete_saving(&mut store, &id)?;
                }
                RecordKind::Item => {
                    ledger.delete_lifestyle_item(&mut store, &id)?;
                }
            }
            println!("Registro {id} eliminado.");
        }
        LedgerCmd::Categories => {
            for c in ledger.categories() {
                println!("  {:>14} {} {}", c.id, c.icon, c.name);
            }
            return Ok(());
        }
        LedgerCmd::AddCategory { name, icon } => {
            let c = ledger.add_category(&mut store, &name, "bg-blue-500", &icon)?;
            println!("Categoría {} creada: {} {}", c.id, c.icon, c.name);
        }
        LedgerCmd::DeleteCategory { id } => {
            let c = ledger.delete_category(&mut store, &id)?;
            println!("Categoría {} eliminada.", c.name);
        }
    }
    println!(
        "Patrimonio {} · cashflow {}/mes · ahorro {} · calidad de vida {}",
        format_currency(ledger.net_worth()),
        format_currency(ledger.monthly_cashflow()),
        format_currency(ledger.savings_balance()),
        percent(ledger.lifestyle_progress())
    );
    Ok(())
}

fn run_dashboard(config: AppConfig, month: YearMonth) -> Result<()> {
    let store = open_store(&config)?;
    let mut dash = Dashboard::open(store, ConsoleNotifier, config)?;
    let view = dash.view(month)?;

    println!("Dashboard {}", view.month);
    for card in &view.cards {
        println!("  {:<22} {:>16}  {}", card.title, card.value, card.description);
    }
    println!("  Ranking: {}", view.rank.label());

    let level = &view.level;
    let icon = level.style.as_ref().map_or("", |s| s.icon.as_str());
    match (&level.next, level.to_next) {
        (Some(next), Some(gap)) => println!(
            "Nivel {} {} ({icon}): {} hacia {}, faltan {}",
            level.current.level,
            level.current.name,
            format_percent(level.progress),
            next.name,
            format_currency(gap)
        ),
        _ => println!(
            "Nivel {} {} ({icon}): nivel máximo",
            level.current.level, level.current.name
        ),
    }

    let fund = &view.emergency_fund;
    let covered = fund
        .months_covered
        .map_or_else(|| "sin gastos".to_string(), |m| format!("{} meses", m.round_dp(1)));
    println!(
        "Fondo de emergencia: {} de {} ({}), {covered}, {}",
        format_currency(fund.balance),
        format_currency(fund.goal),
        percent(fund.progress),
        fund.tier.name
    );
    let health = &view.health;
    let flag = |ok: bool| if ok { "ok" } else { "revisar" };
    let coverage = health
        .expense_coverage
        .map_or_else(|| "sin gastos".to_string(), |m| format!("{} meses", m.round_dp(1)));
    println!(
        "Salud: cashflow {} · coste de vida {} · ahorro {} ({coverage} de gastos del mes)",
        flag(health.cashflow_healthy),
        flag(health.cost_of_living_healthy),
        flag(health.savings_healthy)
    );
    println!("Meta de cashflow: {}", percent(view.cashflow_goal_progress));
    println!(
        "Duplicador: flip {} · {} · logros {}",
        view.challenge.current_flip,
        format_compact_eur(Decimal::from(view.challenge.current_amount)),
        view.achievements.counter
    );
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = args::parse(std::env::args().skip(1))?;
    debug!(command = ?cli.command, "parsed arguments");
    let config = load_config(&cli)?;
    info!(data_dir = %config.data_dir.display(), "configuration loaded");

    match cli.command {
        Command::Version => println!(
            "patripoly {} ({}, {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        ),
        Command::Help => println!("{USAGE}"),
        Command::Level { wealth } => print_level(wealth),
        Command::Levels { wealth } => {
            let wealth = match wealth {
                Some(w) => w,
                None => Ledger::load(&open_store(&config)?)?.net_worth(),
            };
            print_levels(wealth);
        }
        Command::Challenge(cmd) => run_challenge(&config, cmd)?,
        Command::Achievements => run_achievements(&config)?,
        Command::Ledger(cmd) => run_ledger(&config, cmd)?,
        Command::Dashboard { month } => {
            run_dashboard(config, month.unwrap_or_else(YearMonth::current))?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn yaml_config_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("patripoly-cli-{}.yaml", std::process::id()));
        std::fs::write(
            &path,
            "data_dir: /tmp/patri\nchallenge:\n  max_flips: 10\nmonthly_cashflow_goal: 3000\n",
        )
        .unwrap();
        let cfg = read_config(&path).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/patri"));
        assert_eq!(cfg.challenge.max_flips, 10);
        assert_eq!(cfg.challenge.target_amount, 1_000_000);
        assert_eq!(cfg.monthly_cashflow_goal, Decimal::from(3000));
        assert_eq!(cfg.default_monthly_cost, Decimal::from(2500));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(read_config(Path::new("/nonexistent/patripoly.yaml")).is_err());
    }
}
