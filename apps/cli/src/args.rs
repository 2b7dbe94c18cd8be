//! Command-line parsing.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use ledger::{HoldingKind, IncomeFrequency, PassiveFrequency, YearMonth};
use rust_decimal::Decimal;
use std::path::PathBuf;

pub const USAGE: &str = "\
usage: patripoly [--config <file>] [--data-dir <dir>] <command>

commands:
  level <wealth>                         level, next level and progress for a net worth
  levels [wealth]                        every level; defaults to the recorded net worth
  challenge start|status|complete        Duplicador challenge
  challenge log <description> [--date YYYY-MM-DD]
  challenge reset --yes
  achievements                           Duplicador badges
  ledger add-asset <name> <value> <category>
  ledger add-liability <name> <value> <category>
  ledger add-income <name> <amount> <monthly|bi-weekly|weekly|yearly|one-time>
  ledger add-passive <name> <amount> <monthly|quarterly|yearly> <category>
  ledger add-expense <amount> <category-id> [note] [--date YYYY-MM-DD]
  ledger add-saving <name> <amount>
  ledger withdraw <name> <amount>
  ledger add-item <name> <monthly-cost> [--owned]
  ledger edit-item <id> <name> <monthly-cost>
  ledger own-item <id> [--no]
  ledger remove income|expense|saving|item <id>
  ledger categories
  ledger add-category <name> [icon]
  ledger delete-category <id>
  dashboard [--month YYYY-MM]
  --version";

#[derive(Debug, PartialEq)]
pub struct Cli {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub command: Command,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Version,
    Help,
    Level { wealth: Decimal },
    Levels { wealth: Option<Decimal> },
    Challenge(ChallengeCmd),
    Achievements,
    Ledger(LedgerCmd),
    Dashboard { month: Option<YearMonth> },
}

#[derive(Debug, PartialEq)]
pub enum ChallengeCmd {
    Start,
    Status,
    Log {
        description: String,
        date: Option<NaiveDate>,
    },
    Complete,
    Reset {
        confirmed: bool,
    },
}

#[derive(Debug, PartialEq)]
pub enum LedgerCmd {
    AddHolding {
        kind: HoldingKind,
        name: String,
        value: Decimal,
        category: String,
    },
    AddIncome {
        name: String,
        amount: Decimal,
        frequency: IncomeFrequency,
    },
    AddPassive {
        name: String,
        amount: Decimal,
        frequency: PassiveFrequency,
        category: String,
    },
    AddExpense {
        amount: Decimal,
        category: String,
        note: Option<String>,
        date: Option<NaiveDate>,
    },
    AddSaving {
        name: String,
        amount: Decimal,
    },
    Withdraw {
        name: String,
        amount: Decimal,
    },
    AddItem {
        name: String,
        monthly_cost: Decimal,
        owned: bool,
    },
    EditItem {
        id: String,
        name: String,
        monthly_cost: Decimal,
    },
    OwnItem {
        id: String,
        owned: bool,
    },
    Remove {
        kind: RecordKind,
        id: String,
    },
    Categories,
    AddCategory {
        name: String,
        icon: String,
    },
    DeleteCategory {
        id: String,
    },
}

/// Record lists `ledger remove` can delete from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Income,
    Expense,
    Saving,
    Item,
}

#[derive(Default)]
struct Flags {
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    date: Option<String>,
    month: Option<String>,
    yes: bool,
    owned: bool,
    no: bool,
    version: bool,
    help: bool,
}

fn amount(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("not an amount: {s:?}"))
}

fn date(s: Option<String>) -> Result<Option<NaiveDate>> {
    s.map(|d| {
        NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .with_context(|| format!("not a date (YYYY-MM-DD): {d:?}"))
    })
    .transpose()
}

/// Positional argument `i`, or an error naming what is missing.
fn arg<'a>(pos: &'a [String], i: usize, what: &str) -> Result<&'a str> {
    pos.get(i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing {what}\n\n{USAGE}"))
}

pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Cli> {
    let mut flags = Flags::default();
    let mut pos: Vec<String> = Vec::new();
    let mut it = args.into_iter();
    while let Some(a) = it.next() {
        let mut value = |name: &str| it.next().ok_or_else(|| anyhow!("{name} needs a value"));
        match a.as_str() {
            "--config" => flags.config = Some(value("--config")?.into()),
            "--data-dir" => flags.data_dir = Some(value("--data-dir")?.into()),
            "--date" => flags.date = Some(value("--date")?),
            "--month" => flags.month = Some(value("--month")?),
            "--yes" | "-y" => flags.yes = true,
            "--owned" => flags.owned = true,
            "--no" => flags.no = true,
            "--version" | "-V" => flags.version = true,
            "--help" | "-h" => flags.help = true,
            s if s.starts_with("--") => bail!("unknown flag {s}\n\n{USAGE}"),
            s => pos.push(s.to_string()),
        }
    }

    let config = flags.config.take();
    let data_dir = flags.data_dir.take();
    let command = if flags.version {
        Command::Version
    } else if flags.help || pos.is_empty() {
        Command::Help
    } else {
        match pos[0].as_str() {
            "level" => Command::Level {
                wealth: amount(arg(&pos, 1, "wealth")?)?,
            },
            "levels" => Command::Levels {
                wealth: pos.get(1).map(|w| amount(w)).transpose()?,
            },
            "achievements" => Command::Achievements,
            "dashboard" => Command::Dashboard {
                month: flags.month.as_deref().map(str::parse).transpose()?,
            },
            "challenge" => Command::Challenge(match arg(&pos, 1, "challenge action")? {
                "start" => ChallengeCmd::Start,
                "status" => ChallengeCmd::Status,
                "complete" => ChallengeCmd::Complete,
                "reset" => ChallengeCmd::Reset { confirmed: flags.yes },
                "log" => ChallengeCmd::Log {
                    description: pos[2..].join(" "),
                    date: date(flags.date)?,
                },
                other => bail!("unknown challenge action {other:?}\n\n{USAGE}"),
            }),
            "ledger" => Command::Ledger(parse_ledger(&pos, flags)?),
            other => bail!("unknown command {other:?}\n\n{USAGE}"),
        }
    };
    Ok(Cli {
        config,
        data_dir,
        command,
    })
}

fn parse_ledger(pos: &[String], flags: Flags) -> Result<LedgerCmd> {
    let holding = |kind| -> Result<LedgerCmd> {
        Ok(LedgerCmd::AddHolding {
            kind,
            name: arg(pos, 2, "name")?.to_string(),
            value: amount(arg(pos, 3, "value")?)?,
            category: arg(pos, 4, "category")?.to_string(),
        })
    };
    Ok(match arg(pos, 1, "ledger action")? {
        "add-asset" => holding(HoldingKind::Asset)?,
        "add-liability" => holding(HoldingKind::Liability)?,
        "add-income" => LedgerCmd::AddIncome {
            name: arg(pos, 2, "name")?.to_string(),
            amount: amount(arg(pos, 3, "amount")?)?,
            frequency: arg(pos, 4, "frequency")?.parse()?,
        },
        "add-passive" => LedgerCmd::AddPassive {
            name: arg(pos, 2, "name")?.to_string(),
            amount: amount(arg(pos, 3, "amount")?)?,
            frequency: arg(pos, 4, "frequency")?.parse()?,
            category: arg(pos, 5, "category")?.to_string(),
        },
        "add-expense" => LedgerCmd::AddExpense {
            amount: amount(arg(pos, 2, "amount")?)?,
            category: arg(pos, 3, "category id")?.to_string(),
            note: Some(pos[4..].join(" ")).filter(|n| !n.is_empty()),
            date: date(flags.date)?,
        },
        "add-saving" => LedgerCmd::AddSaving {
            name: arg(pos, 2, "name")?.to_string(),
            amount: amount(arg(pos, 3, "amount")?)?,
        },
        "withdraw" => LedgerCmd::Withdraw {
            name: arg(pos, 2, "name")?.to_string(),
            amount: amount(arg(pos, 3, "amount")?)?,
        },
        "add-item" => LedgerCmd::AddItem {
            name: arg(pos, 2, "name")?.to_string(),
            monthly_cost: amount(arg(pos, 3, "monthly cost")?)?,
            owned: flags.owned,
        },
        "edit-item" => LedgerCmd::EditItem {
            id: arg(pos, 2, "item id")?.to_string(),
            name: arg(pos, 3, "name")?.to_string(),
            monthly_cost: amount(arg(pos, 4, "monthly cost")?)?,
        },
        "own-item" => LedgerCmd::OwnItem {
            id: arg(pos, 2, "item id")?.to_string(),
            owned: !flags.no,
        },
        "remove" => LedgerCmd::Remove {
            kind: match arg(pos, 2, "record kind")? {
                "income" => RecordKind::Income,
                "expense" => RecordKind::Expense,
                "saving" => RecordKind::Saving,
                "item" => RecordKind::Item,
                other => bail!("cannot remove {other:?} records\n\n{USAGE}"),
            },
            id: arg(pos, 3, "record id")?.to_string(),
        },
        "categories" => LedgerCmd::Categories,
        "add-category" => LedgerCmd::AddCategory {
            name: arg(pos, 2, "name")?.to_string(),
            icon: pos.get(3).map_or("📦", String::as_str).to_string(),
        },
        "delete-category" => LedgerCmd::DeleteCategory {
            id: arg(pos, 2, "category id")?.to_string(),
        },
        other => bail!("unknown ledger action {other:?}\n\n{USAGE}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(args: &[&str]) -> Result<Cli> {
        parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn global_flags_anywhere() {
        let cli = p(&["level", "1500", "--data-dir", "/tmp/x", "--config", "c.yaml"]).unwrap();
        assert_eq!(cli.command, Command::Level { wealth: Decimal::from(1500) });
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.config, Some(PathBuf::from("c.yaml")));
    }

    #[test]
    fn no_arguments_prints_help() {
        assert_eq!(p(&[]).unwrap().command, Command::Help);
        assert_eq!(p(&["--version"]).unwrap().command, Command::Version);
    }

    #[test]
    fn challenge_log_joins_words() {
        let cli = p(&["challenge", "log", "vendí", "la", "bici", "--date", "2024-05-02"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Challenge(ChallengeCmd::Log {
                description: "vendí la bici".into(),
                date: NaiveDate::from_ymd_opt(2024, 5, 2),
            })
        );
    }

    #[test]
    fn reset_needs_explicit_yes() {
        assert_eq!(
            p(&["challenge", "reset"]).unwrap().command,
            Command::Challenge(ChallengeCmd::Reset { confirmed: false })
        );
        assert_eq!(
            p(&["challenge", "reset", "--yes"]).unwrap().command,
            Command::Challenge(ChallengeCmd::Reset { confirmed: true })
        );
    }

    #[test]
    fn ledger_commands() {
        assert_eq!(
            p(&["ledger", "add-passive", "Piso", "600", "monthly", "real-estate"])
                .unwrap()
                .command,
            Command::Ledger(LedgerCmd::AddPassive {
                name: "Piso".into(),
                amount: Decimal::from(600),
                frequency: PassiveFrequency::Monthly,
                category: "real-estate".into(),
            })
        );
        assert_eq!(
            p(&["ledger", "own-item", "17", "--no"]).unwrap().command,
            Command::Ledger(LedgerCmd::OwnItem {
                id: "17".into(),
                owned: false
            })
        );
        assert_eq!(
            p(&["ledger", "add-expense", "45.5", "1", "compra", "semanal"])
                .unwrap()
                .command,
            Command::Ledger(LedgerCmd::AddExpense {
                amount: Decimal::new(455, 1),
                category: "1".into(),
                note: Some("compra semanal".into()),
                date: None,
            })
        );
        assert_eq!(
            p(&["ledger", "add-expense", "12", "8"]).unwrap().command,
            Command::Ledger(LedgerCmd::AddExpense {
                amount: Decimal::from(12),
                category: "8".into(),
                note: None,
                date: None,
            })
        );
        assert_eq!(
            p(&["ledger", "remove", "saving", "42"]).unwrap().command,
            Command::Ledger(LedgerCmd::Remove {
                kind: RecordKind::Saving,
                id: "42".into()
            })
        );
        assert!(p(&["ledger", "remove", "asset", "42"]).is_err());
        assert!(p(&["ledger", "add-income", "x", "10", "daily"]).is_err());
        assert!(p(&["ledger", "add-asset", "Casa"]).is_err());
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(p(&["level", "mucho"]).is_err());
        assert!(p(&["dashboard", "--month", "2024-13"]).is_err());
        assert!(p(&["frobnicate"]).is_err());
        assert!(p(&["level", "10", "--frobnicate"]).is_err());
        assert!(p(&["level", "--config"]).is_err());
    }
}
