#![deny(warnings)]

//! Personal finance records and the figures derived from them.
//!
//! This crate provides validated utilities for:
//! - Recording assets, liabilities, income, expenses, savings and lifestyle items
//! - Deleting and editing records, and managing expense categories
//! - Persisting each record list under its own store key
//! - Computing the [`WealthAggregate`] the level resolver and dashboard consume
//! - Net-worth rank, emergency fund status and financial health indicators

mod records;

pub use records::{
    ActiveIncome, Expense, ExpenseCategory, Holding, HoldingKind, IncomeFrequency, LifestyleItem,
    PassiveFrequency, PassiveIncome, SavingEntry, SavingKind,
};

use records::Record;

use chrono::{Datelike, NaiveDate, Utc};
use patri_core::{
    next_record_id, ratio_percent, validate_name, validate_non_negative, validate_positive,
    AppConfig, ValidationError, WealthAggregate,
};
use patri_levels::{savings_tier, SavingsTier};
use persistence::{keys, Store, StoreError, StoreExt};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Errors produced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Holdings, income sources and expenses must be filed under a category.
    #[error("category must not be empty")]
    MissingCategory,
    #[error("no record with id {0}")]
    UnknownRecord(String),
    /// Categories still referenced by expenses cannot be deleted.
    #[error("category {id} still has {expenses} expenses")]
    CategoryInUse { id: String, expenses: usize },
    #[error("unknown frequency {0:?}")]
    InvalidFrequency(String),
    #[error("invalid month {0:?}, expected YYYY-MM")]
    InvalidMonth(String),
}

/// A calendar month, written `YYYY-MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::of(Utc::now().date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidMonth(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        Ok(Self { year, month })
    }
}

/// Net-worth band relative to the population, as shown on the assets screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum NetWorthRank {
    Initial,
    Average,
    Top40,
    Top20,
    Top5,
}

impl NetWorthRank {
    pub fn for_net_worth(net_worth: Decimal) -> Self {
        if net_worth >= Decimal::from(500_000) {
            NetWorthRank::Top5
        } else if net_worth >= Decimal::from(200_000) {
            NetWorthRank::Top20
        } else if net_worth >= Decimal::from(100_000) {
            NetWorthRank::Top40
        } else if net_worth >= Decimal::from(50_000) {
            NetWorthRank::Average
        } else {
            NetWorthRank::Initial
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NetWorthRank::Top5 => "Top 5%",
            NetWorthRank::Top20 => "Top 20%",
            NetWorthRank::Top40 => "Top 40%",
            NetWorthRank::Average => "Promedio",
            NetWorthRank::Initial => "Inicial",
        }
    }
}

/// Sum and share of one category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub count: usize,
    /// Share of the grand total in percent; zero when the grand total is zero.
    pub percent: Decimal,
}

fn category_totals<'a, I>(items: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = (&'a str, Decimal)>,
{
    let mut by_cat: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    for (cat, amount) in items {
        let slot = by_cat.entry(cat).or_insert((Decimal::ZERO, 0));
        slot.0 += amount;
        slot.1 += 1;
    }
    let grand: Decimal = by_cat.values().map(|(t, _)| *t).sum();
    let mut out: Vec<CategoryTotal> = by_cat
        .into_iter()
        .map(|(cat, (total, count))| CategoryTotal {
            category: cat.to_string(),
            total,
            count,
            percent: ratio_percent(total, grand),
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    out
}

/// Emergency fund status derived from savings and the cost of living.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmergencyFund {
    pub balance: Decimal,
    pub monthly_cost: Decimal,
    /// Six months of living costs.
    pub goal: Decimal,
    /// `min(100, balance / goal * 100)`.
    pub progress: Decimal,
    /// `None` when the monthly cost is zero.
    pub months_covered: Option<Decimal>,
    pub tier: &'static SavingsTier,
}

/// Traffic-light indicators on the dashboard, all based on the 0.75% rule.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinancialHealth {
    /// `patrimonio * 0.75%`; cashflow should exceed it.
    pub cashflow_minimum: Decimal,
    pub cashflow_healthy: bool,
    /// `patrimonio * 0.75%`; monthly expenses should stay below it.
    pub cost_of_living_maximum: Decimal,
    pub cost_of_living_healthy: bool,
    /// Three months of expenses; savings should exceed it.
    pub savings_minimum: Decimal,
    pub savings_healthy: bool,
    /// Months of this month's expenses the savings cover; `None` without expenses.
    pub expense_coverage: Option<Decimal>,
}

impl FinancialHealth {
    pub fn assess(agg: &WealthAggregate) -> Self {
        let rule = agg.patrimonio_total * Decimal::new(75, 4);
        let savings_minimum = agg.gastos * Decimal::from(3);
        Self {
            cashflow_minimum: rule,
            cashflow_healthy: rule < agg.cashflow,
            cost_of_living_maximum: rule,
            cost_of_living_healthy: rule > agg.gastos,
            savings_minimum,
            savings_healthy: savings_minimum < agg.nivel_ahorro,
            expense_coverage: agg.months_covered(),
        }
    }
}

/// Progress toward a monthly passive-income goal, capped at 100.
pub fn cashflow_goal_progress(cashflow: Decimal, goal: Decimal) -> Decimal {
    ratio_percent(cashflow, goal).min(Decimal::ONE_HUNDRED)
}

/// Every record list, loaded from a [`Store`].
#[derive(Clone, Debug, PartialEq)]
pub struct Ledger {
    holdings: Vec<Holding>,
    passive: Vec<PassiveIncome>,
    active: Vec<ActiveIncome>,
    expenses: Vec<Expense>,
    categories: Vec<ExpenseCategory>,
    savings: Vec<SavingEntry>,
    lifestyle: Vec<LifestyleItem>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            holdings: Vec::new(),
            passive: Vec::new(),
            active: Vec::new(),
            expenses: Vec::new(),
            categories: ExpenseCategory::defaults(),
            savings: Vec::new(),
            lifestyle: Vec::new(),
        }
    }
}

fn load_list<S, T>(store: &S, key: &str) -> Result<Vec<T>, LedgerError>
where
    S: Store + ?Sized,
    T: DeserializeOwned,
{
    Ok(store.load_as(key)?.unwrap_or_default())
}

fn require_category(category: &str) -> Result<(), LedgerError> {
    if category.trim().is_empty() {
        return Err(LedgerError::MissingCategory);
    }
    Ok(())
}

/// Append `item` to `list` after `key` was written successfully.
fn append<S, T>(store: &mut S, key: &str, list: &mut Vec<T>, item: T) -> Result<(), LedgerError>
where
    S: Store + ?Sized,
    T: Serialize + Clone,
{
    let mut next = list.clone();
    next.push(item);
    store.save_as(key, &next)?;
    *list = next;
    Ok(())
}

/// Position of the record with `id`, or [`LedgerError::UnknownRecord`].
fn position<T: Record>(list: &[T], id: &str) -> Result<usize, LedgerError> {
    list.iter()
        .position(|r| r.id() == id)
        .ok_or_else(|| LedgerError::UnknownRecord(id.to_string()))
}

/// Remove the record with `id` from `list` after `key` was written successfully.
fn remove<S, T>(store: &mut S, key: &str, list: &mut Vec<T>, id: &str) -> Result<T, LedgerError>
where
    S: Store + ?Sized,
    T: Serialize + Clone + Record,
{
    let mut next = list.clone();
    let removed = next.remove(position(&next, id)?);
    store.save_as(key, &next)?;
    *list = next;
    Ok(removed)
}

/// Apply `edit` to the record with `id` and write the list back.
fn update<S, T, F>(
    store: &mut S,
    key: &str,
    list: &mut Vec<T>,
    id: &str,
    edit: F,
) -> Result<T, LedgerError>
where
    S: Store + ?Sized,
    T: Serialize + Clone + Record,
    F: FnOnce(&mut T),
{
    let mut next = list.clone();
    let at = position(&next, id)?;
    edit(&mut next[at]);
    let updated = next[at].clone();
    store.save_as(key, &next)?;
    *list = next;
    Ok(updated)
}

impl Ledger {
    pub fn load<S: Store + ?Sized>(store: &S) -> Result<Self, LedgerError> {
        let ledger = Self {
            holdings: load_list(store, keys::ASSETS)?,
            passive: load_list(store, keys::CASHFLOW_SOURCES)?,
            active: load_list(store, keys::ACTIVE_INCOME)?,
            expenses: load_list(store, keys::EXPENSES)?,
            categories: store
                .load_as(keys::EXPENSE_CATEGORIES)?
                .unwrap_or_else(ExpenseCategory::defaults),
            savings: load_list(store, keys::SAVINGS)?,
            lifestyle: load_list(store, keys::LIFESTYLE_ITEMS)?,
        };
        info!(
            holdings = ledger.holdings.len(),
            expenses = ledger.expenses.len(),
            savings = ledger.savings.len(),
            "ledger loaded"
        );
        Ok(ledger)
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn passive_income(&self) -> &[PassiveIncome] {
        &self.passive
    }

    pub fn active_income(&self) -> &[ActiveIncome] {
        &self.active
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Saved categories, or the built-in list when none were saved.
    pub fn categories(&self) -> &[ExpenseCategory] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&ExpenseCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn savings(&self) -> &[SavingEntry] {
        &self.savings
    }

    pub fn lifestyle_items(&self) -> &[LifestyleItem] {
        &self.lifestyle
    }

    fn ids(&self) -> impl Iterator<Item = &str> {
        self.holdings
            .iter()
            .map(|h| h.id.as_str())
            .chain(self.passive.iter().map(|p| p.id.as_str()))
            .chain(self.active.iter().map(|a| a.id.as_str()))
            .chain(self.expenses.iter().map(|e| e.id.as_str()))
            .chain(self.savings.iter().map(|s| s.id.as_str()))
            .chain(self.lifestyle.iter().map(|l| l.id.as_str()))
    }

    fn fresh_id(&self) -> String {
        next_record_id(self.ids())
    }

    pub fn add_holding<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        name: &str,
        value: Decimal,
        category: &str,
        kind: HoldingKind,
    ) -> Result<Holding, LedgerError> {
        validate_name(name)?;
        validate_positive(value)?;
        require_category(category)?;
        let holding = Holding {
            id: self.fresh_id(),
            name: name.trim().to_string(),
            value,
            category: category.trim().to_string(),
            kind,
        };
        append(store, keys::ASSETS, &mut self.holdings, holding.clone())?;
        info!(id = %holding.id, kind = ?kind, "holding added");
        Ok(holding)
    }

    pub fn add_passive_income<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        name: &str,
        amount: Decimal,
        frequency: PassiveFrequency,
        category: &str,
        date_added: NaiveDate,
    ) -> Result<PassiveIncome, LedgerError> {
        validate_name(name)?;
        validate_positive(amount)?;
        require_category(category)?;
        let source = PassiveIncome {
            id: self.fresh_id(),
            name: name.trim().to_string(),
            amount,
            frequency,
            category: category.trim().to_string(),
            date_added,
        };
        append(store, keys::CASHFLOW_SOURCES, &mut self.passive, source.clone())?;
        info!(id = %source.id, "passive income added");
        Ok(source)
    }

    pub fn add_active_income<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        name: &str,
        amount: Decimal,
        frequency: IncomeFrequency,
    ) -> Result<ActiveIncome, LedgerError> {
        validate_name(name)?;
        validate_positive(amount)?;
        let income = ActiveIncome {
            id: self.fresh_id(),
            name: name.trim().to_string(),
            amount,
            frequency,
        };
        append(store, keys::ACTIVE_INCOME, &mut self.active, income.clone())?;
        info!(id = %income.id, "active income added");
        Ok(income)
    }

    pub fn delete_active_income<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
    ) -> Result<ActiveIncome, LedgerError> {
        let removed = remove(store, keys::ACTIVE_INCOME, &mut self.active, id)?;
        info!(%id, "active income deleted");
        Ok(removed)
    }

    /// Record an expense. Only the category and a positive amount are required.
    pub fn add_expense<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        amount: Decimal,
        category_id: &str,
        note: Option<&str>,
        date: NaiveDate,
    ) -> Result<Expense, LedgerError> {
        require_category(category_id)?;
        validate_positive(amount)?;
        let expense = Expense {
            id: self.fresh_id(),
            amount,
            category_id: category_id.trim().to_string(),
            note: note
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            date,
            created_at: Utc::now(),
        };
        append(store, keys::EXPENSES, &mut self.expenses, expense.clone())?;
        info!(id = %expense.id, %date, "expense added");
        Ok(expense)
    }

    pub fn delete_expense<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
    ) -> Result<Expense, LedgerError> {
        let removed = remove(store, keys::EXPENSES, &mut self.expenses, id)?;
        info!(%id, "expense deleted");
        Ok(removed)
    }

    pub fn add_category<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        name: &str,
        color: &str,
        icon: &str,
    ) -> Result<ExpenseCategory, LedgerError> {
        validate_name(name)?;
        let category = ExpenseCategory {
            id: next_record_id(self.categories.iter().map(|c| c.id.as_str())),
            name: name.trim().to_string(),
            color: color.trim().to_string(),
            icon: icon.trim().to_string(),
        };
        append(
            store,
            keys::EXPENSE_CATEGORIES,
            &mut self.categories,
            category.clone(),
        )?;
        info!(id = %category.id, "expense category added");
        Ok(category)
    }

    pub fn update_category<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
        name: &str,
        color: &str,
        icon: &str,
    ) -> Result<ExpenseCategory, LedgerError> {
        validate_name(name)?;
        update(store, keys::EXPENSE_CATEGORIES, &mut self.categories, id, |c| {
            c.name = name.trim().to_string();
            c.color = color.trim().to_string();
            c.icon = icon.trim().to_string();
        })
    }

    /// Delete a category nothing is filed under.
    pub fn delete_category<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
    ) -> Result<ExpenseCategory, LedgerError> {
        let expenses = self.expenses.iter().filter(|e| e.category_id == id).count();
        if expenses > 0 {
            return Err(LedgerError::CategoryInUse {
                id: id.to_string(),
                expenses,
            });
        }
        let removed = remove(store, keys::EXPENSE_CATEGORIES, &mut self.categories, id)?;
        info!(%id, "expense category deleted");
        Ok(removed)
    }

    /// Deposit into the emergency fund.
    pub fn add_saving<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        name: &str,
        amount: Decimal,
    ) -> Result<SavingEntry, LedgerError> {
        validate_name(name)?;
        validate_positive(amount)?;
        self.push_saving(store, name, amount, SavingKind::Saving)
    }

    /// Withdraw from the emergency fund; never more than the balance.
    pub fn add_withdrawal<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        name: &str,
        amount: Decimal,
    ) -> Result<SavingEntry, LedgerError> {
        validate_name(name)?;
        validate_positive(amount)?;
        let available = self.savings_balance();
        if amount > available {
            return Err(ValidationError::InsufficientBalance {
                requested: amount,
                available,
            }
            .into());
        }
        self.push_saving(store, name, -amount, SavingKind::Withdrawal)
    }

    fn push_saving<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        name: &str,
        signed: Decimal,
        kind: SavingKind,
    ) -> Result<SavingEntry, LedgerError> {
        let entry = SavingEntry {
            id: self.fresh_id(),
            name: name.trim().to_string(),
            amount: signed,
            kind,
            created_at: Utc::now(),
        };
        append(store, keys::SAVINGS, &mut self.savings, entry.clone())?;
        info!(id = %entry.id, amount = %signed, "savings movement recorded");
        Ok(entry)
    }

    /// Delete a savings movement. A deposit that later withdrawals already
    /// spent cannot be deleted: the balance never goes below zero.
    pub fn delete_saving<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
    ) -> Result<SavingEntry, LedgerError> {
        let entry = &self.savings[position(&self.savings, id)?];
        let available = self.savings_balance();
        if available - entry.amount < Decimal::ZERO {
            return Err(ValidationError::InsufficientBalance {
                requested: entry.amount,
                available,
            }
            .into());
        }
        let removed = remove(store, keys::SAVINGS, &mut self.savings, id)?;
        info!(%id, amount = %removed.amount, "savings movement deleted");
        Ok(removed)
    }

    pub fn add_lifestyle_item<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        name: &str,
        monthly_cost: Decimal,
        is_owned: bool,
    ) -> Result<LifestyleItem, LedgerError> {
        validate_name(name)?;
        validate_non_negative(monthly_cost)?;
        let item = LifestyleItem {
            id: self.fresh_id(),
            name: name.trim().to_string(),
            monthly_cost,
            is_owned,
            image_url: None,
        };
        append(store, keys::LIFESTYLE_ITEMS, &mut self.lifestyle, item.clone())?;
        info!(id = %item.id, "lifestyle item added");
        Ok(item)
    }

    /// Mark a lifestyle item as owned or desired.
    pub fn set_item_owned<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
        owned: bool,
    ) -> Result<(), LedgerError> {
        update(store, keys::LIFESTYLE_ITEMS, &mut self.lifestyle, id, |i| {
            i.is_owned = owned
        })?;
        Ok(())
    }

    /// Rename and reprice a lifestyle item; ownership is kept.
    pub fn update_lifestyle_item<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
        name: &str,
        monthly_cost: Decimal,
        image_url: Option<&str>,
    ) -> Result<LifestyleItem, LedgerError> {
        validate_name(name)?;
        validate_non_negative(monthly_cost)?;
        update(store, keys::LIFESTYLE_ITEMS, &mut self.lifestyle, id, |i| {
            i.name = name.trim().to_string();
            i.monthly_cost = monthly_cost;
            i.image_url = image_url
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string);
        })
    }

    pub fn delete_lifestyle_item<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
    ) -> Result<LifestyleItem, LedgerError> {
        let removed = remove(store, keys::LIFESTYLE_ITEMS, &mut self.lifestyle, id)?;
        info!(%id, "lifestyle item deleted");
        Ok(removed)
    }

    fn total_of(&self, kind: HoldingKind) -> Decimal {
        self.holdings
            .iter()
            .filter(|h| h.kind == kind)
            .map(|h| h.value)
            .sum()
    }

    pub fn total_assets(&self) -> Decimal {
        self.total_of(HoldingKind::Asset)
    }

    pub fn total_liabilities(&self) -> Decimal {
        self.total_of(HoldingKind::Liability)
    }

    /// Assets minus liabilities.
    pub fn net_worth(&self) -> Decimal {
        self.total_assets() - self.total_liabilities()
    }

    pub fn rank(&self) -> NetWorthRank {
        NetWorthRank::for_net_worth(self.net_worth())
    }

    /// Passive income normalized to a month.
    pub fn monthly_cashflow(&self) -> Decimal {
        self.passive.iter().map(PassiveIncome::monthly).sum()
    }

    /// Active income normalized to a month.
    pub fn monthly_active_income(&self) -> Decimal {
        self.active.iter().map(ActiveIncome::monthly).sum()
    }

    pub fn expenses_in(&self, month: YearMonth) -> impl Iterator<Item = &Expense> {
        self.expenses.iter().filter(move |e| month.contains(e.date))
    }

    pub fn monthly_expenses(&self, month: YearMonth) -> Decimal {
        self.expenses_in(month).map(|e| e.amount).sum()
    }

    /// Expense totals per category for `month`, largest first.
    pub fn expense_breakdown(&self, month: YearMonth) -> Vec<CategoryTotal> {
        category_totals(
            self.expenses_in(month)
                .map(|e| (e.category_id.as_str(), e.amount)),
        )
    }

    /// Holding totals per category for one side of the balance sheet.
    pub fn holdings_by_category(&self, kind: HoldingKind) -> Vec<CategoryTotal> {
        category_totals(
            self.holdings
                .iter()
                .filter(|h| h.kind == kind)
                .map(|h| (h.category.as_str(), h.value)),
        )
    }

    /// Monthly passive income per category.
    pub fn cashflow_by_category(&self) -> Vec<CategoryTotal> {
        category_totals(
            self.passive
                .iter()
                .map(|p| (p.category.as_str(), p.monthly())),
        )
    }

    pub fn savings_balance(&self) -> Decimal {
        self.savings.iter().map(|s| s.amount).sum()
    }

    /// Sum of lifestyle monthly costs, or `default_cost` when there are no items.
    pub fn monthly_cost_of_living(&self, default_cost: Decimal) -> Decimal {
        if self.lifestyle.is_empty() {
            return default_cost;
        }
        self.lifestyle.iter().map(|i| i.monthly_cost).sum()
    }

    /// Owned lifestyle items as a percentage of all items.
    pub fn lifestyle_progress(&self) -> Decimal {
        let owned = self.lifestyle.iter().filter(|i| i.is_owned).count();
        ratio_percent(Decimal::from(owned), Decimal::from(self.lifestyle.len()))
    }

    pub fn emergency_fund(&self, default_cost: Decimal) -> EmergencyFund {
        let balance = self.savings_balance();
        let monthly_cost = self.monthly_cost_of_living(default_cost);
        let goal = monthly_cost * Decimal::from(6);
        let months_covered = if monthly_cost > Decimal::ZERO {
            Some(balance / monthly_cost)
        } else {
            None
        };
        EmergencyFund {
            balance,
            monthly_cost,
            goal,
            progress: ratio_percent(balance, goal).min(Decimal::ONE_HUNDRED),
            months_covered,
            tier: savings_tier(months_covered),
        }
    }

    /// The figures every other view is computed from.
    pub fn aggregate(&self, month: YearMonth) -> WealthAggregate {
        WealthAggregate {
            patrimonio_total: self.net_worth(),
            cashflow: self.monthly_cashflow(),
            ingresos_activos: self.monthly_active_income(),
            gastos: self.monthly_expenses(month),
            nivel_ahorro: self.savings_balance(),
            progreso_calidad_vida: self.lifestyle_progress(),
        }
    }

    /// Progress toward the configured monthly passive-income goal.
    pub fn cashflow_goal(&self, config: &AppConfig) -> Decimal {
        cashflow_goal_progress(self.monthly_cashflow(), config.monthly_cashflow_goal)
    }
}
