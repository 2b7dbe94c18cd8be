//! Persisted financial records. Field names match the stored JSON documents,
//! including the optional fields older records omit.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::LedgerError;

/// Records addressed by their `id` field.
pub(crate) trait Record {
    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($($ty:ty),*) => {
        $(impl Record for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_record!(
    Holding,
    PassiveIncome,
    ActiveIncome,
    Expense,
    ExpenseCategory,
    SavingEntry,
    LifestyleItem
);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldingKind {
    Asset,
    Liability,
}

/// An asset or a liability with its current value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: String,
    pub name: String,
    pub value: Decimal,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: HoldingKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassiveFrequency {
    Monthly,
    Quarterly,
    Yearly,
}

impl PassiveFrequency {
    pub fn to_monthly(self, amount: Decimal) -> Decimal {
        match self {
            PassiveFrequency::Monthly => amount,
            PassiveFrequency::Quarterly => amount / Decimal::from(3),
            PassiveFrequency::Yearly => amount / Decimal::from(12),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PassiveFrequency::Monthly => "mensual",
            PassiveFrequency::Quarterly => "trimestral",
            PassiveFrequency::Yearly => "anual",
        }
    }
}

impl FromStr for PassiveFrequency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(PassiveFrequency::Monthly),
            "quarterly" => Ok(PassiveFrequency::Quarterly),
            "yearly" => Ok(PassiveFrequency::Yearly),
            _ => Err(LedgerError::InvalidFrequency(s.to_string())),
        }
    }
}

/// A passive income source (rent, dividends, royalties...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassiveIncome {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub frequency: PassiveFrequency,
    pub category: String,
    pub date_added: NaiveDate,
}

impl PassiveIncome {
    pub fn monthly(&self) -> Decimal {
        self.frequency.to_monthly(self.amount)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncomeFrequency {
    Monthly,
    BiWeekly,
    Weekly,
    Yearly,
    OneTime,
}

impl IncomeFrequency {
    /// Monthly equivalent. One-time payments do not recur and count as zero.
    pub fn to_monthly(self, amount: Decimal) -> Decimal {
        match self {
            IncomeFrequency::Monthly => amount,
            IncomeFrequency::BiWeekly => amount * Decimal::new(217, 2),
            IncomeFrequency::Weekly => amount * Decimal::new(433, 2),
            IncomeFrequency::Yearly => amount / Decimal::from(12),
            IncomeFrequency::OneTime => Decimal::ZERO,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IncomeFrequency::Monthly => "Mensual",
            IncomeFrequency::BiWeekly => "Quincenal",
            IncomeFrequency::Weekly => "Semanal",
            IncomeFrequency::Yearly => "Anual",
            IncomeFrequency::OneTime => "Una vez",
        }
    }
}

impl FromStr for IncomeFrequency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(IncomeFrequency::Monthly),
            "bi-weekly" | "biweekly" => Ok(IncomeFrequency::BiWeekly),
            "weekly" => Ok(IncomeFrequency::Weekly),
            "yearly" => Ok(IncomeFrequency::Yearly),
            "one-time" | "onetime" => Ok(IncomeFrequency::OneTime),
            _ => Err(LedgerError::InvalidFrequency(s.to_string())),
        }
    }
}

/// Work income.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveIncome {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub frequency: IncomeFrequency,
}

impl ActiveIncome {
    pub fn monthly(&self) -> Decimal {
        self.frequency.to_monthly(self.amount)
    }
}

/// A dated expense filed under an [`ExpenseCategory`] by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub amount: Decimal,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub date: NaiveDate,
    /// Records written without a timestamp decode as the Unix epoch.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: String,
    pub name: String,
    /// Tailwind background class.
    pub color: String,
    pub icon: String,
}

impl ExpenseCategory {
    fn builtin(id: &str, name: &str, color: &str, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }

    /// Categories offered before the user saves their own list.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::builtin("1", "Alimentación", "bg-green-500", "🍕"),
            Self::builtin("2", "Transporte", "bg-blue-500", "🚗"),
            Self::builtin("3", "Entretenimiento", "bg-purple-500", "🎮"),
            Self::builtin("4", "Salud", "bg-red-500", "🏥"),
            Self::builtin("5", "Educación", "bg-yellow-500", "📚"),
            Self::builtin("6", "Servicios", "bg-gray-500", "💡"),
            Self::builtin("7", "Ropa", "bg-pink-500", "👕"),
            Self::builtin("8", "Otros", "bg-orange-500", "📦"),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingKind {
    Saving,
    Withdrawal,
}

/// A movement in the emergency fund. Withdrawals are stored with a negative
/// amount so the balance is a plain sum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingEntry {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: SavingKind,
    pub created_at: DateTime<Utc>,
}

/// Something the user wants in their life, with what it costs per month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleItem {
    pub id: String,
    pub name: String,
    pub monthly_cost: Decimal,
    pub is_owned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn income_normalization() {
        let d = Decimal::from(1000);
        assert_eq!(IncomeFrequency::Monthly.to_monthly(d), d);
        assert_eq!(IncomeFrequency::Weekly.to_monthly(d), Decimal::from(4330));
        assert_eq!(IncomeFrequency::BiWeekly.to_monthly(d), Decimal::from(2170));
        assert_eq!(IncomeFrequency::OneTime.to_monthly(d), Decimal::ZERO);
        assert_eq!(
            IncomeFrequency::Yearly.to_monthly(Decimal::from(1200)),
            Decimal::from(100)
        );
        assert_eq!(
            PassiveFrequency::Quarterly.to_monthly(Decimal::from(300)),
            Decimal::from(100)
        );
    }

    #[test]
    fn frequencies_parse() {
        assert_eq!("Bi-Weekly".parse::<IncomeFrequency>().unwrap(), IncomeFrequency::BiWeekly);
        assert_eq!("one-time".parse::<IncomeFrequency>().unwrap(), IncomeFrequency::OneTime);
        assert_eq!("quarterly".parse::<PassiveFrequency>().unwrap(), PassiveFrequency::Quarterly);
        assert!(matches!(
            "daily".parse::<PassiveFrequency>(),
            Err(LedgerError::InvalidFrequency(_))
        ));
    }

    #[test]
    fn stored_shapes_decode() {
        let h: Holding = serde_json::from_value(json!({
            "id": "1", "name": "Casa", "value": 250000,
            "category": "real-estate", "type": "asset"
        }))
        .unwrap();
        assert_eq!(h.kind, HoldingKind::Asset);

        let i: ActiveIncome = serde_json::from_value(json!({
            "id": "2", "name": "Nómina", "amount": 1500, "frequency": "bi-weekly"
        }))
        .unwrap();
        assert_eq!(i.frequency, IncomeFrequency::BiWeekly);

        let s: SavingEntry = serde_json::from_value(json!({
            "id": "3", "name": "Retiro", "amount": -200, "type": "withdrawal",
            "createdAt": "2024-02-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(s.amount, Decimal::from(-200));

        let e: Expense = serde_json::from_value(json!({
            "id": "1717000000000", "amount": 45.5, "categoryId": "1", "note": "super",
            "date": "2024-03-04", "createdAt": "2024-03-04T10:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(e.amount, Decimal::new(455, 1));
        assert_eq!(e.note.as_deref(), Some("super"));
        assert_eq!(e.created_at.to_rfc3339(), "2024-03-04T10:00:00+00:00");

        let bare: Expense = serde_json::from_value(json!({
            "id": "5", "amount": 12, "categoryId": "8", "date": "2024-03-05"
        }))
        .unwrap();
        assert!(bare.note.is_none());
        assert_eq!(bare.created_at.timestamp(), 0);

        let l: LifestyleItem = serde_json::from_value(json!({
            "id": "4", "name": "Gimnasio", "monthlyCost": 40, "isOwned": true
        }))
        .unwrap();
        assert!(l.image_url.is_none());
    }
}
