//! Display formatting for amounts and percentages.
//!
//! Currency output follows the `es-ES` EUR convention with no decimals:
//! thousands are grouped with `.` only from five integer digits upward and the
//! symbol trails after a non-breaking space (`1.048.576 €`, `1000 €`).

use rust_decimal::{Decimal, RoundingStrategy};

const NBSP: char = '\u{a0}';

/// Round to whole units, halves away from zero.
pub fn round_whole(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn group_digits(digits: &str, sep: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

fn split_sign(amount: Decimal) -> (&'static str, String) {
    let whole = round_whole(amount);
    let sign = if whole < Decimal::ZERO { "-" } else { "" };
    (sign, whole.abs().normalize().to_string())
}

/// Format as whole euros, e.g. `25.000 €`.
pub fn format_currency(amount: Decimal) -> String {
    let (sign, digits) = split_sign(amount);
    let body = if digits.len() >= 5 {
        group_digits(&digits, '.')
    } else {
        digits
    };
    format!("{sign}{body}{NBSP}€")
}

/// Format whole units with `sep` between every group of three digits,
/// e.g. `format_grouped(10_000_000, ',') == "10,000,000"`.
pub fn format_grouped(amount: Decimal, sep: char) -> String {
    let (sign, digits) = split_sign(amount);
    format!("{sign}{}", group_digits(&digits, sep))
}

/// Short form used on progress maps: `1.0M`, `5K`, `512`.
pub fn format_compact(amount: Decimal) -> String {
    let million = Decimal::from(1_000_000u32);
    let thousand = Decimal::ONE_THOUSAND;
    if amount >= million {
        let mut v =
            (amount / million).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        v.rescale(1);
        format!("{v}M")
    } else if amount >= thousand {
        format!("{}K", round_whole(amount / thousand).normalize())
    } else {
        amount.normalize().to_string()
    }
}

/// [`format_compact`] with a trailing euro sign: `1.0M€`.
pub fn format_compact_eur(amount: Decimal) -> String {
    format!("{}€", format_compact(amount))
}

/// `42%`.
pub fn format_percent(value: u8) -> String {
    format!("{value}%")
}
