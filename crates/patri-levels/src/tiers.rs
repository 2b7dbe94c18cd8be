//! Secondary tier tables: Duplicador flip tiers and emergency-fund tiers.

use rust_decimal::Decimal;
use serde::Serialize;

/// A named stage of the Duplicador journey covering a run of flips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FlipTier {
    pub tier: u32,
    pub name: &'static str,
    pub icon: &'static str,
    /// Highest flip belonging to this tier.
    pub last_flip: u32,
}

impl FlipTier {
    const fn new(tier: u32, name: &'static str, icon: &'static str, last_flip: u32) -> Self {
        Self {
            tier,
            name,
            icon,
            last_flip,
        }
    }
}

/// Eleven tiers of two flips each; the last one holds the final flip.
pub const FLIP_TIERS: [FlipTier; 11] = [
    FlipTier::new(1, "Semilla", "sprout", 2),
    FlipTier::new(2, "Brote", "leaf", 4),
    FlipTier::new(3, "Planta", "tree-deciduous", 6),
    FlipTier::new(4, "Árbol", "tree-deciduous", 8),
    FlipTier::new(5, "Bosque", "mountain", 10),
    FlipTier::new(6, "Montaña", "mountain", 12),
    FlipTier::new(7, "Cohete", "rocket", 14),
    FlipTier::new(8, "Estrella", "star", 16),
    FlipTier::new(9, "Diamante", "gem", 18),
    FlipTier::new(10, "Corona", "crown", 20),
    FlipTier::new(11, "Leyenda", "trophy", u32::MAX),
];

/// Tier holding `flip`.
pub fn flip_tier(flip: u32) -> &'static FlipTier {
    FLIP_TIERS
        .iter()
        .find(|t| flip <= t.last_flip)
        .unwrap_or(&FLIP_TIERS[FLIP_TIERS.len() - 1])
}

/// Tier shown as the upcoming goal: the tier two flips ahead.
pub fn next_flip_tier(flip: u32) -> &'static FlipTier {
    flip_tier(flip.saturating_add(2))
}

/// Progress bar value for the tier card: 50 on the first flip of a tier,
/// 100 on the second.
pub fn flip_tier_progress(flip: u32) -> u8 {
    if flip.saturating_sub(1) % 2 == 0 {
        50
    } else {
        100
    }
}

/// Emergency-fund tier keyed by months of living costs covered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SavingsTier {
    pub id: u32,
    pub name: &'static str,
    /// Months required, in tenths of a month.
    pub months_required_tenths: u32,
    pub description: &'static str,
}

impl SavingsTier {
    const fn new(
        id: u32,
        name: &'static str,
        months_required_tenths: u32,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            months_required_tenths,
            description,
        }
    }

    pub fn months_required(&self) -> Decimal {
        Decimal::new(i64::from(self.months_required_tenths), 1)
    }
}

pub const SAVINGS_TIERS: [SavingsTier; 5] = [
    SavingsTier::new(1, "Principiante", 5, "15 días de gastos"),
    SavingsTier::new(2, "Básico", 10, "1 mes de gastos"),
    SavingsTier::new(3, "Intermedio", 30, "3 meses de gastos"),
    SavingsTier::new(4, "Avanzado", 60, "6 meses de gastos (Ideal)"),
    SavingsTier::new(5, "Experto", 120, "12+ meses de gastos"),
];

/// Highest tier whose requirement `months_covered` meets. Falls back to the
/// first tier when coverage is unknown or below every requirement.
pub fn savings_tier(months_covered: Option<Decimal>) -> &'static SavingsTier {
    let Some(months) = months_covered else {
        return &SAVINGS_TIERS[0];
    };
    SAVINGS_TIERS
        .iter()
        .rev()
        .find(|t| months >= t.months_required())
        .unwrap_or(&SAVINGS_TIERS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_map_to_tiers_in_pairs() {
        assert_eq!(flip_tier(1).name, "Semilla");
        assert_eq!(flip_tier(2).name, "Semilla");
        assert_eq!(flip_tier(3).name, "Brote");
        assert_eq!(flip_tier(20).name, "Corona");
        assert_eq!(flip_tier(21).name, "Leyenda");
        assert_eq!(next_flip_tier(1).name, "Brote");
        assert_eq!(next_flip_tier(u32::MAX).name, "Leyenda");
    }

    #[test]
    fn tier_progress_alternates() {
        assert_eq!(flip_tier_progress(1), 50);
        assert_eq!(flip_tier_progress(2), 100);
        assert_eq!(flip_tier_progress(3), 50);
    }

    #[test]
    fn tiers_are_ordered() {
        for pair in FLIP_TIERS.windows(2) {
            assert!(pair[0].last_flip < pair[1].last_flip);
            assert_eq!(pair[0].tier + 1, pair[1].tier);
        }
        for pair in SAVINGS_TIERS.windows(2) {
            assert!(pair[0].months_required() < pair[1].months_required());
        }
    }

    #[test]
    fn savings_tier_by_coverage() {
        assert_eq!(savings_tier(None).name, "Principiante");
        assert_eq!(savings_tier(Some(Decimal::new(1, 1))).name, "Principiante");
        assert_eq!(savings_tier(Some(Decimal::ONE)).name, "Básico");
        assert_eq!(savings_tier(Some(Decimal::new(59, 1))).name, "Intermedio");
        assert_eq!(savings_tier(Some(Decimal::new(6, 0))).name, "Avanzado");
        assert_eq!(savings_tier(Some(Decimal::new(40, 0))).name, "Experto");
    }
}
