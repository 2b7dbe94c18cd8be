#![deny(warnings)]

//! Wealth levels: threshold tables and resolution helpers for Patripoly.
//!
//! This crate provides validated utilities for:
//! - Resolving a net-worth figure to its current and next wealth level
//! - Progress toward the next level, interpolated between level floors
//! - Per-level display styles, Duplicador flip tiers and emergency-fund tiers

mod tiers;

pub use tiers::{
    flip_tier, flip_tier_progress, next_flip_tier, savings_tier, FlipTier, SavingsTier,
    FLIP_TIERS, SAVINGS_TIERS,
};

use patri_core::{format_grouped, round_whole};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// A named milestone tier keyed by net-worth thresholds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WealthLevel {
    /// 1-based level number.
    pub level: u32,
    /// Display name, e.g. "Constructor".
    pub name: String,
    /// Inclusive lower bound.
    pub min_wealth: Decimal,
    /// Inclusive upper bound; `None` for the unbounded top level.
    pub max_wealth: Option<Decimal>,
    /// Narrative message shown while at this level.
    pub message: String,
}

impl WealthLevel {
    /// Closed-interval membership; the top level has no ceiling.
    pub fn contains(&self, wealth: Decimal) -> bool {
        wealth >= self.min_wealth && self.max_wealth.map_or(true, |max| wealth <= max)
    }

    /// Range label such as `1,000 – 4,999` or `10,000,000+`.
    pub fn range_label(&self) -> String {
        let min = format_grouped(self.min_wealth, ',');
        match self.max_wealth {
            Some(max) => format!("{min} – {}", format_grouped(max, ',')),
            None => format!("{min}+"),
        }
    }
}

/// Errors produced when validating level tables and palettes.
#[derive(Debug, Error, PartialEq)]
pub enum LevelTableError {
    /// A table needs at least one level.
    #[error("level table is empty")]
    Empty,
    /// Levels must be numbered 1, 2, 3, ... in order.
    #[error("expected level {expected}, found {found}")]
    Numbering { expected: u32, found: u32 },
    /// The first level must start at zero wealth.
    #[error("first level must start at 0, starts at {0}")]
    FirstFloorNotZero(Decimal),
    /// Only the top level may be unbounded.
    #[error("level {0} has no ceiling but is not the top level")]
    MissingCeiling(u32),
    /// The top level must be unbounded.
    #[error("top level {0} must not have a ceiling")]
    BoundedTop(u32),
    /// Ceiling below floor.
    #[error("level {0} has a ceiling below its floor")]
    InvertedRange(u32),
    /// Consecutive levels must tile whole currency units with no gap or overlap.
    #[error("level {level} ends at {ceiling} but the next level starts at {next_floor}")]
    Gap {
        level: u32,
        ceiling: Decimal,
        next_floor: Decimal,
    },
    /// A palette must have exactly one style per level, in order.
    #[error("palette entry {index} styles level {found}, expected {expected}")]
    PaletteMismatch {
        index: usize,
        expected: u32,
        found: u32,
    },
    /// Palette and table lengths differ.
    #[error("palette has {styles} styles for {levels} levels")]
    PaletteLength { styles: usize, levels: usize },
}

/// (level, name, min, max, message)
type LevelRow = (u32, &'static str, i64, Option<i64>, &'static str);

#[rustfmt::skip]
const STANDARD_LEVELS: [LevelRow; 10] = [
    (1, "Iniciador", 0, Some(499), "Every empire starts with a single coin. You're on the path to building yours."),
    (2, "Constructor", 500, Some(999), "You're laying down the foundation of your fortune. Keep going!"),
    (3, "Visionario", 1_000, Some(4_999), "You've begun to think like an investor. Vision brings momentum."),
    (4, "Arquitecto", 5_000, Some(19_999), "You're designing the future with every move. Growth is now intentional."),
    (5, "Estratega", 20_000, Some(99_999), "Strategy is your ally. You've crossed into serious builder territory."),
    (6, "Ejecutivo", 100_000, Some(499_999), "You manage capital with confidence. The game is getting interesting."),
    (7, "Magnate", 500_000, Some(999_999), "Halfway to the million. You're already someone others admire."),
    (8, "Millonario", 1_000_000, Some(1_999_999), "You did it! Welcome to the Millionaire's Club. Keep your focus and expand wisely."),
    (9, "Multi-Millonario", 2_000_000, Some(9_999_999), "Your wealth multiplies. You've mastered the art of growth."),
    (10, "Patrimonio Legendario", 10_000_000, None, "You're building legacy, not just capital. Few reach this far, and you're one of them."),
];

/// Ordered, validated list of wealth levels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WealthLevelTable {
    levels: Vec<WealthLevel>,
}

impl WealthLevelTable {
    /// The ten Patripoly levels, from "Iniciador" to "Patrimonio Legendario".
    pub fn standard() -> Self {
        let levels = STANDARD_LEVELS
            .iter()
            .map(|&(level, name, min, max, message)| WealthLevel {
                level,
                name: name.to_string(),
                min_wealth: Decimal::from(min),
                max_wealth: max.map(Decimal::from),
                message: message.to_string(),
            })
            .collect();
        Self { levels }
    }

    /// Build a custom table, enforcing contiguous whole-unit ranges.
    pub fn new(levels: Vec<WealthLevel>) -> Result<Self, LevelTableError> {
        validate_levels(&levels)?;
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[WealthLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level by its 1-based number.
    pub fn get(&self, level: u32) -> Option<&WealthLevel> {
        let idx = usize::try_from(level).ok()?.checked_sub(1)?;
        self.levels.get(idx)
    }

    pub fn first(&self) -> &WealthLevel {
        &self.levels[0]
    }

    pub fn top(&self) -> &WealthLevel {
        &self.levels[self.levels.len() - 1]
    }

    /// Level whose closed range contains `wealth`.
    ///
    /// Ranges are defined in whole currency units, so fractional wealth is
    /// matched by its floor. Negative wealth, or a value no level covers,
    /// resolves to the first level.
    pub fn current_level(&self, wealth: Decimal) -> &WealthLevel {
        if wealth < Decimal::ZERO {
            return self.first();
        }
        let whole = wealth.floor();
        match self.levels.iter().find(|l| l.contains(whole)) {
            Some(level) => level,
            None => {
                warn!(%wealth, "no wealth level matched; falling back to the first level");
                self.first()
            }
        }
    }

    /// Level numbered one above the current one, if any.
    pub fn next_level(&self, wealth: Decimal) -> Option<&WealthLevel> {
        let current = self.current_level(wealth);
        self.get(current.level + 1)
    }

    /// Progress toward the next level in `[0, 100]`.
    ///
    /// Linear between the current level's floor and the next level's floor:
    /// `round(100 * (wealth - current.min) / (next.min - current.min))`.
    /// Returns 100 at the top level.
    pub fn progress(&self, wealth: Decimal) -> u8 {
        let current = self.current_level(wealth);
        let Some(next) = self.get(current.level + 1) else {
            return 100;
        };
        let span = next.min_wealth - current.min_wealth;
        if span <= Decimal::ZERO {
            return 100;
        }
        let pct = round_whole((wealth - current.min_wealth) / span * Decimal::ONE_HUNDRED);
        pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            .to_u8()
            .unwrap_or(0)
    }

    /// Current level, next level and progress in one pass.
    pub fn status(&self, wealth: Decimal) -> LevelStatus<'_> {
        LevelStatus {
            current: self.current_level(wealth),
            next: self.next_level(wealth),
            progress: self.progress(wealth),
        }
    }

    /// Every level tagged relative to `wealth`, for the level list view.
    pub fn overview(&self, wealth: Decimal) -> Vec<LevelOverview<'_>> {
        let current = self.current_level(wealth).level;
        self.levels
            .iter()
            .map(|level| {
                let standing = if level.level == current {
                    Standing::Current
                } else if level.max_wealth.is_some_and(|max| wealth > max) {
                    Standing::Completed
                } else {
                    Standing::Upcoming
                };
                LevelOverview { level, standing }
            })
            .collect()
    }
}

fn validate_levels(levels: &[WealthLevel]) -> Result<(), LevelTableError> {
    let first = levels.first().ok_or(LevelTableError::Empty)?;
    if first.min_wealth != Decimal::ZERO {
        return Err(LevelTableError::FirstFloorNotZero(first.min_wealth));
    }
    for (idx, level) in levels.iter().enumerate() {
        let expected = idx as u32 + 1;
        if level.level != expected {
            return Err(LevelTableError::Numbering {
                expected,
                found: level.level,
            });
        }
        let is_top = idx + 1 == levels.len();
        match (level.max_wealth, is_top) {
            (None, true) => {}
            (Some(_), true) => return Err(LevelTableError::BoundedTop(level.level)),
            (None, false) => return Err(LevelTableError::MissingCeiling(level.level)),
            (Some(max), false) => {
                if max < level.min_wealth {
                    return Err(LevelTableError::InvertedRange(level.level));
                }
                let next_floor = levels[idx + 1].min_wealth;
                if next_floor != max + Decimal::ONE {
                    return Err(LevelTableError::Gap {
                        level: level.level,
                        ceiling: max,
                        next_floor,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Result of [`WealthLevelTable::status`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelStatus<'a> {
    pub current: &'a WealthLevel,
    pub next: Option<&'a WealthLevel>,
    pub progress: u8,
}

/// Where a level sits relative to the user's wealth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Standing {
    Completed,
    Current,
    Upcoming,
}

/// One row of [`WealthLevelTable::overview`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelOverview<'a> {
    pub level: &'a WealthLevel,
    pub standing: Standing,
}

/// Icon and color used to render a level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelStyle {
    pub level: u32,
    pub icon: String,
    pub color: String,
}

const STANDARD_STYLES: [(&str, &str); 10] = [
    ("star", "bg-slate-500"),
    ("trending-up", "bg-amber-500"),
    ("trending-up", "bg-orange-500"),
    ("trending-up", "bg-blue-500"),
    ("trophy", "bg-purple-500"),
    ("trophy", "bg-green-500"),
    ("crown", "bg-indigo-500"),
    ("crown", "bg-yellow-500"),
    ("crown", "bg-pink-500"),
    ("crown", "bg-gradient-to-r from-yellow-400 via-orange-500 to-red-500"),
];

/// Per-level styles indexed by level number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelPalette {
    styles: Vec<LevelStyle>,
}

impl LevelPalette {
    /// Palette for [`WealthLevelTable::standard`].
    pub fn standard() -> Self {
        let styles = STANDARD_STYLES
            .iter()
            .zip(1u32..)
            .map(|(&(icon, color), level)| LevelStyle {
                level,
                icon: icon.to_string(),
                color: color.to_string(),
            })
            .collect();
        Self { styles }
    }

    /// Build a palette that must cover every level of `table` contiguously.
    pub fn for_table(
        styles: Vec<LevelStyle>,
        table: &WealthLevelTable,
    ) -> Result<Self, LevelTableError> {
        let palette = Self { styles };
        palette.check_covers(table)?;
        Ok(palette)
    }

    /// Verify one style per level, numbered 1..=n in order.
    pub fn check_covers(&self, table: &WealthLevelTable) -> Result<(), LevelTableError> {
        if self.styles.len() != table.len() {
            return Err(LevelTableError::PaletteLength {
                styles: self.styles.len(),
                levels: table.len(),
            });
        }
        for (index, (style, level)) in self.styles.iter().zip(table.levels()).enumerate() {
            if style.level != level.level {
                return Err(LevelTableError::PaletteMismatch {
                    index,
                    expected: level.level,
                    found: style.level,
                });
            }
        }
        Ok(())
    }

    pub fn style(&self, level: u32) -> Option<&LevelStyle> {
        let idx = usize::try_from(level).ok()?.checked_sub(1)?;
        self.styles.get(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn standard_table_is_valid() {
        let table = WealthLevelTable::standard();
        assert_eq!(table.len(), 10);
        validate_levels(table.levels()).unwrap();
        LevelPalette::standard().check_covers(&table).unwrap();
    }

    #[test]
    fn worked_scenarios() {
        let t = WealthLevelTable::standard();
        assert_eq!(t.current_level(d(0)).name, "Iniciador");
        assert_eq!(t.progress(d(0)), 0);

        assert_eq!(t.current_level(d(499)).level, 1);
        assert_eq!(t.progress(d(499)), 100);

        assert_eq!(t.current_level(d(500)).level, 2);
        assert_eq!(t.progress(d(500)), 0);

        assert_eq!(t.current_level(d(10_000_000)).level, 10);
        assert!(t.next_level(d(10_000_000)).is_none());
        assert_eq!(t.progress(d(10_000_000)), 100);
    }

    #[test]
    fn progress_uses_floor_to_floor_span() {
        let t = WealthLevelTable::standard();
        // Level 3 floor 1,000, level 4 floor 5,000: 3,000 is halfway.
        assert_eq!(t.progress(d(3_000)), 50);
        // 25,000 in level 5 (20k..100k): 5k / 80k = 6.25% -> 6.
        assert_eq!(t.progress(d(25_000)), 6);
        // 2.5 / 500 * 100 = 0.5, halves round up.
        assert_eq!(t.progress(Decimal::new(25, 1)), 1);
    }

    #[test]
    fn negative_wealth_defaults_to_first_level() {
        let t = WealthLevelTable::standard();
        let status = t.status(d(-5_000));
        assert_eq!(status.current.level, 1);
        assert_eq!(status.next.map(|l| l.level), Some(2));
        assert_eq!(status.progress, 0);
    }

    #[test]
    fn fractional_wealth_stays_in_lower_level() {
        let t = WealthLevelTable::standard();
        assert_eq!(t.current_level(Decimal::new(4995, 1)).level, 1);
        assert_eq!(t.current_level(Decimal::new(5001, 1)).level, 2);
    }

    #[test]
    fn range_labels() {
        let t = WealthLevelTable::standard();
        assert_eq!(t.first().range_label(), "0 – 499");
        assert_eq!(t.get(3).unwrap().range_label(), "1,000 – 4,999");
        assert_eq!(t.top().range_label(), "10,000,000+");
    }

    #[test]
    fn overview_marks_standing() {
        let t = WealthLevelTable::standard();
        let rows = t.overview(d(25_000));
        assert_eq!(rows.len(), 10);
        assert!(rows[..4].iter().all(|r| r.standing == Standing::Completed));
        assert_eq!(rows[4].standing, Standing::Current);
        assert!(rows[5..].iter().all(|r| r.standing == Standing::Upcoming));
    }

    #[test]
    fn custom_table_validation() {
        let lvl = |level, min: i64, max: Option<i64>| WealthLevel {
            level,
            name: format!("L{level}"),
            min_wealth: d(min),
            max_wealth: max.map(d),
            message: String::new(),
        };
        assert_eq!(WealthLevelTable::new(vec![]), Err(LevelTableError::Empty));
        assert!(WealthLevelTable::new(vec![lvl(1, 0, Some(9)), lvl(2, 10, None)]).is_ok());
        assert_eq!(
            WealthLevelTable::new(vec![lvl(1, 0, Some(9)), lvl(2, 12, None)]),
            Err(LevelTableError::Gap {
                level: 1,
                ceiling: d(9),
                next_floor: d(12)
            })
        );
        assert_eq!(
            WealthLevelTable::new(vec![lvl(1, 0, Some(9)), lvl(3, 10, None)]),
            Err(LevelTableError::Numbering {
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            WealthLevelTable::new(vec![lvl(1, 5, None)]),
            Err(LevelTableError::FirstFloorNotZero(d(5)))
        );
        assert_eq!(
            WealthLevelTable::new(vec![lvl(1, 0, Some(9))]),
            Err(LevelTableError::BoundedTop(1))
        );
        assert_eq!(
            WealthLevelTable::new(vec![lvl(1, 0, None), lvl(2, 10, None)]),
            Err(LevelTableError::MissingCeiling(1))
        );
    }

    #[test]
    fn palette_must_cover_levels() {
        let t = WealthLevelTable::standard();
        let style = |level| LevelStyle {
            level,
            icon: "star".into(),
            color: "bg".into(),
        };
        assert_eq!(
            LevelPalette::for_table(vec![style(1)], &t),
            Err(LevelTableError::PaletteLength {
                styles: 1,
                levels: 10
            })
        );
        let mut styles: Vec<_> = (1..=10).map(style).collect();
        styles.swap(2, 3);
        assert!(matches!(
            LevelPalette::for_table(styles, &t),
            Err(LevelTableError::PaletteMismatch { index: 2, .. })
        ));
        let palette = LevelPalette::standard();
        assert_eq!(palette.style(10).unwrap().icon, "crown");
        assert!(palette.style(0).is_none());
        assert!(palette.style(11).is_none());
    }

    #[test]
    fn table_serializes() {
        let json = serde_json::to_string(&WealthLevelTable::standard().top()).unwrap();
        assert!(json.contains("\"max_wealth\":null"));
    }

    proptest! {
        #[test]
        fn exactly_one_level_matches(w in 0i64..50_000_000) {
            let t = WealthLevelTable::standard();
            let wealth = d(w);
            let matching: Vec<_> = t.levels().iter().filter(|l| l.contains(wealth)).collect();
            prop_assert_eq!(matching.len(), 1);
            let current = t.current_level(wealth);
            prop_assert_eq!(current.level, matching[0].level);
            prop_assert!(current.min_wealth <= wealth);
            prop_assert!(current.max_wealth.map_or(true, |m| wealth <= m));
        }

        #[test]
        fn progress_is_bounded(w in -1_000_000i64..50_000_000) {
            let p = WealthLevelTable::standard().progress(d(w));
            prop_assert!(p <= 100);
        }

        #[test]
        fn progress_monotonic_within_level(w in 0i64..9_999_999) {
            let t = WealthLevelTable::standard();
            let a = d(w);
            let b = d(w + 1);
            if t.current_level(a).level == t.current_level(b).level {
                prop_assert!(t.progress(a) <= t.progress(b));
            } else {
                prop_assert_eq!(t.progress(b), 0);
            }
        }

        #[test]
        fn top_level_always_complete(w in 10_000_000i64..i64::MAX / 2) {
            let t = WealthLevelTable::standard();
            prop_assert!(t.next_level(d(w)).is_none());
            prop_assert_eq!(t.progress(d(w)), 100);
        }
    }
}
