//! Read-only presentation formatting for API responses.
//!
//! Pure transform from the persisted [`GrowthRecord`] to the [`GrowthView`]
//! shape the HTTP collaborators serialize as JSON. Performs no mutation and
//! cannot fail on a well-formed record. Progress percentages are computed
//! with [`Decimal`] fixed-point math, never floats.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use calma_types::{GrowthRecord, GrowthView, TraitKey, TraitProgress};

use crate::catalog;
use crate::engine::MAX_RECENT_GROWTH;

/// Format a growth record for an API response.
///
/// Per trait: level, in-level XP, the XP required to finish the level
/// (`None` at the cap), and the percentage of the level completed, capped at
/// 100 and reported as 100 at the cap. Includes the derived totals and the
/// most recent level-up events.
pub fn format_for_response(record: &GrowthRecord) -> GrowthView {
    let mut traits = BTreeMap::new();
    for key in TraitKey::ALL {
        let state = record.trait_state(key);
        let progress = match catalog::required_xp(state.level) {
            Some(required) if required > 0 => TraitProgress {
                level: state.level,
                xp: state.xp,
                required_xp: Some(required),
                progress_percent: percent_of(state.xp, required),
            },
            _ => TraitProgress {
                level: state.level,
                xp: state.xp,
                required_xp: None,
                progress_percent: Decimal::ONE_HUNDRED,
            },
        };
        traits.insert(key, progress);
    }

    GrowthView {
        total_level: record.total_level,
        total_xp: record.total_xp,
        title: record.title.clone(),
        archetype: record.archetype.clone(),
        traits,
        recent_growth: record.recent_growth.iter().take(MAX_RECENT_GROWTH).cloned().collect(),
    }
}

/// `min(100, xp / required * 100)` as a [`Decimal`] rounded to two places.
fn percent_of(xp: u32, required: u32) -> Decimal {
    Decimal::from(xp)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(Decimal::from(required)))
        .map_or(Decimal::ZERO, |pct| {
            pct.min(Decimal::ONE_HUNDRED).round_dp(2)
        })
}
