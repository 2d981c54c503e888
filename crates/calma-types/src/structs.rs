//! Core entity structs for the growth engine.
//!
//! [`GrowthRecord`] is the persisted per-user document; [`GrowthView`] is the
//! read-only presentation shape the API collaborators serialize to JSON.
//! Both flow to the React client as TypeScript types via `ts-rs`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::TraitKey;
use crate::ids::UserId;

// ---------------------------------------------------------------------------
// Persisted state
// ---------------------------------------------------------------------------

/// Per-trait leveling state: the current level and the XP accumulated
/// *within* that level.
///
/// Invariants maintained by the action processor: `level` is in `1..=50` and
/// never decreases; while `level < 50`, `xp` is strictly below the XP
/// required to finish the current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TraitState {
    /// Current level, starting at 1 and capped at 50.
    pub level: u32,
    /// XP accumulated toward the next level.
    pub xp: u32,
}

impl TraitState {
    /// Fresh state for a newly created record: level 1 with no XP.
    pub const fn new() -> Self {
        Self { level: 1, xp: 0 }
    }
}

impl Default for TraitState {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry in the recent-growth feed, recorded when a trait levels up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GrowthEvent {
    /// The trait that leveled up.
    pub trait_key: TraitKey,
    /// Human-readable message, e.g. `"Momentum strengthened."`.
    pub message: String,
    /// When the level-up occurred.
    pub at: DateTime<Utc>,
}

/// The per-user growth document. One record exists per user, created lazily
/// on first access and mutated only by the action processor.
///
/// `total_level`, `total_xp`, `title`, and `archetype` are derived values,
/// recomputed wholesale from `traits` after every mutation rather than
/// patched incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GrowthRecord {
    /// Owner of this record. Unique: at most one record per user.
    pub user_id: UserId,
    /// Leveling state for each of the five traits. All five keys are always
    /// present.
    pub traits: BTreeMap<TraitKey, TraitState>,
    /// Floor of the average of the five trait levels.
    pub total_level: u32,
    /// Sum of the five traits' current in-level XP.
    pub total_xp: u32,
    /// Title derived from `total_level` via the threshold table.
    pub title: String,
    /// Archetype derived from the two highest-leveled traits. Empty string
    /// on a fresh record, until the first recomputation.
    pub archetype: String,
    /// The most recent level-up events, newest first, at most 5.
    pub recent_growth: Vec<GrowthEvent>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last persisted.
    pub updated_at: DateTime<Utc>,
}

impl GrowthRecord {
    /// Return the state for a trait.
    ///
    /// All five keys are always present in a well-formed record; a missing
    /// key falls back to the fresh level-1 state rather than panicking.
    pub fn trait_state(&self, key: TraitKey) -> TraitState {
        self.traits.get(&key).copied().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Per-trait progress as exposed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TraitProgress {
    /// Current level.
    pub level: u32,
    /// XP accumulated toward the next level.
    pub xp: u32,
    /// XP required to finish the current level, or `None` at the level cap.
    pub required_xp: Option<u32>,
    /// Percentage of the current level completed, 0 to 100. Reported as 100
    /// at the level cap.
    #[ts(as = "String")]
    pub progress_percent: Decimal,
}

/// Read-only view of a [`GrowthRecord`] for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GrowthView {
    /// Floor of the average of the five trait levels.
    pub total_level: u32,
    /// Sum of the five traits' current in-level XP.
    pub total_xp: u32,
    /// Title derived from the total level.
    pub title: String,
    /// Archetype derived from the two highest-leveled traits.
    pub archetype: String,
    /// Per-trait progress for each of the five traits.
    pub traits: BTreeMap<TraitKey, TraitProgress>,
    /// The most recent level-up events, newest first, at most 5.
    pub recent_growth: Vec<GrowthEvent>,
}
