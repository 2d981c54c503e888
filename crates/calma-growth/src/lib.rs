//! Growth/leveling engine for Calma.
//!
//! Converts semantic user actions (task completions, focus sessions,
//! journal entries, habit streaks) into per-trait XP, level-ups across the
//! five tracked traits, and the derived total level, title, and archetype.
//! This crate contains the logic layer only -- storage is injected through
//! the [`store::GrowthStore`] trait and HTTP/auth are collaborators.
//!
//! # Modules
//!
//! - [`archetype`] -- Maps the two highest-leveled traits to a label
//! - [`catalog`] -- The XP curve and the level-to-title table
//! - [`engine`] -- The action processor ([`GrowthEngine`])
//! - [`error`] -- Error types ([`GrowthError`], [`StoreError`])
//! - [`store`] -- Storage contract and the in-memory backend
//! - [`view`] -- Presentation formatting for API responses

pub mod archetype;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod store;
pub mod view;

// Re-export primary types at crate root for convenience.
pub use archetype::{DEFAULT_ARCHETYPE, archetype_for};
pub use catalog::{DEFAULT_TITLE, MAX_TRAIT_LEVEL, required_xp, title_for};
pub use engine::{
    ActionOutcome, FOCUS_BONUS_SESSION_COUNT, GrowthEngine, MAX_RECENT_GROWTH,
    STREAK_WINDOW_DAYS, XP_FOCUS_ATTENTION, XP_FOCUS_CONSISTENCY_BASE,
    XP_FOCUS_CONSISTENCY_BONUS, XP_HABIT_STREAK, XP_JOURNAL_ENTRY,
    XP_LEARNING_TASK_COMPLETE, XP_MOOD_CHECKIN, XP_OVERDUE_TASK_COMPLETE,
    XP_SMALL_TASK_COMPLETE, XP_TASK_COMPLETE,
};
pub use error::{GrowthError, StoreError};
pub use store::{GrowthStore, MemoryStore};
pub use view::format_for_response;
