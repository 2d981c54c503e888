//! Enumeration types for the Calma growth engine.
//!
//! The trait catalog ([`TraitKey`]) and the closed set of semantic actions
//! ([`GrowthAction`]) that earn XP. These two enums are the single source of
//! truth for trait keys and action names; no call site hard-codes either
//! list.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::HabitId;

// ---------------------------------------------------------------------------
// Trait keys
// ---------------------------------------------------------------------------

/// One of the five tracked personal-growth dimensions.
///
/// Variants are declared in the lexical order of their serialized names, so
/// the derived [`Ord`] *is* the canonical key order used to normalize
/// archetype pairs and to break level ties deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum TraitKey {
    /// Capacity for sustained, undistracted focus.
    Attention,
    /// Self-knowledge built through reflection and mood tracking.
    Awareness,
    /// Reliability of small daily efforts.
    Consistency,
    /// Growth through deliberate study.
    Learning,
    /// Forward drive from finishing what was started.
    Momentum,
}

impl TraitKey {
    /// All five trait keys, in canonical (lexical) order.
    pub const ALL: [Self; 5] = [
        Self::Attention,
        Self::Awareness,
        Self::Consistency,
        Self::Learning,
        Self::Momentum,
    ];

    /// The lowercase key name used in serialized records and API payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attention => "attention",
            Self::Awareness => "awareness",
            Self::Consistency => "consistency",
            Self::Learning => "learning",
            Self::Momentum => "momentum",
        }
    }

    /// The human-readable display label shown in level-up messages and UI.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attention => "Attention",
            Self::Awareness => "Awareness",
            Self::Consistency => "Consistency",
            Self::Learning => "Learning",
            Self::Momentum => "Momentum",
        }
    }
}

impl core::fmt::Display for TraitKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Growth actions
// ---------------------------------------------------------------------------

/// A semantic user action that earns XP in one or more traits.
///
/// Route handlers construct these from their own domain events (a task was
/// completed, a focus timer finished, ...) and hand them to the action
/// processor. The wire names match the action strings used by the HTTP
/// collaborators; see [`GrowthAction::from_parts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GrowthAction {
    /// A regular task was completed.
    TaskComplete,
    /// A small (low-effort) task was completed.
    SmallTaskComplete,
    /// An overdue task was finally completed.
    OverdueTaskComplete,
    /// A focus-timer session ran to completion.
    FocusSessionComplete,
    /// A journal entry was written.
    JournalEntry,
    /// A mood check-in was recorded.
    MoodCheckin,
    /// A task tagged as learning was completed.
    LearningTaskComplete,
    /// A habit was completed on each of the last 7 calendar days.
    HabitStreak {
        /// The habit whose completion history is checked.
        habit_id: HabitId,
    },
}

impl GrowthAction {
    /// Resolve a wire-format action string (plus optional habit metadata)
    /// into a typed action.
    ///
    /// Returns `None` for unrecognized action strings, and for
    /// `HABIT_7_DAY_STREAK` without a habit id. Both cases are defined
    /// no-ops at the engine level, not errors.
    pub fn from_parts(action_type: &str, habit_id: Option<HabitId>) -> Option<Self> {
        match action_type {
            "TASK_COMPLETE" => Some(Self::TaskComplete),
            "SMALL_TASK_COMPLETE" => Some(Self::SmallTaskComplete),
            "OVERDUE_TASK_COMPLETE" => Some(Self::OverdueTaskComplete),
            "FOCUS_SESSION_COMPLETE" => Some(Self::FocusSessionComplete),
            "JOURNAL_ENTRY" => Some(Self::JournalEntry),
            "MOOD_CHECKIN" => Some(Self::MoodCheckin),
            "LEARNING_TASK_COMPLETE" => Some(Self::LearningTaskComplete),
            "HABIT_7_DAY_STREAK" => habit_id.map(|habit_id| Self::HabitStreak { habit_id }),
            _ => None,
        }
    }

    /// The wire-format action string for this action.
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::TaskComplete => "TASK_COMPLETE",
            Self::SmallTaskComplete => "SMALL_TASK_COMPLETE",
            Self::OverdueTaskComplete => "OVERDUE_TASK_COMPLETE",
            Self::FocusSessionComplete => "FOCUS_SESSION_COMPLETE",
            Self::JournalEntry => "JOURNAL_ENTRY",
            Self::MoodCheckin => "MOOD_CHECKIN",
            Self::LearningTaskComplete => "LEARNING_TASK_COMPLETE",
            Self::HabitStreak { .. } => "HABIT_7_DAY_STREAK",
        }
    }
}
