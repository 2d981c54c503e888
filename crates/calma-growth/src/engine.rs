//! Action processor: converts semantic user actions into trait XP,
//! level-ups, and derived-field updates.
//!
//! Each [`GrowthEngine::apply_action`] call is one read-modify-write cycle:
//! load (or lazily create) the user's growth record, apply the XP grants for
//! the action, re-derive `total_level` / `total_xp` / `title` / `archetype`
//! wholesale from the trait set, and persist once. The cycle is serialized
//! per user with a keyed async mutex so two concurrent same-user actions
//! cannot lose an update; cross-user calls never contend.
//!
//! # Level-Up Mechanics
//!
//! XP carries over across thresholds: a single large award can cross several
//! levels in one call (the while loop below), and the trait is still
//! reported as leveled-up once. On reaching [`MAX_TRAIT_LEVEL`] the in-level
//! XP is zeroed and further awards to that trait are discarded.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use tokio::sync::Mutex;

use calma_types::{GrowthAction, GrowthEvent, GrowthRecord, HabitId, TraitKey, TraitState, UserId};

use crate::archetype::archetype_for;
use crate::catalog::{self, MAX_TRAIT_LEVEL};
use crate::error::GrowthError;
use crate::store::GrowthStore;

// ---------------------------------------------------------------------------
// XP Award Constants
// ---------------------------------------------------------------------------

/// XP awarded to momentum for completing a task.
pub const XP_TASK_COMPLETE: u32 = 5;

/// XP awarded to consistency for completing a small task.
pub const XP_SMALL_TASK_COMPLETE: u32 = 3;

/// XP awarded to momentum for completing an overdue task.
pub const XP_OVERDUE_TASK_COMPLETE: u32 = 8;

/// XP awarded to attention for every completed focus session.
pub const XP_FOCUS_ATTENTION: u32 = 10;

/// XP awarded to consistency for the first and second focus sessions of a day.
pub const XP_FOCUS_CONSISTENCY_BASE: u32 = 3;

/// XP awarded to consistency from the third focus session of a day onward.
pub const XP_FOCUS_CONSISTENCY_BONUS: u32 = 8;

/// XP awarded to awareness for writing a journal entry.
pub const XP_JOURNAL_ENTRY: u32 = 6;

/// XP awarded to awareness for a mood check-in.
pub const XP_MOOD_CHECKIN: u32 = 3;

/// XP awarded to learning for completing a learning task.
pub const XP_LEARNING_TASK_COMPLETE: u32 = 8;

/// XP awarded to consistency for a verified 7-day habit streak.
pub const XP_HABIT_STREAK: u32 = 15;

/// Daily focus-session count (including the one being recorded) at which
/// the consistency bonus kicks in.
pub const FOCUS_BONUS_SESSION_COUNT: u32 = 3;

/// Trailing window, in calendar days ending today inclusive, checked by the
/// habit streak action.
pub const STREAK_WINDOW_DAYS: u32 = 7;

/// Maximum number of entries retained in the recent-growth feed.
pub const MAX_RECENT_GROWTH: usize = 5;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of applying one growth action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// The growth record after the action (unchanged for no-op actions).
    pub record: GrowthRecord,
    /// Traits that leveled up during this call, de-duplicated. At most one
    /// entry per trait no matter how many levels were gained.
    pub leveled_up: Vec<TraitKey>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The growth engine, generic over its storage backend.
///
/// Cheap to share behind an [`Arc`]; all methods take `&self`.
#[derive(Debug)]
pub struct GrowthEngine<S> {
    store: S,
    /// Per-user serialization locks. Entries are tiny and the table grows
    /// only with the set of users seen by this process.
    user_locks: Mutex<BTreeMap<UserId, Arc<Mutex<()>>>>,
}

impl<S: GrowthStore> GrowthEngine<S> {
    /// Create an engine over the given storage backend.
    pub const fn new(store: S) -> Self {
        Self {
            store,
            user_locks: Mutex::const_new(BTreeMap::new()),
        }
    }

    /// Borrow the underlying storage backend.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Fetch the user's growth record, creating a fresh one if none exists.
    /// Idempotent.
    pub async fn get_or_create(&self, user: UserId) -> Result<GrowthRecord, GrowthError> {
        let lock = self.user_lock(user).await;
        let _guard = lock.lock().await;
        self.load_or_init(user, Utc::now()).await
    }

    /// Apply a wire-format action string with optional habit metadata.
    ///
    /// Unrecognized action strings, and `HABIT_7_DAY_STREAK` without a habit
    /// id, are silent no-ops: the current record is returned unchanged with
    /// an empty level-up list. This is the entry point route handlers use.
    pub async fn apply_raw(
        &self,
        user: UserId,
        action_type: &str,
        habit_id: Option<HabitId>,
    ) -> Result<ActionOutcome, GrowthError> {
        match GrowthAction::from_parts(action_type, habit_id) {
            Some(action) => self.apply_action(user, &action).await,
            None => {
                tracing::debug!(%user, action = action_type, "unrecognized growth action, no-op");
                let record = self.get_or_create(user).await?;
                Ok(ActionOutcome {
                    record,
                    leveled_up: Vec::new(),
                })
            }
        }
    }

    /// Apply a typed growth action for a user.
    ///
    /// Returns the updated record and the set of traits that leveled up in
    /// this call. An incomplete habit streak is a silent no-op.
    pub async fn apply_action(
        &self,
        user: UserId,
        action: &GrowthAction,
    ) -> Result<ActionOutcome, GrowthError> {
        let lock = self.user_lock(user).await;
        let _guard = lock.lock().await;

        let now = Utc::now();
        let mut record = self.load_or_init(user, now).await?;

        let grants: Vec<(TraitKey, u32)> = match action {
            GrowthAction::TaskComplete => vec![(TraitKey::Momentum, XP_TASK_COMPLETE)],
            GrowthAction::SmallTaskComplete => {
                vec![(TraitKey::Consistency, XP_SMALL_TASK_COMPLETE)]
            }
            GrowthAction::OverdueTaskComplete => {
                vec![(TraitKey::Momentum, XP_OVERDUE_TASK_COMPLETE)]
            }
            GrowthAction::FocusSessionComplete => {
                let today = now.date_naive();
                self.store.record_focus_session(user, today).await?;
                let today_count = self.store.count_focus_sessions(user, today).await?;
                let consistency = if today_count >= FOCUS_BONUS_SESSION_COUNT {
                    XP_FOCUS_CONSISTENCY_BONUS
                } else {
                    XP_FOCUS_CONSISTENCY_BASE
                };
                vec![
                    (TraitKey::Attention, XP_FOCUS_ATTENTION),
                    (TraitKey::Consistency, consistency),
                ]
            }
            GrowthAction::JournalEntry => vec![(TraitKey::Awareness, XP_JOURNAL_ENTRY)],
            GrowthAction::MoodCheckin => vec![(TraitKey::Awareness, XP_MOOD_CHECKIN)],
            GrowthAction::LearningTaskComplete => {
                vec![(TraitKey::Learning, XP_LEARNING_TASK_COMPLETE)]
            }
            GrowthAction::HabitStreak { habit_id } => {
                let window = streak_window(now.date_naive());
                let completed = self.store.count_habit_days(*habit_id, user, &window).await?;
                if completed < STREAK_WINDOW_DAYS {
                    tracing::debug!(
                        %user,
                        habit = %habit_id,
                        completed,
                        "streak incomplete, no-op"
                    );
                    return Ok(ActionOutcome {
                        record,
                        leveled_up: Vec::new(),
                    });
                }
                vec![(TraitKey::Consistency, XP_HABIT_STREAK)]
            }
        };

        let mut leveled_up: Vec<TraitKey> = Vec::new();
        for (key, amount) in grants {
            if apply_trait_xp(&mut record, key, amount, now)? && !leveled_up.contains(&key) {
                leveled_up.push(key);
            }
        }

        recompute_derived(&mut record)?;
        record.updated_at = now;
        self.store.save_growth(&record).await?;

        tracing::debug!(
            %user,
            action = action.wire_name(),
            level_ups = leveled_up.len(),
            total_level = record.total_level,
            "applied growth action"
        );
        Ok(ActionOutcome { record, leveled_up })
    }

    /// Return the serialization lock for a user, creating it on first use.
    async fn user_lock(&self, user: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        Arc::clone(locks.entry(user).or_default())
    }

    /// Load the record, or create and insert a fresh one. Caller must hold
    /// the user's serialization lock.
    async fn load_or_init(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<GrowthRecord, GrowthError> {
        if let Some(record) = self.store.find_growth(user).await? {
            return Ok(record);
        }
        let record = new_record(user, now);
        self.store.insert_growth(&record).await?;
        tracing::info!(%user, "created growth record");
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Record construction and mutation
// ---------------------------------------------------------------------------

/// Build a fresh growth record: all five traits at level 1 with no XP.
pub(crate) fn new_record(user_id: UserId, now: DateTime<Utc>) -> GrowthRecord {
    let mut traits = BTreeMap::new();
    for key in TraitKey::ALL {
        traits.insert(key, TraitState::new());
    }
    GrowthRecord {
        user_id,
        traits,
        total_level: 1,
        total_xp: 0,
        title: String::from(catalog::DEFAULT_TITLE),
        archetype: String::new(),
        recent_growth: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Add XP to one trait, applying carry-over level-ups and the level cap.
///
/// Returns whether the trait leveled up. On a level-up a recent-growth
/// entry is prepended and the feed truncated to [`MAX_RECENT_GROWTH`].
fn apply_trait_xp(
    record: &mut GrowthRecord,
    key: TraitKey,
    amount: u32,
    now: DateTime<Utc>,
) -> Result<bool, GrowthError> {
    let state = record.trait_state(key);
    let prev_level = state.level;

    let mut level = state.level;
    let mut xp = state.xp.checked_add(amount).ok_or_else(|| {
        GrowthError::ArithmeticOverflow {
            context: format!("xp gain overflow for trait {key}"),
        }
    })?;

    while level < MAX_TRAIT_LEVEL {
        let Some(required) = catalog::required_xp(level) else {
            break;
        };
        if xp < required {
            break;
        }
        xp = xp.checked_sub(required).ok_or_else(|| {
            GrowthError::ArithmeticOverflow {
                context: format!("xp carry-over underflow for trait {key}"),
            }
        })?;
        level = level.checked_add(1).ok_or_else(|| {
            GrowthError::ArithmeticOverflow {
                context: format!("level increment overflow for trait {key}"),
            }
        })?;
    }

    // At the cap the threshold is unreachable; in-level XP is discarded.
    if level >= MAX_TRAIT_LEVEL {
        xp = 0;
    }

    record.traits.insert(key, TraitState { level, xp });

    let leveled_up = level > prev_level;
    if leveled_up {
        record.recent_growth.insert(
            0,
            GrowthEvent {
                trait_key: key,
                message: format!("{} strengthened.", key.label()),
                at: now,
            },
        );
        record.recent_growth.truncate(MAX_RECENT_GROWTH);
        tracing::info!(trait_key = %key, from = prev_level, to = level, "trait leveled up");
    }
    Ok(leveled_up)
}

/// Recompute every derived field wholesale from the trait set.
fn recompute_derived(record: &mut GrowthRecord) -> Result<(), GrowthError> {
    let trait_count = u32::try_from(TraitKey::ALL.len()).unwrap_or(1);

    let mut level_sum: u32 = 0;
    let mut xp_sum: u32 = 0;
    for key in TraitKey::ALL {
        let state = record.trait_state(key);
        level_sum = level_sum.checked_add(state.level).ok_or_else(|| {
            GrowthError::ArithmeticOverflow {
                context: String::from("trait level sum overflow"),
            }
        })?;
        xp_sum = xp_sum.checked_add(state.xp).ok_or_else(|| {
            GrowthError::ArithmeticOverflow {
                context: String::from("trait xp sum overflow"),
            }
        })?;
    }

    record.total_level = level_sum.checked_div(trait_count).unwrap_or(0);
    record.total_xp = xp_sum;
    record.title = String::from(catalog::title_for(record.total_level));
    record.archetype = String::from(archetype_for(&record.traits));
    Ok(())
}

/// The calendar days checked by the streak action: today and the six days
/// before it.
fn streak_window(today: NaiveDate) -> Vec<NaiveDate> {
    (0..u64::from(STREAK_WINDOW_DAYS))
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> GrowthRecord {
        new_record(UserId::new(), Utc::now())
    }

    fn set_trait(rec: &mut GrowthRecord, key: TraitKey, level: u32, xp: u32) {
        rec.traits.insert(key, TraitState { level, xp });
    }

    // -----------------------------------------------------------------------
    // apply_trait_xp: thresholds and carry-over
    // -----------------------------------------------------------------------

    #[test]
    fn xp_below_threshold_accumulates() {
        let mut rec = record();
        let leveled = apply_trait_xp(&mut rec, TraitKey::Momentum, 139, Utc::now());
        assert_eq!(leveled.ok(), Some(false));
        assert_eq!(rec.trait_state(TraitKey::Momentum), TraitState { level: 1, xp: 139 });
    }

    #[test]
    fn level_up_at_exact_threshold_with_zero_remainder() {
        let mut rec = record();
        // required_xp(1) = 140
        let leveled = apply_trait_xp(&mut rec, TraitKey::Momentum, 140, Utc::now());
        assert_eq!(leveled.ok(), Some(true));
        assert_eq!(rec.trait_state(TraitKey::Momentum), TraitState { level: 2, xp: 0 });
    }

    #[test]
    fn level_up_carries_remainder_over() {
        let mut rec = record();
        set_trait(&mut rec, TraitKey::Learning, 1, 100);
        let leveled = apply_trait_xp(&mut rec, TraitKey::Learning, 60, Utc::now());
        assert_eq!(leveled.ok(), Some(true));
        // 100 + 60 - 140 = 20
        assert_eq!(rec.trait_state(TraitKey::Learning), TraitState { level: 2, xp: 20 });
    }

    #[test]
    fn large_award_jumps_multiple_levels() {
        let mut rec = record();
        // 400 XP from level 1: 400 - 140 (L1) = 260, 260 - 213 (L2) = 47.
        let leveled = apply_trait_xp(&mut rec, TraitKey::Attention, 400, Utc::now());
        assert_eq!(leveled.ok(), Some(true));
        assert_eq!(rec.trait_state(TraitKey::Attention), TraitState { level: 3, xp: 47 });
        // One feed entry, not one per level gained.
        assert_eq!(rec.recent_growth.len(), 1);
    }

    #[test]
    fn capped_trait_discards_xp() {
        let mut rec = record();
        set_trait(&mut rec, TraitKey::Awareness, MAX_TRAIT_LEVEL, 0);
        let leveled = apply_trait_xp(&mut rec, TraitKey::Awareness, 10_000, Utc::now());
        assert_eq!(leveled.ok(), Some(false));
        assert_eq!(
            rec.trait_state(TraitKey::Awareness),
            TraitState { level: MAX_TRAIT_LEVEL, xp: 0 }
        );
        assert!(rec.recent_growth.is_empty());
    }

    #[test]
    fn reaching_cap_zeroes_remainder() {
        let mut rec = record();
        set_trait(&mut rec, TraitKey::Awareness, 49, 0);
        // required_xp(49) = 13820; anything beyond is discarded at the cap.
        let leveled = apply_trait_xp(&mut rec, TraitKey::Awareness, 20_000, Utc::now());
        assert_eq!(leveled.ok(), Some(true));
        assert_eq!(
            rec.trait_state(TraitKey::Awareness),
            TraitState { level: MAX_TRAIT_LEVEL, xp: 0 }
        );
    }

    #[test]
    fn level_never_decreases_across_awards() {
        let mut rec = record();
        let mut last_level = 1;
        for _ in 0..200 {
            let _ = apply_trait_xp(&mut rec, TraitKey::Consistency, 37, Utc::now());
            let level = rec.trait_state(TraitKey::Consistency).level;
            assert!(level >= last_level);
            last_level = level;
        }
    }

    #[test]
    fn in_level_xp_stays_below_threshold() {
        let mut rec = record();
        for _ in 0..500 {
            let _ = apply_trait_xp(&mut rec, TraitKey::Momentum, 53, Utc::now());
            let state = rec.trait_state(TraitKey::Momentum);
            if let Some(required) = catalog::required_xp(state.level) {
                assert!(state.xp < required, "xp {} >= required {required}", state.xp);
            } else {
                assert_eq!(state.xp, 0);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Recent-growth feed
    // -----------------------------------------------------------------------

    #[test]
    fn recent_growth_keeps_five_newest_first() {
        let mut rec = record();
        let keys = [
            TraitKey::Attention,
            TraitKey::Awareness,
            TraitKey::Consistency,
            TraitKey::Learning,
            TraitKey::Momentum,
            TraitKey::Attention,
        ];
        // Six level-up events: each 140 XP award levels a fresh trait once;
        // the sixth levels attention a second time.
        for key in keys {
            let amount = if rec.trait_state(key).level > 1 { 213 } else { 140 };
            let _ = apply_trait_xp(&mut rec, key, amount, Utc::now());
        }

        assert_eq!(rec.recent_growth.len(), MAX_RECENT_GROWTH);
        // Newest first: the second attention level-up leads the feed, and the
        // oldest event (the first attention level-up) was evicted.
        let feed: Vec<TraitKey> = rec.recent_growth.iter().map(|e| e.trait_key).collect();
        assert_eq!(
            feed,
            vec![
                TraitKey::Attention,
                TraitKey::Momentum,
                TraitKey::Learning,
                TraitKey::Consistency,
                TraitKey::Awareness,
            ]
        );
    }

    #[test]
    fn level_up_message_uses_display_label() {
        let mut rec = record();
        let _ = apply_trait_xp(&mut rec, TraitKey::Momentum, 140, Utc::now());
        assert_eq!(
            rec.recent_growth.first().map(|e| e.message.as_str()),
            Some("Momentum strengthened.")
        );
    }

    // -----------------------------------------------------------------------
    // Derived fields
    // -----------------------------------------------------------------------

    #[test]
    fn total_level_is_floor_of_average() {
        let mut rec = record();
        set_trait(&mut rec, TraitKey::Consistency, 10, 0);
        set_trait(&mut rec, TraitKey::Momentum, 8, 0);
        // Levels: 10 + 8 + 1 + 1 + 1 = 21, floor(21 / 5) = 4.
        assert!(recompute_derived(&mut rec).is_ok());
        assert_eq!(rec.total_level, 4);
    }

    #[test]
    fn derived_fields_recompute_from_traits() {
        let mut rec = record();
        set_trait(&mut rec, TraitKey::Consistency, 10, 25);
        set_trait(&mut rec, TraitKey::Momentum, 8, 7);
        assert!(recompute_derived(&mut rec).is_ok());
        assert_eq!(rec.total_xp, 32);
        assert_eq!(rec.title, "The Beginner");
        assert_eq!(rec.archetype, "The Architect");
    }

    #[test]
    fn title_tracks_total_level_thresholds() {
        let mut rec = record();
        for key in TraitKey::ALL {
            set_trait(&mut rec, key, 22, 0);
        }
        assert!(recompute_derived(&mut rec).is_ok());
        assert_eq!(rec.total_level, 22);
        assert_eq!(rec.title, "Deep Worker");
    }

    // -----------------------------------------------------------------------
    // Streak window
    // -----------------------------------------------------------------------

    #[test]
    fn streak_window_is_seven_trailing_days() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap_or_default();
        let window = streak_window(today);
        assert_eq!(window.len(), 7);
        assert_eq!(window.first().copied(), Some(today));
        assert_eq!(
            window.last().copied(),
            NaiveDate::from_ymd_opt(2026, 8, 20)
        );
    }

    #[test]
    fn streak_window_crosses_month_boundary() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap_or_default();
        let window = streak_window(today);
        assert_eq!(window.len(), 7);
        assert_eq!(
            window.last().copied(),
            NaiveDate::from_ymd_opt(2026, 2, 24)
        );
    }
}
