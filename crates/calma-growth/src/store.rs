//! Storage contract for the growth engine, plus the in-memory backend.
//!
//! The engine performs a read-modify-write cycle per action against three
//! per-user data sets: the growth record itself, date-stamped focus-session
//! occurrences, and habit-completion days. [`GrowthStore`] expresses exactly
//! that surface; the concrete document database behind it is a collaborator
//! concern.
//!
//! [`MemoryStore`] is the in-process backend used by tests and local
//! development. The `PostgreSQL` backend lives in the `calma-db` crate.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tokio::sync::RwLock;

use calma_types::{GrowthRecord, HabitId, UserId};

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Persistence operations the growth engine depends on.
///
/// The engine is generic over this trait rather than boxing it, so `async
/// fn` methods are fine here (no dynamic dispatch, no auto-trait leakage to
/// worry about at call sites).
#[allow(async_fn_in_trait)]
pub trait GrowthStore {
    /// Look up the growth record for a user, if one exists.
    async fn find_growth(&self, user: UserId) -> Result<Option<GrowthRecord>, StoreError>;

    /// Insert a freshly created growth record.
    async fn insert_growth(&self, record: &GrowthRecord) -> Result<(), StoreError>;

    /// Persist the current state of an existing growth record.
    async fn save_growth(&self, record: &GrowthRecord) -> Result<(), StoreError>;

    /// Record one completed focus session for the user on the given date.
    async fn record_focus_session(&self, user: UserId, date: NaiveDate) -> Result<(), StoreError>;

    /// Count the focus sessions recorded for the user on the given date.
    async fn count_focus_sessions(&self, user: UserId, date: NaiveDate) -> Result<u32, StoreError>;

    /// Count how many of the given days have at least one completion of the
    /// habit by the user. Multiple completions on one day count once.
    async fn count_habit_days(
        &self,
        habit: HabitId,
        user: UserId,
        days: &[NaiveDate],
    ) -> Result<u32, StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Mutable state behind the [`MemoryStore`] lock.
#[derive(Debug, Default)]
struct Inner {
    growth: BTreeMap<UserId, GrowthRecord>,
    /// Focus-session counts keyed by user and date.
    focus: BTreeMap<(UserId, NaiveDate), u32>,
    /// Days on which a habit was completed, keyed by habit and user.
    habits: BTreeMap<(HabitId, UserId), BTreeSet<NaiveDate>>,
}

/// In-process [`GrowthStore`] backend over tokio-guarded maps.
///
/// Used by the engine's test suites and for running locally without a
/// database. Not durable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a habit completion for a given day.
    ///
    /// Habit completions are written by the habit-tracking collaborator, not
    /// by the engine, so this is an inherent method rather than part of
    /// [`GrowthStore`]. Tests use it to arrange streak scenarios.
    pub async fn add_habit_completion(&self, habit: HabitId, user: UserId, date: NaiveDate) {
        let mut inner = self.inner.write().await;
        inner.habits.entry((habit, user)).or_default().insert(date);
    }
}

impl GrowthStore for MemoryStore {
    async fn find_growth(&self, user: UserId) -> Result<Option<GrowthRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.growth.get(&user).cloned())
    }

    async fn insert_growth(&self, record: &GrowthRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.growth.contains_key(&record.user_id) {
            return Err(StoreError::Backend(format!(
                "duplicate growth record for user {}",
                record.user_id
            )));
        }
        inner.growth.insert(record.user_id, record.clone());
        Ok(())
    }

    async fn save_growth(&self, record: &GrowthRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.growth.insert(record.user_id, record.clone());
        Ok(())
    }

    async fn record_focus_session(&self, user: UserId, date: NaiveDate) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let count = inner.focus.entry((user, date)).or_insert(0);
        *count = count.saturating_add(1);
        Ok(())
    }

    async fn count_focus_sessions(&self, user: UserId, date: NaiveDate) -> Result<u32, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.focus.get(&(user, date)).copied().unwrap_or(0))
    }

    async fn count_habit_days(
        &self,
        habit: HabitId,
        user: UserId,
        days: &[NaiveDate],
    ) -> Result<u32, StoreError> {
        let inner = self.inner.read().await;
        let completed = inner
            .habits
            .get(&(habit, user))
            .map_or(0, |dates| days.iter().filter(|day| dates.contains(*day)).count());
        Ok(u32::try_from(completed).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1)
            .and_then(|base| base.checked_add_days(Days::new(offset)))
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn focus_sessions_count_per_day() {
        let store = MemoryStore::new();
        let user = UserId::new();

        store.record_focus_session(user, day(0)).await.ok();
        store.record_focus_session(user, day(0)).await.ok();
        store.record_focus_session(user, day(1)).await.ok();

        assert_eq!(store.count_focus_sessions(user, day(0)).await.ok(), Some(2));
        assert_eq!(store.count_focus_sessions(user, day(1)).await.ok(), Some(1));
        assert_eq!(store.count_focus_sessions(user, day(2)).await.ok(), Some(0));
    }

    #[tokio::test]
    async fn habit_days_count_distinct_days_only() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let habit = HabitId::new();

        // Two completions on the same day still count as one day.
        store.add_habit_completion(habit, user, day(0)).await;
        store.add_habit_completion(habit, user, day(0)).await;
        store.add_habit_completion(habit, user, day(1)).await;

        let window = [day(0), day(1), day(2)];
        assert_eq!(store.count_habit_days(habit, user, &window).await.ok(), Some(2));
    }

    #[tokio::test]
    async fn habit_days_are_scoped_to_habit_and_user() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let other_user = UserId::new();
        let habit = HabitId::new();
        let other_habit = HabitId::new();

        store.add_habit_completion(habit, user, day(0)).await;

        let window = [day(0)];
        assert_eq!(store.count_habit_days(habit, other_user, &window).await.ok(), Some(0));
        assert_eq!(store.count_habit_days(other_habit, user, &window).await.ok(), Some(0));
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_user() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let record = crate::engine::new_record(user, chrono::Utc::now());

        assert!(store.insert_growth(&record).await.is_ok());
        assert!(store.insert_growth(&record).await.is_err());
    }
}
