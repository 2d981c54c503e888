//! `PostgreSQL` implementation of the growth engine's storage contract.
//!
//! Growth records are stored one row per user with the trait map and the
//! recent-growth feed as JSONB documents; focus sessions and habit
//! completions are plain date-stamped rows. The streak check counts
//! *distinct* completion days, so duplicate completions on one day cannot
//! fake a streak.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use calma_growth::error::StoreError;
use calma_growth::store::GrowthStore;
use calma_types::{GrowthEvent, GrowthRecord, HabitId, TraitKey, TraitState, UserId};

use crate::error::DbError;
use crate::postgres::PostgresPool;

/// [`GrowthStore`] backend over the `growth_records`, `focus_sessions`, and
/// `habit_completions` tables.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing connection pool handle.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }

    /// Record a habit completion for a given day.
    ///
    /// Written by the habit-tracking collaborator, not by the engine; the
    /// engine only reads completion history for streak verification.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn add_habit_completion(
        &self,
        habit: HabitId,
        user: UserId,
        date: NaiveDate,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO habit_completions (id, habit_id, user_id, completed_on)
              VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::now_v7())
        .bind(habit.into_inner())
        .bind(user.into_inner())
        .bind(date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl GrowthStore for PostgresStore {
    async fn find_growth(&self, user: UserId) -> Result<Option<GrowthRecord>, StoreError> {
        let row = sqlx::query_as::<_, GrowthRow>(
            r"SELECT user_id, total_level, total_xp, title, archetype, traits, recent_growth, created_at, updated_at
              FROM growth_records
              WHERE user_id = $1",
        )
        .bind(user.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.map(GrowthRow::into_record).transpose()
    }

    async fn insert_growth(&self, record: &GrowthRecord) -> Result<(), StoreError> {
        let traits = serde_json::to_value(&record.traits)?;
        let recent_growth = serde_json::to_value(&record.recent_growth)?;

        sqlx::query(
            r"INSERT INTO growth_records
              (user_id, total_level, total_xp, title, archetype, traits, recent_growth, created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(record.user_id.into_inner())
        .bind(i32::try_from(record.total_level).unwrap_or(i32::MAX))
        .bind(i32::try_from(record.total_xp).unwrap_or(i32::MAX))
        .bind(&record.title)
        .bind(&record.archetype)
        .bind(&traits)
        .bind(&recent_growth)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        tracing::debug!(user = %record.user_id, "inserted growth record");
        Ok(())
    }

    async fn save_growth(&self, record: &GrowthRecord) -> Result<(), StoreError> {
        let traits = serde_json::to_value(&record.traits)?;
        let recent_growth = serde_json::to_value(&record.recent_growth)?;

        sqlx::query(
            r"INSERT INTO growth_records
              (user_id, total_level, total_xp, title, archetype, traits, recent_growth, created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
              ON CONFLICT (user_id) DO UPDATE SET
                total_level = EXCLUDED.total_level,
                total_xp = EXCLUDED.total_xp,
                title = EXCLUDED.title,
                archetype = EXCLUDED.archetype,
                traits = EXCLUDED.traits,
                recent_growth = EXCLUDED.recent_growth,
                updated_at = EXCLUDED.updated_at",
        )
        .bind(record.user_id.into_inner())
        .bind(i32::try_from(record.total_level).unwrap_or(i32::MAX))
        .bind(i32::try_from(record.total_xp).unwrap_or(i32::MAX))
        .bind(&record.title)
        .bind(&record.archetype)
        .bind(&traits)
        .bind(&recent_growth)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn record_focus_session(&self, user: UserId, date: NaiveDate) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO focus_sessions (id, user_id, session_date)
              VALUES ($1, $2, $3)",
        )
        .bind(Uuid::now_v7())
        .bind(user.into_inner())
        .bind(date)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn count_focus_sessions(&self, user: UserId, date: NaiveDate) -> Result<u32, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"SELECT COUNT(*) FROM focus_sessions
              WHERE user_id = $1 AND session_date = $2",
        )
        .bind(user.into_inner())
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn count_habit_days(
        &self,
        habit: HabitId,
        user: UserId,
        days: &[NaiveDate],
    ) -> Result<u32, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"SELECT COUNT(DISTINCT completed_on) FROM habit_completions
              WHERE habit_id = $1 AND user_id = $2 AND completed_on = ANY($3)",
        )
        .bind(habit.into_inner())
        .bind(user.into_inner())
        .bind(days.to_vec())
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

/// A row from the `growth_records` table.
#[derive(Debug, sqlx::FromRow)]
struct GrowthRow {
    user_id: Uuid,
    total_level: i32,
    total_xp: i32,
    title: String,
    archetype: String,
    traits: serde_json::Value,
    recent_growth: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GrowthRow {
    /// Rehydrate the domain record from a row.
    ///
    /// The integer columns carry `CHECK (>= 0)` constraints, so the
    /// sign-dropping conversions cannot lose information in practice.
    fn into_record(self) -> Result<GrowthRecord, StoreError> {
        let traits: BTreeMap<TraitKey, TraitState> = serde_json::from_value(self.traits)?;
        let recent_growth: Vec<GrowthEvent> = serde_json::from_value(self.recent_growth)?;

        Ok(GrowthRecord {
            user_id: UserId::from(self.user_id),
            traits,
            total_level: u32::try_from(self.total_level).unwrap_or_default(),
            total_xp: u32::try_from(self.total_xp).unwrap_or_default(),
            title: self.title,
            archetype: self.archetype,
            recent_growth,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
