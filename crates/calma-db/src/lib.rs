//! `PostgreSQL` data layer for the Calma growth engine.
//!
//! Implements the [`calma_growth::GrowthStore`] contract over three tables:
//! `growth_records` (one JSONB-backed document row per user),
//! `focus_sessions`, and `habit_completions`. The engine stays generic over
//! its store; this crate is only wired in at the application boundary.
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool and configuration
//! - [`growth_store`] -- The [`PostgresStore`] backend
//! - [`error`] -- Shared error types

pub mod error;
pub mod growth_store;
pub mod postgres;

// Re-export primary types for convenience.
pub use error::DbError;
pub use growth_store::PostgresStore;
pub use postgres::{PostgresConfig, PostgresPool};
