//! Shared type definitions for the Calma growth engine.
//!
//! This crate is the single source of truth for all types used across the
//! Calma workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the React client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for user and habit identifiers
//! - [`enums`] -- The trait catalog keys and the closed set of growth actions
//! - [`structs`] -- The persisted growth record and its presentation view

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{GrowthAction, TraitKey};
pub use ids::{HabitId, UserId};
pub use structs::{GrowthEvent, GrowthRecord, GrowthView, TraitProgress, TraitState};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::UserId::export_all();
        let _ = crate::ids::HabitId::export_all();

        // Enums
        let _ = crate::enums::TraitKey::export_all();
        let _ = crate::enums::GrowthAction::export_all();

        // Structs
        let _ = crate::structs::TraitState::export_all();
        let _ = crate::structs::GrowthEvent::export_all();
        let _ = crate::structs::GrowthRecord::export_all();
        let _ = crate::structs::TraitProgress::export_all();
        let _ = crate::structs::GrowthView::export_all();
    }
}
