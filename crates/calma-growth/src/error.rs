//! Error types for the growth engine.
//!
//! All operations that can fail return typed errors rather than panicking.
//! Storage failures surface as [`StoreError`] and propagate through the
//! engine as [`GrowthError::Store`]; the engine never retries them. Silent
//! no-ops (unrecognized actions, incomplete streaks) are *not* errors and
//! never appear here.

/// Errors raised by a [`GrowthStore`](crate::store::GrowthStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage backend failed (connection loss, query failure, ...).
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// A record could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Wrap a backend-specific error into an opaque [`StoreError::Backend`].
    ///
    /// Backend crates cannot implement `From` for their error types here
    /// (orphan rule), so they funnel through this constructor instead.
    pub fn backend(err: impl core::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Errors that can occur while processing a growth action.
#[derive(Debug, thiserror::Error)]
pub enum GrowthError {
    /// The storage round-trip failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An arithmetic overflow occurred in the leveling math.
    #[error("arithmetic overflow in growth computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
