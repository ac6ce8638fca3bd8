//! Error types for the plancraft domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! The constraint transforms themselves never fail (malformed input degrades
//! to empty/default shapes), so these errors only surface from I/O paths.

use thiserror::Error;

/// The top-level error type for all plancraft operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Snapshot store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupted snapshot at {path}: {reason}")]
    Corrupted { path: String, reason: String },
}
