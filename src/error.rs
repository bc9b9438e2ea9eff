//! Unified error handling for gnubot.
//!
//! Layer-specific errors live next to their code (`StoreError`,
//! `MarkerError`, `ConfigError`, `RuleError`, `ClientError`). This module
//! holds the error a callback may return, with a static code for log
//! labeling.

use crate::marker::MarkerError;
use crate::store::StoreError;
use thiserror::Error;

// ============================================================================
// Callback Errors (reply processing)
// ============================================================================

/// Errors that can occur while a callback runs.
///
/// A failing callback never aborts dispatch; the engine logs the error and
/// moves on to the next callback.
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("marker error: {0}")]
    Marker(#[from] MarkerError),

    #[error("no pattern matched")]
    NoMatch,

    #[error("internal error: {0}")]
    Internal(String),
}

impl CallbackError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Store(_) => "store_error",
            Self::Marker(_) => "marker_error",
            Self::NoMatch => "no_match",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for callbacks.
pub type CallbackResult<T = ()> = Result<T, CallbackError>;
