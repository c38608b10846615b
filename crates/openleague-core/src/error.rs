// ── Core error types ──
//
// Typed failures for validation, redemption, and authorization.
// Transport layers map these onto status codes; nothing here knows
// about HTTP or the CLI.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Coupon eligibility ───────────────────────────────────────────
    #[error("Coupon not found: {code}")]
    NotFound { code: String },

    #[error("Coupon {code} expired at {expired_at}")]
    Expired {
        code: String,
        expired_at: DateTime<Utc>,
    },

    #[error("Coupon {code} is exhausted (all {max_uses} uses consumed)")]
    Exhausted { code: String, max_uses: u32 },

    #[error("Amount {amount} exceeds the per-use cap of {cap} for coupon {code}")]
    AmountExceeded { code: String, amount: u64, cap: u64 },

    // ── Access control ───────────────────────────────────────────────
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    // ── Creation ─────────────────────────────────────────────────────
    #[error("Coupon code already exists: {code}")]
    DuplicateCode { code: String },

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Storage ──────────────────────────────────────────────────────
    /// The coupon row changed between read and commit. Safe to retry.
    #[error("Concurrent update on coupon {code}; retry the redemption")]
    StorageConflict { code: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl CoreError {
    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageConflict { .. })
    }

    /// HTTP status a web layer should answer with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Forbidden { .. } => 403,
            Self::Expired { .. }
            | Self::Exhausted { .. }
            | Self::DuplicateCode { .. }
            | Self::StorageConflict { .. } => 409,
            Self::AmountExceeded { .. } | Self::Validation { .. } => 400,
            Self::Storage { .. } => 500,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage {
            message: format!("snapshot decode failed: {err}"),
        }
    }
}
