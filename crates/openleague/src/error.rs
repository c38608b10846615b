//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use openleague_config::ConfigError;
use openleague_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const FORBIDDEN: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const REJECTED: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Coupons ──────────────────────────────────────────────────────

    #[error("Coupon '{code}' not found")]
    #[diagnostic(
        code(openleague::not_found),
        help("Run: openleague coupons list to see available coupons")
    )]
    NotFound { code: String },

    #[error("Coupon '{code}' expired at {expired_at}")]
    #[diagnostic(code(openleague::expired))]
    Expired { code: String, expired_at: String },

    #[error("Coupon '{code}' is exhausted ({max_uses} uses consumed)")]
    #[diagnostic(code(openleague::exhausted))]
    Exhausted { code: String, max_uses: u32 },

    #[error("Amount {amount} exceeds the per-use cap of {cap} for coupon '{code}'")]
    #[diagnostic(
        code(openleague::amount_exceeded),
        help("Redeem with --amount {cap} or less.")
    )]
    AmountExceeded { code: String, amount: u64, cap: u64 },

    #[error("Coupon '{code}' already exists")]
    #[diagnostic(
        code(openleague::duplicate),
        help("Choose another --code, or omit it to generate one.")
    )]
    Duplicate { code: String },

    #[error("Coupon '{code}' was updated concurrently")]
    #[diagnostic(
        code(openleague::conflict),
        help("Another redemption won the race. Run the command again.")
    )]
    Conflict { code: String },

    // ── Access ───────────────────────────────────────────────────────

    #[error("Forbidden: {reason}")]
    #[diagnostic(
        code(openleague::forbidden),
        help("Act as a principal with access: --as <ID> --role admin, or --super-admin.")
    )]
    Forbidden { reason: String },

    #[error("No acting principal for '{action}'")]
    #[diagnostic(
        code(openleague::no_principal),
        help("Pass --as <ID> (or set OPENLEAGUE_AS) together with --role.")
    )]
    NoPrincipal { action: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(openleague::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(openleague::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Storage ──────────────────────────────────────────────────────

    #[error("Coupon store error: {message}")]
    #[diagnostic(
        code(openleague::storage),
        help("Check the store file passed with --data-file or set in the config.")
    )]
    Storage { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(openleague::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(openleague::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(openleague::json), help("Check the JSON payload and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(openleague::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML serialization failed: {0}")]
    #[diagnostic(code(openleague::toml))]
    Toml(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Forbidden { .. } | Self::NoPrincipal { .. } => exit_code::FORBIDDEN,
            Self::Duplicate { .. } | Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Expired { .. } | Self::Exhausted { .. } | Self::AmountExceeded { .. } => {
                exit_code::REJECTED
            }
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { code } => CliError::NotFound { code },
            CoreError::Expired { code, expired_at } => CliError::Expired {
                code,
                expired_at: expired_at.to_rfc3339(),
            },
            CoreError::Exhausted { code, max_uses } => CliError::Exhausted { code, max_uses },
            CoreError::AmountExceeded { code, amount, cap } => {
                CliError::AmountExceeded { code, amount, cap }
            }
            CoreError::Forbidden { reason } => CliError::Forbidden { reason },
            CoreError::DuplicateCode { code } => CliError::Duplicate { code },
            CoreError::Validation { field, reason } => CliError::Validation { field, reason },
            CoreError::StorageConflict { code } => CliError::Conflict { code },
            CoreError::Storage { message } => CliError::Storage { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(err) => CliError::Config(err),
            ConfigError::Io(err) => CliError::Io(err),
            ConfigError::Serialization(err) => CliError::Toml(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_kind() {
        let err = CliError::from(CoreError::Exhausted {
            code: "GAS-1".into(),
            max_uses: 2,
        });
        assert_eq!(err.exit_code(), exit_code::REJECTED);

        let err = CliError::from(CoreError::Forbidden {
            reason: "nope".into(),
        });
        assert_eq!(err.exit_code(), exit_code::FORBIDDEN);

        let err = CliError::from(CoreError::NotFound { code: "X".into() });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "Coupon 'X' not found");
    }

    #[test]
    fn storage_conflict_maps_to_conflict() {
        let err = CliError::from(CoreError::StorageConflict { code: "A".into() });
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
    }
}
