//! Shared configuration for Open League tools.
//!
//! TOML file + environment overrides, and translation to
//! `openleague_core::RedemptionConfig`. The CLI adds flag-aware
//! wrappers on top.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use openleague_core::{CouponType, RedemptionConfig};

/// Upper bound on configured conflict retries.
const MAX_RETRIES_LIMIT: u32 = 100;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Coupon store snapshot file. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub redemption: RedemptionSettings,
}

impl Config {
    /// The configured data file, or the platform default.
    pub fn data_file(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(default_data_file)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// Redemption tuning as written in TOML.
#[derive(Debug, Deserialize, Serialize)]
pub struct RedemptionSettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Coupon types whose per-use amount cap is enforced (e.g. "GAS_SPONSORSHIP").
    #[serde(default = "default_amount_cap_types")]
    pub amount_cap_types: Vec<String>,
}

impl Default for RedemptionSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            amount_cap_types: default_amount_cap_types(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    10
}
fn default_amount_cap_types() -> Vec<String> {
    vec![CouponType::GasSponsorship.to_string()]
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "openleague", "openleague")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the coupon store snapshot.
pub fn default_data_file() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("store.json"),
        |dirs| dirs.data_dir().join("store.json"),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("openleague");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load Config from `path` + environment.
///
/// Environment keys use `OPENLEAGUE_` and `__` as the nesting separator,
/// e.g. `OPENLEAGUE_REDEMPTION__MAX_RETRIES=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OPENLEAGUE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a core `RedemptionConfig`, validating every field.
pub fn to_redemption_config(cfg: &Config) -> Result<RedemptionConfig, ConfigError> {
    let settings = &cfg.redemption;

    if settings.max_retries > MAX_RETRIES_LIMIT {
        return Err(ConfigError::Validation {
            field: "redemption.max_retries".into(),
            reason: format!(
                "{} exceeds the limit of {MAX_RETRIES_LIMIT}",
                settings.max_retries
            ),
        });
    }

    let amount_cap_types = settings
        .amount_cap_types
        .iter()
        .map(|raw| {
            raw.parse::<CouponType>()
                .map_err(|_| ConfigError::Validation {
                    field: "redemption.amount_cap_types".into(),
                    reason: format!(
                        "unknown coupon type '{raw}' (expected GAS_SPONSORSHIP, DISCOUNT, or FEATURE_UNLOCK)"
                    ),
                })
        })
        .collect::<Result<BTreeSet<_>, _>>()?;

    Ok(RedemptionConfig {
        max_retries: settings.max_retries,
        retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
        amount_cap_types,
        ..RedemptionConfig::default()
    })
}
