//! Flag-aware configuration resolution.
//!
//! `openleague-config` owns the TOML file and environment layering; this
//! module lets command-line flags win over both.

use std::path::PathBuf;

use clap::ValueEnum;

use openleague_config::Config;
use openleague_core::{Principal, RedemptionConfig};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Config file in effect: `--config`, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(openleague_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(openleague_config::load_config_from(&config_path(global))?)
}

/// Store file in effect: `--data-file`, else config, else the platform default.
pub fn data_file(global: &GlobalOpts, cfg: &Config) -> PathBuf {
    global.data_file.clone().unwrap_or_else(|| cfg.data_file())
}

pub fn redemption(cfg: &Config) -> Result<RedemptionConfig, CliError> {
    Ok(openleague_config::to_redemption_config(cfg)?)
}

pub fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    match global.output {
        Some(format) => Ok(format),
        None => OutputFormat::from_str(&cfg.defaults.output, true).map_err(|_| {
            CliError::Validation {
                field: "defaults.output".into(),
                reason: format!("unknown output format '{}'", cfg.defaults.output),
            }
        }),
    }
}

pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> Result<ColorMode, CliError> {
    match global.color {
        Some(mode) => Ok(mode),
        None => ColorMode::from_str(&cfg.defaults.color, true).map_err(|_| CliError::Validation {
            field: "defaults.color".into(),
            reason: format!("unknown color mode '{}'", cfg.defaults.color),
        }),
    }
}

/// The acting principal from `--as`, `--role` and `--super-admin`.
pub fn principal(global: &GlobalOpts) -> Option<Principal> {
    let id = global.actor.as_deref()?.trim();
    if id.is_empty() {
        return None;
    }
    let mut principal = Principal::new(id, global.role.into());
    principal.is_super_admin = global.super_admin;
    Some(principal)
}

/// Like [`principal`], failing for commands that act on behalf of someone.
pub fn require_principal(global: &GlobalOpts, action: &str) -> Result<Principal, CliError> {
    principal(global).ok_or_else(|| CliError::NoPrincipal {
        action: action.into(),
    })
}
