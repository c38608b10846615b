//! Config subcommand handlers.

use std::path::Path;

use openleague_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::Presentation;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        // ── Show: effective settings after file, env, and flags ─────
        ConfigCommand::Show => {
            let mut cfg = config::load(global)?;
            let view = Presentation::resolve(global, &cfg)?;
            cfg.data_file = Some(config::data_file(global, &cfg));

            let detail = match view.format {
                OutputFormat::Table => render_toml(&cfg, &path)?,
                _ => String::new(),
            };
            let out = output::render_single(
                view.format,
                &cfg,
                |_| detail.clone(),
                |c| c.data_file().display().to_string(),
            )?;
            output::print_output(&out, view.quiet);
            Ok(())
        }

        // ── Init: write defaults ────────────────────────────────────
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            openleague_config::save_config_to(&Config::default(), &path)?;
            output::notice(
                &format!("Wrote default config to {}", path.display()),
                global.quiet,
                false,
            );
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}

/// Effective config as TOML, headed by the file it would live in.
fn render_toml(cfg: &Config, path: &Path) -> Result<String, CliError> {
    let body = toml::to_string_pretty(cfg).map_err(|e| CliError::Toml(e.to_string()))?;
    Ok(format!("# {}\n{body}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn toml_view_carries_path_header_and_settings() {
        let cfg = Config::default();
        let out = render_toml(&cfg, Path::new("/tmp/openleague/config.toml")).unwrap();
        assert!(out.starts_with("# /tmp/openleague/config.toml\n"));
        assert!(out.contains("[redemption]"));
        assert!(out.contains("max_retries"));
    }
}
