//! Command dispatch: bridges CLI args -> coupon service -> output formatting.

pub mod access;
pub mod config_cmd;
pub mod coupons;
pub mod util;

use openleague_config::Config;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;
use crate::session::Session;

/// Presentation settings resolved from flags and the config file.
#[derive(Debug, Clone, Copy)]
pub struct Presentation {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub yes: bool,
}

impl Presentation {
    pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Self, CliError> {
        Ok(Self {
            format: config::output_format(global, cfg)?,
            color: output::should_color(config::color_mode(global, cfg)?),
            quiet: global.quiet,
            yes: global.yes,
        })
    }
}

/// Dispatch a store-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let view = Presentation::resolve(global, cfg)?;
    match cmd {
        Command::Coupons(args) => {
            let session = Session::open(config::data_file(global, cfg), config::redemption(cfg)?)?;
            let result = coupons::handle(&session, args, global, &view).await;
            // No-op unless the store changed.
            session.persist()?;
            result
        }
        Command::Access(args) => access::handle(args, global, &view),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
