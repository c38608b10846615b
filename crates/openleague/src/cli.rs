//! Clap derive structures for the `openleague` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use openleague_core::{CouponType, Role};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// openleague -- coupon and access administration for Open League
#[derive(Debug, Parser)]
#[command(
    name = "openleague",
    version,
    about = "Manage Open League coupons and access rules from the command line",
    long_about = "Administer redeemable coupons for the Open League platform.\n\n\
        Coupons are kept in a local JSON store; every redemption is\n\
        validated and recorded atomically.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to read instead of the platform default
    #[arg(long, env = "OPENLEAGUE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Coupon store file (overrides config)
    #[arg(long, short = 'd', env = "OPENLEAGUE_DATA_FILE", global = true)]
    pub data_file: Option<PathBuf>,

    /// Principal ID to act as
    #[arg(long = "as", value_name = "ID", env = "OPENLEAGUE_AS", global = true)]
    pub actor: Option<String>,

    /// Role of the acting principal
    #[arg(long, env = "OPENLEAGUE_ROLE", default_value = "user", global = true)]
    pub role: RoleArg,

    /// Act with the super-admin flag set
    #[arg(long, env = "OPENLEAGUE_SUPER_ADMIN", global = true)]
    pub super_admin: bool,

    /// Output format (defaults to the config file's setting)
    #[arg(long, short = 'o', env = "OPENLEAGUE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Domain value enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    User,
    Admin,
    SuperAdmin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::User => Role::User,
            RoleArg::Admin => Role::Admin,
            RoleArg::SuperAdmin => Role::SuperAdmin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CouponTypeArg {
    /// Sponsored on-chain gas, capped per use
    GasSponsorship,
    Discount,
    FeatureUnlock,
}

impl From<CouponTypeArg> for CouponType {
    fn from(arg: CouponTypeArg) -> Self {
        match arg {
            CouponTypeArg::GasSponsorship => CouponType::GasSponsorship,
            CouponTypeArg::Discount => CouponType::Discount,
            CouponTypeArg::FeatureUnlock => CouponType::FeatureUnlock,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create, inspect, validate, and redeem coupons
    #[command(alias = "c")]
    Coupons(CouponsArgs),

    /// Evaluate access decisions
    Access(AccessArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COUPONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CouponsArgs {
    #[command(subcommand)]
    pub command: CouponsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CouponsCommand {
    /// Create a coupon (admin)
    Create {
        /// Coupon code (generated from the type when omitted)
        #[arg(long)]
        code: Option<String>,

        /// What the coupon grants
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        coupon_type: CouponTypeArg,

        /// Maximum number of redemptions
        #[arg(long, default_value = "1")]
        max_uses: u32,

        /// Per-use amount cap
        #[arg(long, value_name = "AMOUNT")]
        max_amount: Option<u64>,

        /// Expiry as RFC 3339 or YYYY-MM-DD (UTC midnight)
        #[arg(long, value_name = "WHEN")]
        expires_at: Option<String>,

        /// Free-text description
        #[arg(long)]
        description: Option<String>,
    },

    /// List coupons
    #[command(alias = "ls")]
    List {
        /// Only show coupons that can still be redeemed
        #[arg(long)]
        usable: bool,
    },

    /// Show coupon details
    Get {
        /// Coupon code
        code: String,
    },

    /// Check whether a coupon can be redeemed, without consuming it
    Validate {
        /// Coupon code
        code: String,
    },

    /// Redeem one use of a coupon
    Redeem {
        /// Coupon code
        code: String,

        /// Amount consumed by this use
        #[arg(long)]
        amount: Option<u64>,

        /// Transaction hash to record
        #[arg(long)]
        tx_hash: Option<String>,

        /// JSON object to attach to the usage record
        #[arg(long, value_name = "JSON")]
        metadata: Option<String>,

        /// Requester IP address to record
        #[arg(long, value_name = "IP")]
        ip: Option<String>,
    },

    /// Expire a coupon immediately (creator or admin)
    Expire {
        /// Coupon code
        code: String,
    },

    /// Show the usage log of a coupon (creator or admin)
    Usage {
        /// Coupon code
        code: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCESS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AccessArgs {
    #[command(subcommand)]
    pub command: AccessCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccessCommand {
    /// Decide whether the acting principal may act on a resource
    Check {
        /// Owner of the resource, if it has one
        #[arg(long, value_name = "ID")]
        owner: Option<String>,

        /// Roles that grant access (repeatable)
        #[arg(long = "require", value_name = "ROLE")]
        required: Vec<RoleArg>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
