//! CLI argument definitions for agrimap.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `production` | Resolve regional production data with derived indices |
//! | `prices` | Resolve regional commodity prices |
//! | `stats` | Aggregate statistics for one production period |
//! | `cache` | Manage the local response cache |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat degraded-source warnings as failures |
//! | `--offline` | `false` | Skip live providers entirely |
//! | `--cache-dir` | `.agrimap-cache` | Response cache directory |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use agrimap_core::{Commodity, Month};

/// Regional agricultural statistics CLI.
///
/// Resolves rice production and commodity price data through a layered
/// source chain (cache, live provider, stale cache, bundled snapshot) and
/// derives national-average indices for each region.
#[derive(Debug, Parser)]
#[command(
    name = "agrimap",
    author,
    version,
    about = "Regional agricultural production and price statistics"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings (degraded sources, empty results) as failures.
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Skip live providers; serve only from cache and bundled files.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Directory for the persistent response cache.
    #[arg(long, global = true, default_value = ".agrimap-cache")]
    pub cache_dir: PathBuf,

    /// Statistical-office API key.
    #[arg(long, global = true, env = "AGRIMAP_BPS_KEY", default_value = "demo", hide_env_values = true)]
    pub bps_key: String,

    /// Bundled production snapshot used as the last fallback rung.
    #[arg(long, global = true)]
    pub production_file: Option<PathBuf>,

    /// Bundled price history used as the last fallback rung.
    #[arg(long, global = true)]
    pub price_history_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve regional production data for a year, with per-region
    /// national-average indices for one month.
    ///
    /// # Examples
    ///
    ///   agrimap production --year 2023 --month mar
    ///   agrimap production --year 2023 --month mar --offline --pretty
    Production(ProductionArgs),

    /// Resolve regional prices for a commodity and period.
    ///
    /// # Examples
    ///
    ///   agrimap prices --commodity beras_premium --year 2024 --month jan
    ///   agrimap prices --commodity cabai_merah --strict
    Prices(PricesArgs),

    /// Aggregate statistics (total, average, extremes) for one period.
    ///
    /// # Examples
    ///
    ///   agrimap stats --year 2023 --month aug
    Stats(StatsArgs),

    /// Cache management commands.
    Cache(CacheArgs),
}

/// Arguments for the `production` command.
#[derive(Debug, Args)]
pub struct ProductionArgs {
    /// Production year to resolve.
    #[arg(long)]
    pub year: Option<u16>,

    /// Month used for index computation (jan..dec).
    #[arg(long)]
    pub month: Option<Month>,
}

/// Arguments for the `prices` command.
#[derive(Debug, Args)]
pub struct PricesArgs {
    /// Commodity identifier (e.g. beras_premium, cabai_merah).
    #[arg(long)]
    pub commodity: Commodity,

    /// Price year.
    #[arg(long)]
    pub year: Option<u16>,

    /// Price month (jan..dec).
    #[arg(long)]
    pub month: Option<Month>,
}

/// Arguments for the `stats` command.
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Production year to summarize.
    #[arg(long)]
    pub year: Option<u16>,

    /// Month to summarize (jan..dec).
    #[arg(long)]
    pub month: Option<Month>,
}

/// Arguments for the `cache` command group.
#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Cache management subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Drop cached production and price entries.
    Clear(CacheClearArgs),
}

/// Arguments for `cache clear`.
#[derive(Debug, Args)]
pub struct CacheClearArgs {
    /// Only clear keys starting with this prefix (default: everything).
    #[arg(long)]
    pub prefix: Option<String>,
}
