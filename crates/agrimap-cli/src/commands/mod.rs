mod cache;
mod prices;
mod production;
mod stats;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use agrimap_core::{
    CacheStore, DataOrigin, FileCacheMedium, Month, ReqwestHttpClient, Resolver, ResolverConfig,
};
use agrimap_core::providers::bps::BpsConfig;
use agrimap_core::providers::price_board::PriceBoardConfig;

use crate::cli::{Cli, Command};
use crate::error::CliError;

const BPS_BASE_URL: &str = "https://webapi.bps.go.id/v1/api";
const BPS_DOMAIN: &str = "0000";
const PRICE_BOARD_BASE_URL: &str = "https://hargapangan.id";
const PRICE_BOARD_NAMESPACE: &str = "tpn";

/// Final output of one command invocation.
#[derive(Debug, Serialize)]
pub struct Report {
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<DataOrigin>,
    pub warnings: Vec<String>,
    pub data: Value,
}

impl Report {
    pub fn new(command: &'static str, data: Value) -> Self {
        Self {
            command,
            origin: None,
            warnings: Vec::new(),
            data,
        }
    }

    pub fn with_origin(mut self, origin: DataOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let resolver = build_resolver(cli);

    match &cli.command {
        Command::Production(args) => production::run(args, &resolver).await,
        Command::Prices(args) => prices::run(args, &resolver).await,
        Command::Stats(args) => stats::run(args, &resolver).await,
        Command::Cache(args) => cache::run(args, &resolver),
    }
}

fn build_resolver(cli: &Cli) -> Resolver {
    let mut config = ResolverConfig::new(
        BpsConfig::new(BPS_BASE_URL, cli.bps_key.clone(), BPS_DOMAIN),
        PriceBoardConfig::new(PRICE_BOARD_BASE_URL, PRICE_BOARD_NAMESPACE),
    );
    config.skip_live = cli.offline;
    if let Some(path) = &cli.production_file {
        config = config.with_production_file(path);
    }
    if let Some(path) = &cli.price_history_file {
        config = config.with_price_history_file(path);
    }

    let cache = CacheStore::new(Arc::new(FileCacheMedium::new(&cli.cache_dir)));
    Resolver::new(config, cache, Arc::new(ReqwestHttpClient::new()))
}

/// Default period: the current UTC year and month.
pub fn default_period() -> (u16, Month) {
    let now = OffsetDateTime::now_utc();
    let month = Month::ALL[u8::from(now.month()) as usize - 1];
    (now.year().clamp(0, u16::MAX as i32) as u16, month)
}
