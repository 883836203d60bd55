//! Source chain resolution: fresh cache, live provider, stale cache, bundled
//! file, then the metric's terminal policy.
//!
//! Production data hard-fails when every rung is exhausted; a map with
//! invented production numbers is worse than no map. Price data degrades to
//! an empty result tagged [`DataOrigin::None`] so the rest of a report can
//! still render.
//!
//! Every resolution is stamped with a monotonic sequence number; callers that
//! overlap requests use [`LatestOnly`] to drop results that arrive out of
//! order.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{cache_key, CacheEntry, CacheStore};
use crate::domain::{Commodity, DataOrigin, Month, PriceRecord, RegionRecord};
use crate::error::{FetchError, ResolveError};
use crate::fetcher::{fetch, FetchPolicy, Sleeper, TokioSleeper};
use crate::http_client::HttpClient;
use crate::providers::{bps, local_file, price_board};
use crate::providers::bps::BpsConfig;
use crate::providers::price_board::PriceBoardConfig;

pub const PRODUCTION_NAMESPACE: &str = "production";
pub const PRICE_NAMESPACE: &str = "price";

/// Static wiring for a resolver: provider endpoints, fallback files, TTLs.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub bps: BpsConfig,
    pub price_board: PriceBoardConfig,
    pub production_file: Option<PathBuf>,
    pub price_history_file: Option<PathBuf>,
    pub production_ttl: Duration,
    pub price_ttl: Duration,
    /// Skip the live rung entirely (offline mode).
    pub skip_live: bool,
    /// Disable the bundled-file rung.
    pub use_local_fallback: bool,
}

impl ResolverConfig {
    pub fn new(bps: BpsConfig, price_board: PriceBoardConfig) -> Self {
        Self {
            bps,
            price_board,
            production_file: None,
            price_history_file: None,
            production_ttl: Duration::from_secs(24 * 60 * 60),
            price_ttl: Duration::from_secs(6 * 60 * 60),
            skip_live: false,
            use_local_fallback: true,
        }
    }

    pub fn with_production_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.production_file = Some(path.into());
        self
    }

    pub fn with_price_history_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.price_history_file = Some(path.into());
        self
    }

    pub fn offline(mut self) -> Self {
        self.skip_live = true;
        self
    }
}

/// Immutable production request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductionQuery {
    pub year: u16,
}

impl ProductionQuery {
    pub fn new(year: u16) -> Self {
        Self { year }
    }

    fn selector(&self) -> String {
        self.year.to_string()
    }

    fn describe(&self) -> String {
        format!("production year={}", self.year)
    }
}

/// Immutable price request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceQuery {
    pub commodity: Commodity,
    pub year: u16,
    pub month: Month,
}

impl PriceQuery {
    pub fn new(commodity: Commodity, year: u16, month: Month) -> Self {
        Self {
            commodity,
            year,
            month,
        }
    }

    fn selector(&self) -> String {
        format!(
            "{}_{}_{}",
            self.commodity.as_str(),
            self.year,
            self.month.as_str()
        )
    }

    fn describe(&self) -> String {
        format!(
            "prices commodity={} year={} month={}",
            self.commodity.as_str(),
            self.year,
            self.month.as_str()
        )
    }
}

/// A resolved dataset plus where it came from and when it was issued.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub records: Vec<T>,
    pub origin: DataOrigin,
    /// Monotonic issue number for staleness rejection.
    pub seq: u64,
    /// Provider- or snapshot-supplied update stamp, when one exists.
    pub last_update: Option<String>,
}

impl<T> Resolved<T> {
    /// True when the data did not come from a fresh source.
    pub fn degraded(&self) -> bool {
        self.origin.is_degraded() || self.origin == DataOrigin::None
    }
}

/// Accepts only the newest resolution seen so far.
///
/// `accept` returns false for any sequence number at or below the highest one
/// already applied, so an older in-flight response can never overwrite a
/// newer one.
#[derive(Debug, Default)]
pub struct LatestOnly {
    applied: AtomicU64,
}

impl LatestOnly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&self, seq: u64) -> bool {
        self.applied.fetch_max(seq, Ordering::AcqRel) < seq
    }
}

pub struct Resolver {
    config: ResolverConfig,
    cache: CacheStore,
    http: Arc<dyn HttpClient>,
    sleeper: Arc<dyn Sleeper>,
    policy: FetchPolicy,
    seq: AtomicU64,
}

impl Resolver {
    pub fn new(config: ResolverConfig, cache: CacheStore, http: Arc<dyn HttpClient>) -> Self {
        Self::with_sleeper(config, cache, http, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(
        config: ResolverConfig,
        cache: CacheStore,
        http: Arc<dyn HttpClient>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        cache.purge_mismatched(PRODUCTION_NAMESPACE);
        cache.purge_mismatched(PRICE_NAMESPACE);
        Self {
            config,
            cache,
            http,
            sleeper,
            policy: FetchPolicy::default(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Resolve yearly production records through the full source chain.
    ///
    /// Exhausting every rung is a hard error for this metric.
    pub async fn production(
        &self,
        query: &ProductionQuery,
    ) -> Result<Resolved<RegionRecord>, ResolveError> {
        let seq = self.next_seq();
        let key = cache_key(PRODUCTION_NAMESPACE, &query.selector());
        let cached: Option<CacheEntry<Vec<RegionRecord>>> = self.cache.get(&key);
        let mut attempts: Vec<String> = Vec::new();

        if let Some(entry) = &cached {
            if entry.is_fresh(self.config.production_ttl) {
                debug!(%key, "serving fresh cached production data");
                return Ok(Resolved {
                    records: entry.payload.clone(),
                    origin: DataOrigin::Cache,
                    seq,
                    last_update: None,
                });
            }
            attempts.push("cache: stale".to_string());
        } else {
            attempts.push("cache: miss".to_string());
        }

        if self.config.skip_live {
            attempts.push("live: skipped".to_string());
        } else {
            let request = self.config.bps.list_data_request(query.year);
            match self.fetch_and_normalize(&request, bps::normalize).await {
                Ok(records) => {
                    self.cache.set(&key, &records);
                    info!(year = query.year, count = records.len(), "fetched live production data");
                    return Ok(Resolved {
                        records,
                        origin: DataOrigin::Live,
                        seq,
                        last_update: None,
                    });
                }
                Err(error) => {
                    warn!(%error, "live production fetch failed, falling back");
                    attempts.push(format!("live: {error}"));
                }
            }
        }

        if let Some(entry) = cached {
            warn!(%key, "serving stale cached production data");
            return Ok(Resolved {
                records: entry.payload,
                origin: DataOrigin::StaleCache,
                seq,
                last_update: None,
            });
        }

        if self.config.use_local_fallback {
            if let Some(path) = &self.config.production_file {
                match local_file::load_production(path, query.year) {
                    Ok((records, last_update)) => {
                        warn!(path = %path.display(), "serving bundled production snapshot");
                        return Ok(Resolved {
                            records,
                            origin: DataOrigin::LocalFile,
                            seq,
                            last_update,
                        });
                    }
                    Err(error) => attempts.push(format!("local file: {error}")),
                }
            } else {
                attempts.push("local file: not configured".to_string());
            }
        } else {
            attempts.push("local file: disabled".to_string());
        }

        Err(ResolveError::Exhausted {
            query: query.describe(),
            attempts: attempts.join("; "),
        })
    }

    /// Resolve monthly price records through the full source chain.
    ///
    /// Exhaustion is soft for prices: the result is empty and tagged
    /// [`DataOrigin::None`].
    pub async fn prices(&self, query: &PriceQuery) -> Resolved<PriceRecord> {
        let seq = self.next_seq();
        let key = cache_key(PRICE_NAMESPACE, &query.selector());
        let cached: Option<CacheEntry<Vec<PriceRecord>>> = self.cache.get(&key);

        if let Some(entry) = &cached {
            if entry.is_fresh(self.config.price_ttl) {
                debug!(%key, "serving fresh cached price data");
                return Resolved {
                    records: entry.payload.clone(),
                    origin: DataOrigin::Cache,
                    seq,
                    last_update: None,
                };
            }
        }

        if !self.config.skip_live {
            let request = self.config.price_board.prices_request(query.commodity);
            match self
                .fetch_and_normalize(&request, price_board::normalize)
                .await
            {
                Ok(records) if !records.is_empty() => {
                    self.cache.set(&key, &records);
                    info!(
                        commodity = query.commodity.as_str(),
                        count = records.len(),
                        "fetched live price data"
                    );
                    return Resolved {
                        records,
                        origin: DataOrigin::Live,
                        seq,
                        last_update: None,
                    };
                }
                Ok(_) => warn!("price board returned no usable rows, falling back"),
                Err(error) => warn!(%error, "live price fetch failed, falling back"),
            }
        }

        if let Some(entry) = cached {
            warn!(%key, "serving stale cached price data");
            return Resolved {
                records: entry.payload,
                origin: DataOrigin::StaleCache,
                seq,
                last_update: None,
            };
        }

        if self.config.use_local_fallback {
            if let Some(path) = &self.config.price_history_file {
                match local_file::load_price_history(path, query.year, query.month) {
                    Ok(records) if !records.is_empty() => {
                        warn!(path = %path.display(), "serving bundled price history");
                        return Resolved {
                            records,
                            origin: DataOrigin::LocalFile,
                            seq,
                            last_update: None,
                        };
                    }
                    Ok(_) => {}
                    Err(error) => warn!(%error, "bundled price history unusable"),
                }
            }
        }

        info!(query = %query.describe(), "price sources exhausted, returning empty result");
        Resolved {
            records: Vec::new(),
            origin: DataOrigin::None,
            seq,
            last_update: None,
        }
    }

    async fn fetch_and_normalize<T>(
        &self,
        request: &crate::http_client::HttpRequest,
        normalize: fn(&str) -> Result<Vec<T>, FetchError>,
    ) -> Result<Vec<T>, FetchError> {
        let response = fetch(
            self.http.as_ref(),
            self.sleeper.as_ref(),
            request,
            &self.policy,
        )
        .await?;
        normalize(&response.body)
    }

    /// Drop cached entries: everything in both namespaces, or only keys
    /// under `prefix` when one is given.
    pub fn clear_cache(&self, prefix: Option<&str>) {
        match prefix {
            Some(prefix) => self.cache.clear(prefix),
            None => {
                self.cache.clear(&format!("{PRODUCTION_NAMESPACE}_"));
                self.cache.clear(&format!("{PRICE_NAMESPACE}_"));
            }
        }
    }
}
