//! Core engine for regional agricultural statistics: acquisition with
//! retries and layered fallbacks, canonical normalization of heterogeneous
//! provider payloads, and derived national-average indices.

pub mod cache;
pub mod classify;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod index;
pub mod providers;
pub mod resolver;

pub use cache::{cache_key, CacheEntry, CacheMedium, CacheStore, FileCacheMedium, MemoryCacheMedium};
pub use classify::{Band, ThresholdScale};
pub use domain::{
    region_code_for_name, region_name, Commodity, DataOrigin, Month, MonthValues, PriceRecord,
    RegionCode, RegionRecord,
};
pub use error::{CacheIoError, FetchError, LocalFileError, ResolveError, ValidationError};
pub use fetcher::{fetch, FetchPolicy, Sleeper, TokioSleeper};
pub use http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use index::{
    build_lookup, compute_indices, national_average, period_stats, region_display, region_index,
    PeriodStats, RegionDisplay, RegionIndex,
};
pub use resolver::{
    LatestOnly, PriceQuery, ProductionQuery, Resolved, Resolver, ResolverConfig,
};
