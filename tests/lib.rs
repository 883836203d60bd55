// Shared fixtures for the behavioral test suites.

pub use std::sync::Arc;

pub use agrimap_core::fetcher::RecordingSleeper;
pub use agrimap_core::http_client::{HttpError, HttpResponse, ScriptedHttpClient};
pub use agrimap_core::providers::bps::BpsConfig;
pub use agrimap_core::providers::price_board::PriceBoardConfig;
pub use agrimap_core::{
    cache_key, CacheMedium, CacheStore, Commodity, DataOrigin, MemoryCacheMedium, Month,
    MonthValues, RegionCode, RegionRecord, Resolver, ResolverConfig,
};

/// Resolver config pointing at test endpoints, live rung enabled.
pub fn test_config() -> ResolverConfig {
    ResolverConfig::new(
        BpsConfig::new("https://stats.example.test/v1/api", "test-key", "0000"),
        PriceBoardConfig::new("https://prices.example.test", "board"),
    )
}

/// Resolver over an in-memory cache and a scripted transport. The medium is
/// handed back so tests can seed raw entries (for example with an ancient
/// timestamp) and inspect what was persisted.
pub fn test_resolver(
    config: ResolverConfig,
    client: ScriptedHttpClient,
) -> (Resolver, Arc<MemoryCacheMedium>) {
    let medium = Arc::new(MemoryCacheMedium::new());
    let resolver = Resolver::with_sleeper(
        config,
        CacheStore::new(medium.clone()),
        Arc::new(client),
        Arc::new(RecordingSleeper::new()),
    );
    (resolver, medium)
}

/// A record with a single January value, name resolved from the code table.
pub fn region(code: &str, jan: f64) -> RegionRecord {
    let mut values = MonthValues::default();
    values.set(Month::Jan, jan);
    RegionRecord::new(RegionCode::parse(code).expect("valid code"), values)
}

/// Minimal production payload in the statistical-office wire shape.
pub fn production_body(code: &str, jan: f64) -> String {
    format!(r#"{{"data": [{{"kode_wilayah": "{code}", "jan": {jan}}}]}}"#)
}

/// Minimal successful price-board payload for one province.
pub fn price_body(code: &str, price: f64) -> String {
    format!(
        r#"{{"success": true, "data": [{{"provinceCode": "{code}", "provinceName": "Test", "price": {price}, "unit": "Rp/kg", "ipe": 1.0, "kategori": "normal", "harga_nasional": {price}}}]}}"#
    )
}
