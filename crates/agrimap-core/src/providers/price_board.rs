//! Price-board provider: per-commodity price snapshots keyed by province.
//!
//! The board publishes pre-computed per-province indices and categories; we
//! still canonicalize the category labels and drop rows without a usable
//! province mapping or a positive price.

use serde::Deserialize;
use tracing::warn;

use crate::domain::{region_code_for_name, Commodity, PriceRecord, RegionCode};
use crate::error::FetchError;
use crate::http_client::HttpRequest;

/// Connection settings for the price-board API.
#[derive(Debug, Clone)]
pub struct PriceBoardConfig {
    pub base_url: String,
    /// URL namespace segment between `/api/` and the resource path.
    pub namespace: String,
}

impl PriceBoardConfig {
    pub fn new(base_url: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            namespace: namespace.into(),
        }
    }

    /// `<base>/api/<namespace>/prices/<commodity>`.
    pub fn prices_url(&self, commodity: Commodity) -> String {
        format!(
            "{}/api/{}/prices/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.namespace),
            commodity.as_str()
        )
    }

    pub fn prices_request(&self, commodity: Commodity) -> HttpRequest {
        HttpRequest::get(self.prices_url(commodity)).with_header("accept", "application/json")
    }
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Vec<RawPriceRow>>,
}

#[derive(Debug, Deserialize)]
struct RawPriceRow {
    #[serde(rename = "provinceCode")]
    province_code: Option<String>,
    #[serde(rename = "provinceName")]
    province_name: Option<String>,
    #[serde(default)]
    price: f64,
    unit: Option<String>,
    #[serde(default)]
    ipe: f64,
    kategori: Option<String>,
    #[serde(default)]
    harga_nasional: f64,
}

/// Normalize a raw price-board response body into canonical price records.
///
/// A body that fails to parse, reports failure, or carries no `data` array is
/// terminal; individual rows degrade by being dropped.
pub fn normalize(body: &str) -> Result<Vec<PriceRecord>, FetchError> {
    let payload: RawResponse = serde_json::from_str(body)
        .map_err(|error| FetchError::terminal(format!("price-board response is not JSON: {error}")))?;

    if !payload.success {
        return Err(FetchError::terminal("price board reported failure"));
    }
    let rows = payload
        .data
        .ok_or_else(|| FetchError::terminal("price-board response has no 'data' array"))?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(code) = resolve_province(&row) else {
            warn!(
                province = row.province_name.as_deref(),
                "dropping price row with no usable province"
            );
            continue;
        };

        if row.price <= 0.0 || !row.price.is_finite() {
            continue;
        }

        let name = row
            .province_name
            .clone()
            .unwrap_or_else(|| code.name().to_string());
        records.push(PriceRecord {
            code,
            name,
            price: row.price,
            unit: row.unit.clone().unwrap_or_else(|| "Rp/kg".to_string()),
            ipe: row.ipe,
            category: canonical_category(row.kategori.as_deref()),
            national_average: row.harga_nasional,
        });
    }

    Ok(records)
}

fn resolve_province(row: &RawPriceRow) -> Option<RegionCode> {
    if let Some(code) = row.province_code.as_deref() {
        if let Ok(code) = RegionCode::parse(code) {
            return Some(code);
        }
    }
    row.province_name
        .as_deref()
        .and_then(region_code_for_name)
}

/// Canonical category ids: Indonesian board labels map onto the same
/// low/normal/high scale used for locally computed indices.
pub fn canonical_category(label: Option<&str>) -> String {
    match label.map(|label| label.trim().to_ascii_lowercase()).as_deref() {
        Some("rendah") | Some("low") => "low".to_string(),
        Some("tinggi") | Some("high") => "high".to_string(),
        Some("sedang") | Some("normal") | None => "normal".to_string(),
        Some(other) => {
            warn!(label = other, "unrecognized price category, defaulting to normal");
            "normal".to_string()
        }
    }
}
