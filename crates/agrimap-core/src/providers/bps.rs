//! Statistical-office (BPS) provider: URL construction and payload
//! normalization.
//!
//! Upstream rows are heterogeneous: the region may arrive as an explicit
//! wide-area code or buried in a variable tag, and monthly values may be an
//! array of named entries or direct per-month fields. Malformed rows are
//! bucketed or skipped, never fatal for the batch.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::{Month, MonthValues, RegionCode, RegionRecord};
use crate::error::FetchError;
use crate::http_client::HttpRequest;

/// Connection settings for the statistical-office API.
#[derive(Debug, Clone)]
pub struct BpsConfig {
    pub base_url: String,
    /// Static application key embedded in the URL path.
    pub app_id: String,
    pub domain: String,
}

impl BpsConfig {
    pub fn new(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            app_id: app_id.into(),
            domain: domain.into(),
        }
    }

    /// Yearly list-data endpoint:
    /// `<base>/list/model/data/domain/<domain>/key/<appid>?year=<year>`.
    pub fn list_data_url(&self, year: u16) -> String {
        format!(
            "{}/list/model/data/domain/{}/key/{}?year={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.domain),
            urlencoding::encode(&self.app_id),
            year
        )
    }

    pub fn list_data_request(&self, year: u16) -> HttpRequest {
        HttpRequest::get(self.list_data_url(year)).with_header("content-type", "application/json")
    }
}

#[derive(Debug, Deserialize)]
struct RawRow {
    kode_wilayah: Option<String>,
    turvar: Option<String>,
    data_bulanan: Option<Vec<RawMonthEntry>>,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawMonthEntry {
    bulan: Option<String>,
    nilai: Option<Value>,
}

/// Normalize a raw statistical-office response body into canonical records.
///
/// A missing `data` array is a terminal malformed-response error; individual
/// rows degrade (unknown bucket, skipped row) instead of failing the batch.
pub fn normalize(body: &str) -> Result<Vec<RegionRecord>, FetchError> {
    let payload: Value = serde_json::from_str(body).map_err(|error| {
        FetchError::terminal(format!("statistical-office response is not JSON: {error}"))
    })?;

    let rows = payload
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            FetchError::terminal("statistical-office response has no 'data' array")
        })?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        if !row.is_object() {
            warn!("skipping non-object statistical-office row");
            continue;
        }
        let raw: RawRow = match serde_json::from_value(row.clone()) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, "skipping undecodable statistical-office row");
                continue;
            }
        };

        let code = extract_region_code(&raw);
        let values = extract_month_values(&raw);
        records.push(RegionRecord::new(code, values));
    }

    Ok(records)
}

/// Region code from the wide-area code field (first two characters) or a
/// leading two-digit run of the variable tag; `"00"` otherwise.
fn extract_region_code(raw: &RawRow) -> RegionCode {
    if let Some(wilayah) = raw.kode_wilayah.as_deref() {
        if let Ok(code) = RegionCode::parse(&wilayah.chars().take(2).collect::<String>()) {
            return code;
        }
    }

    if let Some(turvar) = raw.turvar.as_deref() {
        let leading: String = turvar.chars().take_while(char::is_ascii_digit).collect();
        if leading.len() >= 2 {
            if let Ok(code) = RegionCode::parse(&leading[..2]) {
                return code;
            }
        }
    }

    warn!(
        kode_wilayah = raw.kode_wilayah.as_deref(),
        turvar = raw.turvar.as_deref(),
        "statistical-office row has no recognizable region, bucketing as unknown"
    );
    RegionCode::unknown()
}

fn extract_month_values(raw: &RawRow) -> MonthValues {
    let mut values = MonthValues::default();

    if let Some(entries) = &raw.data_bulanan {
        for entry in entries {
            let Some(month) = entry
                .bulan
                .as_deref()
                .and_then(Month::from_display_name)
            else {
                continue;
            };
            values.set(month, lenient_number(entry.nilai.as_ref()));
        }
        return values;
    }

    // Direct per-month fields, short key or Indonesian display name.
    for month in Month::ALL {
        let field = raw
            .fields
            .get(month.as_str())
            .or_else(|| raw.fields.get(month.display_name()));
        if let Some(value) = field {
            values.set(month, lenient_number(Some(value)));
        }
    }
    values
}

/// Upstream numbers arrive as JSON numbers or numeric strings; anything else
/// is zero.
fn lenient_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BpsConfig {
        BpsConfig::new("https://stats.example.test/v1/api", "app-key-123", "0000")
    }

    #[test]
    fn builds_list_data_url_with_key_in_path() {
        assert_eq!(
            config().list_data_url(2023),
            "https://stats.example.test/v1/api/list/model/data/domain/0000/key/app-key-123?year=2023"
        );
    }

    #[test]
    fn normalizes_wide_area_codes_and_monthly_arrays() {
        let body = r#"{"data": [
            {"kode_wilayah": "3205", "data_bulanan": [
                {"bulan": "Januari", "nilai": "120.5"},
                {"bulan": "Mei", "nilai": 300}
            ]}
        ]}"#;

        let records = normalize(body).expect("normalizes");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code.as_str(), "32");
        assert_eq!(records[0].name, "Jawa Barat");
        assert_eq!(records[0].value(Month::Jan), 120.5);
        assert_eq!(records[0].value(Month::May), 300.0);
        assert_eq!(records[0].value(Month::Dec), 0.0);
    }

    #[test]
    fn falls_back_to_turvar_then_unknown_bucket() {
        let body = r#"{"data": [
            {"turvar": "51 Bali", "jan": 10},
            {"turvar": "Produksi Padi", "jan": 20}
        ]}"#;

        let records = normalize(body).expect("normalizes");
        assert_eq!(records[0].code.as_str(), "51");
        assert_eq!(records[1].code.as_str(), "00");
        assert_eq!(records[1].name, "Unknown");
        assert_eq!(records[1].value(Month::Jan), 20.0);
    }

    #[test]
    fn direct_fields_accept_display_names_and_strings() {
        let body = r#"{"data": [
            {"kode_wilayah": "11", "Agustus": "55", "sep": 60}
        ]}"#;

        let records = normalize(body).expect("normalizes");
        assert_eq!(records[0].value(Month::Aug), 55.0);
        assert_eq!(records[0].value(Month::Sep), 60.0);
    }

    #[test]
    fn malformed_rows_do_not_abort_the_batch() {
        let body = r#"{"data": [
            "not an object",
            {"kode_wilayah": "12", "jan": -7, "feb": "garbage"}
        ]}"#;

        let records = normalize(body).expect("normalizes");
        assert_eq!(records.len(), 1);
        // Negative clamped, unparseable string defaulted.
        assert_eq!(records[0].value(Month::Jan), 0.0);
        assert_eq!(records[0].value(Month::Feb), 0.0);
    }

    #[test]
    fn missing_data_array_is_terminal() {
        let error = normalize(r#"{"status": "ok"}"#).expect_err("malformed shape");
        assert!(matches!(error, FetchError::Terminal { .. }));
        assert!(!error.retryable());
    }
}
