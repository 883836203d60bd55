//! Bundled snapshot files, the last rung before a source chain gives up.
//!
//! Production snapshots are year-keyed documents with a metadata block;
//! price-history snapshots additionally carry per-month national averages so
//! indices can be recomputed offline. Indices derived here are computed, not
//! copied: a snapshot without an average for the month yields zero indices
//! rather than invented baselines.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::classify::ThresholdScale;
use crate::domain::{Month, MonthValues, PriceRecord, RegionCode, RegionRecord};
use crate::error::LocalFileError;

#[derive(Debug, Deserialize)]
struct ProductionDocument {
    #[serde(flatten)]
    years: BTreeMap<String, ProductionYear>,
}

#[derive(Debug, Deserialize)]
struct ProductionYear {
    #[serde(default)]
    metadata: Option<ProductionMetadata>,
    #[serde(default)]
    data: Vec<ProductionRow>,
}

#[derive(Debug, Deserialize)]
struct ProductionMetadata {
    last_update: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductionRow {
    kode_prov: String,
    #[serde(flatten)]
    values: MonthValues,
}

/// Load production records for `year` from a bundled snapshot file.
///
/// Returns the records plus the snapshot's `last_update` stamp when present.
/// A file without the requested year falls back to the first year that has
/// data; a legacy flat `{"data": [...]}` document is read as the requested
/// year.
pub fn load_production(
    path: &Path,
    year: u16,
) -> Result<(Vec<RegionRecord>, Option<String>), LocalFileError> {
    let body = fs::read_to_string(path)?;

    // Legacy shape: a bare document with a top-level data array.
    if let Ok(legacy) = serde_json::from_str::<ProductionYear>(&body) {
        if !legacy.data.is_empty() {
            return Ok(materialize_production(legacy));
        }
    }

    let mut document: ProductionDocument = serde_json::from_str(&body)?;

    if let Some(snapshot) = document.years.remove(&year.to_string()) {
        if !snapshot.data.is_empty() {
            return Ok(materialize_production(snapshot));
        }
    }

    let fallback = document
        .years
        .into_iter()
        .find(|(_, snapshot)| !snapshot.data.is_empty());
    match fallback {
        Some((found, snapshot)) => {
            warn!(
                requested = year,
                using = %found,
                "snapshot file has no data for requested year, using nearest available"
            );
            Ok(materialize_production(snapshot))
        }
        None => Err(LocalFileError::YearMissing { year }),
    }
}

fn materialize_production(snapshot: ProductionYear) -> (Vec<RegionRecord>, Option<String>) {
    let last_update = snapshot.metadata.and_then(|metadata| metadata.last_update);
    let records = snapshot
        .data
        .into_iter()
        .filter_map(|row| match RegionCode::parse(&row.kode_prov) {
            Ok(code) => Some(RegionRecord::new(code, row.values)),
            Err(_) => {
                warn!(code = %row.kode_prov, "dropping snapshot row with bad province code");
                None
            }
        })
        .collect();
    (records, last_update)
}

#[derive(Debug, Deserialize)]
struct PriceHistoryDocument {
    #[serde(flatten)]
    years: BTreeMap<String, PriceHistoryYear>,
}

#[derive(Debug, Deserialize)]
struct PriceHistoryYear {
    #[serde(default)]
    national_averages: BTreeMap<String, f64>,
    #[serde(default)]
    data: Vec<PriceHistoryRow>,
}

#[derive(Debug, Deserialize)]
struct PriceHistoryRow {
    province_code: String,
    province_name: Option<String>,
    #[serde(flatten)]
    prices: MonthValues,
}

/// Load price records for `year`/`month` from a bundled history file,
/// recomputing each province's index against the month's national average.
pub fn load_price_history(
    path: &Path,
    year: u16,
    month: Month,
) -> Result<Vec<PriceRecord>, LocalFileError> {
    let body = fs::read_to_string(path)?;
    let mut document: PriceHistoryDocument = serde_json::from_str(&body)?;

    let snapshot = document
        .years
        .remove(&year.to_string())
        .ok_or(LocalFileError::YearMissing { year })?;

    let national_average = snapshot
        .national_averages
        .get(month.as_str())
        .copied()
        .unwrap_or(0.0);
    let scale = ThresholdScale::ratio();

    let records = snapshot
        .data
        .into_iter()
        .filter_map(|row| {
            let code = match RegionCode::parse(&row.province_code) {
                Ok(code) => code,
                Err(_) => {
                    warn!(code = %row.province_code, "dropping history row with bad province code");
                    return None;
                }
            };
            let price = row.prices.get(month);
            if price <= 0.0 {
                return None;
            }

            let ipe = if national_average > 0.0 {
                (price / national_average * 100.0).round() / 100.0
            } else {
                0.0
            };
            let name = row
                .province_name
                .unwrap_or_else(|| code.name().to_string());
            Some(PriceRecord {
                code,
                name,
                price,
                unit: "Rp/kg".to_string(),
                ipe,
                category: scale.classify(ipe).label.clone(),
                national_average,
            })
        })
        .collect();

    Ok(records)
}
