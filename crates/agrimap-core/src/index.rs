//! Joining, national-average indices, and period summaries.
//!
//! Index arithmetic is total: a zero or empty national average yields zero
//! indices rather than NaN or infinity, so downstream rendering never has to
//! special-case a division.

use std::collections::HashMap;

use serde::Serialize;

use crate::classify::ThresholdScale;
use crate::domain::{Month, RegionCode, RegionRecord};

/// Code-keyed lookup over a record slice; later duplicates win.
pub fn build_lookup(records: &[RegionRecord]) -> HashMap<RegionCode, &RegionRecord> {
    let mut lookup = HashMap::with_capacity(records.len());
    for record in records {
        lookup.insert(record.code.clone(), record);
    }
    lookup
}

/// Mean of the month's values across all records; zero when empty.
pub fn national_average(records: &[RegionRecord], month: Month) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: f64 = records.iter().map(|record| record.value(month)).sum();
    total / records.len() as f64
}

/// `value / national_average`, guarded so the result is always finite.
pub fn region_index(value: f64, national_average: f64) -> f64 {
    if national_average > 0.0 && value.is_finite() {
        value / national_average
    } else {
        0.0
    }
}

/// One region's value for a month relative to the national average.
#[derive(Debug, Clone, Serialize)]
pub struct RegionIndex {
    pub code: RegionCode,
    pub name: String,
    pub value: f64,
    pub national_average: f64,
    pub index: f64,
    pub category: String,
}

/// Compute per-region indices for `month` against the month's national
/// average, classified on `scale`.
pub fn compute_indices(
    records: &[RegionRecord],
    month: Month,
    scale: &ThresholdScale,
) -> Vec<RegionIndex> {
    let average = national_average(records, month);
    records
        .iter()
        .map(|record| {
            let value = record.value(month);
            let index = region_index(value, average);
            RegionIndex {
                code: record.code.clone(),
                name: record.name.clone(),
                value,
                national_average: average,
                index,
                category: scale.classify(index).label.clone(),
            }
        })
        .collect()
}

/// Presentation bundle for one region's raw value on an absolute scale.
#[derive(Debug, Clone, Serialize)]
pub struct RegionDisplay {
    pub category: String,
    pub color: String,
    pub numeric_value: f64,
    pub formatted_label: String,
}

/// Classify a raw value on `scale` and format it with thousands separators.
pub fn region_display(value: f64, unit: &str, scale: &ThresholdScale) -> RegionDisplay {
    let band = scale.classify(value);
    RegionDisplay {
        category: band.label.clone(),
        color: band.color.clone(),
        numeric_value: value,
        formatted_label: format!("{} {unit}", group_thousands(value)),
    }
}

fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Aggregate statistics for one month across all regions.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodStats {
    pub total: f64,
    pub average: f64,
    pub max_value: f64,
    pub max_region: String,
    pub min_value: f64,
    pub min_region: String,
}

/// Month totals with the extreme regions named; `None` when there are no
/// records.
pub fn period_stats(records: &[RegionRecord], month: Month) -> Option<PeriodStats> {
    let first = records.first()?;

    let mut total = 0.0;
    let mut max = (first.value(month), first.name.as_str());
    let mut min = max;
    for record in records {
        let value = record.value(month);
        total += value;
        if value > max.0 {
            max = (value, record.name.as_str());
        }
        if value < min.0 {
            min = (value, record.name.as_str());
        }
    }

    Some(PeriodStats {
        total,
        average: total / records.len() as f64,
        max_value: max.0,
        max_region: max.1.to_string(),
        min_value: min.0,
        min_region: min.1.to_string(),
    })
}
