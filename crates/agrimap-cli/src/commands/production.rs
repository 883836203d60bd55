use serde::Serialize;
use serde_json::json;

use agrimap_core::{
    compute_indices, national_average, region_display, ProductionQuery, RegionIndex, Resolver,
    ThresholdScale,
};

use crate::cli::ProductionArgs;
use crate::error::CliError;

use super::{default_period, Report};

#[derive(Debug, Serialize)]
struct RegionRow {
    code: String,
    name: String,
    value: f64,
    volume_category: String,
    volume_color: String,
    label: String,
    index: f64,
    index_category: String,
}

pub async fn run(args: &ProductionArgs, resolver: &Resolver) -> Result<Report, CliError> {
    let (default_year, default_month) = default_period();
    let year = args.year.unwrap_or(default_year);
    let month = args.month.unwrap_or(default_month);

    let resolved = resolver.production(&ProductionQuery::new(year)).await?;

    let volume_scale = ThresholdScale::production_volume();
    let ratio_scale = ThresholdScale::ratio();
    let average = national_average(&resolved.records, month);
    let indices = compute_indices(&resolved.records, month, &ratio_scale);

    let regions: Vec<RegionRow> = resolved
        .records
        .iter()
        .zip(&indices)
        .map(|(record, index)| to_row(record.value(month), index, &volume_scale))
        .collect();

    let data = json!({
        "year": year,
        "month": month.as_str(),
        "national_average": average,
        "last_update": resolved.last_update,
        "regions": regions,
    });

    let mut report = Report::new("production", data).with_origin(resolved.origin);
    if resolved.degraded() {
        report = report.with_warning(format!(
            "production data served from degraded source: {}",
            resolved.origin
        ));
    }
    Ok(report)
}

fn to_row(value: f64, index: &RegionIndex, volume_scale: &ThresholdScale) -> RegionRow {
    let display = region_display(value, "ton", volume_scale);
    RegionRow {
        code: index.code.as_str().to_string(),
        name: index.name.clone(),
        value,
        volume_category: display.category,
        volume_color: display.color,
        label: display.formatted_label,
        index: index.index,
        index_category: index.category.clone(),
    }
}
