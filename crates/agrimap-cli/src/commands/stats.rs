use serde_json::json;

use agrimap_core::{period_stats, ProductionQuery, Resolver};

use crate::cli::StatsArgs;
use crate::error::CliError;

use super::{default_period, Report};

pub async fn run(args: &StatsArgs, resolver: &Resolver) -> Result<Report, CliError> {
    let (default_year, default_month) = default_period();
    let year = args.year.unwrap_or(default_year);
    let month = args.month.unwrap_or(default_month);

    let resolved = resolver.production(&ProductionQuery::new(year)).await?;
    let stats = period_stats(&resolved.records, month);

    let data = json!({
        "year": year,
        "month": month.as_str(),
        "region_count": resolved.records.len(),
        "stats": stats,
    });

    let mut report = Report::new("stats", data).with_origin(resolved.origin);
    if resolved.records.is_empty() {
        report = report.with_warning("no regions available for the requested period");
    }
    if resolved.degraded() {
        report = report.with_warning(format!(
            "statistics computed from degraded source: {}",
            resolved.origin
        ));
    }
    Ok(report)
}
