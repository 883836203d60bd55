use serde_json::json;

use agrimap_core::{DataOrigin, PriceQuery, Resolver};

use crate::cli::PricesArgs;
use crate::error::CliError;

use super::{default_period, Report};

pub async fn run(args: &PricesArgs, resolver: &Resolver) -> Result<Report, CliError> {
    let (default_year, default_month) = default_period();
    let year = args.year.unwrap_or(default_year);
    let month = args.month.unwrap_or(default_month);

    let resolved = resolver
        .prices(&PriceQuery::new(args.commodity, year, month))
        .await;

    let data = json!({
        "commodity": args.commodity.as_str(),
        "year": year,
        "month": month.as_str(),
        "prices": resolved.records,
    });

    let mut report = Report::new("prices", data).with_origin(resolved.origin);
    if resolved.origin == DataOrigin::None {
        report = report.with_warning(format!(
            "no price data available for {} from any source",
            args.commodity
        ));
    } else if resolved.origin.is_degraded() {
        report = report.with_warning(format!(
            "price data served from degraded source: {}",
            resolved.origin
        ));
    }
    Ok(report)
}
