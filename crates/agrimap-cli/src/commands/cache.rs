use serde_json::json;

use agrimap_core::Resolver;

use crate::cli::{CacheArgs, CacheCommand};
use crate::error::CliError;

use super::Report;

pub fn run(args: &CacheArgs, resolver: &Resolver) -> Result<Report, CliError> {
    match &args.command {
        CacheCommand::Clear(clear) => {
            resolver.clear_cache(clear.prefix.as_deref());
            Ok(Report::new(
                "cache",
                json!({
                    "cleared": true,
                    "prefix": clear.prefix,
                }),
            ))
        }
    }
}
