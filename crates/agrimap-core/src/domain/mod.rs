//! Canonical domain model: periods, region identity, and records.

mod month;
mod record;
mod region;

pub use month::Month;
pub use record::{MonthValues, PriceRecord, RegionRecord};
pub use region::{region_code_for_name, region_name, RegionCode};

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Commodity identifiers understood by the price-board provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Commodity {
    BerasPremium,
    BerasMedium,
    CabaiMerah,
    CabaiRawit,
    BawangMerah,
    BawangPutih,
    DagingAyam,
    DagingSapi,
    TelurAyam,
    MinyakGoreng,
}

impl Commodity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BerasPremium => "beras_premium",
            Self::BerasMedium => "beras_medium",
            Self::CabaiMerah => "cabai_merah",
            Self::CabaiRawit => "cabai_rawit",
            Self::BawangMerah => "bawang_merah",
            Self::BawangPutih => "bawang_putih",
            Self::DagingAyam => "daging_ayam",
            Self::DagingSapi => "daging_sapi",
            Self::TelurAyam => "telur_ayam",
            Self::MinyakGoreng => "minyak_goreng",
        }
    }
}

impl Display for Commodity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commodity {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beras_premium" => Ok(Self::BerasPremium),
            "beras_medium" => Ok(Self::BerasMedium),
            "cabai_merah" => Ok(Self::CabaiMerah),
            "cabai_rawit" => Ok(Self::CabaiRawit),
            "bawang_merah" => Ok(Self::BawangMerah),
            "bawang_putih" => Ok(Self::BawangPutih),
            "daging_ayam" => Ok(Self::DagingAyam),
            "daging_sapi" => Ok(Self::DagingSapi),
            "telur_ayam" => Ok(Self::TelurAyam),
            "minyak_goreng" => Ok(Self::MinyakGoreng),
            other => Err(ValidationError::InvalidCommodity {
                value: other.to_owned(),
            }),
        }
    }
}

/// Where a resolved data set ultimately came from.
///
/// `StaleCache` and `LocalFile` mark degraded acquisitions; `None` marks an
/// explicitly empty result (price ladder exhausted), which the presentation
/// layer must distinguish from a system error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataOrigin {
    Live,
    Cache,
    StaleCache,
    LocalFile,
    None,
}

impl DataOrigin {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Cache => "cache",
            Self::StaleCache => "stale-cache",
            Self::LocalFile => "local-file",
            Self::None => "none",
        }
    }

    /// A degraded origin satisfied the query but not from a fresh source.
    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::StaleCache | Self::LocalFile)
    }
}

impl Display for DataOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commodity_round_trips_through_str() {
        for commodity in [Commodity::BerasPremium, Commodity::MinyakGoreng] {
            let parsed: Commodity = commodity.as_str().parse().expect("parses");
            assert_eq!(parsed, commodity);
        }
    }

    #[test]
    fn unknown_commodity_is_rejected() {
        assert!(matches!(
            "durian".parse::<Commodity>(),
            Err(ValidationError::InvalidCommodity { .. })
        ));
    }

    #[test]
    fn degraded_origins() {
        assert!(DataOrigin::StaleCache.is_degraded());
        assert!(DataOrigin::LocalFile.is_degraded());
        assert!(!DataOrigin::Live.is_degraded());
        assert!(!DataOrigin::Cache.is_degraded());
        assert!(!DataOrigin::None.is_degraded());
    }
}
