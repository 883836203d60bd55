use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Stable two-digit administrative region code, the primary join key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCode(String);

impl RegionCode {
    /// Permissive bucket for rows whose region cannot be determined.
    pub fn unknown() -> Self {
        Self(String::from("00"))
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.len() != 2 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidRegionCode {
                value: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == "00"
    }

    /// Display name from the static code table, `"Unknown"` otherwise.
    pub fn name(&self) -> &'static str {
        region_name(self.as_str()).unwrap_or("Unknown")
    }
}

impl Display for RegionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionCode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Static code → province name table (38 provinces).
const REGION_NAMES: &[(&str, &str)] = &[
    ("11", "Aceh"),
    ("12", "Sumatera Utara"),
    ("13", "Sumatera Barat"),
    ("14", "Riau"),
    ("15", "Jambi"),
    ("16", "Sumatera Selatan"),
    ("17", "Bengkulu"),
    ("18", "Lampung"),
    ("19", "Kepulauan Bangka Belitung"),
    ("21", "Kepulauan Riau"),
    ("31", "DKI Jakarta"),
    ("32", "Jawa Barat"),
    ("33", "Jawa Tengah"),
    ("34", "DI Yogyakarta"),
    ("35", "Jawa Timur"),
    ("36", "Banten"),
    ("51", "Bali"),
    ("52", "Nusa Tenggara Barat"),
    ("53", "Nusa Tenggara Timur"),
    ("61", "Kalimantan Barat"),
    ("62", "Kalimantan Tengah"),
    ("63", "Kalimantan Selatan"),
    ("64", "Kalimantan Timur"),
    ("65", "Kalimantan Utara"),
    ("71", "Sulawesi Utara"),
    ("72", "Sulawesi Tengah"),
    ("73", "Sulawesi Selatan"),
    ("74", "Sulawesi Tenggara"),
    ("75", "Gorontalo"),
    ("76", "Sulawesi Barat"),
    ("81", "Maluku"),
    ("82", "Maluku Utara"),
    ("91", "Papua Tengah"),
    ("92", "Papua"),
    ("93", "Papua Barat"),
    ("94", "Papua Selatan"),
    ("95", "Papua Pegunungan"),
    ("96", "Papua Barat Daya"),
];

/// Price-board province labels differ slightly from the canonical names
/// (e.g. "Bangka Belitung") and cover fewer regions.
const PRICE_BOARD_NAMES: &[(&str, &str)] = &[
    ("Aceh", "11"),
    ("Sumatera Utara", "12"),
    ("Sumatera Barat", "13"),
    ("Riau", "14"),
    ("Jambi", "15"),
    ("Sumatera Selatan", "16"),
    ("Bengkulu", "17"),
    ("Lampung", "18"),
    ("Bangka Belitung", "19"),
    ("Kepulauan Riau", "21"),
    ("DKI Jakarta", "31"),
    ("Jawa Barat", "32"),
    ("Jawa Tengah", "33"),
    ("DI Yogyakarta", "34"),
    ("Jawa Timur", "35"),
    ("Banten", "36"),
    ("Bali", "51"),
    ("Nusa Tenggara Barat", "52"),
    ("Nusa Tenggara Timur", "53"),
    ("Kalimantan Barat", "61"),
    ("Kalimantan Tengah", "62"),
    ("Kalimantan Selatan", "63"),
    ("Kalimantan Timur", "64"),
    ("Kalimantan Utara", "65"),
    ("Sulawesi Utara", "71"),
    ("Sulawesi Tengah", "72"),
    ("Sulawesi Selatan", "73"),
    ("Sulawesi Tenggara", "74"),
    ("Gorontalo", "75"),
    ("Sulawesi Barat", "76"),
    ("Maluku", "81"),
    ("Maluku Utara", "82"),
    ("Papua", "92"),
    ("Papua Barat", "93"),
];

/// Resolve a region code to its display name.
pub fn region_name(code: &str) -> Option<&'static str> {
    REGION_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, name)| *name)
}

/// Map a price-board province label to its canonical region code.
///
/// Returns `None` for labels outside the table; price data has no safe
/// unknown-region bucket, so callers drop such rows.
pub fn region_code_for_name(name: &str) -> Option<RegionCode> {
    let trimmed = name.trim();
    PRICE_BOARD_NAMES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(trimmed))
        .map(|(_, code)| RegionCode((*code).to_owned()))
}
