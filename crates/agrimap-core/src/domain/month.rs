use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One of the twelve fixed period buckets within a year.
///
/// Every canonical record is fully populated across all twelve keys; there is
/// no notion of a missing month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Self; 12] = [
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jan => "jan",
            Self::Feb => "feb",
            Self::Mar => "mar",
            Self::Apr => "apr",
            Self::May => "may",
            Self::Jun => "jun",
            Self::Jul => "jul",
            Self::Aug => "aug",
            Self::Sep => "sep",
            Self::Oct => "oct",
            Self::Nov => "nov",
            Self::Dec => "dec",
        }
    }

    /// Zero-based position within the year.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Indonesian display name used by upstream payloads and the UI.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Jan => "Januari",
            Self::Feb => "Februari",
            Self::Mar => "Maret",
            Self::Apr => "April",
            Self::May => "Mei",
            Self::Jun => "Juni",
            Self::Jul => "Juli",
            Self::Aug => "Agustus",
            Self::Sep => "September",
            Self::Oct => "Oktober",
            Self::Nov => "November",
            Self::Dec => "Desember",
        }
    }

    /// Reverse lookup from the upstream display name.
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|month| month.display_name().eq_ignore_ascii_case(name.trim()))
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Month {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|month| month.as_str() == normalized)
            .ok_or(ValidationError::InvalidMonth { value: normalized })
    }
}
