//! Generic ordered-threshold classification.
//!
//! One classifier drives both the production-volume buckets and the
//! ratio-index buckets; the scale passed in is the only difference.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A single `(lower bound, label, color)` band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub threshold: f64,
    pub label: String,
    pub color: String,
}

impl Band {
    pub fn new(threshold: f64, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            threshold,
            label: label.into(),
            color: color.into(),
        }
    }
}

/// Ascending sequence of bands; the first band's threshold is the domain
/// minimum and acts as a catch-all lower bound.
///
/// Deserialization goes through the same validation as [`ThresholdScale::new`],
/// so an empty or non-ascending scale cannot be smuggled in from config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScale")]
pub struct ThresholdScale {
    bands: Vec<Band>,
}

#[derive(Deserialize)]
struct RawScale {
    bands: Vec<Band>,
}

impl TryFrom<RawScale> for ThresholdScale {
    type Error = ValidationError;

    fn try_from(raw: RawScale) -> Result<Self, Self::Error> {
        Self::new(raw.bands)
    }
}

impl ThresholdScale {
    pub fn new(bands: Vec<Band>) -> Result<Self, ValidationError> {
        let first = bands.first().ok_or(ValidationError::EmptyScale)?;
        if first.threshold != 0.0 {
            return Err(ValidationError::ScaleMustStartAtZero {
                value: first.threshold.to_string(),
            });
        }
        for (index, pair) in bands.windows(2).enumerate() {
            if pair[1].threshold <= pair[0].threshold {
                return Err(ValidationError::NonAscendingThreshold { index: index + 1 });
            }
        }
        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Pick the band with the highest threshold `<= value`; inputs below all
    /// thresholds (negative values included) fall back to the first band.
    pub fn classify(&self, value: f64) -> &Band {
        self.bands
            .iter()
            .rev()
            .find(|band| value >= band.threshold)
            .unwrap_or(&self.bands[0])
    }

    /// 3-band ratio scale centered on 1.00: `<0.90` low, `0.90..1.10`
    /// normal, `>1.10` high. Used for both the production index (IPP) and
    /// the price index (IPE).
    pub fn ratio() -> Self {
        Self::new(vec![
            Band::new(0.0, "low", "#4299e1"),
            Band::new(0.90, "normal", "#fed976"),
            Band::new(1.10, "high", "#f56565"),
        ])
        .expect("builtin scale is valid")
    }

    /// 6-band absolute tonnage scale for raw production volume.
    pub fn production_volume() -> Self {
        Self::new(vec![
            Band::new(0.0, "very-low", "#fff5eb"),
            Band::new(100_000.0, "low", "#fed976"),
            Band::new(300_000.0, "moderate", "#feb24c"),
            Band::new(600_000.0, "high", "#fd8d3c"),
            Band::new(1_000_000.0, "very-high", "#f03b20"),
            Band::new(2_000_000.0, "extreme", "#bd0026"),
        ])
        .expect("builtin scale is valid")
    }
}
