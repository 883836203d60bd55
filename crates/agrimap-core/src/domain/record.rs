use serde::{Deserialize, Serialize};

use super::{Month, RegionCode};

/// Fixed mapping of the twelve period keys to a non-negative magnitude.
///
/// Absent months default to zero on deserialization; a record is never
/// partially populated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthValues {
    #[serde(default)]
    pub jan: f64,
    #[serde(default)]
    pub feb: f64,
    #[serde(default)]
    pub mar: f64,
    #[serde(default)]
    pub apr: f64,
    #[serde(default)]
    pub may: f64,
    #[serde(default)]
    pub jun: f64,
    #[serde(default)]
    pub jul: f64,
    #[serde(default)]
    pub aug: f64,
    #[serde(default)]
    pub sep: f64,
    #[serde(default)]
    pub oct: f64,
    #[serde(default)]
    pub nov: f64,
    #[serde(default)]
    pub dec: f64,
}

impl MonthValues {
    pub fn get(&self, month: Month) -> f64 {
        match month {
            Month::Jan => self.jan,
            Month::Feb => self.feb,
            Month::Mar => self.mar,
            Month::Apr => self.apr,
            Month::May => self.may,
            Month::Jun => self.jun,
            Month::Jul => self.jul,
            Month::Aug => self.aug,
            Month::Sep => self.sep,
            Month::Oct => self.oct,
            Month::Nov => self.nov,
            Month::Dec => self.dec,
        }
    }

    pub fn set(&mut self, month: Month, value: f64) {
        let slot = match month {
            Month::Jan => &mut self.jan,
            Month::Feb => &mut self.feb,
            Month::Mar => &mut self.mar,
            Month::Apr => &mut self.apr,
            Month::May => &mut self.may,
            Month::Jun => &mut self.jun,
            Month::Jul => &mut self.jul,
            Month::Aug => &mut self.aug,
            Month::Sep => &mut self.sep,
            Month::Oct => &mut self.oct,
            Month::Nov => &mut self.nov,
            Month::Dec => &mut self.dec,
        };
        *slot = value;
    }

    /// Clamp non-finite and negative inputs to zero so downstream index math
    /// never sees NaN or negative magnitudes.
    pub fn sanitize(&mut self) {
        for month in Month::ALL {
            let value = self.get(month);
            if !value.is_finite() || value < 0.0 {
                self.set(month, 0.0);
            }
        }
    }
}

/// One region, one metric, one year: the canonical normalized record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub code: RegionCode,
    pub name: String,
    #[serde(flatten)]
    pub values: MonthValues,
}

impl RegionRecord {
    /// Build a record with the name resolved from the static code table and
    /// values sanitized per the canonical invariants.
    pub fn new(code: RegionCode, mut values: MonthValues) -> Self {
        values.sanitize();
        let name = code.name().to_owned();
        Self { code, name, values }
    }

    pub fn value(&self, month: Month) -> f64 {
        self.values.get(month)
    }
}

/// One region's commodity price for a single period, with the derived
/// economic index already attached by the provider or local-file loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub code: RegionCode,
    pub name: String,
    /// Unit price in the provider's currency (Rp).
    pub price: f64,
    /// Quantity unit the price refers to, e.g. `"kg"`.
    pub unit: String,
    /// Ratio of this region's price to the national average.
    pub ipe: f64,
    /// Canonical category label (`low` / `normal` / `high`).
    pub category: String,
    /// National average price used to derive `ipe`.
    pub national_average: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_months_default_to_zero() {
        let values: MonthValues =
            serde_json::from_str(r#"{"jan": 100.0, "feb": 200.0}"#).expect("deserializes");
        assert_eq!(values.jan, 100.0);
        assert_eq!(values.feb, 200.0);
        for month in &Month::ALL[2..] {
            assert_eq!(values.get(*month), 0.0);
        }
    }

    #[test]
    fn sanitize_clamps_negative_and_non_finite() {
        let mut values = MonthValues::default();
        values.set(Month::Mar, -5.0);
        values.set(Month::Apr, f64::NAN);
        values.set(Month::May, 42.0);
        values.sanitize();
        assert_eq!(values.mar, 0.0);
        assert_eq!(values.apr, 0.0);
        assert_eq!(values.may, 42.0);
    }

    #[test]
    fn record_resolves_name_from_code_table() {
        let record = RegionRecord::new(
            RegionCode::parse("11").expect("valid"),
            MonthValues::default(),
        );
        assert_eq!(record.name, "Aceh");

        let unknown = RegionRecord::new(RegionCode::unknown(), MonthValues::default());
        assert_eq!(unknown.name, "Unknown");
    }

    #[test]
    fn record_flattens_month_keys_in_json() {
        let record = RegionRecord::new(
            RegionCode::parse("32").expect("valid"),
            MonthValues {
                jan: 10.0,
                ..MonthValues::default()
            },
        );
        let json = serde_json::to_value(&record).expect("serializes");
        assert_eq!(json["code"], "32");
        assert_eq!(json["jan"], 10.0);
        assert_eq!(json["dec"], 0.0);
    }
}
