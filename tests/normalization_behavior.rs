//! Behavior-driven tests for payload normalization.
//!
//! These tests verify HOW heterogeneous provider payloads collapse into the
//! canonical record shapes, and which malformations degrade a row versus
//! failing the whole batch.

use agrimap_core::providers::{bps, local_file, price_board};
use agrimap_core::{FetchError, LocalFileError, Month};

use std::io::Write;
use tempfile::NamedTempFile;

// =============================================================================
// Normalization: Statistical-Office Payloads
// =============================================================================

#[test]
fn when_rows_use_different_region_encodings_all_collapse_to_two_digit_codes() {
    // Given: three rows with the three known region encodings
    let body = r#"{"data": [
        {"kode_wilayah": "3271", "jan": 1.0},
        {"turvar": "16 Sumatera Selatan", "jan": 2.0},
        {"turvar": "Padi Sawah", "jan": 3.0}
    ]}"#;

    // When: the batch is normalized
    let records = bps::normalize(body).expect("normalizes");

    // Then: each row lands on a canonical code, the last in the unknown bucket
    assert_eq!(records[0].code.as_str(), "32");
    assert_eq!(records[1].code.as_str(), "16");
    assert_eq!(records[2].code.as_str(), "00");
    assert!(records[2].code.is_unknown());
}

#[test]
fn when_month_values_are_strings_or_missing_they_parse_leniently() {
    // Given: a monthly array mixing numbers, numeric strings, and junk
    let body = r#"{"data": [
        {"kode_wilayah": "32", "data_bulanan": [
            {"bulan": "Januari", "nilai": "150.5"},
            {"bulan": "Februari", "nilai": 200},
            {"bulan": "Maret", "nilai": "not-a-number"},
            {"bulan": "Undecember", "nilai": 9}
        ]}
    ]}"#;

    // When: the batch is normalized
    let records = bps::normalize(body).expect("normalizes");

    // Then: parseable values survive, junk and unknown months become zero
    assert_eq!(records[0].value(Month::Jan), 150.5);
    assert_eq!(records[0].value(Month::Feb), 200.0);
    assert_eq!(records[0].value(Month::Mar), 0.0);
    assert_eq!(records[0].value(Month::Apr), 0.0);
}

#[test]
fn when_values_are_negative_or_nonfinite_they_are_clamped_to_zero() {
    // Given: a row with a negative tonnage
    let body = r#"{"data": [{"kode_wilayah": "32", "jan": -500.0, "feb": 10.0}]}"#;

    // When: the batch is normalized
    let records = bps::normalize(body).expect("normalizes");

    // Then: the negative value is clamped, the valid one kept
    assert_eq!(records[0].value(Month::Jan), 0.0);
    assert_eq!(records[0].value(Month::Feb), 10.0);
}

#[test]
fn when_the_data_array_is_missing_the_whole_batch_is_rejected() {
    // Given: a response without the expected envelope
    let error = bps::normalize(r#"{"message": "maintenance"}"#).expect_err("malformed");

    // Then: the failure is terminal, so the chain moves on instead of retrying
    assert!(matches!(error, FetchError::Terminal { .. }));
}

// =============================================================================
// Normalization: Price-Board Payloads
// =============================================================================

#[test]
fn when_provinces_arrive_by_name_only_they_are_mapped_to_codes() {
    // Given: rows keyed by name, one of them unmappable
    let body = r#"{"success": true, "data": [
        {"provinceName": "Sumatera Utara", "price": 13000.0},
        {"provinceName": "Wakanda", "price": 11000.0}
    ]}"#;

    // When: the batch is normalized
    let records = price_board::normalize(body).expect("normalizes");

    // Then: the mappable row survives with its code, the other is dropped
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].code.as_str(), "12");
}

#[test]
fn when_categories_arrive_in_indonesian_they_are_canonicalized() {
    // Given: board labels in mixed language and casing
    let body = r#"{"success": true, "data": [
        {"provinceCode": "11", "price": 100.0, "kategori": "Rendah"},
        {"provinceCode": "12", "price": 100.0, "kategori": "TINGGI"},
        {"provinceCode": "13", "price": 100.0}
    ]}"#;

    // When: the batch is normalized
    let records = price_board::normalize(body).expect("normalizes");

    // Then: categories land on the canonical low/normal/high ids
    assert_eq!(records[0].category, "low");
    assert_eq!(records[1].category, "high");
    assert_eq!(records[2].category, "normal");
}

#[test]
fn when_the_board_reports_failure_the_batch_is_rejected() {
    let error = price_board::normalize(r#"{"success": false}"#).expect_err("failed response");
    assert!(matches!(error, FetchError::Terminal { .. }));
}

// =============================================================================
// Normalization: Bundled Snapshots
// =============================================================================

#[test]
fn when_a_snapshot_lacks_the_year_the_nearest_available_one_serves() {
    // Given: a snapshot with only an older year populated
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(br#"{"2021": {"data": [{"kode_prov": "51", "jul": 33.0}]}}"#)
        .expect("write");

    // When: a newer year is requested
    let (records, _) = local_file::load_production(file.path(), 2024).expect("falls back");

    // Then: the older year's data serves
    assert_eq!(records[0].code.as_str(), "51");
    assert_eq!(records[0].value(Month::Jul), 33.0);
}

#[test]
fn when_history_prices_are_loaded_indices_are_recomputed_not_copied() {
    // Given: a history with a known national average for March
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(
        br#"{"2023": {
            "national_averages": {"mar": 150.0},
            "data": [{"province_code": "32", "mar": 200.0}]
        }}"#,
    )
    .expect("write");

    // When: the month is loaded
    let records = local_file::load_price_history(file.path(), 2023, Month::Mar).expect("loads");

    // Then: 200/150 rounds to 1.33 and classifies high
    assert_eq!(records[0].ipe, 1.33);
    assert_eq!(records[0].category, "high");
    assert_eq!(records[0].national_average, 150.0);
}

#[test]
fn when_history_lacks_the_year_the_error_names_it() {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(br#"{"2020": {"data": []}}"#).expect("write");

    let error =
        local_file::load_price_history(file.path(), 2023, Month::Jan).expect_err("missing year");
    assert!(matches!(error, LocalFileError::YearMissing { year: 2023 }));
}
