//! Unit tests for the aggregator.

use super::*;
use crate::gex::payload::payload_from_value;
use serde_json::{Value, json};

fn legacy_record(right: &str, strike: f64, expiry: &str, gamma: f64, oi: f64) -> Value {
    json!({
        "contract": {"symbol": "ES", "strike": strike, "right": right,
                     "lastTradeDate": expiry, "multiplier": 50},
        "data": {"gamma": gamma, "undPrice": 105.0, "openInterest": oi}
    })
}

fn aggregate_value(value: Value) -> Result<Aggregation, GexError> {
    aggregate(payload_from_value(value)?)
}

fn snapshot(options: Value) -> Value {
    json!({
        "symbol": "CMG",
        "timestamp": "2025-10-30 16:00:00",
        "data": {"current_price": 15.5, "options": options}
    })
}

// ============================================================================
// Legacy Tests
// ============================================================================

#[test]
fn test_legacy_call_and_put_net_at_same_strike() {
    let result = aggregate_value(json!([
        legacy_record("C", 100.0, "20251031", 0.001, 10.0),
        legacy_record("P", 100.0, "20251031", 0.001, 5.0),
    ]))
    .unwrap();

    let dataset = result.dataset;
    assert_eq!(dataset.points.len(), 1);
    let point = &dataset.points[0];
    assert_eq!(point.strike, 100.0);
    let expected = 105.0 * 0.001 * 10.0 * 50.0 - 105.0 * 0.001 * 5.0 * 50.0;
    assert!((point.gamma_exposure - expected).abs() < 1e-9);
    assert!((point.gamma_exposure - 26.25).abs() < 1e-9);
    assert_eq!(point.expiration, None);
    assert_eq!(dataset.format, PayloadFormat::Legacy);
    assert_eq!(dataset.total_gamma_bn, None);
}

#[test]
fn test_legacy_put_is_negated_call() {
    let call = aggregate_value(json!([legacy_record("C", 100.0, "20251031", 0.002, 7.0)]))
        .unwrap()
        .dataset;
    let put = aggregate_value(json!([legacy_record("P", 100.0, "20251031", 0.002, 7.0)]))
        .unwrap()
        .dataset;
    assert_eq!(put.points[0].gamma_exposure, -call.points[0].gamma_exposure);
    assert!(call.points[0].gamma_exposure > 0.0);
}

#[test]
fn test_legacy_duplicate_record_doubles_exposure() {
    let single = aggregate_value(json!([legacy_record("C", 100.0, "20251031", 0.003, 4.0)]))
        .unwrap()
        .dataset;
    let double = aggregate_value(json!([
        legacy_record("C", 100.0, "20251031", 0.003, 4.0),
        legacy_record("C", 100.0, "20251031", 0.003, 4.0),
    ]))
    .unwrap()
    .dataset;

    assert_eq!(double.points.len(), 1);
    assert_eq!(
        double.points[0].gamma_exposure,
        2.0 * single.points[0].gamma_exposure
    );
}

#[test]
fn test_legacy_groups_by_expiration_and_strike() {
    let dataset = aggregate_value(json!([
        legacy_record("C", 110.0, "20251121", 0.001, 1.0),
        legacy_record("C", 100.0, "20251031", 0.001, 1.0),
        legacy_record("P", 100.0, "20251121", 0.001, 1.0),
    ]))
    .unwrap()
    .dataset;

    assert_eq!(dataset.points.len(), 3);
    assert_eq!(dataset.expirations, vec!["20251031", "20251121"]);
    assert_eq!(dataset.reference_date, "20251031");
    assert_eq!(dataset.points_at("20251121").unwrap().len(), 2);
    assert_eq!(dataset.points_at("20251031").unwrap().len(), 1);
    assert_eq!(dataset.symbol, "ES");
    assert_eq!(dataset.underlying_price, 105.0);
    // Flat sequence ordered by expiration then strike.
    let strikes: Vec<f64> = dataset.points.iter().map(|p| p.strike).collect();
    assert_eq!(strikes, vec![100.0, 100.0, 110.0]);
}

#[test]
fn test_legacy_excludes_incomplete_records() {
    let result = aggregate_value(json!([
        legacy_record("C", 100.0, "20251031", 0.001, 10.0),
        {"contract": {"strike": 100.0, "right": "C", "lastTradeDate": "20251031"}, "data": null},
        {"contract": {"strike": 100.0, "right": "C", "lastTradeDate": "20251031"},
         "data": {"gamma": null, "undPrice": 105.0, "openInterest": 3}},
        {"contract": {"strike": 100.0, "right": "X", "lastTradeDate": "20251031"},
         "data": {"gamma": 0.1, "undPrice": 105.0, "openInterest": 3}},
        "garbage",
    ]))
    .unwrap();

    assert_eq!(result.skipped_records, 4);
    assert_eq!(result.dataset.points.len(), 1);
    assert!((result.dataset.points[0].gamma_exposure - 52.5).abs() < 1e-9);
}

#[test]
fn test_legacy_missing_multiplier_defaults() {
    let dataset = aggregate_value(json!([{
        "contract": {"symbol": "SPY", "strike": 500.0, "right": "C", "lastTradeDate": "20251031"},
        "data": {"gamma": 0.01, "undPrice": 500.0, "openInterest": 2}
    }]))
    .unwrap()
    .dataset;
    assert!((dataset.points[0].gamma_exposure - 500.0 * 0.01 * 2.0 * 100.0).abs() < 1e-9);
}

#[test]
fn test_legacy_all_invalid_is_empty_dataset() {
    let err = aggregate_value(json!([
        {"contract": {"strike": 100.0}, "data": null}
    ]))
    .unwrap_err();
    assert!(matches!(err, GexError::EmptyDataset));
}

#[test]
fn test_legacy_reference_price_is_first_valid_record() {
    let dataset = aggregate_value(json!([
        {"contract": {"strike": 100.0, "right": "C", "lastTradeDate": "20251031"}, "data": null},
        {"contract": {"strike": 100.0, "right": "C", "lastTradeDate": "20251031", "multiplier": 1},
         "data": {"gamma": 0.1, "undPrice": 99.0, "openInterest": 1}},
        {"contract": {"strike": 101.0, "right": "C", "lastTradeDate": "20251031", "multiplier": 1},
         "data": {"gamma": 0.1, "undPrice": 101.0, "openInterest": 1}},
    ]))
    .unwrap()
    .dataset;
    assert_eq!(dataset.underlying_price, 99.0);
}

// ============================================================================
// Snapshot Tests
// ============================================================================

#[test]
fn test_snapshot_tracks_sides_separately() {
    let result = aggregate_value(snapshot(json!([
        {"option": "CMG251031C00016000", "gamma": 0.2, "open_interest": 100, "iv": 0.4},
        {"option": "CMG251031P00016000", "gamma": 0.2, "open_interest": 50, "iv": 0.45},
    ])))
    .unwrap();

    assert!(result.warnings.is_empty());
    let dataset = result.dataset;
    assert_eq!(dataset.format, PayloadFormat::Snapshot);
    assert_eq!(dataset.points.len(), 1);

    let point = &dataset.points[0];
    let scale = 100.0 * 15.5 * 15.5 * 0.01;
    let call = 0.2 * 100.0 * scale;
    let put = -(0.2 * 50.0 * scale);
    assert!((point.call_gamma.unwrap() - call).abs() < 1e-9);
    assert!((point.put_gamma.unwrap() - put).abs() < 1e-9);
    assert!((point.gamma_exposure - (call + put)).abs() < 1e-9);
    assert_eq!(point.call_open_interest, Some(100.0));
    assert_eq!(point.put_open_interest, Some(50.0));
    assert_eq!(point.call_iv, Some(0.4));
    assert_eq!(point.put_iv, Some(0.45));
    assert_eq!(point.expiration.as_deref(), Some("2025-10-31"));
    assert_eq!(point.underlying_price, 15.5);

    let total_bn = dataset.total_gamma_bn.unwrap();
    assert!((total_bn - (call + put) / 1e9).abs() < 1e-18);
}

#[test]
fn test_snapshot_decode_failure_is_not_fatal() {
    let result = aggregate_value(snapshot(json!([
        {"option": "CMG251031C00016000", "gamma": 0.2, "open_interest": 100, "iv": 0.4},
        {"option": "CMG25XX31C00017000", "gamma": 0.2, "open_interest": 100, "iv": 0.4},
        {"gamma": 0.1},
        {"option": "CMG251121P00015000", "gamma": 0.1, "open_interest": 10, "iv": 0.5},
    ])))
    .unwrap();

    assert_eq!(result.dataset.points.len(), 2);
    assert_eq!(result.warnings.len(), 2);
    assert_eq!(result.warnings[0].index, 1);
    assert_eq!(
        result.warnings[0].symbol.as_deref(),
        Some("CMG25XX31C00017000")
    );
    assert_eq!(result.warnings[1].index, 2);
    assert_eq!(result.warnings[1].symbol, None);
    assert_eq!(
        result.dataset.expirations,
        vec!["2025-10-31", "2025-11-21"]
    );
    assert_eq!(result.dataset.reference_date, "2025-10-31");
}

#[test]
fn test_snapshot_repeated_key_accumulates() {
    let result = aggregate_value(snapshot(json!([
        {"option": "CMG251031C00016000", "gamma": 0.1, "open_interest": 10, "iv": 0.3},
        {"option": "CMG251031C00016000", "gamma": 0.1, "open_interest": 10, "iv": 0.9},
    ])))
    .unwrap();
    let point = &result.dataset.points[0];
    let single = 0.1 * 10.0 * 100.0 * 15.5 * 15.5 * 0.01;
    assert!((point.gamma_exposure - 2.0 * single).abs() < 1e-9);
    assert_eq!(point.call_open_interest, Some(20.0));
    assert_eq!(point.call_iv, Some(0.3));
    assert_eq!(point.put_gamma, None);
    assert_eq!(point.put_iv, None);
}

#[test]
fn test_snapshot_missing_measurements_count_as_zero() {
    let result = aggregate_value(snapshot(json!([
        {"option": "CMG251031C00016000"},
    ])))
    .unwrap();
    let point = &result.dataset.points[0];
    assert_eq!(point.gamma_exposure, 0.0);
    assert_eq!(point.call_open_interest, Some(0.0));
    assert_eq!(point.call_iv, None);
}

#[test]
fn test_snapshot_all_undecodable_is_empty_dataset() {
    let err = aggregate_value(snapshot(json!([
        {"option": "BAD"},
        {"option": "ALSO-BAD-IDENTIFIER"},
    ])))
    .unwrap_err();
    assert!(matches!(err, GexError::EmptyDataset));
}

#[test]
fn test_process_payload_end_to_end() {
    let raw = snapshot(json!([
        {"option": "CMG251031C00016000", "gamma": 0.2, "open_interest": 100, "iv": 0.4}
    ]))
    .to_string();
    let result = process_payload(&raw).unwrap();
    assert_eq!(result.dataset.symbol, "CMG");

    assert!(matches!(process_payload("not json"), Err(GexError::Parse(_))));
    assert!(matches!(
        process_payload("{\"hello\": 1}"),
        Err(GexError::UnrecognizedFormat)
    ));
}
