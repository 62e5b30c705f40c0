//! Integration tests for the Gamma Exposure API.
//!
//! These tests require the API server to be running. Configure the server URL
//! via the `API_BASE_URL` environment variable (default: `http://localhost:8080`).

use gex_client::{ClientConfig, GexClient};
use serde_json::{Value, json};
use std::time::Duration;

/// Gets the API base URL from environment or uses default.
#[must_use]
pub fn get_api_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Creates a test client configured for the API.
///
/// # Errors
/// Returns error if client creation fails.
pub fn create_test_client() -> Result<GexClient, gex_client::Error> {
    GexClient::new(ClientConfig {
        base_url: get_api_url(),
        timeout: Duration::from_secs(10),
    })
}

/// Generates a unique test symbol to avoid conflicts between tests.
#[must_use]
pub fn unique_symbol(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{}_{}_{}", prefix, ts, counter)
}

/// Snapshot payload with puts below and calls above a spot of 100.
///
/// Expirations: 2025-10-31 (weekly) and 2025-11-21 (monthly). The last entry
/// is undecodable and yields one warning.
#[must_use]
pub fn snapshot_payload(symbol: &str) -> Value {
    json!({
        "symbol": symbol,
        "timestamp": "2025-10-27 16:00:00",
        "data": {
            "current_price": 100.0,
            "options": [
                {"option": "TST251031P00090000", "gamma": 0.03, "open_interest": 1000, "iv": 0.3},
                {"option": "TST251031C00100000", "gamma": 0.05, "open_interest": 200, "iv": 0.3},
                {"option": "TST251121C00110000", "gamma": 0.03, "open_interest": 1000, "iv": 0.3},
                {"option": "TST251121P00090000", "gamma": 0.01, "open_interest": 100, "iv": 0.35},
                {"option": "BROKEN", "gamma": 0.01, "open_interest": 1, "iv": 0.3}
            ]
        }
    })
}

/// Legacy payload with a call and a put at the same strike.
///
/// Net exposure at strike 100 is `105 * 0.001 * 50 * (10 - 5) = 26.25`.
#[must_use]
pub fn legacy_payload(symbol: &str) -> Value {
    let record = |right: &str, oi: f64| {
        json!({
            "contract": {"symbol": symbol, "strike": 100.0, "right": right,
                         "lastTradeDate": "20251031", "multiplier": 50},
            "data": {"gamma": 0.001, "undPrice": 105.0, "openInterest": oi}
        })
    };
    json!([record("C", 10.0), record("P", 5.0)])
}
