//! Raw input schemas, format detection and the validating parse step.
//!
//! Two schemas are accepted:
//!
//! ```text
//! legacy   : [ { "contract": { "symbol", "strike", "right", "lastTradeDate", "multiplier" },
//!                "data":     { "gamma", "undPrice", "openInterest" } }, ... ]
//! snapshot : { "symbol", "timestamp",
//!              "data": { "current_price", "options": [ { "option", "gamma", "open_interest", "iv" } ] } }
//! ```
//!
//! The schemas share no required top-level keys, so the shape is classified
//! once by [`detect_format`] and every later stage works on the tagged
//! [`Payload`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::gex::dataset::PayloadFormat;
use crate::gex::error::GexError;

/// Contract block of a legacy record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyContract {
    /// Underlying symbol.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Strike price.
    #[serde(default)]
    pub strike: Option<f64>,
    /// `C` or `P`.
    #[serde(default)]
    pub right: Option<String>,
    /// Expiration, `YYYYMMDD`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_trade_date: Option<String>,
    /// Contract multiplier; numeric strings are accepted.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub multiplier: Option<f64>,
}

/// Measurement block of a legacy record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyData {
    /// Unit gamma.
    #[serde(default)]
    pub gamma: Option<f64>,
    /// Underlying price at observation.
    #[serde(default)]
    pub und_price: Option<f64>,
    /// Open interest.
    #[serde(default)]
    pub open_interest: Option<f64>,
}

/// One legacy contract observation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawLegacyRecord {
    /// Contract description.
    pub contract: LegacyContract,
    /// Measurements; `null` or missing excludes the record.
    #[serde(default)]
    pub data: Option<LegacyData>,
}

/// Legacy payload after the typed parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyPayload {
    /// Records that deserialized.
    pub records: Vec<RawLegacyRecord>,
    /// Elements that could not be deserialized at all.
    pub malformed: usize,
}

/// One encoded option entry of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSnapshotOption {
    /// Encoded identifier, e.g. `CMG251031C00016000`.
    pub option: String,
    /// Unit gamma.
    #[serde(default)]
    pub gamma: Option<f64>,
    /// Open interest.
    #[serde(default)]
    pub open_interest: Option<f64>,
    /// Implied volatility.
    #[serde(default)]
    pub iv: Option<f64>,
}

/// Snapshot entry after the typed parse.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEntry {
    /// Entry deserialized.
    Valid(RawSnapshotOption),
    /// Entry could not be deserialized; carries the parser message.
    Malformed(String),
}

/// Snapshot payload after the typed parse.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSnapshotPayload {
    /// Underlying symbol.
    pub symbol: String,
    /// Snapshot timestamp as provided.
    pub timestamp: Option<String>,
    /// Underlying price at snapshot time.
    pub current_price: f64,
    /// Option entries in payload order.
    pub options: Vec<SnapshotEntry>,
}

/// A payload whose schema has been detected and validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Array of per-contract records.
    Legacy(LegacyPayload),
    /// Market snapshot.
    Snapshot(RawSnapshotPayload),
}

impl Payload {
    /// Schema tag of this payload.
    #[must_use]
    pub fn format(&self) -> PayloadFormat {
        match self {
            Self::Legacy(_) => PayloadFormat::Legacy,
            Self::Snapshot(_) => PayloadFormat::Snapshot,
        }
    }
}

#[derive(Deserialize)]
struct SnapshotEnvelope {
    symbol: String,
    #[serde(default, deserialize_with = "lenient_string")]
    timestamp: Option<String>,
    data: SnapshotEnvelopeData,
}

#[derive(Deserialize)]
struct SnapshotEnvelopeData {
    current_price: f64,
    options: Vec<Value>,
}

/// Classifies a parsed JSON value.
///
/// # Errors
/// Returns `GexError::UnrecognizedFormat` when neither schema matches.
pub fn detect_format(value: &Value) -> Result<PayloadFormat, GexError> {
    if is_snapshot(value) {
        Ok(PayloadFormat::Snapshot)
    } else if is_legacy(value) {
        Ok(PayloadFormat::Legacy)
    } else {
        Err(GexError::UnrecognizedFormat)
    }
}

fn is_snapshot(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let data = obj.get("data");
    let has_symbol = obj.get("symbol").is_some_and(Value::is_string);
    let has_price = data
        .and_then(|d| d.get("current_price"))
        .is_some_and(Value::is_number);
    let first_is_encoded = data
        .and_then(|d| d.get("options"))
        .and_then(Value::as_array)
        .and_then(|options| options.first())
        .and_then(|first| first.get("option"))
        .is_some_and(Value::is_string);

    has_symbol && has_price && first_is_encoded
}

fn is_legacy(value: &Value) -> bool {
    value
        .as_array()
        .and_then(|records| records.first())
        .and_then(|first| first.get("contract"))
        .filter(|contract| contract.is_object())
        .and_then(|contract| contract.get("strike"))
        .is_some_and(Value::is_number)
}

/// Parses raw JSON text into a validated [`Payload`].
///
/// # Errors
/// `GexError::Parse` for malformed JSON (carrying the parser message),
/// `GexError::UnrecognizedFormat` when no schema matches.
pub fn parse_payload(raw: &str) -> Result<Payload, GexError> {
    let value: Value = serde_json::from_str(raw)?;
    payload_from_value(value)
}

/// Validates an already parsed JSON value into a [`Payload`].
///
/// # Errors
/// Same as [`parse_payload`], minus JSON syntax errors.
pub fn payload_from_value(value: Value) -> Result<Payload, GexError> {
    match detect_format(&value)? {
        PayloadFormat::Snapshot => {
            let envelope: SnapshotEnvelope = serde_json::from_value(value)?;
            let options = envelope
                .data
                .options
                .into_iter()
                .map(|entry| match serde_json::from_value::<RawSnapshotOption>(entry) {
                    Ok(option) => SnapshotEntry::Valid(option),
                    Err(e) => SnapshotEntry::Malformed(e.to_string()),
                })
                .collect();

            Ok(Payload::Snapshot(RawSnapshotPayload {
                symbol: envelope.symbol,
                timestamp: envelope.timestamp,
                current_price: envelope.data.current_price,
                options,
            }))
        }
        PayloadFormat::Legacy => {
            let Value::Array(elements) = value else {
                return Err(GexError::UnrecognizedFormat);
            };
            let mut payload = LegacyPayload::default();
            for (index, element) in elements.into_iter().enumerate() {
                match serde_json::from_value::<RawLegacyRecord>(element) {
                    Ok(record) => payload.records.push(record),
                    Err(e) => {
                        debug!("Skipping malformed legacy record {}: {}", index, e);
                        payload.malformed += 1;
                    }
                }
            }
            Ok(Payload::Legacy(payload))
        }
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
