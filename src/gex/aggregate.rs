//! Folds raw records into per-(expiration, strike) gamma exposure.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::gex::dataset::{
    NormalizedStrikePoint, OptionRight, PayloadFormat, ProcessedDataset, StrikeKey,
};
use crate::gex::error::{GexError, SymbolDecodeWarning};
use crate::gex::model::{CONTRACT_SIZE, ONE_PERCENT};
use crate::gex::payload::{
    LegacyPayload, Payload, RawLegacyRecord, RawSnapshotPayload, SnapshotEntry, parse_payload,
};
use crate::gex::symbol::decode_option_symbol;

/// Multiplier assumed when a legacy contract omits it.
pub const DEFAULT_MULTIPLIER: f64 = 100.0;

/// Divisor for the billions summary.
pub const BILLION: f64 = 1e9;

/// Result of aggregating one payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// The immutable dataset.
    pub dataset: ProcessedDataset,
    /// Snapshot entries that were dropped.
    pub warnings: Vec<SymbolDecodeWarning>,
    /// Legacy records excluded by validation.
    pub skipped_records: usize,
}

/// Parses, detects and aggregates raw JSON text in one step.
///
/// # Errors
/// Propagates parse and detection errors; `GexError::EmptyDataset` when no
/// record survives validation.
pub fn process_payload(raw: &str) -> Result<Aggregation, GexError> {
    aggregate(parse_payload(raw)?)
}

/// Aggregates a validated payload.
///
/// # Errors
/// Returns `GexError::EmptyDataset` when no record survives validation.
pub fn aggregate(payload: Payload) -> Result<Aggregation, GexError> {
    match payload {
        Payload::Legacy(legacy) => aggregate_legacy(legacy),
        Payload::Snapshot(snapshot) => aggregate_snapshot(snapshot),
    }
}

/// A legacy record with every field needed for aggregation present.
struct ValidLegacyRecord<'a> {
    symbol: &'a str,
    strike: f64,
    right: OptionRight,
    expiration: &'a str,
    multiplier: f64,
    gamma: f64,
    und_price: f64,
    open_interest: f64,
}

impl<'a> ValidLegacyRecord<'a> {
    fn from_raw(record: &'a RawLegacyRecord) -> Option<Self> {
        let contract = &record.contract;
        let data = record.data.as_ref()?;
        let strike = contract.strike.filter(|s| s.is_finite() && *s > 0.0)?;
        let right = OptionRight::from_marker(contract.right.as_deref()?)?;
        let expiration = contract
            .last_trade_date
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())?;
        let gamma = data.gamma.filter(|v| v.is_finite())?;
        let und_price = data.und_price.filter(|v| v.is_finite())?;
        let open_interest = data.open_interest.filter(|v| v.is_finite())?;

        Some(Self {
            symbol: contract.symbol.as_deref().unwrap_or_default(),
            strike,
            right,
            expiration,
            multiplier: contract.multiplier.unwrap_or(DEFAULT_MULTIPLIER),
            gamma,
            und_price,
            open_interest,
        })
    }

    fn exposure(&self) -> f64 {
        self.right
            .signed(self.und_price * self.gamma * self.open_interest * self.multiplier)
    }
}

fn aggregate_legacy(payload: LegacyPayload) -> Result<Aggregation, GexError> {
    let mut points: BTreeMap<StrikeKey, NormalizedStrikePoint> = BTreeMap::new();
    let mut symbol: Option<String> = None;
    let mut reference_price: Option<f64> = None;
    let mut skipped = payload.malformed;

    for (index, record) in payload.records.iter().enumerate() {
        let Some(valid) = ValidLegacyRecord::from_raw(record) else {
            debug!("Excluding legacy record {} with missing data", index);
            skipped += 1;
            continue;
        };

        symbol.get_or_insert_with(|| valid.symbol.to_string());
        reference_price.get_or_insert(valid.und_price);

        points
            .entry(StrikeKey::new(valid.expiration, valid.strike))
            .or_insert_with(|| NormalizedStrikePoint::new(valid.strike, None, valid.und_price))
            .gamma_exposure += valid.exposure();
    }

    let Some(underlying_price) = reference_price else {
        warn!("Legacy payload has no usable records ({} skipped)", skipped);
        return Err(GexError::EmptyDataset);
    };

    let dataset = build_dataset(
        points,
        symbol.unwrap_or_default(),
        underlying_price,
        PayloadFormat::Legacy,
        None,
    );
    info!(
        "Aggregated legacy payload for {}: {} points, {} expirations, {} records skipped",
        dataset.symbol,
        dataset.points.len(),
        dataset.expirations.len(),
        skipped
    );

    Ok(Aggregation {
        dataset,
        warnings: Vec::new(),
        skipped_records: skipped,
    })
}

fn aggregate_snapshot(payload: RawSnapshotPayload) -> Result<Aggregation, GexError> {
    let spot = payload.current_price;
    let mut points: BTreeMap<StrikeKey, NormalizedStrikePoint> = BTreeMap::new();
    let mut warnings = Vec::new();
    let mut total = 0.0;

    for (index, entry) in payload.options.into_iter().enumerate() {
        let option = match entry {
            SnapshotEntry::Valid(option) => option,
            SnapshotEntry::Malformed(reason) => {
                let warning = SymbolDecodeWarning {
                    index,
                    symbol: None,
                    reason,
                };
                warn!("Skipping snapshot {}", warning);
                warnings.push(warning);
                continue;
            }
        };

        let decoded = match decode_option_symbol(&option.option) {
            Ok(decoded) => decoded,
            Err(e) => {
                let warning = SymbolDecodeWarning {
                    index,
                    symbol: Some(option.option),
                    reason: e.to_string(),
                };
                warn!("Skipping snapshot {}", warning);
                warnings.push(warning);
                continue;
            }
        };

        let open_interest = option.open_interest.unwrap_or(0.0);
        let exposure = decoded.right.signed(
            option.gamma.unwrap_or(0.0) * open_interest * CONTRACT_SIZE * spot * spot * ONE_PERCENT,
        );
        total += exposure;

        let point = points
            .entry(StrikeKey::new(&decoded.expiration, decoded.strike))
            .or_insert_with(|| {
                NormalizedStrikePoint::new(decoded.strike, Some(decoded.expiration.clone()), spot)
            });
        point.gamma_exposure += exposure;

        let (side_gamma, side_oi, side_iv) = match decoded.right {
            OptionRight::Call => (
                &mut point.call_gamma,
                &mut point.call_open_interest,
                &mut point.call_iv,
            ),
            OptionRight::Put => (
                &mut point.put_gamma,
                &mut point.put_open_interest,
                &mut point.put_iv,
            ),
        };
        *side_gamma.get_or_insert(0.0) += exposure;
        *side_oi.get_or_insert(0.0) += open_interest;
        if side_iv.is_none() {
            *side_iv = option.iv;
        }
    }

    if points.is_empty() {
        warn!(
            "Snapshot for {} has no decodable options ({} warnings)",
            payload.symbol,
            warnings.len()
        );
        return Err(GexError::EmptyDataset);
    }

    let dataset = build_dataset(
        points,
        payload.symbol,
        spot,
        PayloadFormat::Snapshot,
        Some(total / BILLION),
    );
    info!(
        "Aggregated snapshot for {}: {} points, {} expirations, {} warnings",
        dataset.symbol,
        dataset.points.len(),
        dataset.expirations.len(),
        warnings.len()
    );

    Ok(Aggregation {
        dataset,
        warnings,
        skipped_records: 0,
    })
}

fn build_dataset(
    points: BTreeMap<StrikeKey, NormalizedStrikePoint>,
    symbol: String,
    underlying_price: f64,
    format: PayloadFormat,
    total_gamma_bn: Option<f64>,
) -> ProcessedDataset {
    let mut by_expiration: BTreeMap<String, Vec<NormalizedStrikePoint>> = BTreeMap::new();
    let mut flat = Vec::with_capacity(points.len());

    for (key, point) in points {
        by_expiration
            .entry(key.expiration)
            .or_default()
            .push(point.clone());
        flat.push(point);
    }

    let expirations: Vec<String> = by_expiration.keys().cloned().collect();
    let reference_date = expirations.first().cloned().unwrap_or_default();

    ProcessedDataset {
        reference_date,
        symbol,
        points: flat,
        underlying_price,
        expirations,
        by_expiration,
        format,
        total_gamma_bn,
    }
}

#[cfg(test)]
mod tests;
