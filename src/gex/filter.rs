//! Expiration/strike selection over a processed dataset.

use std::collections::BTreeMap;

use crate::gex::dataset::{NormalizedStrikePoint, ProcessedDataset, StrikeWindow, strike_to_mills};

/// Re-aggregates the chosen expirations by strike and keeps the strikes inside
/// `window`, highest strike first.
///
/// Exposure is summed across expirations sharing a strike; every other field
/// comes from the first expiration (in selection order) that has the strike.
/// An empty selection yields an empty result.
#[must_use]
pub fn select_strikes<S: AsRef<str>>(
    dataset: &ProcessedDataset,
    expirations: &[S],
    window: StrikeWindow,
) -> Vec<NormalizedStrikePoint> {
    let mut by_strike: BTreeMap<u64, NormalizedStrikePoint> = BTreeMap::new();

    for expiration in expirations {
        let Some(points) = dataset.points_at(expiration.as_ref()) else {
            continue;
        };
        for point in points {
            by_strike
                .entry(strike_to_mills(point.strike))
                .and_modify(|existing| existing.gamma_exposure += point.gamma_exposure)
                .or_insert_with(|| point.clone());
        }
    }

    by_strike
        .into_values()
        .rev()
        .filter(|point| window.contains(point.strike))
        .collect()
}

/// `(strike, exposure)` pairs of a selection in ascending strike order, ready
/// for [`crate::gex::flip::strike_crossings`].
#[must_use]
pub fn exposure_curve(points: &[NormalizedStrikePoint]) -> Vec<(f64, f64)> {
    let mut curve: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (p.strike, p.gamma_exposure))
        .collect();
    curve.sort_by(|a, b| a.0.total_cmp(&b.0));
    curve
}
