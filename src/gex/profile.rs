//! Gamma exposure profile across hypothetical spot levels.
//!
//! Every point with usable open interest and implied volatility on a side is
//! re-priced at each spot level. Three curves are accumulated per level: all
//! expirations, excluding the nearest expiration, and excluding the nearest
//! monthly (third Friday) expiration. The whole computation is re-run on
//! every call.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;
use utoipa::ToSchema;

use crate::gex::aggregate::BILLION;
use crate::gex::calendar::{
    TRADING_DAYS_PER_YEAR, is_monthly_expiration, parse_expiration, time_to_expiry_years,
};
use crate::gex::dataset::{NormalizedStrikePoint, OptionRight, StrikeWindow};
use crate::gex::error::GexError;
use crate::gex::flip::interpolate_flip;
use crate::gex::model::GammaModel;

/// Default number of spot levels.
pub const DEFAULT_LEVELS: usize = 30;

/// Hard ceiling on spot levels, whatever the builder allows.
pub const MAX_LEVELS: usize = 100_000;

/// Aggregate gamma at one hypothetical spot, in billions per 1% move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GammaProfilePoint {
    /// Hypothetical underlying price.
    pub spot: f64,
    /// All expirations.
    pub total_gamma: f64,
    /// Excluding the nearest expiration.
    pub ex_next_expiry: f64,
    /// Excluding the nearest monthly expiration.
    pub ex_next_monthly: f64,
}

/// A computed profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GammaProfile {
    /// Points in ascending spot order.
    pub points: Vec<GammaProfilePoint>,
    /// Interpolated zero crossing of the total curve.
    pub flip_point: Option<f64>,
    /// Earliest expiration present among the points.
    pub nearest_expiration: Option<String>,
    /// Earliest third-Friday expiration present among the points.
    pub nearest_monthly_expiration: Option<String>,
}

impl GammaProfile {
    /// `(spot, total_gamma)` pairs.
    #[must_use]
    pub fn total_curve(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.spot, p.total_gamma)).collect()
    }
}

/// One side of one point, ready for re-pricing.
struct PricingLeg {
    strike: f64,
    vol: f64,
    open_interest: f64,
    years: f64,
    right: OptionRight,
    expiration: NaiveDate,
}

/// Builds gamma profiles with a fixed model and level count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileBuilder {
    model: GammaModel,
    levels: usize,
    max_levels: usize,
    days_per_year: f64,
}

impl ProfileBuilder {
    /// Creates a builder with [`DEFAULT_LEVELS`] levels.
    #[must_use]
    pub fn new(model: GammaModel) -> Self {
        Self {
            model,
            levels: DEFAULT_LEVELS,
            max_levels: MAX_LEVELS,
            days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }

    /// Overrides the number of spot levels.
    #[must_use]
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    /// Caps the accepted level count, never above [`MAX_LEVELS`].
    #[must_use]
    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels.min(MAX_LEVELS);
        self
    }

    /// Number of spot levels.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Largest accepted level count.
    #[must_use]
    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Computes the profile of `points` over `window` as of `as_of`.
    ///
    /// # Errors
    /// `GexError::InvalidLevels` when fewer than two levels are configured,
    /// `GexError::TooManyLevels` when more than the cap are.
    pub fn build(
        &self,
        points: &[NormalizedStrikePoint],
        window: StrikeWindow,
        as_of: NaiveDate,
    ) -> Result<GammaProfile, GexError> {
        if self.levels > self.max_levels {
            return Err(GexError::TooManyLevels {
                requested: self.levels,
                max: self.max_levels,
            });
        }
        let levels = spot_levels(window, self.levels)?;

        let mut expirations: BTreeMap<NaiveDate, &str> = BTreeMap::new();
        let mut legs = Vec::new();
        for point in points {
            let Some(raw) = point.expiration.as_deref() else {
                continue;
            };
            let Some(expiration) = parse_expiration(raw) else {
                debug!("Skipping point at strike {} with expiration {}", point.strike, raw);
                continue;
            };
            expirations.entry(expiration).or_insert(raw);

            let years = time_to_expiry_years(as_of, expiration, self.days_per_year);
            for right in [OptionRight::Call, OptionRight::Put] {
                if let Some((open_interest, vol)) = point.pricing_inputs(right) {
                    legs.push(PricingLeg {
                        strike: point.strike,
                        vol,
                        open_interest,
                        years,
                        right,
                        expiration,
                    });
                }
            }
        }

        let nearest = expirations.keys().next().copied();
        let nearest_monthly = expirations
            .keys()
            .find(|date| is_monthly_expiration(**date))
            .copied();

        let profile_points: Vec<GammaProfilePoint> = levels
            .into_iter()
            .map(|spot| {
                let mut total = 0.0;
                let mut ex_next = 0.0;
                let mut ex_monthly = 0.0;
                for leg in &legs {
                    let exposure = leg.right.signed(self.model.exposure(
                        spot,
                        leg.strike,
                        leg.vol,
                        leg.years,
                        leg.right,
                        leg.open_interest,
                    ));
                    total += exposure;
                    if Some(leg.expiration) != nearest {
                        ex_next += exposure;
                    }
                    if Some(leg.expiration) != nearest_monthly {
                        ex_monthly += exposure;
                    }
                }
                GammaProfilePoint {
                    spot,
                    total_gamma: total / BILLION,
                    ex_next_expiry: ex_next / BILLION,
                    ex_next_monthly: ex_monthly / BILLION,
                }
            })
            .collect();

        let curve: Vec<(f64, f64)> = profile_points
            .iter()
            .map(|p| (p.spot, p.total_gamma))
            .collect();
        let flip_point = interpolate_flip(&curve);

        debug!(
            "Built gamma profile: {} levels, {} legs, flip {:?}",
            profile_points.len(),
            legs.len(),
            flip_point
        );

        Ok(GammaProfile {
            points: profile_points,
            flip_point,
            nearest_expiration: nearest.and_then(|d| expirations.get(&d)).map(|s| s.to_string()),
            nearest_monthly_expiration: nearest_monthly
                .and_then(|d| expirations.get(&d))
                .map(|s| s.to_string()),
        })
    }
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self::new(GammaModel::default())
    }
}

/// `count` evenly spaced levels spanning `window`, both ends included.
///
/// # Errors
/// `GexError::InvalidLevels` when `count < 2`, `GexError::TooManyLevels`
/// when `count` exceeds [`MAX_LEVELS`].
pub fn spot_levels(window: StrikeWindow, count: usize) -> Result<Vec<f64>, GexError> {
    if count < 2 {
        return Err(GexError::InvalidLevels(count));
    }
    if count > MAX_LEVELS {
        return Err(GexError::TooManyLevels {
            requested: count,
            max: MAX_LEVELS,
        });
    }
    let step = (window.max - window.min) / (count - 1) as f64;
    Ok((0..count)
        .map(|i| {
            if i == count - 1 {
                window.max
            } else {
                window.min + step * i as f64
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        // Monday.
        NaiveDate::from_ymd_opt(2025, 10, 27).unwrap()
    }

    fn point(strike: f64, expiration: &str) -> NormalizedStrikePoint {
        NormalizedStrikePoint::new(strike, Some(expiration.to_string()), 100.0)
    }

    fn call(strike: f64, expiration: &str, oi: f64, iv: f64) -> NormalizedStrikePoint {
        let mut p = point(strike, expiration);
        p.call_open_interest = Some(oi);
        p.call_iv = Some(iv);
        p
    }

    fn put(strike: f64, expiration: &str, oi: f64, iv: f64) -> NormalizedStrikePoint {
        let mut p = point(strike, expiration);
        p.put_open_interest = Some(oi);
        p.put_iv = Some(iv);
        p
    }

    fn window() -> StrikeWindow {
        StrikeWindow::new(80.0, 120.0).unwrap()
    }

    #[test]
    fn test_spot_levels_span_window() {
        let levels = spot_levels(window(), 5).unwrap();
        assert_eq!(levels, vec![80.0, 90.0, 100.0, 110.0, 120.0]);

        let levels = spot_levels(window(), DEFAULT_LEVELS).unwrap();
        assert_eq!(levels.len(), 30);
        assert_eq!(levels[0], 80.0);
        assert_eq!(levels[29], 120.0);
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_spot_levels_rejects_degenerate_counts() {
        assert!(matches!(
            spot_levels(window(), 1),
            Err(GexError::InvalidLevels(1))
        ));
        assert!(matches!(
            spot_levels(window(), 0),
            Err(GexError::InvalidLevels(0))
        ));
        let builder = ProfileBuilder::default().with_levels(1);
        assert!(builder.build(&[], window(), as_of()).is_err());
    }

    #[test]
    fn test_spot_levels_rejects_oversized_counts() {
        assert!(matches!(
            spot_levels(window(), usize::MAX),
            Err(GexError::TooManyLevels { requested: usize::MAX, max: MAX_LEVELS })
        ));
        assert!(matches!(
            spot_levels(window(), MAX_LEVELS + 1),
            Err(GexError::TooManyLevels { .. })
        ));
        assert_eq!(spot_levels(window(), MAX_LEVELS).unwrap().len(), MAX_LEVELS);

        let builder = ProfileBuilder::default()
            .with_max_levels(50)
            .with_levels(51);
        assert!(matches!(
            builder.build(&[], window(), as_of()),
            Err(GexError::TooManyLevels { requested: 51, max: 50 })
        ));
        let at_cap = builder.with_levels(50).build(&[], window(), as_of()).unwrap();
        assert_eq!(at_cap.points.len(), 50);

        assert_eq!(
            ProfileBuilder::default().with_max_levels(usize::MAX).max_levels(),
            MAX_LEVELS
        );
    }

    #[test]
    fn test_call_only_profile_is_positive_without_flip() {
        let points = vec![call(100.0, "2025-11-21", 1000.0, 0.3)];
        let profile = ProfileBuilder::default().build(&points, window(), as_of()).unwrap();
        assert_eq!(profile.points.len(), DEFAULT_LEVELS);
        assert!(profile.points.iter().all(|p| p.total_gamma > 0.0));
        assert_eq!(profile.flip_point, None);
    }

    #[test]
    fn test_put_below_call_above_flips_between() {
        let points = vec![
            put(90.0, "2025-11-21", 1000.0, 0.25),
            call(110.0, "2025-11-21", 1000.0, 0.25),
        ];
        let profile = ProfileBuilder::default().build(&points, window(), as_of()).unwrap();
        assert!(profile.points[0].total_gamma < 0.0);
        assert!(profile.points[DEFAULT_LEVELS - 1].total_gamma > 0.0);
        let flip = profile.flip_point.unwrap();
        assert!(flip > 90.0 && flip < 110.0, "flip {flip}");
    }

    #[test]
    fn test_excluded_curves() {
        // 2025-10-31 is the nearest expiration, 2025-11-21 the nearest monthly.
        let near = call(100.0, "2025-10-31", 500.0, 0.3);
        let monthly = call(105.0, "2025-11-21", 700.0, 0.3);
        let far = put(95.0, "2025-12-19", 300.0, 0.3);
        let builder = ProfileBuilder::default().with_levels(7);

        let all = builder
            .build(&[near.clone(), monthly.clone(), far.clone()], window(), as_of())
            .unwrap();
        let without_near = builder
            .build(&[monthly.clone(), far.clone()], window(), as_of())
            .unwrap();
        let without_monthly = builder
            .build(&[near.clone(), far.clone()], window(), as_of())
            .unwrap();

        assert_eq!(all.nearest_expiration.as_deref(), Some("2025-10-31"));
        assert_eq!(all.nearest_monthly_expiration.as_deref(), Some("2025-11-21"));
        for i in 0..7 {
            assert_eq!(all.points[i].ex_next_expiry, without_near.points[i].total_gamma);
            assert_eq!(all.points[i].ex_next_monthly, without_monthly.points[i].total_gamma);
        }
    }

    #[test]
    fn test_no_monthly_expiration_keeps_total() {
        let points = vec![
            call(100.0, "2025-10-31", 500.0, 0.3),
            put(100.0, "2025-11-07", 500.0, 0.3),
        ];
        let profile = ProfileBuilder::default().build(&points, window(), as_of()).unwrap();
        assert_eq!(profile.nearest_monthly_expiration, None);
        for p in &profile.points {
            assert_eq!(p.ex_next_monthly, p.total_gamma);
        }
    }

    #[test]
    fn test_ineligible_points_contribute_nothing() {
        let mut zero_iv = call(100.0, "2025-11-21", 500.0, 0.0);
        zero_iv.put_open_interest = Some(0.0);
        zero_iv.put_iv = Some(0.4);
        let legacy = NormalizedStrikePoint::new(100.0, None, 100.0);
        let profile = ProfileBuilder::default()
            .build(&[zero_iv, legacy], window(), as_of())
            .unwrap();
        assert!(profile.points.iter().all(|p| p.total_gamma == 0.0));
        assert_eq!(profile.flip_point, None);
    }

    #[test]
    fn test_matches_direct_model_evaluation() {
        let points = vec![call(100.0, "2025-10-31", 1000.0, 0.3)];
        let profile = ProfileBuilder::default()
            .with_levels(3)
            .build(&points, window(), as_of())
            .unwrap();
        // Monday to Friday inclusive is five business days.
        let years = 5.0 / 252.0;
        let expected = GammaModel::default().exposure(100.0, 100.0, 0.3, years, OptionRight::Call, 1000.0);
        assert!((profile.points[1].total_gamma - expected / 1e9).abs() < 1e-18);
    }

    #[test]
    fn test_build_is_reproducible() {
        let points = vec![
            put(90.0, "2025-11-21", 1000.0, 0.25),
            call(110.0, "2025-12-19", 800.0, 0.22),
        ];
        let builder = ProfileBuilder::default();
        let first = builder.build(&points, window(), as_of()).unwrap();
        let second = builder.build(&points, window(), as_of()).unwrap();
        assert_eq!(first, second);
    }
}
