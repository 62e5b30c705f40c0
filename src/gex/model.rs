//! Black-Scholes gamma exposure re-pricing.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::gex::dataset::OptionRight;
use crate::gex::normal::norm_pdf;

/// Contract size applied to every re-priced option.
pub const CONTRACT_SIZE: f64 = 100.0;

/// Scale that expresses exposure per 1% move of the underlying.
pub const ONE_PERCENT: f64 = 0.01;

/// Closed form used for put gamma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PutGammaFormula {
    /// `K·e^{-rT}·φ(d2) / (S²·σ·√T)`, numerically matching existing charts.
    #[default]
    Reference,
    /// Same gamma as the call, `e^{-qT}·φ(d1) / (S·σ·√T)`.
    Textbook,
}

/// Gamma exposure model with fixed rate and dividend yield.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GammaModel {
    /// Annualized risk-free rate.
    pub rate: f64,
    /// Annualized continuous dividend yield.
    pub dividend_yield: f64,
    /// Put gamma closed form.
    pub put_formula: PutGammaFormula,
}

impl GammaModel {
    /// Creates a model.
    #[must_use]
    pub fn new(rate: f64, dividend_yield: f64, put_formula: PutGammaFormula) -> Self {
        Self {
            rate,
            dividend_yield,
            put_formula,
        }
    }

    /// Unsigned gamma exposure of `open_interest` contracts at `spot`.
    #[must_use]
    pub fn exposure(
        &self,
        spot: f64,
        strike: f64,
        vol: f64,
        years: f64,
        right: OptionRight,
        open_interest: f64,
    ) -> f64 {
        let gamma = self.gamma(spot, strike, vol, years, right);
        open_interest * CONTRACT_SIZE * spot * spot * ONE_PERCENT * gamma
    }

    /// Unit Black-Scholes gamma. Zero when time or volatility is zero.
    #[must_use]
    pub fn gamma(&self, spot: f64, strike: f64, vol: f64, years: f64, right: OptionRight) -> f64 {
        if years == 0.0 || vol == 0.0 || spot <= 0.0 || strike <= 0.0 {
            return 0.0;
        }

        let vol_sqrt_t = vol * years.sqrt();
        let d1 = ((spot / strike).ln()
            + (self.rate - self.dividend_yield + 0.5 * vol * vol) * years)
            / vol_sqrt_t;

        match (right, self.put_formula) {
            (OptionRight::Put, PutGammaFormula::Reference) => {
                let d2 = d1 - vol_sqrt_t;
                strike * (-self.rate * years).exp() * norm_pdf(d2) / (spot * spot * vol_sqrt_t)
            }
            _ => (-self.dividend_yield * years).exp() * norm_pdf(d1) / (spot * vol_sqrt_t),
        }
    }
}

/// Unsigned gamma exposure for one strike and side.
///
/// Uses the reference put formula; build a [`GammaModel`] to choose otherwise.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn price_gamma_exposure(
    spot: f64,
    strike: f64,
    vol: f64,
    years: f64,
    rate: f64,
    dividend_yield: f64,
    right: OptionRight,
    open_interest: f64,
) -> f64 {
    GammaModel::new(rate, dividend_yield, PutGammaFormula::Reference)
        .exposure(spot, strike, vol, years, right, open_interest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_vol_or_time_is_exactly_zero() {
        for right in [OptionRight::Call, OptionRight::Put] {
            assert_eq!(
                price_gamma_exposure(100.0, 95.0, 0.0, 0.25, 0.05, 0.01, right, 1000.0),
                0.0
            );
            assert_eq!(
                price_gamma_exposure(100.0, 95.0, 0.3, 0.0, 0.05, 0.01, right, 1000.0),
                0.0
            );
        }
    }

    #[test]
    fn test_call_gamma_matches_closed_form() {
        let model = GammaModel::default();
        let (s, k, vol, t) = (100.0_f64, 100.0_f64, 0.2_f64, 0.25_f64);
        let d1 = 0.5 * vol * t.sqrt();
        let expected = norm_pdf(d1) / (s * vol * t.sqrt());
        let gamma = model.gamma(s, k, vol, t, OptionRight::Call);
        assert!((gamma - expected).abs() < 1e-15);
        // ATM quarter-year 20% vol gamma is about 0.0399.
        assert!((gamma - 0.0399).abs() < 1e-3);
    }

    #[test]
    fn test_exposure_scaling() {
        let model = GammaModel::default();
        let gamma = model.gamma(100.0, 100.0, 0.2, 0.25, OptionRight::Call);
        let exposure = model.exposure(100.0, 100.0, 0.2, 0.25, OptionRight::Call, 10.0);
        assert!((exposure - 10.0 * 100.0 * 100.0 * 100.0 * 0.01 * gamma).abs() < 1e-9);
    }

    #[test]
    fn test_put_formulas_agree_with_zero_carry() {
        let reference = GammaModel::new(0.0, 0.0, PutGammaFormula::Reference);
        let textbook = GammaModel::new(0.0, 0.0, PutGammaFormula::Textbook);
        for strike in [80.0, 100.0, 125.0] {
            let a = reference.gamma(100.0, strike, 0.35, 30.0 / 252.0, OptionRight::Put);
            let b = textbook.gamma(100.0, strike, 0.35, 30.0 / 252.0, OptionRight::Put);
            assert!((a - b).abs() / b < 1e-9, "strike {strike}: {a} vs {b}");
        }
    }

    #[test]
    fn test_put_formulas_agree_with_carry() {
        // K·e^{-rT}·φ(d2) = S·e^{-qT}·φ(d1), so the forms differ only by
        // floating point rounding.
        let reference = GammaModel::new(0.05, 0.03, PutGammaFormula::Reference);
        let textbook = GammaModel::new(0.05, 0.03, PutGammaFormula::Textbook);
        let a = reference.gamma(100.0, 110.0, 0.3, 1.0, OptionRight::Put);
        let b = textbook.gamma(100.0, 110.0, 0.3, 1.0, OptionRight::Put);
        assert!((a - b).abs() / b < 1e-9);
        assert_eq!(b, textbook.gamma(100.0, 110.0, 0.3, 1.0, OptionRight::Call));
    }

    #[test]
    fn test_non_positive_prices_yield_zero() {
        let model = GammaModel::default();
        assert_eq!(model.gamma(0.0, 100.0, 0.2, 0.5, OptionRight::Call), 0.0);
        assert_eq!(model.gamma(100.0, 0.0, 0.2, 0.5, OptionRight::Put), 0.0);
    }
}
