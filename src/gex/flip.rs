//! Sign-change detection on gamma curves.
//!
//! Inputs are `(x, gamma)` pairs ordered by ascending `x`. Zero counts as
//! non-negative.

fn straddles(a: f64, b: f64) -> bool {
    (a < 0.0) != (b < 0.0)
}

/// The `x` value immediately preceding every sign change.
#[must_use]
pub fn strike_crossings(curve: &[(f64, f64)]) -> Vec<f64> {
    curve
        .windows(2)
        .filter(|pair| straddles(pair[0].1, pair[1].1))
        .map(|pair| pair[0].0)
        .collect()
}

/// Linearly interpolated zero crossing of the first sign change.
#[must_use]
pub fn interpolate_flip(curve: &[(f64, f64)]) -> Option<f64> {
    curve.windows(2).find_map(|pair| {
        let (neg_x, neg_gamma) = pair[0];
        let (pos_x, pos_gamma) = pair[1];
        if !straddles(neg_gamma, pos_gamma) || pos_gamma == neg_gamma {
            return None;
        }
        Some(pos_x - (pos_x - neg_x) * pos_gamma / (pos_gamma - neg_gamma))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_simple_crossing() {
        let flip = interpolate_flip(&[(100.0, -5.0), (110.0, 3.0)]).unwrap();
        assert!((flip - 106.25).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_positive_to_negative() {
        let flip = interpolate_flip(&[(100.0, 4.0), (110.0, -4.0)]).unwrap();
        assert!((flip - 105.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_returns_first_crossing_only() {
        let curve = [
            (90.0, -2.0),
            (100.0, -1.0),
            (110.0, 1.0),
            (120.0, -1.0),
            (130.0, 2.0),
        ];
        let flip = interpolate_flip(&curve).unwrap();
        assert!((flip - 105.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_zero_is_non_negative() {
        // -2 -> 0 is a sign change that lands exactly on the second point.
        let flip = interpolate_flip(&[(100.0, -2.0), (110.0, 0.0)]).unwrap();
        assert_eq!(flip, 110.0);
        // 0 -> 3 is not.
        assert_eq!(interpolate_flip(&[(100.0, 0.0), (110.0, 3.0)]), None);
    }

    #[test]
    fn test_no_crossing() {
        assert_eq!(interpolate_flip(&[(100.0, 1.0), (110.0, 3.0)]), None);
        assert_eq!(interpolate_flip(&[(100.0, -1.0)]), None);
        assert_eq!(interpolate_flip(&[]), None);
        assert!(strike_crossings(&[(100.0, -1.0), (110.0, -3.0)]).is_empty());
    }

    #[test]
    fn test_strike_crossings_reports_all() {
        let curve = [
            (90.0, -2.0),
            (100.0, -1.0),
            (110.0, 1.0),
            (120.0, -1.0),
            (130.0, 0.0),
        ];
        assert_eq!(strike_crossings(&curve), vec![100.0, 110.0, 120.0]);
    }
}
