//! Business-day arithmetic and expiration helpers.

use chrono::{Datelike, NaiveDate, Weekday};

/// Business days per year used to annualize time to expiry.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Parses an expiration in `YYYY-MM-DD` or `YYYYMMDD` form.
#[must_use]
pub fn parse_expiration(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
}

/// Counts weekdays in `[start, end]`, both endpoints included.
///
/// Returns 0 when `end` precedes `start`.
#[must_use]
pub fn business_days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 0;
    }
    let total_days = (end - start).num_days() + 1;
    let full_weeks = total_days / 7;
    let mut count = full_weeks * 5;

    let mut day = start + chrono::Duration::days(full_weeks * 7);
    while day <= end {
        if is_weekday(day) {
            count += 1;
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    count
}

/// Whether `date` is the standard monthly expiration: a Friday falling on
/// day 15 through 21.
#[must_use]
pub fn is_monthly_expiration(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Fri && (15..=21).contains(&date.day())
}

/// Annualized time to expiry from `as_of`, floored at one business day.
#[must_use]
pub fn time_to_expiry_years(as_of: NaiveDate, expiration: NaiveDate, days_per_year: f64) -> f64 {
    let days = business_days_inclusive(as_of, expiration).max(1);
    days as f64 / days_per_year
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
