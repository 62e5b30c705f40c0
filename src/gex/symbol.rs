//! Decoder for compact option identifiers.
//!
//! Format: `<ROOT><YYMMDD><C|P><STRIKE 8 digits>` where the strike is scaled
//! by 1000 and zero-padded, e.g. `CMG251031C00016000`.

use chrono::NaiveDate;

use crate::gex::dataset::OptionRight;
use crate::gex::error::SymbolDecodeError;

/// Length of the fixed date + right + strike suffix.
const SUFFIX_LEN: usize = 15;

/// Structured fields of a decoded identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSymbol {
    /// Root symbol preceding the suffix (may be empty).
    pub root: String,
    /// Strike price.
    pub strike: f64,
    /// Call or put.
    pub right: OptionRight,
    /// Expiration date, `YYYY-MM-DD`.
    pub expiration: String,
}

/// Decodes an encoded option identifier.
///
/// Two-digit years map to `2000 + YY`.
///
/// # Errors
/// Returns a [`SymbolDecodeError`] describing the first malformed segment.
pub fn decode_option_symbol(symbol: &str) -> Result<DecodedSymbol, SymbolDecodeError> {
    if !symbol.is_ascii() {
        return Err(SymbolDecodeError::NotAscii);
    }
    let len = symbol.len();
    if len < SUFFIX_LEN {
        return Err(SymbolDecodeError::TooShort(len));
    }

    let date_start = len - SUFFIX_LEN;
    let date_part = &symbol[date_start..date_start + 6];
    let right_char = symbol.as_bytes()[len - 9] as char;
    let strike_part = &symbol[len - 8..];

    let expiration = parse_yymmdd(date_part)
        .ok_or_else(|| SymbolDecodeError::InvalidDate(date_part.to_string()))?;

    let right = match right_char {
        'C' => OptionRight::Call,
        'P' => OptionRight::Put,
        other => return Err(SymbolDecodeError::InvalidRight(other)),
    };

    if !strike_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SymbolDecodeError::InvalidStrike(strike_part.to_string()));
    }
    let strike_mills: u32 = strike_part
        .parse()
        .map_err(|_| SymbolDecodeError::InvalidStrike(strike_part.to_string()))?;

    Ok(DecodedSymbol {
        root: symbol[..date_start].to_string(),
        strike: f64::from(strike_mills) / 1000.0,
        right,
        expiration: expiration.format("%Y-%m-%d").to_string(),
    })
}

fn parse_yymmdd(segment: &str) -> Option<NaiveDate> {
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let yy: i32 = segment[0..2].parse().ok()?;
    let mm: u32 = segment[2..4].parse().ok()?;
    let dd: u32 = segment[4..6].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + yy, mm, dd)
}
