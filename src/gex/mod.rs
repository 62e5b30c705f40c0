//! Gamma exposure core.
//!
//! Ingestion runs [`payload`] (format detection and the validating parse)
//! into [`aggregate`], which produces an immutable [`ProcessedDataset`].
//! Views are derived from a dataset on demand:
//!
//! - [`filter`]: expiration subset plus strike window, re-aggregated by strike.
//! - [`profile`]: Black-Scholes re-pricing across hypothetical spot levels.
//! - [`flip`]: sign changes on either kind of curve.
//!
//! Everything in this module is synchronous and free of shared state.

pub mod aggregate;
pub mod calendar;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod flip;
pub mod model;
pub mod normal;
pub mod payload;
pub mod profile;
pub mod symbol;

pub use aggregate::{Aggregation, aggregate, process_payload};
pub use dataset::{
    NormalizedStrikePoint, OptionRight, PayloadFormat, ProcessedDataset, StrikeWindow,
};
pub use error::{GexError, SymbolDecodeError, SymbolDecodeWarning};
pub use filter::{exposure_curve, select_strikes};
pub use flip::{interpolate_flip, strike_crossings};
pub use model::{GammaModel, PutGammaFormula};
pub use profile::{GammaProfile, GammaProfilePoint, ProfileBuilder};
pub use symbol::{DecodedSymbol, decode_option_symbol};
