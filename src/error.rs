// =============================================================================
// Analysis Errors
// =============================================================================
//
// Error taxonomy for the pure computation core.  Indicator functions that run
// over a too-short series do NOT return an error; they degrade to an
// all-undefined series.  Only parameter validation and scalar summaries that
// need a concrete "latest" value fail.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by the series store and the computation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Window / period / span is zero, or larger than the series where a hard
    /// failure is required.
    #[error("invalid window: {window} (series length {len})")]
    InvalidWindow { window: usize, len: usize },

    /// A derived label or statistic needs a value that is still in the
    /// undefined warm-up region.
    #[error("insufficient history: {what}")]
    InsufficientHistory { what: String },

    /// The operation was given a zero-length input.
    #[error("empty series")]
    EmptySeries,

    /// A non-window parameter is out of its valid range.
    #[error("invalid parameter: {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Dates must be strictly increasing within a series.
    #[error("date {date} at index {index} is not after the previous date")]
    NonIncreasingDate { index: usize, date: NaiveDate },

    /// Prices must be finite, and close must be strictly positive.
    #[error("invalid {field} price {value} at index {index}")]
    InvalidPrice {
        index: usize,
        field: &'static str,
        value: f64,
    },
}

impl AnalysisError {
    pub fn insufficient_history(what: impl Into<String>) -> Self {
        Self::InsufficientHistory { what: what.into() }
    }
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
