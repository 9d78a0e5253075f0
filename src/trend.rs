// =============================================================================
// Trend Classification
// =============================================================================
//
// Labels the short- and medium-term trend from the latest close and two moving
// averages.
//
// Decision rule:
//   short term  = UP       if close > MA_short    else DOWN
//   medium term = BULLISH  if MA_short > MA_long  else BEARISH

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::indicators::{ma_name, IndicatorSeries, IndicatorSet};

/// Close relative to the short moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortTerm {
    Up,
    Down,
}

/// Short moving average relative to the long one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediumTerm {
    Bullish,
    Bearish,
}

impl std::fmt::Display for ShortTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
        }
    }
}

impl std::fmt::Display for MediumTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "BULLISH"),
            Self::Bearish => write!(f, "BEARISH"),
        }
    }
}

/// Trend state at the latest bar.  Recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendLabel {
    pub short_term: ShortTerm,
    pub medium_term: MediumTerm,
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.short_term, self.medium_term)
    }
}

/// Classify the trend at the final position.
///
/// # Errors
/// - `EmptySeries` when `closes` is empty
/// - `InsufficientHistory` when either moving average is undefined at the
///   final position
pub fn classify_trend(
    closes: &[f64],
    ma_short: &IndicatorSeries,
    ma_long: &IndicatorSeries,
) -> AnalysisResult<TrendLabel> {
    let close = *closes.last().ok_or(AnalysisError::EmptySeries)?;

    let undefined = |what: &str| {
        AnalysisError::insufficient_history(format!("{what} MA undefined at last position"))
    };
    let short = ma_short.last().ok_or_else(|| undefined("short"))?;
    let long = ma_long.last().ok_or_else(|| undefined("long"))?;

    let short_term = if close > short {
        ShortTerm::Up
    } else {
        ShortTerm::Down
    };
    let medium_term = if short > long {
        MediumTerm::Bullish
    } else {
        MediumTerm::Bearish
    };

    debug!(close, ma_short = short, ma_long = long, %short_term, %medium_term, "trend classified");

    Ok(TrendLabel {
        short_term,
        medium_term,
    })
}

/// Classify using the `MA{short}` / `MA{long}` entries of an indicator set.
pub fn classify_from_set(
    set: &IndicatorSet,
    closes: &[f64],
    short_period: usize,
    long_period: usize,
) -> AnalysisResult<TrendLabel> {
    let lookup = |period: usize| {
        set.get(&ma_name(period)).ok_or_else(|| {
            AnalysisError::insufficient_history(format!("{} not computed", ma_name(period)))
        })
    };
    classify_trend(closes, lookup(short_period)?, lookup(long_period)?)
}
