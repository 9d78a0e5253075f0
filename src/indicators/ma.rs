// =============================================================================
// Simple Moving Averages
// =============================================================================
//
//   MA_P[i] = mean(close[i - P + 1 ..= i])
//
// One output series per requested period.  A series shorter than P yields an
// all-undefined result instead of an error.

use tracing::trace;

use super::rolling::rolling_mean;
use super::set::IndicatorSeries;
use crate::error::{AnalysisError, AnalysisResult};

/// Moving average of `closes` over `period`.
pub fn calculate_ma(closes: &[f64], period: usize) -> AnalysisResult<IndicatorSeries> {
    if period == 0 {
        return Err(AnalysisError::InvalidWindow {
            window: period,
            len: closes.len(),
        });
    }
    if closes.is_empty() {
        return Err(AnalysisError::EmptySeries);
    }
    if closes.len() < period {
        trace!(period, len = closes.len(), "MA: insufficient data");
        return Ok(IndicatorSeries::undefined(closes.len()));
    }
    rolling_mean(closes, period)
}

/// Moving averages for every period in `periods`, returned in the same order.
pub fn calculate_mas(
    closes: &[f64],
    periods: &[usize],
) -> AnalysisResult<Vec<(usize, IndicatorSeries)>> {
    periods
        .iter()
        .map(|&p| calculate_ma(closes, p).map(|s| (p, s)))
        .collect()
}

/// Conventional series name for a moving average, e.g. `MA20`.
pub fn ma_name(period: usize) -> String {
    format!("MA{period}")
}
