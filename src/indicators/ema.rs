// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha = 2 / (span + 1)
//   EMA_0 = close_0
//   EMA_t = close_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The series is seeded with the first value itself, not with the SMA of the
// first `span` values.  MACD output depends on this seeding.  Every position
// carries a value; there is no warm-up region.
// =============================================================================

use crate::error::{AnalysisError, AnalysisResult};

/// Compute the EMA series for `values` with smoothing span `span`.
///
/// The output has the same length as the input.
///
/// # Errors
/// - `span == 0` => `InvalidWindow`
/// - empty input => `EmptySeries`
pub fn calculate_ema(values: &[f64], span: usize) -> AnalysisResult<Vec<f64>> {
    if span == 0 {
        return Err(AnalysisError::InvalidWindow {
            window: span,
            len: values.len(),
        });
    }
    let Some(&seed) = values.first() else {
        return Err(AnalysisError::EmptySeries);
    };

    let alpha = 2.0 / (span as f64 + 1.0);

    let mut result = Vec::with_capacity(values.len());
    let mut prev = seed;
    result.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        result.push(prev);
    }

    Ok(result)
}
