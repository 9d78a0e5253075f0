// =============================================================================
// Rolling-Window Engine
// =============================================================================
//
// Sliding-window reductions over a numeric series:
//
//   R[i] = undefined                         for i < W - 1
//   R[i] = reduce(S[i - W + 1 ..= i])        for i >= W - 1
//
// Standard deviation uses the sample convention (divisor W - 1).  With W == 1
// the sample deviation has no degrees of freedom, so every slot is undefined.

use tracing::trace;

use super::set::IndicatorSeries;
use crate::error::{AnalysisError, AnalysisResult};

/// Rolling arithmetic mean over `window` values.
///
/// # Errors
/// - `InvalidWindow` when `window == 0` or `window > values.len()`
/// - `EmptySeries` when `values` is empty
pub fn rolling_mean(values: &[f64], window: usize) -> AnalysisResult<IndicatorSeries> {
    rolling_reduce(values, window, mean)
}

/// Rolling sample standard deviation (divisor `window - 1`).
///
/// Same error conditions as [`rolling_mean`].
pub fn rolling_std(values: &[f64], window: usize) -> AnalysisResult<IndicatorSeries> {
    rolling_reduce(values, window, sample_std)
}

/// Apply `reduce` to every full window.  `reduce` may return `None` when the
/// window has no defined statistic.
pub fn rolling_reduce(
    values: &[f64],
    window: usize,
    reduce: impl Fn(&[f64]) -> Option<f64>,
) -> AnalysisResult<IndicatorSeries> {
    check_window(window, values.len())?;

    let mut out = Vec::with_capacity(values.len());
    out.extend(std::iter::repeat(None).take(window - 1));
    out.extend(values.windows(window).map(|w| reduce(w)));

    Ok(IndicatorSeries::new(out))
}

/// Validate a window against a series length.
pub(crate) fn check_window(window: usize, len: usize) -> AnalysisResult<()> {
    if window == 0 {
        return Err(AnalysisError::InvalidWindow { window, len });
    }
    if len == 0 {
        return Err(AnalysisError::EmptySeries);
    }
    if window > len {
        trace!(window, len, "rolling window longer than series");
        return Err(AnalysisError::InvalidWindow { window, len });
    }
    Ok(())
}

/// Arithmetic mean of a non-empty slice.
pub(crate) fn mean(w: &[f64]) -> Option<f64> {
    if w.is_empty() {
        return None;
    }
    Some(w.iter().sum::<f64>() / w.len() as f64)
}

/// Sample standard deviation; `None` for fewer than two values.
pub(crate) fn sample_std(w: &[f64]) -> Option<f64> {
    if w.len() < 2 {
        return None;
    }
    let m = mean(w)?;
    let variance = w.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (w.len() - 1) as f64;
    Some(variance.sqrt())
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const CLOSES: [f64; 10] = [10.0, 11.0, 12.0, 11.0, 10.0, 9.0, 10.0, 11.0, 12.0, 13.0];

    // ---- rolling_mean ----------------------------------------------------

    #[test]
    fn mean_period_three_known_values() {
        let ma = rolling_mean(&CLOSES, 3).unwrap();
        assert_eq!(ma.len(), 10);
        assert_eq!(ma.get(0), None);
        assert_eq!(ma.get(1), None);
        assert!((ma.get(2).unwrap() - 11.0).abs() < 1e-10);
        assert!((ma.last().unwrap() - 12.0).abs() < 1e-10);
    }

    #[test]
    fn mean_warmup_length_matches_window() {
        for window in 1..=CLOSES.len() {
            let ma = rolling_mean(&CLOSES, window).unwrap();
            assert_eq!(ma.warmup_len(), window - 1);
            assert_eq!(ma.defined_count(), CLOSES.len() - window + 1);
        }
    }

    #[test]
    fn mean_does_not_mutate_input() {
        let input = CLOSES.to_vec();
        let _ = rolling_mean(&input, 4).unwrap();
        assert_eq!(input, CLOSES.to_vec());
    }

    #[test]
    fn window_zero_is_invalid() {
        assert_eq!(
            rolling_mean(&CLOSES, 0).unwrap_err(),
            AnalysisError::InvalidWindow { window: 0, len: 10 }
        );
    }

    #[test]
    fn window_longer_than_series_is_invalid() {
        assert_eq!(
            rolling_mean(&CLOSES, 11).unwrap_err(),
            AnalysisError::InvalidWindow { window: 11, len: 10 }
        );
    }

    #[test]
    fn empty_input_is_reported() {
        assert_eq!(rolling_mean(&[], 3).unwrap_err(), AnalysisError::EmptySeries);
    }

    // ---- rolling_std -----------------------------------------------------

    #[test]
    fn std_uses_sample_divisor() {
        // [2, 4, 4, 4, 5, 5, 7, 9]: population σ = 2, sample σ = sqrt(32/7)
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sd = rolling_std(&data, 8).unwrap();
        assert!((sd.last().unwrap() - (32.0_f64 / 7.0).sqrt()).abs() < 1e-10);
    }

    #[test]
    fn std_of_flat_window_is_zero() {
        let sd = rolling_std(&[5.0; 6], 3).unwrap();
        for i in 2..6 {
            assert!(sd.get(i).unwrap().abs() < 1e-12);
        }
    }

    #[test]
    fn std_window_one_is_undefined_everywhere() {
        let sd = rolling_std(&CLOSES, 1).unwrap();
        assert_eq!(sd.len(), CLOSES.len());
        assert_eq!(sd.defined_count(), 0);
    }
}
