// =============================================================================
// Moving Average Convergence / Divergence (MACD)
// =============================================================================
//
//   MACD      = EMA(close, fast) - EMA(close, slow)
//   Signal    = EMA(MACD, signal)
//   Histogram = MACD - Signal
//
// All three lines are full length: the underlying EMAs have no warm-up region.

use serde::{Deserialize, Serialize};

use super::ema::calculate_ema;
use super::set::IndicatorSeries;
use crate::error::AnalysisResult;

/// MACD spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    #[serde(default = "default_fast")]
    pub fast: usize,
    #[serde(default = "default_slow")]
    pub slow: usize,
    #[serde(default = "default_signal")]
    pub signal: usize,
}

fn default_fast() -> usize {
    12
}

fn default_slow() -> usize {
    26
}

fn default_signal() -> usize {
    9
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: default_fast(),
            slow: default_slow(),
            signal: default_signal(),
        }
    }
}

/// The three MACD output lines.
#[derive(Debug, Clone)]
pub struct MacdResult {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// Compute MACD over the full close-price series.
pub fn calculate_macd(closes: &[f64], params: MacdParams) -> AnalysisResult<MacdResult> {
    let fast = calculate_ema(closes, params.fast)?;
    let slow = calculate_ema(closes, params.slow)?;

    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = calculate_ema(&macd, params.signal)?;
    let histogram: Vec<f64> = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    Ok(MacdResult {
        macd: IndicatorSeries::from_defined(macd),
        signal: IndicatorSeries::from_defined(signal),
        histogram: IndicatorSeries::from_defined(histogram),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn wavy(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn full_length_without_warmup() {
        let closes = wavy(40);
        let r = calculate_macd(&closes, MacdParams::default()).unwrap();
        for s in [&r.macd, &r.signal, &r.histogram] {
            assert_eq!(s.len(), 40);
            assert_eq!(s.defined_count(), 40);
        }
    }

    #[test]
    fn histogram_is_exactly_macd_minus_signal() {
        let closes = wavy(120);
        let r = calculate_macd(&closes, MacdParams::default()).unwrap();
        for i in 0..closes.len() {
            let (m, s, h) = (
                r.macd.get(i).unwrap(),
                r.signal.get(i).unwrap(),
                r.histogram.get(i).unwrap(),
            );
            assert_eq!(h, m - s);
        }
    }

    #[test]
    fn first_position_is_zero() {
        // Both EMAs are seeded with close[0].
        let r = calculate_macd(&wavy(10), MacdParams::default()).unwrap();
        assert_eq!(r.macd.get(0), Some(0.0));
        assert_eq!(r.signal.get(0), Some(0.0));
        assert_eq!(r.histogram.get(0), Some(0.0));
    }

    #[test]
    fn known_value_at_second_position() {
        // fast alpha = 2/13, slow alpha = 2/27, diff at i=1 = (a_f - a_s) * (c1 - c0)
        let closes = [10.0, 20.0];
        let r = calculate_macd(&closes, MacdParams::default()).unwrap();
        let expected = (2.0 / 13.0 - 2.0 / 27.0) * 10.0;
        assert!((r.macd.get(1).unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn rising_series_has_positive_macd() {
        let closes: Vec<f64> = (1..=60).map(|x| x as f64).collect();
        let r = calculate_macd(&closes, MacdParams::default()).unwrap();
        assert!(r.macd.last().unwrap() > 0.0);
    }

    #[test]
    fn zero_span_is_invalid() {
        let params = MacdParams {
            signal: 0,
            ..MacdParams::default()
        };
        assert!(matches!(
            calculate_macd(&wavy(10), params),
            Err(AnalysisError::InvalidWindow { window: 0, .. })
        ));
    }

    #[test]
    fn params_deserialise_with_defaults() {
        let p: MacdParams = serde_json::from_str(r#"{ "fast": 5 }"#).unwrap();
        assert_eq!(p, MacdParams { fast: 5, slow: 26, signal: 9 });
    }
}
