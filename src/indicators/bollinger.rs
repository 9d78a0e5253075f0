// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the rolling sample standard
// deviation of the closes.  All three bands share the SMA's warm-up region.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::rolling::{rolling_mean, rolling_std};
use super::set::IndicatorSeries;
use crate::error::{AnalysisError, AnalysisResult};

/// Band period and width multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerParams {
    #[serde(default = "default_period")]
    pub period: usize,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_period() -> usize {
    20
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: default_period(),
            multiplier: default_multiplier(),
        }
    }
}

/// Result of a Bollinger Band calculation.
#[derive(Debug, Clone)]
pub struct BollingerResult {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

/// Calculate Bollinger Bands for the given closing prices.
///
/// A series shorter than `period` yields three all-undefined bands.
pub fn calculate_bollinger(
    closes: &[f64],
    params: BollingerParams,
) -> AnalysisResult<BollingerResult> {
    let BollingerParams { period, multiplier } = params;
    if period == 0 {
        return Err(AnalysisError::InvalidWindow {
            window: period,
            len: closes.len(),
        });
    }
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(AnalysisError::InvalidParameter {
            name: "multiplier",
            value: multiplier,
        });
    }
    if closes.is_empty() {
        return Err(AnalysisError::EmptySeries);
    }
    if closes.len() < period {
        trace!(period, len = closes.len(), "Bollinger: insufficient data");
        let undefined = IndicatorSeries::undefined(closes.len());
        return Ok(BollingerResult {
            upper: undefined.clone(),
            middle: undefined.clone(),
            lower: undefined,
        });
    }

    let middle = rolling_mean(closes, period)?;
    let sigma = rolling_std(closes, period)?;

    let upper = middle.zip_with(&sigma, |m, s| m + multiplier * s);
    let lower = middle.zip_with(&sigma, |m, s| m - multiplier * s);

    Ok(BollingerResult {
        upper,
        middle,
        lower,
    })
}

/// Band width as a percentage of the middle band: `(upper - lower) / middle * 100`.
///
/// `None` when the middle band is zero.
pub fn band_width_pct(upper: f64, middle: f64, lower: f64) -> Option<f64> {
    if middle == 0.0 {
        return None;
    }
    Some((upper - lower) / middle * 100.0)
}

impl BollingerResult {
    /// [`band_width_pct`] at the latest position.
    pub fn latest_width_pct(&self) -> Option<f64> {
        band_width_pct(self.upper.last()?, self.middle.last()?, self.lower.last()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(period: usize, multiplier: f64) -> BollingerParams {
        BollingerParams { period, multiplier }
    }

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let bb = calculate_bollinger(&closes, BollingerParams::default()).unwrap();
        let (u, m, l) = (
            bb.upper.last().unwrap(),
            bb.middle.last().unwrap(),
            bb.lower.last().unwrap(),
        );
        assert!((m - 10.5).abs() < 1e-10);
        assert!(u > m && l < m);
        // sample σ of 1..=20 = sqrt(35)
        assert!((u - m - 2.0 * 35.0_f64.sqrt()).abs() < 1e-10);
        assert!(bb.latest_width_pct().unwrap() > 0.0);
    }

    #[test]
    fn bollinger_insufficient_data_is_undefined() {
        let bb = calculate_bollinger(&[1.0, 2.0, 3.0], BollingerParams::default()).unwrap();
        assert_eq!(bb.upper.len(), 3);
        assert_eq!(bb.middle.defined_count(), 0);
        assert_eq!(bb.lower.defined_count(), 0);
    }

    #[test]
    fn bollinger_flat_collapses_bands() {
        let bb = calculate_bollinger(&[100.0; 20], BollingerParams::default()).unwrap();
        assert!((bb.latest_width_pct().unwrap()).abs() < 1e-10);
    }

    #[test]
    fn bands_are_ordered_and_share_warmup() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 50.0 + (i as f64 * 0.7).cos() * 3.0)
            .collect();
        for m in [0.0, 0.5, 2.0, 3.5] {
            let bb = calculate_bollinger(&closes, params(10, m)).unwrap();
            assert_eq!(bb.upper.warmup_len(), 9);
            assert_eq!(bb.lower.warmup_len(), 9);
            for i in 9..closes.len() {
                let (u, mid, l) = (
                    bb.upper.get(i).unwrap(),
                    bb.middle.get(i).unwrap(),
                    bb.lower.get(i).unwrap(),
                );
                assert!(u >= mid && mid >= l);
            }
        }
    }

    #[test]
    fn width_is_relative_to_middle_band() {
        assert!((band_width_pct(110.0, 100.0, 90.0).unwrap() - 20.0).abs() < 1e-10);
        assert_eq!(band_width_pct(1.0, 0.0, -1.0), None);

        let bb = calculate_bollinger(&[1.0, 2.0, 3.0], BollingerParams::default()).unwrap();
        assert_eq!(bb.latest_width_pct(), None);
    }

    #[test]
    fn negative_multiplier_is_rejected() {
        assert!(matches!(
            calculate_bollinger(&[1.0; 30], params(20, -1.0)),
            Err(AnalysisError::InvalidParameter { name: "multiplier", .. })
        ));
    }
}
