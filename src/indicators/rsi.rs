// =============================================================================
// Relative Strength Index (RSI) — simple rolling averages
// =============================================================================
//
// Step 1 — Deltas: delta[i] = close[i] - close[i-1]; delta[0] is undefined.
// Step 2 — gain = max(delta, 0), loss = max(-delta, 0).
// Step 3 — avg_gain / avg_loss = rolling mean of gains / losses over `period`.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// When avg_loss is zero RS is undefined; RSI is then 100 by rule.
//
// Because delta[0] is undefined, the first defined RSI sits at index `period`.
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use serde::Serialize;
use tracing::trace;

use super::rolling::rolling_mean;
use super::set::IndicatorSeries;
use crate::error::{AnalysisError, AnalysisResult};

pub const OVERBOUGHT: f64 = 70.0;
pub const OVERSOLD: f64 = 30.0;

/// Compute the full RSI series for `closes` and `period`.
///
/// The result is aligned with `closes`.  A series with fewer than
/// `period + 1` closes is entirely undefined.
pub fn calculate_rsi(closes: &[f64], period: usize) -> AnalysisResult<IndicatorSeries> {
    if period == 0 {
        return Err(AnalysisError::InvalidWindow {
            window: period,
            len: closes.len(),
        });
    }
    if closes.is_empty() {
        return Err(AnalysisError::EmptySeries);
    }
    if closes.len() < period + 1 {
        trace!(period, len = closes.len(), "RSI: insufficient data");
        return Ok(IndicatorSeries::undefined(closes.len()));
    }

    // --- Gains / losses for delta[1..] ---------------------------------------
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let d = w[1] - w[0];
            (d.max(0.0), (-d).max(0.0))
        })
        .unzip();

    let avg_gain = rolling_mean(&gains, period)?;
    let avg_loss = rolling_mean(&losses, period)?;

    // Shift by one so position 0 (undefined delta) lines up with closes[0].
    let mut out = Vec::with_capacity(closes.len());
    out.push(None);
    out.extend(
        avg_gain
            .values()
            .iter()
            .zip(avg_loss.values())
            .map(|(g, l)| match (g, l) {
                (Some(g), Some(l)) => Some(rsi_from_averages(*g, *l)),
                _ => None,
            }),
    );

    Ok(IndicatorSeries::new(out))
}

/// Overbought / oversold reading of a single RSI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RsiZone {
    Overbought,
    Neutral,
    Oversold,
}

impl RsiZone {
    pub fn of(rsi: f64) -> Self {
        if rsi >= OVERBOUGHT {
            Self::Overbought
        } else if rsi <= OVERSOLD {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Oversold => write!(f, "OVERSOLD"),
        }
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// A zero average loss maps to 100.0, including the flat-market case.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
