// =============================================================================
// Cross-Series Comparison
// =============================================================================
//
// Aligns several instruments on the dates they all share, then derives:
//
//   normalized[i]     = close[i] / close[0] * 100        (starts at 100.0)
//   total return %    = (close[last] - close[0]) / close[0] * 100
//   daily volatility  = sample σ of day-over-day returns, in percent
//   average volume    = mean of the volume field
//
// Rankings are stable: ties keep the input order of instruments.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::indicators::rolling::sample_std;
use crate::market_data::Series;

/// Per-instrument comparison figures over the common date range.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentComparison {
    pub symbol: String,
    pub name: String,
    pub normalized: Vec<f64>,
    pub total_return_pct: f64,
    /// `None` when fewer than two daily returns are available.
    pub daily_volatility_pct: Option<f64>,
    pub average_volume: f64,
}

/// Comparison of several instruments over their shared dates.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSummary {
    pub dates: Vec<NaiveDate>,
    pub instruments: Vec<InstrumentComparison>,
}

/// Scalar used to rank instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankMetric {
    TotalReturn,
    Volatility,
    AverageVolume,
}

impl RankMetric {
    fn value(self, c: &InstrumentComparison) -> f64 {
        match self {
            Self::TotalReturn => c.total_return_pct,
            Self::Volatility => c.daily_volatility_pct.unwrap_or(f64::NEG_INFINITY),
            Self::AverageVolume => c.average_volume,
        }
    }
}

/// Compare `series` over the dates present in every one of them.
///
/// # Errors
/// - `EmptySeries` when no series are given or they share no date
pub fn compare(series: &[Series]) -> AnalysisResult<ComparisonSummary> {
    let common = common_dates(series)?;

    let instruments = series
        .iter()
        .map(|s| summarise(&s.restrict_to(&common)))
        .collect::<AnalysisResult<Vec<_>>>()?;

    debug!(
        instruments = instruments.len(),
        common_dates = common.len(),
        "comparison complete"
    );

    Ok(ComparisonSummary {
        dates: common.into_iter().collect(),
        instruments,
    })
}

/// Intersection of the date sets of all `series`.
pub fn common_dates(series: &[Series]) -> AnalysisResult<BTreeSet<NaiveDate>> {
    let (first, rest) = series.split_first().ok_or(AnalysisError::EmptySeries)?;

    let mut common: BTreeSet<NaiveDate> = first.dates().into_iter().collect();
    for s in rest {
        let dates: BTreeSet<NaiveDate> = s.dates().into_iter().collect();
        common = common.intersection(&dates).copied().collect();
    }

    if common.is_empty() {
        warn!(instruments = series.len(), "no common dates across instruments");
        return Err(AnalysisError::EmptySeries);
    }
    Ok(common)
}

/// Day-over-day fractional returns of `closes`.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

fn summarise(series: &Series) -> AnalysisResult<InstrumentComparison> {
    let closes = series.closes();
    let (&base, _) = closes.split_first().ok_or(AnalysisError::EmptySeries)?;
    let last = closes[closes.len() - 1];

    let normalized = closes.iter().map(|c| c / base * 100.0).collect();
    let total_return_pct = (last - base) / base * 100.0;
    let daily_volatility_pct = sample_std(&daily_returns(&closes)).map(|s| s * 100.0);
    let average_volume =
        series.volumes().iter().map(|&v| v as f64).sum::<f64>() / series.len() as f64;

    Ok(InstrumentComparison {
        symbol: series.symbol().to_string(),
        name: series.name().to_string(),
        normalized,
        total_return_pct,
        daily_volatility_pct,
        average_volume,
    })
}

impl ComparisonSummary {
    /// The `k` highest instruments by `metric`, descending.
    pub fn top_by(&self, metric: RankMetric, k: usize) -> Vec<&InstrumentComparison> {
        let mut ranked: Vec<&InstrumentComparison> = self.instruments.iter().collect();
        // `sort_by` is stable, so equal values keep input order.
        ranked.sort_by(|a, b| metric.value(b).total_cmp(&metric.value(a)));
        ranked.truncate(k);
        ranked
    }

    pub fn get(&self, symbol: &str) -> Option<&InstrumentComparison> {
        self.instruments.iter().find(|c| c.symbol == symbol)
    }
}
