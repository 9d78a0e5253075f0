// =============================================================================
// Analysis Report
// =============================================================================
//
// Per-instrument statistics (price range, return, volatility, volume, latest
// indicator readings, trend) plus the cross-instrument comparison and return
// ranking.  A missing trend or indicator reading is reported as `None` so the
// row is kept instead of aborting the run.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::compare::{daily_returns, ComparisonSummary, RankMetric};
use crate::indicators::rolling::sample_std;
use crate::indicators::{
    band_width_pct, IndicatorSet, RsiZone, BB_LOWER, BB_MIDDLE, BB_UPPER, MACD, RSI,
};
use crate::market_data::Series;
use crate::trend::{classify_from_set, TrendLabel};

/// Statistics for one instrument over its full history.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentReport {
    pub symbol: String,
    pub name: String,
    pub bars: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub max_high: f64,
    pub min_low: f64,
    pub mean_close: f64,
    pub latest_close: f64,
    pub total_return_pct: f64,
    pub daily_volatility_pct: Option<f64>,
    pub average_volume: f64,
    pub max_volume: u64,
    pub latest_rsi: Option<f64>,
    pub rsi_zone: Option<RsiZone>,
    pub latest_macd: Option<f64>,
    /// Latest Bollinger band width as a percentage of the middle band.
    pub bb_width_pct: Option<f64>,
    pub trend: Option<TrendLabel>,
}

impl InstrumentReport {
    /// Build the report for `series` from its computed indicator set.
    ///
    /// Returns `None` for an empty series.
    pub fn build(
        series: &Series,
        set: &IndicatorSet,
        short_ma: usize,
        long_ma: usize,
    ) -> Option<Self> {
        let (first, last) = (series.first()?, series.last()?);
        let points = series.points();
        let closes = series.closes();
        let n = points.len() as f64;

        let trend = match classify_from_set(set, &closes, short_ma, long_ma) {
            Ok(label) => Some(label),
            Err(e) => {
                warn!(instrument = %series, error = %e, "trend unavailable");
                None
            }
        };
        let latest_rsi = set.latest(RSI);
        let bands = (set.latest(BB_UPPER), set.latest(BB_MIDDLE), set.latest(BB_LOWER));
        let bb_width_pct = match bands {
            (Some(u), Some(m), Some(l)) => band_width_pct(u, m, l),
            _ => None,
        };

        Some(Self {
            symbol: series.symbol().to_string(),
            name: series.name().to_string(),
            bars: points.len(),
            first_date: first.date,
            last_date: last.date,
            max_high: points.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max),
            min_low: points.iter().map(|p| p.low).fold(f64::INFINITY, f64::min),
            mean_close: closes.iter().sum::<f64>() / n,
            latest_close: last.close,
            total_return_pct: (last.close - first.close) / first.close * 100.0,
            daily_volatility_pct: sample_std(&daily_returns(&closes)).map(|s| s * 100.0),
            average_volume: points.iter().map(|p| p.volume as f64).sum::<f64>() / n,
            max_volume: points.iter().map(|p| p.volume).max().unwrap_or(0),
            latest_rsi,
            rsi_zone: latest_rsi.map(RsiZone::of),
            latest_macd: set.latest(MACD),
            bb_width_pct,
            trend,
        })
    }

    /// Emit the report through the logging layer.
    pub fn log(&self) {
        info!(
            instrument = %format!("{}({})", self.name, self.symbol),
            range = %format!("{} .. {}", self.first_date, self.last_date),
            max_high = %format!("{:.2}", self.max_high),
            min_low = %format!("{:.2}", self.min_low),
            mean_close = %format!("{:.2}", self.mean_close),
            latest_close = %format!("{:.2}", self.latest_close),
            "price statistics"
        );
        info!(
            instrument = %self.symbol,
            total_return = %format!("{:+.2}%", self.total_return_pct),
            daily_volatility = %fmt_opt(self.daily_volatility_pct, "%"),
            avg_volume = %format!("{:.0}", self.average_volume),
            max_volume = self.max_volume,
            "return & volume"
        );
        info!(
            instrument = %self.symbol,
            rsi = %fmt_opt(self.latest_rsi, ""),
            rsi_zone = %self.rsi_zone.map(|z| z.to_string()).unwrap_or_else(|| "n/a".into()),
            macd = %fmt_opt(self.latest_macd, ""),
            bb_width = %fmt_opt(self.bb_width_pct, "%"),
            trend = %self
                .trend
                .map(|t| t.to_string())
                .unwrap_or_else(|| "insufficient history".into()),
            "latest indicators"
        );
    }
}

fn fmt_opt(v: Option<f64>, suffix: &str) -> String {
    match v {
        Some(v) => format!("{v:.2}{suffix}"),
        None => "n/a".to_string(),
    }
}

/// Recent bars plus indicator values, ready for a chart renderer.
#[derive(Debug, Clone, Serialize)]
pub struct ChartFrame {
    pub symbol: String,
    pub name: String,
    pub open: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<u64>,
    pub indicators: IndicatorSet,
}

impl ChartFrame {
    /// The last `window` bars of `series` with the matching indicator slice.
    pub fn recent(series: &Series, set: &IndicatorSet, window: usize) -> Self {
        let recent = series.tail(window);
        Self {
            symbol: series.symbol().to_string(),
            name: series.name().to_string(),
            open: recent.points().iter().map(|p| p.open).collect(),
            close: recent.closes(),
            volume: recent.volumes(),
            indicators: set.tail(window),
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub instruments: Vec<InstrumentReport>,
    pub comparison: Option<ComparisonSummary>,
    /// Symbols ordered by total return over the common date range.
    pub return_ranking: Vec<String>,
    /// Symbols ordered by average volume over the common date range.
    pub volume_ranking: Vec<String>,
}

impl AnalysisReport {
    pub fn new(
        instruments: Vec<InstrumentReport>,
        comparison: Option<ComparisonSummary>,
        top_k: usize,
    ) -> Self {
        let ranking = |metric: RankMetric| -> Vec<String> {
            comparison
                .as_ref()
                .map(|c| {
                    c.top_by(metric, top_k)
                        .into_iter()
                        .map(|i| i.symbol.clone())
                        .collect()
                })
                .unwrap_or_default()
        };
        let return_ranking = ranking(RankMetric::TotalReturn);
        let volume_ranking = ranking(RankMetric::AverageVolume);

        Self {
            generated_at: Utc::now(),
            instruments,
            comparison,
            return_ranking,
            volume_ranking,
        }
    }

    pub fn log(&self) {
        info!("======================================================================");
        info!(instruments = self.instruments.len(), "analysis report");
        info!("======================================================================");
        for r in &self.instruments {
            r.log();
        }
        if let Some(c) = &self.comparison {
            for i in &c.instruments {
                info!(
                    instrument = %i.symbol,
                    common_days = c.dates.len(),
                    total_return = %format!("{:+.2}%", i.total_return_pct),
                    daily_volatility = %fmt_opt(i.daily_volatility_pct, "%"),
                    avg_volume = %format!("{:.0}", i.average_volume),
                    "comparison"
                );
            }
        }
        info!(ranking = ?self.return_ranking, "top instruments by return");
        info!(ranking = ?self.volume_ranking, "top instruments by average volume");
    }
}

/// Serialise `value` as pretty JSON to `path` atomically (tmp + rename).
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(value).context("failed to serialise JSON")?;
    let tmp_path = path.with_extension("json.tmp");

    std::fs::write(&tmp_path, &content)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename tmp file to {}", path.display()))?;

    info!(path = %path.display(), "written");
    Ok(())
}
