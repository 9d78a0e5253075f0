// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the technical indicators used by
// the analyzer.  Every output series is aligned 1:1 with its input; positions
// without enough history hold `None`.

pub mod bollinger;
pub mod ema;
pub mod ma;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod set;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use bollinger::{band_width_pct, calculate_bollinger, BollingerParams, BollingerResult};
pub use ema::calculate_ema;
pub use ma::{calculate_ma, calculate_mas, ma_name};
pub use macd::{calculate_macd, MacdParams, MacdResult};
pub use rolling::{rolling_mean, rolling_std};
pub use rsi::{calculate_rsi, RsiZone};
pub use set::{IndicatorSeries, IndicatorSet};

use crate::error::AnalysisResult;
use crate::market_data::Series;

pub const MACD: &str = "MACD";
pub const MACD_SIGNAL: &str = "MACD_Signal";
pub const MACD_HIST: &str = "MACD_Hist";
pub const RSI: &str = "RSI";
pub const BB_UPPER: &str = "BB_Upper";
pub const BB_MIDDLE: &str = "BB_Middle";
pub const BB_LOWER: &str = "BB_Lower";

fn default_ma_periods() -> Vec<usize> {
    vec![5, 10, 20]
}

fn default_rsi_period() -> usize {
    14
}

/// Parameters for a full indicator pass over one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_ma_periods")]
    pub ma_periods: Vec<usize>,
    #[serde(default)]
    pub macd: MacdParams,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default)]
    pub bollinger: BollingerParams,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ma_periods: default_ma_periods(),
            macd: MacdParams::default(),
            rsi_period: default_rsi_period(),
            bollinger: BollingerParams::default(),
        }
    }
}

/// Compute every configured indicator for `series`.
///
/// Produces `MA{p}` for each period, `MACD`, `MACD_Signal`, `MACD_Hist`,
/// `RSI`, `BB_Upper`, `BB_Middle` and `BB_Lower`.
pub fn compute_indicators(
    series: &Series,
    params: &IndicatorParams,
) -> AnalysisResult<IndicatorSet> {
    let closes = series.closes();
    let mut set = IndicatorSet::new(series.dates());

    for (period, ma) in calculate_mas(&closes, &params.ma_periods)? {
        set.insert(ma_name(period), ma);
    }

    let macd = calculate_macd(&closes, params.macd)?;
    set.insert(MACD, macd.macd);
    set.insert(MACD_SIGNAL, macd.signal);
    set.insert(MACD_HIST, macd.histogram);

    set.insert(RSI, calculate_rsi(&closes, params.rsi_period)?);

    let bb = calculate_bollinger(&closes, params.bollinger)?;
    set.insert(BB_UPPER, bb.upper);
    set.insert(BB_MIDDLE, bb.middle);
    set.insert(BB_LOWER, bb.lower);

    debug!(
        instrument = %series,
        bars = series.len(),
        indicators = set.names().count(),
        "indicators computed"
    );

    Ok(set)
}
