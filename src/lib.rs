// =============================================================================
// TAIEX Analyzer — library root
// =============================================================================
//
// Data flows one way:
//
//   market_data (Series) → indicators (rolling / EMA → MA, MACD, RSI, BB)
//                        → trend (labels)  /  compare (cross-instrument)
//                        → report (statistics, JSON export)
//
// The computation core (`indicators`, `trend`, `compare`) is pure and holds no
// process-wide state.

pub mod compare;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod report;
pub mod runtime_config;
pub mod trend;

pub use compare::{compare, ComparisonSummary, InstrumentComparison, RankMetric};
pub use error::{AnalysisError, AnalysisResult};
pub use indicators::{compute_indicators, IndicatorParams, IndicatorSeries, IndicatorSet};
pub use market_data::{PricePoint, Series};
pub use trend::{classify_trend, MediumTerm, ShortTerm, TrendLabel};
