// =============================================================================
// Runtime Configuration — JSON analyzer settings with atomic save
// =============================================================================
//
// Every tunable parameter of an analysis run lives here: which instruments to
// load, where data and reports go, and the indicator parameters.
//
// All fields carry `#[serde(default)]` so that adding new fields never breaks
// loading an older config file.  Persistence uses an atomic tmp + rename.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::IndicatorParams;
use crate::report::save_json;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_instruments() -> Vec<InstrumentConfig> {
    vec![
        InstrumentConfig::new("2330", "台積電", 600.0, 0.015),
        InstrumentConfig::new("2317", "鴻海", 100.0, 0.020),
        InstrumentConfig::new("2454", "聯發科", 800.0, 0.025),
    ]
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_short_ma() -> usize {
    5
}

fn default_long_ma() -> usize {
    20
}

fn default_chart_window() -> usize {
    60
}

fn default_top_k() -> usize {
    3
}

fn default_seed() -> u64 {
    42
}

fn default_days() -> usize {
    250
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default()
}

fn default_base_price() -> f64 {
    100.0
}

fn default_volatility() -> f64 {
    0.02
}

// =============================================================================
// InstrumentConfig
// =============================================================================

/// One instrument to analyse, plus the shape used when synthesising its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub code: String,
    pub name: String,

    /// Starting price for synthetic data.
    #[serde(default = "default_base_price")]
    pub base_price: f64,

    /// Daily return standard deviation for synthetic data (0.015 = 1.5 %).
    #[serde(default = "default_volatility")]
    pub volatility: f64,
}

impl InstrumentConfig {
    pub fn new(code: &str, name: &str, base_price: f64, volatility: f64) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            base_price,
            volatility,
        }
    }
}

// =============================================================================
// GeneratorConfig
// =============================================================================

/// Settings for synthesising data when an instrument's CSV is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Synthesise (and write) missing CSV files instead of skipping them.
    #[serde(default = "default_true")]
    pub generate_missing: bool,

    /// Base RNG seed; each instrument adds its index.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of business days to generate.
    #[serde(default = "default_days")]
    pub days: usize,

    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generate_missing: true,
            seed: default_seed(),
            days: default_days(),
            start_date: default_start_date(),
        }
    }
}

// =============================================================================
// AnalyzerConfig
// =============================================================================

/// Top-level configuration for an analysis run.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    // --- Inputs & outputs ---------------------------------------------------

    /// Instruments to analyse, in report order.
    #[serde(default = "default_instruments")]
    pub instruments: Vec<InstrumentConfig>,

    /// Directory holding `{code}_{name}.csv` files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory receiving the JSON report and chart frames.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    // --- Indicators ---------------------------------------------------------

    #[serde(default)]
    pub indicators: IndicatorParams,

    /// Moving-average period compared against the close (short-term trend).
    #[serde(default = "default_short_ma")]
    pub trend_short_ma: usize,

    /// Moving-average period compared against the short MA (medium-term trend).
    #[serde(default = "default_long_ma")]
    pub trend_long_ma: usize,

    // --- Reporting ----------------------------------------------------------

    /// Number of most recent bars exported per chart frame.
    #[serde(default = "default_chart_window")]
    pub chart_window: usize,

    /// Number of instruments listed in the return ranking.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    // --- Synthetic data -----------------------------------------------------

    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            instruments: default_instruments(),
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            indicators: IndicatorParams::default(),
            trend_short_ma: default_short_ma(),
            trend_long_ma: default_long_ma(),
            chart_window: default_chart_window(),
            top_k: default_top_k(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analyzer config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse analyzer config from {}", path.display()))?;

        info!(
            path = %path.display(),
            instruments = config.instruments.len(),
            "analyzer config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        save_json(self, path)
            .with_context(|| format!("failed to save analyzer config to {}", path.display()))?;
        info!(path = %path.display(), "analyzer config saved (atomic)");
        Ok(())
    }

    /// Keep only the instruments whose code appears in `codes`, in the order
    /// given.  Unknown codes get a default synthetic shape.
    pub fn select_instruments(&mut self, codes: &[String]) {
        self.instruments = codes
            .iter()
            .map(|code| {
                self.instruments
                    .iter()
                    .find(|i| &i.code == code)
                    .cloned()
                    .unwrap_or_else(|| {
                        let (price, vol) = (default_base_price(), default_volatility());
                        InstrumentConfig::new(code, code, price, vol)
                    })
            })
            .collect();
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.instruments.len(), 3);
        assert_eq!(cfg.instruments[0].code, "2330");
        assert_eq!(cfg.instruments[2].name, "聯發科");
        assert_eq!(cfg.indicators.ma_periods, vec![5, 10, 20]);
        assert_eq!(cfg.indicators.rsi_period, 14);
        assert_eq!(cfg.trend_short_ma, 5);
        assert_eq!(cfg.trend_long_ma, 20);
        assert_eq!(cfg.chart_window, 60);
        assert!(cfg.generator.generate_missing);
        assert_eq!(cfg.generator.seed, 42);
        assert_eq!(cfg.generator.days, 250);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: AnalyzerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.instruments, default_instruments());
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.indicators.macd.slow, 26);
        assert!((cfg.indicators.bollinger.multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "instruments": [{ "code": "0050", "name": "元大台灣50" }],
            "indicators": { "rsi_period": 6 },
            "generator": { "days": 120 }
        }"#;
        let cfg: AnalyzerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.instruments.len(), 1);
        assert!((cfg.instruments[0].volatility - 0.02).abs() < f64::EPSILON);
        assert_eq!(cfg.indicators.rsi_period, 6);
        assert_eq!(cfg.indicators.ma_periods, vec![5, 10, 20]);
        assert_eq!(cfg.generator.days, 120);
        assert_eq!(cfg.generator.seed, 42);
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = AnalyzerConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: AnalyzerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.instruments, cfg2.instruments);
        assert_eq!(cfg.indicators, cfg2.indicators);
        assert_eq!(cfg.generator, cfg2.generator);
    }

    fn temp_config_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("taiex_analyzer_cfg_{}_{tag}", std::process::id()))
            .join("analyzer_config.json")
    }

    #[test]
    fn save_then_load_from_disk() {
        let path = temp_config_path("roundtrip");
        let mut cfg = AnalyzerConfig::default();
        cfg.top_k = 2;
        cfg.generator.days = 90;
        cfg.select_instruments(&["2317".to_string()]);

        cfg.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = AnalyzerConfig::load(&path).unwrap();
        assert_eq!(loaded.instruments, cfg.instruments);
        assert_eq!(loaded.top_k, 2);
        assert_eq!(loaded.generator.days, 90);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn save_overwrites_existing_file() {
        let path = temp_config_path("overwrite");
        AnalyzerConfig::default().save(&path).unwrap();

        let mut cfg = AnalyzerConfig::default();
        cfg.chart_window = 30;
        cfg.save(&path).unwrap();
        assert_eq!(AnalyzerConfig::load(&path).unwrap().chart_window, 30);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let path = temp_config_path("missing");
        let err = AnalyzerConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to read analyzer config"));
    }

    #[test]
    fn select_instruments_keeps_requested_order() {
        let mut cfg = AnalyzerConfig::default();
        cfg.select_instruments(&["2454".to_string(), "9999".to_string()]);
        assert_eq!(cfg.instruments.len(), 2);
        assert_eq!(cfg.instruments[0].name, "聯發科");
        assert_eq!(cfg.instruments[1].code, "9999");
        assert_eq!(cfg.instruments[1].name, "9999");
    }
}
