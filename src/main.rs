// =============================================================================
// TAIEX Analyzer — Main Entry Point
// =============================================================================
//
// Loads each configured instrument, computes indicators in parallel blocking
// tasks, then joins for the cross-instrument comparison and writes reports.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use taiex_analyzer::compare::compare;
use taiex_analyzer::indicators::{compute_indicators, IndicatorSet};
use taiex_analyzer::market_data::{self, GeneratorParams, Series};
use taiex_analyzer::report::{save_json, AnalysisReport, ChartFrame, InstrumentReport};
use taiex_analyzer::runtime_config::{AnalyzerConfig, InstrumentConfig};

const CONFIG_PATH: &str = "analyzer_config.json";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        TAIEX Analyzer — Starting Up                      ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = if Path::new(CONFIG_PATH).exists() {
        AnalyzerConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "Failed to load config, using defaults");
            AnalyzerConfig::default()
        })
    } else {
        let config = AnalyzerConfig::default();
        if let Err(e) = config.save(CONFIG_PATH) {
            warn!(error = %format!("{e:#}"), "Failed to write default config");
        }
        config
    };

    // Override instruments / data directory from env if available.
    if let Ok(codes) = std::env::var("ANALYZER_SYMBOLS") {
        let codes: Vec<String> = codes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !codes.is_empty() {
            config.select_instruments(&codes);
        }
    }
    if let Ok(dir) = std::env::var("ANALYZER_DATA_DIR") {
        config.data_dir = dir.into();
    }

    info!(
        instruments = ?config.instruments.iter().map(|i| i.code.as_str()).collect::<Vec<_>>(),
        data_dir = %config.data_dir.display(),
        output_dir = %config.output_dir.display(),
        "Configured instruments"
    );

    // ── 2. Per-instrument load + indicators, in parallel ─────────────────
    let mut tasks = JoinSet::new();
    for (index, instrument) in config.instruments.iter().cloned().enumerate() {
        let config = config.clone();
        tasks.spawn_blocking(move || {
            let result = analyse_instrument(&config, &instrument, index);
            (index, instrument, result)
        });
    }

    let mut analysed: Vec<(usize, Series, IndicatorSet)> = Vec::new();
    let mut any_generated = false;
    while let Some(joined) = tasks.join_next().await {
        let (index, instrument, result) = joined.context("instrument task panicked")?;
        match result {
            Ok(Analysed { series, set, generated }) => {
                any_generated |= generated;
                analysed.push((index, series, set));
            }
            Err(e) => {
                error!(
                    code = %instrument.code,
                    error = %format!("{e:#}"),
                    "Skipping instrument"
                );
            }
        }
    }
    // Restore configured order so rankings break ties deterministically.
    analysed.sort_by_key(|(index, _, _)| *index);

    if analysed.is_empty() {
        anyhow::bail!("no instrument could be analysed");
    }

    // ── 3. Reports ───────────────────────────────────────────────────────
    let mut reports = Vec::with_capacity(analysed.len());
    for (_, series, set) in &analysed {
        if let Some(r) =
            InstrumentReport::build(series, set, config.trend_short_ma, config.trend_long_ma)
        {
            reports.push(r);
        }

        let frame = ChartFrame::recent(series, set, config.chart_window);
        let path = config
            .output_dir
            .join(format!("{}_{}_chart.json", series.symbol(), series.name()));
        if let Err(e) = save_json(&frame, &path) {
            error!(
                instrument = %series,
                error = %format!("{e:#}"),
                "Failed to write chart frame"
            );
        }
    }

    let all_series: Vec<Series> = analysed.into_iter().map(|(_, s, _)| s).collect();
    if any_generated {
        let path = config.data_dir.join(market_data::COMBINED_CSV);
        if let Err(e) = market_data::save_combined(&path, &all_series) {
            warn!(error = %format!("{e:#}"), "Failed to write combined price data");
        }
    }
    let comparison = match compare(&all_series) {
        Ok(c) => Some(c),
        Err(e) => {
            warn!(error = %e, "Comparison unavailable");
            None
        }
    };

    let report = AnalysisReport::new(reports, comparison, config.top_k);
    report.log();
    save_json(&report, config.output_dir.join("analysis_report.json"))?;

    info!("Analysis complete");
    Ok(())
}

/// One instrument's data and indicators; `generated` marks synthetic data.
struct Analysed {
    series: Series,
    set: IndicatorSet,
    generated: bool,
}

/// Load (or synthesise) one instrument and compute its indicators.
fn analyse_instrument(
    config: &AnalyzerConfig,
    instrument: &InstrumentConfig,
    index: usize,
) -> Result<Analysed> {
    let (series, generated) = load_or_generate(config, instrument, index)?;
    let set = compute_indicators(&series, &config.indicators)
        .with_context(|| format!("indicator computation failed for {series}"))?;
    Ok(Analysed {
        series,
        set,
        generated,
    })
}

fn load_or_generate(
    config: &AnalyzerConfig,
    instrument: &InstrumentConfig,
    index: usize,
) -> Result<(Series, bool)> {
    let path = market_data::csv_path(&config.data_dir, &instrument.code, &instrument.name);
    if path.exists() {
        let series = market_data::load_series(&path, &instrument.code, &instrument.name)?;
        return Ok((series, false));
    }
    if !config.generator.generate_missing {
        anyhow::bail!("price data not found: {}", path.display());
    }

    warn!(path = %path.display(), "Price data missing, generating synthetic series");
    let params = GeneratorParams {
        code: instrument.code.clone(),
        name: instrument.name.clone(),
        base_price: instrument.base_price,
        volatility: instrument.volatility,
        days: config.generator.days,
        start: config.generator.start_date,
        seed: config.generator.seed.wrapping_add(index as u64),
    };
    let series = market_data::generate_series(&params)?;
    save_generated(&path, &series);
    Ok((series, true))
}

fn save_generated(path: &Path, series: &Series) {
    if let Err(e) = market_data::save_series(path, series) {
        warn!(
            instrument = %series,
            error = %format!("{e:#}"),
            "Failed to persist synthetic data"
        );
    }
}
