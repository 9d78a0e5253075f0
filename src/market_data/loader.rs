// =============================================================================
// CSV Loader
// =============================================================================
//
// Daily bars are stored one file per instrument as `{code}_{name}.csv` with
// the header:
//
//   Date,Open,High,Low,Close,Volume,Stock_Code,Stock_Name
//
// Dates are ISO `YYYY-MM-DD`.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::series::{PricePoint, Series};

/// One CSV row.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: u64,
    #[serde(rename = "Stock_Code", default)]
    code: String,
    #[serde(rename = "Stock_Name", default)]
    name: String,
}

/// File name of the combined CSV holding every instrument.
pub const COMBINED_CSV: &str = "all_stocks.csv";

/// Path of the CSV file for an instrument inside `data_dir`.
pub fn csv_path(data_dir: impl AsRef<Path>, code: &str, name: &str) -> PathBuf {
    data_dir.as_ref().join(format!("{code}_{name}.csv"))
}

/// Load and validate the series for `code` from `path`.
pub fn load_series(path: impl AsRef<Path>, code: &str, name: &str) -> Result<Series> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open price data {}", path.display()))?;

    let series = parse_series(file, code, name)
        .with_context(|| format!("failed to parse price data {}", path.display()))?;

    info!(
        instrument = %series,
        bars = series.len(),
        from = %series.first().map(|p| p.date.to_string()).unwrap_or_default(),
        to = %series.last().map(|p| p.date.to_string()).unwrap_or_default(),
        "price data loaded"
    );
    Ok(series)
}

/// Parse CSV rows from any reader into a validated [`Series`].
pub fn parse_series(reader: impl Read, code: &str, name: &str) -> Result<Series> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut points = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = row.with_context(|| format!("bad CSV record {}", i + 1))?;
        points.push(PricePoint {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    Ok(Series::new(code, name, points)?)
}

/// Write `series` as CSV in the loader's format.
pub fn write_series(writer: impl Write, series: &Series) -> Result<()> {
    write_combined(writer, std::slice::from_ref(series))
}

/// Write several instruments one after another under a single header; the
/// `Stock_Code` / `Stock_Name` columns tell the rows apart.
pub fn write_combined(writer: impl Write, all: &[Series]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for series in all {
        for p in series.points() {
            wtr.serialize(CsvRow {
                date: p.date,
                open: p.open,
                high: p.high,
                low: p.low,
                close: p.close,
                volume: p.volume,
                code: series.symbol().to_string(),
                name: series.name().to_string(),
            })
            .with_context(|| format!("failed to serialise CSV row for {series}"))?;
        }
    }
    wtr.flush().context("failed to flush CSV writer")?;
    Ok(())
}

fn create_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

/// Write `series` to `path`, creating parent directories.
pub fn save_series(path: impl AsRef<Path>, series: &Series) -> Result<()> {
    let path = path.as_ref();
    write_series(create_file(path)?, series)?;
    info!(instrument = %series, path = %path.display(), "price data written");
    Ok(())
}

/// Write every instrument in `all` to one combined CSV at `path`.
pub fn save_combined(path: impl AsRef<Path>, all: &[Series]) -> Result<()> {
    let path = path.as_ref();
    write_combined(create_file(path)?, all)?;
    info!(
        instruments = all.len(),
        rows = all.iter().map(Series::len).sum::<usize>(),
        path = %path.display(),
        "combined price data written"
    );
    Ok(())
}
