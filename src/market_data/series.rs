use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PricePoint {
    fn validate(&self, index: usize) -> AnalysisResult<()> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() {
                return Err(AnalysisError::InvalidPrice { index, field, value });
            }
        }
        if self.close <= 0.0 {
            return Err(AnalysisError::InvalidPrice {
                index,
                field: "close",
                value: self.close,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Series -- validated, date-ordered bars for one instrument
// ---------------------------------------------------------------------------

/// Ordered daily bars for exactly one instrument.
///
/// Dates are strictly increasing.  Missing trading days are simply absent;
/// nothing is interpolated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: String,
    name: String,
    points: Vec<PricePoint>,
}

impl Series {
    /// Build a series, rejecting out-of-order dates and non-finite or
    /// non-positive closes.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        points: Vec<PricePoint>,
    ) -> AnalysisResult<Self> {
        for (i, p) in points.iter().enumerate() {
            p.validate(i)?;
            if i > 0 && p.date <= points[i - 1].date {
                return Err(AnalysisError::NonIncreasingDate { index: i, date: p.date });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            name: name.into(),
            points,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Close-price projection, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn volumes(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.volume).collect()
    }

    /// The most recent `count` bars as a new series.
    pub fn tail(&self, count: usize) -> Series {
        let start = self.points.len().saturating_sub(count);
        Series {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            points: self.points[start..].to_vec(),
        }
    }

    /// A new series holding only the bars whose date is in `dates`.
    pub fn restrict_to(&self, dates: &BTreeSet<NaiveDate>) -> Series {
        Series {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            points: self
                .points
                .iter()
                .filter(|p| dates.contains(&p.date))
                .copied()
                .collect(),
        }
    }
}

impl std::fmt::Display for Series {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.symbol)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    pub(crate) fn bar(offset: i64, close: f64, volume: u64) -> PricePoint {
        PricePoint {
            date: day(offset),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        }
    }

    /// Series with consecutive dates and the given closes.
    pub(crate) fn series_from_closes(symbol: &str, closes: &[f64]) -> Series {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| bar(i as i64, c, 1_000))
            .collect();
        Series::new(symbol, symbol, points).unwrap()
    }

    #[test]
    fn accepts_strictly_increasing_dates() {
        let s = series_from_closes("2330", &[10.0, 11.0, 12.0]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.closes(), vec![10.0, 11.0, 12.0]);
        assert_eq!(s.to_string(), "2330(2330)");
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = Series::new("X", "X", vec![bar(0, 1.0, 1), bar(0, 2.0, 1)]).unwrap_err();
        assert_eq!(err, AnalysisError::NonIncreasingDate { index: 1, date: day(0) });
    }

    #[test]
    fn rejects_decreasing_dates() {
        let err = Series::new("X", "X", vec![bar(3, 1.0, 1), bar(1, 2.0, 1)]).unwrap_err();
        assert!(matches!(err, AnalysisError::NonIncreasingDate { index: 1, .. }));
    }

    #[test]
    fn rejects_non_positive_close() {
        let err = Series::new("X", "X", vec![bar(0, 0.0, 1)]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidPrice { field: "close", .. }));
    }

    #[test]
    fn rejects_nan_high() {
        let mut p = bar(0, 5.0, 1);
        p.high = f64::NAN;
        let err = Series::new("X", "X", vec![p]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidPrice { field: "high", .. }));
    }

    #[test]
    fn gaps_are_allowed() {
        let s = Series::new("X", "X", vec![bar(0, 1.0, 1), bar(5, 2.0, 1)]).unwrap();
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn tail_keeps_latest_bars() {
        let s = series_from_closes("X", &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.tail(2).closes(), vec![3.0, 4.0]);
        assert_eq!(s.tail(10).len(), 4);
    }

    #[test]
    fn restrict_to_filters_by_date() {
        let s = series_from_closes("X", &[1.0, 2.0, 3.0, 4.0]);
        let keep: BTreeSet<NaiveDate> = [day(1), day(3), day(9)].into_iter().collect();
        let r = s.restrict_to(&keep);
        assert_eq!(r.closes(), vec![2.0, 4.0]);
        assert_eq!(r.symbol(), "X");
    }
}
