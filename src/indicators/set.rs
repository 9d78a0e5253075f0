// =============================================================================
// Indicator Series & Indicator Set
// =============================================================================
//
// An `IndicatorSeries` is aligned 1:1 by position with the source series.
// Positions still inside the warm-up region hold `None`.
//
// An `IndicatorSet` bundles every named indicator series computed for one
// instrument together with the shared date index.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Derived per-position values; `None` marks an undefined (warm-up) slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndicatorSeries {
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    /// A series of `len` undefined positions.
    pub fn undefined(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    /// A fully defined series.
    pub fn from_defined(values: Vec<f64>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Value at the final position; `None` when empty or still undefined.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Number of leading undefined positions.
    pub fn warmup_len(&self) -> usize {
        self.values.iter().take_while(|v| v.is_none()).count()
    }

    /// Element-wise combination of two aligned series.  A position is defined
    /// only when both inputs are.
    pub fn zip_with(&self, other: &IndicatorSeries, f: impl Fn(f64, f64) -> f64) -> Self {
        debug_assert_eq!(self.len(), other.len());
        Self {
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| match (a, b) {
                    (Some(a), Some(b)) => Some(f(*a, *b)),
                    _ => None,
                })
                .collect(),
        }
    }

    pub fn tail(&self, count: usize) -> Self {
        let start = self.values.len().saturating_sub(count);
        Self {
            values: self.values[start..].to_vec(),
        }
    }
}

/// Named indicator series sharing one date index.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    dates: Vec<NaiveDate>,
    series: BTreeMap<String, IndicatorSeries>,
}

impl IndicatorSet {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            series: BTreeMap::new(),
        }
    }

    /// Attach `values` under `name`, replacing any previous entry.
    ///
    /// The series must be aligned with the date index.
    pub fn insert(&mut self, name: impl Into<String>, values: IndicatorSeries) {
        debug_assert_eq!(values.len(), self.dates.len());
        self.series.insert(name.into(), values);
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorSeries> {
        self.series.get(name)
    }

    /// Latest value of the named indicator.
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.get(name)?.last()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// The last `count` positions of every series (chart window).
    pub fn tail(&self, count: usize) -> Self {
        let start = self.dates.len().saturating_sub(count);
        Self {
            dates: self.dates[start..].to_vec(),
            series: self
                .series
                .iter()
                .map(|(k, v)| (k.clone(), v.tail(count)))
                .collect(),
        }
    }
}
