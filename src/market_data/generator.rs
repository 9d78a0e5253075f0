// =============================================================================
// Synthetic Price Generator
// =============================================================================
//
// Produces a deterministic daily series for demos and tests when no recorded
// data is available.
//
//   calendar : business days (Mon–Fri) starting at `start`
//   returns  : r_t ~ Normal(0.001, volatility)
//   trend    : linear 0 → 0.30 across the series
//   cycle    : 0.05 * sin(2π t / 60)
//   close_t  = base_price * (1 + Σr + trend_t + cycle_t)
//
// Open is close with ±1 % jitter; high / low extend the open-close body by up
// to 2 %; volume is 50 000 × U(0.7, 1.5).

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use super::series::{PricePoint, Series};

const DRIFT: f64 = 0.001;
const TREND_TOTAL: f64 = 0.30;
const CYCLE_DAYS: f64 = 60.0;
const CYCLE_AMPLITUDE: f64 = 0.05;
const BASE_VOLUME: f64 = 50_000.0;
/// Closes are floored here so an extreme draw cannot produce a non-positive
/// price.
const MIN_CLOSE: f64 = 0.01;

/// Shape of one synthetic instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorParams {
    pub code: String,
    pub name: String,
    pub base_price: f64,
    pub volatility: f64,
    pub days: usize,
    pub start: NaiveDate,
    pub seed: u64,
}

/// The first `count` business days on or after `start`.
pub fn business_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(count);
    let mut day = start;
    while out.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
        day += Duration::days(1);
    }
    out
}

/// Generate a synthetic series for `params`.
pub fn generate_series(params: &GeneratorParams) -> Result<Series> {
    // `Normal::new` only rejects a non-finite deviation; a negative one would
    // silently mirror the walk.
    if !(params.volatility.is_finite() && params.volatility >= 0.0) {
        anyhow::bail!("invalid volatility {}", params.volatility);
    }
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let normal = Normal::new(DRIFT, params.volatility)
        .with_context(|| format!("invalid volatility {}", params.volatility))?;

    let dates = business_days(params.start, params.days);
    let n = dates.len();
    let last = n.saturating_sub(1).max(1) as f64;

    let mut cumulative = 0.0_f64;
    let mut points = Vec::with_capacity(n);
    for (t, date) in dates.into_iter().enumerate() {
        cumulative += normal.sample(&mut rng);
        let trend = TREND_TOTAL * t as f64 / last;
        let cycle = (t as f64 * 2.0 * std::f64::consts::PI / CYCLE_DAYS).sin() * CYCLE_AMPLITUDE;
        let close = (params.base_price * (1.0 + cumulative + trend + cycle)).max(MIN_CLOSE);

        let open = close * (1.0 + rng.gen_range(-0.01..0.01));
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.02));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.02));
        let volume = (BASE_VOLUME * (1.0 + rng.gen_range(-0.3..0.5))) as u64;

        points.push(PricePoint {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    debug!(
        code = %params.code,
        bars = points.len(),
        seed = params.seed,
        "synthetic series generated"
    );

    Ok(Series::new(&params.code, &params.name, points)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(seed: u64) -> GeneratorParams {
        GeneratorParams {
            code: "2330".into(),
            name: "台積電".into(),
            base_price: 600.0,
            volatility: 0.015,
            days: 365,
            start: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            seed,
        }
    }

    #[test]
    fn business_days_skip_weekends() {
        // 2024-01-05 is a Friday.
        let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let days = business_days(start, 3);
        assert_eq!(
            days,
            vec![
                start,
                NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
            ]
        );
    }

    #[test]
    fn generates_requested_length_with_valid_bars() {
        let s = generate_series(&params(42)).unwrap();
        assert_eq!(s.len(), 365);
        for p in s.points() {
            assert!(p.high >= p.open.max(p.close));
            assert!(p.low <= p.open.min(p.close));
            assert!(p.close > 0.0);
            assert!((35_000..=75_000).contains(&p.volume));
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        assert_eq!(generate_series(&params(7)).unwrap(), generate_series(&params(7)).unwrap());
        assert_ne!(
            generate_series(&params(7)).unwrap().closes(),
            generate_series(&params(8)).unwrap().closes()
        );
    }

    #[test]
    fn negative_volatility_is_rejected() {
        let mut bad = params(1);
        bad.volatility = -0.015;
        let err = generate_series(&bad).unwrap_err();
        assert!(err.to_string().contains("invalid volatility -0.015"));
    }

    #[test]
    fn nan_volatility_is_rejected() {
        let mut bad = params(1);
        bad.volatility = f64::NAN;
        assert!(generate_series(&bad).is_err());
    }

    #[test]
    fn zero_volatility_is_accepted() {
        let mut flat = params(3);
        flat.volatility = 0.0;
        flat.days = 20;
        assert_eq!(generate_series(&flat).unwrap().len(), 20);
    }
}
