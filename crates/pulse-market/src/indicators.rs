//! Rolling indicators and trend/momentum signals
//!
//! [`compute`] is the deterministic core: SMA20 and SMA50 with warm-up
//! relaxation (the first values average every point seen so far) and RSI14
//! from simple 14-period means of gains and losses. [`IndicatorEngine`] adds
//! data sufficiency on top: one month of daily bars, widened once to three
//! months when that is not enough.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use tracing::{debug, instrument};

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::models::wire;
use crate::series::{Interval, Period, PriceSeries};
use crate::sources::TimeSeriesFetcher;
use crate::symbol::Symbol;

pub const SMA_SHORT: usize = 20;
pub const SMA_LONG: usize = 50;
pub const RSI_PERIOD: usize = 14;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;

/// Moving-average crossover state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// Bullish only when the short average is strictly above the long one
    pub fn from_averages(short: f64, long: f64) -> Self {
        if short > long {
            Trend::Bullish
        } else {
            Trend::Bearish
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => f.write_str("Bullish"),
            Trend::Bearish => f.write_str("Bearish"),
        }
    }
}

/// RSI zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RsiSignal {
    Oversold,
    Overbought,
    Neutral,
}

impl RsiSignal {
    pub fn from_rsi(rsi: f64) -> Self {
        if rsi < RSI_OVERSOLD {
            RsiSignal::Oversold
        } else if rsi > RSI_OVERBOUGHT {
            RsiSignal::Overbought
        } else {
            RsiSignal::Neutral
        }
    }
}

/// Indicator values at the last bar of a series
///
/// Values are kept at full precision; rounding happens on serialization only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    #[serde(serialize_with = "wire::rounded")]
    pub sma20: f64,
    #[serde(serialize_with = "wire::rounded")]
    pub sma50: f64,
    #[serde(rename = "rsi", serialize_with = "wire::rounded")]
    pub rsi14: f64,
    pub trend: Trend,
    pub rsi_signal: RsiSignal,
    #[serde(serialize_with = "wire::rounded")]
    pub last_close: f64,
    pub last_volume: u64,
    #[serde(rename = "data_points")]
    pub sample_count: usize,
}

/// Compute the indicator snapshot of a series
///
/// Needs at least `RSI_PERIOD + 1` points. Any non-finite intermediate value
/// is a [`StockError::CalculationError`].
pub fn compute(series: &PriceSeries) -> Result<IndicatorSnapshot> {
    let required = RSI_PERIOD + 1;
    let Some(last) = series.last() else {
        return Err(StockError::InsufficientHistory {
            actual: 0,
            required,
        });
    };
    if series.len() < required {
        return Err(StockError::InsufficientHistory {
            actual: series.len(),
            required,
        });
    }

    let closes: Vec<f64> = series.closes().collect();
    let sma20 = rolling_mean(&closes, SMA_SHORT)?;
    let sma50 = rolling_mean(&closes, SMA_LONG)?;
    let rsi14 = rsi(&closes, RSI_PERIOD)?;

    Ok(IndicatorSnapshot {
        sma20,
        sma50,
        rsi14,
        trend: Trend::from_averages(sma20, sma50),
        rsi_signal: RsiSignal::from_rsi(rsi14),
        last_close: last.close,
        last_volume: last.volume,
        sample_count: series.len(),
    })
}

/// Last value of a simple moving average that tolerates a short warm-up
fn rolling_mean(values: &[f64], window: usize) -> Result<f64> {
    let mut sma = SimpleMovingAverage::new(window)
        .map_err(|e| StockError::CalculationError(e.to_string()))?;

    let last = values.iter().fold(f64::NAN, |_, &v| sma.next(v));
    finite(last, "moving average")
}

/// Relative strength index over the last `period` price changes
fn rsi(closes: &[f64], period: usize) -> Result<f64> {
    let deltas: Vec<f64> = closes
        .windows(2)
        .skip(closes.len().saturating_sub(period + 1))
        .map(|w| w[1] - w[0])
        .collect();

    if deltas.len() < period {
        return Err(StockError::CalculationError(format!(
            "RSI needs {period} price changes, got {}",
            deltas.len()
        )));
    }

    let n = period as f64;
    let gain = finite(deltas.iter().filter(|d| **d > 0.0).sum::<f64>() / n, "average gain")?;
    let loss = finite(-deltas.iter().filter(|d| **d < 0.0).sum::<f64>() / n, "average loss")?;

    let value = match (gain > 0.0, loss > 0.0) {
        (_, true) => 100.0 - 100.0 / (1.0 + gain / loss),
        (true, false) => 100.0,
        (false, false) => 50.0,
    };
    finite(value, "RSI")
}

fn finite(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StockError::CalculationError(format!("{what} is not finite")))
    }
}

/// Fetches enough history for a symbol and computes its indicators
pub struct IndicatorEngine {
    fetcher: Arc<dyn TimeSeriesFetcher>,
    min_points: usize,
}

impl IndicatorEngine {
    pub fn new(fetcher: Arc<dyn TimeSeriesFetcher>, config: &StockConfig) -> Self {
        Self {
            fetcher,
            min_points: config.min_history_points,
        }
    }

    /// One month of daily bars, widened once to three months when short
    #[instrument(skip(self), fields(symbol = %symbol))]
    pub async fn analyze(&self, symbol: &Symbol) -> Result<IndicatorSnapshot> {
        let mut series = self
            .fetcher
            .fetch(symbol, Period::OneMonth, Interval::Daily)
            .await?;

        if series.len() < self.min_points {
            debug!(
                points = series.len(),
                required = self.min_points,
                "widening history window"
            );
            let wider = self
                .fetcher
                .fetch(symbol, Period::ThreeMonths, Interval::Daily)
                .await?;

            if series.is_empty() && wider.is_empty() {
                return Err(StockError::no_data(
                    symbol.qualified(),
                    "No historical data available",
                ));
            }
            if wider.len() < self.min_points {
                return Err(StockError::InsufficientHistory {
                    actual: wider.len(),
                    required: self.min_points,
                });
            }
            series = wider;
        }

        compute(&series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::test_support::series;
    use crate::sources::MockTimeSeriesFetcher;
    use crate::symbol::SymbolResolver;
    use proptest::prelude::*;

    fn linear(start: f64, len: usize) -> Vec<f64> {
        (0..len).map(|i| start + i as f64).collect()
    }

    fn engine_with(one_month: Vec<f64>, three_months: Vec<f64>) -> IndicatorEngine {
        let mut fetcher = MockTimeSeriesFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|_, period, _| *period == Period::OneMonth)
            .times(1)
            .returning(move |s, p, _| Ok(series(s.ticker(), p, &one_month)));
        fetcher
            .expect_fetch()
            .withf(|_, period, _| *period == Period::ThreeMonths)
            .returning(move |s, p, _| Ok(series(s.ticker(), p, &three_months)));

        IndicatorEngine::new(Arc::new(fetcher), &StockConfig::default())
    }

    fn reliance() -> Symbol {
        SymbolResolver::default().resolve("RELIANCE").unwrap()
    }

    #[test]
    fn test_linear_uptrend() {
        let snapshot = compute(&series("TCS", Period::ThreeMonths, &linear(100.0, 60))).unwrap();

        assert_eq!(snapshot.sma20, 149.5);
        assert_eq!(snapshot.sma50, 134.5);
        assert_eq!(snapshot.trend, Trend::Bullish);
        assert_eq!(snapshot.rsi14, 100.0);
        assert_eq!(snapshot.rsi_signal, RsiSignal::Overbought);
        assert_eq!(snapshot.last_close, 159.0);
        assert_eq!(snapshot.sample_count, 60);
    }

    #[test]
    fn test_linear_downtrend() {
        let closes: Vec<f64> = linear(100.0, 60).into_iter().rev().collect();
        let snapshot = compute(&series("TCS", Period::ThreeMonths, &closes)).unwrap();

        assert_eq!(snapshot.trend, Trend::Bearish);
        assert_eq!(snapshot.rsi14, 0.0);
        assert_eq!(snapshot.rsi_signal, RsiSignal::Oversold);
    }

    #[test]
    fn test_flat_series_is_bearish_and_neutral() {
        let snapshot = compute(&series("TCS", Period::ThreeMonths, &[100.0; 55])).unwrap();

        assert_eq!(snapshot.sma20, snapshot.sma50);
        assert_eq!(snapshot.trend, Trend::Bearish);
        assert_eq!(snapshot.rsi14, 50.0);
        assert_eq!(snapshot.rsi_signal, RsiSignal::Neutral);
    }

    #[test]
    fn test_rsi_uses_last_fourteen_changes() {
        // 20 rising bars, then alternating +2 / -1
        let mut closes = linear(100.0, 20);
        let mut last = 119.0;
        for i in 0..14 {
            last += if i % 2 == 0 { 2.0 } else { -1.0 };
            closes.push(last);
        }

        let snapshot = compute(&series("TCS", Period::ThreeMonths, &closes)).unwrap();
        // gains 7 × 2, losses 7 × 1 → RS = 2
        assert!((snapshot.rsi14 - 100.0 * 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_warm_up_averages_available_points() {
        let snapshot = compute(&series("TCS", Period::OneMonth, &linear(1.0, 30))).unwrap();
        // SMA50 over 30 points is the mean of all of them
        assert!((snapshot.sma50 - 15.5).abs() < 1e-9);
    }

    #[test]
    fn test_too_short_for_rsi() {
        let err = compute(&series("TCS", Period::FiveDays, &linear(1.0, 5))).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientHistory {
                actual: 5,
                required: 15
            }
        );
    }

    #[test]
    fn test_signal_thresholds() {
        assert_eq!(RsiSignal::from_rsi(29.99), RsiSignal::Oversold);
        assert_eq!(RsiSignal::from_rsi(30.0), RsiSignal::Neutral);
        assert_eq!(RsiSignal::from_rsi(70.0), RsiSignal::Neutral);
        assert_eq!(RsiSignal::from_rsi(70.01), RsiSignal::Overbought);
    }

    #[test]
    fn test_wire_keys() {
        let snapshot = compute(&series("TCS", Period::ThreeMonths, &linear(100.0, 60))).unwrap();
        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["rsi"], 100.0);
        assert_eq!(value["trend"], "Bullish");
        assert_eq!(value["rsi_signal"], "Overbought");
        assert_eq!(value["data_points"], 60);
    }

    #[tokio::test]
    async fn test_engine_uses_one_month_when_sufficient() {
        let mut fetcher = MockTimeSeriesFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|s, p, _| Ok(series(s.ticker(), p, &linear(100.0, 50))));

        let engine = IndicatorEngine::new(Arc::new(fetcher), &StockConfig::default());
        let snapshot = engine.analyze(&reliance()).await.unwrap();
        assert_eq!(snapshot.sample_count, 50);
    }

    #[tokio::test]
    async fn test_engine_falls_back_to_three_months() {
        let engine = engine_with(linear(100.0, 22), linear(100.0, 60));
        let snapshot = engine.analyze(&reliance()).await.unwrap();
        assert_eq!(snapshot.sample_count, 60);
        assert_eq!(snapshot.trend, Trend::Bullish);
    }

    #[tokio::test]
    async fn test_engine_insufficient_after_fallback() {
        let engine = engine_with(linear(100.0, 22), linear(100.0, 41));
        let err = engine.analyze(&reliance()).await.unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientHistory {
                actual: 41,
                required: 50
            }
        );
        assert_eq!(err.to_string(), "Insufficient data points. Got 41, need at least 50");
    }

    #[tokio::test]
    async fn test_engine_no_data() {
        let engine = engine_with(vec![], vec![]);
        let err = engine.analyze(&reliance()).await.unwrap_err();
        assert!(matches!(err, StockError::NoDataAvailable { .. }));
    }

    #[tokio::test]
    async fn test_engine_propagates_provider_failure() {
        let mut fetcher = MockTimeSeriesFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_, _, _| Err(StockError::external("Yahoo Finance", "timed out")));

        let engine = IndicatorEngine::new(Arc::new(fetcher), &StockConfig::default());
        let err = engine.analyze(&reliance()).await.unwrap_err();
        assert!(matches!(err, StockError::ExternalServiceError { .. }));
    }

    proptest! {
        /// RSI stays in range and the trend always agrees with the averages.
        #[test]
        fn rsi_in_range_and_trend_matches_averages(
            closes in prop::collection::vec(1.0f64..10_000.0, 50..120)
        ) {
            let snapshot = compute(&series("TCS", Period::ThreeMonths, &closes)).unwrap();

            prop_assert!((0.0..=100.0).contains(&snapshot.rsi14));
            prop_assert_eq!(
                snapshot.trend == Trend::Bullish,
                snapshot.sma20 > snapshot.sma50
            );
        }

        /// A strictly rising series has no losses, so RSI is pinned at 100.
        #[test]
        fn strictly_rising_series_has_rsi_100(
            start in 1.0f64..1_000.0,
            steps in prop::collection::vec(0.01f64..50.0, 49..100)
        ) {
            let mut closes = vec![start];
            for step in steps {
                let next = closes[closes.len() - 1] + step;
                closes.push(next);
            }

            let snapshot = compute(&series("TCS", Period::ThreeMonths, &closes)).unwrap();
            prop_assert_eq!(snapshot.rsi14, 100.0);
        }

        /// Same input, same output.
        #[test]
        fn compute_is_deterministic(
            closes in prop::collection::vec(1.0f64..10_000.0, 50..80)
        ) {
            let s = series("TCS", Period::ThreeMonths, &closes);
            prop_assert_eq!(compute(&s).unwrap(), compute(&s).unwrap());
        }
    }
}
