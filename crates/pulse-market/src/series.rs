//! Price series types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StockError;
use crate::symbol::Symbol;

/// Lookback period understood by price providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    /// Every supported period, shortest first
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    /// Provider tag ("1mo", "ytd", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// Parse a period tag, falling back to one year when it is not recognised
    pub fn parse_or_default(raw: Option<&str>) -> Period {
        raw.and_then(|r| r.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == tag)
            .ok_or_else(|| {
                StockError::ConfigError(format!(
                    "Invalid period '{s}'. Valid periods: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max"
                ))
            })
    }
}

/// Sampling interval of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[default]
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
}

impl Interval {
    /// Provider tag ("1d", "1wk", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::OneHour => "1h",
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sampled bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Ordered bars for one symbol, period and interval
///
/// Points are chronological with strictly increasing dates and positive
/// closes. An empty series means the provider had no data.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub period: Period,
    pub interval: Interval,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, dropping bars that break the ordering or close invariants
    pub fn new(symbol: Symbol, period: Period, interval: Interval, bars: Vec<PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = Vec::with_capacity(bars.len());
        for bar in bars {
            if !(bar.close.is_finite() && bar.close > 0.0) {
                continue;
            }
            if points.last().is_some_and(|prev| prev.date >= bar.date) {
                continue;
            }
            points.push(bar);
        }

        Self {
            symbol,
            period,
            interval,
            points,
        }
    }

    /// An empty series ("no data")
    pub fn empty(symbol: Symbol, period: Period, interval: Interval) -> Self {
        Self::new(symbol, period, interval, Vec::new())
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Closing prices in chronological order
    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    /// Close of the bar before the last one, or the last bar's open when the
    /// series has a single bar
    pub fn previous_close(&self) -> Option<f64> {
        match self.points.as_slice() {
            [] => None,
            [only] => Some(only.open),
            [.., prev, _] => Some(prev.close),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::symbol::SymbolResolver;

    /// Daily bars starting 2024-01-01 with the given closes
    pub fn daily_bars(closes: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Days::new(i as u64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000 + i as u64,
            })
            .collect()
    }

    pub fn series(ticker: &str, period: Period, closes: &[f64]) -> PriceSeries {
        let symbol = SymbolResolver::default().resolve(ticker).unwrap();
        PriceSeries::new(symbol, period, Interval::Daily, daily_bars(closes))
    }
}
