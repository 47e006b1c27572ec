//! Payloads returned by the market pipeline

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::series::{PricePoint, PriceSeries};
use crate::symbol::Symbol;

/// Sentinel emitted for unknown numeric fields
pub const NOT_AVAILABLE: &str = "N/A";

/// Round to two decimals, as prices appear on the wire
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Serde helpers shared by the payload types
pub(crate) mod wire {
    use super::{NOT_AVAILABLE, round2};
    use chrono::{DateTime, Utc};
    use serde::{Serialize, Serializer};

    pub fn rounded<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(round2(*value))
    }

    pub fn rounded_or_na<S: Serializer>(
        value: &Option<f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) if v.is_finite() => serializer.serialize_f64(round2(*v)),
            _ => serializer.serialize_str(NOT_AVAILABLE),
        }
    }

    pub fn or_na<T: Serialize, S: Serializer>(
        value: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_str(NOT_AVAILABLE),
        }
    }

    pub fn timestamp<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Latest price against the previous reference price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub price: f64,
    pub change: f64,
    /// `None` when the reference price makes the ratio non-finite
    pub change_percent: Option<f64>,
    pub volume: u64,
}

impl PriceChange {
    /// Compare the last close with the previous close (or the last open when
    /// only one bar exists). `None` for an empty series.
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        let last = series.last()?;
        let reference = series.previous_close()?;
        let change = last.close - reference;
        let percent = change / reference * 100.0;

        Some(Self {
            price: last.close,
            change,
            change_percent: percent.is_finite().then_some(percent),
            volume: last.volume,
        })
    }
}

/// Valuation figures that are not part of chart data
///
/// Each field is `None` when the provider does not report it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Fundamentals {
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
}

/// Current quote and fundamentals of one equity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockSnapshot {
    pub symbol: Symbol,
    #[serde(serialize_with = "wire::rounded")]
    pub current_price: f64,
    #[serde(serialize_with = "wire::rounded_or_na")]
    pub day_high: Option<f64>,
    #[serde(serialize_with = "wire::rounded_or_na")]
    pub day_low: Option<f64>,
    #[serde(serialize_with = "wire::or_na")]
    pub volume: Option<u64>,
    #[serde(serialize_with = "wire::rounded_or_na")]
    pub market_cap: Option<f64>,
    #[serde(serialize_with = "wire::rounded_or_na")]
    pub pe_ratio: Option<f64>,
    #[serde(rename = "52_week_high", serialize_with = "wire::rounded_or_na")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(rename = "52_week_low", serialize_with = "wire::rounded_or_na")]
    pub fifty_two_week_low: Option<f64>,
    #[serde(serialize_with = "wire::timestamp")]
    pub last_updated: DateTime<Utc>,
}

/// One row of the stock list and of the gainers/losers tables
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub symbol: String,
    pub name: String,
    #[serde(serialize_with = "wire::rounded")]
    pub price: f64,
    #[serde(serialize_with = "wire::rounded")]
    pub change: f64,
    #[serde(serialize_with = "wire::rounded_or_na")]
    pub change_percent: Option<f64>,
    pub sector: String,
    pub volume: u64,
    #[serde(serialize_with = "wire::rounded_or_na")]
    pub market_cap: Option<f64>,
    #[serde(serialize_with = "wire::rounded_or_na")]
    pub pe_ratio: Option<f64>,
    #[serde(serialize_with = "wire::rounded_or_na")]
    pub eps: Option<f64>,
    pub currency: String,
}

/// Latest level of a market index
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQuote {
    pub symbol: String,
    pub name: String,
    #[serde(serialize_with = "wire::rounded")]
    pub price: f64,
    #[serde(serialize_with = "wire::rounded")]
    pub change: f64,
    #[serde(serialize_with = "wire::rounded_or_na")]
    pub change_percent: Option<f64>,
    pub currency: String,
}

/// Five-day performance of one universe member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRecord {
    pub symbol: String,
    #[serde(serialize_with = "wire::rounded")]
    pub current_price: f64,
    #[serde(serialize_with = "wire::rounded")]
    pub performance_5d: f64,
    pub avg_volume: u64,
    pub sector: String,
}

/// A news article attached to an analysis or listed by the news route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub snippet: String,
    pub source: String,
    pub url: String,
    pub published_at: String,
}

impl NewsItem {
    /// Longest snippet kept before truncation
    pub const SNIPPET_LIMIT: usize = 150;

    /// Cut a summary to [`Self::SNIPPET_LIMIT`] characters and mark the cut with "..."
    pub fn snippet_from(summary: &str) -> String {
        let summary = summary.trim();
        if summary.chars().count() > Self::SNIPPET_LIMIT {
            let cut: String = summary.chars().take(Self::SNIPPET_LIMIT).collect();
            format!("{cut}...")
        } else {
            summary.to_string()
        }
    }
}

/// A price bar as served to charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub date: NaiveDate,
    #[serde(serialize_with = "wire::rounded")]
    pub open: f64,
    #[serde(serialize_with = "wire::rounded")]
    pub high: f64,
    #[serde(serialize_with = "wire::rounded")]
    pub low: f64,
    #[serde(serialize_with = "wire::rounded")]
    pub close: f64,
    pub volume: u64,
    pub currency: String,
}

impl ChartBar {
    pub fn from_point(point: &PricePoint, currency: &str) -> Self {
        Self {
            date: point.date,
            open: point.open,
            high: point.high,
            low: point.low,
            close: point.close,
            volume: point.volume,
            currency: currency.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Period;
    use crate::series::test_support::series;
    use crate::symbol::SymbolResolver;
    use serde_json::json;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(-2.344), -2.34);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_price_change_uses_previous_close() {
        let change = PriceChange::from_series(&series("TCS", Period::FiveDays, &[100.0, 110.0]))
            .unwrap();
        assert_eq!(change.price, 110.0);
        assert_eq!(change.change, 10.0);
        assert_eq!(change.change_percent, Some(10.0));
    }

    #[test]
    fn test_price_change_single_bar_uses_open() {
        let mut one = series("TCS", Period::FiveDays, &[100.0]);
        assert_eq!(PriceChange::from_series(&one).unwrap().change, 0.0);

        one = PriceSeries::new(
            one.symbol.clone(),
            one.period,
            one.interval,
            vec![PricePoint {
                open: 0.0,
                ..one.points()[0]
            }],
        );
        assert_eq!(PriceChange::from_series(&one).unwrap().change_percent, None);
        assert!(PriceChange::from_series(&series("TCS", Period::FiveDays, &[])).is_none());
    }

    #[test]
    fn test_snapshot_wire_format() {
        let snapshot = StockSnapshot {
            symbol: SymbolResolver::default().resolve("tcs").unwrap(),
            current_price: 3_456.789,
            day_high: Some(3_500.0),
            day_low: None,
            volume: Some(12_000),
            market_cap: None,
            pe_ratio: None,
            fifty_two_week_high: Some(4_000.123),
            fifty_two_week_low: Some(3_000.0),
            last_updated: DateTime::from_timestamp(0, 0).unwrap(),
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["symbol"], "TCS.NS");
        assert_eq!(value["current_price"], 3_456.79);
        assert_eq!(value["day_low"], "N/A");
        assert_eq!(value["market_cap"], "N/A");
        assert_eq!(value["52_week_high"], 4_000.12);
        assert_eq!(value["last_updated"], "1970-01-01 00:00:00");
    }

    #[test]
    fn test_mover_is_camel_case() {
        let mover = Mover {
            symbol: "INFY".to_string(),
            name: "Infosys".to_string(),
            price: 1_500.0,
            change: 15.0,
            change_percent: Some(1.0),
            sector: "IT".to_string(),
            volume: 10,
            market_cap: None,
            pe_ratio: None,
            eps: None,
            currency: "INR".to_string(),
        };

        let value = serde_json::to_value(&mover).unwrap();
        assert_eq!(value["changePercent"], 1.0);
        assert_eq!(value["peRatio"], "N/A");
        assert!(value.get("change_percent").is_none());
    }

    #[test]
    fn test_snippet_truncation() {
        let long = "x".repeat(200);
        let snippet = NewsItem::snippet_from(&long);
        assert_eq!(snippet.len(), 153);
        assert!(snippet.ends_with("..."));
        assert_eq!(NewsItem::snippet_from(" short "), "short");
    }

    #[test]
    fn test_chart_bar_date_format() {
        let s = series("TCS", Period::FiveDays, &[101.234]);
        let bar = ChartBar::from_point(&s.points()[0], "INR");
        assert_eq!(
            serde_json::to_value(&bar).unwrap(),
            json!({
                "date": "2024-01-01",
                "open": 101.23,
                "high": 102.25,
                "low": 100.22,
                "close": 101.23,
                "volume": 1000,
                "currency": "INR"
            })
        );
    }
}
