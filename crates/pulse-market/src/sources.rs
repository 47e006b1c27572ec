//! Collaborator traits for price, quote and news providers

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, StockError};
use crate::models::{Fundamentals, NewsItem, StockSnapshot};
use crate::series::{Interval, Period, PriceSeries};
use crate::symbol::Symbol;

/// Source of OHLCV series
///
/// An empty series is the "no data" answer; errors are reserved for provider
/// failures and timeouts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimeSeriesFetcher: Send + Sync {
    async fn fetch(&self, symbol: &Symbol, period: Period, interval: Interval)
    -> Result<PriceSeries>;
}

/// Source of the current quote and fundamentals of an equity
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn snapshot(&self, symbol: &Symbol) -> Result<StockSnapshot>;
}

/// Source of valuation figures such as market cap and P/E
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    async fn fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals>;
}

/// Source of company and market news
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Recent articles about one company, newest first
    async fn company_news(&self, symbol: &Symbol, limit: usize) -> Result<Vec<NewsItem>>;

    /// General market headlines, de-duplicated by title
    async fn market_news(&self, limit: usize) -> Result<Vec<NewsItem>>;
}

/// Builds snapshots from chart data
///
/// Price, day range and volume come from the latest daily bar; the 52-week
/// range from a one-year series. Market cap and P/E come from the optional
/// [`FundamentalsSource`] and stay unknown without one.
pub struct ChartQuoteSource {
    fetcher: Arc<dyn TimeSeriesFetcher>,
    fundamentals: Option<Arc<dyn FundamentalsSource>>,
}

impl ChartQuoteSource {
    pub fn new(fetcher: Arc<dyn TimeSeriesFetcher>) -> Self {
        Self {
            fetcher,
            fundamentals: None,
        }
    }

    pub fn with_fundamentals(mut self, source: Arc<dyn FundamentalsSource>) -> Self {
        self.fundamentals = Some(source);
        self
    }
}

/// Fundamentals from `source`, or all-unknown when it is absent or fails
pub(crate) async fn fundamentals_or_unknown(
    source: Option<&Arc<dyn FundamentalsSource>>,
    symbol: &Symbol,
) -> Fundamentals {
    let Some(source) = source else {
        return Fundamentals::default();
    };
    match source.fundamentals(symbol).await {
        Ok(fundamentals) => fundamentals,
        Err(e) => {
            debug!(symbol = %symbol, error = %e, "fundamentals unavailable");
            Fundamentals::default()
        }
    }
}

#[async_trait]
impl QuoteSource for ChartQuoteSource {
    async fn snapshot(&self, symbol: &Symbol) -> Result<StockSnapshot> {
        let today = self
            .fetcher
            .fetch(symbol, Period::OneDay, Interval::Daily)
            .await?;

        let Some(latest) = today.last() else {
            return Err(StockError::no_data(
                symbol.qualified(),
                "No current data available",
            ));
        };

        // The yearly range is an enrichment; a failure here leaves it unknown.
        let (year_high, year_low) = match self
            .fetcher
            .fetch(symbol, Period::OneYear, Interval::Daily)
            .await
        {
            Ok(year) if !year.is_empty() => (
                year.points().iter().map(|p| p.high).reduce(f64::max),
                year.points().iter().map(|p| p.low).reduce(f64::min),
            ),
            Ok(_) => (None, None),
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "52-week range unavailable");
                (None, None)
            }
        };

        let fundamentals = fundamentals_or_unknown(self.fundamentals.as_ref(), symbol).await;

        Ok(StockSnapshot {
            symbol: symbol.clone(),
            current_price: latest.close,
            day_high: Some(latest.high),
            day_low: Some(latest.low),
            volume: Some(latest.volume),
            market_cap: fundamentals.market_cap,
            pe_ratio: fundamentals.pe_ratio,
            fifty_two_week_high: year_high,
            fifty_two_week_low: year_low,
            last_updated: Utc::now(),
        })
    }
}

/// News source used when no news provider is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNews;

#[async_trait]
impl NewsSource for NoNews {
    async fn company_news(&self, _symbol: &Symbol, _limit: usize) -> Result<Vec<NewsItem>> {
        Ok(Vec::new())
    }

    async fn market_news(&self, _limit: usize) -> Result<Vec<NewsItem>> {
        Ok(Vec::new())
    }
}
