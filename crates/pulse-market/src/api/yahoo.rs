//! Yahoo Finance chart and quote-summary client

use async_trait::async_trait;
use chrono::DateTime;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

use crate::error::{Result, StockError};
use crate::models::Fundamentals;
use crate::series::{Interval, Period, PricePoint, PriceSeries};
use crate::sources::{FundamentalsSource, TimeSeriesFetcher};
use crate::symbol::Symbol;

const SERVICE: &str = "Yahoo Finance";

/// Yahoo Finance API client
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
    /// Quote-summary calls refresh the crumb and cookie in place
    summary: Mutex<yahoo::YahooConnector>,
    timeout: Duration,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client whose calls give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| StockError::external(SERVICE, e))?;
        let summary =
            yahoo::YahooConnector::new().map_err(|e| StockError::external(SERVICE, e))?;
        Ok(Self {
            connector,
            summary: Mutex::new(summary),
            timeout,
        })
    }

    fn timed_out(&self) -> StockError {
        StockError::external(
            SERVICE,
            format!("request timed out after {}s", self.timeout.as_secs()),
        )
    }

    /// Raw chart bars for a range, converted to price points
    async fn chart(&self, ticker: &str, period: Period, interval: Interval) -> Result<Vec<PricePoint>> {
        let request = self
            .connector
            .get_quote_range(ticker, interval.as_str(), period.as_str());

        let response = match tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| self.timed_out())?
        {
            Ok(response) => response,
            Err(e) => {
                debug!(ticker, error = %e, "chart request failed");
                return empty_on_no_data(e);
            }
        };

        // A response without a quote table is how Yahoo reports "no data".
        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) => {
                debug!(ticker, error = %e, "chart response carried no quotes");
                return Ok(Vec::new());
            }
        };

        Ok(quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PricePoint {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect())
    }
}

/// Maps a chart error to the "no data" answer or a provider failure
///
/// Yahoo answers unknown or delisted tickers with an API error body and
/// data-less ranges with an empty result; both mean an empty series.
fn empty_on_no_data(error: yahoo::YahooError) -> Result<Vec<PricePoint>> {
    match error {
        yahoo::YahooError::ApiError(_)
        | yahoo::YahooError::NoResult
        | yahoo::YahooError::NoQuotes => Ok(Vec::new()),
        other => Err(StockError::external(SERVICE, other)),
    }
}

/// Market cap, trailing P/E and trailing EPS out of a quote summary
///
/// Non-finite figures (Yahoo sends "Infinity" for loss-making companies)
/// count as unknown.
fn fundamentals_from_summary(summary: &yahoo::YQuoteSummary) -> Fundamentals {
    let Some(data) = summary
        .quote_summary
        .as_ref()
        .and_then(|s| s.result.as_ref())
        .and_then(|r| r.first())
    else {
        return Fundamentals::default();
    };

    let detail = data.summary_detail.as_ref();
    let stats = data.default_key_statistics.as_ref();

    Fundamentals {
        market_cap: detail.and_then(|d| d.market_cap).map(|cap| cap as f64),
        pe_ratio: detail.and_then(|d| d.trailing_pe).filter(|pe| pe.is_finite()),
        eps: stats.and_then(|s| s.trailing_eps).filter(|eps| eps.is_finite()),
    }
}

#[async_trait]
impl TimeSeriesFetcher for YahooFinanceClient {
    #[instrument(skip(self), fields(symbol = %symbol))]
    async fn fetch(
        &self,
        symbol: &Symbol,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries> {
        let bars = self.chart(symbol.qualified(), period, interval).await?;
        let series = PriceSeries::new(symbol.clone(), period, interval, bars);
        debug!(points = series.len(), "fetched price series");
        Ok(series)
    }
}

#[async_trait]
impl FundamentalsSource for YahooFinanceClient {
    #[instrument(skip(self), fields(symbol = %symbol))]
    async fn fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals> {
        let mut connector = self.summary.lock().await;
        let summary = tokio::time::timeout(
            self.timeout,
            connector.get_ticker_info(symbol.qualified()),
        )
        .await
        .map_err(|_| self.timed_out())?
        .map_err(|e| StockError::external(SERVICE, e))?;

        Ok(fundamentals_from_summary(&summary))
    }
}
