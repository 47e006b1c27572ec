//! Five-day performance scan over a list of tickers

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{Result, StockError};
use crate::models::PerformanceRecord;
use crate::series::{Interval, Period, PriceSeries};
use crate::sources::TimeSeriesFetcher;
use crate::symbol::SymbolResolver;
use crate::universe::SectorMap;

/// A ticker the scan had to skip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanFailure {
    pub symbol: String,
    pub reason: String,
}

/// Outcome of a scan
///
/// `records` keeps the input order. An empty `records` with a non-empty
/// `failures` means every symbol failed, not that nothing qualified.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub records: Vec<PerformanceRecord>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    /// Whether every scanned symbol failed
    pub fn all_failed(&self) -> bool {
        self.records.is_empty() && !self.failures.is_empty()
    }
}

/// Sequentially fetches five days of bars per symbol
pub struct UniverseScanner {
    fetcher: Arc<dyn TimeSeriesFetcher>,
    resolver: SymbolResolver,
    sectors: SectorMap,
}

impl UniverseScanner {
    pub fn new(
        fetcher: Arc<dyn TimeSeriesFetcher>,
        resolver: SymbolResolver,
        sectors: SectorMap,
    ) -> Self {
        Self {
            fetcher,
            resolver,
            sectors,
        }
    }

    /// Scan `tickers` in order, skipping any that fail or have no data
    #[instrument(skip_all)]
    pub async fn scan<I, S>(&self, tickers: I) -> ScanReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ScanReport::default();

        for ticker in tickers {
            let ticker = ticker.as_ref();
            match self.scan_one(ticker).await {
                Ok(record) => report.records.push(record),
                Err(e) => {
                    warn!(symbol = ticker, error = %e, "skipping symbol");
                    report.failures.push(ScanFailure {
                        symbol: ticker.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            records = report.records.len(),
            failures = report.failures.len(),
            "universe scan finished"
        );
        report
    }

    async fn scan_one(&self, ticker: &str) -> Result<PerformanceRecord> {
        let symbol = self.resolver.resolve(ticker)?;
        let series = self
            .fetcher
            .fetch(&symbol, Period::FiveDays, Interval::Daily)
            .await?;

        performance(&series, self.sectors.sector(symbol.ticker()))
            .ok_or_else(|| StockError::no_data(symbol.qualified(), "empty 5-day series"))
    }
}

/// Five-day record of a non-empty series
fn performance(series: &PriceSeries, sector: &str) -> Option<PerformanceRecord> {
    let first = series.first()?;
    let last = series.last()?;

    let total_volume: u64 = series.points().iter().map(|p| p.volume).sum();
    let avg_volume = (total_volume as f64 / series.len() as f64).round() as u64;

    Some(PerformanceRecord {
        symbol: series.symbol.ticker().to_string(),
        current_price: last.close,
        performance_5d: (last.close / first.close - 1.0) * 100.0,
        avg_volume,
        sector: sector.to_string(),
    })
}
