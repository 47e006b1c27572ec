//! Universe-wide market views: stock list, movers, indices, history, trending

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::models::{ChartBar, IndexQuote, Mover, PriceChange};
use crate::ranking::{MarketMovers, RankingEngine, TrendingReport};
use crate::scanner::{ScanReport, UniverseScanner};
use crate::series::{Interval, Period, PriceSeries};
use crate::sources::{FundamentalsSource, TimeSeriesFetcher, fundamentals_or_unknown};
use crate::symbol::{Symbol, SymbolResolver};
use crate::universe::Universe;

/// Universe size used when looking for gainers and losers
pub const MOVERS_UNIVERSE: usize = 100;

/// Read-only views over the configured universe
pub struct MarketService {
    fetcher: Arc<dyn TimeSeriesFetcher>,
    fundamentals: Option<Arc<dyn FundamentalsSource>>,
    universe: Arc<Universe>,
    resolver: SymbolResolver,
    scanner: UniverseScanner,
    ranking: RankingEngine,
    currency: String,
}

impl MarketService {
    pub fn new(
        fetcher: Arc<dyn TimeSeriesFetcher>,
        universe: Arc<Universe>,
        config: &StockConfig,
    ) -> Self {
        let resolver = SymbolResolver::new(&config.exchange_suffix);
        let scanner = UniverseScanner::new(
            fetcher.clone(),
            resolver.clone(),
            universe.sectors().clone(),
        );

        Self {
            fetcher,
            fundamentals: None,
            universe,
            resolver,
            scanner,
            ranking: RankingEngine::default(),
            currency: config.currency.clone(),
        }
    }

    /// Fill market cap, P/E and EPS of listed stocks from `source`
    pub fn with_fundamentals(mut self, source: Arc<dyn FundamentalsSource>) -> Self {
        self.fundamentals = Some(source);
        self
    }

    pub fn resolver(&self) -> &SymbolResolver {
        &self.resolver
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Latest move of the first `limit` universe members, skipping failures
    #[instrument(skip(self))]
    pub async fn stocks(&self, limit: usize) -> Vec<Mover> {
        let mut movers = Vec::new();

        for entry in self.universe.stocks().iter().take(limit) {
            match self.mover(&entry.symbol).await {
                Ok(Some(mover)) => movers.push(mover),
                Ok(None) => warn!(symbol = %entry.symbol, "no recent bars, skipping"),
                Err(e) => warn!(symbol = %entry.symbol, error = %e, "skipping symbol"),
            }
        }

        info!(count = movers.len(), "stock list built");
        movers
    }

    async fn mover(&self, ticker: &str) -> Result<Option<Mover>> {
        let symbol = self.resolver.resolve(ticker)?;
        let series = self.recent(&symbol).await?;

        let Some(change) = PriceChange::from_series(&series) else {
            return Ok(None);
        };
        let fundamentals = fundamentals_or_unknown(self.fundamentals.as_ref(), &symbol).await;

        Ok(Some(Mover {
            symbol: symbol.ticker().to_string(),
            name: self.universe.name_of(symbol.ticker()).to_string(),
            price: change.price,
            change: change.change,
            change_percent: change.change_percent,
            sector: self.universe.sectors().sector(symbol.ticker()).to_string(),
            volume: change.volume,
            market_cap: fundamentals.market_cap,
            pe_ratio: fundamentals.pe_ratio,
            eps: fundamentals.eps,
            currency: self.currency.clone(),
        }))
    }

    /// Top five gainers and losers of the movers universe
    pub async fn market_movers(&self) -> MarketMovers {
        let stocks = self.stocks(MOVERS_UNIVERSE).await;
        self.ranking.gainers_and_losers(&stocks)
    }

    /// Latest level of every configured index, skipping failures
    #[instrument(skip(self))]
    pub async fn indices(&self) -> Vec<IndexQuote> {
        let mut quotes = Vec::new();

        for index in self.universe.indices() {
            let quote = async {
                let symbol = self.resolver.resolve(&index.ticker)?;
                let series = self.recent(&symbol).await?;
                Ok::<_, StockError>(PriceChange::from_series(&series))
            };

            match quote.await {
                Ok(Some(change)) => quotes.push(IndexQuote {
                    symbol: index.key.clone(),
                    name: index.display_name().to_string(),
                    price: change.price,
                    change: change.change,
                    change_percent: change.change_percent,
                    currency: self.currency.clone(),
                }),
                Ok(None) => warn!(index = %index.key, "no recent bars, skipping"),
                Err(e) => warn!(index = %index.key, error = %e, "skipping index"),
            }
        }

        quotes
    }

    /// Daily bars of `raw` over `period`; empty when the provider has none
    pub async fn price_history(&self, raw: &str, period: Period) -> Result<Vec<ChartBar>> {
        let symbol = self.resolver.resolve(raw)?;
        self.history(&symbol, period).await
    }

    /// Daily bars of an already resolved symbol
    pub async fn history(&self, symbol: &Symbol, period: Period) -> Result<Vec<ChartBar>> {
        let series = self.fetcher.fetch(symbol, period, Interval::Daily).await?;
        Ok(series
            .points()
            .iter()
            .map(|p| ChartBar::from_point(p, &self.currency))
            .collect())
    }

    /// Five-day scan of the trending subset
    pub async fn scan_trending(&self) -> ScanReport {
        let report = self.scanner.scan(self.universe.trending()).await;
        if report.all_failed() {
            warn!(
                failures = report.failures.len(),
                "every trending symbol failed"
            );
        }
        report
    }

    /// Top movers, most active and sector averages of the trending subset
    pub async fn trending(&self) -> TrendingReport {
        let report = self.scan_trending().await;
        self.ranking.trending(&report.records)
    }

    async fn recent(&self, symbol: &Symbol) -> Result<PriceSeries> {
        self.fetcher
            .fetch(symbol, Period::FiveDays, Interval::Daily)
            .await
    }
}
