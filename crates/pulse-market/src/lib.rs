//! Market data aggregation and technical analysis pipeline
//!
//! This crate turns raw price series into the payloads served by pulse:
//!
//! - Symbol normalisation to exchange-qualified tickers
//! - Price series from Yahoo Finance behind the [`TimeSeriesFetcher`] trait
//! - SMA20 / SMA50 / RSI14 with a one-step history fallback
//! - Five-day universe scans with per-symbol failure isolation
//! - Top movers, most active, gainers/losers and sector averages
//! - Analysis envelopes whose slots degrade independently, plus an
//!   LLM-written narrative
//!
//! # Example
//!
//! ```rust,ignore
//! use pulse_market::{
//!     AnalysisEnvelopeBuilder, ChartQuoteSource, IndicatorEngine, LlmNarrator, NoNews,
//!     StockConfig, SymbolResolver, YahooFinanceClient,
//! };
//! use std::sync::Arc;
//!
//! let config = StockConfig::default();
//! let yahoo = Arc::new(YahooFinanceClient::new(config.request_timeout)?);
//! let builder = AnalysisEnvelopeBuilder::new(
//!     Arc::new(ChartQuoteSource::new(yahoo.clone())),
//!     Arc::new(IndicatorEngine::new(yahoo, &config)),
//!     Arc::new(NoNews),
//!     Arc::new(LlmNarrator::new(provider, &config)),
//!     &config,
//! );
//!
//! let symbol = SymbolResolver::default().resolve("tcs")?;
//! let envelope = builder.build(&symbol).await;
//! println!("{}", serde_json::to_string_pretty(&envelope)?);
//! ```

pub mod api;
pub mod config;
pub mod envelope;
pub mod error;
pub mod indicators;
pub mod market;
pub mod models;
pub mod narrative;
pub mod prompts;
pub mod ranking;
pub mod scanner;
pub mod series;
pub mod sources;
pub mod symbol;
pub mod universe;

// Re-export main types for convenience
pub use api::{FinnhubClient, YahooFinanceClient};
pub use config::StockConfig;
pub use envelope::{AnalysisEnvelope, AnalysisEnvelopeBuilder, Slot};
pub use error::{Result, StockError};
pub use indicators::{IndicatorEngine, IndicatorSnapshot, RsiSignal, Trend};
pub use market::MarketService;
pub use models::{
    ChartBar, Fundamentals, IndexQuote, Mover, NewsItem, PerformanceRecord, StockSnapshot,
};
pub use narrative::{Headline, LlmNarrator, NarrativeGenerator, NarrativeRequest};
pub use ranking::{MarketMovers, RankingEngine, TrendingReport};
pub use scanner::{ScanFailure, ScanReport, UniverseScanner};
pub use series::{Interval, Period, PricePoint, PriceSeries};
pub use sources::{
    ChartQuoteSource, FundamentalsSource, NewsSource, NoNews, QuoteSource, TimeSeriesFetcher,
};
pub use symbol::{Symbol, SymbolResolver};
pub use universe::{SectorMap, Universe};
