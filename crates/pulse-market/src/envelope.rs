//! Composite per-symbol analysis
//!
//! Each slot of an [`AnalysisEnvelope`] is filled independently: a failing
//! provider turns its own slot into `{"error": "..."}` and leaves the others
//! untouched.

use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::config::StockConfig;
use crate::error::Result;
use crate::indicators::{IndicatorEngine, IndicatorSnapshot};
use crate::models::{NewsItem, StockSnapshot};
use crate::narrative::{Headline, NarrativeGenerator, NarrativeRequest};
use crate::sources::{NewsSource, QuoteSource};
use crate::symbol::Symbol;

/// A value, or the message of the error that prevented it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Slot<T> {
    Ready(T),
    Failed { error: String },
}

impl<T> Slot<T> {
    pub fn failed(error: impl ToString) -> Self {
        Slot::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Slot::Ready(value) => Some(value),
            Slot::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Slot::Ready(_) => None,
            Slot::Failed { error } => Some(error),
        }
    }
}

impl<T> From<Result<T>> for Slot<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Slot::Ready(value),
            Err(e) => Slot::failed(e),
        }
    }
}

/// Snapshot, indicators, news and narrative of one symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisEnvelope {
    pub stock_data: Slot<StockSnapshot>,
    pub technical_data: Slot<IndicatorSnapshot>,
    pub news_data: Slot<Vec<NewsItem>>,
    pub analysis: Slot<String>,
}

/// Assembles [`AnalysisEnvelope`]s from the configured collaborators
pub struct AnalysisEnvelopeBuilder {
    quotes: Arc<dyn QuoteSource>,
    indicators: Arc<IndicatorEngine>,
    news: Arc<dyn NewsSource>,
    narrator: Arc<dyn NarrativeGenerator>,
    news_limit: usize,
    narrative_headlines: usize,
}

impl AnalysisEnvelopeBuilder {
    pub fn new(
        quotes: Arc<dyn QuoteSource>,
        indicators: Arc<IndicatorEngine>,
        news: Arc<dyn NewsSource>,
        narrator: Arc<dyn NarrativeGenerator>,
        config: &StockConfig,
    ) -> Self {
        Self {
            quotes,
            indicators,
            news,
            narrator,
            news_limit: config.news_limit,
            narrative_headlines: config.narrative_headlines,
        }
    }

    /// Fill every slot for `symbol`; never fails as a whole
    #[instrument(skip(self), fields(symbol = %symbol))]
    pub async fn build(&self, symbol: &Symbol) -> AnalysisEnvelope {
        let stock_data = Slot::from(self.quotes.snapshot(symbol).await);
        if let Some(error) = stock_data.error() {
            warn!(error, "stock snapshot unavailable");
        }

        let technical_data = Slot::from(self.indicators.analyze(symbol).await);
        if let Some(error) = technical_data.error() {
            warn!(error, "technical indicators unavailable");
        }

        let news_data = Slot::from(self.news.company_news(symbol, self.news_limit).await);
        if let Some(error) = news_data.error() {
            warn!(error, "news unavailable");
        }

        let request = NarrativeRequest {
            symbol: symbol.clone(),
            stock_data: stock_data.clone(),
            technical_data: technical_data.clone(),
            headlines: news_data
                .ready()
                .map(|items| {
                    items
                        .iter()
                        .take(self.narrative_headlines)
                        .map(Headline::from)
                        .collect()
                })
                .unwrap_or_default(),
        };

        let analysis = Slot::from(self.narrator.narrate(&request).await);
        if let Some(error) = analysis.error() {
            warn!(error, "narrative unavailable");
        }

        AnalysisEnvelope {
            stock_data,
            technical_data,
            news_data,
            analysis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StockError;
    use crate::narrative::MockNarrativeGenerator;
    use crate::series::Period;
    use crate::series::test_support::series;
    use crate::sources::{MockNewsSource, MockQuoteSource, MockTimeSeriesFetcher};
    use crate::symbol::SymbolResolver;
    use chrono::Utc;

    fn snapshot(symbol: &Symbol) -> StockSnapshot {
        StockSnapshot {
            symbol: symbol.clone(),
            current_price: 3_500.0,
            day_high: Some(3_550.0),
            day_low: Some(3_480.0),
            volume: Some(1_000_000),
            market_cap: None,
            pe_ratio: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
            last_updated: Utc::now(),
        }
    }

    fn news(count: usize) -> Vec<NewsItem> {
        (0..count)
            .map(|i| NewsItem {
                title: format!("Headline {i}"),
                snippet: format!("Snippet {i}"),
                source: "Reuters".to_string(),
                url: String::new(),
                published_at: String::new(),
            })
            .collect()
    }

    fn rising_fetcher() -> MockTimeSeriesFetcher {
        let mut fetcher = MockTimeSeriesFetcher::new();
        fetcher.expect_fetch().returning(|s, p, _| {
            let closes: Vec<f64> = (0..60_u32).map(|i| 100.0 + f64::from(i)).collect();
            Ok(series(s.ticker(), p, &closes))
        });
        fetcher
    }

    fn builder(
        quotes: MockQuoteSource,
        fetcher: MockTimeSeriesFetcher,
        news: MockNewsSource,
        narrator: MockNarrativeGenerator,
    ) -> AnalysisEnvelopeBuilder {
        let config = StockConfig::default();
        AnalysisEnvelopeBuilder::new(
            Arc::new(quotes),
            Arc::new(IndicatorEngine::new(Arc::new(fetcher), &config)),
            Arc::new(news),
            Arc::new(narrator),
            &config,
        )
    }

    fn tcs() -> Symbol {
        SymbolResolver::default().resolve("TCS").unwrap()
    }

    #[test]
    fn test_slot_wire_format() {
        let ready: Slot<u32> = Slot::Ready(7);
        let failed: Slot<u32> = Slot::from(Err(StockError::InvalidSymbol("x".to_string())));

        assert_eq!(serde_json::to_value(&ready).unwrap(), 7);
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"error": "Invalid symbol: x"})
        );
        assert_eq!(failed.error(), Some("Invalid symbol: x"));
        assert!(ready.is_ready());
    }

    #[tokio::test]
    async fn test_full_envelope() {
        let mut quotes = MockQuoteSource::new();
        quotes
            .expect_snapshot()
            .returning(|symbol| Ok(snapshot(symbol)));

        let mut news_source = MockNewsSource::new();
        news_source
            .expect_company_news()
            .withf(|_, limit| *limit == 10)
            .returning(|_, _| Ok(news(8)));

        let mut narrator = MockNarrativeGenerator::new();
        narrator
            .expect_narrate()
            .withf(|request| {
                request.symbol.qualified() == "TCS.NS"
                    && request.stock_data.is_ready()
                    && request.technical_data.is_ready()
                    && request.headlines.len() == 5
                    && request.headlines[0].title == "Headline 0"
            })
            .times(1)
            .returning(|_| Ok("Accumulate on dips.".to_string()));

        let envelope = builder(quotes, rising_fetcher(), news_source, narrator)
            .build(&tcs())
            .await;

        assert!(envelope.stock_data.is_ready());
        assert_eq!(
            envelope.technical_data.ready().map(|t| t.sample_count),
            Some(60)
        );
        assert_eq!(envelope.news_data.ready().map(Vec::len), Some(8));
        assert_eq!(envelope.analysis, Slot::Ready("Accumulate on dips.".to_string()));
    }

    #[tokio::test]
    async fn test_failures_stay_in_their_slots() {
        let mut quotes = MockQuoteSource::new();
        quotes
            .expect_snapshot()
            .returning(|symbol| Err(StockError::no_data(symbol.qualified(), "No current data available")));

        let mut fetcher = MockTimeSeriesFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|s, p, _| Ok(series(s.ticker(), p, &[100.0; 41])));

        let mut news_source = MockNewsSource::new();
        news_source
            .expect_company_news()
            .returning(|_, _| Err(StockError::external("Finnhub", "HTTP 503")));

        let mut narrator = MockNarrativeGenerator::new();
        narrator
            .expect_narrate()
            .withf(|request| {
                !request.stock_data.is_ready()
                    && request.technical_data.error()
                        == Some("Insufficient data points. Got 41, need at least 50")
                    && request.headlines.is_empty()
            })
            .returning(|_| Ok("Limited data; no call.".to_string()));

        let envelope = builder(quotes, fetcher, news_source, narrator)
            .build(&tcs())
            .await;

        assert!(envelope.stock_data.error().is_some());
        assert!(envelope.technical_data.error().is_some());
        assert_eq!(envelope.news_data.error(), Some("Finnhub error: HTTP 503"));
        assert!(envelope.analysis.is_ready());
    }

    #[tokio::test]
    async fn test_narrative_failure_only_fills_analysis() {
        let mut quotes = MockQuoteSource::new();
        quotes
            .expect_snapshot()
            .returning(|symbol| Ok(snapshot(symbol)));

        let mut news_source = MockNewsSource::new();
        news_source
            .expect_company_news()
            .returning(|_, _| Ok(Vec::new()));

        let mut narrator = MockNarrativeGenerator::new();
        narrator.expect_narrate().returning(|_| {
            Err(StockError::external("Narrative provider", "Rate limit exceeded"))
        });

        let envelope = builder(quotes, rising_fetcher(), news_source, narrator)
            .build(&tcs())
            .await;

        assert!(envelope.stock_data.is_ready());
        assert!(envelope.technical_data.is_ready());
        assert_eq!(envelope.news_data, Slot::Ready(Vec::new()));

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value["analysis"]["error"],
            "Narrative provider error: Rate limit exceeded"
        );
        assert_eq!(value["technical_data"]["trend"], "Bullish");
    }

    #[tokio::test]
    async fn test_one_month_history_is_enough() {
        // The snapshot comes from the quote source, not the indicator history.
        let mut quotes = MockQuoteSource::new();
        quotes.expect_snapshot().times(1).returning(|symbol| Ok(snapshot(symbol)));

        let mut fetcher = MockTimeSeriesFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|_, p, _| *p == Period::OneMonth)
            .times(1)
            .returning(|s, p, _| Ok(series(s.ticker(), p, &[100.0; 50])));

        let mut news_source = MockNewsSource::new();
        news_source.expect_company_news().returning(|_, _| Ok(news(1)));

        let mut narrator = MockNarrativeGenerator::new();
        narrator.expect_narrate().returning(|_| Ok(String::from("Hold.")));

        let envelope = builder(quotes, fetcher, news_source, narrator)
            .build(&tcs())
            .await;

        assert_eq!(envelope.stock_data.ready().map(|s| s.current_price), Some(3_500.0));
        assert_eq!(
            envelope.technical_data.ready().map(|t| t.trend),
            Some(crate::indicators::Trend::Bearish)
        );
    }
}
