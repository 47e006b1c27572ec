//! Shared handler state

use pulse_market::{AnalysisEnvelopeBuilder, MarketService, NewsSource};
use std::sync::Arc;

/// Read-only collaborators shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub market: Arc<MarketService>,
    pub analyzer: Arc<AnalysisEnvelopeBuilder>,
    pub news: Arc<dyn NewsSource>,
}

impl AppState {
    pub fn new(
        market: MarketService,
        analyzer: AnalysisEnvelopeBuilder,
        news: Arc<dyn NewsSource>,
    ) -> Self {
        Self {
            market: Arc::new(market),
            analyzer: Arc::new(analyzer),
            news,
        }
    }
}
