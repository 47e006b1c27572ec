//! Route table and handlers

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use pulse_market::{AnalysisEnvelope, ChartBar, Period, Slot};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Display;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::state::AppState;

/// Rows returned by `/stocks` without a `limit`
pub const DEFAULT_STOCK_LIMIT: usize = 50;

/// Articles returned by `/news` without a `limit`
pub const DEFAULT_NEWS_LIMIT: usize = 10;

/// Symbol used by the narrative smoke test
const SMOKE_TEST_SYMBOL: &str = "TEST";

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/test_ai", get(test_ai))
        .route("/analyze/:symbol", get(analyze))
        .route("/trending", get(trending))
        .route("/market-movers", get(market_movers))
        .route("/market-indices", get(market_indices))
        .route("/stocks", get(stocks))
        .route("/news", get(news))
        .route("/stock-history/:symbol", get(stock_history))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct StocksQuery {
    #[serde(default = "default_stock_limit")]
    pub limit: usize,
}

fn default_stock_limit() -> usize {
    DEFAULT_STOCK_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    /// Company news when present, market news otherwise
    pub symbol: Option<String>,

    #[serde(default = "default_news_limit")]
    pub limit: usize,
}

fn default_news_limit() -> usize {
    DEFAULT_NEWS_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Unknown periods fall back to one year
    pub period: Option<String>,
}

/// `/analyze` body: the envelope slots plus a one-year chart
#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    #[serde(flatten)]
    envelope: AnalysisEnvelope,
    price_history: Slot<Vec<ChartBar>>,
}

fn failure(context: &str, err: impl Display) -> Response {
    Json(json!({ "error": format!("{context}: {err}") })).into_response()
}

async fn root() -> Response {
    Json(json!({ "message": "Welcome to Indian Stock Market Analysis Tool" })).into_response()
}

async fn health() -> Response {
    Json(json!({ "status": "API is running fine." })).into_response()
}

async fn analyze(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let symbol = match state.market.resolver().resolve(&raw) {
        Ok(symbol) => symbol,
        Err(e) => return failure("Failed to analyze stock", e),
    };
    info!(symbol = %symbol, "analyzing");

    let envelope = state.analyzer.build(&symbol).await;
    let price_history = Slot::from(state.market.history(&symbol, Period::OneYear).await);
    if let Some(error) = price_history.error() {
        warn!(symbol = %symbol, error, "price history unavailable");
    }

    Json(AnalyzeResponse {
        envelope,
        price_history,
    })
    .into_response()
}

/// Runs the whole envelope for a placeholder symbol and reports the narrative
async fn test_ai(State(state): State<AppState>) -> Response {
    let symbol = match state.market.resolver().resolve(SMOKE_TEST_SYMBOL) {
        Ok(symbol) => symbol,
        Err(e) => return failure("AI analysis failed", e),
    };

    match state.analyzer.build(&symbol).await.analysis {
        Slot::Ready(text) => Json(json!({ "test_analysis": text })).into_response(),
        Slot::Failed { error } => failure("AI analysis failed", error),
    }
}

async fn trending(State(state): State<AppState>) -> Response {
    Json(state.market.trending().await).into_response()
}

async fn market_movers(State(state): State<AppState>) -> Response {
    Json(state.market.market_movers().await).into_response()
}

async fn market_indices(State(state): State<AppState>) -> Response {
    let indices = state.market.indices().await;
    Json(json!({ "indices": indices })).into_response()
}

async fn stocks(State(state): State<AppState>, Query(params): Query<StocksQuery>) -> Response {
    let stocks = state.market.stocks(params.limit).await;
    Json(json!({ "stocks": stocks })).into_response()
}

async fn news(State(state): State<AppState>, Query(params): Query<NewsQuery>) -> Response {
    let requested = params.symbol.filter(|s| !s.trim().is_empty());

    let result = match requested {
        Some(raw) => match state.market.resolver().resolve(&raw) {
            Ok(symbol) => state.news.company_news(&symbol, params.limit).await,
            Err(e) => Err(e),
        },
        None => state.news.market_news(params.limit).await,
    };

    match result {
        Ok(items) => Json(json!({ "news": items })).into_response(),
        Err(e) => failure("Failed to fetch news", e),
    }
}

async fn stock_history(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Response {
    let period = Period::parse_or_default(params.period.as_deref());

    match state.market.price_history(&raw, period).await {
        Ok(history) => Json(json!({ "history": history })).into_response(),
        Err(e) => failure("Failed to fetch stock history", e),
    }
}
