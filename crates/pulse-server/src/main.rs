//! pulse HTTP server

use anyhow::Context;
use clap::Parser;
use pulse_llm::providers::{OpenAIConfig, OpenAIProvider};
use pulse_market::{
    AnalysisEnvelopeBuilder, ChartQuoteSource, FinnhubClient, FundamentalsSource,
    IndicatorEngine, LlmNarrator, MarketService, NewsSource, NoNews, StockConfig,
    TimeSeriesFetcher, Universe, YahooFinanceClient,
};
use pulse_server::{AppState, router};
use pulse_utils::Settings;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "pulse-server")]
#[command(about = "Indian stock market analysis API", long_about = None)]
struct Args {
    /// Port to listen on (overrides PULSE_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Universe TOML file (overrides PULSE_UNIVERSE; the bundled universe otherwise)
    #[arg(short, long)]
    universe: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pulse_utils::init_tracing();

    let args = Args::parse();
    let settings = Settings::from_env()?;

    let config = StockConfig::builder()
        .narrative_model(&settings.llm_model)
        .build()?;

    let universe = match args.universe.or_else(|| settings.universe_path.clone().map(PathBuf::from)) {
        Some(path) => Universe::load(&path)
            .with_context(|| format!("loading universe from {}", path.display()))?,
        None => Universe::builtin()?,
    };
    info!(
        stocks = universe.stocks().len(),
        indices = universe.indices().len(),
        "universe loaded"
    );

    let yahoo = Arc::new(YahooFinanceClient::new(config.request_timeout)?);
    let fetcher: Arc<dyn TimeSeriesFetcher> = yahoo.clone();
    let fundamentals: Arc<dyn FundamentalsSource> = yahoo;

    let news: Arc<dyn NewsSource> = match &settings.finnhub_api_key {
        Some(key) => Arc::new(FinnhubClient::new(key, config.request_timeout)?),
        None => {
            warn!("FINNHUB_API_KEY not set, news disabled");
            Arc::new(NoNews)
        }
    };

    let provider = OpenAIProvider::with_config(
        OpenAIConfig::new(&settings.llm_api_key)
            .with_api_base(&settings.llm_api_base)
            .with_timeout(config.request_timeout.as_secs())
            .with_provider_name("groq"),
    )?;

    let analyzer = AnalysisEnvelopeBuilder::new(
        Arc::new(ChartQuoteSource::new(fetcher.clone()).with_fundamentals(fundamentals.clone())),
        Arc::new(IndicatorEngine::new(fetcher.clone(), &config)),
        news.clone(),
        Arc::new(LlmNarrator::new(Arc::new(provider), &config)),
        &config,
    );
    let market =
        MarketService::new(fetcher, Arc::new(universe), &config).with_fundamentals(fundamentals);

    let app = router(AppState::new(market, analyzer, news));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port.unwrap_or(settings.port)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, model = %config.narrative_model, "pulse-server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
