//! Natural-language narratives over an analysis payload

use async_trait::async_trait;
use pulse_llm::{CompletionRequest, LLMProvider, Message};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::StockConfig;
use crate::envelope::Slot;
use crate::error::{Result, StockError};
use crate::indicators::IndicatorSnapshot;
use crate::models::{NewsItem, StockSnapshot};
use crate::prompts;
use crate::symbol::Symbol;

const SERVICE: &str = "Narrative provider";

/// Title and snippet of one article handed to the narrative
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub title: String,
    pub snippet: String,
}

impl From<&NewsItem> for Headline {
    fn from(item: &NewsItem) -> Self {
        Self {
            title: item.title.clone(),
            snippet: item.snippet.clone(),
        }
    }
}

/// Everything a narrative is written from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeRequest {
    pub symbol: Symbol,
    pub stock_data: Slot<StockSnapshot>,
    pub technical_data: Slot<IndicatorSnapshot>,
    pub headlines: Vec<Headline>,
}

/// Turns a [`NarrativeRequest`] into prose
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn narrate(&self, request: &NarrativeRequest) -> Result<String>;
}

/// Narratives written by a chat model
pub struct LlmNarrator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    max_tokens: usize,
    temperature: Option<f32>,
    timeout: Duration,
}

impl LlmNarrator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &StockConfig) -> Self {
        Self {
            provider,
            model: config.narrative_model.clone(),
            max_tokens: config.narrative_max_tokens,
            temperature: config.narrative_temperature,
            timeout: config.request_timeout,
        }
    }

    /// The chat request for a narrative
    pub fn completion_request(&self, request: &NarrativeRequest) -> Result<CompletionRequest> {
        let prompt = prompts::render(
            "analysis",
            prompts::ANALYSIS_TEMPLATE,
            &serde_json::json!({
                "symbol": request.symbol.qualified(),
                "stock_data": to_json(&request.stock_data)?,
                "technical_data": to_json(&request.technical_data)?,
                "headlines": request.headlines,
            }),
        )?;

        let mut completion = CompletionRequest::new(&self.model)
            .with_system(prompts::ANALYST_SYSTEM)
            .with_message(Message::user(prompt))
            .with_max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            completion = completion.with_temperature(temperature);
        }
        Ok(completion)
    }
}

#[async_trait]
impl NarrativeGenerator for LlmNarrator {
    #[instrument(skip(self, request), fields(symbol = %request.symbol, provider = self.provider.name()))]
    async fn narrate(&self, request: &NarrativeRequest) -> Result<String> {
        let completion = self.completion_request(request)?;

        let response = tokio::time::timeout(self.timeout, self.provider.complete(completion))
            .await
            .map_err(|_| {
                StockError::external(
                    SERVICE,
                    format!("request timed out after {}s", self.timeout.as_secs()),
                )
            })??;

        debug!(
            tokens = response.usage.total(),
            stop_reason = ?response.stop_reason,
            "narrative generated"
        );

        let text = response.message.text().trim();
        if text.is_empty() {
            return Err(StockError::external(SERVICE, "empty narrative"));
        }
        Ok(text.to_string())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| StockError::CalculationError(format!("cannot encode payload: {e}")))
}
