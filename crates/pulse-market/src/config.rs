//! Configuration for market data operations

use crate::error::{Result, StockError};
use crate::indicators::RSI_PERIOD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the market pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Exchange suffix appended to every equity ticker
    pub exchange_suffix: String,

    /// Bound on every external call (price, news, narrative)
    pub request_timeout: Duration,

    /// Points required before indicators are computed
    pub min_history_points: usize,

    /// News items attached to an analysis envelope
    pub news_limit: usize,

    /// Headlines handed to the narrative generator
    pub narrative_headlines: usize,

    /// Model used for narratives
    pub narrative_model: String,

    /// Token budget of a narrative
    pub narrative_max_tokens: usize,

    /// Sampling temperature of a narrative
    pub narrative_temperature: Option<f32>,

    /// Currency label attached to prices on the wire
    pub currency: String,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            exchange_suffix: ".NS".to_string(),
            request_timeout: Duration::from_secs(30),
            min_history_points: 50,
            news_limit: 10,
            narrative_headlines: 5,
            narrative_model: "gemma2-9b-it".to_string(),
            narrative_max_tokens: 2048,
            narrative_temperature: None,
            currency: "INR".to_string(),
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let suffix = self.exchange_suffix.trim();
        if !suffix.starts_with('.') || suffix.len() < 2 {
            return Err(StockError::ConfigError(format!(
                "exchange_suffix must look like '.NS', got '{}'",
                self.exchange_suffix
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.min_history_points < RSI_PERIOD + 1 {
            return Err(StockError::ConfigError(format!(
                "min_history_points must be at least {}",
                RSI_PERIOD + 1
            )));
        }

        if self.narrative_model.trim().is_empty() {
            return Err(StockError::ConfigError(
                "narrative_model must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    exchange_suffix: Option<String>,
    request_timeout: Option<Duration>,
    min_history_points: Option<usize>,
    news_limit: Option<usize>,
    narrative_headlines: Option<usize>,
    narrative_model: Option<String>,
    narrative_max_tokens: Option<usize>,
    narrative_temperature: Option<f32>,
    currency: Option<String>,
}

impl StockConfigBuilder {
    /// Set the exchange suffix (e.g. ".NS", ".BO")
    pub fn exchange_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.exchange_suffix = Some(suffix.into().trim().to_uppercase());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the indicator history requirement
    pub fn min_history_points(mut self, points: usize) -> Self {
        self.min_history_points = Some(points);
        self
    }

    /// Set the number of news items per envelope
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set the number of headlines passed to the narrative
    pub fn narrative_headlines(mut self, count: usize) -> Self {
        self.narrative_headlines = Some(count);
        self
    }

    /// Set the narrative model
    pub fn narrative_model(mut self, model: impl Into<String>) -> Self {
        self.narrative_model = Some(model.into());
        self
    }

    /// Set the narrative token budget
    pub fn narrative_max_tokens(mut self, tokens: usize) -> Self {
        self.narrative_max_tokens = Some(tokens);
        self
    }

    /// Set the narrative sampling temperature
    pub fn narrative_temperature(mut self, temperature: f32) -> Self {
        self.narrative_temperature = Some(temperature);
        self
    }

    /// Set the currency label
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            exchange_suffix: self.exchange_suffix.unwrap_or(defaults.exchange_suffix),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            min_history_points: self.min_history_points.unwrap_or(defaults.min_history_points),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            narrative_headlines: self.narrative_headlines.unwrap_or(defaults.narrative_headlines),
            narrative_model: self.narrative_model.unwrap_or(defaults.narrative_model),
            narrative_max_tokens: self.narrative_max_tokens.unwrap_or(defaults.narrative_max_tokens),
            narrative_temperature: self.narrative_temperature.or(defaults.narrative_temperature),
            currency: self.currency.unwrap_or(defaults.currency),
        };

        config.validate()?;
        Ok(config)
    }
}
