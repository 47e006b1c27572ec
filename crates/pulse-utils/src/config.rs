//! Process settings read from the environment

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default OpenAI-compatible endpoint of the narrative provider (Groq)
pub const DEFAULT_LLM_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default narrative model
pub const DEFAULT_LLM_MODEL: &str = "gemma2-9b-it";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Errors raised while reading settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// A required variable is absent or blank
    #[error("{0} not found in environment or .env file")]
    Missing(&'static str),

    /// A variable is present but cannot be parsed
    #[error("Invalid value for {key}: {value}")]
    Invalid {
        key: &'static str,
        value: String,
    },
}

/// Settings shared by the pulse binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// API key of the narrative (LLM) provider
    pub llm_api_key: String,

    /// Base URL of the OpenAI-compatible narrative endpoint
    pub llm_api_base: String,

    /// Model used for narratives
    pub llm_model: String,

    /// Finnhub key; news is disabled without it
    pub finnhub_api_key: Option<String>,

    /// Port the HTTP server binds to
    pub port: u16,

    /// Optional path to a universe TOML file
    pub universe_path: Option<String>,
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first if present
    ///
    /// Fails fast when `GROQ_API_KEY` is missing.
    pub fn from_env() -> Result<Self, SettingsError> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let llm_api_key = non_blank("GROQ_API_KEY").ok_or(SettingsError::Missing("GROQ_API_KEY"))?;

        let port = match non_blank("PULSE_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| SettingsError::Invalid {
                key: "PULSE_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            llm_api_key,
            llm_api_base: non_blank("GROQ_API_BASE")
                .unwrap_or_else(|| DEFAULT_LLM_API_BASE.to_string()),
            llm_model: non_blank("GROQ_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            finnhub_api_key: non_blank("FINNHUB_API_KEY"),
            port,
            universe_path: non_blank("PULSE_UNIVERSE"),
        })
    }
}
