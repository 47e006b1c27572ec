//! Error types for market data operations

use thiserror::Error;

/// Errors produced by the market pipeline
///
/// Every variant is recoverable at the component boundary that produced it:
/// the envelope embeds the message in the failing slot and the scanner skips
/// the failing symbol.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StockError {
    /// Ticker was empty after normalisation
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// The data provider returned an empty series
    #[error("No data available for {symbol}: {reason}")]
    NoDataAvailable {
        symbol: String,
        reason: String,
    },

    /// Series too short for the indicator window, even after the fallback fetch
    #[error("Insufficient data points. Got {actual}, need at least {required}")]
    InsufficientHistory {
        actual: usize,
        required: usize,
    },

    /// Arithmetic fault in indicator math
    #[error("Error in calculations: {0}")]
    CalculationError(String),

    /// Failure or timeout of a price, news or narrative provider
    #[error("{service} error: {message}")]
    ExternalServiceError {
        service: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StockError {
    /// Shorthand for [`StockError::NoDataAvailable`]
    pub fn no_data(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NoDataAvailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`StockError::ExternalServiceError`]
    pub fn external(service: impl Into<String>, message: impl ToString) -> Self {
        Self::ExternalServiceError {
            service: service.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<pulse_llm::LLMError> for StockError {
    fn from(err: pulse_llm::LLMError) -> Self {
        StockError::external("Narrative provider", err)
    }
}

impl From<toml::de::Error> for StockError {
    fn from(err: toml::de::Error) -> Self {
        StockError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::InvalidSymbol("empty ticker".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: empty ticker");

        let err = StockError::InsufficientHistory {
            actual: 41,
            required: 50,
        };
        assert_eq!(err.to_string(), "Insufficient data points. Got 41, need at least 50");

        let err = StockError::no_data("TCS.NS", "No historical data available");
        assert_eq!(err.to_string(), "No data available for TCS.NS: No historical data available");
    }

    #[test]
    fn test_error_conversion() {
        let err: StockError = pulse_llm::LLMError::AuthenticationFailed.into();

        match err {
            StockError::ExternalServiceError { service, message } => {
                assert_eq!(service, "Narrative provider");
                assert!(message.contains("authentication"));
            }
            _ => panic!("Expected ExternalServiceError variant"),
        }
    }

    #[test]
    fn test_toml_error_is_config_error() {
        let err: StockError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, StockError::ConfigError(_)));
    }
}
