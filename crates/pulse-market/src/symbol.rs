//! Ticker normalisation

use crate::error::{Result, StockError};
use serde::{Serialize, Serializer};
use std::fmt;

/// Exchange suffixes recognised and stripped from user input
const KNOWN_SUFFIXES: &[&str] = &[".NS", ".BO"];

/// A tradable instrument identifier
///
/// `ticker` is the bare uppercase ticker (`TCS`); `qualified` is what price
/// providers expect (`TCS.NS`). Index tickers such as `^NSEI` are never
/// suffixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    ticker: String,
    qualified: String,
}

impl Symbol {
    /// Bare ticker without the exchange suffix
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Exchange-qualified ticker
    pub fn qualified(&self) -> &str {
        &self.qualified
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.qualified)
    }
}

/// Normalises user-supplied tickers into exchange-qualified symbols
#[derive(Debug, Clone)]
pub struct SymbolResolver {
    suffix: String,
}

impl SymbolResolver {
    /// Create a resolver for the given canonical suffix (e.g. ".NS")
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into().trim().to_uppercase(),
        }
    }

    /// Trim, uppercase, strip any exchange suffix, then append the canonical one
    ///
    /// Fails only when nothing is left after trimming and stripping.
    pub fn resolve(&self, raw: &str) -> Result<Symbol> {
        let mut ticker = raw.trim().to_uppercase();

        if ticker.starts_with('^') {
            if ticker.len() == 1 {
                return Err(StockError::InvalidSymbol(format!("'{raw}' is not a ticker")));
            }
            return Ok(Symbol {
                qualified: ticker.clone(),
                ticker,
            });
        }

        while let Some(stripped) = self.strip_suffix(&ticker) {
            ticker = stripped.trim_end().to_string();
        }

        if ticker.is_empty() {
            return Err(StockError::InvalidSymbol(if raw.trim().is_empty() {
                "symbol must not be empty".to_string()
            } else {
                format!("'{}' has no ticker before the exchange suffix", raw.trim())
            }));
        }

        Ok(Symbol {
            qualified: format!("{ticker}{}", self.suffix),
            ticker,
        })
    }

    fn strip_suffix<'a>(&self, ticker: &'a str) -> Option<&'a str> {
        std::iter::once(self.suffix.as_str())
            .chain(KNOWN_SUFFIXES.iter().copied())
            .find_map(|suffix| ticker.strip_suffix(suffix))
    }
}

impl Default for SymbolResolver {
    fn default() -> Self {
        Self::new(".NS")
    }
}
