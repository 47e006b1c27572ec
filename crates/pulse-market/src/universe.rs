//! The fixed symbol universe and its sector table
//!
//! The default universe is embedded from `config/universe.toml`; deployments can
//! point at another file with the same layout.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{Result, StockError};

const BUILTIN_UNIVERSE: &str = include_str!("../config/universe.toml");

/// Sector reported for symbols missing from the table
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// One equity of the universe
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UniverseEntry {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
}

/// One market index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexEntry {
    /// Label returned to clients (`NSEI`)
    pub key: String,
    /// Provider ticker (`^NSEI`)
    pub ticker: String,
    /// Display name; defaults to the key
    #[serde(default)]
    pub name: Option<String>,
}

impl IndexEntry {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

/// Symbol → sector lookup, total over every ticker
#[derive(Debug, Clone, Default)]
pub struct SectorMap {
    sectors: HashMap<String, String>,
}

impl SectorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the sector of a bare ticker
    pub fn insert(&mut self, ticker: impl Into<String>, sector: impl Into<String>) {
        self.sectors
            .insert(ticker.into().to_uppercase(), sector.into());
    }

    /// Sector of a bare ticker, `"Unknown"` when not mapped
    pub fn sector(&self, ticker: &str) -> &str {
        self.sectors
            .get(&ticker.to_uppercase())
            .map_or(UNKNOWN_SECTOR, String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SectorMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = SectorMap::new();
        for (ticker, sector) in iter {
            map.insert(ticker, sector);
        }
        map
    }
}

#[derive(Debug, Deserialize)]
struct UniverseFile {
    #[serde(default)]
    stocks: Vec<UniverseEntry>,
    #[serde(default)]
    trending: Vec<String>,
    #[serde(default)]
    indices: Vec<IndexEntry>,
}

/// Ordered equity list, trending subset and market indices
#[derive(Debug, Clone)]
pub struct Universe {
    stocks: Vec<UniverseEntry>,
    trending: Vec<String>,
    indices: Vec<IndexEntry>,
    sectors: SectorMap,
}

impl Universe {
    /// The embedded Nifty 50 universe
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_UNIVERSE)
    }

    /// Load a universe file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StockError::ConfigError(format!("cannot read universe {}: {e}", path.display()))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse and validate a universe document
    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: UniverseFile = toml::from_str(raw)?;

        let mut seen = HashSet::new();
        let mut stocks = Vec::with_capacity(file.stocks.len());
        for mut entry in file.stocks {
            entry.symbol = entry.symbol.trim().to_uppercase();
            if entry.symbol.is_empty() {
                return Err(StockError::ConfigError(
                    "universe entry with an empty symbol".to_string(),
                ));
            }
            if !seen.insert(entry.symbol.clone()) {
                return Err(StockError::ConfigError(format!(
                    "duplicate universe symbol {}",
                    entry.symbol
                )));
            }
            stocks.push(entry);
        }

        let trending = file
            .trending
            .into_iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        let sectors = stocks
            .iter()
            .filter_map(|e| e.sector.as_ref().map(|s| (e.symbol.clone(), s.clone())))
            .collect();

        Ok(Self {
            stocks,
            trending,
            indices: file.indices,
            sectors,
        })
    }

    /// Every equity in universe order
    pub fn stocks(&self) -> &[UniverseEntry] {
        &self.stocks
    }

    /// Tickers scanned by the trending view
    pub fn trending(&self) -> &[String] {
        &self.trending
    }

    pub fn indices(&self) -> &[IndexEntry] {
        &self.indices
    }

    pub fn sectors(&self) -> &SectorMap {
        &self.sectors
    }

    /// Company name of a bare ticker, falling back to the ticker itself
    pub fn name_of<'a>(&'a self, ticker: &'a str) -> &'a str {
        self.stocks
            .iter()
            .find(|e| e.symbol.eq_ignore_ascii_case(ticker))
            .map_or(ticker, |e| e.name.as_str())
    }
}
