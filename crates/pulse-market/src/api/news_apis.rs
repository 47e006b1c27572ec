//! News API clients for company and market headlines

use async_trait::async_trait;
use chrono::{DateTime, Days, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{Result, StockError};
use crate::models::NewsItem;
use crate::sources::NewsSource;
use crate::symbol::Symbol;

const SERVICE: &str = "Finnhub";
const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Days of company news requested
const COMPANY_NEWS_DAYS: u64 = 7;

/// Finnhub news article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinnhubNewsArticle {
    /// Article category
    #[serde(default)]
    pub category: String,
    /// Publish time (UNIX timestamp)
    pub datetime: i64,
    /// News headline
    pub headline: String,
    /// Unique article ID
    #[serde(default)]
    pub id: i64,
    /// Related symbols
    #[serde(default)]
    pub related: String,
    /// News source
    #[serde(default)]
    pub source: String,
    /// Article summary
    #[serde(default)]
    pub summary: String,
    /// Article URL
    #[serde(default)]
    pub url: String,
}

impl FinnhubNewsArticle {
    fn into_item(self) -> NewsItem {
        let published_at = DateTime::from_timestamp(self.datetime, 0).map_or_else(
            || "Unknown date".to_string(),
            |d| d.format("%Y-%m-%d %H:%M:%S").to_string(),
        );

        NewsItem {
            snippet: if self.summary.trim().is_empty() {
                "No summary available".to_string()
            } else {
                NewsItem::snippet_from(&self.summary)
            },
            title: if self.headline.trim().is_empty() {
                "No title".to_string()
            } else {
                self.headline
            },
            source: if self.source.is_empty() {
                SERVICE.to_string()
            } else {
                self.source
            },
            url: self.url,
            published_at,
        }
    }
}

/// Finnhub client for news API
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubClient {
    /// Create a new Finnhub client
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key
    /// * `timeout` - Bound on every request
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StockError::external(SERVICE, e))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get company news for a specific symbol
    ///
    /// # Arguments
    /// * `symbol` - Exchange-qualified symbol (e.g., "TCS.NS")
    /// * `from` - Start date (YYYY-MM-DD)
    /// * `to` - End date (YYYY-MM-DD)
    pub async fn get_company_news(
        &self,
        symbol: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<FinnhubNewsArticle>> {
        self.get(
            "company-news",
            &[("symbol", symbol), ("from", from), ("to", to)],
        )
        .await
    }

    /// Get general market news
    ///
    /// # Arguments
    /// * `category` - News category (general, forex, crypto, merger)
    pub async fn get_market_news(&self, category: &str) -> Result<Vec<FinnhubNewsArticle>> {
        self.get("news", &[("category", category)]).await
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Vec<FinnhubNewsArticle>> {
        let url = format!("{}/{endpoint}", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| StockError::external(SERVICE, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::external(
                SERVICE,
                format!("API error {status}: {body}"),
            ));
        }

        response
            .json::<Vec<FinnhubNewsArticle>>()
            .await
            .map_err(|e| StockError::external(SERVICE, format!("failed to parse response: {e}")))
    }
}

#[async_trait]
impl NewsSource for FinnhubClient {
    #[instrument(skip(self), fields(symbol = %symbol))]
    async fn company_news(&self, symbol: &Symbol, limit: usize) -> Result<Vec<NewsItem>> {
        let today = Utc::now().date_naive();
        let from = today
            .checked_sub_days(Days::new(COMPANY_NEWS_DAYS))
            .unwrap_or(today);

        let articles = self
            .get_company_news(
                symbol.qualified(),
                &from.format("%Y-%m-%d").to_string(),
                &today.format("%Y-%m-%d").to_string(),
            )
            .await?;

        debug!(articles = articles.len(), "fetched company news");
        Ok(articles
            .into_iter()
            .take(limit)
            .map(FinnhubNewsArticle::into_item)
            .collect())
    }

    #[instrument(skip(self))]
    async fn market_news(&self, limit: usize) -> Result<Vec<NewsItem>> {
        let articles = self.get_market_news("general").await?;
        Ok(dedupe_by_title(
            articles.into_iter().map(FinnhubNewsArticle::into_item),
            limit,
        ))
    }
}

/// Keep the first article of every title, up to `limit`
fn dedupe_by_title(items: impl IntoIterator<Item = NewsItem>, limit: usize) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.title.clone()))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(headline: &str, summary: &str) -> FinnhubNewsArticle {
        FinnhubNewsArticle {
            category: "general".to_string(),
            datetime: 1_700_000_000,
            headline: headline.to_string(),
            id: 1,
            related: String::new(),
            source: "Reuters".to_string(),
            summary: summary.to_string(),
            url: "https://example.com/a".to_string(),
        }
    }

    #[test]
    fn test_finnhub_client_creation() {
        let client = FinnhubClient::new("test_key", Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://localhost:9999/");
        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[test]
    fn test_article_conversion() {
        let item = article("Nifty hits record", &"a".repeat(300)).into_item();
        assert_eq!(item.title, "Nifty hits record");
        assert_eq!(item.snippet.chars().count(), 153);
        assert_eq!(item.source, "Reuters");
        assert_eq!(item.published_at, "2023-11-14 22:13:20");
    }

    #[test]
    fn test_article_placeholders() {
        let mut raw = article("", "");
        raw.source = String::new();
        let item = raw.into_item();
        assert_eq!(item.title, "No title");
        assert_eq!(item.snippet, "No summary available");
        assert_eq!(item.source, "Finnhub");
    }

    #[test]
    fn test_market_news_dedupes_titles() {
        let items = vec![
            article("Sensex up", "x").into_item(),
            article("Sensex up", "y").into_item(),
            article("Rupee steady", "z").into_item(),
            article("Bank Nifty slips", "w").into_item(),
        ];

        let deduped = dedupe_by_title(items, 2);
        let titles: Vec<_> = deduped.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Sensex up", "Rupee steady"]);
        assert_eq!(deduped[0].snippet, "x");
    }

    #[test]
    fn test_article_deserializes_with_missing_fields() {
        let raw: FinnhubNewsArticle =
            serde_json::from_str(r#"{"datetime": 0, "headline": "Markets open"}"#).unwrap();
        assert_eq!(raw.headline, "Markets open");
        assert!(raw.summary.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires network access and FINNHUB_API_KEY
    async fn test_live_market_news() {
        let key = std::env::var("FINNHUB_API_KEY").unwrap();
        let client = FinnhubClient::new(key, Duration::from_secs(30)).unwrap();
        let news = client.market_news(5).await.unwrap();
        assert!(news.len() <= 5);
    }
}
