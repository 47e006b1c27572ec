//! API clients for market data providers

pub mod news_apis;
pub mod yahoo;

pub use news_apis::FinnhubClient;
pub use yahoo::YahooFinanceClient;
