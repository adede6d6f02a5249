use crate::config::AlpacaConfig;
use crate::error::{OptionsError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTrade {
    pub t: DateTime<Utc>,
    #[serde(alias = "p")]
    pub price: f64,
    #[serde(alias = "s", default)]
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockQuote {
    pub t: DateTime<Utc>,
    #[serde(alias = "bp")]
    pub bid: f64,
    #[serde(alias = "ap")]
    pub ask: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub t: DateTime<Utc>,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    #[serde(default)]
    pub v: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockSnapshot {
    #[serde(rename = "latestTrade")]
    pub latest_trade: Option<StockTrade>,
    #[serde(rename = "latestQuote")]
    pub latest_quote: Option<StockQuote>,
    #[serde(rename = "minuteBar")]
    pub minute_bar: Option<Bar>,
    #[serde(rename = "dailyBar")]
    pub daily_bar: Option<Bar>,
    #[serde(rename = "prevDailyBar")]
    pub prev_daily_bar: Option<Bar>,
}

/// Keyed by ticker. Unknown tickers come back as `null` or are omitted.
pub type StockSnapshotsResponse = HashMap<String, Option<StockSnapshot>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tradable: bool,
    pub expiration_date: String,
    pub underlying_symbol: String,
    #[serde(rename = "type")]
    pub contract_type: String,
    pub strike_price: String, // Note: API returns this as a string "5", not a number
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContractsResponse {
    #[serde(rename = "option_contracts", default)]
    pub results: Vec<OptionContract>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionLastQuote {
    pub t: DateTime<Utc>,
    #[serde(alias = "bp")]
    pub bid: f64,
    #[serde(alias = "ap")]
    pub ask: f64,
    #[serde(alias = "bs", default)]
    pub size_bid: u64,
    #[serde(alias = "as", default)]
    pub size_ask: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionLastTrade {
    pub t: DateTime<Utc>,
    #[serde(alias = "p")]
    pub price: f64,
    #[serde(alias = "s", default)]
    pub size: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionSnapshot {
    #[serde(rename = "latestQuote")]
    pub latest_quote: Option<OptionLastQuote>,
    #[serde(rename = "latestTrade")]
    pub latest_trade: Option<OptionLastTrade>,
    #[serde(rename = "impliedVolatility")]
    pub implied_volatility: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSnapshotsResponse {
    /// Keyed by OCC contract symbol
    #[serde(default)]
    pub snapshots: HashMap<String, OptionSnapshot>,
    pub next_page_token: Option<String>,
}

/// Filters for the option contracts listing
#[derive(Debug, Clone, Default)]
pub struct ContractsQuery<'a> {
    pub contract_type: Option<&'a str>,
    pub expiration_date_gte: Option<&'a str>,
    pub limit: Option<u32>,
    pub page_token: Option<&'a str>,
}

/// Filters for the option chain snapshots of one underlying
#[derive(Debug, Clone, Default)]
pub struct ChainQuery<'a> {
    pub feed: Option<&'a str>,
    pub contract_type: Option<&'a str>,
    pub expiration_date: Option<&'a str>,
    pub limit: Option<u32>,
    pub page_token: Option<&'a str>,
}

pub struct RestClient {
    client: reqwest::Client,
    config: AlpacaConfig,
}

impl RestClient {
    pub fn new(config: AlpacaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &AlpacaConfig {
        &self.config
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("APCA-API-KEY-ID", &self.config.api_key)
            .header("APCA-API-SECRET-KEY", &self.config.api_secret)
    }

    fn endpoint(base: &str, path: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        debug!("GET {} {:?}", url, query);
        let resp = self
            .auth(self.client.get(url))
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(OptionsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        debug!(
            "{} response (first 200 chars): {}",
            what,
            text.chars().take(200).collect::<String>()
        );

        serde_json::from_str::<T>(&text)
            .map_err(|e| OptionsError::ParseError(format!("Failed to parse {}: {}", what, e)))
    }

    /// Get snapshots (latest trade, quote and bars) for stock symbols
    pub async fn get_stock_snapshots(&self, symbols: &[&str]) -> Result<StockSnapshotsResponse> {
        let url = Self::endpoint(&self.config.data_url, "v2/stocks/snapshots");
        let query = vec![("symbols", symbols.join(","))];
        self.get_json(&url, &query, "stock snapshots").await
    }

    /// Get option contracts for an underlying symbol, one page
    pub async fn get_option_contracts(
        &self,
        underlying_symbol: &str,
        filters: &ContractsQuery<'_>,
    ) -> Result<OptionContractsResponse> {
        let url = Self::endpoint(&self.config.trading_url, "v2/options/contracts");

        let mut query = vec![("underlying_symbols", underlying_symbol.to_string())];
        if let Some(t) = filters.contract_type {
            query.push(("type", t.to_string()));
        }
        if let Some(date) = filters.expiration_date_gte {
            query.push(("expiration_date_gte", date.to_string()));
        }
        if let Some(limit) = filters.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(token) = filters.page_token {
            query.push(("page_token", token.to_string()));
        }

        self.get_json(&url, &query, "option contracts").await
    }

    /// Get option chain snapshots for an underlying symbol, one page
    pub async fn get_option_chain_snapshots(
        &self,
        underlying_symbol: &str,
        filters: &ChainQuery<'_>,
    ) -> Result<OptionSnapshotsResponse> {
        let url = Self::endpoint(
            &self.config.data_url,
            &format!("v1beta1/options/snapshots/{}", underlying_symbol),
        );

        let mut query = Vec::new();
        if let Some(feed) = filters.feed {
            query.push(("feed", feed.to_string()));
        }
        if let Some(t) = filters.contract_type {
            query.push(("type", t.to_string()));
        }
        if let Some(date) = filters.expiration_date {
            query.push(("expiration_date", date.to_string()));
        }
        if let Some(limit) = filters.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(token) = filters.page_token {
            query.push(("page_token", token.to_string()));
        }

        self.get_json(&url, &query, "option chain snapshots").await
    }
}
