//! Market data queries the analyzer depends on, and their Alpaca implementation

use crate::api::rest::{
    ChainQuery, ContractsQuery, OptionContract as ListedContract, OptionSnapshotsResponse,
    RestClient, StockSnapshot,
};
use crate::error::{OptionsError, Result};
use crate::models::{OptionContract, OptionQuote};
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

const CONTRACTS_PAGE_LIMIT: u32 = 10_000;
const SNAPSHOTS_PAGE_LIMIT: u32 = 1_000;

/// Source of spot prices and call option chains
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Latest traded price of the underlying.
    /// Fails with [`OptionsError::DataUnavailable`] when there is no recent data.
    async fn spot_price(&self, ticker: &str) -> Result<f64>;

    /// Listed expirations, ascending and deduplicated. Empty means the
    /// underlying has no options.
    async fn list_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>>;

    /// Call quotes for one expiration
    async fn option_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<Vec<OptionQuote>>;
}

/// Spot price from a stock snapshot: last trade, then today's close, then the
/// quote mid, then yesterday's close
pub fn spot_from_snapshot(snapshot: &StockSnapshot) -> Option<f64> {
    let positive = |v: f64| (v.is_finite() && v > 0.0).then_some(v);

    snapshot
        .latest_trade
        .as_ref()
        .and_then(|t| positive(t.price))
        .or_else(|| snapshot.daily_bar.as_ref().and_then(|b| positive(b.c)))
        .or_else(|| {
            snapshot.latest_quote.as_ref().and_then(|q| {
                if q.bid > 0.0 && q.ask > 0.0 {
                    Some((q.bid + q.ask) / 2.0)
                } else {
                    None
                }
            })
        })
        .or_else(|| snapshot.prev_daily_bar.as_ref().and_then(|b| positive(b.c)))
}

/// Distinct call expirations of a contracts listing, ascending
pub fn expirations_from_contracts(contracts: &[ListedContract]) -> Vec<NaiveDate> {
    let mut expirations: Vec<NaiveDate> = contracts
        .iter()
        .filter(|c| c.contract_type.eq_ignore_ascii_case("call"))
        .filter_map(|c| match NaiveDate::parse_from_str(&c.expiration_date, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(e) => {
                warn!(
                    "Skipping contract {} with bad expiration '{}': {}",
                    c.symbol, c.expiration_date, e
                );
                None
            }
        })
        .collect();
    expirations.sort();
    expirations.dedup();
    expirations
}

/// Call quotes of a snapshots page that expire on `expiry` and carry a quote
pub fn quotes_from_snapshots(page: &OptionSnapshotsResponse, expiry: NaiveDate) -> Vec<OptionQuote> {
    let mut quotes = Vec::with_capacity(page.snapshots.len());

    for (occ, snap) in &page.snapshots {
        let Some(contract) = OptionContract::from_occ_symbol(occ) else {
            continue;
        };
        if !contract.is_call() || contract.expiration != expiry {
            continue;
        }
        let Some(last_quote) = snap.latest_quote.as_ref() else {
            debug!("Skipping contract {} - no quote available", occ);
            continue;
        };

        quotes.push(OptionQuote {
            occ_symbol: contract.occ_symbol,
            expiration: contract.expiration,
            strike: contract.strike,
            bid: last_quote.bid,
            ask: last_quote.ask,
            implied_volatility: snap.implied_volatility.unwrap_or(0.0),
        });
    }

    quotes.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    quotes
}

/// [`MarketDataGateway`] backed by the Alpaca REST APIs
pub struct AlpacaGateway {
    client: RestClient,
}

impl AlpacaGateway {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MarketDataGateway for AlpacaGateway {
    async fn spot_price(&self, ticker: &str) -> Result<f64> {
        let snapshots = self.client.get_stock_snapshots(&[ticker]).await?;
        let spot = snapshots
            .get(ticker)
            .and_then(|s| s.as_ref())
            .and_then(spot_from_snapshot)
            .ok_or_else(|| OptionsError::DataUnavailable(ticker.to_string()))?;

        info!("{} spot price {:.2}", ticker, spot);
        Ok(spot)
    }

    async fn list_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>> {
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let mut contracts = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let filters = ContractsQuery {
                contract_type: Some("call"),
                expiration_date_gte: Some(&today),
                limit: Some(CONTRACTS_PAGE_LIMIT),
                page_token: page_token.as_deref(),
            };
            let page = self.client.get_option_contracts(ticker, &filters).await?;
            debug!("Got {} contracts for {}", page.results.len(), ticker);
            contracts.extend(page.results);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        let expirations = expirations_from_contracts(&contracts);
        info!(
            "{} has {} expirations across {} call contracts",
            ticker,
            expirations.len(),
            contracts.len()
        );
        Ok(expirations)
    }

    async fn option_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<Vec<OptionQuote>> {
        let expiry_str = expiry.format("%Y-%m-%d").to_string();
        let feed = self.client.config().options_feed.clone();
        let mut quotes = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let filters = ChainQuery {
                feed: Some(&feed),
                contract_type: Some("call"),
                expiration_date: Some(&expiry_str),
                limit: Some(SNAPSHOTS_PAGE_LIMIT),
                page_token: page_token.as_deref(),
                ..Default::default()
            };
            let page = self.client.get_option_chain_snapshots(ticker, &filters).await?;
            quotes.extend(quotes_from_snapshots(&page, expiry));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        quotes.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        info!("{} {} chain has {} quoted calls", ticker, expiry_str, quotes.len());
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::rest::{Bar, OptionLastQuote, OptionSnapshot, StockQuote, StockTrade};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn bar(close: f64) -> Bar {
        Bar {
            t: Utc.with_ymd_and_hms(2025, 5, 1, 4, 0, 0).unwrap(),
            o: close,
            h: close,
            l: close,
            c: close,
            v: 0,
        }
    }

    fn listed(symbol: &str, kind: &str, expiration: &str) -> ListedContract {
        ListedContract {
            id: symbol.to_lowercase(),
            symbol: symbol.to_string(),
            status: "active".to_string(),
            tradable: true,
            expiration_date: expiration.to_string(),
            underlying_symbol: "AAPL".to_string(),
            contract_type: kind.to_string(),
            strike_price: "190".to_string(),
        }
    }

    #[test]
    fn spot_prefers_last_trade() {
        let snapshot = StockSnapshot {
            latest_trade: Some(StockTrade {
                t: Utc::now(),
                price: 101.5,
                size: 10,
            }),
            daily_bar: Some(bar(100.0)),
            ..Default::default()
        };
        assert_eq!(spot_from_snapshot(&snapshot), Some(101.5));
    }

    #[test]
    fn spot_falls_back_through_bars_and_quote() {
        let from_bar = StockSnapshot {
            daily_bar: Some(bar(99.0)),
            prev_daily_bar: Some(bar(98.0)),
            ..Default::default()
        };
        assert_eq!(spot_from_snapshot(&from_bar), Some(99.0));

        let from_quote = StockSnapshot {
            latest_quote: Some(StockQuote {
                t: Utc::now(),
                bid: 10.0,
                ask: 10.5,
            }),
            prev_daily_bar: Some(bar(9.0)),
            ..Default::default()
        };
        assert_eq!(spot_from_snapshot(&from_quote), Some(10.25));

        let from_prev = StockSnapshot {
            prev_daily_bar: Some(bar(98.0)),
            ..Default::default()
        };
        assert_eq!(spot_from_snapshot(&from_prev), Some(98.0));
    }

    #[test]
    fn empty_snapshot_has_no_spot() {
        assert_eq!(spot_from_snapshot(&StockSnapshot::default()), None);
    }

    #[test]
    fn expirations_are_sorted_distinct_calls() {
        let contracts = vec![
            listed("AAPL250718C00190000", "call", "2025-07-18"),
            listed("AAPL250620C00190000", "call", "2025-06-20"),
            listed("AAPL250620C00200000", "call", "2025-06-20"),
            listed("AAPL250606P00190000", "put", "2025-06-06"),
            listed("AAPL25XXXXC00190000", "call", "not-a-date"),
        ];
        assert_eq!(
            expirations_from_contracts(&contracts),
            vec![
                NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 18).unwrap(),
            ]
        );
    }

    #[test]
    fn snapshots_map_to_sorted_call_quotes() {
        let quoted = |bid: f64, ask: f64, iv: Option<f64>| OptionSnapshot {
            latest_quote: Some(OptionLastQuote {
                t: Utc::now(),
                bid,
                ask,
                size_bid: 1,
                size_ask: 1,
            }),
            latest_trade: None,
            implied_volatility: iv,
        };

        let mut snapshots = HashMap::new();
        snapshots.insert("AAPL250620C00200000".to_string(), quoted(3.0, 3.2, Some(0.25)));
        snapshots.insert("AAPL250620C00190000".to_string(), quoted(8.0, 8.4, None));
        snapshots.insert("AAPL250620P00190000".to_string(), quoted(1.0, 1.1, Some(0.3)));
        snapshots.insert("AAPL250718C00190000".to_string(), quoted(9.0, 9.4, Some(0.3)));
        snapshots.insert("AAPL250620C00210000".to_string(), OptionSnapshot::default());
        let page = OptionSnapshotsResponse {
            snapshots,
            next_page_token: None,
        };

        let expiry = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let quotes = quotes_from_snapshots(&page, expiry);

        let strikes: Vec<f64> = quotes.iter().map(|q| q.strike).collect();
        assert_eq!(strikes, vec![190.0, 200.0]);
        assert_eq!(quotes[0].implied_volatility, 0.0);
        assert_eq!(quotes[1].implied_volatility, 0.25);
        assert_eq!(quotes[1].bid, 3.0);
        assert_eq!(quotes[1].ask, 3.2);
    }
}
