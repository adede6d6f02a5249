//! One end-to-end analysis of a long call: fetch, filter, select, evaluate

use crate::api::MarketDataGateway;
use crate::error::{OptionsError, Result};
use crate::models::{
    CurveRange, OptionQuote, PayoffCurve, ProfitScenario, StrikeWindow, TradeConfig,
};
use crate::utils::{default_target, filter_strikes_near_spot, select_strike};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The user's selections for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub ticker: String,
    /// Nearest listed expiration when absent
    pub expiry: Option<NaiveDate>,
    /// Strike closest to spot when absent
    pub strike: Option<f64>,
    /// Live mid price when absent
    pub entry_premium: Option<f64>,
    pub contracts: u32,
    /// Spot + 10% when absent
    pub target_price: Option<f64>,
    pub strike_window: StrikeWindow,
    pub curve_range: CurveRange,
}

impl AnalysisRequest {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            expiry: None,
            strike: None,
            entry_premium: None,
            contracts: 1,
            target_price: None,
            strike_window: StrikeWindow::default(),
            curve_range: CurveRange::default(),
        }
    }
}

/// Everything the presentation layer renders for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub spot: f64,
    pub expirations: Vec<NaiveDate>,
    pub expiry: NaiveDate,
    pub available_strikes: Vec<f64>,
    pub quote: OptionQuote,
    pub trade: TradeConfig,
    pub scenario: ProfitScenario,
    pub curve: PayoffCurve,
}

pub fn normalize_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(OptionsError::InvalidInput("ticker is empty".to_string()));
    }
    Ok(ticker)
}

pub struct Analyzer<G> {
    gateway: G,
}

impl<G: MarketDataGateway> Analyzer<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let ticker = normalize_ticker(&request.ticker)?;
        info!("Analyzing {}", ticker);

        let spot = self.gateway.spot_price(&ticker).await?;

        let expirations = self.gateway.list_expirations(&ticker).await?;
        if expirations.is_empty() {
            return Err(OptionsError::NoOptionsAvailable(ticker));
        }

        let expiry = match request.expiry {
            Some(requested) if expirations.contains(&requested) => requested,
            Some(requested) => {
                return Err(OptionsError::ExpirationNotFound {
                    ticker,
                    expiry: requested.format("%Y-%m-%d").to_string(),
                })
            }
            None => expirations[0],
        };
        debug!("Using expiration {}", expiry);

        let chain = self.gateway.option_chain(&ticker, expiry).await?;
        let near_spot = filter_strikes_near_spot(&chain, spot, request.strike_window);
        if near_spot.is_empty() {
            let (low, high) = request.strike_window.bounds(spot);
            return Err(OptionsError::NoStrikesInRange { ticker, low, high });
        }

        let quote = select_strike(&near_spot, spot, request.strike)?.clone();
        info!(
            "Selected {} strike {:.2}, mid {:.2}, IV {:.1}%",
            quote.occ_symbol,
            quote.strike,
            quote.mid_price(),
            quote.implied_volatility * 100.0
        );

        let trade = TradeConfig::from_quote(&quote, request.entry_premium, request.contracts)?;
        let target = request.target_price.unwrap_or_else(|| default_target(spot));
        let scenario = ProfitScenario::evaluate(&trade, target)?;
        let curve = trade.payoff_curve(spot, request.curve_range);

        Ok(AnalysisReport {
            ticker,
            spot,
            expirations,
            expiry,
            available_strikes: near_spot.iter().map(|q| q.strike).collect(),
            quote,
            trade,
            scenario,
            curve,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Canned gateway answering from memory
    #[derive(Default)]
    struct StaticGateway {
        spot: Option<f64>,
        chains: HashMap<NaiveDate, Vec<OptionQuote>>,
    }

    #[async_trait]
    impl MarketDataGateway for StaticGateway {
        async fn spot_price(&self, ticker: &str) -> Result<f64> {
            self.spot
                .ok_or_else(|| OptionsError::DataUnavailable(ticker.to_string()))
        }

        async fn list_expirations(&self, _ticker: &str) -> Result<Vec<NaiveDate>> {
            let mut expirations: Vec<NaiveDate> = self.chains.keys().copied().collect();
            expirations.sort();
            Ok(expirations)
        }

        async fn option_chain(&self, _ticker: &str, expiry: NaiveDate) -> Result<Vec<OptionQuote>> {
            Ok(self.chains.get(&expiry).cloned().unwrap_or_default())
        }
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn quote(expiry: NaiveDate, strike: f64, bid: f64, ask: f64) -> OptionQuote {
        OptionQuote {
            occ_symbol: format!("XYZ{}C{:08}", expiry.format("%y%m%d"), (strike * 1000.0) as u64),
            expiration: expiry,
            strike,
            bid,
            ask,
            implied_volatility: 0.35,
        }
    }

    fn gateway() -> StaticGateway {
        let june = date(6, 20);
        let july = date(7, 18);
        let mut chains = HashMap::new();
        chains.insert(
            june,
            vec![
                quote(june, 50.0, 50.0, 51.0),
                quote(june, 95.0, 7.0, 7.4),
                quote(june, 100.0, 3.9, 4.1),
                quote(june, 105.0, 1.8, 2.2),
                quote(june, 200.0, 0.01, 0.05),
            ],
        );
        chains.insert(july, vec![quote(july, 100.0, 5.0, 5.4), quote(july, 110.0, 2.0, 2.2)]);
        StaticGateway {
            spot: Some(101.0),
            chains,
        }
    }

    #[tokio::test]
    async fn defaults_to_nearest_expiry_and_at_the_money_strike() {
        let analyzer = Analyzer::new(gateway());
        let report = analyzer.analyze(&AnalysisRequest::new(" xyz ")).await.unwrap();

        assert_eq!(report.ticker, "XYZ");
        assert_eq!(report.expiry, date(6, 20));
        assert_eq!(report.expirations, vec![date(6, 20), date(7, 18)]);
        assert_eq!(report.available_strikes, vec![95.0, 100.0, 105.0]);
        assert_relative_eq!(report.trade.strike, 100.0);
        assert_relative_eq!(report.trade.entry_premium, 4.0, epsilon = 1e-12);
        assert_eq!(report.trade.contracts, 1);
        assert_relative_eq!(report.scenario.target_price, 111.1);
        assert_relative_eq!(report.scenario.total_risk, 400.0, epsilon = 1e-9);
        assert_relative_eq!(report.scenario.breakeven, 104.0, epsilon = 1e-9);
        assert_relative_eq!(report.scenario.gross_profit, 710.0, epsilon = 1e-6);
        assert_eq!(report.curve.len(), 100);
        let (low, high) = report.curve.price_range().unwrap();
        assert_relative_eq!(low, 80.8, epsilon = 1e-9);
        assert_relative_eq!(high, 121.2, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn honours_explicit_selections() {
        let analyzer = Analyzer::new(gateway());
        let request = AnalysisRequest {
            expiry: Some(date(7, 18)),
            strike: Some(110.0),
            entry_premium: Some(2.0),
            contracts: 3,
            target_price: Some(120.0),
            ..AnalysisRequest::new("XYZ")
        };
        let report = analyzer.analyze(&request).await.unwrap();

        assert_eq!(report.expiry, date(7, 18));
        assert_relative_eq!(report.quote.mid_price(), 2.1, epsilon = 1e-12);
        assert_relative_eq!(report.trade.entry_premium, 2.0);
        assert_relative_eq!(report.scenario.total_risk, 600.0);
        assert_relative_eq!(report.scenario.gross_profit, 2400.0);
        assert_relative_eq!(report.scenario.roi, 400.0);
    }

    #[tokio::test]
    async fn missing_spot_is_data_unavailable() {
        let analyzer = Analyzer::new(StaticGateway::default());
        let err = analyzer.analyze(&AnalysisRequest::new("XYZ")).await.unwrap_err();
        assert!(matches!(err, OptionsError::DataUnavailable(t) if t == "XYZ"));
    }

    #[tokio::test]
    async fn no_expirations_means_no_options() {
        let analyzer = Analyzer::new(StaticGateway {
            spot: Some(10.0),
            ..Default::default()
        });
        let err = analyzer.analyze(&AnalysisRequest::new("XYZ")).await.unwrap_err();
        assert!(matches!(err, OptionsError::NoOptionsAvailable(_)));
    }

    #[tokio::test]
    async fn unlisted_expiry_is_rejected() {
        let analyzer = Analyzer::new(gateway());
        let request = AnalysisRequest {
            expiry: Some(date(8, 15)),
            ..AnalysisRequest::new("XYZ")
        };
        let err = analyzer.analyze(&request).await.unwrap_err();
        assert!(matches!(err, OptionsError::ExpirationNotFound { .. }));
    }

    #[tokio::test]
    async fn strike_outside_window_is_not_selectable() {
        let analyzer = Analyzer::new(gateway());
        let request = AnalysisRequest {
            strike: Some(200.0),
            ..AnalysisRequest::new("XYZ")
        };
        let err = analyzer.analyze(&request).await.unwrap_err();
        assert!(matches!(err, OptionsError::StrikeNotFound(_)));
    }

    #[tokio::test]
    async fn empty_window_is_reported() {
        let analyzer = Analyzer::new(StaticGateway {
            spot: Some(1000.0),
            ..gateway()
        });
        let err = analyzer.analyze(&AnalysisRequest::new("XYZ")).await.unwrap_err();
        assert!(matches!(err, OptionsError::NoStrikesInRange { .. }));
    }

    #[tokio::test]
    async fn zero_contracts_is_an_invalid_trade() {
        let analyzer = Analyzer::new(gateway());
        let request = AnalysisRequest {
            contracts: 0,
            ..AnalysisRequest::new("XYZ")
        };
        let err = analyzer.analyze(&request).await.unwrap_err();
        assert!(matches!(err, OptionsError::InvalidTrade(_)));
    }

    #[test]
    fn blank_ticker_is_rejected() {
        assert!(matches!(normalize_ticker("   "), Err(OptionsError::InvalidInput(_))));
        assert_eq!(normalize_ticker("aapl").unwrap(), "AAPL");
    }
}
