//! # options-pnl
//!
//! Profit/loss calculator for a single long call on a live option chain.
//!
//! ## Features
//!
//! - Spot prices and call chains from the Alpaca Markets REST APIs
//! - Strike filtering around spot and at-the-money contract selection
//! - Payoff-at-expiry metrics: total risk, breakeven, projected profit, ROI
//! - Sampled P/L curves rendered as PNG charts
//! - Environment-based configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use options_pnl::analyzer::{AnalysisRequest, Analyzer};
//! use options_pnl::api::{AlpacaGateway, RestClient};
//! use options_pnl::config::Config;
//! use options_pnl::utils::{payoff_chart_title, plot_payoff_chart};
//!
//! #[tokio::main]
//! async fn main() -> options_pnl::error::Result<()> {
//!     let config = Config::from_env()?;
//!     config.init_logging()?;
//!
//!     let gateway = AlpacaGateway::new(RestClient::new(config.alpaca.clone()));
//!     let request = AnalysisRequest {
//!         contracts: 2,
//!         target_price: Some(250.0),
//!         ..AnalysisRequest::new("AAPL")
//!     };
//!     let report = Analyzer::new(gateway).analyze(&request).await?;
//!
//!     println!(
//!         "Risk ${:.2}, breakeven ${:.2}, ROI {:.1}%",
//!         report.scenario.total_risk, report.scenario.breakeven, report.scenario.roi
//!     );
//!
//!     let title = payoff_chart_title(&report.ticker, report.trade.strike, report.expiry);
//!     plot_payoff_chart(&report.curve, report.scenario.breakeven, &title, "pnl.png")?;
//!
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use analyzer::{AnalysisReport, AnalysisRequest, Analyzer};
pub use api::{AlpacaGateway, MarketDataGateway, RestClient};
pub use config::Config;
pub use error::{OptionsError, Result};
