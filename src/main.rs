//! Live long-call P/L calculator
//!
//! Fetches spot and the call chain for a ticker from Alpaca, evaluates one
//! contract at a target price and writes its P/L-at-expiry chart.

use clap::Parser;
use options_pnl::analyzer::{AnalysisReport, AnalysisRequest, Analyzer};
use options_pnl::api::{AlpacaGateway, RestClient};
use options_pnl::config::Config;
use options_pnl::error::{OptionsError, Result};
use options_pnl::models::CurveRange;
use options_pnl::utils::{payoff_chart_title, plot_payoff_chart};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Long call profit/loss calculator on live option chains
#[derive(Parser, Debug)]
#[command(name = "options-pnl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Underlying ticker, e.g. AAPL, TSLA, NVDA
    #[arg(default_value = "AAPL")]
    ticker: String,

    /// Expiration date (YYYY-MM-DD), nearest listed when omitted
    #[arg(short, long, value_parser = parse_date)]
    expiry: Option<chrono::NaiveDate>,

    /// Strike price, closest to spot when omitted
    #[arg(short, long)]
    strike: Option<f64>,

    /// Entry premium per share, live mid price when omitted
    #[arg(short, long)]
    premium: Option<f64>,

    /// Number of contracts
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    contracts: u32,

    /// Target stock price at expiry, spot + 10% when omitted
    #[arg(short, long)]
    target: Option<f64>,

    /// Number of price samples on the P/L chart
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(2..))]
    samples: u32,

    /// Chart output path, defaults to CHART_OUTPUT_DIR/<ticker>_<strike>C_<expiry>.png
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn parse_date(raw: &str) -> std::result::Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn print_report(report: &AnalysisReport) {
    let quote = &report.quote;
    let scenario = &report.scenario;

    println!("{} Spot Price: ${:.2}", report.ticker, report.spot);
    println!(
        "Expirations: {}",
        report
            .expirations
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "Strikes near spot: {}",
        report
            .available_strikes
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();
    println!("Contract: {} (${} call, {})", quote.occ_symbol, quote.strike, report.expiry);
    println!("Live Mid Price: ${:.2}", quote.mid_price());
    println!("Implied Volatility: {:.1}%", quote.implied_volatility * 100.0);
    println!();
    println!("Trade Configuration");
    println!("  Entry Premium: ${:.2}", report.trade.entry_premium);
    println!("  Contracts: {}", report.trade.contracts);
    println!("  Total Risk (Capital): ${:.2}", scenario.total_risk);
    println!("  Breakeven at Expiry: ${:.2}", scenario.breakeven);
    println!();
    println!("Profit Scenario");
    println!("  Target Stock Price: ${:.2}", scenario.target_price);
    println!(
        "  Projected Profit: ${:.2} ({:.1}% ROI)",
        scenario.gross_profit, scenario.roi
    );
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    config.init_logging()?;

    let request = AnalysisRequest {
        expiry: cli.expiry,
        strike: cli.strike,
        entry_premium: cli.premium,
        contracts: cli.contracts,
        target_price: cli.target,
        curve_range: CurveRange {
            sample_count: cli.samples as usize,
            ..CurveRange::default()
        },
        ..AnalysisRequest::new(cli.ticker)
    };

    let gateway = AlpacaGateway::new(RestClient::new(config.alpaca.clone()));
    let report = Analyzer::new(gateway).analyze(&request).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    let output_path = match cli.output {
        Some(path) => path,
        None => {
            std::fs::create_dir_all(&config.chart_output_dir)?;
            config.chart_output_dir.join(format!(
                "{}_{}C_{}.png",
                report.ticker,
                report.trade.strike,
                report.expiry.format("%Y%m%d")
            ))
        }
    };
    let title = payoff_chart_title(&report.ticker, report.trade.strike, report.expiry);
    plot_payoff_chart(&report.curve, report.scenario.breakeven, &title, &output_path)?;
    info!("P/L chart saved to {:?}", output_path);
    if !cli.json {
        println!();
        println!("Chart: {}", output_path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let OptionsError::NoOptionsAvailable(_) = e {
                error!("{}; pick another ticker", e);
            }
            if e.is_fetch_error() {
                eprintln!("Error fetching data: {}", e);
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_default_to_one_hundred() {
        let cli = Cli::try_parse_from(["options-pnl", "AAPL"]).unwrap();
        assert_eq!(cli.samples, 100);
        assert_eq!(cli.contracts, 1);
    }

    #[test]
    fn samples_below_two_are_rejected() {
        assert!(Cli::try_parse_from(["options-pnl", "AAPL", "--samples", "1"]).is_err());
        assert!(Cli::try_parse_from(["options-pnl", "AAPL", "--samples", "0"]).is_err());
        let cli = Cli::try_parse_from(["options-pnl", "AAPL", "--samples", "2"]).unwrap();
        assert_eq!(cli.samples, 2);
    }

    #[test]
    fn zero_contracts_are_rejected() {
        assert!(Cli::try_parse_from(["options-pnl", "AAPL", "--contracts", "0"]).is_err());
    }
}
