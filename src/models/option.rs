use crate::error::{OptionsError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Shares delivered per standard equity option contract
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

/// Contract terms decoded from an OCC option symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub underlying: String,
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub occ_symbol: String,
}

impl OptionContract {
    /// Parse OCC option symbol
    ///
    /// Format: root + YYMMDD + C/P + strike × 1000 as 8 digits, e.g.
    /// `AAPL250530C00145000`. The root may be followed by padding spaces.
    pub fn from_occ_symbol(occ_symbol: &str) -> Option<Self> {
        trace!("Parsing OCC symbol: {}", occ_symbol);

        let compact: String = occ_symbol.chars().filter(|c| !c.is_whitespace()).collect();
        // root needs at least one char, then 6 date + 1 type + 8 strike
        if compact.len() < 16 || !compact.is_ascii() {
            warn!("OCC symbol too short: {}", occ_symbol);
            return None;
        }

        let tail_start = compact.len() - 15;
        let underlying = &compact[..tail_start];
        let date_str = &compact[tail_start..tail_start + 6];
        let type_char = &compact[tail_start + 6..tail_start + 7];
        let strike_str = &compact[tail_start + 7..];

        let option_type = match type_char {
            "C" => OptionType::Call,
            "P" => OptionType::Put,
            other => {
                warn!("Invalid option type character '{}' in OCC symbol: {}", other, occ_symbol);
                return None;
            }
        };

        let expiration = match NaiveDate::parse_from_str(&format!("20{}", date_str), "%Y%m%d") {
            Ok(d) => d,
            Err(e) => {
                warn!("Invalid expiration '{}' in OCC symbol {}: {}", date_str, occ_symbol, e);
                return None;
            }
        };

        let strike = match strike_str.parse::<u64>() {
            Ok(s) => s as f64 / 1000.0,
            Err(e) => {
                warn!("Failed to parse strike '{}' in OCC symbol {}: {}", strike_str, occ_symbol, e);
                return None;
            }
        };

        Some(Self {
            underlying: underlying.to_string(),
            option_type,
            strike,
            expiration,
            occ_symbol: occ_symbol.to_string(),
        })
    }

    pub fn is_call(&self) -> bool {
        self.option_type == OptionType::Call
    }
}

/// Quote snapshot for one call strike of a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub occ_symbol: String,
    pub expiration: NaiveDate,
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
    /// Fraction, 0.25 means 25%
    pub implied_volatility: f64,
}

impl OptionQuote {
    pub fn mid_price(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }
}

/// A long call position as configured by the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeConfig {
    pub strike: f64,
    /// Premium paid per share
    pub entry_premium: f64,
    pub contracts: u32,
}

impl TradeConfig {
    pub fn new(strike: f64, entry_premium: f64, contracts: u32) -> Result<Self> {
        if contracts < 1 {
            return Err(OptionsError::InvalidTrade(
                "at least one contract is required".to_string(),
            ));
        }
        if !strike.is_finite() || strike < 0.0 {
            return Err(OptionsError::InvalidTrade(format!(
                "strike must be a non-negative price, got {}",
                strike
            )));
        }
        if !entry_premium.is_finite() || entry_premium < 0.0 {
            return Err(OptionsError::InvalidTrade(format!(
                "entry premium must be a non-negative price, got {}",
                entry_premium
            )));
        }

        Ok(Self {
            strike,
            entry_premium,
            contracts,
        })
    }

    /// Configure a trade from a quote, paying `premium_override` if given and
    /// the live mid price otherwise
    pub fn from_quote(quote: &OptionQuote, premium_override: Option<f64>, contracts: u32) -> Result<Self> {
        let premium = premium_override.unwrap_or_else(|| quote.mid_price());
        Self::new(quote.strike, premium, contracts)
    }
}
