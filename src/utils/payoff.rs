use crate::error::{OptionsError, Result};
use crate::models::{
    CurveRange, PayoffCurve, PayoffPoint, ProfitScenario, TradeConfig, CONTRACT_MULTIPLIER,
};

/// Underlying price at expiry where the long call neither makes nor loses money
pub fn breakeven(strike: f64, entry_premium: f64) -> f64 {
    strike + entry_premium
}

/// Capital at risk: the full premium paid for all contracts
pub fn total_risk(entry_premium: f64, contracts: u32) -> Result<f64> {
    if contracts < 1 {
        return Err(OptionsError::InvalidTrade(
            "total risk needs at least one contract".to_string(),
        ));
    }
    Ok(entry_premium * CONTRACT_MULTIPLIER * contracts as f64)
}

/// Long call P/L at expiry, net of the premium paid
pub fn gross_profit(underlying_price: f64, strike: f64, entry_premium: f64, contracts: u32) -> f64 {
    let intrinsic = (underlying_price - strike).max(0.0);
    (intrinsic - entry_premium) * CONTRACT_MULTIPLIER * contracts as f64
}

/// Return on risk in percent. Zero when nothing is at risk.
pub fn roi(gross_profit: f64, total_risk: f64) -> f64 {
    if total_risk > 0.0 {
        gross_profit / total_risk * 100.0
    } else {
        0.0
    }
}

/// `sample_count` evenly spaced prices from `low` to `high`, both inclusive
pub fn linspace(low: f64, high: f64, sample_count: usize) -> Vec<f64> {
    match sample_count {
        0 => Vec::new(),
        1 => vec![low],
        n => {
            let step = (high - low) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { high } else { low + step * i as f64 })
                .collect()
        }
    }
}

/// Sample the P/L at expiry over `[center × low_factor, center × high_factor]`
pub fn payoff_curve(
    strike: f64,
    entry_premium: f64,
    contracts: u32,
    center_price: f64,
    range: CurveRange,
) -> PayoffCurve {
    let points = linspace(
        center_price * range.low_factor,
        center_price * range.high_factor,
        range.sample_count,
    )
    .into_iter()
    .map(|price| PayoffPoint {
        underlying_price: price,
        profit_loss: gross_profit(price, strike, entry_premium, contracts),
    })
    .collect();

    PayoffCurve { points }
}

/// Default target price: spot + 10%, rounded to cents
pub fn default_target(spot: f64) -> f64 {
    (spot * 1.1 * 100.0).round() / 100.0
}

impl TradeConfig {
    pub fn total_risk(&self) -> Result<f64> {
        total_risk(self.entry_premium, self.contracts)
    }

    pub fn breakeven(&self) -> f64 {
        breakeven(self.strike, self.entry_premium)
    }

    pub fn gross_profit_at(&self, underlying_price: f64) -> f64 {
        gross_profit(underlying_price, self.strike, self.entry_premium, self.contracts)
    }

    pub fn payoff_curve(&self, center_price: f64, range: CurveRange) -> PayoffCurve {
        payoff_curve(self.strike, self.entry_premium, self.contracts, center_price, range)
    }
}

impl ProfitScenario {
    /// Evaluate a trade at a target underlying price
    pub fn evaluate(trade: &TradeConfig, target_price: f64) -> Result<Self> {
        let total_risk = trade.total_risk()?;
        let gross_profit = trade.gross_profit_at(target_price);

        Ok(Self {
            target_price,
            total_risk,
            breakeven: trade.breakeven(),
            gross_profit,
            roi: roi(gross_profit, total_risk),
        })
    }
}
