//! Payoff-at-expiry results for a single long call

use serde::{Deserialize, Serialize};

/// Sampling range of a payoff curve, as factors of a center price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveRange {
    pub low_factor: f64,
    pub high_factor: f64,
    pub sample_count: usize,
}

impl Default for CurveRange {
    fn default() -> Self {
        Self {
            low_factor: 0.8,
            high_factor: 1.2,
            sample_count: 100,
        }
    }
}

/// Strikes kept around spot, as factors of the spot price (both ends inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeWindow {
    pub low_factor: f64,
    pub high_factor: f64,
}

impl Default for StrikeWindow {
    fn default() -> Self {
        Self {
            low_factor: 0.7,
            high_factor: 1.3,
        }
    }
}

impl StrikeWindow {
    pub fn bounds(&self, spot: f64) -> (f64, f64) {
        (spot * self.low_factor, spot * self.high_factor)
    }

    pub fn contains(&self, spot: f64, strike: f64) -> bool {
        let (low, high) = self.bounds(spot);
        strike >= low && strike <= high
    }
}

/// One sample of a payoff curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffPoint {
    pub underlying_price: f64,
    pub profit_loss: f64,
}

/// P/L at expiry over increasing underlying prices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayoffCurve {
    pub points: Vec<PayoffPoint>,
}

impl PayoffCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PayoffPoint> {
        self.points.iter()
    }

    /// (min, max) of the sampled prices
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some((first.underlying_price, last.underlying_price))
    }

    /// (min, max) of the sampled P/L values
    pub fn profit_range(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let min = self
            .points
            .iter()
            .map(|p| p.profit_loss)
            .fold(f64::INFINITY, f64::min);
        let max = self
            .points
            .iter()
            .map(|p| p.profit_loss)
            .fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}

/// Metrics of a trade evaluated at one target underlying price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitScenario {
    pub target_price: f64,
    pub total_risk: f64,
    pub breakeven: f64,
    pub gross_profit: f64,
    /// Percent, 400.0 means 400%
    pub roi: f64,
}
