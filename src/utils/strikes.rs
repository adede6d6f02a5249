use crate::error::{OptionsError, Result};
use crate::models::{OptionQuote, StrikeWindow};
use tracing::debug;

const STRIKE_TOLERANCE: f64 = 1e-6;

/// Keep the quotes whose strike lies within `window` around `spot`, sorted by strike
pub fn filter_strikes_near_spot(
    quotes: &[OptionQuote],
    spot: f64,
    window: StrikeWindow,
) -> Vec<OptionQuote> {
    let mut kept: Vec<OptionQuote> = quotes
        .iter()
        .filter(|q| window.contains(spot, q.strike))
        .cloned()
        .collect();
    kept.sort_by(|a, b| a.strike.total_cmp(&b.strike));

    debug!(
        "Kept {} of {} strikes around spot {:.2}",
        kept.len(),
        quotes.len(),
        spot
    );
    kept
}

/// Pick the quote for `requested`, or the strike closest to `spot` when none is requested
pub fn select_strike<'a>(
    quotes: &'a [OptionQuote],
    spot: f64,
    requested: Option<f64>,
) -> Result<&'a OptionQuote> {
    match requested {
        Some(strike) => quotes
            .iter()
            .find(|q| (q.strike - strike).abs() < STRIKE_TOLERANCE)
            .ok_or(OptionsError::StrikeNotFound(strike)),
        None => quotes
            .iter()
            .min_by(|a, b| (a.strike - spot).abs().total_cmp(&(b.strike - spot).abs()))
            .ok_or_else(|| OptionsError::InvalidInput("option chain is empty".to_string())),
    }
}
