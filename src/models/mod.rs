//! Data models for option quotes, trades and payoff results
//!
//! This module contains the chain snapshot types fetched from the data
//! provider and the structures produced by the payoff calculations.

mod option;
mod payoff;

pub use option::*;
pub use payoff::*;
