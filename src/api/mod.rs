//! Market data access
//!
//! This module contains the Alpaca REST client and the gateway trait the
//! analyzer queries spot prices and option chains through.

mod gateway;
pub mod rest;

pub use gateway::*;
pub use rest::RestClient;
