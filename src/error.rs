use thiserror::Error;

/// Custom error types for the options-pnl library
#[derive(Error, Debug)]
pub enum OptionsError {
    /// No recent trade, quote or bar exists for the underlying
    #[error("No recent price data for {0}")]
    DataUnavailable(String),

    /// The underlying has no listed option expirations
    #[error("No options available for {0}")]
    NoOptionsAvailable(String),

    #[error("Expiration {expiry} is not listed for {ticker}")]
    ExpirationNotFound { ticker: String, expiry: String },

    #[error("Strike {0:.2} is not in the filtered option chain")]
    StrikeNotFound(f64),

    #[error("No call strikes within {low:.2}..={high:.2} for {ticker}")]
    NoStrikesInRange { ticker: String, low: f64, high: f64 },

    #[error("Invalid trade: {0}")]
    InvalidTrade(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl OptionsError {
    /// Whether the failure came from querying the market data provider
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            OptionsError::DataUnavailable(_)
                | OptionsError::NoOptionsAvailable(_)
                | OptionsError::Api { .. }
                | OptionsError::Http(_)
                | OptionsError::ParseError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OptionsError>;
