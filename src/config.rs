use crate::error::{OptionsError, Result};
use dotenv::dotenv;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use url::Url;

/// Configuration for the Alpaca API
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaConfig {
    /// Alpaca API key
    pub api_key: String,
    /// Alpaca API secret
    pub api_secret: String,
    /// Trading API base URL, serves the option contracts listing
    pub trading_url: String,
    /// Market data API base URL
    pub data_url: String,
    /// Options data feed (`indicative` or `opra`)
    pub options_feed: String,
}

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Alpaca API configuration
    pub alpaca: AlpacaConfig,
    /// Log level
    pub log_level: String,
    /// Directory the P/L chart is written to
    pub chart_output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let default_log_level = "info".to_string();
        let default_trading_url = "https://paper-api.alpaca.markets".to_string();
        let default_data_url = "https://data.alpaca.markets".to_string();
        let default_options_feed = "indicative".to_string();
        let default_chart_output_dir = "output".to_string();

        let api_key = env::var("ALPACA_API_KEY").map_err(|_| {
            OptionsError::ConfigError("ALPACA_API_KEY environment variable not set".to_string())
        })?;

        let api_secret = env::var("ALPACA_API_SECRET").map_err(|_| {
            OptionsError::ConfigError("ALPACA_API_SECRET environment variable not set".to_string())
        })?;

        let trading_url = env::var("ALPACA_TRADING_URL").unwrap_or(default_trading_url);
        let data_url = env::var("ALPACA_DATA_URL").unwrap_or(default_data_url);
        let options_feed = env::var("ALPACA_OPTIONS_FEED").unwrap_or(default_options_feed);
        let log_level = env::var("LOG_LEVEL").unwrap_or(default_log_level);
        let chart_output_dir = env::var("CHART_OUTPUT_DIR").unwrap_or(default_chart_output_dir);

        let config = Config {
            alpaca: AlpacaConfig {
                api_key,
                api_secret,
                trading_url,
                data_url,
                options_feed,
            },
            log_level,
            chart_output_dir: PathBuf::from(chart_output_dir),
        };
        config.validate()?;

        Ok(config)
    }

    /// Check that the configured endpoints are absolute http(s) URLs
    pub fn validate(&self) -> Result<()> {
        for (name, raw) in [
            ("ALPACA_TRADING_URL", &self.alpaca.trading_url),
            ("ALPACA_DATA_URL", &self.alpaca.data_url),
        ] {
            let parsed = Url::parse(raw)
                .map_err(|e| OptionsError::ConfigError(format!("{} is not a valid URL: {}", name, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(OptionsError::ConfigError(format!(
                    "{} must use http or https, got {}",
                    name,
                    parsed.scheme()
                )));
            }
        }

        if !matches!(self.alpaca.options_feed.as_str(), "indicative" | "opra") {
            return Err(OptionsError::ConfigError(format!(
                "ALPACA_OPTIONS_FEED must be `indicative` or `opra`, got `{}`",
                self.alpaca.options_feed
            )));
        }

        Ok(())
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .map_err(|e| OptionsError::ConfigError(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            alpaca: AlpacaConfig {
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
                trading_url: "https://paper-api.alpaca.markets".to_string(),
                data_url: "https://data.alpaca.markets".to_string(),
                options_feed: "indicative".to_string(),
            },
            log_level: "info".to_string(),
            chart_output_dir: PathBuf::from("output"),
        }
    }

    #[test]
    fn default_endpoints_are_valid() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn rejects_malformed_data_url() {
        let mut config = sample_config();
        config.alpaca.data_url = "data.alpaca.markets".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, OptionsError::ConfigError(msg) if msg.contains("ALPACA_DATA_URL")));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let mut config = sample_config();
        config.alpaca.trading_url = "ftp://paper-api.alpaca.markets".to_string();
        assert!(matches!(config.validate(), Err(OptionsError::ConfigError(_))));
    }

    #[test]
    fn rejects_unknown_feed() {
        let mut config = sample_config();
        config.alpaca.options_feed = "sip".to_string();
        assert!(matches!(config.validate(), Err(OptionsError::ConfigError(_))));
    }
}
