//! Server configuration.

use std::time::Duration;

use cambio_common::Currency;
use cambio_fx::RateEngineConfig;

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Database URL.
    pub database_url: String,
    /// Exchange-rate provider endpoint.
    pub provider_url: String,
    /// Exchange-rate provider access key.
    pub provider_access_key: String,
    /// Provider request timeout.
    pub provider_timeout: Duration,
    /// Base currency for provider rate tables.
    pub base_currency: String,
    /// Time-to-live for cached rate tables, in seconds.
    pub cache_ttl_secs: i64,
    /// Supported currency codes.
    pub supported_currencies: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8000,
            database_url: "postgres://localhost/cambio".to_string(),
            provider_url: "http://api.exchangeratesapi.io/latest".to_string(),
            provider_access_key: String::new(),
            provider_timeout: Duration::from_secs(10),
            base_currency: "EUR".to_string(),
            cache_ttl_secs: 3600,
            supported_currencies: [
                "USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "CNY", "SEK", "NZD", "BRL",
            ]
            .iter()
            .map(|code| code.to_string())
            .collect(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(port) = std::env::var("LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(url) = std::env::var("EXCHANGE_RATE_API_URL") {
            config.provider_url = url;
        }

        if let Ok(key) = std::env::var("EXCHANGE_RATE_API_KEY") {
            config.provider_access_key = key;
        }

        if let Ok(secs) = std::env::var("EXCHANGE_RATE_API_TIMEOUT") {
            if let Ok(secs) = secs.parse() {
                config.provider_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(code) = std::env::var("EXCHANGE_RATE_BASE_CURRENCY") {
            config.base_currency = code;
        }

        if let Ok(ttl) = std::env::var("EXCHANGE_RATE_CACHE_TTL") {
            if let Ok(ttl) = ttl.parse() {
                config.cache_ttl_secs = ttl;
            }
        }

        if let Ok(codes) = std::env::var("SUPPORTED_CURRENCIES") {
            config.supported_currencies = codes
                .split(',')
                .map(|code| code.trim().to_uppercase())
                .filter(|code| !code.is_empty())
                .collect();
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.database_url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        if self.provider_url.is_empty() {
            return Err("Provider URL cannot be empty".to_string());
        }

        if self.cache_ttl_secs <= 0 {
            return Err("Cache TTL must be positive".to_string());
        }

        if !self
            .supported_currencies
            .iter()
            .any(|code| code.eq_ignore_ascii_case(&self.base_currency))
        {
            return Err(format!(
                "Base currency {} must be in the supported set",
                self.base_currency
            ));
        }

        Ok(())
    }

    /// Build the rate-engine configuration.
    pub fn engine_config(&self) -> RateEngineConfig {
        RateEngineConfig {
            base_currency: Currency::new(self.base_currency.as_str()),
            cache_ttl: chrono::Duration::seconds(self.cache_ttl_secs),
            supported_currencies: self
                .supported_currencies
                .iter()
                .map(|code| Currency::new(code.as_str()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_port_is_invalid() {
        let mut config = ServerConfig::default();
        config.listen_port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_currency_must_be_supported() {
        let mut config = ServerConfig::default();
        config.base_currency = "XXX".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ttl_is_invalid() {
        let mut config = ServerConfig::default();
        config.cache_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_config_carries_the_supported_set() {
        let engine_config = ServerConfig::default().engine_config();
        assert_eq!(engine_config.base_currency, Currency::eur());
        assert_eq!(engine_config.supported_currencies.len(), 11);
        assert!(engine_config
            .supported_currencies
            .contains(&Currency::new("BRL")));
    }
}
