//! Rate provider trait and implementations.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use cambio_common::{Currency, RateTable};

/// Errors from a rate provider fetch.
///
/// The fallback chain treats every variant identically; the split exists for
/// logging and tests.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned status code {0}")]
    Status(u16),

    #[error("invalid provider response: {0}")]
    MalformedPayload(String),
}

/// Trait for exchange-rate providers.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch the full rate table for a base currency.
    async fn fetch_rates(&self, base: &Currency) -> Result<RateTable, ProviderError>;
}

/// Rate provider backed by an HTTP JSON endpoint.
///
/// Issues a GET with `base` and `access_key` query parameters; success is
/// HTTP 200 with a body containing a `rates` object mapping currency codes
/// to numeric rates.
pub struct HttpRateProvider {
    client: reqwest::Client,
    endpoint: String,
    access_key: String,
}

impl HttpRateProvider {
    /// Create a provider client with a per-request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            access_key: access_key.into(),
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_rates(&self, base: &Currency) -> Result<RateTable, ProviderError> {
        debug!(endpoint = %self.endpoint, base = %base, "requesting exchange rates");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("base", base.code()), ("access_key", self.access_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        let rates = body
            .get("rates")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ProviderError::MalformedPayload("response has no rates object".to_string())
            })?;

        let mut table = HashMap::with_capacity(rates.len());
        for (code, value) in rates {
            // Rates go through their decimal string rendering, never through
            // f64 arithmetic.
            let raw = match value {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                _ => {
                    return Err(ProviderError::MalformedPayload(format!(
                        "non-numeric rate for {code}"
                    )))
                }
            };
            let rate: Decimal = raw.parse().map_err(|e| {
                ProviderError::MalformedPayload(format!("unparseable rate for {code}: {e}"))
            })?;
            if rate <= Decimal::ZERO {
                return Err(ProviderError::MalformedPayload(format!(
                    "non-positive rate for {code}"
                )));
            }
            table.insert(Currency::new(code.as_str()), rate);
        }

        Ok(RateTable::new(base.clone(), table))
    }
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    tables: dashmap::DashMap<String, RateTable>,
    failing: std::sync::atomic::AtomicBool,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a new mock provider with no configured tables.
    pub fn new() -> Self {
        Self {
            tables: dashmap::DashMap::new(),
            failing: std::sync::atomic::AtomicBool::new(false),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Configure the table returned for its base currency.
    pub fn set_table(&self, table: RateTable) {
        self.tables.insert(table.base().code().to_string(), table);
    }

    /// Make every subsequent fetch fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of fetch calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_rates(&self, base: &Currency) -> Result<RateTable, ProviderError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(ProviderError::Status(500));
        }

        self.tables
            .get(base.code())
            .map(|table| table.clone())
            .ok_or_else(|| {
                ProviderError::MalformedPayload(format!("no table configured for {base}"))
            })
    }
}
