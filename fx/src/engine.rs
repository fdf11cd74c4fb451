//! Rate engine: cross-rate derivation over a cached, fallback-backed
//! base-currency rate table.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use cambio_common::{now, round_rate, Currency, RateTable};

use crate::cache::RateCache;
use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;
use crate::store::{RateSnapshot, RateStore};

/// Configuration for the rate engine.
#[derive(Debug, Clone)]
pub struct RateEngineConfig {
    /// Base currency all provider tables are expressed against.
    pub base_currency: Currency,
    /// Time-to-live for cached rate tables.
    pub cache_ttl: Duration,
    /// The fixed set of currency codes accepted for conversion.
    pub supported_currencies: HashSet<Currency>,
}

impl Default for RateEngineConfig {
    fn default() -> Self {
        let supported = [
            "USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "CNY", "SEK", "NZD", "BRL",
        ]
        .into_iter()
        .map(Currency::new)
        .collect();

        Self {
            base_currency: Currency::eur(),
            cache_ttl: Duration::seconds(3600),
            supported_currencies: supported,
        }
    }
}

/// The rate engine.
///
/// Safe to share behind an `Arc` and invoke from concurrent request tasks;
/// the cache is the only shared mutable state and last writer wins under
/// concurrent refresh.
pub struct RateEngine {
    provider: Arc<dyn RateProvider>,
    store: Arc<dyn RateStore>,
    cache: RateCache,
    config: RateEngineConfig,
}

impl RateEngine {
    /// Create a new rate engine with the given provider and snapshot store.
    pub fn new(
        provider: Arc<dyn RateProvider>,
        store: Arc<dyn RateStore>,
        config: RateEngineConfig,
    ) -> Self {
        Self {
            provider,
            store,
            cache: RateCache::new(config.cache_ttl),
            config,
        }
    }

    /// The configured base currency.
    pub fn base_currency(&self) -> &Currency {
        &self.config.base_currency
    }

    /// Check whether a currency belongs to the supported set.
    pub fn is_supported(&self, currency: &Currency) -> bool {
        self.config.supported_currencies.contains(currency)
    }

    /// Get the exchange rate between two supported currencies, rounded to
    /// lookup precision (9 decimal places).
    #[instrument(skip(self), fields(from = %from, to = %to))]
    pub async fn exchange_rate(&self, from: &Currency, to: &Currency) -> FxResult<Decimal> {
        for currency in [from, to] {
            if !self.is_supported(currency) {
                return Err(FxError::InvalidCurrency(currency.code().to_string()));
            }
        }

        // Same-currency conversion: exactly 1, no fetch, no rounding.
        if from == to {
            return Ok(Decimal::ONE);
        }

        let table = self.rates().await?;
        let rate = Self::cross_rate(&table, from, to)?;
        Ok(round_rate(rate))
    }

    /// Derive the from→to rate out of a base-relative table.
    fn cross_rate(table: &RateTable, from: &Currency, to: &Currency) -> FxResult<Decimal> {
        let base = table.base();
        let rate = if from == base {
            Self::table_rate(table, to)?
        } else if to == base {
            Decimal::ONE / Self::table_rate(table, from)?
        } else {
            Self::table_rate(table, to)? / Self::table_rate(table, from)?
        };
        Ok(rate)
    }

    fn table_rate(table: &RateTable, currency: &Currency) -> FxResult<Decimal> {
        // A supported currency missing from the table (or quoted at a
        // non-positive rate) is a provider-data failure, not a client error.
        match table.rate(currency) {
            Some(rate) if rate > Decimal::ZERO => Ok(rate),
            Some(_) => Err(FxError::ServiceUnavailable(format!(
                "non-positive rate for {currency}"
            ))),
            None => Err(FxError::ServiceUnavailable(format!(
                "rate table has no entry for {currency}"
            ))),
        }
    }

    /// Get the full rate table for the configured base currency.
    ///
    /// Strict fallback chain, each tier attempted only if the prior is
    /// unavailable: fresh cache, live fetch (cached and snapshotted on
    /// success), stale cache, latest persisted snapshot, error.
    async fn rates(&self) -> FxResult<RateTable> {
        let base = &self.config.base_currency;

        if let Some(table) = self.cache.fresh(base) {
            return Ok(table);
        }

        info!(base = %base, provider = self.provider.name(), "fetching exchange rates from provider");
        let fetch_err = match self.provider.fetch_rates(base).await {
            Ok(table) => {
                self.cache.insert(table.clone());

                // Best-effort snapshot: a write failure must not mask the
                // successful fetch.
                let snapshot = RateSnapshot::from_table(&table, now());
                if let Err(e) = self.store.save_snapshot(snapshot).await {
                    warn!(error = %e, "failed to persist rate snapshot");
                }

                return Ok(table);
            }
            Err(e) => e,
        };

        warn!(error = %fetch_err, "rate fetch failed, falling back");

        if let Some(table) = self.cache.any(base) {
            warn!(base = %base, "serving expired cached exchange rates");
            return Ok(table);
        }

        match self.store.load_latest_snapshot(base).await {
            Ok(Some(snapshot)) => match snapshot.to_table() {
                Ok(table) => {
                    warn!(
                        base = %base,
                        last_updated = %snapshot.last_updated,
                        "serving exchange rates from persisted snapshot"
                    );
                    return Ok(table);
                }
                Err(e) => warn!(error = %e, "persisted snapshot could not be decoded"),
            },
            Ok(None) => debug!(base = %base, "no persisted snapshot available"),
            Err(e) => warn!(error = %e, "snapshot lookup failed"),
        }

        Err(FxError::ServiceUnavailable(format!(
            "failed to fetch exchange rates: {fetch_err}"
        )))
    }
}
