//! Cambio FX Core
//!
//! Exchange-rate retrieval and currency conversion for the Cambio service.
//!
//! # Features
//!
//! - Rate-table caching with configurable TTL
//! - Strict fallback chain: fresh cache, live fetch, stale cache, persisted
//!   snapshot
//! - Cross-rate derivation between non-base currencies
//! - Validated conversions recorded as transactions
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use cambio_fx::{ConversionService, HttpRateProvider, RateEngine, RateEngineConfig};
//! use cambio_common::Currency;
//!
//! let provider = Arc::new(HttpRateProvider::new(url, key, timeout)?);
//! let engine = Arc::new(RateEngine::new(provider, rate_store, RateEngineConfig::default()));
//!
//! let rate = engine.exchange_rate(&Currency::usd(), &Currency::eur()).await?;
//!
//! let conversions = ConversionService::new(engine, transaction_store);
//! let outcome = conversions.convert("alice", &Currency::usd(), &Currency::eur(), amount).await?;
//! ```

pub mod cache;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod provider;
pub mod store;

pub use cache::RateCache;
pub use conversion::{ConversionOutcome, ConversionService};
pub use engine::{RateEngine, RateEngineConfig};
pub use error::{FxError, FxResult};
pub use provider::{HttpRateProvider, ProviderError, RateProvider};
pub use store::{
    NewTransaction, RateSnapshot, RateStore, StoreError, Transaction, TransactionFilter,
    TransactionPage, TransactionStore,
};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
