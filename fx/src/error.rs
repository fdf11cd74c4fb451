//! Error taxonomy for the conversion core.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced to callers of the rate engine and conversion service.
#[derive(Debug, Error)]
pub enum FxError {
    /// Currency code outside the supported set.
    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Non-positive conversion amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Every rate-fallback tier was exhausted.
    #[error("exchange rate service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The transaction write failed after a rate was obtained.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

/// Result type for conversion-core operations.
pub type FxResult<T> = Result<T, FxError>;
