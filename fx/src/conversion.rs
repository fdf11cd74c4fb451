//! Currency conversion built on the rate engine.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use cambio_common::{now, round_display, Currency, Money, Timestamp};

use crate::engine::RateEngine;
use crate::error::{FxError, FxResult};
use crate::store::{NewTransaction, TransactionStore};

/// The outcome of a completed conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub transaction_id: Uuid,
    pub user_id: String,
    pub from: Money,
    pub to: Money,
    pub rate: Decimal,
    pub timestamp: Timestamp,
}

/// Service performing validated conversions and recording each one as a
/// transaction.
pub struct ConversionService {
    rates: Arc<RateEngine>,
    transactions: Arc<dyn TransactionStore>,
}

impl ConversionService {
    /// Create a conversion service over a rate engine and transaction store.
    pub fn new(rates: Arc<RateEngine>, transactions: Arc<dyn TransactionStore>) -> Self {
        Self {
            rates,
            transactions,
        }
    }

    /// Convert an amount between currencies and record the transaction.
    ///
    /// Exactly one transaction is persisted per successful call; every
    /// failure path short-circuits before persistence.
    #[instrument(skip(self), fields(from = %from, to = %to, amount = %amount))]
    pub async fn convert(
        &self,
        user_id: &str,
        from: &Currency,
        to: &Currency,
        amount: Decimal,
    ) -> FxResult<ConversionOutcome> {
        if amount <= Decimal::ZERO {
            return Err(FxError::InvalidAmount(amount));
        }

        let rate = self.rates.exchange_rate(from, to).await?;

        // Display precision for the persisted rate; the converted amount is
        // computed from this coarser rate, not the 9-dp lookup value.
        let display_rate = round_display(rate);
        let converted = round_display(amount * display_rate);

        let stored = self
            .transactions
            .insert(NewTransaction {
                user_id: user_id.to_string(),
                source_currency: from.clone(),
                target_currency: to.clone(),
                source_amount: amount,
                target_amount: converted,
                exchange_rate: display_rate,
                timestamp: now(),
            })
            .await?;

        info!(
            transaction_id = %stored.id,
            rate = %stored.exchange_rate,
            "conversion completed"
        );

        Ok(ConversionOutcome {
            transaction_id: stored.id,
            user_id: stored.user_id,
            from: Money::new(stored.source_currency, stored.source_amount),
            to: Money::new(stored.target_currency, stored.target_amount),
            rate: stored.exchange_rate,
            timestamp: stored.timestamp,
        })
    }
}
