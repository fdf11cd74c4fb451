//! Store contracts consumed by the conversion core.
//!
//! The core reads and writes two kinds of persisted state: rate snapshots
//! (fallback data for when the provider is unreachable) and conversion
//! transactions. Concrete backends live in the `cambio-store` crate.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use cambio_common::{Currency, RateTable, Timestamp};

/// Errors from a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("snapshot decode error: {0}")]
    Decode(String),
}

/// A persisted, timestamped copy of a rate table.
///
/// Rates are serialized as a string-valued mapping so no binary
/// floating-point representation ever touches a stored rate. Snapshots are
/// append-only; the most recent one per base currency wins on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base_currency: Currency,
    pub rates: BTreeMap<String, String>,
    pub last_updated: Timestamp,
}

impl RateSnapshot {
    /// Capture a snapshot of a rate table.
    pub fn from_table(table: &RateTable, last_updated: Timestamp) -> Self {
        let rates = table
            .iter()
            .map(|(currency, rate)| (currency.code().to_string(), rate.to_string()))
            .collect();
        Self {
            base_currency: table.base().clone(),
            rates,
            last_updated,
        }
    }

    /// Decode the snapshot back into a rate table.
    pub fn to_table(&self) -> Result<RateTable, StoreError> {
        let mut rates = HashMap::with_capacity(self.rates.len());
        for (code, raw) in &self.rates {
            let rate: Decimal = raw
                .parse()
                .map_err(|e| StoreError::Decode(format!("rate for {code}: {e}")))?;
            rates.insert(Currency::new(code.as_str()), rate);
        }
        Ok(RateTable::new(self.base_currency.clone(), rates))
    }
}

/// Persisted rate snapshots.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Append a snapshot. Snapshots are never updated in place.
    async fn save_snapshot(&self, snapshot: RateSnapshot) -> Result<(), StoreError>;

    /// The snapshot with the greatest `last_updated` for the given base
    /// currency, or none.
    async fn load_latest_snapshot(
        &self,
        base: &Currency,
    ) -> Result<Option<RateSnapshot>, StoreError>;
}

/// A conversion transaction awaiting persistence.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: String,
    pub source_currency: Currency,
    pub target_currency: Currency,
    pub source_amount: Decimal,
    pub target_amount: Decimal,
    pub exchange_rate: Decimal,
    pub timestamp: Timestamp,
}

/// A persisted conversion transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub source_currency: Currency,
    pub target_currency: Currency,
    pub source_amount: Decimal,
    pub target_amount: Decimal,
    pub exchange_rate: Decimal,
    pub timestamp: Timestamp,
}

/// Pagination and date filters for transaction history.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// One page of a user's transaction history, newest first.
#[derive(Debug, Clone)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    /// Total matching rows before pagination.
    pub total: i64,
}

/// Persisted conversion transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persist a transaction and return it with its assigned identifier.
    async fn insert(&self, transaction: NewTransaction) -> Result<Transaction, StoreError>;

    /// A user's transaction history, newest first.
    async fn list_for_user(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<TransactionPage, StoreError>;
}
