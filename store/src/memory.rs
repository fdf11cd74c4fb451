//! In-memory store implementations.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use cambio_common::Currency;
use cambio_fx::store::{
    NewTransaction, RateSnapshot, RateStore, StoreError, Transaction, TransactionFilter,
    TransactionPage, TransactionStore,
};

/// In-memory rate snapshot store.
#[derive(Default)]
pub struct MemoryRateStore {
    snapshots: RwLock<Vec<RateSnapshot>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn save_snapshot(&self, snapshot: RateSnapshot) -> Result<(), StoreError> {
        self.snapshots.write().push(snapshot);
        Ok(())
    }

    async fn load_latest_snapshot(
        &self,
        base: &Currency,
    ) -> Result<Option<RateSnapshot>, StoreError> {
        Ok(self
            .snapshots
            .read()
            .iter()
            .filter(|snapshot| &snapshot.base_currency == base)
            .max_by_key(|snapshot| snapshot.last_updated)
            .cloned())
    }
}

/// In-memory transaction store.
#[derive(Default)]
pub struct MemoryTransactionStore {
    rows: RwLock<Vec<Transaction>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn insert(&self, transaction: NewTransaction) -> Result<Transaction, StoreError> {
        let stored = Transaction {
            id: Uuid::now_v7(),
            user_id: transaction.user_id,
            source_currency: transaction.source_currency,
            target_currency: transaction.target_currency,
            source_amount: transaction.source_amount,
            target_amount: transaction.target_amount,
            exchange_rate: transaction.exchange_rate,
            timestamp: transaction.timestamp,
        };
        self.rows.write().push(stored.clone());
        Ok(stored)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<TransactionPage, StoreError> {
        let mut matching: Vec<Transaction> = self
            .rows
            .read()
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| filter.from.map_or(true, |from| t.timestamp >= from))
            .filter(|t| filter.to.map_or(true, |to| t.timestamp <= to))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total = matching.len() as i64;

        let mut page = matching;
        if let Some(offset) = filter.offset {
            if offset >= 0 {
                page = page.into_iter().skip(offset as usize).collect();
            }
        }
        if let Some(limit) = filter.limit {
            if limit > 0 {
                page.truncate(limit as usize);
            }
        }

        Ok(TransactionPage {
            transactions: page,
            total,
        })
    }
}
