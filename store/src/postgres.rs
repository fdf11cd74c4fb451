//! PostgreSQL store implementations over sqlx.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use cambio_common::{Currency, Timestamp};
use cambio_fx::store::{
    NewTransaction, RateSnapshot, RateStore, StoreError, Transaction, TransactionFilter,
    TransactionPage, TransactionStore,
};

/// Embedded SQL migrations for the Cambio schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// Rate snapshot store backed by PostgreSQL.
///
/// Snapshots are append-only rows; the string-valued rates mapping is stored
/// as JSONB so no binary floating-point representation touches a rate.
pub struct PgRateStore {
    pool: PgPool,
}

impl PgRateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateStore for PgRateStore {
    async fn save_snapshot(&self, snapshot: RateSnapshot) -> Result<(), StoreError> {
        let rates = serde_json::to_value(&snapshot.rates)
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        sqlx::query(
            "INSERT INTO exchange_rate_snapshots (id, base_currency, rates, last_updated) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::now_v7())
        .bind(snapshot.base_currency.code())
        .bind(rates)
        .bind(snapshot.last_updated)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn load_latest_snapshot(
        &self,
        base: &Currency,
    ) -> Result<Option<RateSnapshot>, StoreError> {
        let row = sqlx::query(
            "SELECT base_currency, rates, last_updated FROM exchange_rate_snapshots \
             WHERE base_currency = $1 \
             ORDER BY last_updated DESC \
             LIMIT 1",
        )
        .bind(base.code())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(decode_snapshot).transpose()
    }
}

fn decode_snapshot(row: PgRow) -> Result<RateSnapshot, StoreError> {
    let base_currency: String = row.try_get("base_currency").map_err(db_err)?;
    let rates: serde_json::Value = row.try_get("rates").map_err(db_err)?;
    let rates = serde_json::from_value(rates).map_err(|e| StoreError::Decode(e.to_string()))?;
    let last_updated: Timestamp = row.try_get("last_updated").map_err(db_err)?;

    Ok(RateSnapshot {
        base_currency: Currency::new(base_currency),
        rates,
        last_updated,
    })
}

/// Transaction store backed by PostgreSQL.
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn insert(&self, transaction: NewTransaction) -> Result<Transaction, StoreError> {
        let row = sqlx::query(
            "INSERT INTO transactions \
             (id, user_id, source_currency, target_currency, source_amount, target_amount, \
              exchange_rate, timestamp) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, user_id, source_currency, target_currency, source_amount, \
                       target_amount, exchange_rate, timestamp",
        )
        .bind(Uuid::now_v7())
        .bind(&transaction.user_id)
        .bind(transaction.source_currency.code())
        .bind(transaction.target_currency.code())
        .bind(transaction.source_amount)
        .bind(transaction.target_amount)
        .bind(transaction.exchange_rate)
        .bind(transaction.timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        decode_transaction(row)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<TransactionPage, StoreError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions \
             WHERE user_id = $1 \
               AND ($2::timestamptz IS NULL OR timestamp >= $2) \
               AND ($3::timestamptz IS NULL OR timestamp <= $3)",
        )
        .bind(user_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        // LIMIT/OFFSET accept NULL as "omitted", so optional pagination binds
        // directly.
        let rows = sqlx::query(
            "SELECT id, user_id, source_currency, target_currency, source_amount, \
                    target_amount, exchange_rate, timestamp \
             FROM transactions \
             WHERE user_id = $1 \
               AND ($2::timestamptz IS NULL OR timestamp >= $2) \
               AND ($3::timestamptz IS NULL OR timestamp <= $3) \
             ORDER BY timestamp DESC \
             LIMIT $4 OFFSET $5",
        )
        .bind(user_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let transactions = rows
            .into_iter()
            .map(decode_transaction)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransactionPage {
            transactions,
            total,
        })
    }
}

fn decode_transaction(row: PgRow) -> Result<Transaction, StoreError> {
    let source_currency: String = row.try_get("source_currency").map_err(db_err)?;
    let target_currency: String = row.try_get("target_currency").map_err(db_err)?;

    Ok(Transaction {
        id: row.try_get("id").map_err(db_err)?,
        user_id: row.try_get("user_id").map_err(db_err)?,
        source_currency: Currency::new(source_currency),
        target_currency: Currency::new(target_currency),
        source_amount: row.try_get("source_amount").map_err(db_err)?,
        target_amount: row.try_get("target_amount").map_err(db_err)?,
        exchange_rate: row.try_get("exchange_rate").map_err(db_err)?,
        timestamp: row.try_get("timestamp").map_err(db_err)?,
    })
}
