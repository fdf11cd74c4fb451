//! HTTP handlers and router.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use cambio_common::{Currency, Money, Timestamp};
use cambio_fx::{ConversionOutcome, Transaction, TransactionFilter};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/v1/convert", post(convert))
        .route("/api/v1/rates", get(rate))
        .route("/api/v1/transactions/{user_id}", get(transactions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct MessageBody {
    message: &'static str,
}

async fn root() -> Json<MessageBody> {
    Json(MessageBody {
        message: "Welcome to the Cambio currency conversion API!",
    })
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "healthy" })
}

#[derive(Deserialize)]
struct ConvertRequest {
    user_id: String,
    from_currency: String,
    to_currency: String,
    amount: Decimal,
}

async fn convert(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConvertRequest>,
) -> ApiResult<Json<ConversionOutcome>> {
    let outcome = state
        .conversions
        .convert(
            &body.user_id,
            &Currency::new(body.from_currency),
            &Currency::new(body.to_currency),
            body.amount,
        )
        .await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct RateQuery {
    from: String,
    to: String,
}

#[derive(Serialize)]
struct RateBody {
    from_currency: Currency,
    to_currency: Currency,
    rate: Decimal,
}

async fn rate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RateQuery>,
) -> ApiResult<Json<RateBody>> {
    let from = Currency::new(query.from);
    let to = Currency::new(query.to);
    let rate = state.rates.exchange_rate(&from, &to).await?;
    Ok(Json(RateBody {
        from_currency: from,
        to_currency: to,
        rate,
    }))
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
    offset: Option<i64>,
    from_date: Option<Timestamp>,
    to_date: Option<Timestamp>,
}

#[derive(Serialize)]
struct HistoryEntry {
    transaction_id: Uuid,
    from: Money,
    to: Money,
    rate: Decimal,
    timestamp: Timestamp,
}

impl From<Transaction> for HistoryEntry {
    fn from(transaction: Transaction) -> Self {
        Self {
            transaction_id: transaction.id,
            from: Money::new(transaction.source_currency, transaction.source_amount),
            to: Money::new(transaction.target_currency, transaction.target_amount),
            rate: transaction.exchange_rate,
            timestamp: transaction.timestamp,
        }
    }
}

#[derive(Serialize)]
struct HistoryBody {
    user_id: String,
    transactions: Vec<HistoryEntry>,
    count: usize,
    total: i64,
}

async fn transactions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryBody>> {
    let filter = TransactionFilter {
        limit: query.limit,
        offset: query.offset,
        from: query.from_date,
        to: query.to_date,
    };
    let page = state.transactions.list_for_user(&user_id, &filter).await?;

    // A user with no transactions at all is a 404; an empty filtered page
    // for a known user is not.
    if page.total == 0 {
        let probe = TransactionFilter {
            limit: Some(1),
            ..Default::default()
        };
        if state
            .transactions
            .list_for_user(&user_id, &probe)
            .await?
            .total
            == 0
        {
            return Err(ApiError::UserNotFound(user_id));
        }
    }

    let entries: Vec<HistoryEntry> = page
        .transactions
        .into_iter()
        .map(HistoryEntry::from)
        .collect();

    Ok(Json(HistoryBody {
        user_id,
        count: entries.len(),
        transactions: entries,
        total: page.total,
    }))
}
