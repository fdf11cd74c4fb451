use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use cambio_fx::{FxError, StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Fx(#[from] FxError),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("User not found: {0}")]
    UserNotFound(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Fx(e) => match e {
                FxError::InvalidCurrency(_) | FxError::InvalidAmount(_) => {
                    StatusCode::BAD_REQUEST
                }
                FxError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                FxError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UserNotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
