use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dashboard_market_data::{MarketDataError, StockDataResponse};
use serde::Serialize;
use thiserror::Error;

/// Errors of the KIS proxy route; the body is `{"error": message}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid parameters")]
    InvalidParameters,
    #[error("KIS credentials are not configured")]
    NotConfigured,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal server error")]
    Upstream(#[from] MarketDataError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidParameters => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream(e) => {
                tracing::error!("Upstream request failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of the stock data route, answered in the endpoint's own payload
/// shape.
#[derive(Error, Debug)]
#[error("Internal server error")]
pub struct StockDataError(#[from] pub MarketDataError);

impl IntoResponse for StockDataError {
    fn into_response(self) -> Response {
        tracing::error!("Stock data request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StockDataResponse::failure(self.to_string())),
        )
            .into_response()
    }
}
