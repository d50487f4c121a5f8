//! API error types and conversions

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// The metrics registry could not be encoded
    Metrics(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Metrics(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        error!("request failed: {message}");
        (status, message).into_response()
    }
}

impl From<prometheus::Error> for ApiError {
    fn from(err: prometheus::Error) -> Self {
        ApiError::Metrics(err.to_string())
    }
}
