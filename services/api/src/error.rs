//! Mapping of query errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use harvest_core::StatsError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error: a [`StatsError`] rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub StatsError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            StatsError::Validation(_) => StatusCode::BAD_REQUEST,
            StatsError::NotFound(_) => StatusCode::NOT_FOUND,
            StatsError::DataUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            StatsError::Validation(msg) => tracing::warn!("Rejected request: {}", msg),
            StatsError::NotFound(nf) => tracing::info!("{}", nf),
            StatsError::DataUnavailable => {
                tracing::error!("Data not loaded, cannot serve request")
            }
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
