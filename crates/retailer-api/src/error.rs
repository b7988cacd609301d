use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use retailer_core::error::ServiceError;

use crate::routes::MessageResponse;

/// A failed request. Internal failures are logged and answered with the
/// endpoint's generic `fallback` message.
#[derive(Debug)]
pub struct ApiError {
    error: ServiceError,
    fallback: &'static str,
}

impl ApiError {
    pub fn new(error: ServiceError, fallback: &'static str) -> Self {
        Self { error, fallback }
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Persistence(_) | ServiceError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.error {
            ServiceError::Validation(detail) => detail.clone(),
            ServiceError::NotFound => self.error.to_string(),
            ServiceError::Persistence(_) | ServiceError::Serialization(_) => {
                tracing::error!(error = %self.error, "request failed");
                self.fallback.to_string()
            }
        };

        (status, Json(MessageResponse { message })).into_response()
    }
}
