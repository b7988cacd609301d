use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use retailer_core::error::ServiceError;
use retailer_core::export::{export_workbook, ExportQuery, CONTENT_TYPE, FILE_NAME};
use retailer_core::ingestion::{ingest, RetailerPayload};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

const SAVED: &str = "Retailer saved successfully";
const SAVE_FAILED: &str = "Server error";
const EXPORT_FAILED: &str = "Error generating Excel";

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn create_retailer(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<RetailerPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        ApiError::new(ServiceError::Validation(rejection.body_text()), SAVE_FAILED)
    })?;

    ingest(app_state.repository.as_ref(), payload, &app_state.settings)
        .await
        .map_err(|err| ApiError::new(err, SAVE_FAILED))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: SAVED.to_string(),
        }),
    ))
}

pub async fn export_retailers(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::new(ServiceError::Validation(rejection.body_text()), EXPORT_FAILED)
    })?;

    let bytes = export_workbook(app_state.repository.as_ref(), &query, &app_state.settings)
        .await
        .map_err(|err| ApiError::new(err, EXPORT_FAILED))?;

    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={FILE_NAME}"),
            ),
        ],
        bytes,
    )
        .into_response())
}

pub async fn health(State(app_state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    match app_state.repository.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
            }),
        ),
        Err(err) => {
            tracing::warn!("record store health check failed: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                }),
            )
        }
    }
}
