//! Product accounting configuration handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;
use tracing::instrument;

use core_kernel::OperationMetadata;
use domain_accounting::{AccountingConfigurationView, CommandOutcome};

use crate::dto::accounting::ProductPath;
use crate::extract::ApiJson;
use crate::middleware::RequestId;
use crate::{error::ApiError, AppState};

fn metadata(request_id: Option<Extension<RequestId>>) -> Option<OperationMetadata> {
    request_id.map(|Extension(id)| id.metadata())
}

/// Submits a product's accounting configuration
#[instrument(skip(state, request_id, payload))]
pub async fn create_configuration(
    State(state): State<AppState>,
    Path(path): Path<ProductPath>,
    request_id: Option<Extension<RequestId>>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<(StatusCode, Json<CommandOutcome>), ApiError> {
    let product = path.product_ref()?;
    let outcome = state
        .coordinator
        .create(product, &payload, metadata(request_id))
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Applies a partial update and reports what changed
#[instrument(skip(state, request_id, payload))]
pub async fn update_configuration(
    State(state): State<AppState>,
    Path(path): Path<ProductPath>,
    request_id: Option<Extension<RequestId>>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<Json<CommandOutcome>, ApiError> {
    let product = path.product_ref()?;
    let outcome = state
        .coordinator
        .update(product, &payload, metadata(request_id))
        .await?;
    Ok(Json(outcome))
}

/// Returns the stored configuration
#[instrument(skip(state, request_id))]
pub async fn get_configuration(
    State(state): State<AppState>,
    Path(path): Path<ProductPath>,
    request_id: Option<Extension<RequestId>>,
) -> Result<Json<AccountingConfigurationView>, ApiError> {
    let product = path.product_ref()?;
    let view = state.coordinator.fetch(product, metadata(request_id)).await?;
    Ok(Json(view))
}

/// Removes the configuration and every mapping of the product
#[instrument(skip(state, request_id))]
pub async fn delete_configuration(
    State(state): State<AppState>,
    Path(path): Path<ProductPath>,
    request_id: Option<Extension<RequestId>>,
) -> Result<StatusCode, ApiError> {
    let product = path.product_ref()?;
    state.coordinator.delete(product, metadata(request_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
