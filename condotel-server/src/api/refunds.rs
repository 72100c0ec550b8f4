//! Admin refund endpoints

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use shared::error::ApiResponse;

use crate::error::ServiceError;
use crate::refund;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RejectBody {
    pub reason: String,
}

/// Attempt an automatic payout through the provider. On provider failure the
/// request stays Pending and the error surfaces for manual resolution.
pub async fn settle(
    State(state): State<AppState>,
    Path(refund_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    refund::settle_via_provider(&state, refund_id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// Confirm a manual bank transfer made outside the platform
pub async fn confirm_manual(
    State(state): State<AppState>,
    Path(refund_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    refund::confirm_manual(&state, refund_id).await?;
    Ok(Json(ApiResponse::ok()))
}

pub async fn reject(
    State(state): State<AppState>,
    Path(refund_id): Path<i64>,
    Json(body): Json<RejectBody>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    refund::reject(&state, refund_id, &body.reason).await?;
    Ok(Json(ApiResponse::ok()))
}
