//! Admin payout endpoints

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use shared::error::ApiResponse;

use crate::error::ServiceError;
use crate::payout;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReasonBody {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// Run a full payout sweep now
pub async fn run_batch(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    let report = payout::run_batch(&state).await?;
    Ok(Json(ApiResponse::success(serde_json::json!({
        "paid": report.paid,
        "skipped": report.skipped,
    }))))
}

/// Pay out a single booking on demand
pub async fn run_single(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    payout::run_single(&state, booking_id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// Permanently block a booking from auto-payout
pub async fn reject(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
    Json(body): Json<ReasonBody>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    payout::reject_payout(&state, booking_id, &body.reason).await?;
    Ok(Json(ApiResponse::ok()))
}

/// Notify the host that a manual transfer bounced; no state change
pub async fn account_error(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
    Json(body): Json<MessageBody>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    payout::report_account_error(&state, booking_id, &body.message).await?;
    Ok(Json(ApiResponse::ok()))
}
