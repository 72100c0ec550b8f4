//! Customer booking endpoints

use axum::Json;
use axum::extract::{Extension, Path, State};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Booking, RefundBankDetails, RefundRequest};

use crate::auth::Identity;
use crate::booking::{self, CreateBookingRequest, UpdateBookingRequest};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::{db, payment, refund};

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<Booking>>, ServiceError> {
    let booking = booking::create_booking(&state, identity.user_id, &req).await?;
    Ok(Json(ApiResponse::success(booking)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<Booking>>, ServiceError> {
    let booking = db::bookings::find_by_id(&state.pool, booking_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    if booking.customer_id != identity.user_id && !identity.is_admin() {
        return Err(AppError::permission_denied("Booking belongs to another customer").into());
    }
    Ok(Json(ApiResponse::success(booking)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<i64>,
    Json(req): Json<UpdateBookingRequest>,
) -> Result<Json<ApiResponse<Booking>>, ServiceError> {
    let booking = booking::update_booking(&state, identity.user_id, booking_id, &req).await?;
    Ok(Json(ApiResponse::success(booking)))
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    booking::cancel_booking(&state, identity.user_id, booking_id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// Abandon checkout for an unpaid booking
pub async fn cancel_payment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    booking::cancel_payment(&state, identity.user_id, booking_id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// Create a hosted checkout link for a pending booking
pub async fn checkout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    let url = payment::create_checkout(&state, identity.user_id, booking_id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "checkoutUrl": url }),
    )))
}

/// Request a refund, supplying bank destination details
pub async fn request_refund(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<i64>,
    Json(bank): Json<RefundBankDetails>,
) -> Result<Json<ApiResponse<RefundRequest>>, ServiceError> {
    let request = refund::request_refund(&state, identity.user_id, booking_id, &bank).await?;
    Ok(Json(ApiResponse::success(request)))
}

/// View the refund request attached to a booking
pub async fn get_refund(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<RefundRequest>>, ServiceError> {
    let request = db::refund_requests::find_by_booking(&state.pool, booking_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RefundNotFound))?;
    if request.customer_id != identity.user_id && !identity.is_admin() {
        return Err(AppError::permission_denied("Refund belongs to another customer").into());
    }
    Ok(Json(ApiResponse::success(request)))
}
