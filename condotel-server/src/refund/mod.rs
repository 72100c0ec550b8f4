//! Refund workflow
//!
//! One refund request per booking, created lazily on the first eligible
//! request (or opened automatically when a paid booking is cancelled).
//! A rejected request may be resubmitted exactly once. Settlement happens
//! either through the provider payout callback, a synchronous admin-initiated
//! payout, or a manual transfer confirmed in the console — all three run
//! through [`settle_locked`] so voucher unwinding can never drift.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Booking, BookingStatus, PaymentMethod, RefundBankDetails, RefundRequest, RefundStatus,
};
use shared::util::now_millis;

use crate::db::{self, PgTx};
use crate::error::ServiceResult;
use crate::payment::order_code;
use crate::payos;
use crate::state::AppState;

/// Days before check-in required to initiate a fresh refund request
pub const REFUND_LEAD_DAYS: i64 = 2;

/// Open the refund obligation for a paid booking being unwound, without bank
/// details (the customer supplies those afterwards). Idempotent on an
/// already-Pending request. Runs in the caller's transaction: the booking
/// status flip and the obligation land or roll back together.
pub async fn open_obligation(
    tx: &mut PgTx<'_>,
    booking: &Booking,
    now: i64,
) -> ServiceResult<i64> {
    if let Some(existing) = db::refund_requests::find_for_update_by_booking(tx, booking.id).await?
    {
        return match existing.status() {
            Some(RefundStatus::Pending) => Ok(existing.id),
            _ => Err(AppError::new(ErrorCode::RefundAlreadySettled).into()),
        };
    }

    let id = db::refund_requests::insert(
        tx,
        &db::refund_requests::NewRefundRequest {
            booking_id: booking.id,
            customer_id: booking.customer_id,
            refund_amount: booking.total_price,
            bank_account_number: None,
            bank_name: None,
            bank_account_holder: None,
            now,
        },
    )
    .await?;

    tracing::info!(
        booking_id = booking.id,
        refund_id = id,
        amount = %booking.total_price,
        "Refund obligation opened"
    );
    Ok(id)
}

/// Customer-facing entry point: request a refund for a booking, supplying
/// bank destination details.
///
/// Eligibility by booking status: Completed and Pending are never eligible;
/// Confirmed needs at least two days before check-in (and is cancelled as
/// part of the request); Cancelled only if the cancellation followed a
/// payment. A Rejected request consumes its single resubmission here, with
/// the lead-time check waived.
pub async fn request_refund(
    state: &AppState,
    customer_id: i64,
    booking_id: i64,
    bank: &RefundBankDetails,
) -> ServiceResult<RefundRequest> {
    let today = Utc::now().date_naive();
    let now = now_millis();

    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_for_update(&mut tx, booking_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    if booking.customer_id != customer_id {
        return Err(AppError::permission_denied("Booking belongs to another customer").into());
    }

    let existing = db::refund_requests::find_for_update_by_booking(&mut tx, booking_id).await?;

    let request_id = match existing {
        Some(req) => match req.status() {
            Some(RefundStatus::Pending) => {
                db::refund_requests::update_bank_details(
                    &mut tx,
                    req.id,
                    &bank.bank_account_number,
                    &bank.bank_name,
                    &bank.bank_account_holder,
                    now,
                )
                .await?;
                req.id
            }
            Some(RefundStatus::Rejected) => {
                if !req.can_resubmit() {
                    return Err(AppError::new(ErrorCode::ResubmissionLimitReached).into());
                }
                // Reacting to an admin decision, not a fresh cancellation:
                // the lead-time check is waived.
                db::refund_requests::resubmit(&mut tx, req.id, now).await?;
                db::refund_requests::update_bank_details(
                    &mut tx,
                    req.id,
                    &bank.bank_account_number,
                    &bank.bank_name,
                    &bank.bank_account_holder,
                    now,
                )
                .await?;
                req.id
            }
            _ => return Err(AppError::new(ErrorCode::RefundAlreadySettled).into()),
        },
        None => {
            check_fresh_eligibility(&state.status_aliases, &booking, today)?;

            let id = db::refund_requests::insert(
                &mut tx,
                &db::refund_requests::NewRefundRequest {
                    booking_id: booking.id,
                    customer_id: booking.customer_id,
                    refund_amount: booking.total_price,
                    bank_account_number: Some(&bank.bank_account_number),
                    bank_name: Some(&bank.bank_name),
                    bank_account_holder: Some(&bank.bank_account_holder),
                    now,
                },
            )
            .await?;

            // Requesting a refund on a confirmed booking is a cancellation
            if booking.status(&state.status_aliases) == Some(BookingStatus::Confirmed) {
                db::bookings::update_status(&mut tx, booking.id, BookingStatus::Cancelled, now)
                    .await?;
            }
            id
        }
    };

    tx.commit().await?;

    tracing::info!(booking_id, refund_id = request_id, customer_id, "Refund requested");

    db::refund_requests::find_by_id(&state.pool, request_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RefundNotFound).into())
}

/// Eligibility for a booking with no request on file yet
fn check_fresh_eligibility(
    aliases: &shared::models::StatusAliases,
    booking: &Booking,
    today: chrono::NaiveDate,
) -> Result<(), AppError> {
    match booking.status(aliases) {
        Some(BookingStatus::Confirmed) => {
            if (booking.start_date - today).num_days() < REFUND_LEAD_DAYS {
                return Err(AppError::with_message(
                    ErrorCode::RefundNotEligible,
                    format!("Refunds require at least {REFUND_LEAD_DAYS} days before check-in"),
                ));
            }
            Ok(())
        }
        Some(BookingStatus::Cancelled) => {
            // Only a cancellation that followed a payment carries money to
            // give back; pre-payment abandonment never does.
            if booking.total_price > rust_decimal::Decimal::ZERO {
                Ok(())
            } else {
                Err(AppError::with_message(
                    ErrorCode::RefundNotEligible,
                    "Nothing was charged for this booking",
                ))
            }
        }
        _ => Err(AppError::new(ErrorCode::RefundNotEligible)),
    }
}

/// Settle a locked Pending request and unwind the stay's side effects.
/// The booking itself stays Cancelled.
pub(crate) async fn settle_locked(
    tx: &mut PgTx<'_>,
    request: &RefundRequest,
    status: RefundStatus,
    method: PaymentMethod,
    now: i64,
) -> Result<(), sqlx::Error> {
    db::refund_requests::settle(tx, request.id, status, method, now).await?;

    if let Some(booking) = db::bookings::find_for_update(tx, request.booking_id).await? {
        if let Some(voucher_id) = booking.voucher_id {
            db::vouchers::rollback_usage(tx, voucher_id).await?;
        }
    }
    Ok(())
}

/// Admin-initiated settlement: attempt an automatic payout through the
/// provider. On provider failure the request stays Pending — the persisted
/// Pending record is the retry mechanism — and the error surfaces to the
/// admin for manual resolution.
pub async fn settle_via_provider(state: &AppState, refund_id: i64) -> ServiceResult<()> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let request = db::refund_requests::find_for_update(&mut tx, refund_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RefundNotFound))?;
    if request.status() != Some(RefundStatus::Pending) {
        return Err(AppError::new(ErrorCode::RefundNotPending).into());
    }

    let (account_number, bank_name, account_holder) = match (
        &request.bank_account_number,
        &request.bank_name,
        &request.bank_account_holder,
    ) {
        (Some(n), Some(b), Some(h)) => (n.as_str(), b.as_str(), h.as_str()),
        _ => {
            return Err(AppError::with_message(
                ErrorCode::RefundNotEligible,
                "Refund request has no bank details on file",
            )
            .into());
        }
    };

    let amount = request
        .refund_amount
        .round_dp(0)
        .to_i64()
        .ok_or_else(|| AppError::internal("Refund amount out of range"))?;

    // Provider call happens while holding the row lock so a racing second
    // settle attempt waits and then sees a non-pending request.
    payos::create_payout(
        &state.payos,
        order_code::booking_refund(request.booking_id),
        amount,
        bank_name,
        account_number,
        account_holder,
    )
    .await
    .map_err(|e| {
        tracing::warn!(refund_id, error = %e, "Provider payout failed; request stays pending");
        AppError::with_message(
            ErrorCode::NetworkError,
            "Payout provider rejected the request; refund remains pending",
        )
    })?;

    settle_locked(&mut tx, &request, RefundStatus::Refunded, PaymentMethod::Auto, now).await?;
    tx.commit().await?;

    tracing::info!(refund_id, booking_id = request.booking_id, "Refund settled via provider");
    db::audit::try_log(
        &state.pool,
        "admin",
        "refund.settle_auto",
        serde_json::json!({ "refund_id": refund_id, "booking_id": request.booking_id }),
    )
    .await;
    notify_settled(state, &request).await;
    Ok(())
}

/// Admin confirms a manual bank transfer was made outside the platform
pub async fn confirm_manual(state: &AppState, refund_id: i64) -> ServiceResult<()> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let request = db::refund_requests::find_for_update(&mut tx, refund_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RefundNotFound))?;
    if request.status() != Some(RefundStatus::Pending) {
        return Err(AppError::new(ErrorCode::RefundNotPending).into());
    }

    settle_locked(
        &mut tx,
        &request,
        RefundStatus::Completed,
        PaymentMethod::Manual,
        now,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(refund_id, booking_id = request.booking_id, "Manual refund confirmed");
    db::audit::try_log(
        &state.pool,
        "admin",
        "refund.settle_manual",
        serde_json::json!({ "refund_id": refund_id, "booking_id": request.booking_id }),
    )
    .await;
    notify_settled(state, &request).await;
    Ok(())
}

/// Admin rejects a Pending request; a reason is mandatory. The customer is
/// told whether one resubmission remains.
pub async fn reject(state: &AppState, refund_id: i64, reason: &str) -> ServiceResult<()> {
    if reason.trim().is_empty() {
        return Err(AppError::new(ErrorCode::RejectionReasonRequired).into());
    }

    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let request = db::refund_requests::find_for_update(&mut tx, refund_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RefundNotFound))?;
    if request.status() != Some(RefundStatus::Pending) {
        return Err(AppError::new(ErrorCode::RefundNotPending).into());
    }

    db::refund_requests::reject(&mut tx, request.id, reason, now).await?;
    tx.commit().await?;

    tracing::info!(refund_id, booking_id = request.booking_id, "Refund rejected");
    db::audit::try_log(
        &state.pool,
        "admin",
        "refund.reject",
        serde_json::json!({ "refund_id": refund_id, "reason": reason }),
    )
    .await;

    if let Ok(Some(contact)) = db::users::find_contact(&state.pool, request.customer_id).await {
        if let Err(e) = crate::email::send_refund_rejected(
            &state.ses,
            &state.ses_from_email,
            &contact.email,
            request.booking_id,
            reason,
            request.can_resubmit(),
        )
        .await
        {
            tracing::warn!(refund_id, error = %e, "Rejection email failed");
        }
    }
    Ok(())
}

async fn notify_settled(state: &AppState, request: &RefundRequest) {
    if let Ok(Some(contact)) = db::users::find_contact(&state.pool, request.customer_id).await {
        if let Err(e) = crate::email::send_refund_settled(
            &state.ses,
            &state.ses_from_email,
            &contact.email,
            request.booking_id,
            request.refund_amount,
        )
        .await
        {
            tracing::warn!(refund_id = request.id, error = %e, "Refund email failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::models::StatusAliases;

    fn booking(status: &str, start: NaiveDate, price: i64) -> Booking {
        Booking {
            id: 1,
            condotel_id: 1,
            customer_id: 2,
            start_date: start,
            end_date: start + chrono::Days::new(2),
            total_price: Decimal::new(price, 0),
            status: status.to_string(),
            promotion_id: None,
            voucher_id: None,
            guest_name: None,
            guest_phone: None,
            guest_id_number: None,
            check_in_token: None,
            is_paid_to_host: false,
            paid_to_host_at: None,
            payout_rejected_at: None,
            payout_rejected_reason: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
    }

    #[test]
    fn test_completed_never_eligible() {
        let aliases = StatusAliases::default_set();
        let err = check_fresh_eligibility(&aliases, &booking("Completed", d(20), 100), d(10))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RefundNotEligible);
        // Legacy localized value behaves the same
        let err = check_fresh_eligibility(&aliases, &booking("Hoàn thành", d(20), 100), d(10))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RefundNotEligible);
    }

    #[test]
    fn test_pending_never_eligible() {
        let aliases = StatusAliases::default_set();
        assert!(check_fresh_eligibility(&aliases, &booking("Pending", d(20), 100), d(10)).is_err());
    }

    #[test]
    fn test_confirmed_needs_lead_time() {
        let aliases = StatusAliases::default_set();
        // 3 days out: eligible
        assert!(
            check_fresh_eligibility(&aliases, &booking("Confirmed", d(13), 100), d(10)).is_ok()
        );
        // 1 day out: too late
        assert!(
            check_fresh_eligibility(&aliases, &booking("Confirmed", d(11), 100), d(10)).is_err()
        );
    }

    #[test]
    fn test_cancelled_requires_captured_payment() {
        let aliases = StatusAliases::default_set();
        assert!(
            check_fresh_eligibility(&aliases, &booking("Cancelled", d(20), 100), d(10)).is_ok()
        );
        // Pre-payment abandonment carries nothing to give back
        assert!(
            check_fresh_eligibility(&aliases, &booking("Cancelled", d(20), 0), d(10)).is_err()
        );
    }
}
