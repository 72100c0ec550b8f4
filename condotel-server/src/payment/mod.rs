//! Payment reconciliation engine
//!
//! Two transports report the same provider transaction: an authoritative
//! webhook POST and a best-effort browser redirect to the return URL. Both
//! funnel into [`reconcile`], so the two can never diverge in outcome. Every
//! path locks the single target row (booking, refund request, or purchase)
//! before evaluating idempotency, so a duplicate webhook and a racing
//! redirect serialize against each other.

pub mod order_code;

use rust_decimal::prelude::ToPrimitive;
use shared::error::{AppError, ErrorCode};
use shared::models::{Booking, BookingStatus, PaymentMethod, RefundStatus};
use shared::util::now_millis;

use crate::db;
use crate::error::ServiceResult;
use crate::payos::{self, ReturnParams, WebhookBody};
use crate::state::AppState;
use crate::util::generate_check_in_token;
use order_code::OrderKind;

/// What a reconciled callback did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Booking moved Pending -> Confirmed
    BookingConfirmed,
    /// A conflicting stay was confirmed first; this booking was cancelled
    /// and a refund obligation opened
    BookingConflictCancelled,
    /// Refund request settled as paid
    RefundSettled,
    PackageActivated,
    PackageRefunded,
    /// Target already terminal — duplicate delivery, successful no-op
    AlreadySettled,
    /// Provider reported failure; nothing was changed
    PaymentFailed,
}

/// Amount sent to the provider, in whole VND. Zero is representable (a
/// voucher can clamp the total to nothing); negative amounts are not.
fn amount_i64(amount: rust_decimal::Decimal) -> Result<i64, AppError> {
    amount
        .round_dp(0)
        .to_i64()
        .filter(|v| *v >= 0)
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::PaymentSetupFailed, "Invalid payment amount")
        })
}

// ==================== Checkout ====================

/// Create a hosted checkout link for a pending booking.
///
/// Each call mints a fresh order code (random disambiguator), so a retried
/// checkout is distinguishable from the failed one at the provider.
pub async fn create_checkout(
    state: &AppState,
    customer_id: i64,
    booking_id: i64,
) -> ServiceResult<String> {
    let booking = db::bookings::find_by_id(&state.pool, booking_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    if booking.customer_id != customer_id {
        return Err(AppError::permission_denied("Booking belongs to another customer").into());
    }
    if booking.status(&state.status_aliases) != Some(BookingStatus::Pending) {
        return Err(AppError::conflict("Only a pending booking can be paid").into());
    }

    let code = order_code::booking_payment(booking.id, order_code::random_disambiguator());
    let amount = amount_i64(booking.total_price)?;

    // Fully discounted: there is nothing for the provider to collect, so
    // confirm immediately and send the customer straight to the result page.
    if amount == 0 {
        confirm_booking(state, booking.id).await?;
        return Ok(format!(
            "{}?bookingId={}&status=success",
            state.payment_result_url, booking.id
        ));
    }

    let return_url = format!("{}/api/payments/return", state.public_base_url);

    payos::create_payment_link(
        &state.payos,
        code,
        amount,
        &format!("Booking {}", booking.id),
        &return_url,
        &return_url,
    )
    .await
    .map_err(|e| {
        tracing::error!(booking_id, error = %e, "Payment link creation failed");
        AppError::new(ErrorCode::PaymentSetupFailed).into()
    })
}

/// Create a hosted checkout link for a host package purchase. Persists a
/// Pending purchase row first so the callback has a reconciliation target.
pub async fn create_package_checkout(
    state: &AppState,
    host_id: i64,
    package_id: i64,
) -> ServiceResult<String> {
    let package = db::packages::find_package(&state.pool, package_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::not_found("Package"))?;

    db::packages::insert_pending(&state.pool, host_id, package.id, now_millis()).await?;

    let code =
        order_code::package_purchase(host_id, package.id, order_code::random_disambiguator());
    let amount = amount_i64(package.price)?;

    if amount == 0 {
        activate_package(state, host_id, package.id).await?;
        return Ok(format!(
            "{}?packageId={}&status=success",
            state.payment_result_url, package.id
        ));
    }

    let return_url = format!("{}/api/payments/return", state.public_base_url);

    payos::create_payment_link(
        &state.payos,
        code,
        amount,
        &format!("Package {}", package.id),
        &return_url,
        &return_url,
    )
    .await
    .map_err(|e| {
        tracing::error!(host_id, package_id, error = %e, "Payment link creation failed");
        AppError::new(ErrorCode::PaymentSetupFailed).into()
    })
}

// ==================== Transports ====================

/// Authoritative transport: verify the signature, journal the delivery, then
/// reconcile. A replayed body short-circuits on the journal.
pub async fn reconcile_webhook(state: &AppState, body: &WebhookBody) -> ServiceResult<Outcome> {
    payos::verify_webhook_signature(body, &state.payos.checksum_key).map_err(|e| {
        tracing::warn!(order_code = body.data.order_code, error = e, "Webhook rejected");
        AppError::new(ErrorCode::InvalidSignature)
    })?;

    // The signature is unique per (payload, key) and doubles as the event id
    let fresh = db::webhook_events::record(
        &state.pool,
        &body.signature,
        body.data.order_code,
        now_millis(),
    )
    .await?;
    if !fresh {
        tracing::info!(
            order_code = body.data.order_code,
            "Duplicate webhook delivery ignored"
        );
        return Ok(Outcome::AlreadySettled);
    }

    let result = reconcile(state, body.data.order_code, payos::is_success(body)).await;
    if !retain_journal_entry(&result) {
        // Release the entry so the provider's retry is re-processed instead
        // of short-circuiting as a duplicate while the target row is
        // still unsettled.
        if let Err(e) = db::webhook_events::release(&state.pool, &body.signature).await {
            tracing::error!(
                order_code = body.data.order_code,
                error = %e,
                "Journal release failed; the provider retry will be ignored"
            );
        }
    }
    result
}

/// Whether the journal entry for a delivery should survive the attempt.
/// Ok outcomes keep it (duplicate no-ops included); any error releases it so
/// the provider's at-least-once retry gets a fresh attempt.
fn retain_journal_entry(result: &ServiceResult<Outcome>) -> bool {
    result.is_ok()
}

/// Best-effort transport: no signature to verify; row locks and state checks
/// inside [`reconcile`] make it safe to race the webhook.
pub async fn reconcile_return(state: &AppState, params: &ReturnParams) -> ServiceResult<Outcome> {
    reconcile(state, params.order_code, payos::is_return_success(params)).await
}

// ==================== Decision function ====================

/// What a successful payment callback does to the locked booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmDecision {
    /// Pending with the stay still free: confirm
    Confirm,
    /// Pending but a conflicting stay was confirmed first: cancel and open
    /// a refund obligation (the money was captured)
    ConflictCancel,
    /// Anything else is a duplicate or late delivery: no-op
    DuplicateDelivery,
}

fn confirmation_decision(
    status: Option<BookingStatus>,
    has_conflict: bool,
) -> ConfirmDecision {
    match status {
        Some(BookingStatus::Pending) if has_conflict => ConfirmDecision::ConflictCancel,
        Some(BookingStatus::Pending) => ConfirmDecision::Confirm,
        _ => ConfirmDecision::DuplicateDelivery,
    }
}

/// The single decision function both transports funnel through.
pub async fn reconcile(state: &AppState, code: i64, success: bool) -> ServiceResult<Outcome> {
    let kind = order_code::decode(code);

    if kind == OrderKind::Unrecognized {
        tracing::warn!(order_code = code, "Unrecognized order code");
        return Err(AppError::new(ErrorCode::UnrecognizedOrderCode)
            .with_detail("order_code", code)
            .into());
    }

    // An unsuccessful report is a no-op: the booking stays Pending and
    // abandonment goes through the explicit cancel-payment path.
    if !success {
        tracing::info!(order_code = code, ?kind, "Unsuccessful payment report");
        return Ok(Outcome::PaymentFailed);
    }

    match kind {
        OrderKind::BookingPayment { booking_id } => confirm_booking(state, booking_id).await,
        OrderKind::BookingRefund { booking_id } => settle_refund(state, booking_id).await,
        OrderKind::PackagePurchase {
            host_id,
            package_id,
        } => activate_package(state, host_id, package_id).await,
        OrderKind::PackageRefund { host_id } => refund_package(state, host_id).await,
        OrderKind::Unrecognized => unreachable!("handled above"),
    }
}

/// Booking confirmation path.
///
/// Re-checks for a conflicting confirmed stay (the unit could have been
/// confirmed through another pending booking created after this one passed
/// its own creation-time check). Confirmation side effects — token mint,
/// voucher usage, notifications — run exactly once, gated by the Pending
/// check under the row lock.
async fn confirm_booking(state: &AppState, booking_id: i64) -> ServiceResult<Outcome> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_for_update(&mut tx, booking_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;

    let status = booking.status(&state.status_aliases);
    let has_conflict = if status == Some(BookingStatus::Pending) {
        !db::bookings::confirmed_conflicts(
            &mut tx,
            &state.status_aliases,
            booking.condotel_id,
            booking.start_date,
            booking.end_date,
            booking.id,
        )
        .await?
        .is_empty()
    } else {
        false
    };

    match confirmation_decision(status, has_conflict) {
        ConfirmDecision::DuplicateDelivery => {
            if status == Some(BookingStatus::Cancelled) {
                // Paid after abandoning; needs operator attention, not a transition
                tracing::warn!(booking_id, "Payment received for a cancelled booking");
            }
            Ok(Outcome::AlreadySettled)
        }
        ConfirmDecision::ConflictCancel => {
            // Lost the race: money was captured, so cancel and open the
            // refund obligation in the same transaction.
            crate::refund::open_obligation(&mut tx, &booking, now).await?;
            db::bookings::update_status(&mut tx, booking.id, BookingStatus::Cancelled, now)
                .await?;
            tx.commit().await?;

            tracing::warn!(
                booking_id,
                condotel_id = booking.condotel_id,
                "Conflict at confirmation; booking cancelled and refund opened"
            );
            db::audit::try_log(
                &state.pool,
                "provider",
                "payment.conflict_cancel",
                serde_json::json!({ "booking_id": booking_id }),
            )
            .await;
            notify_conflict_cancelled(state, &booking).await;
            Ok(Outcome::BookingConflictCancelled)
        }
        ConfirmDecision::Confirm => {
            let token = generate_check_in_token();
            db::bookings::confirm(&mut tx, booking.id, &token, now).await?;

            if let Some(voucher) = crate::booking::booked_voucher(&mut tx, &booking).await? {
                db::vouchers::apply_usage(&mut tx, voucher.id).await?;
            }

            tx.commit().await?;

            tracing::info!(booking_id, "Booking confirmed");
            db::audit::try_log(
                &state.pool,
                "provider",
                "payment.confirm",
                serde_json::json!({ "booking_id": booking_id }),
            )
            .await;
            notify_confirmed(state, &booking, &token).await;
            Ok(Outcome::BookingConfirmed)
        }
    }
}

/// Refund settlement path: provider payout succeeded for this booking's
/// refund. Only a Pending request settles; anything else is a no-op. The
/// booking itself stays Cancelled.
async fn settle_refund(state: &AppState, booking_id: i64) -> ServiceResult<Outcome> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let request = db::refund_requests::find_for_update_by_booking(&mut tx, booking_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RefundNotFound))?;

    match request.status() {
        Some(RefundStatus::Pending) => {}
        other => {
            tracing::info!(booking_id, status = ?other, "Refund callback for a non-pending request");
            return Ok(Outcome::AlreadySettled);
        }
    }

    crate::refund::settle_locked(
        &mut tx,
        &request,
        RefundStatus::Refunded,
        PaymentMethod::Auto,
        now,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(booking_id, refund_id = request.id, "Refund settled via provider");
    notify_refund_settled(state, request.customer_id, booking_id, request.refund_amount).await;
    Ok(Outcome::RefundSettled)
}

async fn activate_package(
    state: &AppState,
    host_id: i64,
    package_id: i64,
) -> ServiceResult<Outcome> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let Some(purchase) =
        db::packages::find_pending_for_update(&mut tx, host_id, package_id).await?
    else {
        // No pending purchase left: a duplicate delivery already activated it
        tracing::info!(host_id, package_id, "No pending purchase to activate");
        return Ok(Outcome::AlreadySettled);
    };

    db::packages::activate(&mut tx, purchase.id, now).await?;
    tx.commit().await?;

    tracing::info!(host_id, package_id, purchase_id = purchase.id, "Package activated");
    Ok(Outcome::PackageActivated)
}

async fn refund_package(state: &AppState, host_id: i64) -> ServiceResult<Outcome> {
    let mut tx = state.pool.begin().await?;

    let Some(purchase) = db::packages::find_active_for_update(&mut tx, host_id).await? else {
        tracing::info!(host_id, "No active purchase to refund");
        return Ok(Outcome::AlreadySettled);
    };

    db::packages::mark_refunded(&mut tx, purchase.id).await?;
    tx.commit().await?;

    tracing::info!(host_id, purchase_id = purchase.id, "Package refunded");
    Ok(Outcome::PackageRefunded)
}

// ==================== Notification side effects ====================
//
// All post-commit and best-effort: a failed email never unwinds a settled
// payment decision.

async fn notify_confirmed(state: &AppState, booking: &Booking, token: &str) {
    let customer = db::users::find_contact(&state.pool, booking.customer_id).await;
    if let Ok(Some(contact)) = customer {
        if let Err(e) = crate::email::send_booking_confirmed(
            &state.ses,
            &state.ses_from_email,
            &contact.email,
            booking.id,
            token,
        )
        .await
        {
            tracing::warn!(booking_id = booking.id, error = %e, "Confirmation email failed");
        }
    }

    let condotel = db::condotels::find_by_id(&state.pool, booking.condotel_id).await;
    if let Ok(Some(condotel)) = condotel {
        if let Ok(Some(host)) = db::users::find_contact(&state.pool, condotel.host_id).await {
            if let Err(e) = crate::email::send_host_new_booking(
                &state.ses,
                &state.ses_from_email,
                &host.email,
                booking.id,
                &condotel.name,
            )
            .await
            {
                tracing::warn!(booking_id = booking.id, error = %e, "Host email failed");
            }
        }
    }
}

async fn notify_conflict_cancelled(state: &AppState, booking: &Booking) {
    if let Ok(Some(contact)) = db::users::find_contact(&state.pool, booking.customer_id).await {
        if let Err(e) = crate::email::send_booking_conflict_cancelled(
            &state.ses,
            &state.ses_from_email,
            &contact.email,
            booking.id,
        )
        .await
        {
            tracing::warn!(booking_id = booking.id, error = %e, "Conflict email failed");
        }
    }
}

async fn notify_refund_settled(
    state: &AppState,
    customer_id: i64,
    booking_id: i64,
    amount: rust_decimal::Decimal,
) {
    if let Ok(Some(contact)) = db::users::find_contact(&state.pool, customer_id).await {
        if let Err(e) = crate::email::send_refund_settled(
            &state.ses,
            &state.ses_from_email,
            &contact.email,
            booking_id,
            amount,
        )
        .await
        {
            tracing::warn!(booking_id, error = %e, "Refund email failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_amount_conversion() {
        assert_eq!(amount_i64(Decimal::new(3_000_000, 0)).unwrap(), 3_000_000);
        // Fractional VND rounds to whole units
        assert_eq!(amount_i64(Decimal::new(15, 1)).unwrap(), 2);
        // A voucher can clamp the total to exactly zero; that is a valid
        // amount (confirmed without a provider link), not a setup failure
        assert_eq!(amount_i64(Decimal::ZERO).unwrap(), 0);
        assert!(amount_i64(Decimal::new(-100, 0)).is_err());
    }

    #[test]
    fn test_confirmation_decisions() {
        use shared::models::BookingStatus::*;

        assert_eq!(
            confirmation_decision(Some(Pending), false),
            ConfirmDecision::Confirm
        );
        // A conflicting stay was confirmed first
        assert_eq!(
            confirmation_decision(Some(Pending), true),
            ConfirmDecision::ConflictCancel
        );
        // Redelivery after confirmation or settlement is a no-op
        assert_eq!(
            confirmation_decision(Some(Confirmed), false),
            ConfirmDecision::DuplicateDelivery
        );
        assert_eq!(
            confirmation_decision(Some(Completed), false),
            ConfirmDecision::DuplicateDelivery
        );
        assert_eq!(
            confirmation_decision(Some(Cancelled), false),
            ConfirmDecision::DuplicateDelivery
        );
        // Unparseable status never transitions
        assert_eq!(
            confirmation_decision(None, false),
            ConfirmDecision::DuplicateDelivery
        );
    }

    #[test]
    fn test_failed_reconcile_releases_journal_entry() {
        // A transient failure must not leave the journal entry behind, or
        // the provider's retry would short-circuit as a duplicate while the
        // booking is still pending.
        assert!(!retain_journal_entry(&Err(
            AppError::new(ErrorCode::InternalError).into()
        )));
        assert!(retain_journal_entry(&Ok(Outcome::BookingConfirmed)));
        // A genuine duplicate no-op keeps its entry
        assert!(retain_journal_entry(&Ok(Outcome::AlreadySettled)));
    }
}
