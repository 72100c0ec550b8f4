//! Host payout scheduler
//!
//! Completed stays are held back for a configurable number of days (refund
//! disputes settle inside the window), then released to the host's default
//! active bank account. The batch sweep and the targeted single-booking path
//! share one eligibility query so the two can never drift; each booking is
//! then re-checked under its own row lock before being stamped paid.

use chrono::{Days, NaiveDate, Utc};
use shared::error::{AppError, ErrorCode};
use shared::models::{BankAccount, Booking};
use shared::util::now_millis;

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

/// Result of one payout sweep
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepReport {
    pub paid: usize,
    pub skipped: usize,
}

/// Process every eligible booking. Failures on one booking are logged and
/// skipped; they stay eligible for the next sweep.
pub async fn run_batch(state: &AppState) -> ServiceResult<SweepReport> {
    let cutoff = holdback_cutoff(Utc::now().date_naive(), state.payout_holdback_days);
    let candidates =
        db::bookings::payout_candidates(&state.pool, &state.status_aliases, cutoff, None).await?;

    let mut report = SweepReport::default();
    for booking in candidates {
        match pay_one(state, &booking).await {
            Ok(()) => report.paid += 1,
            Err(e) => {
                report.skipped += 1;
                tracing::warn!(
                    booking_id = booking.id,
                    code = ?e.code(),
                    "Payout skipped"
                );
            }
        }
    }

    tracing::info!(paid = report.paid, skipped = report.skipped, "Payout sweep finished");
    Ok(report)
}

/// Pay out a single booking on demand (admin action). Uses the same
/// eligibility predicate as the sweep.
pub async fn run_single(state: &AppState, booking_id: i64) -> ServiceResult<()> {
    let cutoff = holdback_cutoff(Utc::now().date_naive(), state.payout_holdback_days);
    let candidates = db::bookings::payout_candidates(
        &state.pool,
        &state.status_aliases,
        cutoff,
        Some(booking_id),
    )
    .await?;

    let booking = candidates
        .into_iter()
        .next()
        .ok_or_else(|| AppError::new(ErrorCode::PayoutNotEligible))?;
    pay_one(state, &booking).await
}

/// Latest check-out date eligible for release. A stay ending on or before
/// the cutoff has cleared the holdback window.
fn holdback_cutoff(today: NaiveDate, holdback_days: i64) -> NaiveDate {
    today
        .checked_sub_days(Days::new(holdback_days as u64))
        .unwrap_or(NaiveDate::MIN)
}

/// Stamp one booking paid, re-checking its flags under the row lock (the
/// candidate list was read without one).
async fn pay_one(state: &AppState, candidate: &Booking) -> ServiceResult<()> {
    let now = now_millis();

    let condotel = db::condotels::find_by_id(&state.pool, candidate.condotel_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CondotelNotFound))?;

    let account = db::bank_accounts::default_active_account(&state.pool, condotel.host_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NoActiveBankAccount))?;

    let mut tx = state.pool.begin().await?;
    let booking = db::bookings::find_for_update(&mut tx, candidate.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;

    if booking.is_paid_to_host {
        return Err(AppError::new(ErrorCode::PayoutAlreadyPaid).into());
    }
    if booking.payout_rejected_at.is_some() {
        return Err(AppError::new(ErrorCode::PayoutRejected).into());
    }

    db::bookings::mark_paid_to_host(&mut tx, booking.id, now).await?;
    tx.commit().await?;

    tracing::info!(
        booking_id = booking.id,
        host_id = condotel.host_id,
        amount = %booking.total_price,
        "Host payout released"
    );
    db::audit::try_log(
        &state.pool,
        "scheduler",
        "payout.paid",
        serde_json::json!({ "booking_id": booking.id, "host_id": condotel.host_id }),
    )
    .await;
    notify_paid(state, condotel.host_id, &booking, &account).await;
    Ok(())
}

/// Admin override: block this booking from auto-processing permanently.
/// Only valid on a completed, unpaid booking; requires manual resolution.
pub async fn reject_payout(state: &AppState, booking_id: i64, reason: &str) -> ServiceResult<()> {
    if reason.trim().is_empty() {
        return Err(AppError::new(ErrorCode::RejectionReasonRequired).into());
    }

    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_for_update(&mut tx, booking_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;

    if booking.status(&state.status_aliases) != Some(shared::models::BookingStatus::Completed) {
        return Err(AppError::new(ErrorCode::PayoutNotEligible).into());
    }
    if booking.is_paid_to_host {
        return Err(AppError::new(ErrorCode::PayoutAlreadyPaid).into());
    }

    db::bookings::reject_payout(&mut tx, booking.id, reason, now).await?;
    tx.commit().await?;

    tracing::info!(booking_id, "Payout rejected by admin");
    db::audit::try_log(
        &state.pool,
        "admin",
        "payout.reject",
        serde_json::json!({ "booking_id": booking_id, "reason": reason }),
    )
    .await;

    if let Ok(Some(condotel)) = db::condotels::find_by_id(&state.pool, booking.condotel_id).await {
        if let Ok(Some(host)) = db::users::find_contact(&state.pool, condotel.host_id).await {
            if let Err(e) = crate::email::send_payout_rejected(
                &state.ses,
                &state.ses_from_email,
                &host.email,
                booking_id,
                reason,
            )
            .await
            {
                tracing::warn!(booking_id, error = %e, "Payout rejection email failed");
            }
        }
    }
    Ok(())
}

/// Tell the host a manual transfer bounced because of bad bank details.
/// Changes no payment state.
pub async fn report_account_error(
    state: &AppState,
    booking_id: i64,
    message: &str,
) -> ServiceResult<()> {
    let booking = db::bookings::find_by_id(&state.pool, booking_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    let condotel = db::condotels::find_by_id(&state.pool, booking.condotel_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CondotelNotFound))?;
    let host = db::users::find_contact(&state.pool, condotel.host_id)
        .await?
        .ok_or_else(|| AppError::not_found("Host"))?;

    crate::email::send_account_error(
        &state.ses,
        &state.ses_from_email,
        &host.email,
        booking_id,
        message,
    )
    .await?;

    tracing::info!(booking_id, host_id = host.id, "Account error reported to host");
    Ok(())
}

async fn notify_paid(state: &AppState, host_id: i64, booking: &Booking, account: &BankAccount) {
    if let Ok(Some(host)) = db::users::find_contact(&state.pool, host_id).await {
        if let Err(e) = crate::email::send_payout_sent(
            &state.ses,
            &state.ses_from_email,
            &host.email,
            booking.id,
            booking.total_price,
            &account.bank_name,
            &account.account_number,
        )
        .await
        {
            tracing::warn!(booking_id = booking.id, error = %e, "Payout email failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
    }

    #[test]
    fn test_holdback_window() {
        // 15-day holdback; candidates are selected with end_date <= cutoff
        let cutoff = holdback_cutoff(d(30), 15);
        assert_eq!(cutoff, d(15));

        // Checked out 20 days ago: cleared the window, released
        assert!(d(10) <= cutoff);
        // Checked out 5 days ago: still inside the window, held
        assert!(d(25) > cutoff);
        // Boundary: exactly at the cutoff is released
        assert!(d(15) <= cutoff);
    }
}
