//! Booking lifecycle manager
//!
//! Every read-then-decide-then-write sequence here runs inside one
//! transaction: the unit row is locked first, then blocking stays are read
//! under lock, so two concurrent creates on the same unit serialize instead
//! of both passing the availability check.

pub mod availability;
pub mod pricing;

use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Booking, BookingStatus, Condotel, Voucher};
use shared::util::now_millis;

use crate::db::{self, PgTx};
use crate::error::ServiceResult;
use crate::state::AppState;
use pricing::AddonLine;

/// Longest bookable stay
pub const MAX_STAY_NIGHTS: i64 = 30;
/// Furthest-out check-in date, relative to today
pub const MAX_ADVANCE_DAYS: u64 = 365;
/// Days before check-in after which a booking can no longer be edited
pub const UPDATE_LEAD_DAYS: i64 = 1;
/// Days before check-in after which a booking can no longer be cancelled
pub const CANCEL_LEAD_DAYS: i64 = 2;

#[derive(Debug, Deserialize)]
pub struct AddonSelection {
    pub service_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub condotel_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub voucher_code: Option<String>,
    #[serde(default)]
    pub addons: Vec<AddonSelection>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_id_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Only "Cancelled" is accepted here; confirmation is provider-driven
    pub status: Option<String>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_id_number: Option<String>,
}

/// Synchronous date validation, shared by create and update
fn validate_stay(today: NaiveDate, start: NaiveDate, end: NaiveDate) -> Result<i64, AppError> {
    if start < today {
        return Err(AppError::new(ErrorCode::InvalidStartDate));
    }
    if end <= start {
        return Err(AppError::with_message(
            ErrorCode::InvalidStayLength,
            "Check-out date must be after check-in date",
        ));
    }
    let nights = (end - start).num_days();
    if nights > MAX_STAY_NIGHTS {
        return Err(AppError::with_message(
            ErrorCode::InvalidStayLength,
            format!("Stay may not exceed {MAX_STAY_NIGHTS} nights"),
        ));
    }
    let horizon = today
        .checked_add_days(Days::new(MAX_ADVANCE_DAYS))
        .unwrap_or(NaiveDate::MAX);
    if start > horizon {
        return Err(AppError::with_message(
            ErrorCode::InvalidStartDate,
            format!("Check-in date may not be more than {MAX_ADVANCE_DAYS} days out"),
        ));
    }
    Ok(nights)
}

fn days_until(today: NaiveDate, start: NaiveDate) -> i64 {
    (start - today).num_days()
}

async fn resolve_voucher(tx: &mut PgTx<'_>, code: &str) -> ServiceResult<Voucher> {
    let voucher = db::vouchers::find_by_code(tx, code)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidVoucher))?;
    if !voucher.is_redeemable() {
        return Err(AppError::with_message(
            ErrorCode::InvalidVoucher,
            "Voucher is no longer redeemable",
        )
        .into());
    }
    Ok(voucher)
}

/// Validate each selected add-on against the unit's host and collect priced
/// lines. Quantities must be positive; the service must be active and belong
/// to the same host as the unit.
async fn resolve_addons(
    tx: &mut PgTx<'_>,
    condotel: &Condotel,
    selections: &[AddonSelection],
) -> ServiceResult<Vec<AddonLine>> {
    let mut lines = Vec::with_capacity(selections.len());
    for sel in selections {
        if sel.quantity < 1 {
            return Err(AppError::validation("Add-on quantity must be at least 1")
                .with_detail("service_id", sel.service_id)
                .into());
        }
        let service = db::condotels::find_service(tx, sel.service_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::InvalidAddonService)
                    .with_detail("service_id", sel.service_id)
            })?;
        if !service.is_active || service.host_id != condotel.host_id {
            return Err(AppError::new(ErrorCode::InvalidAddonService)
                .with_detail("service_id", sel.service_id)
                .into());
        }
        lines.push(AddonLine {
            service_id: service.id,
            quantity: sel.quantity,
            unit_price: service.price,
        });
    }
    Ok(lines)
}

/// Create a Pending booking.
///
/// Voucher usage is NOT incremented here; that happens only on confirmed
/// payment, so an abandoned booking never consumes a voucher.
pub async fn create_booking(
    state: &AppState,
    customer_id: i64,
    req: &CreateBookingRequest,
) -> ServiceResult<Booking> {
    let today = Utc::now().date_naive();
    let now = now_millis();
    let nights = validate_stay(today, req.start_date, req.end_date)?;

    let mut tx = state.pool.begin().await?;

    // Unit row lock first: serializes concurrent creates even when the unit
    // has no existing bookings to lock.
    let condotel = db::condotels::find_for_update(&mut tx, req.condotel_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::CondotelNotFound))?;

    if condotel.host_id == customer_id {
        return Err(AppError::new(ErrorCode::SelfBookingNotAllowed).into());
    }

    let available = availability::is_available(
        &mut tx,
        &state.status_aliases,
        condotel.id,
        req.start_date,
        req.end_date,
        None,
        today,
    )
    .await?;
    if !available {
        return Err(AppError::new(ErrorCode::CondotelUnavailable).into());
    }

    let promotion =
        db::condotels::active_promotion(&mut tx, condotel.id, req.start_date, req.end_date)
            .await?;

    let voucher = match &req.voucher_code {
        Some(code) => Some(resolve_voucher(&mut tx, code).await?),
        None => None,
    };

    let addons = resolve_addons(&mut tx, &condotel, &req.addons).await?;

    let quote = pricing::quote(
        condotel.nightly_rate,
        nights,
        promotion.as_ref(),
        voucher.as_ref(),
        &addons,
    );

    let booking_id = db::bookings::insert(
        &mut tx,
        &db::bookings::NewBooking {
            condotel_id: condotel.id,
            customer_id,
            start_date: req.start_date,
            end_date: req.end_date,
            total_price: quote.total,
            promotion_id: promotion.as_ref().map(|p| p.id),
            voucher_id: voucher.as_ref().map(|v| v.id),
            guest_name: req.guest_name.as_deref(),
            guest_phone: req.guest_phone.as_deref(),
            guest_id_number: req.guest_id_number.as_deref(),
            now,
        },
    )
    .await?;

    for line in &addons {
        db::bookings::insert_addon(
            &mut tx,
            booking_id,
            &db::bookings::AddonRow {
                service_id: line.service_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            },
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        booking_id,
        condotel_id = condotel.id,
        customer_id,
        total = %quote.total,
        "Booking created"
    );

    db::bookings::find_by_id(&state.pool, booking_id)
        .await?
        .ok_or_else(|| AppError::internal("Booking vanished after insert").into())
}

/// Row-lock a booking and check it belongs to the caller
async fn lock_owned_booking(
    tx: &mut PgTx<'_>,
    booking_id: i64,
    customer_id: i64,
) -> ServiceResult<Booking> {
    let booking = db::bookings::find_for_update(tx, booking_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    if booking.customer_id != customer_id {
        return Err(AppError::permission_denied("Booking belongs to another customer").into());
    }
    Ok(booking)
}

/// Edit a Pending booking.
///
/// Requires at least one day of lead time. A status change is accepted only
/// for Pending -> Cancelled; confirmation is always provider-driven. When
/// the dates change, availability is re-checked excluding this booking's own
/// id and the price is recomputed against the stored add-on lines.
pub async fn update_booking(
    state: &AppState,
    customer_id: i64,
    booking_id: i64,
    req: &UpdateBookingRequest,
) -> ServiceResult<Booking> {
    let today = Utc::now().date_naive();
    let now = now_millis();

    let mut tx = state.pool.begin().await?;
    let booking = lock_owned_booking(&mut tx, booking_id, customer_id).await?;

    let status = booking.status(&state.status_aliases);
    if status != Some(BookingStatus::Pending) {
        return Err(AppError::conflict("Only pending bookings can be edited").into());
    }
    if days_until(today, booking.start_date) < UPDATE_LEAD_DAYS {
        return Err(AppError::new(ErrorCode::LeadTimeTooShort).into());
    }

    if let Some(requested) = &req.status {
        if BookingStatus::from_db(requested) != Some(BookingStatus::Cancelled) {
            return Err(AppError::conflict("Status may only be changed to Cancelled").into());
        }
        db::bookings::update_status(&mut tx, booking.id, BookingStatus::Cancelled, now).await?;
        tx.commit().await?;
        tracing::info!(booking_id, "Booking cancelled via update");
        return db::bookings::find_by_id(&state.pool, booking_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound).into());
    }

    let new_start = req.start_date.unwrap_or(booking.start_date);
    let new_end = req.end_date.unwrap_or(booking.end_date);
    let dates_changed = new_start != booking.start_date || new_end != booking.end_date;

    let total_price = if dates_changed {
        let nights = validate_stay(today, new_start, new_end)?;

        // Same lock order as create: unit row first, then blocking stays
        let condotel = db::condotels::find_for_update(&mut tx, booking.condotel_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CondotelNotFound))?;

        let available = availability::is_available(
            &mut tx,
            &state.status_aliases,
            condotel.id,
            new_start,
            new_end,
            Some(booking.id),
            today,
        )
        .await?;
        if !available {
            return Err(AppError::new(ErrorCode::CondotelUnavailable).into());
        }

        let promotion =
            db::condotels::active_promotion(&mut tx, condotel.id, new_start, new_end).await?;
        let voucher = match booking.voucher_id {
            Some(id) => db::vouchers::find_by_id(&mut tx, id).await?,
            None => None,
        };
        let addons: Vec<AddonLine> = db::bookings::addon_lines(&mut tx, booking.id)
            .await?
            .into_iter()
            .map(|a| AddonLine {
                service_id: a.service_id,
                quantity: a.quantity,
                unit_price: a.unit_price,
            })
            .collect();

        pricing::quote(
            condotel.nightly_rate,
            nights,
            promotion.as_ref(),
            voucher.as_ref(),
            &addons,
        )
        .total
    } else {
        booking.total_price
    };

    db::bookings::update_stay(
        &mut tx,
        booking.id,
        &db::bookings::StayUpdate {
            start_date: new_start,
            end_date: new_end,
            total_price,
            guest_name: req.guest_name.as_deref(),
            guest_phone: req.guest_phone.as_deref(),
            guest_id_number: req.guest_id_number.as_deref(),
            now,
        },
    )
    .await?;

    tx.commit().await?;

    db::bookings::find_by_id(&state.pool, booking_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound).into())
}

/// Cancel a booking, at least two days before check-in.
///
/// Pending bookings (unpaid) flip straight to Cancelled. Confirmed bookings
/// (paid) first get a Pending refund request; the status flips only once the
/// request exists, so a failed attempt leaves the booking untouched and the
/// customer can retry.
pub async fn cancel_booking(
    state: &AppState,
    customer_id: i64,
    booking_id: i64,
) -> ServiceResult<()> {
    let today = Utc::now().date_naive();
    let now = now_millis();

    let mut tx = state.pool.begin().await?;
    let booking = lock_owned_booking(&mut tx, booking_id, customer_id).await?;

    if days_until(today, booking.start_date) < CANCEL_LEAD_DAYS {
        return Err(AppError::new(ErrorCode::LeadTimeTooShort).into());
    }

    match booking.status(&state.status_aliases) {
        Some(BookingStatus::Pending) => {
            db::bookings::update_status(&mut tx, booking.id, BookingStatus::Cancelled, now)
                .await?;
        }
        Some(BookingStatus::Confirmed) => {
            crate::refund::open_obligation(&mut tx, &booking, now).await?;
            db::bookings::update_status(&mut tx, booking.id, BookingStatus::Cancelled, now)
                .await?;
        }
        _ => {
            return Err(AppError::conflict(
                "Only pending or confirmed bookings can be cancelled",
            )
            .into());
        }
    }

    tx.commit().await?;

    tracing::info!(booking_id, customer_id, "Booking cancelled");
    db::audit::try_log(
        &state.pool,
        &format!("customer:{customer_id}"),
        "booking.cancel",
        serde_json::json!({ "booking_id": booking_id }),
    )
    .await;

    Ok(())
}

/// Abandon checkout for an unpaid booking.
///
/// Distinct from cancellation: only valid while Pending, creates no refund
/// obligation, and carries no lead-time requirement.
pub async fn cancel_payment(
    state: &AppState,
    customer_id: i64,
    booking_id: i64,
) -> ServiceResult<()> {
    let now = now_millis();

    let mut tx = state.pool.begin().await?;
    let booking = lock_owned_booking(&mut tx, booking_id, customer_id).await?;

    if booking.status(&state.status_aliases) != Some(BookingStatus::Pending) {
        return Err(AppError::conflict("Only an unpaid booking can abandon checkout").into());
    }

    db::bookings::update_status(&mut tx, booking.id, BookingStatus::Cancelled, now).await?;
    tx.commit().await?;

    tracing::info!(booking_id, customer_id, "Checkout abandoned");
    Ok(())
}

/// Voucher value applied to the price of `booking`, if its voucher is still
/// on file. Used by the reconciliation engine when consuming usage.
pub async fn booked_voucher(
    tx: &mut PgTx<'_>,
    booking: &Booking,
) -> Result<Option<Voucher>, sqlx::Error> {
    match booking.voucher_id {
        Some(id) => db::vouchers::find_by_id(tx, id).await,
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_stay_in_past_rejected() {
        let today = d(2026, 9, 10);
        let err = validate_stay(today, d(2026, 9, 9), d(2026, 9, 12)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStartDate);
    }

    #[test]
    fn test_inverted_dates_rejected() {
        let today = d(2026, 9, 10);
        let err = validate_stay(today, d(2026, 9, 15), d(2026, 9, 15)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStayLength);
        let err = validate_stay(today, d(2026, 9, 15), d(2026, 9, 14)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStayLength);
    }

    #[test]
    fn test_stay_length_cap() {
        let today = d(2026, 9, 10);
        assert_eq!(
            validate_stay(today, d(2026, 9, 15), d(2026, 10, 15)).unwrap(),
            30
        );
        let err = validate_stay(today, d(2026, 9, 15), d(2026, 10, 16)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStayLength);
    }

    #[test]
    fn test_advance_horizon() {
        let today = d(2026, 1, 1);
        // 2027-01-01 is exactly 365 days out
        assert!(validate_stay(today, d(2027, 1, 1), d(2027, 1, 3)).is_ok());
        let err = validate_stay(today, d(2027, 1, 2), d(2027, 1, 4)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStartDate);
    }

    #[test]
    fn test_lead_time_boundaries() {
        let today = d(2026, 9, 10);
        assert_eq!(days_until(today, d(2026, 9, 12)), 2);
        assert_eq!(days_until(today, d(2026, 9, 11)), 1);
        assert!(days_until(today, d(2026, 9, 11)) < CANCEL_LEAD_DAYS);
        assert!(days_until(today, d(2026, 9, 12)) >= CANCEL_LEAD_DAYS);
    }
}
