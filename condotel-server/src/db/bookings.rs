//! Booking queries
//!
//! Lock-taking queries all run against a transaction (`PgTx`); plain reads
//! take the pool.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::{Booking, BookingStatus, StatusAliases};
use sqlx::PgPool;

use super::PgTx;

/// Row-lock a booking for a state transition
pub async fn find_for_update(tx: &mut PgTx<'_>, id: i64) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Stay interval projection used by the availability checker
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StayInterval {
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Locked read of every booking that currently claims the unit's calendar:
/// blocking statuses (Pending included — a first attempt claims the dates the
/// instant it is persisted) with a stay that has not yet ended.
pub async fn lock_blocking_stays(
    tx: &mut PgTx<'_>,
    aliases: &StatusAliases,
    condotel_id: i64,
    today: NaiveDate,
    exclude_booking_id: Option<i64>,
) -> Result<Vec<StayInterval>, sqlx::Error> {
    sqlx::query_as::<_, StayInterval>(
        r#"
        SELECT id, start_date, end_date
        FROM bookings
        WHERE condotel_id = $1
          AND status = ANY($2)
          AND end_date >= $3
          AND ($4::BIGINT IS NULL OR id <> $4)
        FOR UPDATE
        "#,
    )
    .bind(condotel_id)
    .bind(aliases.blocking_db_values())
    .bind(today)
    .bind(exclude_booking_id)
    .fetch_all(&mut **tx)
    .await
}

/// Confirmed-or-later stays overlapping the given interval, excluding one
/// booking. Used for the second race check at confirmation time.
pub async fn confirmed_conflicts(
    tx: &mut PgTx<'_>,
    aliases: &StatusAliases,
    condotel_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude_booking_id: i64,
) -> Result<Vec<StayInterval>, sqlx::Error> {
    let statuses: Vec<String> = [
        BookingStatus::Confirmed,
        BookingStatus::InStay,
        BookingStatus::Completed,
    ]
    .iter()
    .flat_map(|s| aliases.db_values(*s))
    .collect();

    sqlx::query_as::<_, StayInterval>(
        r#"
        SELECT id, start_date, end_date
        FROM bookings
        WHERE condotel_id = $1
          AND status = ANY($2)
          AND id <> $3
          AND start_date < $5
          AND end_date > $4
        FOR UPDATE
        "#,
    )
    .bind(condotel_id)
    .bind(statuses)
    .bind(exclude_booking_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(&mut **tx)
    .await
}

pub struct NewBooking<'a> {
    pub condotel_id: i64,
    pub customer_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
    pub promotion_id: Option<i64>,
    pub voucher_id: Option<i64>,
    pub guest_name: Option<&'a str>,
    pub guest_phone: Option<&'a str>,
    pub guest_id_number: Option<&'a str>,
    pub now: i64,
}

/// Insert a Pending booking, returning its id
pub async fn insert(tx: &mut PgTx<'_>, b: &NewBooking<'_>) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO bookings (
            condotel_id, customer_id, start_date, end_date, total_price, status,
            promotion_id, voucher_id, guest_name, guest_phone, guest_id_number,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, 'Pending', $6, $7, $8, $9, $10, $11, $11)
        RETURNING id
        "#,
    )
    .bind(b.condotel_id)
    .bind(b.customer_id)
    .bind(b.start_date)
    .bind(b.end_date)
    .bind(b.total_price)
    .bind(b.promotion_id)
    .bind(b.voucher_id)
    .bind(b.guest_name)
    .bind(b.guest_phone)
    .bind(b.guest_id_number)
    .bind(b.now)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

/// Add-on service line as stored with the booking
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AddonRow {
    pub service_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
}

pub async fn insert_addon(
    tx: &mut PgTx<'_>,
    booking_id: i64,
    line: &AddonRow,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO booking_addons (booking_id, service_id, quantity, unit_price)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(booking_id)
    .bind(line.service_id)
    .bind(line.quantity)
    .bind(line.unit_price)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Stored add-on lines, re-read when the price is recomputed
pub async fn addon_lines(
    tx: &mut PgTx<'_>,
    booking_id: i64,
) -> Result<Vec<AddonRow>, sqlx::Error> {
    sqlx::query_as::<_, AddonRow>(
        "SELECT service_id, quantity, unit_price FROM booking_addons WHERE booking_id = $1",
    )
    .bind(booking_id)
    .fetch_all(&mut **tx)
    .await
}

pub async fn update_status(
    tx: &mut PgTx<'_>,
    id: i64,
    status: BookingStatus,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(status.as_db())
        .bind(now)
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Confirm a booking, minting the check-in token only if absent
pub async fn confirm(
    tx: &mut PgTx<'_>,
    id: i64,
    check_in_token: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE bookings
        SET status = 'Confirmed',
            check_in_token = COALESCE(check_in_token, $1),
            updated_at = $2
        WHERE id = $3
        "#,
    )
    .bind(check_in_token)
    .bind(now)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub struct StayUpdate<'a> {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
    pub guest_name: Option<&'a str>,
    pub guest_phone: Option<&'a str>,
    pub guest_id_number: Option<&'a str>,
    pub now: i64,
}

pub async fn update_stay(tx: &mut PgTx<'_>, id: i64, u: &StayUpdate<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE bookings
        SET start_date = $1, end_date = $2, total_price = $3,
            guest_name = COALESCE($4, guest_name),
            guest_phone = COALESCE($5, guest_phone),
            guest_id_number = COALESCE($6, guest_id_number),
            updated_at = $7
        WHERE id = $8
        "#,
    )
    .bind(u.start_date)
    .bind(u.end_date)
    .bind(u.total_price)
    .bind(u.guest_name)
    .bind(u.guest_phone)
    .bind(u.guest_id_number)
    .bind(u.now)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn mark_paid_to_host(tx: &mut PgTx<'_>, id: i64, now: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE bookings SET is_paid_to_host = TRUE, paid_to_host_at = $1, updated_at = $1 WHERE id = $2",
    )
    .bind(now)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn reject_payout(
    tx: &mut PgTx<'_>,
    id: i64,
    reason: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE bookings
        SET payout_rejected_at = $1, payout_rejected_reason = $2, updated_at = $1
        WHERE id = $3
        "#,
    )
    .bind(now)
    .bind(reason)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Bookings eligible for host payout: completed stays past the holdback
/// window, unpaid, not admin-rejected, with no live refund request. The
/// single predicate shared by the batch sweep and the targeted path.
pub async fn payout_candidates(
    pool: &PgPool,
    aliases: &StatusAliases,
    cutoff: NaiveDate,
    only_booking_id: Option<i64>,
) -> Result<Vec<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        SELECT b.*
        FROM bookings b
        WHERE b.status = ANY($1)
          AND b.end_date <= $2
          AND b.is_paid_to_host = FALSE
          AND b.payout_rejected_at IS NULL
          AND ($3::BIGINT IS NULL OR b.id = $3)
          AND NOT EXISTS (
              SELECT 1 FROM refund_requests r
              WHERE r.booking_id = b.id AND r.status <> 'Rejected'
          )
        ORDER BY b.end_date
        "#,
    )
    .bind(aliases.db_values(BookingStatus::Completed))
    .bind(cutoff)
    .bind(only_booking_id)
    .fetch_all(pool)
    .await
}
