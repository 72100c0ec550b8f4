//! Condotel catalog lookups (units, add-on services, promotions)

use chrono::NaiveDate;
use shared::models::{Condotel, CondotelService, Promotion};
use sqlx::PgPool;

use super::PgTx;

/// Plain read, no lock. For notification lookups after a decision is made.
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Condotel>, sqlx::Error> {
    sqlx::query_as::<_, Condotel>(
        "SELECT id, host_id, name, nightly_rate, is_active FROM condotels WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Lock the unit row itself before the availability check. Serializes
/// concurrent bookings on the same unit even when the unit has no existing
/// bookings to lock.
pub async fn find_for_update(
    tx: &mut PgTx<'_>,
    id: i64,
) -> Result<Option<Condotel>, sqlx::Error> {
    sqlx::query_as::<_, Condotel>(
        "SELECT id, host_id, name, nightly_rate, is_active FROM condotels WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

/// The single active promotion whose window covers the whole stay, if any
pub async fn active_promotion(
    tx: &mut PgTx<'_>,
    condotel_id: i64,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Option<Promotion>, sqlx::Error> {
    sqlx::query_as::<_, Promotion>(
        r#"
        SELECT id, condotel_id, discount_percent, start_date, end_date, is_active
        FROM promotions
        WHERE condotel_id = $1
          AND is_active = TRUE
          AND start_date <= $2
          AND end_date >= $3
        ORDER BY discount_percent DESC
        LIMIT 1
        "#,
    )
    .bind(condotel_id)
    .bind(check_in)
    .bind(check_out)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn find_service(
    tx: &mut PgTx<'_>,
    service_id: i64,
) -> Result<Option<CondotelService>, sqlx::Error> {
    sqlx::query_as::<_, CondotelService>(
        "SELECT id, host_id, name, price, is_active FROM condotel_services WHERE id = $1",
    )
    .bind(service_id)
    .fetch_optional(&mut **tx)
    .await
}
