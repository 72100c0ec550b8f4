//! Refund request queries

use rust_decimal::Decimal;
use shared::models::{PaymentMethod, RefundRequest, RefundStatus};
use sqlx::PgPool;

use super::PgTx;

pub async fn find_for_update(
    tx: &mut PgTx<'_>,
    id: i64,
) -> Result<Option<RefundRequest>, sqlx::Error> {
    sqlx::query_as::<_, RefundRequest>("SELECT * FROM refund_requests WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

/// Row-lock the request for a booking (at most one exists)
pub async fn find_for_update_by_booking(
    tx: &mut PgTx<'_>,
    booking_id: i64,
) -> Result<Option<RefundRequest>, sqlx::Error> {
    sqlx::query_as::<_, RefundRequest>(
        "SELECT * FROM refund_requests WHERE booking_id = $1 FOR UPDATE",
    )
    .bind(booking_id)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<RefundRequest>, sqlx::Error> {
    sqlx::query_as::<_, RefundRequest>("SELECT * FROM refund_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_booking(
    pool: &PgPool,
    booking_id: i64,
) -> Result<Option<RefundRequest>, sqlx::Error> {
    sqlx::query_as::<_, RefundRequest>("SELECT * FROM refund_requests WHERE booking_id = $1")
        .bind(booking_id)
        .fetch_optional(pool)
        .await
}

pub struct NewRefundRequest<'a> {
    pub booking_id: i64,
    pub customer_id: i64,
    pub refund_amount: Decimal,
    pub bank_account_number: Option<&'a str>,
    pub bank_name: Option<&'a str>,
    pub bank_account_holder: Option<&'a str>,
    pub now: i64,
}

/// Insert a Pending refund request, returning its id
pub async fn insert(tx: &mut PgTx<'_>, r: &NewRefundRequest<'_>) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO refund_requests (
            booking_id, customer_id, refund_amount, status,
            bank_account_number, bank_name, bank_account_holder,
            resubmission_count, payment_method, created_at, updated_at
        )
        VALUES ($1, $2, $3, 'Pending', $4, $5, $6, 0, 'Manual', $7, $7)
        RETURNING id
        "#,
    )
    .bind(r.booking_id)
    .bind(r.customer_id)
    .bind(r.refund_amount)
    .bind(r.bank_account_number)
    .bind(r.bank_name)
    .bind(r.bank_account_holder)
    .bind(r.now)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

/// Update bank destination details on a still-open request
pub async fn update_bank_details(
    tx: &mut PgTx<'_>,
    id: i64,
    account_number: &str,
    bank_name: &str,
    account_holder: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE refund_requests
        SET bank_account_number = $1, bank_name = $2, bank_account_holder = $3, updated_at = $4
        WHERE id = $5
        "#,
    )
    .bind(account_number)
    .bind(bank_name)
    .bind(account_holder)
    .bind(now)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Rejected -> Pending, consuming the single allowed resubmission
pub async fn resubmit(tx: &mut PgTx<'_>, id: i64, now: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE refund_requests
        SET status = 'Pending', resubmission_count = resubmission_count + 1,
            rejection_reason = NULL, updated_at = $1
        WHERE id = $2
        "#,
    )
    .bind(now)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn reject(
    tx: &mut PgTx<'_>,
    id: i64,
    reason: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE refund_requests
        SET status = 'Rejected', rejection_reason = $1, updated_at = $2
        WHERE id = $3
        "#,
    )
    .bind(reason)
    .bind(now)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Stamp the settlement: status, processed_at, and how it was paid
pub async fn settle(
    tx: &mut PgTx<'_>,
    id: i64,
    status: RefundStatus,
    method: PaymentMethod,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE refund_requests
        SET status = $1, payment_method = $2, processed_at = $3, updated_at = $3
        WHERE id = $4
        "#,
    )
    .bind(status.as_db())
    .bind(method.as_db())
    .bind(now)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
