//! Webhook idempotency journal
//!
//! INSERT first, check rows_affected — eliminates the TOCTOU race a
//! SELECT-then-INSERT check would have. Row-level locks on the reconciled
//! entity still decide outcomes; this journal just short-circuits exact
//! redeliveries.

use sqlx::PgPool;

/// Record an event; returns false if it was already processed
pub async fn record(
    pool: &PgPool,
    event_id: &str,
    order_code: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO processed_webhook_events (event_id, order_code, processed_at)
         VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
    )
    .bind(event_id)
    .bind(order_code)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Release an event so the provider's retry is processed as fresh. Used when
/// reconciliation fails after the event was journaled.
pub async fn release(pool: &PgPool, event_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM processed_webhook_events WHERE event_id = $1")
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(())
}
