//! Voucher ledger operations
//!
//! Usage is applied only on confirmed payment and rolled back when a refund
//! settles, so an abandoned booking never consumes a voucher.

use shared::models::Voucher;

use super::PgTx;

pub async fn find_by_code(
    tx: &mut PgTx<'_>,
    code: &str,
) -> Result<Option<Voucher>, sqlx::Error> {
    sqlx::query_as::<_, Voucher>(
        "SELECT id, code, kind, value, usage_count, max_usage, is_active FROM vouchers WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn find_by_id(tx: &mut PgTx<'_>, id: i64) -> Result<Option<Voucher>, sqlx::Error> {
    sqlx::query_as::<_, Voucher>(
        "SELECT id, code, kind, value, usage_count, max_usage, is_active FROM vouchers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

/// Increment usage on confirmed payment
pub async fn apply_usage(tx: &mut PgTx<'_>, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE vouchers SET usage_count = usage_count + 1 WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Roll back a usage increment when the stay is unwound by a settled refund
pub async fn rollback_usage(tx: &mut PgTx<'_>, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE vouchers SET usage_count = GREATEST(usage_count - 1, 0) WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
