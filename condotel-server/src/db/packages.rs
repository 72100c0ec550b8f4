//! Host package purchase queries (payment reconciliation targets)

use super::PgTx;
use shared::models::{HostPackage, PackagePurchase};
use sqlx::PgPool;

pub async fn find_package(pool: &PgPool, id: i64) -> Result<Option<HostPackage>, sqlx::Error> {
    sqlx::query_as::<_, HostPackage>(
        "SELECT id, name, price, max_listings, duration_days, is_active FROM host_packages WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert a Pending purchase ahead of checkout, returning its id
pub async fn insert_pending(
    pool: &PgPool,
    host_id: i64,
    package_id: i64,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO package_purchases (host_id, package_id, status, created_at)
        VALUES ($1, $2, 'Pending', $3)
        RETURNING id
        "#,
    )
    .bind(host_id)
    .bind(package_id)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Row-lock the newest pending purchase for (host, package)
pub async fn find_pending_for_update(
    tx: &mut PgTx<'_>,
    host_id: i64,
    package_id: i64,
) -> Result<Option<PackagePurchase>, sqlx::Error> {
    sqlx::query_as::<_, PackagePurchase>(
        r#"
        SELECT id, host_id, package_id, status, activated_at, created_at
        FROM package_purchases
        WHERE host_id = $1 AND package_id = $2 AND status = 'Pending'
        ORDER BY created_at DESC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(host_id)
    .bind(package_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Row-lock the newest active purchase for a host (package refund target)
pub async fn find_active_for_update(
    tx: &mut PgTx<'_>,
    host_id: i64,
) -> Result<Option<PackagePurchase>, sqlx::Error> {
    sqlx::query_as::<_, PackagePurchase>(
        r#"
        SELECT id, host_id, package_id, status, activated_at, created_at
        FROM package_purchases
        WHERE host_id = $1 AND status = 'Active'
        ORDER BY created_at DESC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(host_id)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn activate(tx: &mut PgTx<'_>, id: i64, now: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE package_purchases SET status = 'Active', activated_at = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn mark_refunded(tx: &mut PgTx<'_>, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE package_purchases SET status = 'Refunded' WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
