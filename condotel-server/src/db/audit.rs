//! Audit log operations

use shared::util::now_millis;
use sqlx::PgPool;

use super::BoxError;

/// Best-effort audit write: failures are logged and swallowed so an audit
/// hiccup never fails the operation being recorded.
pub async fn try_log(pool: &PgPool, actor: &str, action: &str, detail: serde_json::Value) {
    if let Err(e) = log(pool, actor, action, Some(&detail), now_millis()).await {
        tracing::warn!(action, error = %e, "Audit write failed");
    }
}

/// Write an audit log entry
pub async fn log(
    pool: &PgPool,
    actor: &str,
    action: &str,
    detail: Option<&serde_json::Value>,
    now: i64,
) -> Result<(), BoxError> {
    sqlx::query("INSERT INTO audit_log (actor, action, detail, created_at) VALUES ($1, $2, $3, $4)")
        .bind(actor)
        .bind(action)
        .bind(detail)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}
