//! Bank account lookup (payout destination)

use shared::models::BankAccount;
use sqlx::PgPool;

/// The host's default active bank account, if any
pub async fn default_active_account(
    pool: &PgPool,
    host_id: i64,
) -> Result<Option<BankAccount>, sqlx::Error> {
    sqlx::query_as::<_, BankAccount>(
        r#"
        SELECT id, host_id, bank_name, account_number, account_holder, is_default, is_active
        FROM bank_accounts
        WHERE host_id = $1 AND is_default = TRUE AND is_active = TRUE
        LIMIT 1
        "#,
    )
    .bind(host_id)
    .fetch_optional(pool)
    .await
}
