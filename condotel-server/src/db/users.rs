//! User lookups (notification addresses only — identity is managed elsewhere)

use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserContact {
    pub id: i64,
    pub email: String,
    pub full_name: String,
}

pub async fn find_contact(pool: &PgPool, id: i64) -> Result<Option<UserContact>, sqlx::Error> {
    sqlx::query_as::<_, UserContact>("SELECT id, email, full_name FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
