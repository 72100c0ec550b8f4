//! Data models
//!
//! Shared between the server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (Postgres BIGSERIAL).

pub mod bank_account;
pub mod booking;
pub mod condotel;
pub mod package;
pub mod refund;

// Re-exports
pub use bank_account::*;
pub use booking::*;
pub use condotel::*;
pub use package::*;
pub use refund::*;
