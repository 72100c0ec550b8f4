//! Database access layer
//!
//! Purpose-built projection queries per operation — no generic graph loader.
//! Every read-then-decide-then-write sequence runs inside one transaction
//! with `SELECT ... FOR UPDATE` locked reads; the transaction is the
//! correctness boundary, never an in-process lock or cache.

pub mod audit;
pub mod bank_accounts;
pub mod bookings;
pub mod condotels;
pub mod packages;
pub mod refund_requests;
pub mod users;
pub mod vouchers;
pub mod webhook_events;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Postgres transaction alias used across the core
pub type PgTx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;
