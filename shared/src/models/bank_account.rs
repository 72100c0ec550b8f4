//! Bank account lookup model (payout destination)

use serde::{Deserialize, Serialize};

/// Host bank account — the core only ever asks for the default active one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BankAccount {
    pub id: i64,
    pub host_id: i64,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    pub is_default: bool,
    pub is_active: bool,
}
