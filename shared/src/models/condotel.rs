//! Condotel catalog models (read-only lookups for the booking core)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Condotel unit — the rentable property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Condotel {
    pub id: i64,
    pub host_id: i64,
    pub name: String,
    pub nightly_rate: Decimal,
    pub is_active: bool,
}

/// Add-on service offered alongside a unit (airport pickup, breakfast, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CondotelService {
    pub id: i64,
    pub host_id: i64,
    pub name: String,
    pub price: Decimal,
    pub is_active: bool,
}

/// Unit-scoped, date-bounded percentage discount
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: i64,
    pub condotel_id: i64,
    pub discount_percent: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
}

impl Promotion {
    /// A promotion applies only when its window covers the whole stay
    pub fn covers(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.is_active && self.start_date <= check_in && self.end_date >= check_out
    }
}

/// Voucher discount kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoucherKind {
    /// Fixed amount off, clamped so the price never goes negative
    Amount,
    /// Percentage off the room subtotal
    Percent,
}

impl VoucherKind {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "Amount" => Some(Self::Amount),
            "Percent" => Some(Self::Percent),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Amount => "Amount",
            Self::Percent => "Percent",
        }
    }
}

/// Code-redeemed, usage-counted discount
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Voucher {
    pub id: i64,
    pub code: String,
    pub kind: String,
    pub value: Decimal,
    pub usage_count: i32,
    pub max_usage: i32,
    pub is_active: bool,
}

impl Voucher {
    pub fn kind(&self) -> Option<VoucherKind> {
        VoucherKind::from_db(&self.kind)
    }

    /// Redeemable: active and not exhausted
    pub fn is_redeemable(&self) -> bool {
        self.is_active && self.usage_count < self.max_usage
    }
}
