//! Host package models
//!
//! Packages grant hosts listing quotas. The booking core only touches them
//! through the payment reconciliation engine: a purchase is activated by a
//! provider callback, and a package refund deactivates it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Purchasable host package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct HostPackage {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub max_listings: i32,
    pub duration_days: i32,
    pub is_active: bool,
}

/// Package purchase status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseStatus {
    Pending,
    Active,
    Refunded,
}

impl PurchaseStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Active" => Some(Self::Active),
            "Refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Refunded => "Refunded",
        }
    }
}

/// A host's purchase of a package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PackagePurchase {
    pub id: i64,
    pub host_id: i64,
    pub package_id: i64,
    pub status: String,
    pub activated_at: Option<i64>,
    pub created_at: i64,
}

impl PackagePurchase {
    pub fn status(&self) -> Option<PurchaseStatus> {
        PurchaseStatus::from_db(&self.status)
    }
}
