//! Refund request model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum number of times a rejected refund request may be resubmitted
pub const MAX_RESUBMISSIONS: i32 = 1;

/// Refund request lifecycle status
///
/// `Rejected -> Pending` exactly once (resubmission); `Refunded` and
/// `Completed` are terminal and can never be reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefundStatus {
    Pending,
    Rejected,
    Refunded,
    Completed,
}

impl RefundStatus {
    /// Parse from database string value
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Rejected" => Some(Self::Rejected),
            "Refunded" => Some(Self::Refunded),
            "Completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Database string representation
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Rejected => "Rejected",
            Self::Refunded => "Refunded",
            Self::Completed => "Completed",
        }
    }

    /// Terminal states can never be reopened
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Refunded | Self::Completed)
    }
}

/// How a refund was (or will be) settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Admin transfers manually and confirms in the console
    Manual,
    /// Settled via the payment provider's payout API
    Auto,
}

impl PaymentMethod {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "Manual" => Some(Self::Manual),
            "Auto" => Some(Self::Auto),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Auto => "Auto",
        }
    }
}

/// Refund request entity — exactly one per booking, created lazily
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RefundRequest {
    pub id: i64,
    pub booking_id: i64,
    pub customer_id: i64,
    pub refund_amount: Decimal,
    pub status: String,
    pub bank_account_number: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_holder: Option<String>,
    /// Never exceeds [`MAX_RESUBMISSIONS`]
    pub resubmission_count: i32,
    pub processed_at: Option<i64>,
    pub payment_method: String,
    pub rejection_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RefundRequest {
    pub fn status(&self) -> Option<RefundStatus> {
        RefundStatus::from_db(&self.status)
    }

    /// Whether one more resubmission is still allowed
    pub fn can_resubmit(&self) -> bool {
        self.resubmission_count < MAX_RESUBMISSIONS
    }
}

/// Bank destination details supplied by the customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundBankDetails {
    pub bank_account_number: String,
    pub bank_name: String,
    pub bank_account_holder: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in [
            RefundStatus::Pending,
            RefundStatus::Rejected,
            RefundStatus::Refunded,
            RefundStatus::Completed,
        ] {
            assert_eq!(RefundStatus::from_db(s.as_db()), Some(s));
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(RefundStatus::Refunded.is_terminal());
        assert!(RefundStatus::Completed.is_terminal());
        assert!(!RefundStatus::Pending.is_terminal());
        assert!(!RefundStatus::Rejected.is_terminal());
    }

    fn request(resubmission_count: i32) -> RefundRequest {
        RefundRequest {
            id: 1,
            booking_id: 1,
            customer_id: 2,
            refund_amount: Decimal::new(3_000_000, 0),
            status: "Rejected".to_string(),
            bank_account_number: None,
            bank_name: None,
            bank_account_holder: None,
            resubmission_count,
            processed_at: None,
            payment_method: "Manual".to_string(),
            rejection_reason: Some("Incomplete bank details".to_string()),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_resubmission_limit() {
        // One resubmission after a rejection, never a second
        assert!(request(0).can_resubmit());
        assert!(!request(MAX_RESUBMISSIONS).can_resubmit());
        assert!(!request(MAX_RESUBMISSIONS + 1).can_resubmit());
    }
}
