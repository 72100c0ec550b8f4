//! Unified error codes for the condotel platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Booking errors
//! - 5xxx: Payment errors
//! - 6xxx: Refund errors
//! - 7xxx: Payout errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Permission denied
    PermissionDenied = 1010,
    /// Admin role required
    AdminRequired = 1011,

    // ==================== 4xxx: Booking ====================
    /// Booking not found
    BookingNotFound = 4001,
    /// Condotel not found
    CondotelNotFound = 4002,
    /// Condotel is not available for the requested dates
    CondotelUnavailable = 4003,
    /// Hosts may not book their own condotel
    SelfBookingNotAllowed = 4004,
    /// Stay length out of bounds (1..=30 nights)
    InvalidStayLength = 4005,
    /// Start date in the past or beyond the booking horizon
    InvalidStartDate = 4006,
    /// Booking is not in a state that permits this operation
    InvalidBookingState = 4007,
    /// Not enough lead time before check-in
    LeadTimeTooShort = 4008,
    /// Add-on service invalid (inactive or wrong host)
    InvalidAddonService = 4009,
    /// Voucher invalid, inactive, or exhausted
    InvalidVoucher = 4010,

    // ==================== 5xxx: Payment ====================
    /// Payment provider setup failed
    PaymentSetupFailed = 5001,
    /// Webhook signature verification failed
    InvalidSignature = 5002,
    /// Order code does not map to any known payment flow
    UnrecognizedOrderCode = 5003,
    /// Callback body malformed or ambiguous
    InvalidCallback = 5004,

    // ==================== 6xxx: Refund ====================
    /// Refund request not found
    RefundNotFound = 6001,
    /// Booking is not eligible for a refund
    RefundNotEligible = 6002,
    /// Refund request already settled (terminal)
    RefundAlreadySettled = 6003,
    /// Only a pending refund request may be rejected
    RefundNotPending = 6004,
    /// Rejected refund may be resubmitted at most once
    ResubmissionLimitReached = 6005,
    /// Rejection requires a reason
    RejectionReasonRequired = 6006,

    // ==================== 7xxx: Payout ====================
    /// Booking is not eligible for host payout
    PayoutNotEligible = 7001,
    /// Booking already paid to host
    PayoutAlreadyPaid = 7002,
    /// Payout previously rejected by an admin
    PayoutRejected = 7003,
    /// Host has no default active bank account
    NoActiveBankAccount = 7004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Token is invalid",
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Admin role required",

            // Booking
            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::CondotelNotFound => "Condotel not found",
            ErrorCode::CondotelUnavailable => "Condotel is not available for the requested dates",
            ErrorCode::SelfBookingNotAllowed => "Hosts may not book their own condotel",
            ErrorCode::InvalidStayLength => "Stay must be between 1 and 30 nights",
            ErrorCode::InvalidStartDate => "Start date is in the past or too far out",
            ErrorCode::InvalidBookingState => "Booking state does not permit this operation",
            ErrorCode::LeadTimeTooShort => "Not enough lead time before check-in",
            ErrorCode::InvalidAddonService => "Add-on service is inactive or belongs to another host",
            ErrorCode::InvalidVoucher => "Voucher is invalid, inactive, or exhausted",

            // Payment
            ErrorCode::PaymentSetupFailed => "Payment provider setup failed",
            ErrorCode::InvalidSignature => "Webhook signature verification failed",
            ErrorCode::UnrecognizedOrderCode => "Order code does not map to any known payment flow",
            ErrorCode::InvalidCallback => "Callback body is malformed or ambiguous",

            // Refund
            ErrorCode::RefundNotFound => "Refund request not found",
            ErrorCode::RefundNotEligible => "Booking is not eligible for a refund",
            ErrorCode::RefundAlreadySettled => "Refund request is already settled",
            ErrorCode::RefundNotPending => "Only a pending refund request may be rejected",
            ErrorCode::ResubmissionLimitReached => "Rejected refund may be resubmitted at most once",
            ErrorCode::RejectionReasonRequired => "Rejection requires a reason",

            // Payout
            ErrorCode::PayoutNotEligible => "Booking is not eligible for host payout",
            ErrorCode::PayoutAlreadyPaid => "Booking already paid to host",
            ErrorCode::PayoutRejected => "Payout was rejected by an admin",
            ErrorCode::NoActiveBankAccount => "Host has no default active bank account",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }

    /// Get the category for this error code
    pub fn category(&self) -> super::ErrorCategory {
        super::ErrorCategory::from_code(self.code())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            7 => Self::RequiredField,
            8 => Self::ValueOutOfRange,
            1001 => Self::NotAuthenticated,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,
            1010 => Self::PermissionDenied,
            1011 => Self::AdminRequired,
            4001 => Self::BookingNotFound,
            4002 => Self::CondotelNotFound,
            4003 => Self::CondotelUnavailable,
            4004 => Self::SelfBookingNotAllowed,
            4005 => Self::InvalidStayLength,
            4006 => Self::InvalidStartDate,
            4007 => Self::InvalidBookingState,
            4008 => Self::LeadTimeTooShort,
            4009 => Self::InvalidAddonService,
            4010 => Self::InvalidVoucher,
            5001 => Self::PaymentSetupFailed,
            5002 => Self::InvalidSignature,
            5003 => Self::UnrecognizedOrderCode,
            5004 => Self::InvalidCallback,
            6001 => Self::RefundNotFound,
            6002 => Self::RefundNotEligible,
            6003 => Self::RefundAlreadySettled,
            6004 => Self::RefundNotPending,
            6005 => Self::ResubmissionLimitReached,
            6006 => Self::RejectionReasonRequired,
            7001 => Self::PayoutNotEligible,
            7002 => Self::PayoutAlreadyPaid,
            7003 => Self::PayoutRejected,
            7004 => Self::NoActiveBankAccount,
            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::NetworkError,
            9004 => Self::TimeoutError,
            9005 => Self::ConfigError,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::BookingNotFound,
            ErrorCode::CondotelUnavailable,
            ErrorCode::ResubmissionLimitReached,
            ErrorCode::PayoutNotEligible,
            ErrorCode::InternalError,
        ] {
            let raw: u16 = code.into();
            assert_eq!(ErrorCode::try_from(raw), Ok(code));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(ErrorCode::try_from(12345), Err(InvalidErrorCode(12345)));
    }
}
