//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::BookingNotFound
            | Self::CondotelNotFound
            | Self::RefundNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::CondotelUnavailable
            | Self::InvalidBookingState
            | Self::RefundAlreadySettled
            | Self::RefundNotPending
            | Self::ResubmissionLimitReached
            | Self::PayoutAlreadyPaid
            | Self::PayoutRejected => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied | Self::AdminRequired | Self::SelfBookingNotAllowed => {
                StatusCode::FORBIDDEN
            }

            // 422 Unprocessable Entity (business rules)
            Self::LeadTimeTooShort
            | Self::RefundNotEligible
            | Self::PayoutNotEligible
            | Self::NoActiveBankAccount => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError | Self::PaymentSetupFailed => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
