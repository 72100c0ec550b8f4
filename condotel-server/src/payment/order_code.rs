//! Order-code multiplexing scheme
//!
//! A single integer channel correlates every provider transaction to a domain
//! entity. The partition is fixed arithmetic and decoding must be total:
//!
//! | code | meaning |
//! |---|---|
//! | `booking_id * 1_000_000 + r`, `r` in `0..=999_998` | booking payment |
//! | `booking_id * 1_000_000 + 999_999` | refund payment for that booking |
//! | `host_id * 1_000_000_000 + package_id * 1_000_000 + r` | package purchase |
//! | `host_id * 1_000_000_000 + 888_888` | host package refund |
//!
//! Codes at or above `1_000_000_000` belong to the package space, everything
//! below to the booking space. `r` is a random disambiguator so a retried
//! checkout mints a fresh, distinguishable code (provider-side duplicate-order
//! rejections would otherwise be misread as failures).
//!
//! All encode/decode arithmetic lives here; callers never do this math inline.

/// Remainder marking a booking refund payment
pub const REFUND_MARKER: i64 = 999_999;
/// Remainder marking a host package refund
pub const PACKAGE_REFUND_MARKER: i64 = 888_888;
/// Multiplier separating the entity id from the disambiguator
const ENTITY_SPACE: i64 = 1_000_000;
/// Codes at or above this belong to the package space
const PACKAGE_SPACE: i64 = 1_000_000_000;

/// Decoded meaning of an order code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    BookingPayment { booking_id: i64 },
    BookingRefund { booking_id: i64 },
    PackagePurchase { host_id: i64, package_id: i64 },
    PackageRefund { host_id: i64 },
    /// Code does not map to any flow; never silently ignored by callers
    Unrecognized,
}

/// Decode an order code. Total: every i64 maps to exactly one variant.
pub fn decode(code: i64) -> OrderKind {
    if code < ENTITY_SPACE {
        // No entity id component
        return OrderKind::Unrecognized;
    }

    if code >= PACKAGE_SPACE {
        let host_id = code / PACKAGE_SPACE;
        let rem = code % PACKAGE_SPACE;
        if rem == PACKAGE_REFUND_MARKER {
            return OrderKind::PackageRefund { host_id };
        }
        let package_id = rem / ENTITY_SPACE;
        if package_id == 0 {
            // Package space without a package id and not the refund marker
            return OrderKind::Unrecognized;
        }
        return OrderKind::PackagePurchase {
            host_id,
            package_id,
        };
    }

    let booking_id = code / ENTITY_SPACE;
    if code % ENTITY_SPACE == REFUND_MARKER {
        OrderKind::BookingRefund { booking_id }
    } else {
        OrderKind::BookingPayment { booking_id }
    }
}

/// Encode a booking payment code. `disambiguator` must be in `0..=999_998`;
/// use [`random_disambiguator`] for fresh codes.
pub fn booking_payment(booking_id: i64, disambiguator: i64) -> i64 {
    debug_assert!((0..REFUND_MARKER).contains(&disambiguator));
    booking_id * ENTITY_SPACE + disambiguator
}

/// Encode the refund payment code for a booking (one fixed code per booking)
pub fn booking_refund(booking_id: i64) -> i64 {
    booking_id * ENTITY_SPACE + REFUND_MARKER
}

/// Encode a package purchase code. `package_id` must be >= 1.
pub fn package_purchase(host_id: i64, package_id: i64, disambiguator: i64) -> i64 {
    debug_assert!(package_id >= 1);
    debug_assert!((0..ENTITY_SPACE).contains(&disambiguator));
    host_id * PACKAGE_SPACE + package_id * ENTITY_SPACE + disambiguator
}

/// Encode the package refund code for a host
pub fn package_refund(host_id: i64) -> i64 {
    host_id * PACKAGE_SPACE + PACKAGE_REFUND_MARKER
}

/// Fresh random disambiguator, never equal to [`REFUND_MARKER`]
pub fn random_disambiguator() -> i64 {
    use rand::Rng;
    rand::thread_rng().gen_range(0..REFUND_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_payment_roundtrip() {
        let code = booking_payment(42, 123_456);
        assert_eq!(code, 42_123_456);
        assert_eq!(decode(code), OrderKind::BookingPayment { booking_id: 42 });
    }

    #[test]
    fn test_booking_refund_roundtrip() {
        let code = booking_refund(42);
        assert_eq!(code, 42_999_999);
        assert_eq!(decode(code), OrderKind::BookingRefund { booking_id: 42 });
    }

    #[test]
    fn test_refund_marker_boundary() {
        // r = 999_998 is still a payment; 999_999 is the refund marker
        assert_eq!(
            decode(booking_payment(7, 999_998)),
            OrderKind::BookingPayment { booking_id: 7 }
        );
        assert_eq!(decode(7_999_999), OrderKind::BookingRefund { booking_id: 7 });
    }

    #[test]
    fn test_package_purchase_roundtrip() {
        let code = package_purchase(3, 2, 555);
        assert_eq!(code, 3_002_000_555);
        assert_eq!(
            decode(code),
            OrderKind::PackagePurchase {
                host_id: 3,
                package_id: 2
            }
        );
    }

    #[test]
    fn test_package_refund_roundtrip() {
        let code = package_refund(3);
        assert_eq!(code, 3_000_888_888);
        assert_eq!(decode(code), OrderKind::PackageRefund { host_id: 3 });
    }

    #[test]
    fn test_package_space_boundary() {
        // Largest booking-space code decodes as a booking payment
        assert_eq!(
            decode(PACKAGE_SPACE - 1),
            OrderKind::BookingPayment { booking_id: 999 }
        );
        // First package-space code has host 1, no package id, not the marker
        assert_eq!(decode(PACKAGE_SPACE), OrderKind::Unrecognized);
    }

    #[test]
    fn test_unrecognized_codes() {
        assert_eq!(decode(0), OrderKind::Unrecognized);
        assert_eq!(decode(-5), OrderKind::Unrecognized);
        assert_eq!(decode(999_999), OrderKind::Unrecognized);
        // Package space, package id 0, disambiguator that is not the marker
        assert_eq!(decode(2_000_000_001), OrderKind::Unrecognized);
    }

    #[test]
    fn test_random_disambiguator_never_refund_marker() {
        for _ in 0..1000 {
            let r = random_disambiguator();
            assert!((0..REFUND_MARKER).contains(&r));
        }
    }
}
