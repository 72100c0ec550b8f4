//! Booking model and status machine

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed check-in time (14:00)
pub const CHECK_IN_HOUR: u32 = 14;
/// Fixed check-out time (12:00)
pub const CHECK_OUT_HOUR: u32 = 12;

/// Booking lifecycle status
///
/// Transitions:
/// - `Pending -> Confirmed` only via the payment reconciliation engine
/// - `Pending -> Cancelled` on customer cancellation or checkout abandonment
/// - `Confirmed -> Cancelled` via the refund workflow, or on a conflict
///   detected at confirmation time
/// - `Confirmed -> InStay -> Completed` driven by an external time-based
///   process
///
/// `Completed` is terminal; `Cancelled` is terminal except for the
/// refund-resubmission sub-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InStay,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Parse from the canonical database string value
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Confirmed" => Some(Self::Confirmed),
            "InStay" => Some(Self::InStay),
            "Completed" => Some(Self::Completed),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Canonical database string representation
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::InStay => "InStay",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Statuses that occupy the unit's calendar (block other bookings)
    pub const fn blocks_availability(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Alias table mapping legacy/localized status strings to canonical statuses.
///
/// Historical rows carry localized values (e.g. "Hoàn thành" for Completed)
/// next to the canonical English ones. The set is explicit and configurable
/// rather than hardcoded at the comparison sites, so parsing and SQL filters
/// stay in agreement.
#[derive(Debug, Clone)]
pub struct StatusAliases {
    entries: Vec<(String, BookingStatus)>,
}

impl StatusAliases {
    /// Alias set covering the known legacy values
    pub fn default_set() -> Self {
        Self {
            entries: vec![
                ("Hoàn thành".to_string(), BookingStatus::Completed),
                ("Đã hủy".to_string(), BookingStatus::Cancelled),
                ("Đã xác nhận".to_string(), BookingStatus::Confirmed),
            ],
        }
    }

    /// Empty alias set (canonical strings only)
    pub fn none() -> Self {
        Self { entries: vec![] }
    }

    /// Register an additional alias
    pub fn with_alias(mut self, alias: impl Into<String>, status: BookingStatus) -> Self {
        self.entries.push((alias.into(), status));
        self
    }

    /// Parse a database value, canonical first, then aliases
    pub fn parse(&self, s: &str) -> Option<BookingStatus> {
        BookingStatus::from_db(s).or_else(|| {
            self.entries
                .iter()
                .find(|(alias, _)| alias == s)
                .map(|(_, status)| *status)
        })
    }

    /// All database values (canonical + aliases) that mean `status`.
    ///
    /// Used to build SQL `= ANY($n)` filters that match legacy rows too.
    pub fn db_values(&self, status: BookingStatus) -> Vec<String> {
        let mut values = vec![status.as_db().to_string()];
        values.extend(
            self.entries
                .iter()
                .filter(|(_, s)| *s == status)
                .map(|(alias, _)| alias.clone()),
        );
        values
    }

    /// Database values for every status that blocks availability
    pub fn blocking_db_values(&self) -> Vec<String> {
        [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::InStay,
            BookingStatus::Completed,
        ]
        .iter()
        .flat_map(|s| self.db_values(*s))
        .collect()
    }
}

/// Booking entity (DB row shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Booking {
    pub id: i64,
    pub condotel_id: i64,
    pub customer_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
    /// Canonical or legacy status string; parse via [`StatusAliases::parse`]
    pub status: String,
    pub promotion_id: Option<i64>,
    pub voucher_id: Option<i64>,
    /// Guest-delegate fields: set when booking on behalf of someone else
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_id_number: Option<String>,
    /// Single-use code minted once on confirmation
    pub check_in_token: Option<String>,
    pub is_paid_to_host: bool,
    pub paid_to_host_at: Option<i64>,
    pub payout_rejected_at: Option<i64>,
    pub payout_rejected_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Booking {
    /// Parsed status, falling back to aliases for legacy rows
    pub fn status(&self, aliases: &StatusAliases) -> Option<BookingStatus> {
        aliases.parse(&self.status)
    }

    /// Number of nights in the stay
    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Occupied interval start: check-in day at 14:00
    pub fn occupancy_start(&self) -> NaiveDateTime {
        check_in_instant(self.start_date)
    }

    /// Occupied interval end: check-out day at 12:00
    pub fn occupancy_end(&self) -> NaiveDateTime {
        check_out_instant(self.end_date)
    }
}

/// Check-in instant for a date (14:00)
pub fn check_in_instant(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(CHECK_IN_HOUR, 0, 0).unwrap())
}

/// Check-out instant for a date (12:00)
pub fn check_out_instant(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(CHECK_OUT_HOUR, 0, 0).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::InStay,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_db(s.as_db()), Some(s));
        }
    }

    #[test]
    fn test_localized_alias_parses() {
        let aliases = StatusAliases::default_set();
        assert_eq!(aliases.parse("Hoàn thành"), Some(BookingStatus::Completed));
        assert_eq!(aliases.parse("Completed"), Some(BookingStatus::Completed));
        assert_eq!(aliases.parse("nonsense"), None);
    }

    #[test]
    fn test_db_values_include_aliases() {
        let aliases = StatusAliases::default_set();
        let values = aliases.db_values(BookingStatus::Completed);
        assert!(values.contains(&"Completed".to_string()));
        assert!(values.contains(&"Hoàn thành".to_string()));
    }

    #[test]
    fn test_blocking_statuses() {
        assert!(BookingStatus::Pending.blocks_availability());
        assert!(BookingStatus::Completed.blocks_availability());
        assert!(!BookingStatus::Cancelled.blocks_availability());
    }
}
