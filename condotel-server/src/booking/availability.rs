//! Availability checker
//!
//! Pure overlap predicate plus a locked-read query. Check-in is fixed at
//! 14:00 and check-out at 12:00, so a stay ending and a stay starting on the
//! same day never conflict (same-day turnover).

use chrono::NaiveDate;
use shared::models::{StatusAliases, check_in_instant, check_out_instant};

use crate::db::{self, PgTx};

/// Two stays conflict iff `new_in < existing_out AND new_out > existing_in`
/// at the fixed 14:00/12:00 instants.
pub fn overlaps(
    new_check_in: NaiveDate,
    new_check_out: NaiveDate,
    existing_check_in: NaiveDate,
    existing_check_out: NaiveDate,
) -> bool {
    check_in_instant(new_check_in) < check_out_instant(existing_check_out)
        && check_out_instant(new_check_out) > check_in_instant(existing_check_in)
}

/// Whether the unit is free for `[check_in, check_out)`.
///
/// Runs inside the caller's transaction and takes locked reads of every
/// blocking booking for the unit (Pending included — the first attempt
/// claims the dates the instant it is persisted). No side effects; callers
/// decide the resulting error.
pub async fn is_available(
    tx: &mut PgTx<'_>,
    aliases: &StatusAliases,
    condotel_id: i64,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude_booking_id: Option<i64>,
    today: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let stays =
        db::bookings::lock_blocking_stays(tx, aliases, condotel_id, today, exclude_booking_id)
            .await?;

    Ok(stays
        .iter()
        .all(|s| !overlaps(check_in, check_out, s.start_date, s.end_date)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
    }

    #[test]
    fn test_same_day_turnover_allowed() {
        // Existing guest checks out at 12:00, new guest checks in at 14:00
        assert!(!overlaps(d(12), d(15), d(10), d(12)));
        assert!(!overlaps(d(10), d(12), d(12), d(15)));
    }

    #[test]
    fn test_plain_overlap() {
        assert!(overlaps(d(11), d(13), d(10), d(12)));
        assert!(overlaps(d(10), d(12), d(11), d(13)));
    }

    #[test]
    fn test_containment() {
        assert!(overlaps(d(10), d(20), d(12), d(14)));
        assert!(overlaps(d(12), d(14), d(10), d(20)));
    }

    #[test]
    fn test_identical_interval() {
        assert!(overlaps(d(10), d(12), d(10), d(12)));
    }

    #[test]
    fn test_disjoint() {
        assert!(!overlaps(d(1), d(5), d(10), d(12)));
        assert!(!overlaps(d(13), d(15), d(10), d(12)));
    }
}
