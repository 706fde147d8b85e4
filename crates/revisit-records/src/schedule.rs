use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::error::ValidationError;

/// Sub-second digits kept on every stored timestamp, so a date survives a
/// round trip through either backend unchanged.
pub const TIMESTAMP_PRECISION: u16 = 6;

/// A new revision cadence together with the due date it implies.
///
/// The two are only ever written together, which is what keeps
/// `next_revision_date` from being edited independently of the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reschedule {
    pub interval_days: u32,
    pub next_revision_date: DateTime<Utc>,
}

/// Compute the next revision date for `interval_days`, anchored at `now`.
///
/// The previous due date plays no part: editing the interval twice in a row
/// schedules relative to the second edit, not cumulatively.
///
/// Returns `None` when the result falls outside chrono's representable range.
pub fn next_revision_date(now: DateTime<Utc>, interval_days: u32) -> Option<DateTime<Utc>> {
    now.checked_add_signed(Duration::days(i64::from(interval_days)))
        .map(normalize)
}

/// Build the field writes for an interval change made at `now`.
pub fn reschedule(interval_days: u32, now: DateTime<Utc>) -> Result<Reschedule, ValidationError> {
    let next_revision_date = next_revision_date(now, interval_days)
        .ok_or(ValidationError::IntervalOutOfRange(interval_days))?;
    Ok(Reschedule {
        interval_days,
        next_revision_date,
    })
}

/// A record is due once its revision date is at or before `now`.
pub fn is_due(next_revision_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    next_revision_date <= now
}

/// Truncate to the stored precision.
pub fn normalize(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(TIMESTAMP_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn adds_whole_days_to_now() {
        let now = at(2026, 3, 1, 9);
        assert_eq!(next_revision_date(now, 7), Some(at(2026, 3, 8, 9)));
    }

    #[test]
    fn zero_interval_is_due_immediately() {
        let now = at(2026, 3, 1, 9);
        let next = next_revision_date(now, 0).unwrap();
        assert_eq!(next, now);
        assert!(is_due(next, now));
    }

    #[test]
    fn crosses_month_and_year_boundaries() {
        assert_eq!(
            next_revision_date(at(2026, 12, 20, 0), 30),
            Some(at(2027, 1, 19, 0))
        );
    }

    #[test]
    fn reschedule_pairs_interval_with_date() {
        let now = at(2026, 5, 10, 12);
        let r = reschedule(16, now).unwrap();
        assert_eq!(r.interval_days, 16);
        assert_eq!(r.next_revision_date, at(2026, 5, 26, 12));
    }

    #[test]
    fn absurd_interval_is_rejected_not_panicking() {
        let err = reschedule(u32::MAX, Utc::now()).unwrap_err();
        assert_eq!(err, ValidationError::IntervalOutOfRange(u32::MAX));
    }

    #[test]
    fn due_check_is_inclusive() {
        let now = at(2026, 1, 1, 0);
        assert!(is_due(now, now));
        assert!(!is_due(now + Duration::seconds(1), now));
    }

    #[test]
    fn normalize_drops_nanoseconds() {
        let precise = at(2026, 1, 1, 0) + Duration::nanoseconds(1_234_567);
        assert_eq!(
            normalize(precise),
            at(2026, 1, 1, 0) + Duration::microseconds(1_234)
        );
    }
}
