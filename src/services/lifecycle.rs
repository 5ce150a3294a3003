//! Equipment use-life math.
//!
//! A piece of equipment expires a fixed number of months after it is
//! assigned, and is due for renewal the day after it expires. Remaining
//! life is counted in whole days, rounding partial days up, and never
//! goes negative.

use chrono::{DateTime, Days, Months, Utc};

use crate::errors::ServiceError;

const SECONDS_PER_DAY: i64 = 86_400;

/// Expiration date for equipment assigned at `assigned_at` with a use
/// life of `use_life_months` months.
pub fn expiration_date(
    assigned_at: DateTime<Utc>,
    use_life_months: i32,
) -> Result<DateTime<Utc>, ServiceError> {
    if use_life_months < 0 {
        return Err(ServiceError::ValidationError(format!(
            "Use life must not be negative, got {} months",
            use_life_months
        )));
    }
    assigned_at
        .checked_add_months(Months::new(use_life_months as u32))
        .ok_or_else(|| {
            ServiceError::ValidationError("Use life overflows the calendar".to_string())
        })
}

/// Renewal date, one day after expiration.
pub fn renewal_date(expiration: DateTime<Utc>) -> Result<DateTime<Utc>, ServiceError> {
    expiration.checked_add_days(Days::new(1)).ok_or_else(|| {
        ServiceError::ValidationError("Renewal date overflows the calendar".to_string())
    })
}

/// Whole days of use life remaining at `now`, rounding partial days up.
/// Already-expired equipment reports zero.
pub fn remaining_life_days(expiration: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (expiration - now).num_seconds();
    if secs <= 0 {
        return 0;
    }
    (secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn expiration_adds_calendar_months() {
        let exp = expiration_date(at(2025, 1, 15), 6).unwrap();
        assert_eq!(exp, at(2025, 7, 15));
    }

    #[test]
    fn expiration_clamps_to_month_end() {
        // Jan 31 + 1 month lands on Feb 28 in a non-leap year
        let exp = expiration_date(at(2025, 1, 31), 1).unwrap();
        assert_eq!(exp, at(2025, 2, 28));
    }

    #[test]
    fn zero_month_use_life_expires_immediately() {
        let assigned = at(2025, 3, 1);
        assert_eq!(expiration_date(assigned, 0).unwrap(), assigned);
    }

    #[test]
    fn negative_use_life_is_rejected() {
        assert!(expiration_date(at(2025, 3, 1), -1).is_err());
    }

    #[test]
    fn renewal_is_the_day_after_expiration() {
        let exp = at(2025, 7, 15);
        assert_eq!(renewal_date(exp).unwrap(), at(2025, 7, 16));
    }

    #[test]
    fn remaining_life_rounds_partial_days_up() {
        let now = at(2025, 1, 1);
        let expiration = now + chrono::Duration::hours(25);
        assert_eq!(remaining_life_days(expiration, now), 2);
        let expiration = now + chrono::Duration::hours(24);
        assert_eq!(remaining_life_days(expiration, now), 1);
        let expiration = now + chrono::Duration::minutes(1);
        assert_eq!(remaining_life_days(expiration, now), 1);
    }

    #[test]
    fn expired_equipment_reports_zero_days() {
        let now = at(2025, 6, 1);
        assert_eq!(remaining_life_days(at(2025, 5, 1), now), 0);
        assert_eq!(remaining_life_days(now, now), 0);
    }
}
