//! Slot and duration arithmetic.
//!
//! Slots pair a calendar date with a 12-hour clock label ("10:00 am");
//! everything downstream (meeting provisioning, the cancellation fee
//! window, the completion sweep) needs them as UTC instants.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use counsel_core::models::cancellation::CancellationPolicy;
use counsel_core::models::session::Slot;

use crate::error::BookingError;

/// Fallback when a duration label carries no parseable minute count.
pub const DEFAULT_DURATION_MINUTES: u32 = 15;

/// Minutes encoded in a duration label ("Quick - 15min" → 15).
///
/// Takes the first run of digits; anything unparseable falls back to
/// [`DEFAULT_DURATION_MINUTES`].
pub fn duration_minutes(label: &str) -> u32 {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(DEFAULT_DURATION_MINUTES)
}

/// Combine a date and a 12-hour clock label into a UTC instant.
///
/// 12 am maps to hour 0, 12 pm stays hour 12, other pm hours add 12.
pub fn meeting_start(date: NaiveDate, time_label: &str) -> Result<DateTime<Utc>, BookingError> {
    let invalid = || BookingError::InvalidSlotTime(time_label.to_string());

    let (clock, period) = time_label.trim().rsplit_once(' ').ok_or_else(invalid)?;
    let (hours, minutes) = clock.split_once(':').ok_or_else(invalid)?;

    let hour: u32 = hours.trim().parse().map_err(|_| invalid())?;
    let minute: u32 = minutes.trim().parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(invalid());
    }

    let hour = match period.trim().to_ascii_lowercase().as_str() {
        "am" => {
            if hour == 12 {
                0
            } else {
                hour
            }
        }
        "pm" => {
            if hour == 12 {
                12
            } else {
                hour + 12
            }
        }
        _ => return Err(invalid()),
    };

    let naive = date.and_hms_opt(hour, minute, 0).ok_or_else(invalid)?;
    Ok(naive.and_utc())
}

/// UTC start instant of a slot.
pub fn slot_start(slot: &Slot) -> Result<DateTime<Utc>, BookingError> {
    meeting_start(slot.date, &slot.time)
}

/// Fee policy for a cancellation happening at `now` against a session
/// starting at `start`: strictly inside the window means a fee may
/// apply, at the boundary or beyond means no fee.
pub fn cancellation_policy(
    start: DateTime<Utc>,
    now: DateTime<Utc>,
    window_hours: i64,
) -> CancellationPolicy {
    if start - now < Duration::hours(window_hours) {
        CancellationPolicy::FeeMayApply
    } else {
        CancellationPolicy::NoFee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn duration_labels_parse_to_minutes() {
        assert_eq!(duration_minutes("Quick - 15min"), 15);
        assert_eq!(duration_minutes("Regular - 30min"), 30);
        assert_eq!(duration_minutes("Extra - 45min"), 45);
        assert_eq!(duration_minutes("All Access - 60min"), 60);
    }

    #[test]
    fn unrecognized_duration_defaults_to_15() {
        assert_eq!(duration_minutes("Marathon"), 15);
        assert_eq!(duration_minutes(""), 15);
    }

    #[test]
    fn morning_time_stays_put() {
        let start = meeting_start(date(2025, 6, 1), "10:00 am").unwrap();
        assert_eq!(start.to_rfc3339(), "2025-06-01T10:00:00+00:00");
    }

    #[test]
    fn afternoon_hours_shift_by_twelve() {
        let start = meeting_start(date(2025, 6, 1), "2:30 pm").unwrap();
        assert_eq!(start.to_rfc3339(), "2025-06-01T14:30:00+00:00");
    }

    #[test]
    fn midnight_and_noon_edge_cases() {
        let midnight = meeting_start(date(2025, 6, 1), "12:00 am").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2025-06-01T00:00:00+00:00");

        let noon = meeting_start(date(2025, 6, 1), "12:00 pm").unwrap();
        assert_eq!(noon.to_rfc3339(), "2025-06-01T12:00:00+00:00");
    }

    #[test]
    fn uppercase_periods_are_accepted() {
        let start = meeting_start(date(2025, 6, 1), "9:15 PM").unwrap();
        assert_eq!(start.to_rfc3339(), "2025-06-01T21:15:00+00:00");
    }

    #[test]
    fn malformed_labels_are_rejected() {
        for label in ["", "10:00", "25:00 am", "10:75 pm", "ten am", "10:00 xm"] {
            assert!(meeting_start(date(2025, 6, 1), label).is_err(), "{label}");
        }
    }

    #[test]
    fn fee_window_boundary() {
        let now = date(2025, 6, 1).and_hms_opt(10, 0, 0).unwrap().and_utc();

        // Exactly 24 hours out: no fee.
        let exactly = now + Duration::hours(24);
        assert_eq!(
            cancellation_policy(exactly, now, 24),
            CancellationPolicy::NoFee
        );

        // One minute inside the window: a fee may apply.
        let inside = now + Duration::hours(24) - Duration::minutes(1);
        assert_eq!(
            cancellation_policy(inside, now, 24),
            CancellationPolicy::FeeMayApply
        );

        // Beyond the window: no fee.
        let outside = now + Duration::hours(48);
        assert_eq!(
            cancellation_policy(outside, now, 24),
            CancellationPolicy::NoFee
        );
    }
}
