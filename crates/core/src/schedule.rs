//! End-time derivation for booked time slots.
//!
//! Boarding, grooming and training each name their slot lengths differently.
//! A known label fixes the end time relative to the start. Any other label
//! (conventionally `custom`) means the caller supplies the end time.

use chrono::{DateTime, Duration, Utc};

use crate::types::ScheduleKind;

/// Errors raised when a slot cannot be resolved.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("duration '{0}' needs an explicit end_time")]
    MissingEndTime(String),
    #[error("end_time must be after start_time")]
    EndBeforeStart,
}

/// Fixed length for a duration label, or `None` when the caller sets the end.
#[must_use]
pub fn fixed_length(kind: ScheduleKind, duration: &str) -> Option<Duration> {
    match (kind, duration) {
        (ScheduleKind::Boarding, "overnight") => Some(Duration::hours(12)),
        (ScheduleKind::Boarding, "weekday") => Some(Duration::days(5)),
        (ScheduleKind::Boarding, "weekend") => Some(Duration::days(2)),
        (ScheduleKind::Boarding, "day") => Some(Duration::hours(8)),

        (ScheduleKind::Grooming, "express") => Some(Duration::minutes(30)),
        (ScheduleKind::Grooming, "standard") => Some(Duration::hours(1)),
        (ScheduleKind::Grooming, "full") => Some(Duration::hours(2)),
        (ScheduleKind::Grooming, "spa") => Some(Duration::hours(3)),

        (ScheduleKind::Training, "session") => Some(Duration::hours(1)),
        (ScheduleKind::Training, "half_day") => Some(Duration::hours(4)),
        (ScheduleKind::Training, "full_day") => Some(Duration::hours(8)),
        (ScheduleKind::Training, "week") => Some(Duration::days(7)),

        _ => None,
    }
}

/// Boarding end time.
///
/// `overnight` is 12 hours, `weekday` 5 days, `weekend` 2 days and `day`
/// 8 hours after `start`. Any other label returns `end` unchanged.
#[must_use]
pub fn boarding_end_time(
    duration: &str,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    fixed_length(ScheduleKind::Boarding, duration).map_or(end, |length| Some(start + length))
}

/// Resolve the end of a slot for any scheduling kind.
///
/// # Errors
///
/// [`ScheduleError::MissingEndTime`] when the label has no fixed length and no
/// `end` was given. [`ScheduleError::EndBeforeStart`] when a caller-supplied
/// end is not after `start`.
pub fn end_time(
    kind: ScheduleKind,
    duration: &str,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<DateTime<Utc>, ScheduleError> {
    if let Some(length) = fixed_length(kind, duration) {
        return Ok(start + length);
    }

    let end = end.ok_or_else(|| ScheduleError::MissingEndTime(duration.to_owned()))?;
    if end <= start {
        return Err(ScheduleError::EndBeforeStart);
    }
    Ok(end)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn test_boarding_table() {
        let t = start();
        let end = Some(t + Duration::hours(99));

        assert_eq!(boarding_end_time("overnight", t, end), Some(t + Duration::hours(12)));
        assert_eq!(boarding_end_time("weekday", t, end), Some(t + Duration::days(5)));
        assert_eq!(boarding_end_time("weekend", t, end), Some(t + Duration::days(2)));
        assert_eq!(boarding_end_time("day", t, end), Some(t + Duration::hours(8)));
    }

    #[test]
    fn test_boarding_passes_through_other_labels() {
        let t = start();
        let end = Some(t + Duration::hours(30));

        assert_eq!(boarding_end_time("custom", t, end), end);
        assert_eq!(boarding_end_time("fortnight", t, end), end);
        assert_eq!(boarding_end_time("Overnight", t, end), end);
        assert_eq!(boarding_end_time("custom", t, None), None);
    }

    #[test]
    fn test_fixed_labels_ignore_caller_end() {
        let t = start();
        let bogus = Some(t - Duration::days(1));

        assert_eq!(
            end_time(ScheduleKind::Grooming, "spa", t, bogus),
            Ok(t + Duration::hours(3))
        );
        assert_eq!(
            end_time(ScheduleKind::Training, "week", t, bogus),
            Ok(t + Duration::days(7))
        );
    }

    #[test]
    fn test_labels_are_scoped_to_their_kind() {
        // "overnight" is a boarding label only
        assert!(fixed_length(ScheduleKind::Grooming, "overnight").is_none());
        assert!(fixed_length(ScheduleKind::Boarding, "spa").is_none());
    }

    #[test]
    fn test_custom_requires_valid_end() {
        let t = start();

        assert_eq!(
            end_time(ScheduleKind::Training, "custom", t, None),
            Err(ScheduleError::MissingEndTime("custom".to_owned()))
        );
        assert_eq!(
            end_time(ScheduleKind::Boarding, "custom", t, Some(t)),
            Err(ScheduleError::EndBeforeStart)
        );
        assert_eq!(
            end_time(ScheduleKind::Boarding, "custom", t, Some(t + Duration::days(3))),
            Ok(t + Duration::days(3))
        );
    }
}
