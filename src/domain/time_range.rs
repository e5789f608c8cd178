// Time ranges, sample predicates and calendar day helpers
use super::sample::Sample;
use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};

/// Caller-supplied query window. `from <= to` is expected but not checked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Strict containment: `start >= from` and `end <= to`
    pub fn contains_interval(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start >= self.from && end <= self.to
    }
}

/// Boundary condition for sample queries.
///
/// Only strict containment exists: a sample that overlaps either edge of the
/// range is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePredicate {
    range: TimeRange,
}

impl SamplePredicate {
    pub fn strict(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            range: TimeRange::new(from, to),
        }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn matches(&self, sample: &Sample) -> bool {
        self.range.contains_interval(sample.start(), sample.end())
    }
}

/// Midnight at the start of the instant's calendar day in its own time zone
pub fn start_of_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Tz> {
    let midnight = instant.date_naive().and_time(NaiveTime::MIN);
    first_valid_instant(&instant.timezone(), midnight).unwrap_or_else(|| instant.clone())
}

/// Midnight `days` calendar days after (or before) the given day start
pub fn add_days<Tz: TimeZone>(day_start: &DateTime<Tz>, days: i64) -> Option<DateTime<Tz>> {
    let date = day_start
        .date_naive()
        .checked_add_signed(TimeDelta::try_days(days)?)?;
    first_valid_instant(&day_start.timezone(), date.and_time(NaiveTime::MIN))
}

/// `time` on the calendar day of `day`, in the day's own zone. A wall-clock
/// time skipped by a DST change moves forward to the first one that exists.
pub fn at_time_of_day<Tz: TimeZone>(
    day: &DateTime<Tz>,
    time: NaiveTime,
) -> Option<DateTime<Tz>> {
    first_valid_instant(&day.timezone(), day.date_naive().and_time(time))
}

/// Local calendar day containing `now`, as `[midnight, next midnight]`
pub fn day_range(now: &DateTime<Local>) -> TimeRange {
    let from = start_of_day(now);
    let to = add_days(&from, 1).unwrap_or(*now);
    TimeRange::new(from.with_timezone(&Utc), to.with_timezone(&Utc))
}

// Midnight can fall inside a DST gap in some zones; take the first hour that exists.
fn first_valid_instant<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    (0..=2).find_map(|hours| {
        tz.from_local_datetime(&(naive + TimeDelta::hours(hours)))
            .earliest()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::data_type::TypeToken;
    use crate::domain::quantity::{Quantity, Unit};
    use chrono::{FixedOffset, Timelike};

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 14, hour, minute, second).unwrap()
    }

    fn heart_rate(start: DateTime<Utc>, end: DateTime<Utc>) -> Sample {
        Sample::quantity(
            TypeToken::new("quantity.heart_rate"),
            start,
            end,
            Quantity::new(64.0, Unit::CountPerMinute),
        )
    }

    #[test]
    fn test_strict_predicate_admits_contained_samples() {
        let predicate = SamplePredicate::strict(at(8, 0, 0), at(9, 0, 0));

        assert!(predicate.matches(&heart_rate(at(8, 0, 0), at(8, 0, 0))));
        assert!(predicate.matches(&heart_rate(at(8, 30, 0), at(8, 31, 0))));
        assert!(predicate.matches(&heart_rate(at(8, 59, 0), at(9, 0, 0))));
    }

    #[test]
    fn test_strict_predicate_rejects_boundary_overlap() {
        let predicate = SamplePredicate::strict(at(8, 0, 0), at(9, 0, 0));
        let instant = TimeDelta::nanoseconds(1);

        // starts one instant before `from`
        assert!(!predicate.matches(&heart_rate(at(8, 0, 0) - instant, at(8, 5, 0))));
        // ends one instant after `to`
        assert!(!predicate.matches(&heart_rate(at(8, 55, 0), at(9, 0, 0) + instant)));
        // spans the whole range
        assert!(!predicate.matches(&heart_rate(at(7, 0, 0), at(10, 0, 0))));
    }

    #[test]
    fn test_start_of_day_in_fixed_zone() {
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let instant = zone.with_ymd_and_hms(2025, 1, 14, 0, 30, 0).unwrap();

        let midnight = start_of_day(&instant);
        assert_eq!(midnight, zone.with_ymd_and_hms(2025, 1, 14, 0, 0, 0).unwrap());
        // the same instant in UTC still belongs to the previous day
        assert_eq!(
            start_of_day(&instant.with_timezone(&Utc)),
            Utc.with_ymd_and_hms(2025, 1, 13, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_add_days_steps_calendar_days() {
        let zone = FixedOffset::west_opt(5 * 3600).unwrap();
        let midnight = zone.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();

        assert_eq!(
            add_days(&midnight, 1),
            Some(zone.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            add_days(&midnight, -31),
            Some(zone.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_at_time_of_day_keeps_wall_clock() {
        let zone = FixedOffset::east_opt(3600).unwrap();
        let midnight = zone.with_ymd_and_hms(2025, 3, 30, 0, 0, 0).unwrap();
        let time = NaiveTime::from_hms_opt(18, 15, 0).unwrap();

        assert_eq!(
            at_time_of_day(&midnight, time),
            Some(zone.with_ymd_and_hms(2025, 3, 30, 18, 15, 0).unwrap())
        );
    }

    #[test]
    fn test_day_range_spans_local_day() {
        let now = Local.with_ymd_and_hms(2025, 1, 14, 15, 45, 0).unwrap();
        let range = day_range(&now);

        let from = range.from.with_timezone(&Local);
        assert_eq!((from.hour(), from.minute()), (0, 0));
        assert!(range.from <= now.with_timezone(&Utc));
        assert!(range.to > now.with_timezone(&Utc));
    }
}
