//! Reading submitted visit times and export bounds, and rendering them back.
//!
//! Naive values (no offset) are read as wall-clock time in the reporting
//! timezone. Everything is stored as UTC.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// How far back to look for the offset in force before a skipped hour.
const GAP_SEARCH_MINUTES: i64 = 26 * 60;

/// Which edge of a calendar day a bare date stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEdge {
    Start,
    End,
}

/// Parses a submitted `visitingDateTime`. Returns `None` when unreadable.
pub fn parse_visit_time(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    parse_with_edge(raw, tz, DayEdge::Start)
}

/// Parses an export bound. A bare date used with `DayEdge::End` covers the
/// whole local day.
pub fn parse_bound(raw: &str, tz: Tz, edge: DayEdge) -> Option<DateTime<Utc>> {
    parse_with_edge(raw, tz, edge)
}

/// Renders an instant the way the report shows it, e.g. `3/1/2024, 10:00:00 AM`.
pub fn format_for_report(instant: DateTime<Utc>, tz: Tz) -> String {
    instant
        .with_timezone(&tz)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

fn parse_with_edge(raw: &str, tz: Tz, edge: DayEdge) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return local_to_utc(tz, naive);
    }

    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()?;
    match edge {
        DayEdge::Start => local_to_utc(tz, date.and_time(NaiveTime::MIN)),
        DayEdge::End => {
            let next_day = local_to_utc(tz, date.succ_opt()?.and_time(NaiveTime::MIN))?;
            Some(next_day - Duration::nanoseconds(1))
        }
    }
}

/// Resolves a wall-clock time in `tz`. Repeated times take the earlier
/// instant. Times inside a skipped interval keep the offset in force before
/// the jump, so they land the same distance past the transition.
fn local_to_utc(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(local) | LocalResult::Ambiguous(local, _) => {
            Some(local.with_timezone(&Utc))
        }
        LocalResult::None => {
            let before = (1..=GAP_SEARCH_MINUTES).find_map(|minutes| {
                let earlier = naive.checked_sub_signed(Duration::minutes(minutes))?;
                tz.offset_from_local_datetime(&earlier).earliest()
            })?;
            let offset = i64::from(before.fix().local_minus_utc());
            let utc = naive.checked_sub_signed(Duration::seconds(offset))?;
            Some(Utc.from_utc_datetime(&utc))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_value_is_local_wall_clock() {
        let parsed = parse_visit_time("2024-03-01T10:00", Tz::Asia__Kolkata).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 4, 30, 0).unwrap());
    }

    #[test]
    fn rfc3339_keeps_its_offset() {
        let parsed = parse_visit_time("2024-03-01T10:00:00.000Z", Tz::Asia__Kolkata).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn garbage_and_blank_are_unreadable() {
        assert_eq!(parse_visit_time("next tuesday", Tz::UTC), None);
        assert_eq!(parse_visit_time("   ", Tz::UTC), None);
        assert_eq!(parse_visit_time("2024-02-30", Tz::UTC), None);
    }

    #[test]
    fn bare_date_bounds_cover_the_day() {
        let start = parse_bound("2024-03-01", Tz::UTC, DayEdge::Start).unwrap();
        let end = parse_bound("2024-03-01", Tz::UTC, DayEdge::End).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert!(end > Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap());
        assert!(end < Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn full_timestamp_bound_is_literal() {
        let end = parse_bound("2024-03-01T12:00:00Z", Tz::UTC, DayEdge::End).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn report_format_matches_locale_string() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(format_for_report(instant, Tz::UTC), "3/1/2024, 10:00:00 AM");

        let evening = Utc.with_ymd_and_hms(2024, 12, 15, 18, 5, 9).unwrap();
        assert_eq!(format_for_report(evening, Tz::UTC), "12/15/2024, 6:05:09 PM");
    }

    #[test]
    fn start_of_day_inside_skipped_hour_is_first_valid_instant() {
        // Santiago jumps from 00:00 to 01:00 on 2024-09-08.
        let tz = Tz::America__Santiago;
        let start = parse_bound("2024-09-08", tz, DayEdge::Start).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 9, 8, 4, 0, 0).unwrap());

        let end_of_eve = parse_bound("2024-09-07", tz, DayEdge::End).unwrap();
        assert_eq!(end_of_eve, start - Duration::nanoseconds(1));
    }

    #[test]
    fn wall_clock_inside_skipped_hour_moves_past_it() {
        let parsed = parse_visit_time("2024-09-08T00:30", Tz::America__Santiago).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 9, 8, 4, 30, 0).unwrap());
    }
}
