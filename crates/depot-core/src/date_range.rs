//! # Date Range Builder
//!
//! Turns the two `YYYY-MM-DD` inputs of a report filter into the half-open
//! instant interval the backend is queried with.
//!
//! ## Shape
//! ```text
//!   from = 2025-01-01                    to = 2025-01-03
//!        │                                    │
//!        ▼                                    ▼
//!   [ 2025-01-01 00:00 local ......... 2025-01-04 00:00 local )
//!     start (inclusive)                  end (exclusive)
//! ```
//!
//! Both ends are local midnights converted to UTC, so a sale at 23:59:59 on
//! the `to` day is inside and one at 00:00:00 the day after is not. No
//! `from <= to` check is made: an inverted range is legal and simply matches
//! nothing.

use chrono::{
    DateTime, Days, FixedOffset, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta,
    TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ReportError, ReportResult};

/// Input format for report days.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Report Zone
// =============================================================================

/// The calendar a report's days are interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportZone {
    /// The machine's local time zone, DST included.
    #[default]
    Local,
    /// A fixed UTC offset, for running the console away from the shop.
    Fixed(FixedOffset),
}

impl ReportZone {
    /// Parses `local`, `utc`, or an offset like `-03:00` / `+0530`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        match input.to_lowercase().as_str() {
            "local" | "" => return Some(ReportZone::Local),
            "utc" | "z" => return Some(ReportZone::Fixed(FixedOffset::east_opt(0)?)),
            _ => {}
        }

        let (sign, rest) = match input.as_bytes().first()? {
            b'+' => (1, &input[1..]),
            b'-' => (-1, &input[1..]),
            _ => return None,
        };
        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None if rest.len() == 4 && rest.is_ascii() => rest.split_at(2),
            None => (rest, "0"),
        };
        let all_digits =
            |s: &str| (1..=2).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(hours) || !all_digits(minutes) {
            return None;
        }
        let hours: i32 = hours.parse().ok()?;
        let minutes: i32 = minutes.parse().ok()?;
        if minutes >= 60 {
            return None;
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(ReportZone::Fixed)
    }

    /// The first instant of `day` in this calendar.
    ///
    /// A midnight that falls in a DST gap resolves to the first valid local
    /// time after it; an ambiguous midnight resolves to the earlier instant.
    pub fn start_of_day(&self, day: NaiveDate) -> Option<DateTime<Utc>> {
        let midnight = day.and_hms_opt(0, 0, 0)?;
        match self {
            ReportZone::Fixed(offset) => resolve_forward(offset, midnight),
            ReportZone::Local => resolve_forward(&Local, midnight),
        }
    }

    /// Today's date in this calendar.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            ReportZone::Fixed(offset) => now.with_timezone(offset).date_naive(),
            ReportZone::Local => now.with_timezone(&Local).date_naive(),
        }
    }

    /// Formats a timestamp as `YYYY-MM-DD HH:MM:SS` wall time in this
    /// calendar.
    pub fn format_timestamp(&self, ts: &DateTime<FixedOffset>) -> String {
        const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
        match self {
            ReportZone::Fixed(offset) => ts.with_timezone(offset).format(FORMAT).to_string(),
            ReportZone::Local => ts.with_timezone(&Local).format(FORMAT).to_string(),
        }
    }
}

impl fmt::Display for ReportZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportZone::Local => f.write_str("local"),
            ReportZone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Walks forward in 15 minute steps until the wall time exists. Every DST
/// gap in use is a multiple of 15 minutes and shorter than three hours.
fn resolve_forward<Tz: TimeZone>(tz: &Tz, wall: NaiveDateTime) -> Option<DateTime<Utc>> {
    (0..=12).find_map(|step| {
        let candidate = wall.checked_add_signed(TimeDelta::minutes(15 * step))?;
        tz.from_local_datetime(&candidate)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
    })
}

/// Parses one side of a range. `field` names it in the error.
pub fn parse_day(field: &str, input: &str) -> ReportResult<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ReportError::invalid_day(field, input));
    }
    NaiveDate::parse_from_str(trimmed, DAY_FORMAT).map_err(|_| ReportError::invalid_day(field, input))
}

// =============================================================================
// Date Range
// =============================================================================

/// A half-open instant interval covering whole calendar days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Builds the range from the two filter inputs.
    ///
    /// ## Errors
    /// `InvalidRange` when either input is empty or not a real
    /// `YYYY-MM-DD` day.
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::date_range::{DateRange, ReportZone};
    ///
    /// let inverted = DateRange::build("2025-01-02", "2025-01-01", ReportZone::Local).unwrap();
    /// assert!(inverted.is_empty());
    /// assert!(DateRange::build("", "2025-01-01", ReportZone::Local).is_err());
    /// ```
    pub fn build(from: &str, to: &str, zone: ReportZone) -> ReportResult<Self> {
        let from = parse_day("from", from)?;
        let to = parse_day("to", to)?;
        Self::from_days(from, to, zone)
    }

    /// Builds the range from already parsed days.
    pub fn from_days(from: NaiveDate, to: NaiveDate, zone: ReportZone) -> ReportResult<Self> {
        let out_of_range = || ReportError::InvalidRange(format!("{from}..{to} is outside the calendar"));

        let start = zone.start_of_day(from).ok_or_else(out_of_range)?;
        let day_after = to.succ_opt().ok_or_else(out_of_range)?;
        let end = zone.start_of_day(day_after).ok_or_else(out_of_range)?;

        Ok(DateRange {
            from,
            to,
            start,
            end,
        })
    }

    /// First day, inclusive.
    pub fn from_day(&self) -> NaiveDate {
        self.from
    }

    /// Last day, inclusive.
    pub fn to_day(&self) -> NaiveDate {
        self.to
    }

    /// First instant, inclusive.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// First instant after the range.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// True when no instant can fall inside (inverted ranges).
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// `2025-01-01..2025-01-07`
impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

// =============================================================================
// Presets
// =============================================================================

/// Period shortcuts offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Today,
    Yesterday,
    /// Today and the six days before it.
    Last7Days,
}

impl Preset {
    /// Inclusive first and last day relative to `today`.
    pub fn days(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Preset::Today => Some((today, today)),
            Preset::Yesterday => {
                let yesterday = today.pred_opt()?;
                Some((yesterday, yesterday))
            }
            Preset::Last7Days => Some((today.checked_sub_days(Days::new(6))?, today)),
        }
    }

    pub fn range(&self, today: NaiveDate, zone: ReportZone) -> ReportResult<DateRange> {
        let (from, to) = self
            .days(today)
            .ok_or_else(|| ReportError::InvalidRange(format!("{self} before {today} is outside the calendar")))?;
        DateRange::from_days(from, to, zone)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Preset::Today => "Today",
            Preset::Yesterday => "Yesterday",
            Preset::Last7Days => "Last 7 days",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Preset::Today => "today",
            Preset::Yesterday => "yesterday",
            Preset::Last7Days => "7d",
        })
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Preset::Today),
            "yesterday" => Ok(Preset::Yesterday),
            "7d" | "week" | "last7days" => Ok(Preset::Last7Days),
            other => Err(format!("unknown period '{other}' (expected today, yesterday or 7d)")),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn brt() -> ReportZone {
        ReportZone::Fixed(FixedOffset::west_opt(3 * 3600).unwrap())
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DAY_FORMAT).unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_single_day_range_in_fixed_zone() {
        let range = DateRange::build("2025-01-01", "2025-01-01", brt()).unwrap();
        assert_eq!(range.start(), utc("2025-01-01T03:00:00Z"));
        assert_eq!(range.end(), utc("2025-01-02T03:00:00Z"));
        assert!(range.contains(utc("2025-01-01T23:59:00-03:00")));
        assert!(!range.contains(utc("2025-01-02T00:00:00-03:00")));
        assert!(!range.contains(utc("2024-12-31T23:59:59-03:00")));
        assert_eq!(range.to_string(), "2025-01-01..2025-01-01");
    }

    #[test]
    fn test_inverted_range_is_legal_and_empty() {
        let range = DateRange::build("2025-01-02", "2025-01-01", brt()).unwrap();
        assert!(range.is_empty());
        assert!(!range.contains(utc("2025-01-01T12:00:00-03:00")));
        assert!(!range.contains(utc("2025-01-02T12:00:00-03:00")));
    }

    #[test]
    fn test_empty_or_malformed_inputs_are_invalid() {
        for (from, to) in [
            ("", "2025-01-01"),
            ("2025-01-01", ""),
            ("   ", "2025-01-01"),
            ("2025-13-01", "2025-01-01"),
            ("01/01/2025", "2025-01-01"),
            ("2025-02-30", "2025-03-01"),
        ] {
            let err = DateRange::build(from, to, brt()).unwrap_err();
            assert!(matches!(err, ReportError::InvalidRange(_)), "{from:?}..{to:?}");
        }
    }

    #[test]
    fn test_local_zone_range_covers_whole_days() {
        let range = DateRange::build("2025-03-10", "2025-03-11", ReportZone::Local).unwrap();
        assert!(range.start() < range.end());
        let span = range.end() - range.start();
        // Two calendar days, give or take one DST shift
        assert!(span >= TimeDelta::hours(47) && span <= TimeDelta::hours(49));
    }

    #[test]
    fn test_zone_parse() {
        assert_eq!(ReportZone::parse("local"), Some(ReportZone::Local));
        assert_eq!(ReportZone::parse("-03:00"), Some(brt()));
        assert_eq!(ReportZone::parse("-0300"), Some(brt()));
        assert_eq!(ReportZone::parse("-3"), Some(brt()));
        assert_eq!(
            ReportZone::parse("UTC"),
            Some(ReportZone::Fixed(FixedOffset::east_opt(0).unwrap()))
        );
        assert_eq!(ReportZone::parse("+05:75"), None);
        assert_eq!(ReportZone::parse("brasilia"), None);
        assert_eq!(ReportZone::parse("+-3"), None);
        assert_eq!(ReportZone::parse("-+03:00"), None);
        assert_eq!(ReportZone::parse("-03:+5"), None);
        assert_eq!(ReportZone::parse("+aé1"), None);
        assert_eq!(ReportZone::parse("+"), None);
        assert_eq!(ReportZone::parse("+999999"), None);
    }

    #[test]
    fn test_format_timestamp_in_zone() {
        let ts = DateTime::parse_from_rfc3339("2025-01-02T02:59:00Z").unwrap();
        assert_eq!(brt().format_timestamp(&ts), "2025-01-01 23:59:00");
    }

    #[test]
    fn test_today_in_zone() {
        let now = utc("2025-01-02T01:00:00Z");
        assert_eq!(brt().today(now), day("2025-01-01"));
    }

    #[test]
    fn test_presets() {
        let today = day("2025-01-10");
        assert_eq!(Preset::Today.days(today), Some((today, today)));
        assert_eq!(
            Preset::Yesterday.days(today),
            Some((day("2025-01-09"), day("2025-01-09")))
        );
        assert_eq!(
            Preset::Last7Days.days(today),
            Some((day("2025-01-04"), today))
        );

        let week = Preset::Last7Days.range(today, brt()).unwrap();
        assert_eq!(week.start(), utc("2025-01-04T03:00:00Z"));
        assert_eq!(week.end(), utc("2025-01-11T03:00:00Z"));

        assert_eq!("7d".parse::<Preset>().unwrap(), Preset::Last7Days);
        assert!("month".parse::<Preset>().is_err());
    }

    proptest! {
        #[test]
        fn prop_range_covers_to_day_and_excludes_next(
            from_offset in 0i64..2000,
            len in 0i64..60,
            zone_minutes in -720i32..=840i32,
        ) {
            let zone = ReportZone::Fixed(FixedOffset::east_opt(zone_minutes * 60).unwrap());
            let from = day("2020-01-01") + TimeDelta::days(from_offset);
            let to = from + TimeDelta::days(len);
            let range = DateRange::from_days(from, to, zone).unwrap();

            let last_minute = zone.start_of_day(to).unwrap() + TimeDelta::minutes(24 * 60 - 1);
            let next_day = zone.start_of_day(to.succ_opt().unwrap()).unwrap();

            prop_assert!(range.contains(range.start()));
            prop_assert!(range.contains(last_minute));
            prop_assert!(!range.contains(next_day));
            prop_assert_eq!(range.end(), next_day);
        }

        #[test]
        fn prop_inverted_ranges_match_nothing(
            to_offset in 0i64..2000,
            gap in 1i64..30,
            probe in 0i64..(90 * 24 * 60),
        ) {
            let to = day("2020-01-01") + TimeDelta::days(to_offset);
            let from = to + TimeDelta::days(gap);
            let range = DateRange::from_days(from, to, brt()).unwrap();
            let instant = utc("2019-12-01T00:00:00Z") + TimeDelta::minutes(probe) + TimeDelta::days(to_offset);
            prop_assert!(!range.contains(instant));
        }
    }
}
