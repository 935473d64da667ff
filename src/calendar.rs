//! Calendar context for the active year
//!
//! Every time-dependent figure in a snapshot is derived from one
//! `CalendarContext`, built from an explicit "now" so callers (and tests) fix
//! the clock instead of reading it mid-computation.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike};

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_WEEK: f64 = 604_800.0;

/// Current local wall-clock time, the default "now" for a snapshot
pub fn local_now() -> NaiveDateTime {
  Local::now().naive_local()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarContext {
  pub now: NaiveDateTime,
  pub today: NaiveDate,
  pub year: i32,
  /// 0 = January
  pub month: u32,
  /// 1-based, Jan 1 = 1
  pub day_of_year: u32,
  pub is_leap_year: bool,
  pub days_in_year: u32,
  pub days_in_month: u32,
}

impl CalendarContext {
  pub fn resolve(now: NaiveDateTime) -> Self {
    let today = now.date();
    let year = today.year();
    let is_leap_year = is_leap_year(year);

    Self {
      now,
      today,
      year,
      month: today.month0(),
      day_of_year: today.ordinal(),
      is_leap_year,
      days_in_year: if is_leap_year { 366 } else { 365 },
      days_in_month: days_in_month(today.month(), is_leap_year),
    }
  }

  pub fn year_start(&self) -> NaiveDate {
    self.today - Duration::days(i64::from(self.day_of_year) - 1)
  }

  /// Most recent Sunday on or before today
  pub fn week_start(&self) -> NaiveDate {
    self.today - Duration::days(i64::from(self.today.weekday().num_days_from_sunday()))
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    date.year() == self.year
  }

  /// Whole weeks from now until midnight starting Dec 31, never less than 1
  pub fn weeks_left(&self) -> u32 {
    let days_to_dec_31 = i64::from(self.days_in_year - self.day_of_year);
    let seconds = days_to_dec_31 * SECONDS_PER_DAY - i64::from(self.now.num_seconds_from_midnight());
    let weeks = (seconds as f64 / SECONDS_PER_WEEK).ceil();

    if weeks < 1.0 {
      1
    } else {
      weeks as u32
    }
  }
}

/// A year is leap exactly when its February has a 29th
pub fn is_leap_year(year: i32) -> bool {
  NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// `month` is 1-based here, matching chrono's `month()`
pub fn days_in_month(month: u32, is_leap_year: bool) -> u32 {
  match month {
    2 if is_leap_year => 29,
    2 => 28,
    4 | 6 | 9 | 11 => 30,
    _ => 31,
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{date, datetime};

  #[test]
  fn test_resolve_early_january() {
    let ctx = CalendarContext::resolve(datetime(2026, 1, 6, 12, 0));

    assert_eq!(ctx.year, 2026);
    assert_eq!(ctx.month, 0);
    assert_eq!(ctx.day_of_year, 6);
    assert!(!ctx.is_leap_year);
    assert_eq!(ctx.days_in_year, 365);
    assert_eq!(ctx.days_in_month, 31);
    assert_eq!(ctx.year_start(), date(2026, 1, 1));
  }

  #[test]
  fn test_resolve_leap_february() {
    let ctx = CalendarContext::resolve(datetime(2024, 2, 29, 8, 30));

    assert!(ctx.is_leap_year);
    assert_eq!(ctx.days_in_year, 366);
    assert_eq!(ctx.days_in_month, 29);
    assert_eq!(ctx.month, 1);
    assert_eq!(ctx.day_of_year, 60);
  }

  #[test]
  fn test_leap_year_century_rule() {
    assert!(is_leap_year(2000));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2026));
    assert!(is_leap_year(2028));
  }

  #[test]
  fn test_day_of_year_dec_31() {
    assert_eq!(CalendarContext::resolve(datetime(2026, 12, 31, 0, 0)).day_of_year, 365);
    assert_eq!(CalendarContext::resolve(datetime(2024, 12, 31, 0, 0)).day_of_year, 366);
  }

  #[test]
  fn test_week_start_is_sunday() {
    // 2026-01-06 is a Tuesday
    let ctx = CalendarContext::resolve(datetime(2026, 1, 6, 9, 0));
    assert_eq!(ctx.week_start(), date(2026, 1, 4));

    // A Sunday starts its own week
    let sunday = CalendarContext::resolve(datetime(2026, 1, 4, 9, 0));
    assert_eq!(sunday.week_start(), date(2026, 1, 4));
  }

  #[test]
  fn test_weeks_left_rounds_up() {
    // 359 days to Dec 31 at midnight = 51.3 weeks
    let ctx = CalendarContext::resolve(datetime(2026, 1, 6, 0, 0));
    assert_eq!(ctx.weeks_left(), 52);
  }

  #[test]
  fn test_weeks_left_floor_of_one() {
    let ctx = CalendarContext::resolve(datetime(2026, 12, 31, 18, 0));
    assert_eq!(ctx.weeks_left(), 1);

    let ctx = CalendarContext::resolve(datetime(2026, 12, 30, 18, 0));
    assert_eq!(ctx.weeks_left(), 1);
  }
}
