//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Run record factories
//! - Fixed clock helpers
//! - Helper assertions

use crate::models::RunRecord;
use crate::strava::StravaActivity;
use chrono::{NaiveDate, NaiveDateTime};

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Create a run record on the given day
pub fn run(year: i32, month: u32, day: u32, miles: f64, moving_seconds: u64) -> RunRecord {
  RunRecord::new(date(year, month, day), miles, moving_seconds)
}

/// The three early-January runs used throughout the engine tests
pub fn sample_runs() -> Vec<RunRecord> {
  vec![
    run(2026, 1, 2, 5.2, 2610),
    run(2026, 1, 4, 3.1, 1560),
    run(2026, 1, 6, 7.0, 3540),
  ]
}

/// Create a mock Strava run activity for testing
pub fn mock_strava_activity() -> StravaActivity {
  StravaActivity {
    id: 123456,
    name: Some("Morning Run".to_string()),
    activity_type: "Run".to_string(),
    sport_type: Some("Run".to_string()),
    start_date: "2026-01-02T13:05:00Z".to_string(),
    start_date_local: Some("2026-01-02T07:05:00Z".to_string()),
    moving_time: Some(2610),
    distance: Some(8368.589),
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Local wall-clock instant used as a fixed "now"
pub fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
  date(year, month, day)
    .and_hms_opt(hour, minute, 0)
    .expect("valid test time")
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let left: f64 = $left;
    let right: f64 = $right;
    let diff = (left - right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      left,
      right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mock_factories_create_valid_data() {
    let runs = sample_runs();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[0].date, date(2026, 1, 2));

    let activity = mock_strava_activity();
    assert_eq!(activity.activity_type, "Run");
    assert!(activity.distance.is_some());
  }
}
