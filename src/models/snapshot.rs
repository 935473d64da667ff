use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Goal inputs supplied on every computation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalParameters {
  /// Desired average miles per day for goal A (0 = no goal)
  pub target_daily_rate_a: f64,
  /// Desired average miles per day for goal B (0 = no goal)
  pub target_daily_rate_b: f64,
  /// Race distance used for the finish-time prediction
  pub predictor_distance_miles: f64,
}

impl GoalParameters {
  pub fn new(rate_a: f64, rate_b: f64, predictor_distance_miles: f64) -> Self {
    Self {
      target_daily_rate_a: rate_a,
      target_daily_rate_b: rate_b,
      predictor_distance_miles,
    }
  }

  /// Blank or NaN form fields arrive as non-finite values and count as 0
  pub fn sanitized(&self) -> Self {
    Self {
      target_daily_rate_a: finite_or_zero(self.target_daily_rate_a),
      target_daily_rate_b: finite_or_zero(self.target_daily_rate_b),
      predictor_distance_miles: finite_or_zero(self.predictor_distance_miles),
    }
  }
}

fn finite_or_zero(value: f64) -> f64 {
  if value.is_finite() {
    value
  } else {
    0.0
  }
}

/// ---------------------------------------------------------------------------
/// Snapshot Series
/// ---------------------------------------------------------------------------

/// Mileage and pace for one calendar month of the active year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
  /// 0 = January
  pub month: u32,
  pub miles: f64,
  /// Minutes per mile, None when the month has no mileage
  pub pace: Option<f64>,
  /// Change against the previous month (January compares against 0)
  pub delta_miles: f64,
}

/// Trailing 7-day mileage ending on `date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
  pub date: NaiveDate,
  pub miles: f64,
}

/// Run count for one half-open distance bin `[min, max)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
  pub label: String,
  pub min: f64,
  pub max: f64,
  pub count: usize,
}

/// A run from the recent-runs table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentRun {
  pub date: NaiveDate,
  pub distance_miles: f64,
  pub pace: Option<f64>,
}

/// ---------------------------------------------------------------------------
/// Goal Progress
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
  pub daily_rate: f64,
  pub monthly_target: f64,
  pub annual_target: f64,
  /// Positive = ahead of the linear pace line
  pub over_under: f64,
  pub month_remaining: f64,
  pub annual_remaining: f64,
  pub required_weekly_mileage: f64,
  pub this_week_target: f64,
  pub this_week_remaining: f64,
  /// None when there is no annual target
  pub year_complete_pct: Option<f64>,
}

/// ---------------------------------------------------------------------------
/// Analytics Snapshot
/// ---------------------------------------------------------------------------

/// Every derived metric for one (runs, goals, now) triple
///
/// Field names are read directly by renderers; treat them as a stable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
  pub year: i32,
  /// 0 = January
  pub month: u32,
  pub day_of_year: u32,
  pub is_leap_year: bool,
  pub days_in_year: u32,
  pub days_in_month: u32,

  pub monthly_mileage: f64,
  pub annual_mileage: f64,
  pub miles_7d: f64,
  pub this_week_miles: f64,
  pub cumulative_miles: f64,

  /// Minutes per mile over the 10 most recent active-year runs
  pub recent_pace: Option<f64>,
  /// Minutes per mile over every loaded run, all years
  pub year_average_pace: Option<f64>,
  pub predicted_minutes: Option<f64>,
  pub weeks_left: u32,

  pub goal_a: GoalProgress,
  pub goal_b: GoalProgress,

  pub monthly_buckets: Vec<MonthlyBucket>,
  pub rolling_series: Vec<RollingPoint>,
  pub histogram: Vec<HistogramBin>,
  pub recent_runs: Vec<RecentRun>,
}
