//! Deterministic analytics engine for run records
//!
//! Turns the loaded run list plus goal parameters into an `AnalyticsSnapshot`.
//! Everything here is a pure function of (runs, goals, now): no I/O, no clock
//! reads, and the caller's run list is never reordered in place.

use chrono::{Datelike, Duration, NaiveDateTime};

use crate::calendar::CalendarContext;
use crate::models::{
  AnalyticsSnapshot, GoalParameters, GoalProgress, HistogramBin, MonthlyBucket, RecentRun,
  RollingPoint, RunRecord,
};

/// ---------------------------------------------------------------------------
/// Constants
/// ---------------------------------------------------------------------------

/// Distance bin edges in miles; runs of 30 mi or more fall outside every bin
pub const HISTOGRAM_BOUNDARIES: [f64; 10] = [0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 13.0, 16.0, 20.0, 30.0];

const ROLLING_WINDOW_DAYS: usize = 7;
const RECENT_PACE_RUNS: usize = 10;
const RECENT_RUNS_SHOWN: usize = 8;
const DAYS_PER_WEEK: f64 = 7.0;

/// ---------------------------------------------------------------------------
/// Shared Helpers
/// ---------------------------------------------------------------------------

pub fn total_miles(runs: &[&RunRecord]) -> f64 {
  runs.iter().map(|r| r.distance_miles).sum()
}

/// Minutes per mile over a set of runs, None when there is no mileage
pub fn average_pace(runs: &[&RunRecord]) -> Option<f64> {
  let miles = total_miles(runs);
  if miles > 0.0 {
    let minutes: f64 = runs.iter().map(|r| r.moving_minutes()).sum();
    Some(minutes / miles)
  } else {
    None
  }
}

/// Copy of the references ordered newest first; ties keep list order
fn newest_first<'a>(runs: &[&'a RunRecord]) -> Vec<&'a RunRecord> {
  let mut sorted = runs.to_vec();
  sorted.sort_by(|a, b| b.date.cmp(&a.date));
  sorted
}

/// ---------------------------------------------------------------------------
/// Aggregator
/// ---------------------------------------------------------------------------

/// Active-year and active-month slices of the run list with their totals
#[derive(Debug, Clone)]
pub struct RunAggregates<'a> {
  pub year_runs: Vec<&'a RunRecord>,
  pub month_runs: Vec<&'a RunRecord>,
  pub annual_mileage: f64,
  pub monthly_mileage: f64,
  /// Active-year miles dated on or before today
  pub cumulative_miles: f64,
  /// Miles from the most recent Sunday through today
  pub this_week_miles: f64,
}

impl<'a> RunAggregates<'a> {
  pub fn compute(runs: &'a [RunRecord], ctx: &CalendarContext) -> Self {
    let year_runs: Vec<&RunRecord> = runs.iter().filter(|r| ctx.contains(r.date)).collect();

    let month_runs: Vec<&RunRecord> = year_runs
      .iter()
      .copied()
      .filter(|r| r.date.month0() == ctx.month)
      .collect();

    let to_date: Vec<&RunRecord> = year_runs
      .iter()
      .copied()
      .filter(|r| r.date.ordinal() <= ctx.day_of_year)
      .collect();

    let week_start = ctx.week_start();
    let this_week: Vec<&RunRecord> = year_runs
      .iter()
      .copied()
      .filter(|r| r.date >= week_start && r.date <= ctx.today)
      .collect();

    Self {
      annual_mileage: total_miles(&year_runs),
      monthly_mileage: total_miles(&month_runs),
      cumulative_miles: total_miles(&to_date),
      this_week_miles: total_miles(&this_week),
      year_runs,
      month_runs,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Rolling Window Generator
/// ---------------------------------------------------------------------------

/// Trailing 7-day mileage for every day from Jan 1 through today
///
/// Runs are first binned per day of year, then each window sums its seven
/// daily totals. Days before Jan 1 contribute nothing since only active-year
/// runs are considered.
pub fn rolling_series(year_runs: &[&RunRecord], ctx: &CalendarContext) -> Vec<RollingPoint> {
  let days = ctx.day_of_year as usize;
  let mut daily = vec![0.0_f64; days];

  for run in year_runs {
    let idx = run.date.ordinal0() as usize;
    if run.date.year() == ctx.year && idx < days {
      daily[idx] += run.distance_miles;
    }
  }

  let start = ctx.year_start();
  (0..days)
    .map(|i| {
      let first = (i + 1).saturating_sub(ROLLING_WINDOW_DAYS);
      RollingPoint {
        date: start + Duration::days(i as i64),
        miles: daily[first..=i].iter().sum(),
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Monthly Bucketer
/// ---------------------------------------------------------------------------

/// Twelve buckets in calendar order, present even for months without runs
pub fn monthly_buckets(year_runs: &[&RunRecord]) -> Vec<MonthlyBucket> {
  let mut previous = 0.0;

  (0..12)
    .map(|month| {
      let bucket: Vec<&RunRecord> = year_runs
        .iter()
        .copied()
        .filter(|r| r.date.month0() == month)
        .collect();

      let miles = total_miles(&bucket);
      let delta_miles = miles - previous;
      previous = miles;

      MonthlyBucket {
        month,
        miles,
        pace: average_pace(&bucket),
        delta_miles,
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Histogram Bucketer
/// ---------------------------------------------------------------------------

pub fn distance_histogram(year_runs: &[&RunRecord]) -> Vec<HistogramBin> {
  HISTOGRAM_BOUNDARIES
    .windows(2)
    .map(|edges| {
      let (min, max) = (edges[0], edges[1]);
      HistogramBin {
        label: format!("{}-{} mi", min, max),
        min,
        max,
        count: year_runs
          .iter()
          .filter(|r| r.distance_miles >= min && r.distance_miles < max)
          .count(),
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Pace & Prediction
/// ---------------------------------------------------------------------------

/// Pace over the 10 most recent active-year runs
pub fn recent_pace(year_runs: &[&RunRecord]) -> Option<f64> {
  let recent: Vec<&RunRecord> = newest_first(year_runs)
    .into_iter()
    .take(RECENT_PACE_RUNS)
    .collect();
  average_pace(&recent)
}

/// Pace over the whole loaded list, every year included
pub fn year_average_pace(runs: &[RunRecord]) -> Option<f64> {
  let all: Vec<&RunRecord> = runs.iter().collect();
  average_pace(&all)
}

/// Finish time in minutes for `distance_miles` at `pace`
pub fn predicted_minutes(pace: Option<f64>, distance_miles: f64) -> Option<f64> {
  if !distance_miles.is_finite() || distance_miles <= 0.0 {
    return None;
  }
  pace
    .map(|p| p * distance_miles)
    .filter(|minutes| minutes.is_finite())
}

/// Most recent runs across every year, for the pace table
pub fn recent_runs(runs: &[RunRecord]) -> Vec<RecentRun> {
  let all: Vec<&RunRecord> = runs.iter().collect();
  newest_first(&all)
    .into_iter()
    .take(RECENT_RUNS_SHOWN)
    .map(|r| RecentRun {
      date: r.date,
      distance_miles: r.distance_miles,
      pace: r.pace(),
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Goal Tracker
/// ---------------------------------------------------------------------------

pub fn goal_progress(
  daily_rate: f64,
  ctx: &CalendarContext,
  aggregates: &RunAggregates<'_>,
  weeks_left: u32,
) -> GoalProgress {
  let rate = if daily_rate.is_finite() { daily_rate } else { 0.0 };

  let monthly_target = rate * f64::from(ctx.days_in_month);
  let annual_target = rate * f64::from(ctx.days_in_year);
  let annual_remaining = (annual_target - aggregates.annual_mileage).max(0.0);
  let this_week_target = rate * DAYS_PER_WEEK;

  let year_complete_pct = if annual_target != 0.0 {
    Some(aggregates.annual_mileage / annual_target * 100.0)
  } else {
    None
  };

  GoalProgress {
    daily_rate: rate,
    monthly_target,
    annual_target,
    over_under: aggregates.cumulative_miles - rate * f64::from(ctx.day_of_year),
    month_remaining: (monthly_target - aggregates.monthly_mileage).max(0.0),
    annual_remaining,
    required_weekly_mileage: annual_remaining / f64::from(weeks_left.max(1)),
    this_week_target,
    this_week_remaining: (this_week_target - aggregates.this_week_miles).max(0.0),
    year_complete_pct,
  }
}

/// ---------------------------------------------------------------------------
/// Snapshot Pipeline
/// ---------------------------------------------------------------------------

/// Compute every derived metric for the loaded runs as of `now`
pub fn compute_snapshot(
  runs: &[RunRecord],
  goals: &GoalParameters,
  now: NaiveDateTime,
) -> AnalyticsSnapshot {
  let goals = goals.sanitized();
  let ctx = CalendarContext::resolve(now);
  let aggregates = RunAggregates::compute(runs, &ctx);
  let weeks_left = ctx.weeks_left();

  let rolling_series = rolling_series(&aggregates.year_runs, &ctx);
  let miles_7d = rolling_series.last().map(|p| p.miles).unwrap_or(0.0);

  let recent_pace = recent_pace(&aggregates.year_runs);
  let predicted_minutes = predicted_minutes(recent_pace, goals.predictor_distance_miles);

  AnalyticsSnapshot {
    year: ctx.year,
    month: ctx.month,
    day_of_year: ctx.day_of_year,
    is_leap_year: ctx.is_leap_year,
    days_in_year: ctx.days_in_year,
    days_in_month: ctx.days_in_month,

    monthly_mileage: aggregates.monthly_mileage,
    annual_mileage: aggregates.annual_mileage,
    miles_7d,
    this_week_miles: aggregates.this_week_miles,
    cumulative_miles: aggregates.cumulative_miles,

    recent_pace,
    year_average_pace: year_average_pace(runs),
    predicted_minutes,
    weeks_left,

    goal_a: goal_progress(goals.target_daily_rate_a, &ctx, &aggregates, weeks_left),
    goal_b: goal_progress(goals.target_daily_rate_b, &ctx, &aggregates, weeks_left),

    monthly_buckets: monthly_buckets(&aggregates.year_runs),
    rolling_series,
    histogram: distance_histogram(&aggregates.year_runs),
    recent_runs: recent_runs(runs),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
