//! Plain-text rendering of an analytics snapshot
//!
//! Undefined metrics render as `--` and are never fed back into arithmetic.

use crate::models::{AnalyticsSnapshot, GoalProgress};

const MONTH_NAMES: [&str; 12] = [
  "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const NO_DATA: &str = "--";

/// ---------------------------------------------------------------------------
/// Formatters
/// ---------------------------------------------------------------------------

pub fn fmt_miles(miles: f64) -> String {
  format!("{:.1} mi", miles)
}

/// `m:ss/mi`, or `--` when there is no usable pace
pub fn fmt_pace(min_per_mile: Option<f64>) -> String {
  match min_per_mile {
    Some(pace) if pace.is_finite() && pace > 0.0 => {
      let total_seconds = (pace * 60.0).round() as u64;
      format!("{}:{:02}/mi", total_seconds / 60, total_seconds % 60)
    }
    _ => NO_DATA.to_string(),
  }
}

/// `Xm Ys` for a predicted finish time
pub fn fmt_finish_time(minutes: Option<f64>) -> String {
  match minutes {
    Some(m) if m.is_finite() && m >= 0.0 => {
      let total_seconds = (m * 60.0).round() as u64;
      format!("{}m {}s", total_seconds / 60, total_seconds % 60)
    }
    _ => NO_DATA.to_string(),
  }
}

pub fn fmt_percent(pct: Option<f64>) -> String {
  match pct {
    Some(p) if p.is_finite() => format!("{:.1}%", p),
    _ => NO_DATA.to_string(),
  }
}

fn fmt_delta(miles: f64) -> String {
  if miles >= 0.0 {
    format!("+{:.1}", miles)
  } else {
    format!("{:.1}", miles)
  }
}

fn month_name(month: u32) -> &'static str {
  MONTH_NAMES.get(month as usize).copied().unwrap_or("?")
}

/// ---------------------------------------------------------------------------
/// Sections
/// ---------------------------------------------------------------------------

/// Label/value pairs for the headline metric cards
pub fn metric_cards(snapshot: &AnalyticsSnapshot) -> Vec<(String, String)> {
  let (a, b) = (&snapshot.goal_a, &snapshot.goal_b);
  vec![
    ("Monthly mileage".into(), fmt_miles(snapshot.monthly_mileage)),
    ("Month remaining (A)".into(), fmt_miles(a.month_remaining)),
    ("Month remaining (B)".into(), fmt_miles(b.month_remaining)),
    ("Annual mileage".into(), fmt_miles(snapshot.annual_mileage)),
    ("Annual remaining (A)".into(), fmt_miles(a.annual_remaining)),
    ("Annual remaining (B)".into(), fmt_miles(b.annual_remaining)),
    ("7-day rolling total".into(), fmt_miles(snapshot.miles_7d)),
    ("Over/Under pace A".into(), fmt_miles(a.over_under)),
    ("Over/Under pace B".into(), fmt_miles(b.over_under)),
    ("Year complete (A)".into(), fmt_percent(a.year_complete_pct)),
    ("Year complete (B)".into(), fmt_percent(b.year_complete_pct)),
    ("Predicted time".into(), fmt_finish_time(snapshot.predicted_minutes)),
  ]
}

fn weekly_row(name: &str, goal: &GoalProgress, weeks_left: u32) -> String {
  format!(
    "{:<8} {:>20} {:>28} {:>10}",
    name,
    fmt_miles(goal.this_week_remaining),
    fmt_miles(goal.required_weekly_mileage),
    weeks_left
  )
}

fn weekly_breakdown(snapshot: &AnalyticsSnapshot) -> Vec<String> {
  vec![
    format!(
      "{:<8} {:>20} {:>28} {:>10}",
      "Target", "This week remaining", "Avg weekly needed rest of year", "Weeks left"
    ),
    weekly_row("Pace A", &snapshot.goal_a, snapshot.weeks_left),
    weekly_row("Pace B", &snapshot.goal_b, snapshot.weeks_left),
  ]
}

fn monthly_comparison(snapshot: &AnalyticsSnapshot) -> Vec<String> {
  let mut lines = vec![format!("{:<6} {:>10} {:>14} {:>10}", "Month", "Mileage", "Vs prior month", "Avg pace")];
  lines.extend(snapshot.monthly_buckets.iter().map(|bucket| {
    format!(
      "{:<6} {:>10} {:>14} {:>10}",
      month_name(bucket.month),
      fmt_miles(bucket.miles),
      fmt_delta(bucket.delta_miles),
      fmt_pace(bucket.pace)
    )
  }));
  lines
}

fn pace_analysis(snapshot: &AnalyticsSnapshot) -> Vec<String> {
  let mut lines = vec![
    format!("Year pace: {}", fmt_pace(snapshot.year_average_pace)),
    format!("Recent pace (last 10 runs): {}", fmt_pace(snapshot.recent_pace)),
    String::new(),
    format!("{:<12} {:>10} {:>10}", "Date", "Distance", "Pace"),
  ];
  lines.extend(snapshot.recent_runs.iter().map(|run| {
    format!(
      "{:<12} {:>10} {:>10}",
      run.date.format("%Y-%m-%d"),
      fmt_miles(run.distance_miles),
      fmt_pace(run.pace)
    )
  }));
  lines
}

/// Weekly samples of the trailing 7-day series, ending today
fn rolling_trend(snapshot: &AnalyticsSnapshot) -> Vec<String> {
  let mut samples: Vec<String> = snapshot
    .rolling_series
    .iter()
    .rev()
    .step_by(7)
    .map(|point| {
      format!(
        "{:<12} {:>10} {}",
        point.date.format("%Y-%m-%d"),
        fmt_miles(point.miles),
        "#".repeat(point.miles.round().max(0.0) as usize)
      )
    })
    .collect();
  samples.reverse();
  samples
}

fn histogram(snapshot: &AnalyticsSnapshot) -> Vec<String> {
  snapshot
    .histogram
    .iter()
    .map(|bin| format!("{:<10} {:>4} {}", bin.label, bin.count, "#".repeat(bin.count)))
    .collect()
}

/// ---------------------------------------------------------------------------
/// Full Report
/// ---------------------------------------------------------------------------

pub fn render_text(snapshot: &AnalyticsSnapshot) -> String {
  let mut lines = vec![format!(
    "Running tracker - {} {} (day {} of {})",
    month_name(snapshot.month),
    snapshot.year,
    snapshot.day_of_year,
    snapshot.days_in_year
  )];

  lines.push(String::new());
  let width = metric_cards(snapshot).iter().map(|(label, _)| label.len()).max().unwrap_or(0);
  lines.extend(
    metric_cards(snapshot)
      .into_iter()
      .map(|(label, value)| format!("{:<width$}  {}", label, value, width = width)),
  );

  let sections: [(&str, Vec<String>); 5] = [
    ("Weekly breakdown", weekly_breakdown(snapshot)),
    ("Monthly comparison", monthly_comparison(snapshot)),
    ("Pace analysis", pace_analysis(snapshot)),
    ("Rolling 7-day mileage", rolling_trend(snapshot)),
    ("Distance histogram", histogram(snapshot)),
  ];

  for (title, body) in sections {
    lines.push(String::new());
    lines.push(title.to_string());
    lines.push("-".repeat(title.len()));
    lines.extend(body);
  }

  lines.join("\n")
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
