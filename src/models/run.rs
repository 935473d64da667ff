use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single normalized run, as produced by every ingestion path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
  /// Local wall-clock day of the run
  pub date: NaiveDate,
  /// Always > 0, invalid rows are dropped before reaching the engine
  pub distance_miles: f64,
  /// 0 means pace is unknown for this run
  pub moving_time_seconds: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
}

impl RunRecord {
  pub fn new(date: NaiveDate, distance_miles: f64, moving_time_seconds: u64) -> Self {
    Self {
      date,
      distance_miles,
      moving_time_seconds,
      label: None,
    }
  }

  pub fn with_label(mut self, label: impl Into<String>) -> Self {
    self.label = Some(label.into());
    self
  }

  pub fn moving_minutes(&self) -> f64 {
    self.moving_time_seconds as f64 / 60.0
  }

  /// Minutes per mile for this run alone
  pub fn pace(&self) -> Option<f64> {
    if self.distance_miles > 0.0 {
      Some(self.moving_minutes() / self.distance_miles)
    } else {
      None
    }
  }
}
