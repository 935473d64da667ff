pub mod analysis;
pub mod calendar;
pub mod commands;
pub mod import;
pub mod models;
pub mod report;
pub mod strava;

#[cfg(test)]
pub mod test_utils;

pub use analysis::compute_snapshot;
pub use models::{AnalyticsSnapshot, GoalParameters, RunRecord};
