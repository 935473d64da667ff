pub mod run;
pub mod snapshot;

pub use run::RunRecord;
pub use snapshot::{
  AnalyticsSnapshot, GoalParameters, GoalProgress, HistogramBin, MonthlyBucket, RecentRun,
  RollingPoint,
};
