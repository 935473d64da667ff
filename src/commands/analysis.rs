use crate::analysis::compute_snapshot;
use crate::calendar::local_now;
use crate::commands::{load_runs, CommandError, RunSource};
use crate::models::{AnalyticsSnapshot, GoalParameters};
use crate::report::render_text;
use chrono::NaiveDateTime;
use tracing::debug;

/// How a snapshot is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

/// ---------------------------------------------------------------------------
/// Snapshot Command
/// ---------------------------------------------------------------------------

/// Load runs from `source` and compute a snapshot as of `now` (wall clock when None)
pub async fn build_snapshot(
  source: &RunSource,
  goals: &GoalParameters,
  now: Option<NaiveDateTime>,
) -> Result<AnalyticsSnapshot, CommandError> {
  let runs = load_runs(source).await?;
  let now = now.unwrap_or_else(local_now);
  debug!(%now, runs = runs.len(), "computing snapshot");

  Ok(compute_snapshot(&runs, goals, now))
}

pub fn render_snapshot(
  snapshot: &AnalyticsSnapshot,
  format: OutputFormat,
) -> Result<String, CommandError> {
  match format {
    OutputFormat::Text => Ok(render_text(snapshot)),
    OutputFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
