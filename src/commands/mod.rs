pub mod analysis;
pub mod strava;

use crate::import::{fetch_sheet_runs, parse_csv_runs, ImportError, SAMPLE_CSV};
use crate::models::RunRecord;
use crate::strava::{parse_credential_input, StravaClient, StravaError};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// ---------------------------------------------------------------------------
/// Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
  #[error(transparent)]
  Strava(#[from] StravaError),

  #[error(transparent)]
  Import(#[from] ImportError),

  #[error("Failed to read {path}: {source}")]
  Io {
    path: String,
    source: std::io::Error,
  },

  #[error("Add a Strava access token first.")]
  MissingToken,

  #[error("Paste a Google Sheet URL first.")]
  MissingSheetUrl,

  #[error("Failed to serialize output: {0}")]
  Serialize(#[from] serde_json::Error),
}

impl Serialize for CommandError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Run Sources
/// ---------------------------------------------------------------------------

/// Where the run list comes from; each load replaces the previous list wholesale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSource {
  /// Built-in demo data
  Sample,
  /// A local CSV export
  Csv(PathBuf),
  /// A shared Google Sheet link
  Sheet(String),
  /// Whatever the user pasted as a Strava credential
  Strava(String),
}

pub async fn load_runs(source: &RunSource) -> Result<Vec<RunRecord>, CommandError> {
  let runs = match source {
    RunSource::Sample => parse_csv_runs(SAMPLE_CSV)?,
    RunSource::Csv(path) => {
      let text = fs::read_to_string(path).map_err(|source| CommandError::Io {
        path: path.display().to_string(),
        source,
      })?;
      parse_csv_runs(&text)?
    }
    RunSource::Sheet(url) => {
      if url.trim().is_empty() {
        return Err(CommandError::MissingSheetUrl);
      }
      fetch_sheet_runs(url).await?
    }
    RunSource::Strava(raw) => {
      let credential = parse_credential_input(raw)?;
      if credential.token.is_empty() {
        return Err(CommandError::MissingToken);
      }
      if let Some(warning) = &credential.warning {
        warn!("{}", warning);
      }
      StravaClient::new().fetch_runs(&credential.token).await?
    }
  };

  info!(count = runs.len(), "run list loaded");
  Ok(runs)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
