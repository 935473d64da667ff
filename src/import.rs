//! CSV and Google Sheet import
//!
//! Both paths converge on the same `RunRecord` list the Strava client
//! produces. Rows that cannot become a valid record are skipped here so the
//! analytics engine only ever sees positive-distance runs.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};
use url::{form_urlencoded, Url};

use crate::models::RunRecord;

/// ---------------------------------------------------------------------------
/// Constants
/// ---------------------------------------------------------------------------

const MILES_PER_KM: f64 = 0.621371;
const METERS_PER_MILE: f64 = 1609.344;
const IMPORTED_LABEL: &str = "Imported";
const SHEETS_HOST: &str = "docs.google.com";

/// Demo data loaded when no other source is configured
pub const SAMPLE_CSV: &str = "date,distance_mi,moving_time_sec
2026-01-02,5.2,2610
2026-01-04,3.1,1560
2026-01-06,7.0,3540
2026-01-11,10.0,5280
2026-01-17,6.4,3210
2026-01-24,12.3,6510
2026-02-01,8.0,4080
2026-02-09,4.0,1980
";

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
  #[error("CSV is empty")]
  Empty,

  #[error("CSV needs date and distance_mi (or distance_km/distance_m)")]
  MissingColumns,

  #[error("Not a valid URL: {0}")]
  InvalidUrl(String),

  #[error("Use a docs.google.com Google Sheet URL.")]
  NotGoogleSheet,

  #[error("Could not find the Google Sheet ID in the URL.")]
  MissingSheetId,

  #[error("Google Sheet request failed ({0}). Ensure the sheet is shared for viewing.")]
  SheetStatus(u16),

  #[error("Could not read CSV: {0}")]
  Csv(#[from] csv::Error),

  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),
}

impl Serialize for ImportError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// CSV Parsing
/// ---------------------------------------------------------------------------

/// Column positions resolved from the header row
struct CsvColumns {
  date: usize,
  miles: Option<usize>,
  kilometers: Option<usize>,
  meters: Option<usize>,
  moving_seconds: Option<usize>,
}

impl CsvColumns {
  fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
    let names: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let idx = |name: &str| names.iter().position(|h| h == name);

    let columns = Self {
      date: idx("date").ok_or(ImportError::MissingColumns)?,
      miles: idx("distance_mi"),
      kilometers: idx("distance_km"),
      meters: idx("distance_m"),
      moving_seconds: idx("moving_time_sec"),
    };

    if columns.miles.is_none() && columns.kilometers.is_none() && columns.meters.is_none() {
      return Err(ImportError::MissingColumns);
    }
    Ok(columns)
  }

  /// Miles column wins, then kilometers, then meters
  fn distance_miles(&self, row: &StringRecord) -> Option<f64> {
    let read = |idx: Option<usize>| idx.and_then(|i| parse_number(row.get(i)?));

    read(self.miles)
      .or_else(|| read(self.kilometers).map(|km| km * MILES_PER_KM))
      .or_else(|| read(self.meters).map(|m| m / METERS_PER_MILE))
  }

  fn record(&self, row: &StringRecord) -> Option<RunRecord> {
    let date = NaiveDate::parse_from_str(row.get(self.date)?, "%Y-%m-%d").ok()?;
    let miles = self.distance_miles(row).filter(|d| *d > 0.0)?;
    let moving = self
      .moving_seconds
      .and_then(|i| parse_number(row.get(i)?))
      .filter(|s| *s >= 0.0)
      .map(|s| s.round() as u64)
      .unwrap_or(0);

    Some(RunRecord::new(date, miles, moving).with_label(IMPORTED_LABEL))
  }
}

/// Sheets exports format large values with thousands separators ("16,093.44")
fn parse_number(cell: &str) -> Option<f64> {
  cell.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse exported run rows, oldest first
///
/// Requires a `date` column plus one of `distance_mi`, `distance_km` or
/// `distance_m`; `moving_time_sec` is optional.
pub fn parse_csv_runs(text: &str) -> Result<Vec<RunRecord>, ImportError> {
  let text = text.trim();
  if text.is_empty() {
    return Err(ImportError::Empty);
  }

  let mut reader = ReaderBuilder::new()
    .trim(Trim::All)
    .flexible(true)
    .from_reader(text.as_bytes());
  let columns = CsvColumns::from_headers(reader.headers()?)?;

  let mut skipped = 0usize;
  let mut runs: Vec<RunRecord> = reader
    .records()
    .filter_map(|row| {
      let record = row.ok().and_then(|row| columns.record(&row));
      if record.is_none() {
        skipped += 1;
      }
      record
    })
    .collect();

  if skipped > 0 {
    debug!(skipped, "skipped CSV rows without a valid date or distance");
  }

  runs.sort_by(|a, b| a.date.cmp(&b.date));
  Ok(runs)
}

/// ---------------------------------------------------------------------------
/// Google Sheets
/// ---------------------------------------------------------------------------

/// Resolve a shareable Google Sheet link to its CSV export endpoint
pub fn sheet_csv_url(raw_url: &str) -> Result<String, ImportError> {
  let url = Url::parse(raw_url.trim()).map_err(|e| ImportError::InvalidUrl(e.to_string()))?;

  let host = url.host_str().unwrap_or_default();
  if host.strip_prefix("www.").unwrap_or(host) != SHEETS_HOST {
    return Err(ImportError::NotGoogleSheet);
  }

  let sheet_id = sheet_id_from_path(url.path()).ok_or(ImportError::MissingSheetId)?;

  let gid = gid_from(url.query_pairs())
    .or_else(|| url.fragment().and_then(|f| gid_from(form_urlencoded::parse(f.as_bytes()))))
    .unwrap_or_else(|| "0".to_string());

  Ok(format!(
    "https://{}/spreadsheets/d/{}/export?format=csv&gid={}",
    SHEETS_HOST, sheet_id, gid
  ))
}

fn gid_from(pairs: form_urlencoded::Parse<'_>) -> Option<String> {
  pairs
    .filter(|(k, _)| k == "gid")
    .map(|(_, v)| v.into_owned())
    .find(|v| !v.is_empty())
}

fn sheet_id_from_path(path: &str) -> Option<&str> {
  let rest = &path[path.find("/spreadsheets/d/")? + "/spreadsheets/d/".len()..];
  let end = rest
    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
    .unwrap_or(rest.len());
  let id = &rest[..end];
  (!id.is_empty()).then_some(id)
}

/// Download a sheet's CSV export and parse it
pub async fn fetch_sheet_runs(raw_url: &str) -> Result<Vec<RunRecord>, ImportError> {
  let csv_url = sheet_csv_url(raw_url)?;
  fetch_csv_runs(&Client::new(), &csv_url).await
}

/// Fetch a CSV document over HTTP and parse it
pub async fn fetch_csv_runs(client: &Client, csv_url: &str) -> Result<Vec<RunRecord>, ImportError> {
  let response = client.get(csv_url).send().await?;

  if !response.status().is_success() {
    return Err(ImportError::SheetStatus(response.status().as_u16()));
  }

  let text = response.text().await?;
  let runs = parse_csv_runs(&text)?;
  info!(count = runs.len(), "loaded runs from CSV export");
  Ok(runs)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
