use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::RunRecord;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";
const ACTIVITIES_PER_PAGE: u32 = 200;
const MAX_ACTIVITY_PAGES: u32 = 8;
const METERS_PER_MILE: f64 = 1609.344;
const RUN_ACTIVITY_TYPES: [&str; 2] = ["Run", "VirtualRun"];

/// ---------------------------------------------------------------------------
/// OAuth Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StravaConfig {
  pub client_id: String,
  pub client_secret: String,
  pub redirect_uri: Option<String>,
}

impl StravaConfig {
  pub fn from_env() -> Result<Self, StravaError> {
    Ok(Self {
      client_id: env::var("STRAVA_CLIENT_ID")
        .map_err(|_| StravaError::MissingConfig("STRAVA_CLIENT_ID".into()))?,
      client_secret: env::var("STRAVA_CLIENT_SECRET")
        .map_err(|_| StravaError::MissingConfig("STRAVA_CLIENT_SECRET".into()))?,
      redirect_uri: env::var("STRAVA_REDIRECT_URI")
        .ok()
        .filter(|uri| !uri.trim().is_empty()),
    })
  }
}

/// Access token returned by the code exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenExchange {
  pub access_token: String,
  #[serde(default)]
  pub expires_at: Option<i64>,
  #[serde(default)]
  pub token_type: Option<String>,
}

impl TokenExchange {
  pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
    self.expires_at.and_then(|ts| DateTime::from_timestamp(ts, 0))
  }
}

/// Error body shape shared by the Strava API and token endpoint
#[derive(Debug, Deserialize)]
struct StravaErrorBody {
  message: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StravaError {
  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("Missing authorization code")]
  MissingCode,

  #[error(
    "That value is a Strava authorization code, not an access token. \
     Exchange the code for an access token first, then paste the access token here."
  )]
  AuthorizationCode,

  #[error("Unable to reach Strava: {0}")]
  Request(#[from] reqwest::Error),

  #[error(
    "Strava returned 401 (Unauthorized). \
     Check that you pasted an access token (not an authorization code). \
     Your token may be expired; Strava access tokens are short-lived. \
     Your app must request activity scopes (e.g. activity:read_all). \
     API details: {0}"
  )]
  Unauthorized(String),

  #[error("Strava request failed ({status}): {details}")]
  Api { status: u16, details: String },

  #[error("OAuth error: {0}")]
  OAuth(String),

  #[error("Failed to parse Strava response: {0}")]
  Parse(String),
}

impl Serialize for StravaError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Credential Input
/// ---------------------------------------------------------------------------

/// A token pulled out of whatever the user pasted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCredential {
  pub token: String,
  pub warning: Option<String>,
}

/// Accepts a bare token, `Bearer <token>`, token JSON, or a redirect URL
///
/// Authorization codes are rejected since they must be exchanged first.
pub fn parse_credential_input(raw: &str) -> Result<ParsedCredential, StravaError> {
  let cleaned = raw.trim();
  if cleaned.is_empty() {
    return Ok(ParsedCredential {
      token: String::new(),
      warning: None,
    });
  }

  let (unprefixed, had_bearer) = strip_bearer(cleaned);

  if unprefixed.starts_with('{') {
    if let Some(token) = token_from_json(unprefixed) {
      return Ok(ParsedCredential {
        token,
        warning: Some("Extracted access_token from pasted JSON.".into()),
      });
    }
  }

  if let Ok(url) = Url::parse(unprefixed) {
    if let Some(token) = token_from_url(&url) {
      return Ok(ParsedCredential {
        token,
        warning: Some("Extracted access_token from pasted URL.".into()),
      });
    }
    if url.query_pairs().any(|(k, v)| k == "code" && !v.is_empty()) {
      return Err(StravaError::AuthorizationCode);
    }
  }

  if unprefixed.contains("?code=") || unprefixed.contains("&code=") || unprefixed.starts_with("code=") {
    return Err(StravaError::AuthorizationCode);
  }

  Ok(ParsedCredential {
    token: unprefixed.to_string(),
    warning: had_bearer.then(|| "Removed optional 'Bearer' prefix from pasted token.".to_string()),
  })
}

fn strip_bearer(value: &str) -> (&str, bool) {
  let prefix = "bearer";
  match value.get(..prefix.len()) {
    Some(head) if head.eq_ignore_ascii_case(prefix) => {
      let rest = &value[prefix.len()..];
      if rest.starts_with(char::is_whitespace) {
        (rest.trim(), true)
      } else {
        (value, false)
      }
    }
    _ => (value, false),
  }
}

fn token_from_json(text: &str) -> Option<String> {
  let parsed: serde_json::Value = serde_json::from_str(text).ok()?;
  let token = match parsed.get("access_token")? {
    serde_json::Value::String(s) => s.trim().to_string(),
    serde_json::Value::Null => return None,
    other => other.to_string(),
  };
  (!token.is_empty()).then_some(token)
}

fn token_from_url(url: &Url) -> Option<String> {
  let from_query = url
    .query_pairs()
    .find(|(k, _)| k == "access_token")
    .map(|(_, v)| v.into_owned());

  let from_fragment = || {
    url.fragment().and_then(|fragment| {
      url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(k, _)| k == "access_token")
        .map(|(_, v)| v.into_owned())
    })
  };

  from_query
    .filter(|t| !t.is_empty())
    .or_else(|| from_fragment().filter(|t| !t.is_empty()))
    .map(|t| t.trim().to_string())
}

/// ---------------------------------------------------------------------------
/// Strava API - Activities
/// ---------------------------------------------------------------------------

/// Activity summary from Strava API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StravaActivity {
  pub id: i64,
  #[serde(default)]
  pub name: Option<String>,
  /// Strava uses "type" for legacy and "sport_type" for newer activities
  #[serde(rename = "type", default)]
  pub activity_type: String,
  #[serde(default)]
  pub sport_type: Option<String>,
  pub start_date: String,
  #[serde(default)]
  pub start_date_local: Option<String>,
  #[serde(default)]
  pub moving_time: Option<i64>,
  #[serde(default)]
  pub distance: Option<f64>,
}

impl StravaActivity {
  pub fn is_run(&self) -> bool {
    self.sport_type.as_deref() == Some("Run")
      || RUN_ACTIVITY_TYPES.contains(&self.activity_type.as_str())
  }

  /// Local calendar day of the activity, from the local start time when present
  pub fn local_date(&self) -> Option<NaiveDate> {
    let stamp = self.start_date_local.as_deref().unwrap_or(&self.start_date);
    NaiveDate::parse_from_str(stamp.get(..10)?, "%Y-%m-%d").ok()
  }

  /// Normalize to a run record; None for activities without a usable date or distance
  pub fn to_run_record(&self) -> Option<RunRecord> {
    let meters = self.distance.filter(|d| d.is_finite() && *d > 0.0)?;
    let date = self.local_date()?;
    let moving = self.moving_time.unwrap_or(0).max(0) as u64;

    Some(
      RunRecord::new(date, meters / METERS_PER_MILE, moving)
        .with_label(self.name.clone().unwrap_or_else(|| "Run".to_string())),
    )
  }
}

/// ---------------------------------------------------------------------------
/// Strava Client
/// ---------------------------------------------------------------------------

pub struct StravaClient {
  client: Client,
  api_base: String,
  token_url: String,
}

impl Default for StravaClient {
  fn default() -> Self {
    Self::new()
  }
}

impl StravaClient {
  pub fn new() -> Self {
    Self::with_base_urls(STRAVA_API_BASE, STRAVA_TOKEN_URL)
  }

  /// Point the client at another host (used by tests against a mock server)
  pub fn with_base_urls(api_base: impl Into<String>, token_url: impl Into<String>) -> Self {
    Self {
      client: Client::new(),
      api_base: api_base.into().trim_end_matches('/').to_string(),
      token_url: token_url.into(),
    }
  }

  /// Exchange an OAuth authorization code for an access token
  pub async fn exchange_code(
    &self,
    config: &StravaConfig,
    code: &str,
  ) -> Result<TokenExchange, StravaError> {
    let code = code.trim();
    if code.is_empty() {
      return Err(StravaError::MissingCode);
    }

    let mut form = vec![
      ("client_id", config.client_id.as_str()),
      ("client_secret", config.client_secret.as_str()),
      ("code", code),
      ("grant_type", "authorization_code"),
    ];
    if let Some(redirect_uri) = config.redirect_uri.as_deref() {
      form.push(("redirect_uri", redirect_uri));
    }

    let response = self.client.post(&self.token_url).form(&form).send().await?;
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
      let message = serde_json::from_str::<StravaErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| format!("Strava token exchange failed ({}).", status.as_u16()));
      warn!(status = status.as_u16(), "token exchange rejected");
      return Err(StravaError::OAuth(message));
    }

    let tokens: TokenExchange =
      serde_json::from_str(&body).map_err(|e| StravaError::Parse(e.to_string()))?;
    info!("exchanged authorization code for access token");
    Ok(tokens)
  }

  /// Fetch every run the athlete has recorded, oldest first
  pub async fn fetch_runs(&self, access_token: &str) -> Result<Vec<RunRecord>, StravaError> {
    self.check_athlete(access_token).await?;

    let mut runs = Vec::new();
    for page in 1..=MAX_ACTIVITY_PAGES {
      let activities = self.fetch_activity_page(access_token, page).await?;
      if activities.is_empty() {
        break;
      }
      debug!(page, count = activities.len(), "fetched activity page");

      runs.extend(
        activities
          .iter()
          .filter(|a| a.is_run())
          .filter_map(StravaActivity::to_run_record),
      );
    }

    runs.sort_by(|a, b| a.date.cmp(&b.date));
    info!(count = runs.len(), "loaded runs from Strava");
    Ok(runs)
  }

  async fn check_athlete(&self, access_token: &str) -> Result<(), StravaError> {
    let response = self
      .client
      .get(format!("{}/athlete", self.api_base))
      .bearer_auth(access_token)
      .send()
      .await?;

    if !response.status().is_success() {
      return Err(api_error(response).await);
    }
    Ok(())
  }

  async fn fetch_activity_page(
    &self,
    access_token: &str,
    page: u32,
  ) -> Result<Vec<StravaActivity>, StravaError> {
    let response = self
      .client
      .get(format!("{}/athlete/activities", self.api_base))
      .query(&[("per_page", ACTIVITIES_PER_PAGE), ("page", page)])
      .bearer_auth(access_token)
      .send()
      .await?;

    if !response.status().is_success() {
      return Err(api_error(response).await);
    }

    let response_text = response.text().await?;
    serde_json::from_str(&response_text).map_err(|e| {
      warn!(
        error = %e,
        body = %response_text.chars().take(500).collect::<String>(),
        "failed to parse Strava activities"
      );
      StravaError::Parse(e.to_string())
    })
  }
}

/// Turn a non-success response into a typed error with the API's own message
async fn api_error(response: Response) -> StravaError {
  let status = response.status();
  let body = response.text().await.unwrap_or_default();

  let details = match serde_json::from_str::<serde_json::Value>(&body) {
    Ok(json) => json
      .get("message")
      .and_then(|m| m.as_str())
      .map(String::from)
      .unwrap_or_else(|| json.to_string()),
    Err(_) => format!("status={}", status.as_u16()),
  };

  if status == StatusCode::UNAUTHORIZED {
    StravaError::Unauthorized(details)
  } else {
    StravaError::Api {
      status: status.as_u16(),
      details,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
