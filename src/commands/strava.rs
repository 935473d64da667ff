use crate::commands::CommandError;
use crate::strava::{StravaClient, StravaConfig, TokenExchange};
use tracing::info;

/// ---------------------------------------------------------------------------
/// Exchange Authorization Code
/// ---------------------------------------------------------------------------

/// Swap an OAuth authorization code for an access token using the
/// client credentials from the environment
pub async fn exchange_code(code: &str) -> Result<TokenExchange, CommandError> {
  let config = StravaConfig::from_env()?;
  exchange_code_with(&StravaClient::new(), &config, code).await
}

pub async fn exchange_code_with(
  client: &StravaClient,
  config: &StravaConfig,
  code: &str,
) -> Result<TokenExchange, CommandError> {
  let tokens = client.exchange_code(config, code).await?;

  match tokens.expires_at_utc() {
    Some(expires) => info!(expires_at = %expires.to_rfc3339(), "Strava access token issued"),
    None => info!("Strava access token issued"),
  }
  Ok(tokens)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::strava::StravaError;

  #[tokio::test]
  async fn test_exchange_code_with_redirect_uri() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/oauth/token")
      .match_body(mockito::Matcher::UrlEncoded(
        "redirect_uri".into(),
        "https://tracker.example/callback".into(),
      ))
      .with_status(200)
      .with_body(r#"{"access_token":"fresh","expires_at":1767225600,"token_type":"Bearer"}"#)
      .create_async()
      .await;

    let client = StravaClient::with_base_urls(server.url(), format!("{}/oauth/token", server.url()));
    let config = StravaConfig {
      client_id: "1".into(),
      client_secret: "2".into(),
      redirect_uri: Some("https://tracker.example/callback".into()),
    };

    let tokens = exchange_code_with(&client, &config, "abc").await.unwrap();
    mock.assert_async().await;
    assert_eq!(tokens.access_token, "fresh");
  }

  #[tokio::test]
  async fn test_exchange_code_status_fallback_message() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/oauth/token")
      .with_status(502)
      .with_body("<html>bad gateway</html>")
      .create_async()
      .await;

    let client = StravaClient::with_base_urls(server.url(), format!("{}/oauth/token", server.url()));
    let config = StravaConfig {
      client_id: "1".into(),
      client_secret: "2".into(),
      redirect_uri: None,
    };

    let err = exchange_code_with(&client, &config, "abc").await.unwrap_err();
    assert!(matches!(err, CommandError::Strava(StravaError::OAuth(_))));
    assert_eq!(err.to_string(), "OAuth error: Strava token exchange failed (502).");
  }
}
