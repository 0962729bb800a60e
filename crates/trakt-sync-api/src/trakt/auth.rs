use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const AUTHORIZE_URL: &str = "https://trakt.tv/oauth/authorize";

/// Tokens are treated as expired this many seconds before Trakt says so.
const EXPIRY_MARGIN_SECS: i64 = 120;

/// Create the reqwest Client shared by all Trakt calls
pub fn create_trakt_client() -> Client {
    Client::builder()
        .user_agent(concat!("trakt-sync/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
}

#[derive(Debug)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<TokenResponse> for TokenInfo {
    fn from(response: TokenResponse) -> Self {
        let expires_at =
            Utc::now() + Duration::seconds(response.expires_in as i64 - EXPIRY_MARGIN_SECS);
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at,
        }
    }
}

/// URL the user opens to grant access; Trakt then shows a code to paste back.
pub fn authorization_url(client_id: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}",
        AUTHORIZE_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(REDIRECT_URI)
    )
}

/// Exchange an authorization code for tokens
pub async fn exchange_code(
    client: &Client,
    base_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<TokenInfo> {
    let code = code.trim();
    if code.is_empty() {
        return Err(anyhow!("Authorization code cannot be empty"));
    }

    let payload = serde_json::json!({
        "code": code,
        "client_id": client_id,
        "client_secret": client_secret,
        "redirect_uri": REDIRECT_URI,
        "grant_type": "authorization_code"
    });

    request_token(client, base_url, &payload, "exchange authorization code").await
}

/// Trade a refresh token for a fresh access token
pub async fn refresh_access_token(
    client: &Client,
    base_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenInfo> {
    let payload = serde_json::json!({
        "refresh_token": refresh_token,
        "client_id": client_id,
        "client_secret": client_secret,
        "redirect_uri": REDIRECT_URI,
        "grant_type": "refresh_token"
    });

    request_token(client, base_url, &payload, "refresh token").await
}

async fn request_token(
    client: &Client,
    base_url: &str,
    payload: &serde_json::Value,
    action: &str,
) -> Result<TokenInfo> {
    let url = format!("{}/oauth/token", base_url.trim_end_matches('/'));
    let response = client
        .post(&url)
        .json(payload)
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow!("Failed to {}: {} - {}", action, status, error_text));
    }

    let token_response: TokenResponse = response.json().await?;
    Ok(token_response.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_encodes_redirect() {
        let url = authorization_url("abc123");
        assert!(url.starts_with("https://trakt.tv/oauth/authorize?response_type=code"));
        assert!(url.contains("client_id=abc123"));
        assert!(url.contains("redirect_uri=urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob"));
    }

    #[test]
    fn test_token_expiry_applies_margin() {
        let info: TokenInfo = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 7_776_000,
        }
        .into();
        let remaining = info.expires_at - Utc::now();
        assert!(remaining < Duration::seconds(7_776_000 - EXPIRY_MARGIN_SECS + 1));
        assert!(remaining > Duration::seconds(7_776_000 - EXPIRY_MARGIN_SECS - 60));
    }

    #[tokio::test]
    async fn test_empty_code_is_rejected() {
        let client = Client::new();
        let result = exchange_code(&client, "http://127.0.0.1:9", "id", "secret", "   ").await;
        assert!(result.is_err());
    }
}
