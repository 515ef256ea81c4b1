use async_trait::async_trait;
use chrono::TimeDelta;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::{auth::error::AuthError, config::BackendSettings};

const DEFAULT_LIFETIME_SECS: i64 = 3600;

/// A freshly issued credential, ready to be sent as an `Authorization` header.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedToken {
    pub authorization: String,
    pub lifetime: TimeDelta,
}

/// Issues bearer credentials for the CMS.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn request_token(&self) -> Result<IssuedToken, AuthError>;
}

// Some OAuth servers send `expires_in` as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Seconds {
    Whole(i64),
    Fractional(f64),
    Text(String),
}

impl Seconds {
    fn as_secs(&self) -> Option<i64> {
        match self {
            Seconds::Whole(secs) => Some(*secs),
            Seconds::Fractional(secs) => Some(secs.trunc() as i64),
            Seconds::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<Seconds>,
}

impl TokenResponse {
    fn into_token(self) -> Result<IssuedToken, AuthError> {
        let access_token = self
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let token_type = self.token_type.unwrap_or_else(|| "Bearer".to_string());
        let secs = match self.expires_in.as_ref().and_then(Seconds::as_secs) {
            Some(secs) if secs > 0 => secs,
            Some(secs) => {
                warn!("token issued with expires_in {secs}, assuming {DEFAULT_LIFETIME_SECS}s");
                DEFAULT_LIFETIME_SECS
            }
            None => DEFAULT_LIFETIME_SECS,
        };

        Ok(IssuedToken {
            authorization: format!("{token_type} {access_token}"),
            lifetime: TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX),
        })
    }
}

/// Client-credentials grant against the CMS `/oauth/token` endpoint.
pub struct OAuthClient {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl OAuthClient {
    pub fn new(http: Client, backend: &BackendSettings) -> Self {
        Self {
            http,
            token_url: backend.token_url(),
            client_id: backend.client_id.clone(),
            client_secret: backend.client_secret.clone(),
        }
    }
}

#[async_trait]
impl CredentialSource for OAuthClient {
    async fn request_token(&self) -> Result<IssuedToken, AuthError> {
        debug!("requesting access token from {}", self.token_url);

        let response = self
            .http
            .post(&self.token_url)
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("OAuth token request failed: {status}");
            return Err(AuthError::Rejected(status));
        }

        response.json::<TokenResponse>().await?.into_token()
    }
}
