use axum::{
    extract::{FromRequest, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{info, warn};

use crate::{cache::CONTENT_TAG, http::server::AppState, locale::Locale};

pub const SECRET_HEADER: &str = "x-revalidate-secret";

#[derive(Debug, Error)]
pub enum RevalidateError {
    #[error("Revalidation secret is not configured")]
    NotConfigured,

    #[error("Invalid secret")]
    InvalidSecret,

    #[error("Failed to revalidate")]
    MalformedBody(String),
}

impl IntoResponse for RevalidateError {
    fn into_response(self) -> Response {
        warn!("revalidation rejected: {self}");

        let (status, payload) = match &self {
            RevalidateError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
            RevalidateError::InvalidSecret => {
                (StatusCode::UNAUTHORIZED, json!({ "error": self.to_string() }))
            }
            RevalidateError::MalformedBody(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string(), "details": details }),
            ),
        };

        (status, Json(payload)).into_response()
    }
}

/// Webhook body. The CMS module posts `secret`/`slug` as a form; JSON
/// callers send `secret`/`path`.
#[derive(Debug, Default, Deserialize)]
pub struct RevalidatePayload {
    pub secret: Option<String>,
    #[serde(alias = "slug")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Revalidated {
    pub revalidated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    pub timestamp: i64,
}

fn secrets_match(provided: &str, expected: &str) -> bool {
    Sha256::digest(provided.as_bytes())
        .ct_eq(&Sha256::digest(expected.as_bytes()))
        .into()
}

async fn read_payload(request: Request) -> Result<RevalidatePayload, RevalidateError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(payload) = Form::<RevalidatePayload>::from_request(request, &())
            .await
            .map_err(|rejection| RevalidateError::MalformedBody(rejection.body_text()))?;
        Ok(payload)
    } else if content_type.starts_with("application/json") {
        let Json(payload) = Json::<RevalidatePayload>::from_request(request, &())
            .await
            .map_err(|rejection| RevalidateError::MalformedBody(rejection.body_text()))?;
        Ok(payload)
    } else {
        // Untyped bodies are read as JSON; an empty one carries nothing.
        let body = Bytes::from_request(request, &())
            .await
            .map_err(|rejection| RevalidateError::MalformedBody(rejection.body_text()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(RevalidatePayload::default());
        }
        serde_json::from_slice(&body).map_err(|e| RevalidateError::MalformedBody(e.to_string()))
    }
}

fn header_secret(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// `POST /api/revalidate`: drop cached pages after a CMS change.
pub async fn revalidate(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<Revalidated>, RevalidateError> {
    let expected = state
        .config
        .revalidate_secret
        .clone()
        .ok_or(RevalidateError::NotConfigured)?;

    let from_header = header_secret(request.headers());
    let payload = read_payload(request).await?;

    let provided = from_header.or(payload.secret).unwrap_or_default();
    if !secrets_match(&provided, &expected) {
        return Err(RevalidateError::InvalidSecret);
    }

    state.pages.invalidate_tag(CONTENT_TAG).await;

    let timestamp = chrono::Utc::now().timestamp_millis();
    let response = match payload.path.filter(|path| !path.is_empty()) {
        Some(path) => {
            state.pages.invalidate_path(&path).await;
            info!("revalidated {path}");
            Revalidated {
                revalidated: true,
                path: Some(path),
                paths: None,
                timestamp,
            }
        }
        None => {
            let paths: Vec<String> = Locale::ALL.into_iter().map(Locale::home_path).collect();
            for path in &paths {
                state.pages.invalidate_path(path).await;
            }
            info!("revalidated locale home pages {}", paths.join(", "));
            Revalidated {
                revalidated: true,
                path: None,
                paths: Some(paths),
                timestamp,
            }
        }
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("hook", "hook"));
        assert!(!secrets_match("hook", "hook2"));
        assert!(!secrets_match("", "hook"));
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            RevalidateError::NotConfigured.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RevalidateError::InvalidSecret.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RevalidateError::MalformedBody("eof".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_payload_accepts_slug_alias() {
        let payload: RevalidatePayload =
            serde_json::from_str(r#"{"secret": "s", "slug": "/en/foo"}"#).unwrap();
        assert_eq!(payload.path.as_deref(), Some("/en/foo"));
    }
}
