use std::error::Error;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::content::graphql::{ErrorPayload, GraphqlError};

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Backend settings missing: {}", .0.join(", "))]
    NotConfigured(Vec<&'static str>),

    #[error("Failed to proxy GraphQL request")]
    Transport(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            // GraphQL clients branch on the error code, so this stays a 200.
            ProxyError::NotConfigured(missing) => {
                let payload = ErrorPayload {
                    errors: vec![GraphqlError::configuration_required(&missing)],
                };
                (StatusCode::OK, Json(payload)).into_response()
            }
            ProxyError::Transport(e) => {
                error!("GraphQL proxy error: {e}: {:?}", e.source());
                let payload = json!({
                    "error": "Failed to proxy GraphQL request",
                    "details": e.to_string(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
            }
        }
    }
}
