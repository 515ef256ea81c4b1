use std::error::Error;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Article not found: {0}")]
    ArticleNotFound(String),

    #[error("Error encountered building page")]
    Serialize(#[from] serde_json::Error),
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = match self {
            RestError::ArticleNotFound(_) => StatusCode::NOT_FOUND,
            RestError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{}: {:?}", self, self.source());
        }

        let payload = Json(json!({"message": self.to_string()}));

        (status, payload).into_response()
    }
}
