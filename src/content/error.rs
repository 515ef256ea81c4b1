use http::StatusCode;
use thiserror::Error;

use crate::proxy::ProxyError;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Error reaching the content backend")]
    Proxy(#[from] ProxyError),

    #[error("Content backend responded with status {0}: {1}")]
    Status(StatusCode, String),

    #[error("Unexpected response from the content backend")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Graphql(String),
}
