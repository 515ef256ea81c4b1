use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("OAuth token endpoint unreachable")]
    Transport(#[from] reqwest::Error),

    #[error("OAuth token request failed with status {0}")]
    Rejected(StatusCode),

    #[error("OAuth response did not include an access token")]
    MissingToken,
}
