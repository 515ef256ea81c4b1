use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::debug;

use crate::{http::server::AppState, proxy::ProxyError};

/// `POST`/`GET /api/graphql`: relay the body to the CMS and its answer back.
pub async fn graphql(State(state): State<AppState>, body: Bytes) -> Result<Response, ProxyError> {
    debug!("proxying {} byte GraphQL request", body.len());

    let relayed = state.proxy.forward(body).await?;

    Ok((
        relayed.status,
        [(header::CONTENT_TYPE, "application/json")],
        relayed.body,
    )
        .into_response())
}

/// Bare `OPTIONS`; CORS preflights are answered by the CORS layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
