use axum::http::{header, request::Parts, HeaderValue, Method};
use reqwest::Url;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsMode;

/// CORS policy for the GraphQL proxy.
pub fn cors_layer(mode: CorsMode) -> CorsLayer {
    let allow_origin = match mode {
        CorsMode::Permissive => AllowOrigin::any(),
        CorsMode::SameHost => AllowOrigin::predicate(|origin: &HeaderValue, parts: &Parts| {
            let host = parts
                .headers
                .get(header::HOST)
                .and_then(|host| host.to_str().ok())
                .or_else(|| parts.uri.authority().map(|authority| authority.as_str()));
            same_host(origin, host)
        }),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Whether `origin`'s host (with any non-default port) is exactly `host`.
pub fn same_host(origin: &HeaderValue, host: Option<&str>) -> bool {
    let (Ok(origin), Some(host)) = (origin.to_str(), host) else {
        return false;
    };
    let Ok(url) = Url::parse(origin) else {
        return false;
    };
    let Some(origin_host) = url.host_str() else {
        return false;
    };

    match url.port() {
        Some(port) => format!("{origin_host}:{port}") == host,
        None => origin_host == host,
    }
}
