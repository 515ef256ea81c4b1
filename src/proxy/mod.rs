//! GraphQL reverse proxy in front of the CMS.
//!
//! Request bodies are forwarded verbatim to `{base}/graphql` with the cached
//! OAuth credential attached. The upstream status and body come back
//! untouched. The same component backs both the `/api/graphql` route and the
//! server-side content client.

pub mod error;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    auth::{OAuthClient, TokenCache},
    config::Config,
    content::{
        graphql::{ErrorPayload, GraphqlError, GraphqlRequest},
        ContentError, GraphqlSource,
    },
    locale::Locale,
};

pub use error::ProxyError;

struct Upstream {
    graphql_url: String,
    tokens: TokenCache,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    pub status: StatusCode,
    pub body: Bytes,
}

pub struct GraphqlProxy {
    http: Client,
    upstream: Option<Upstream>,
    missing: Vec<&'static str>,
}

impl GraphqlProxy {
    pub fn new(http: Client, config: &Config) -> Self {
        let upstream = config.backend().map(|backend| {
            let oauth = OAuthClient::new(http.clone(), &backend);
            Upstream {
                graphql_url: backend.graphql_url(),
                tokens: TokenCache::new(Arc::new(oauth)),
            }
        });

        Self {
            http,
            upstream,
            missing: config.missing_backend_settings(),
        }
    }

    /// Proxy to `graphql_url` using an externally built token cache.
    pub fn with_tokens(http: Client, graphql_url: impl Into<String>, tokens: TokenCache) -> Self {
        Self {
            http,
            upstream: Some(Upstream {
                graphql_url: graphql_url.into(),
                tokens,
            }),
            missing: Vec::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.upstream.is_some()
    }

    pub async fn forward(&self, body: Bytes) -> Result<Relayed, ProxyError> {
        let upstream = self
            .upstream
            .as_ref()
            .ok_or_else(|| ProxyError::NotConfigured(self.missing.clone()))?;

        let mut request = self
            .http
            .post(&upstream.graphql_url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");

        match upstream.tokens.acquire().await {
            Some(token) => request = request.header(header::AUTHORIZATION, token),
            None => info!("forwarding GraphQL request without credentials"),
        }

        let response = request.body(body).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!("upstream answered {status} with {} bytes", body.len());

        Ok(Relayed { status, body })
    }
}

#[async_trait]
impl GraphqlSource for GraphqlProxy {
    async fn execute(&self, request: &GraphqlRequest, _locale: Locale) -> Result<Value, ContentError> {
        let body = Bytes::from(serde_json::to_vec(request)?);

        let relayed = match self.forward(body).await {
            Ok(relayed) => relayed,
            Err(ProxyError::NotConfigured(missing)) => {
                let payload = ErrorPayload {
                    errors: vec![GraphqlError::configuration_required(&missing)],
                };
                return Ok(serde_json::to_value(payload)?);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Value>(&relayed.body) {
            Ok(value) => Ok(value),
            Err(_) if !relayed.status.is_success() => Err(ContentError::Status(
                relayed.status,
                String::from_utf8_lossy(&relayed.body).into_owned(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
