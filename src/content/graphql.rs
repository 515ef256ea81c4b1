use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::content::{
    queries::{GET_NEWS_BY_LANGUAGE, GET_NEWS_BY_PATH},
    types::Article,
};

pub const CONFIGURATION_REQUIRED: &str = "CONFIGURATION_REQUIRED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default)]
    pub variables: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphqlRequest {
    pub fn list_articles(first: usize) -> Self {
        Self {
            query: GET_NEWS_BY_LANGUAGE.to_string(),
            variables: json!({ "first": first }),
            operation_name: Some("GetNewsByLanguage".to_string()),
        }
    }

    pub fn article_by_path(path: &str) -> Self {
        Self {
            query: GET_NEWS_BY_PATH.to_string(),
            variables: json!({ "path": path }),
            operation_name: Some("GetNewsByPath".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExtensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_vars: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ErrorExtensions>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: None,
        }
    }

    pub fn configuration_required(missing: &[&str]) -> Self {
        Self {
            message: "Drupal is not configured yet. Please set up your environment variables."
                .to_string(),
            extensions: Some(ErrorExtensions {
                code: Some(CONFIGURATION_REQUIRED.to_string()),
                missing_vars: missing.iter().map(|var| var.to_string()).collect(),
            }),
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.code.as_deref()
    }
}

/// Wire envelope for an errors-only GraphQL response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListData {
    node_news_articles: Option<Connection>,
}

#[derive(Debug, Deserialize)]
struct Connection {
    #[serde(default)]
    nodes: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct RouteData {
    route: Option<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    entity: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    ArticleList,
    ArticleByPath,
}

/// The response shapes the site consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    ArticleList(Vec<Article>),
    ArticleByPath(Option<Article>),
    Errors(Vec<GraphqlError>),
}

impl QueryResponse {
    pub fn decode(kind: QueryKind, value: Value) -> Result<Self, serde_json::Error> {
        match kind {
            QueryKind::ArticleList => {
                let envelope: Envelope<ListData> = serde_json::from_value(value)?;
                if !envelope.errors.is_empty() {
                    return Ok(Self::Errors(envelope.errors));
                }
                let nodes = envelope
                    .data
                    .and_then(|data| data.node_news_articles)
                    .map(|connection| connection.nodes)
                    .unwrap_or_default();
                Ok(Self::ArticleList(nodes))
            }
            QueryKind::ArticleByPath => {
                let envelope: Envelope<RouteData> = serde_json::from_value(value)?;
                if !envelope.errors.is_empty() {
                    return Ok(Self::Errors(envelope.errors));
                }
                // Routes resolving to something other than an article count as missing.
                let article = envelope
                    .data
                    .and_then(|data| data.route)
                    .and_then(|route| route.entity)
                    .and_then(|entity| serde_json::from_value::<Article>(entity).ok());
                Ok(Self::ArticleByPath(article))
            }
        }
    }
}
