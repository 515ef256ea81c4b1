//! Offline content for demos.
//!
//! When demo mode is on, content queries are answered from the bundled
//! fixture in `data/mock/articles.json` and never reach the CMS.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::{
    content::{
        client::GraphqlSource,
        error::ContentError,
        graphql::GraphqlRequest,
        types::Article,
    },
    locale::Locale,
};

const BUNDLED_FIXTURE: &str = include_str!("../../data/mock/articles.json");

#[derive(Debug, Deserialize)]
struct Fixture {
    articles: Vec<Article>,
}

#[derive(Debug, Clone)]
pub struct MockSource {
    articles: Vec<Article>,
}

impl MockSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    pub fn from_json(fixture: &str) -> Result<Self, ContentError> {
        let fixture: Fixture = serde_json::from_str(fixture)?;
        Ok(Self::new(fixture.articles))
    }

    pub fn bundled() -> Result<Self, ContentError> {
        Self::from_json(BUNDLED_FIXTURE)
    }

    /// Articles whose primary language term is `locale`, by code or native name.
    pub fn articles_for(&self, locale: Locale) -> Vec<Article> {
        self.articles
            .iter()
            .filter(|article| {
                article.languages().first().is_some_and(|term| {
                    term.code.as_deref() == Some(locale.code())
                        || term.name.as_deref() == Some(locale.native_name())
                })
            })
            .cloned()
            .collect()
    }

    pub fn article_by_path(&self, path: &str) -> Option<&Article> {
        self.articles.iter().find(|article| article.path == path)
    }

    /// Answer a raw GraphQL request body the way the CMS would.
    pub fn handle_query(&self, body: &str, locale: Locale) -> Value {
        let request: GraphqlRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => {
                error!("mock query error: {e}");
                return json!({ "data": {}, "errors": [{ "message": "Mock data error" }] });
            }
        };

        if let Some(path) = request.variables.get("path").and_then(Value::as_str) {
            if let Some(article) = self.article_by_path(path) {
                debug!("mock route hit for {path}");
                return json!({
                    "data": {
                        "route": { "__typename": "RouteInternal", "entity": article }
                    }
                });
            }
        }

        if request.query.contains("GetNewsArticles") || request.query.contains("nodeNewsArticles") {
            return json!({
                "data": {
                    "nodeNewsArticles": {
                        "__typename": "NodeNewsArticleConnection",
                        "nodes": self.articles_for(locale),
                    }
                }
            });
        }

        json!({ "data": {} })
    }
}

#[async_trait]
impl GraphqlSource for MockSource {
    async fn execute(&self, request: &GraphqlRequest, locale: Locale) -> Result<Value, ContentError> {
        let body = serde_json::to_string(request)?;
        Ok(self.handle_query(&body, locale))
    }
}
