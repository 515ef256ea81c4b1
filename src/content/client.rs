use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    content::{
        error::ContentError,
        graphql::{GraphqlError, GraphqlRequest, QueryKind, QueryResponse},
        types::{Article, Translation},
    },
    locale::Locale,
};

/// Anything that can answer a GraphQL request with a JSON document.
#[async_trait]
pub trait GraphqlSource: Send + Sync {
    async fn execute(&self, request: &GraphqlRequest, locale: Locale) -> Result<Value, ContentError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleListing {
    pub articles: Vec<Article>,
    pub error: Option<String>,
}

impl ArticleListing {
    fn degraded(error: String) -> Self {
        Self {
            articles: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleLookup {
    pub article: Option<Article>,
    pub translations: Vec<Translation>,
    pub error: Option<String>,
}

/// Locale-aware reads of news content. Never fails outright: upstream
/// problems come back as an empty result carrying an error message.
#[derive(Clone)]
pub struct ContentClient {
    source: Arc<dyn GraphqlSource>,
}

impl ContentClient {
    pub fn new(source: Arc<dyn GraphqlSource>) -> Self {
        Self { source }
    }

    async fn fetch(
        &self,
        request: GraphqlRequest,
        kind: QueryKind,
        locale: Locale,
    ) -> Result<QueryResponse, ContentError> {
        let value = self.source.execute(&request, locale).await?;
        Ok(QueryResponse::decode(kind, value)?)
    }

    /// Newest articles published in `locale`, at most `first` of them.
    pub async fn list_articles(&self, locale: Locale, first: usize) -> ArticleListing {
        debug!("listing {first} articles for {locale}");

        match self
            .fetch(GraphqlRequest::list_articles(first), QueryKind::ArticleList, locale)
            .await
        {
            Ok(QueryResponse::ArticleList(mut articles)) => {
                articles.retain(|article| article.is_in(locale));
                articles.sort_by(|a, b| b.created.timestamp.cmp(&a.created.timestamp));
                articles.truncate(first);
                ArticleListing {
                    articles,
                    error: None,
                }
            }
            Ok(QueryResponse::Errors(errors)) => {
                let message = error_message(&errors);
                error!("error fetching news: {message}");
                ArticleListing::degraded(message)
            }
            Ok(QueryResponse::ArticleByPath(_)) => ArticleListing::default(),
            Err(e) => {
                error!("error fetching news: {e}");
                ArticleListing::degraded(e.to_string())
            }
        }
    }

    /// Resolve a locale-prefixed path such as `/en/news/some-story`.
    pub async fn article_by_path(&self, path: &str) -> ArticleLookup {
        let locale = path
            .trim_start_matches('/')
            .split('/')
            .next()
            .map(Locale::resolve)
            .unwrap_or_default();

        match self
            .fetch(GraphqlRequest::article_by_path(path), QueryKind::ArticleByPath, locale)
            .await
        {
            Ok(QueryResponse::ArticleByPath(article)) => ArticleLookup {
                translations: article
                    .as_ref()
                    .map(|article| article.translations().to_vec())
                    .unwrap_or_default(),
                article,
                error: None,
            },
            Ok(QueryResponse::Errors(errors)) => {
                let message = error_message(&errors);
                error!("error fetching article {path}: {message}");
                ArticleLookup {
                    error: Some(message),
                    ..Default::default()
                }
            }
            Ok(QueryResponse::ArticleList(_)) => ArticleLookup::default(),
            Err(e) => {
                error!("error fetching article {path}: {e}");
                ArticleLookup {
                    error: Some(e.to_string()),
                    ..Default::default()
                }
            }
        }
    }
}

fn error_message(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
