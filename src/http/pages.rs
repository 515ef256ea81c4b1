//! Page data for the site routes.
//!
//! Markup is produced elsewhere; these handlers return the view model each
//! page renders from, cached per path until the TTL lapses or the
//! revalidation webhook drops it.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::{
    cache::CONTENT_TAG,
    content::{Article, Translation},
    error::RestError,
    http::server::AppState,
    locale::{switcher_links, Locale, LocaleLink},
};

pub const HOME_PAGE_SIZE: usize = 20;
pub const CACHE_STATUS_HEADER: &str = "x-page-cache";

/// Message keys the home page renders its title and description from.
pub const HOME_TITLE_KEY: &str = "latestNews";
pub const HOME_DESCRIPTION_KEY: &str = "siteDescription";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequired {
    pub setup_required: bool,
    pub locale: Locale,
    pub missing_vars: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub locale: Locale,
    pub title: &'static str,
    pub description: &'static str,
    pub articles: Vec<Article>,
    pub error: Option<String>,
    pub languages: Vec<LocaleLink>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationLink {
    pub locale: Option<Locale>,
    pub href: String,
}

impl From<&Translation> for TranslationLink {
    fn from(translation: &Translation) -> Self {
        Self {
            locale: Locale::from_code(&translation.langcode.id),
            href: translation.path.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub locale: Locale,
    pub title: String,
    pub description: Option<String>,
    pub hero_image_url: Option<String>,
    pub article: Article,
    pub translations: Vec<TranslationLink>,
    pub back_href: String,
    pub languages: Vec<LocaleLink>,
}

fn setup_required(state: &AppState, locale: Locale) -> Option<Response> {
    if state.config.demo_mode {
        return None;
    }

    let status = state.config.status();
    if status.is_configured {
        return None;
    }

    let payload = SetupRequired {
        setup_required: true,
        locale,
        missing_vars: status.missing_vars,
    };
    Some((StatusCode::OK, Json(payload)).into_response())
}

fn page_response(body: Bytes, cache_status: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (
                header::HeaderName::from_static(CACHE_STATUS_HEADER),
                HeaderValue::from_static(cache_status),
            ),
        ],
        body,
    )
        .into_response()
}

/// `GET /`: send visitors to the default locale.
pub async fn root() -> Redirect {
    Redirect::temporary(&Locale::DEFAULT.home_path())
}

/// `GET /{locale}`: latest articles in one language.
pub async fn home(
    Path(segment): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, RestError> {
    let locale = Locale::resolve(&segment);
    if let Some(setup) = setup_required(&state, locale) {
        return Ok(setup);
    }

    let path = format!("/{segment}");
    if let Some(page) = state.pages.get(&path).await {
        debug!("page cache hit for {path}");
        return Ok(page_response(page.body, "HIT"));
    }

    let ticket = state.pages.ticket(&[CONTENT_TAG]).await;
    let listing = state.content.list_articles(locale, HOME_PAGE_SIZE).await;
    let degraded = listing.error.is_some();
    let page = HomePage {
        locale,
        title: HOME_TITLE_KEY,
        description: HOME_DESCRIPTION_KEY,
        articles: listing.articles,
        error: listing.error,
        languages: switcher_links(locale),
    };
    let body = Bytes::from(serde_json::to_vec(&page)?);

    // Error states are rebuilt on the next request rather than cached.
    if !degraded {
        state.pages.insert_built(&path, ticket, body.clone()).await;
    }

    Ok(page_response(body, "MISS"))
}

/// `GET /{locale}/{*slug}`: a single article with links to its translations.
pub async fn article(
    Path((segment, slug)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Response, RestError> {
    let locale = Locale::resolve(&segment);
    if let Some(setup) = setup_required(&state, locale) {
        return Ok(setup);
    }

    let path = format!("/{segment}/{slug}");
    if let Some(page) = state.pages.get(&path).await {
        debug!("page cache hit for {path}");
        return Ok(page_response(page.body, "HIT"));
    }

    let ticket = state.pages.ticket(&[CONTENT_TAG]).await;
    let lookup = state.content.article_by_path(&path).await;
    let article = lookup
        .article
        .ok_or_else(|| RestError::ArticleNotFound(path.clone()))?;

    let page = ArticlePage {
        locale,
        title: article.title.clone(),
        description: article.description(),
        hero_image_url: article.hero_image_url(),
        translations: lookup.translations.iter().map(TranslationLink::from).collect(),
        back_href: locale.home_path(),
        languages: switcher_links(locale),
        article,
    };
    let body = Bytes::from(serde_json::to_vec(&page)?);

    state.pages.insert_built(&path, ticket, body.clone()).await;

    Ok(page_response(body, "MISS"))
}
