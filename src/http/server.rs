use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use reqwest::Client;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    cache::PageCache,
    config::Config,
    content::{ContentClient, ContentError, GraphqlSource, MockSource},
    http::{cors::cors_layer, pages, proxy, revalidate},
    proxy::GraphqlProxy,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub proxy: Arc<GraphqlProxy>,
    pub content: ContentClient,
    pub pages: PageCache,
}

impl AppState {
    /// Wire up the proxy and content client. In demo mode content comes
    /// from the bundled fixture; the proxy route still targets the CMS.
    pub fn new(config: Config) -> Result<Self, ContentError> {
        let proxy = Arc::new(GraphqlProxy::new(Client::new(), &config));

        let source: Arc<dyn GraphqlSource> = if config.demo_mode {
            Arc::new(MockSource::bundled()?)
        } else {
            proxy.clone()
        };

        Ok(Self::with_source(config, proxy, source))
    }

    pub fn with_source(
        config: Config,
        proxy: Arc<GraphqlProxy>,
        source: Arc<dyn GraphqlSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            proxy,
            content: ContentClient::new(source),
            pages: PageCache::default(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/api/graphql",
            post(proxy::graphql)
                .get(proxy::graphql)
                .options(proxy::preflight),
        )
        .layer(cors_layer(state.config.cors));

    info!("CORS policy for /api/graphql: {:?}", state.config.cors);

    Router::new()
        .route("/health", get(health))
        .route("/api/revalidate", post(revalidate::revalidate))
        .route("/", get(pages::root))
        .route("/{locale}", get(pages::home))
        .route("/{locale}/{*slug}", get(pages::article))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "configured": state.config.status().is_configured,
        "demoMode": state.config.demo_mode,
    }))
}
