use serde::Serialize;
use tracing::{info, warn};

pub const BASE_URL_VAR: &str = "DRUPAL_BASE_URL";
pub const CLIENT_ID_VAR: &str = "DRUPAL_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "DRUPAL_CLIENT_SECRET";
pub const REVALIDATE_SECRET_VAR: &str = "DRUPAL_REVALIDATE_SECRET";
pub const DEMO_MODE_VAR: &str = "DEMO_MODE";
pub const APP_ENV_VAR: &str = "APP_ENV";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorsMode {
    /// Any origin may read proxy responses.
    Permissive,
    /// Only an origin whose host matches the request `Host` header.
    #[default]
    SameHost,
}

/// External settings the site depends on. Empty values count as absent.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub revalidate_secret: Option<String>,
    pub demo_mode: bool,
    pub cors: CorsMode,
}

/// Connection details for the CMS, present only when fully configured.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSettings {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl BackendSettings {
    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.base_url)
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStatus {
    pub is_configured: bool,
    pub missing_vars: Vec<&'static str>,
}

impl Config {
    /// Reads the process environment; `main` loads `.env` beforehand.
    pub fn from_env() -> Self {
        let config = Self::from_lookup(|key| std::env::var(key).ok());
        let status = config.status();
        if status.is_configured {
            info!("backend configured at {}", config.base_url.as_deref().unwrap_or_default());
        } else {
            warn!("missing settings: {}", status.missing_vars.join(", "));
        }
        if config.demo_mode {
            info!("demo mode enabled, content is served from the bundled fixture");
        }

        config
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            base_url: read(BASE_URL_VAR).map(|url| url.trim_end_matches('/').to_string()),
            client_id: read(CLIENT_ID_VAR),
            client_secret: read(CLIENT_SECRET_VAR),
            revalidate_secret: read(REVALIDATE_SECRET_VAR),
            demo_mode: read(DEMO_MODE_VAR).is_some_and(|flag| flag == "true"),
            cors: match read(APP_ENV_VAR).as_deref() {
                Some("development") => CorsMode::Permissive,
                _ => CorsMode::SameHost,
            },
        }
    }

    pub fn backend(&self) -> Option<BackendSettings> {
        Some(BackendSettings {
            base_url: self.base_url.clone()?,
            client_id: self.client_id.clone()?,
            client_secret: self.client_secret.clone()?,
        })
    }

    /// Settings the GraphQL proxy cannot run without.
    pub fn missing_backend_settings(&self) -> Vec<&'static str> {
        [
            (BASE_URL_VAR, &self.base_url),
            (CLIENT_ID_VAR, &self.client_id),
            (CLIENT_SECRET_VAR, &self.client_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key)
        .collect()
    }

    pub fn status(&self) -> ConfigStatus {
        let mut missing_vars = self.missing_backend_settings();
        if self.revalidate_secret.is_none() {
            missing_vars.push(REVALIDATE_SECRET_VAR);
        }

        ConfigStatus {
            is_configured: missing_vars.is_empty(),
            missing_vars,
        }
    }
}
