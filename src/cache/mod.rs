//! Rendered page cache.
//!
//! Pages are stored under their request path along with the tags they were
//! built from, so the revalidation webhook can drop a single path or every
//! page that depends on CMS content. Tag invalidation bumps a per-tag
//! generation; entries stamped with an older generation read as missing.
//! A [`Ticket`] taken before a page is built carries the generations the
//! build started from, so an invalidation that lands mid-build still wins.

use std::{collections::HashMap, sync::Arc, time::Duration};

use bytes::Bytes;
use moka::future::Cache;
use smart_default::SmartDefault;
use tokio::sync::RwLock;
use tracing::debug;

/// Tag carried by every page built from CMS content.
pub const CONTENT_TAG: &str = "drupal";

#[derive(Debug, Clone, SmartDefault)]
pub struct PageCacheConfig {
    /// Pages are rebuilt at least this often even without a webhook.
    #[default(Duration::from_secs(3600))]
    pub ttl: Duration,
    #[default(1000)]
    pub max_capacity: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    pub body: Bytes,
    pub tags: Vec<String>,
}

impl CachedPage {
    pub fn new(body: impl Into<Bytes>, tags: &[&str]) -> Self {
        Self {
            body: body.into(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        }
    }
}

/// Tag generations observed when a page build started.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    tags: Vec<String>,
    stamps: Arc<[u64]>,
}

#[derive(Debug, Clone)]
struct Entry {
    page: CachedPage,
    stamps: Arc<[u64]>,
}

#[derive(Clone)]
pub struct PageCache {
    pages: Cache<String, Entry>,
    generations: Arc<RwLock<HashMap<String, u64>>>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(PageCacheConfig::default())
    }
}

fn cache_key(path: &str) -> String {
    match path.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}

impl PageCache {
    pub fn new(config: PageCacheConfig) -> Self {
        let pages = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            pages,
            generations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn stamps(&self, tags: &[String]) -> Vec<u64> {
        let generations = self.generations.read().await;
        tags.iter()
            .map(|tag| generations.get(tag).copied().unwrap_or_default())
            .collect()
    }

    pub async fn get(&self, path: &str) -> Option<CachedPage> {
        let key = cache_key(path);
        let entry = self.pages.get(&key).await?;

        if self.stamps(&entry.page.tags).await.as_slice() != &*entry.stamps {
            self.pages.invalidate(&key).await;
            return None;
        }

        Some(entry.page)
    }

    /// Snapshot the current generations of `tags`. Take it before fetching
    /// the content a page is built from.
    pub async fn ticket(&self, tags: &[&str]) -> Ticket {
        let tags: Vec<String> = tags.iter().map(|tag| tag.to_string()).collect();
        let stamps = self.stamps(&tags).await.into();
        Ticket { tags, stamps }
    }

    /// Store a page built under `ticket`. If one of its tags was invalidated
    /// since the ticket was taken, the entry is already stale.
    pub async fn insert_built(&self, path: &str, ticket: Ticket, body: impl Into<Bytes>) {
        let page = CachedPage {
            body: body.into(),
            tags: ticket.tags,
        };
        self.pages
            .insert(
                cache_key(path),
                Entry {
                    page,
                    stamps: ticket.stamps,
                },
            )
            .await;
    }

    pub async fn insert(&self, path: &str, page: CachedPage) {
        let stamps = self.stamps(&page.tags).await.into();
        self.pages.insert(cache_key(path), Entry { page, stamps }).await;
    }

    pub async fn invalidate_path(&self, path: &str) {
        debug!("invalidating page {path}");
        self.pages.invalidate(&cache_key(path)).await;
    }

    /// Drop every page carrying `tag`. Takes effect for reads immediately.
    pub async fn invalidate_tag(&self, tag: &str) {
        debug!("invalidating pages tagged {tag}");
        *self
            .generations
            .write()
            .await
            .entry(tag.to_string())
            .or_default() += 1;
    }
}
