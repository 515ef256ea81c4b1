use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::auth::oauth::CredentialSource;

/// Credentials this close to expiry are treated as already expired.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

pub fn expiry_margin() -> TimeDelta {
    TimeDelta::seconds(EXPIRY_MARGIN_SECS)
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedCredential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedCredential {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - expiry_margin()
    }
}

/// Process-wide bearer credential for the CMS.
///
/// `acquire` reuses the cached credential while it is usable and otherwise
/// requests a new one inline. Concurrent callers that all observe a stale
/// credential will each request their own; the last write wins, and every
/// write is a complete token/expiry pair. Failures are not cached.
pub struct TokenCache {
    source: Arc<dyn CredentialSource>,
    clock: Arc<dyn Clock>,
    cached: RwLock<Option<CachedCredential>>,
}

impl TokenCache {
    pub fn new(source: Arc<dyn CredentialSource>) -> Self {
        Self::with_clock(source, Arc::new(SystemClock))
    }

    pub fn with_clock(source: Arc<dyn CredentialSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            cached: RwLock::new(None),
        }
    }

    pub async fn acquire(&self) -> Option<String> {
        let now = self.clock.now();

        if let Some(credential) = self.cached.read().await.as_ref() {
            if credential.is_usable(now) {
                return Some(credential.token.clone());
            }
            debug!("cached credential expires at {}, refreshing", credential.expires_at);
        }

        let issued = match self.source.request_token().await {
            Ok(issued) => issued,
            Err(e) => {
                warn!("auth error: {e}");
                return None;
            }
        };

        let issued_at = self.clock.now();
        let credential = CachedCredential {
            token: issued.authorization,
            expires_at: issued_at
                .checked_add_signed(issued.lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        let token = credential.token.clone();
        *self.cached.write().await = Some(credential);

        Some(token)
    }

    pub async fn cached(&self) -> Option<CachedCredential> {
        self.cached.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::auth::{error::AuthError, oauth::IssuedToken};

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(now)))
        }

        fn set(&self, now: DateTime<Utc>) {
            *self.0.lock().unwrap() = now;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl CredentialSource for CountingSource {
        async fn request_token(&self) -> Result<IssuedToken, AuthError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(AuthError::MissingToken);
            }
            Ok(IssuedToken {
                authorization: format!("Bearer token-{n}"),
                lifetime: TimeDelta::seconds(3600),
            })
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_reuse_until_margin() {
        let clock = ManualClock::at(start());
        let source = Arc::new(CountingSource::default());
        let cache = TokenCache::with_clock(source.clone(), clock.clone());

        assert_eq!(cache.acquire().await.as_deref(), Some("Bearer token-1"));
        let expires_at = cache.cached().await.unwrap().expires_at;
        assert_eq!(expires_at, start() + TimeDelta::seconds(3600));

        clock.set(expires_at - expiry_margin() - TimeDelta::seconds(1));
        assert_eq!(cache.acquire().await.as_deref(), Some("Bearer token-1"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        clock.set(expires_at - expiry_margin() + TimeDelta::seconds(1));
        assert_eq!(cache.acquire().await.as_deref(), Some("Bearer token-2"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_overwrites_expiry() {
        let clock = ManualClock::at(start());
        let source = Arc::new(CountingSource::default());
        let cache = TokenCache::with_clock(source, clock.clone());

        cache.acquire().await;
        let later = start() + TimeDelta::seconds(4000);
        clock.set(later);
        cache.acquire().await;

        let cached = cache.cached().await.unwrap();
        assert_eq!(cached.token, "Bearer token-2");
        assert_eq!(cached.expires_at, later + TimeDelta::seconds(3600));
    }

    #[tokio::test]
    async fn test_failure_yields_no_credential() {
        let source = Arc::new(CountingSource {
            fail: true,
            ..Default::default()
        });
        let cache = TokenCache::with_clock(source.clone(), ManualClock::at(start()));

        assert_eq!(cache.acquire().await, None);
        assert_eq!(cache.acquire().await, None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(cache.cached().await.is_none());
    }
}
