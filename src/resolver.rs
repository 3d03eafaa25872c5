//! Default username lookup, memoized under the `username` key.

use std::sync::Arc;

use sobject_browser_auth::DefaultTargetSource;
use tracing::instrument;

use crate::cache::{keys, KeyValueCache};
use crate::error::Result;
use crate::memo::MemoCell;

/// Resolves the SF CLI default username once and remembers it.
///
/// A cached username is returned as is, even if that org has since been
/// logged out.
#[derive(Clone)]
pub struct CredentialResolver {
    source: Arc<dyn DefaultTargetSource>,
    cache: Arc<dyn KeyValueCache>,
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver").finish_non_exhaustive()
    }
}

impl CredentialResolver {
    pub fn new(source: Arc<dyn DefaultTargetSource>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { source, cache }
    }

    /// The configured default username.
    #[instrument(skip(self))]
    pub async fn default_username(&self) -> Result<String> {
        MemoCell::new(self.cache.clone(), keys::USERNAME)
            .get_or_fetch(|| async { Ok(self.source.default_target()?) })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::error::ErrorKind;
    use sobject_browser_auth::{Error as AuthError, ErrorKind as AuthErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        value: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl DefaultTargetSource for CountingSource {
        fn default_target(&self) -> sobject_browser_auth::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.value.map(str::to_string).ok_or_else(|| {
                AuthError::new(AuthErrorKind::NoDefaultTarget {
                    key: "target-dev-hub".to_string(),
                })
            })
        }
    }

    #[tokio::test]
    async fn test_one_lookup_then_cached() {
        let source = Arc::new(CountingSource {
            value: Some("hub@acme.dev"),
            calls: AtomicUsize::new(0),
        });
        let cache: Arc<dyn KeyValueCache> = Arc::new(MemoryCache::new());
        let resolver = CredentialResolver::new(source.clone(), cache.clone());

        assert_eq!(resolver.default_username().await.unwrap(), "hub@acme.dev");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(cache.has(keys::USERNAME).unwrap());

        assert_eq!(resolver.default_username().await.unwrap(), "hub@acme.dev");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_username_skips_config() {
        let source = Arc::new(CountingSource {
            value: Some("config@acme.dev"),
            calls: AtomicUsize::new(0),
        });
        let cache: Arc<dyn KeyValueCache> = Arc::new(MemoryCache::new());
        cache.set(keys::USERNAME, "\"cached@acme.dev\"").unwrap();

        let resolver = CredentialResolver::new(source.clone(), cache);
        assert_eq!(resolver.default_username().await.unwrap(), "cached@acme.dev");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_default_is_error_and_not_cached() {
        let source = Arc::new(CountingSource {
            value: None,
            calls: AtomicUsize::new(0),
        });
        let cache: Arc<dyn KeyValueCache> = Arc::new(MemoryCache::new());
        let resolver = CredentialResolver::new(source, cache.clone());

        let err = resolver.default_username().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NoDefaultTarget { .. }));
        assert!(!cache.has(keys::USERNAME).unwrap());
    }
}
