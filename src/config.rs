//! Browser configuration.

use std::path::PathBuf;
use std::sync::Arc;

use sobject_browser_auth::TargetKey;
use sobject_browser_client::ClientConfig;
use sobject_browser_tooling::DEFAULT_LIMIT;

use crate::cache::{FileCache, KeyValueCache, MemoryCache, NamespacedCache};
use crate::error::{Error, ErrorKind, Result};

/// Configuration for the resolution chain and queries.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Which default org to browse.
    pub target: TargetKey,
    /// `LIMIT` for entity and field queries.
    pub limit: u32,
    /// Overrides the API version reported by the session exchange.
    pub api_version: Option<String>,
    /// Cache directory. `None` uses the user cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Persist the cache between runs.
    pub cache_enabled: bool,
    /// HTTP client settings.
    pub client: ClientConfig,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            target: TargetKey::DevHub,
            limit: DEFAULT_LIMIT,
            api_version: None,
            cache_dir: None,
            cache_enabled: true,
            client: ClientConfig::default(),
        }
    }
}

impl BrowserConfig {
    /// Create a new browser config builder.
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }

    /// Defaults overridden by `SOBJECT_BROWSER_LIMIT`,
    /// `SOBJECT_BROWSER_CACHE_DIR` and `SF_API_VERSION`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(raw) = lookup("SOBJECT_BROWSER_LIMIT") {
            let limit = raw.trim().parse::<u32>().map_err(|e| {
                Error::with_source(
                    ErrorKind::Config(format!("SOBJECT_BROWSER_LIMIT must be a positive integer, got '{raw}'")),
                    e,
                )
            })?;
            builder = builder.with_limit(limit);
        }

        if let Some(dir) = lookup("SOBJECT_BROWSER_CACHE_DIR").filter(|d| !d.is_empty()) {
            builder = builder.with_cache_dir(dir);
        }

        if let Some(version) = lookup("SF_API_VERSION").filter(|v| !v.is_empty()) {
            builder = builder.with_api_version(version);
        }

        builder.build()
    }

    /// The cache for this target.
    ///
    /// Entries live under the target's config key, so Dev Hub and default
    /// org caches never mix. With the cache disabled nothing outlives the
    /// process.
    pub fn open_cache(&self) -> Result<Arc<dyn KeyValueCache>> {
        let namespace = self.target.config_key();
        if !self.cache_enabled {
            return Ok(Arc::new(NamespacedCache::new(MemoryCache::new(), namespace)));
        }
        let files = match &self.cache_dir {
            Some(dir) => FileCache::with_path(dir),
            None => FileCache::new()?,
        };
        Ok(Arc::new(NamespacedCache::new(files, namespace)))
    }
}

/// Builder for BrowserConfig.
#[derive(Debug, Default)]
pub struct BrowserConfigBuilder {
    config: BrowserConfig,
}

impl BrowserConfigBuilder {
    /// Browse the default Dev Hub or the default org.
    pub fn with_target(mut self, target: TargetKey) -> Self {
        self.config.target = target;
        self
    }

    /// Set the query `LIMIT`.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.config.limit = limit;
        self
    }

    /// Pin the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = Some(version.into());
        self
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    /// Enable or disable the persistent cache.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.config.cache_enabled = enabled;
        self
    }

    /// Set the HTTP client configuration.
    pub fn with_client_config(mut self, client: ClientConfig) -> Self {
        self.config.client = client;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<BrowserConfig> {
        if self.config.limit == 0 {
            return Err(Error::new(ErrorKind::Config(
                "query limit must be at least 1".to_string(),
            )));
        }
        if let Some(version) = &self.config.api_version {
            let valid = version
                .split_once('.')
                .is_some_and(|(major, minor)| {
                    !major.is_empty()
                        && !minor.is_empty()
                        && major.chars().all(|c| c.is_ascii_digit())
                        && minor.chars().all(|c| c.is_ascii_digit())
                });
            if !valid {
                return Err(Error::new(ErrorKind::Config(format!(
                    "API version must look like '62.0', got '{version}'"
                ))));
            }
        }
        Ok(self.config)
    }
}
