//! Memoize-on-first-use over a [`KeyValueCache`] entry.
//!
//! A cell moves `Empty -> Fetching -> Cached`. A failed fetch leaves it
//! `Empty`, so the next call fetches again. Once `Cached` it stays that way
//! until someone removes the key from the cache.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::KeyValueCache;
use crate::error::Result;

/// Observable state of a [`MemoCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    Empty,
    Fetching,
    Cached,
}

/// A typed view of one cache key.
pub struct MemoCell<T> {
    cache: Arc<dyn KeyValueCache>,
    key: String,
    fetching: AtomicBool,
    _value: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for MemoCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoCell")
            .field("key", &self.key)
            .field("fetching", &self.fetching.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<T: Serialize + DeserializeOwned> MemoCell<T> {
    pub fn new(cache: Arc<dyn KeyValueCache>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
            fetching: AtomicBool::new(false),
            _value: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The cached value, if one is present and deserializes.
    ///
    /// An entry that does not deserialize counts as absent.
    pub fn peek(&self) -> Result<Option<T>> {
        let Some(raw) = self.cache.get(&self.key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Cached value is unreadable, treating as a miss");
                Ok(None)
            }
        }
    }

    pub fn state(&self) -> Result<MemoState> {
        if self.fetching.load(Ordering::Acquire) {
            return Ok(MemoState::Fetching);
        }
        Ok(match self.peek()? {
            Some(_) => MemoState::Cached,
            None => MemoState::Empty,
        })
    }

    /// Store `value`, replacing whatever was there.
    pub fn store(&self, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.cache.set(&self.key, &raw)
    }

    /// Return the cached value, or run `fetch`, cache its result and return it.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.peek()? {
            debug!(key = %self.key, "Cache hit");
            return Ok(value);
        }

        debug!(key = %self.key, "Cache miss");
        let fetched = {
            let _fetching = FetchingGuard::set(&self.fetching);
            fetch().await
        };

        let value = fetched?;
        self.store(&value)?;
        Ok(value)
    }
}

/// Keeps `fetching` set until dropped, including when the fetch future is
/// cancelled or panics.
struct FetchingGuard<'a>(&'a AtomicBool);

impl<'a> FetchingGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for FetchingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
