//! Entity and field queries, memoized per cache key.

use std::sync::Arc;

use sobject_browser_auth::SessionExchange;
use sobject_browser_client::security::soql;
use sobject_browser_tooling::{EntityDefinition, FieldDefinition, DEFAULT_LIMIT};
use tracing::instrument;

use crate::cache::{keys, KeyValueCache};
use crate::error::{Error, ErrorKind, Result};
use crate::memo::MemoCell;
use crate::session::SessionProvider;

/// Runs the two metadata queries through the session provider.
///
/// A cache hit returns the stored records without touching the session.
pub struct QueryRunner<E> {
    sessions: SessionProvider<E>,
    cache: Arc<dyn KeyValueCache>,
    limit: u32,
}

impl<E> std::fmt::Debug for QueryRunner<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryRunner")
            .field("sessions", &self.sessions)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl<E: SessionExchange> QueryRunner<E> {
    pub fn new(sessions: SessionProvider<E>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self {
            sessions,
            cache,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Set the query `LIMIT`.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn sessions(&self) -> &SessionProvider<E> {
        &self.sessions
    }

    pub fn cache(&self) -> &Arc<dyn KeyValueCache> {
        &self.cache
    }

    /// Layoutable entities, from the `response` entry or the Tooling API.
    #[instrument(skip(self))]
    pub async fn list_entities(&self) -> Result<Vec<EntityDefinition>> {
        MemoCell::new(self.cache.clone(), keys::RESPONSE)
            .get_or_fetch(|| async {
                let session = self.sessions.session().await?;
                Ok(session.client().list_entity_definitions(self.limit).await?)
            })
            .await
    }

    /// Fields of `entity`, from the `fields.<entity>` entry or the Tooling API.
    ///
    /// Names that are not plain API names are rejected before the cache or
    /// the network is consulted. Other names are resolved against the entity
    /// list first, so the entry is keyed by the org's spelling of the name
    /// and an unknown name is an [`ErrorKind::UnknownEntity`].
    #[instrument(skip(self))]
    pub async fn list_fields(&self, entity: &str) -> Result<Vec<FieldDefinition>> {
        if !soql::is_safe_sobject_name(entity) {
            return Err(Error::new(ErrorKind::InvalidEntityName(entity.to_string())));
        }

        let name = self.find_entity(entity).await?.qualified_api_name;
        MemoCell::new(self.cache.clone(), keys::fields(&name))
            .get_or_fetch(|| async {
                let session = self.sessions.session().await?;
                Ok(session.client().list_field_definitions(&name, self.limit).await?)
            })
            .await
    }

    /// One entity from the entity list, matched on API name ignoring case.
    pub async fn find_entity(&self, name: &str) -> Result<EntityDefinition> {
        self.list_entities()
            .await?
            .into_iter()
            .find(|e| e.qualified_api_name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::new(ErrorKind::UnknownEntity(name.to_string())))
    }

    /// Base URL for setup links.
    ///
    /// Read from the `baseUrl` entry when present, so printing links for a
    /// cached entity list does not need a session.
    pub async fn base_url(&self) -> Result<String> {
        MemoCell::new(self.cache.clone(), keys::BASE_URL)
            .get_or_fetch(|| async {
                let session = self.sessions.session().await?;
                Ok(session.base_url().to_string())
            })
            .await
    }
}
