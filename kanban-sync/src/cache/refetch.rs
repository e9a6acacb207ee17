//! Reloading cached views from the authority

use super::key::CacheKey;
use super::store::QueryCache;
use crate::authority::Authority;
use crate::error::{Result, SyncError};
use crate::types::ActorId;
use serde_json::Value;
use std::sync::Arc;

/// Refetches views on behalf of one actor
#[derive(Clone)]
pub struct Refetcher {
    authority: Arc<dyn Authority>,
    cache: Arc<QueryCache>,
    actor: ActorId,
}

impl Refetcher {
    pub fn new(authority: Arc<dyn Authority>, cache: Arc<QueryCache>, actor: ActorId) -> Self {
        Self {
            authority,
            cache,
            actor,
        }
    }

    /// Fetch a view from the authority, without touching the cache
    pub async fn fetch(&self, key: &CacheKey) -> Result<Value> {
        match key {
            CacheKey::Entity { kind, id } => self.authority.get(&self.actor, *kind, id).await,
            CacheKey::List { kind, parent_id } => {
                self.authority.list(&self.actor, *kind, parent_id).await
            }
        }
    }

    /// Load a view into the cache, whether or not it was cached before
    pub async fn load(&self, key: &CacheKey) -> Result<Value> {
        let value = self.fetch(key).await?;
        self.cache.insert_confirmed(key.clone(), value.clone());
        Ok(value)
    }

    /// Reload a cached view. Views that are not cached are skipped.
    ///
    /// A view that no longer exists, or that the actor lost access to, is evicted.
    /// Returns whether the view was reloaded.
    pub async fn refetch(&self, key: &CacheKey) -> Result<bool> {
        if !self.cache.contains(key) {
            return Ok(false);
        }
        match self.fetch(key).await {
            Ok(value) => {
                tracing::trace!(%key, "refetched view");
                self.cache.insert_confirmed(key.clone(), value);
                Ok(true)
            }
            Err(error @ (SyncError::NotFound { .. } | SyncError::Authorization { .. })) => {
                tracing::debug!(%key, %error, "evicting view");
                self.cache.remove(key);
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }

    /// Reload every cached view among `keys`, returning how many were reloaded
    pub async fn refetch_all(&self, keys: &[CacheKey]) -> Result<usize> {
        let mut reloaded = 0;
        for key in keys {
            if self.refetch(key).await? {
                reloaded += 1;
            }
        }
        Ok(reloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::MemoryAuthority;
    use crate::types::EntityKind;
    use kanban_sync_config::SyncConfig;
    use serde_json::json;

    async fn fixture() -> (Arc<MemoryAuthority>, Arc<QueryCache>, String) {
        let authority = Arc::new(MemoryAuthority::new(&SyncConfig::default()));
        let board = authority
            .create(
                &ActorId::from_string("alice"),
                EntityKind::Board,
                None,
                json!({"name": "Roadmap"}),
            )
            .await
            .unwrap();
        let board_id = board["id"].as_str().unwrap().to_string();
        (authority, Arc::new(QueryCache::new()), board_id)
    }

    #[tokio::test]
    async fn test_refetch_skips_uncached_views() {
        let (authority, cache, board_id) = fixture().await;
        let refetcher = Refetcher::new(authority, cache.clone(), ActorId::from_string("alice"));
        let key = CacheKey::list(EntityKind::Column, board_id);

        assert!(!refetcher.refetch(&key).await.unwrap());
        assert!(!cache.contains(&key));

        refetcher.load(&key).await.unwrap();
        assert_eq!(cache.value(&key), Some(json!([])));
    }

    #[tokio::test]
    async fn test_lost_access_evicts() {
        let (authority, cache, board_id) = fixture().await;
        let key = CacheKey::entity(EntityKind::Board, board_id);
        cache.insert_confirmed(key.clone(), json!({"stale": true}));

        let outsider = Refetcher::new(authority, cache.clone(), ActorId::from_string("mallory"));
        assert!(!outsider.refetch(&key).await.unwrap());
        assert!(!cache.contains(&key));
    }
}
