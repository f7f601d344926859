//! Tree cache store and read-through loading

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::host::CodeHost;
use super::tree::{CachedFolder, RepositoryTree};
use crate::Result;

/// Opaque string key/value store for serialized trees
#[async_trait]
pub trait TreeCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local cache, used when no database is configured
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl TreeCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Cache key for a repository's tree
pub fn cache_key(repository: &str) -> String {
    format!("repo-tree:{}", repository)
}

impl RepositoryTree {
    /// Load the tree for `host`'s repository, reading through `cache`
    ///
    /// A usable cache entry is returned without any remote call. A missing,
    /// corrupt or unreachable entry triggers a rebuild from the remote
    /// listing, which is then written back. Write-back failures are logged
    /// and ignored; a failed remote listing is returned as an error.
    pub async fn load(host: &dyn CodeHost, cache: &dyn TreeCache) -> Result<Self> {
        let repository = host.repository();
        let key = cache_key(&repository);

        match cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<CachedFolder>(&raw) {
                Ok(cached) => {
                    debug!(%key, "Repository tree cache hit");
                    return Ok(Self::from_cached(repository, &cached));
                }
                Err(e) => warn!(%key, error = %e, "Discarding unreadable cache entry"),
            },
            Ok(None) => debug!(%key, "Repository tree cache miss"),
            Err(e) => warn!(%key, error = %e, "Tree cache unavailable, building from remote"),
        }

        Self::rebuild(host, cache).await
    }

    /// Build the tree from the remote listing and overwrite the cache entry
    pub async fn rebuild(host: &dyn CodeHost, cache: &dyn TreeCache) -> Result<Self> {
        let repository = host.repository();
        let key = cache_key(&repository);

        let listing = host.tree_listing().await?;
        let tree = Self::from_listing(repository, &listing);
        info!(
            %key,
            files = tree.file_count(),
            folders = tree.folder_count(),
            "Built repository tree from remote listing"
        );

        match serde_json::to_string(&tree.to_cached()) {
            Ok(raw) => {
                if let Err(e) = cache.set(&key, &raw).await {
                    warn!(%key, error = %e, "Failed to write repository tree to cache");
                }
            }
            Err(e) => warn!(%key, error = %e, "Failed to serialize repository tree"),
        }

        Ok(tree)
    }
}
