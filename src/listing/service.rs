//! Listing orchestrator / 列表服务
//!
//! Two concurrent misses on the same key both fetch and both store; the
//! later `put` wins. There is no in-flight de-duplication.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ListingConfig;
use crate::error::{ListingError, Result};
use crate::storage::{ObjectData, ObjectStream, StoreHandle};

use super::{hierarchy, ListingCache, ListingKey, ListingView, Paginator, SessionRegistry};

/// Public entry point of the listing core / 列表服务入口
pub struct ListingService {
    sessions: SessionRegistry,
    cache: ListingCache,
    paginator: Paginator,
}

impl Default for ListingService {
    fn default() -> Self {
        Self::with_parts(SessionRegistry::new(), ListingCache::default(), Paginator::default())
    }
}

/// Reject malformed input before any network call / 参数校验
fn validate(session_id: &str, bucket: &str) -> Result<()> {
    if session_id.is_empty() {
        return Err(ListingError::Validation("Missing sessionId".to_string()));
    }
    if bucket.trim().is_empty() {
        return Err(ListingError::Validation("Missing bucket name".to_string()));
    }
    Ok(())
}

impl ListingService {
    pub fn new(config: &ListingConfig) -> Self {
        Self::with_parts(
            SessionRegistry::new(),
            ListingCache::new(Duration::from_secs(config.cache_ttl_secs)),
            Paginator::new(config.max_pages),
        )
    }

    pub fn with_parts(sessions: SessionRegistry, cache: ListingCache, paginator: Paginator) -> Self {
        Self {
            sessions,
            cache,
            paginator,
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    /// List one directory level / 列出目录
    ///
    /// `prefix` must be empty or end with `/`. With `force_refresh` the cache
    /// is skipped and the fresh result overwrites whatever was stored.
    pub async fn list(
        &self,
        session_id: &str,
        bucket: &str,
        prefix: &str,
        force_refresh: bool,
    ) -> Result<Arc<ListingView>> {
        validate(session_id, bucket)?;
        if !prefix.is_empty() && !prefix.ends_with('/') {
            return Err(ListingError::Validation(format!(
                "prefix must be empty or end with '/': {:?}",
                prefix
            )));
        }

        let client = self.sessions.resolve(session_id)?;
        let key = ListingKey::new(session_id, bucket, prefix);

        if !force_refresh {
            if let Some(view) = self.cache.get(&key) {
                tracing::debug!("Cache hit for: {}/{}", bucket, prefix);
                return Ok(view);
            }
        }

        tracing::info!(
            "{} bucket: {}, prefix: {}",
            if force_refresh { "Refreshing" } else { "Listing" },
            bucket,
            prefix
        );

        let entries = match self.paginator.fetch_all(client.as_ref(), bucket, prefix).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("Error listing objects in {}/{}: {}", bucket, prefix, e);
                return Err(e);
            }
        };

        let view = hierarchy::build(&entries, prefix);
        Ok(self.cache.put(key, view))
    }

    /// Fetch one object for preview, never cached / 获取对象
    pub async fn object(&self, session_id: &str, bucket: &str, key: &str) -> Result<ObjectData> {
        let client = self.object_client(session_id, bucket, key)?;
        client.get_object(bucket, key).await.map_err(|e| {
            tracing::error!("Error getting {}/{}: {}", bucket, key, e);
            ListingError::from(e)
        })
    }

    /// Open one object as a byte stream for download / 流式获取对象
    pub async fn object_stream(&self, session_id: &str, bucket: &str, key: &str) -> Result<ObjectStream> {
        let client = self.object_client(session_id, bucket, key)?;
        client.get_object_stream(bucket, key).await.map_err(|e| {
            tracing::error!("Error downloading {}/{}: {}", bucket, key, e);
            ListingError::from(e)
        })
    }

    fn object_client(&self, session_id: &str, bucket: &str, key: &str) -> Result<StoreHandle> {
        if session_id.is_empty() {
            return Err(ListingError::Validation("Missing sessionId".to_string()));
        }
        if bucket.trim().is_empty() || key.is_empty() {
            return Err(ListingError::Validation("Missing bucket or key".to_string()));
        }
        self.sessions.resolve(session_id)
    }

    /// Forget a session and its cached listings / 断开会话
    pub fn disconnect(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id);
        let dropped = self.cache.invalidate_session(session_id);
        if dropped > 0 {
            tracing::debug!("Dropped {} cached listings of session {}", dropped, session_id);
        }
        removed
    }
}
