//! Time-bounded listing cache / 列表缓存
//!
//! Entries are replaced wholesale and expire on read. Nothing is evicted
//! except by TTL; `purge_expired` only reclaims memory.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::{ListingKey, ListingView};

/// Default TTL for cached listings / 默认缓存时间
pub const DEFAULT_TTL_SECS: u64 = 300; // 5 minutes

#[derive(Debug, Clone)]
struct CacheEntry {
    view: Arc<ListingView>,
    stored_at: Instant,
}

/// Listing cache keyed by (session, bucket, prefix) / 列表缓存
pub struct ListingCache {
    ttl: Duration,
    entries: RwLock<HashMap<ListingKey, CacheEntry>>,
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh view for `key`, expired counts as missing / 读取缓存
    pub fn get(&self, key: &ListingKey) -> Option<Arc<ListingView>> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;

        if entry.stored_at.elapsed() >= self.ttl {
            tracing::trace!("Cache expired for: {}/{}", key.bucket, key.prefix);
            return None;
        }

        Some(entry.view.clone())
    }

    /// Store or replace `key`, stamped now / 写入缓存
    pub fn put(&self, key: ListingKey, view: ListingView) -> Arc<ListingView> {
        let view = Arc::new(view);
        let entry = CacheEntry {
            view: view.clone(),
            stored_at: Instant::now(),
        };
        let mut entries = self.entries.write();
        entries.insert(key, entry);
        view
    }

    pub fn invalidate(&self, key: &ListingKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Drop every listing of a session / 清除会话的全部缓存
    pub fn invalidate_session(&self, session_id: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| key.session_id != session_id);
        before - entries.len()
    }

    /// Remove expired entries, returns how many went / 清理过期条目
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
