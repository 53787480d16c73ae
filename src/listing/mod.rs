//! Hierarchical listing over a flat object namespace / 层级列表
//!
//! ```text
//! ListingService::list
//!   -> SessionRegistry::resolve
//!   -> ListingCache::get            (hit: done)
//!   -> Paginator::fetch_all -> hierarchy::build -> ListingCache::put
//! ```
//!
//! Callers must pass a prefix that is empty or ends with `/`.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod cache;
pub mod hierarchy;
pub mod paginator;
pub mod service;
pub mod session;

pub use cache::ListingCache;
pub use paginator::{Paginator, DELIMITER};
pub use service::ListingService;
pub use session::{SessionRegistry, CLI_SESSION_ID};

/// Identity of one logical listing request / 列表请求标识（缓存键）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub session_id: String,
    pub bucket: String,
    pub prefix: String,
}

impl ListingKey {
    pub fn new(session_id: &str, bucket: &str, prefix: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        }
    }
}

/// Immediate child folder / 子目录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "folder", rename_all = "camelCase")]
pub struct FolderEntry {
    pub name: String,
    pub full_path: String,
}

/// Immediate child file / 子文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "file", rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub full_path: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One directory level as the browser sees it / 目录视图
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingView {
    pub folders: Vec<FolderEntry>,
    pub files: Vec<FileEntry>,
    pub prefix: String,
}
