//! Session registry / 会话注册表
//!
//! Maps an opaque session id to the storage client bound for it. Sessions
//! live until the process exits or the browser disconnects.

use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;

use crate::error::{ListingError, Result};
use crate::storage::StoreHandle;

/// Session id used by unattended (CLI) mode / CLI模式固定会话ID
pub const CLI_SESSION_ID: &str = "cli-session";

const SESSION_ID_LEN: usize = 16;

/// Registry of bound storage clients / 会话注册表
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, StoreHandle>>,
}

fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `client` under a fresh id / 注册新会话
    pub fn register(&self, client: StoreHandle) -> String {
        let mut sessions = self.sessions.write();
        let mut id = generate_session_id();
        while sessions.contains_key(&id) {
            id = generate_session_id();
        }
        sessions.insert(id.clone(), client);
        tracing::info!("Session registered: {} ({} active)", id, sessions.len());
        id
    }

    /// Bind `client` under a caller-chosen id, replacing any previous one
    pub fn register_with_id(&self, id: &str, client: StoreHandle) {
        let mut sessions = self.sessions.write();
        if sessions.insert(id.to_string(), client).is_some() {
            tracing::warn!("Session {} replaced", id);
        } else {
            tracing::info!("Session registered: {}", id);
        }
    }

    /// Look up the client of `id` / 查找会话客户端
    pub fn resolve(&self, id: &str) -> Result<StoreHandle> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| ListingError::Session(format!("unknown session: {}", id)))
    }

    /// Idempotent; returns whether something was removed / 移除会话
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().remove(id).is_some();
        if removed {
            tracing::info!("Session removed: {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
