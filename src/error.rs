//! Listing error taxonomy / 列表错误类型
//!
//! Every failure path of the listing core ends in one of these variants.
//! None of them is retried inside the core.

use thiserror::Error;

use crate::storage::StoreError;

/// Errors returned by the listing core / 列表核心错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    /// Session id unknown to the registry / 会话不存在
    #[error("Session error: {0}")]
    Session(String),

    /// Failure reported by the storage provider, message kept verbatim / 存储后端错误
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed input rejected before any network call / 参数校验失败
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ListingError {
    /// Message without the category prefix / 不带分类前缀的错误信息
    pub fn message(&self) -> &str {
        match self {
            ListingError::Session(msg)
            | ListingError::Storage(msg)
            | ListingError::Validation(msg) => msg,
        }
    }
}

impl From<StoreError> for ListingError {
    fn from(err: StoreError) -> Self {
        ListingError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ListingError>;
