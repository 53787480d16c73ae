//! Object store capability / 对象存储能力
//!
//! The listing core only ever talks to a bucket through [`ObjectStore`]:
//! one page of a delimiter-grouped listing, or one object. The S3
//! implementation lives in [`s3`].

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod s3;

#[cfg(test)]
pub(crate) mod memory;

pub use s3::{S3Store, S3StoreFactory};

/// Errors raised by an object store / 对象存储错误
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Transport or provider failure, message from the provider / 请求失败
    #[error("{0}")]
    Request(String),

    /// Provider rejected the request, code and message as sent / 服务端返回的错误
    #[error("{code}: {message}")]
    Provider {
        status: u16,
        code: String,
        message: String,
    },

    /// Provider answered with a non-success status and no error document / 非成功状态码
    #[error("{operation} failed with HTTP status {status}")]
    Status { operation: &'static str, status: u16 },

    /// Client could not be built from the given options / 客户端配置无效
    #[error("Invalid client options: {0}")]
    Config(String),
}

/// A single object returned by a listing page / 列表中的单个对象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    /// None when the provider omitted the timestamp or sent garbage
    pub last_modified: Option<DateTime<Utc>>,
}

/// One raw listing entry / 原始列表条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEntry {
    /// Grouped prefix ending with the delimiter / 公共前缀（目录）
    CommonPrefix(String),
    /// Object directly under the requested prefix / 对象（文件）
    Object(ObjectEntry),
}

/// One provider listing response / 单页列表结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub common_prefixes: Vec<String>,
    pub objects: Vec<ObjectEntry>,
    pub next_continuation_token: Option<String>,
}

/// Whole object body plus its content type / 对象内容
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Object body delivered in chunks / 对象字节流
pub type ByteStream = BoxStream<'static, Result<Bytes, StoreError>>;

/// Streamed object plus its content type / 流式对象
pub struct ObjectStream {
    pub content_type: Option<String>,
    pub body: ByteStream,
}

/// Storage client capability (read only) / 存储客户端能力（只读）
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of `bucket` under `prefix`, grouped on `delimiter` / 列出一页
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StoreError>;

    /// Fetch a whole object / 获取完整对象
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData, StoreError>;

    /// Fetch an object as a byte stream / 流式获取对象
    ///
    /// Defaults to one chunk holding the whole body.
    async fn get_object_stream(&self, bucket: &str, key: &str) -> Result<ObjectStream, StoreError> {
        let data = self.get_object(bucket, key).await?;
        let body = data.body;
        Ok(ObjectStream {
            content_type: data.content_type,
            body: stream::once(async move { Ok(body) }).boxed(),
        })
    }
}

/// Shared handle to a bound client / 已绑定客户端句柄
pub type StoreHandle = Arc<dyn ObjectStore>;

/// How a client authenticates / 客户端凭证
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreCredentials {
    /// Access key pair, optionally with a session token / 访问密钥
    Static {
        access_key_id: String,
        secret_access_key: String,
        #[serde(default)]
        session_token: Option<String>,
    },
    /// Named profile from the shared AWS credentials file / AWS配置文件
    Profile(String),
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreCredentials::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"***")
                .finish(),
            StoreCredentials::Profile(name) => f.debug_tuple("Profile").field(name).finish(),
        }
    }
}

/// Everything needed to bind a client to a session / 绑定客户端所需参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientOptions {
    pub credentials: StoreCredentials,
    pub region: String,
    /// Custom endpoint (MinIO, OSS...), None for AWS / 自定义端点
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Path-style addressing instead of virtual host / 路径风格访问
    #[serde(default)]
    pub force_path_style: bool,
}

/// Binds credentials to a client handle / 客户端工厂
pub trait StoreFactory: Send + Sync {
    fn bind(&self, options: &ClientOptions) -> Result<StoreHandle, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_secret() {
        let creds = StoreCredentials::Static {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "super-secret".to_string(),
            session_token: None,
        };
        let printed = format!("{:?}", creds);
        assert!(printed.contains("AKIAEXAMPLE"));
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn test_status_error_display() {
        let err = StoreError::Status { operation: "GetObject", status: 404 };
        assert_eq!(err.to_string(), "GetObject failed with HTTP status 404");
    }

    #[test]
    fn test_provider_error_keeps_message() {
        let err = StoreError::Provider {
            status: 403,
            code: "AccessDenied".to_string(),
            message: "Access Denied".to_string(),
        };
        assert_eq!(err.to_string(), "AccessDenied: Access Denied");
    }
}
