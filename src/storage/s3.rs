//! S3 object store / S3对象存储
//!
//! rust-s3 binds a client to one bucket, while a session may browse any
//! bucket its credentials can reach. Credentials are resolved once per
//! session; a `Bucket` handle is built per call.
//!
//! A bucket outside the session region answers with a redirect. The real
//! region is learned once, remembered per bucket and the request retried.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use parking_lot::RwLock;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::Region;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    ClientOptions, ListPage, ObjectData, ObjectEntry, ObjectStore, ObjectStream, StoreCredentials,
    StoreError, StoreFactory, StoreHandle,
};

/// S3 client bound to one session / 会话级S3客户端
pub struct S3Store {
    credentials: Credentials,
    region: String,
    /// Custom endpoint, None means the regional AWS endpoint
    endpoint: Option<String>,
    force_path_style: bool,
    /// 重定向后得知的桶所在区域
    bucket_regions: RwLock<HashMap<String, String>>,
}

impl S3Store {
    /// Resolve credentials and region / 创建S3客户端
    pub fn new(options: &ClientOptions) -> Result<Self, StoreError> {
        let credentials = match &options.credentials {
            StoreCredentials::Static {
                access_key_id,
                secret_access_key,
                session_token,
            } => Credentials::new(
                Some(access_key_id),
                Some(secret_access_key),
                session_token.as_deref().filter(|t| !t.is_empty()),
                None,
                None,
            ),
            StoreCredentials::Profile(profile) => Credentials::from_profile(Some(profile)),
        }
        .map_err(|e| StoreError::Config(format!("创建S3凭证失败: {}", e)))?;

        let endpoint = options
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(|e| e.trim_end_matches('/').to_string());

        Ok(Self {
            credentials,
            region: options.region.clone(),
            endpoint,
            force_path_style: options.force_path_style,
            bucket_regions: RwLock::new(HashMap::new()),
        })
    }

    /// Region requests for `bucket` are signed for / 桶对应的区域
    fn region_name(&self, bucket: &str) -> String {
        self.bucket_regions
            .read()
            .get(bucket)
            .cloned()
            .unwrap_or_else(|| self.region.clone())
    }

    fn region_for(&self, bucket: &str) -> Region {
        let region = self.region_name(bucket);
        let endpoint = match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://s3.{}.amazonaws.com", region),
        };
        Region::Custom { region, endpoint }
    }

    fn bucket(&self, name: &str) -> Result<Box<Bucket>, StoreError> {
        let bucket = Bucket::new(name, self.region_for(name), self.credentials.clone())
            .map_err(|e| StoreError::Config(format!("创建S3 Bucket失败: {}", e)))?;

        Ok(if self.force_path_style {
            bucket.with_path_style()
        } else {
            bucket
        })
    }

    /// Decide whether a failed call may be retried / 处理失败请求
    ///
    /// `Ok(())` means the bucket region was corrected and the caller should
    /// try once more; anything else is the error to report.
    async fn recover(
        &self,
        bucket: &str,
        operation: &'static str,
        err: S3Error,
        retried: bool,
    ) -> Result<(), StoreError> {
        let failure = match err {
            S3Error::HttpFailWithBody(status, body) => ProviderFailure::parse(status, &body),
            other => return Err(StoreError::Request(other.to_string())),
        };

        if !retried && failure.is_region_redirect() {
            if let Some(region) = self.discover_region(bucket, failure.document.region.clone()).await {
                if region != self.region_name(bucket) {
                    tracing::info!("Bucket {} is in region {}, retrying {}", bucket, region, operation);
                    self.bucket_regions.write().insert(bucket.to_string(), region);
                    return Ok(());
                }
            }
        }

        Err(failure.into_error(operation))
    }

    /// Region named by the error document, else GetBucketLocation / 查询桶区域
    async fn discover_region(&self, bucket: &str, hinted: Option<String>) -> Option<String> {
        if let Some(region) = hinted.filter(|r| !r.trim().is_empty()) {
            return Some(region.trim().to_string());
        }

        let handle = self.bucket(bucket).ok()?;
        match handle.location().await {
            Ok((region, _)) => {
                let region = region.to_string();
                let usable = !region.is_empty() && !region.contains(char::is_whitespace);
                usable.then_some(region)
            }
            Err(e) => {
                tracing::warn!("Failed to look up region of bucket {}: {}", bucket, e);
                None
            }
        }
    }
}

/// S3 `<Error>` document / S3错误文档
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorDocument {
    code: Option<String>,
    message: Option<String>,
    region: Option<String>,
}

#[derive(Debug)]
struct ProviderFailure {
    status: u16,
    document: ErrorDocument,
}

impl ProviderFailure {
    fn parse(status: u16, body: &str) -> Self {
        // HEAD请求和部分网关不返回错误正文
        let document = quick_xml::de::from_str(body).unwrap_or_default();
        Self { status, document }
    }

    fn is_region_redirect(&self) -> bool {
        matches!(self.status, 301 | 307)
            || matches!(
                self.document.code.as_deref(),
                Some("PermanentRedirect")
                    | Some("TemporaryRedirect")
                    | Some("AuthorizationHeaderMalformed")
                    | Some("IllegalLocationConstraintException")
            )
    }

    fn into_error(self, operation: &'static str) -> StoreError {
        match self.document.code {
            Some(code) => StoreError::Provider {
                status: self.status,
                code,
                message: self.document.message.unwrap_or_default(),
            },
            None => StoreError::Status {
                operation,
                status: self.status,
            },
        }
    }
}

/// S3 returns RFC 3339 timestamps / 解析S3时间戳
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!("Unparseable LastModified {:?}: {}", raw, e);
            None
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_page(
        &self,
        bucket_name: &str,
        prefix: &str,
        delimiter: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let mut retried = false;
        let (result, _) = loop {
            let bucket = self.bucket(bucket_name)?;
            match bucket
                .list_page(
                    prefix.to_string(),
                    Some(delimiter.to_string()),
                    continuation_token.map(str::to_string),
                    None,
                    None,
                )
                .await
            {
                Ok(page) => break page,
                Err(e) => {
                    self.recover(bucket_name, "ListObjectsV2", e, retried).await?;
                    retried = true;
                }
            }
        };

        let common_prefixes = result
            .common_prefixes
            .unwrap_or_default()
            .into_iter()
            .map(|cp| cp.prefix)
            .collect();

        let objects = result
            .contents
            .into_iter()
            .map(|obj| ObjectEntry {
                last_modified: parse_timestamp(&obj.last_modified),
                size: obj.size as u64,
                key: obj.key,
            })
            .collect();

        Ok(ListPage {
            common_prefixes,
            objects,
            next_continuation_token: result
                .next_continuation_token
                .filter(|token| !token.is_empty()),
        })
    }

    async fn get_object(&self, bucket_name: &str, key: &str) -> Result<ObjectData, StoreError> {
        let mut retried = false;
        let response = loop {
            let bucket = self.bucket(bucket_name)?;
            match bucket.get_object(key).await {
                Ok(response) => break response,
                Err(e) => {
                    self.recover(bucket_name, "GetObject", e, retried).await?;
                    retried = true;
                }
            }
        };

        let content_type = response.headers().get("content-type").cloned();

        Ok(ObjectData {
            content_type,
            body: Bytes::from(response.bytes().to_vec()),
        })
    }

    async fn get_object_stream(&self, bucket_name: &str, key: &str) -> Result<ObjectStream, StoreError> {
        let mut retried = false;
        let (bucket, response) = loop {
            let bucket = self.bucket(bucket_name)?;
            match bucket.get_object_stream(key).await {
                Ok(response) => break (bucket, response),
                Err(e) => {
                    self.recover(bucket_name, "GetObject", e, retried).await?;
                    retried = true;
                }
            }
        };

        // 流式响应不带响应头，内容类型另行HEAD获取
        let content_type = match bucket.head_object(key).await {
            Ok((head, _)) => head.content_type,
            Err(e) => {
                tracing::warn!("HeadObject {}/{} failed: {}", bucket_name, key, e);
                None
            }
        };

        let body = response
            .bytes
            .map(|chunk| chunk.map_err(|e| StoreError::Request(e.to_string())))
            .boxed();

        Ok(ObjectStream { content_type, body })
    }
}

/// Binds S3 clients for new sessions / S3客户端工厂
pub struct S3StoreFactory;

impl StoreFactory for S3StoreFactory {
    fn bind(&self, options: &ClientOptions) -> Result<StoreHandle, StoreError> {
        let store = S3Store::new(options)?;
        tracing::info!(
            "S3 client bound: region={}, path_style={}",
            options.region,
            options.force_path_style
        );
        Ok(Arc::new(store))
    }
}
