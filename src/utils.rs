//! Path and location helpers for the HTTP layer / 路径与位置工具函数
//!
//! The listing core never normalizes; everything here runs before a request
//! reaches it.

use std::path::PathBuf;

use crate::error::{ListingError, Result};

/// Bucket plus key prefix parsed from an `s3://` URI / S3位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub prefix: String,
}

impl S3Location {
    /// Display form, `s3://bucket/prefix` / 显示用URI
    pub fn to_uri(&self) -> String {
        if self.prefix.is_empty() {
            format!("s3://{}", self.bucket)
        } else {
            format!("s3://{}/{}", self.bucket, self.prefix)
        }
    }
}

/// Parse `s3://bucket` or `s3://bucket/prefix` / 解析S3 URI
///
/// A non-empty prefix always comes back with a trailing `/`.
pub fn parse_s3_uri(uri: &str) -> Result<S3Location> {
    let rest = uri
        .trim()
        .strip_prefix("s3://")
        .ok_or_else(|| ListingError::Validation("Invalid S3 URI. Must start with s3://".to_string()))?;

    let (bucket, prefix) = match rest.split_once('/') {
        Some((bucket, prefix)) => (bucket, prefix),
        None => (rest, ""),
    };

    if bucket.is_empty() {
        return Err(ListingError::Validation("Invalid S3 URI. Missing bucket name".to_string()));
    }

    Ok(S3Location {
        bucket: bucket.to_string(),
        prefix: normalize_prefix(prefix),
    })
}

/// Normalize a browser-supplied prefix / 规范化前缀
///
/// Trims whitespace and leading `/`, then guarantees a trailing `/` on
/// anything non-empty.
pub fn normalize_prefix(prefix: &str) -> String {
    let prefix = prefix.trim().trim_start_matches('/');
    if prefix.is_empty() {
        String::new()
    } else if prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{}/", prefix)
    }
}

/// Last path segment of an object key / 获取文件名
pub fn file_name(key: &str) -> &str {
    key.trim_end_matches('/').rsplit('/').next().unwrap_or(key)
}

/// Location of the shared AWS config file / AWS配置文件路径
pub fn aws_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AWS_CONFIG_FILE") {
        return Some(PathBuf::from(path));
    }
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .map(|home| PathBuf::from(home).join(".aws").join("config"))
}

/// Region of `profile` in AWS config file content / 从配置内容读取区域
///
/// Accepts both `[profile name]` and `[name]` section headers.
pub fn region_from_aws_config(content: &str, profile: &str) -> Option<String> {
    let long_header = format!("[profile {}]", profile);
    let short_header = format!("[{}]", profile);
    let mut in_profile = false;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_profile = line == long_header || line == short_header;
            continue;
        }
        if !in_profile {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "region" && !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

/// Region configured for `profile` in `~/.aws/config` / 读取profile区域
pub fn lookup_profile_region(profile: &str) -> Option<String> {
    let path = aws_config_path()?;
    let content = std::fs::read_to_string(&path).ok()?;
    let region = region_from_aws_config(&content, profile);
    if let Some(ref region) = region {
        tracing::debug!("Region {} for profile {} read from {:?}", region, profile, path);
    }
    region
}
