//! Command-line arguments / 命令行参数
//!
//! With `--profile` and a bucket the server starts unattended: one session
//! is bound at startup and the credential form is disabled.

use clap::Parser;
use std::path::PathBuf;

use s3_explorer::utils::{parse_s3_uri, S3Location};
use s3_explorer::Result;

/// s3-explorer - browse an S3 bucket like a file system
#[derive(Parser, Debug, Default)]
#[command(name = "s3-explorer", version, about = "Browse an S3 bucket like a file system")]
pub struct Args {
    /// AWS profile used for unattended mode
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Bucket name, or an s3:// URI
    #[arg(long, value_name = "BUCKET")]
    pub bucket: Option<String>,

    /// s3://bucket/prefix to browse (takes precedence over --bucket)
    #[arg(long = "s3-uri", value_name = "URI")]
    pub s3_uri: Option<String>,

    /// Region, otherwise read from ~/.aws/config for the profile
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Port to listen on, overrides config.json
    #[arg(long)]
    pub port: Option<u16>,

    /// Config file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Session bound at startup in unattended mode / CLI模式目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnattendedTarget {
    pub profile: String,
    pub location: S3Location,
    pub region: String,
}

impl Args {
    /// Bucket and prefix from `--s3-uri` or `--bucket` / 解析目标位置
    pub fn location(&self) -> Result<Option<S3Location>> {
        if let Some(uri) = &self.s3_uri {
            return parse_s3_uri(uri).map(Some);
        }
        match &self.bucket {
            Some(bucket) if bucket.starts_with("s3://") => parse_s3_uri(bucket).map(Some),
            Some(bucket) => Ok(Some(S3Location {
                bucket: bucket.clone(),
                prefix: String::new(),
            })),
            None => Ok(None),
        }
    }

    /// Unattended target if both profile and bucket were given
    ///
    /// Region comes from `--region`, then `profile_region`, then `default_region`.
    pub fn unattended_target<F>(&self, default_region: &str, profile_region: F) -> Result<Option<UnattendedTarget>>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let location = self.location()?;
        let (Some(profile), Some(location)) = (self.profile.clone(), location) else {
            return Ok(None);
        };

        let region = self
            .region
            .clone()
            .or_else(|| profile_region(&profile))
            .unwrap_or_else(|| default_region.to_string());

        Ok(Some(UnattendedTarget {
            profile,
            location,
            region,
        }))
    }
}
