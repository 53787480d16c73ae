//! Application configuration module / 应用配置模块
//!
//! Loaded from config.json in the working directory.
//! Creates default config file on first run / 首次运行时创建默认配置文件

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::listing::cache::DEFAULT_TTL_SECS;
use crate::listing::paginator::DEFAULT_MAX_PAGES;

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    pub server: ServerConfig,
    /// Listing core configuration / 列表配置
    pub listing: ListingConfig,
    /// S3 client defaults / S3默认配置
    pub s3: S3Config,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
    /// Directory of the browser UI, served as static files / 前端静态文件目录
    pub static_dir: String,
}

/// Listing cache and pagination / 列表缓存与分页
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Cache TTL in seconds / 缓存有效期（秒）
    pub cache_ttl_secs: u64,
    /// Page-count safety valve, 0 = unlimited / 最大分页数，0表示不限制
    pub max_pages: usize,
    /// Background sweep of expired entries, 0 = disabled / 过期清理间隔（秒）
    pub sweep_interval_secs: u64,
}

/// S3 client defaults / S3客户端默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    /// Region when none is given / 默认区域
    pub default_region: String,
    /// Custom endpoint (MinIO, OSS...) / 自定义端点
    pub endpoint: Option<String>,
    /// MinIO等需要设置为true
    pub force_path_style: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: "public".to_string(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_TTL_SECS,
            max_pages: DEFAULT_MAX_PAGES,
            sweep_interval_secs: 60,
        }
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            default_region: "us-east-1".to_string(),
            endpoint: None,
            force_path_style: false,
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get the config file path / 获取配置文件路径
pub fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        // Load existing config / 加载现有配置
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        // Create default config / 创建默认配置
        let config = AppConfig::default();
        save_config(config_path, &config)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config_path: &Path, config: &AppConfig) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}
