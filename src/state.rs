use std::sync::Arc;

use s3_explorer::config::S3Config;
use s3_explorer::storage::StoreFactory;
use s3_explorer::ListingService;

/// What the browser needs to know at startup / 运行模式信息
#[derive(Debug, Clone, Default)]
pub struct RuntimeInfo {
    pub cli_mode: bool,
    pub bucket: Option<String>,
    pub root_prefix: String,
    pub region: Option<String>,
    pub session_id: Option<String>,
}

/// Shared application state / 应用共享状态
pub struct AppState {
    pub listing: Arc<ListingService>,
    pub store_factory: Arc<dyn StoreFactory>,
    pub s3: S3Config,
    pub runtime: RuntimeInfo,
}
