use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use s3_explorer::storage::{ClientOptions, StoreCredentials};
use s3_explorer::utils::parse_s3_uri;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResp {
    pub cli_mode: bool,
    pub bucket: Option<String>,
    pub root_prefix: String,
    pub region: Option<String>,
    pub session_id: Option<String>,
}

/// GET /api/config - 运行模式信息
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResp> {
    let runtime = &state.runtime;
    Json(ConfigResp {
        cli_mode: runtime.cli_mode,
        bucket: runtime.bucket.clone(),
        root_prefix: runtime.root_prefix.clone(),
        region: runtime.region.clone(),
        session_id: runtime.session_id.clone(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitReq {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub region: Option<String>,
    pub s3_uri: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResp {
    pub session_id: String,
    pub bucket: String,
    pub root_prefix: String,
    pub message: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/init - 使用凭证创建会话
pub async fn init_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InitReq>,
) -> Result<Json<InitResp>, ApiError> {
    if state.runtime.cli_mode {
        return Err(ApiError::bad_request("Server is running in CLI mode"));
    }

    let (Some(access_key_id), Some(secret_access_key)) =
        (non_empty(req.access_key_id), non_empty(req.secret_access_key))
    else {
        return Err(ApiError::bad_request("Missing credentials"));
    };

    let s3_uri = non_empty(req.s3_uri).ok_or_else(|| ApiError::bad_request("Missing S3 URI"))?;
    let location = parse_s3_uri(&s3_uri)
        .map_err(|e| ApiError::from_listing("Failed to initialize S3 client", e))?;

    let options = ClientOptions {
        credentials: StoreCredentials::Static {
            access_key_id,
            secret_access_key,
            session_token: non_empty(req.session_token),
        },
        region: non_empty(req.region).unwrap_or_else(|| state.s3.default_region.clone()),
        endpoint: state.s3.endpoint.clone(),
        force_path_style: state.s3.force_path_style,
    };

    let client = state.store_factory.bind(&options).map_err(|e| {
        tracing::error!("Error initializing S3 client: {}", e);
        ApiError::internal("Failed to initialize S3 client", e.to_string())
    })?;

    let session_id = state.listing.sessions().register(client);
    tracing::info!("Session {} bound to {}", session_id, location.to_uri());

    Ok(Json(InitResp {
        session_id,
        bucket: location.bucket,
        root_prefix: location.prefix,
        message: "Credentials configured successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectReq {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct DisconnectResp {
    pub removed: bool,
}

/// POST /api/disconnect - 断开会话
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DisconnectReq>,
) -> Json<DisconnectResp> {
    Json(DisconnectResp {
        removed: state.listing.disconnect(&req.session_id),
    })
}
