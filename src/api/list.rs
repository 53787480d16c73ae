use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use s3_explorer::utils::normalize_prefix;
use s3_explorer::ListingView;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub prefix: String,
    pub refresh: Option<String>,
}

/// GET /api/list - 列出一层目录
pub async fn list_objects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Arc<ListingView>>, ApiError> {
    let prefix = normalize_prefix(&query.prefix);
    // 只有 refresh=true 才跳过缓存
    let force_refresh = query.refresh.as_deref() == Some("true");

    let view = state
        .listing
        .list(&query.session_id, &query.bucket, &prefix, force_refresh)
        .await
        .map_err(|e| ApiError::from_listing("Failed to list objects", e))?;

    Ok(Json(view))
}
