use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use s3_explorer::utils::file_name;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectQuery {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub content: String,
    pub content_type: Option<String>,
}

/// GET /api/file - 预览文件内容
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ObjectQuery>,
) -> Result<Json<FileContent>, ApiError> {
    let data = state
        .listing
        .object(&query.session_id, &query.bucket, &query.key)
        .await
        .map_err(|e| ApiError::from_listing("Failed to get file", e))?;

    Ok(Json(FileContent {
        content: String::from_utf8_lossy(&data.body).into_owned(),
        content_type: data.content_type,
    }))
}

/// 文件名中的引号和控制字符会破坏响应头
fn attachment_name(key: &str) -> String {
    file_name(key)
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect()
}

/// GET /api/download - 以附件形式流式下载
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ObjectQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let object = state
        .listing
        .object_stream(&query.session_id, &query.bucket, &query.key)
        .await
        .map_err(|e| ApiError::from_listing("Failed to download file", e))?;

    let content_type = object
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let disposition = format!("attachment; filename=\"{}\"", attachment_name(&query.key));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(object.body),
    ))
}

#[cfg(test)]
mod tests {
    use super::attachment_name;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::router;
    use crate::api::testing::{body_json, state};
    use crate::state::RuntimeInfo;

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_attachment_name() {
        assert_eq!(attachment_name("notes/b.txt"), "b.txt");
        assert_eq!(attachment_name("odd/\"quoted\".txt"), "quoted.txt");
    }

    #[tokio::test]
    async fn test_preview_returns_text() {
        let (state, store) = state(RuntimeInfo::default());
        let session_id = state.listing.sessions().register(store);

        let response = router(state)
            .oneshot(get(&format!("/api/file?sessionId={}&bucket=docs&key=a.txt", session_id)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["content"], "hello docs");
        assert_eq!(body["contentType"], "text/plain");
    }

    #[tokio::test]
    async fn test_preview_missing_key() {
        let (state, store) = state(RuntimeInfo::default());
        let session_id = state.listing.sessions().register(store);

        let response = router(state.clone())
            .oneshot(get(&format!("/api/file?sessionId={}&bucket=docs", session_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Missing bucket or key");

        let response = router(state)
            .oneshot(get(&format!("/api/file?sessionId={}&bucket=docs&key=gone.txt", session_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Failed to get file");
    }

    #[tokio::test]
    async fn test_download_sets_attachment_headers() {
        let (state, store) = state(RuntimeInfo::default());
        let session_id = state.listing.sessions().register(store);

        let response = router(state)
            .oneshot(get(&format!("/api/download?sessionId={}&bucket=docs&key=a.txt", session_id)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"a.txt\""
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello docs");
    }

    #[tokio::test]
    async fn test_download_requires_bucket_and_key() {
        let (state, store) = state(RuntimeInfo::default());
        let session_id = state.listing.sessions().register(store);

        for query in ["bucket=docs", "key=a.txt"] {
            let response = router(state.clone())
                .oneshot(get(&format!("/api/download?sessionId={}&{}", session_id, query)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await["error"], "Missing bucket or key");
        }
    }

    #[tokio::test]
    async fn test_download_unknown_session() {
        let (state, _) = state(RuntimeInfo::default());
        let response = router(state)
            .oneshot(get("/api/download?sessionId=gone&bucket=docs&key=a.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
