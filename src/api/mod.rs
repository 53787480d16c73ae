pub mod list;
pub mod object;
pub mod server;
pub mod session;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use s3_explorer::ListingError;

use crate::state::AppState;

/// JSON error body / 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error returned by every handler / 接口错误
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.to_string(),
                details: None,
            },
        }
    }

    pub fn internal(message: &str, details: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: message.to_string(),
                details: Some(details),
            },
        }
    }

    /// Map a core error; `context` names the failed operation for storage errors
    pub fn from_listing(context: &str, err: ListingError) -> Self {
        match err {
            ListingError::Validation(msg) => Self::bad_request(&msg),
            ListingError::Session(_) => Self {
                status: StatusCode::UNAUTHORIZED,
                body: ErrorBody {
                    error: "Invalid session. Please re-enter credentials.".to_string(),
                    details: None,
                },
            },
            ListingError::Storage(msg) => Self::internal(context, msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// API routes (static files are added by main) / 接口路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/config", get(session::get_config))
        .route("/api/init", post(session::init_session))
        .route("/api/disconnect", post(session::disconnect))
        .route("/api/list", get(list::list_objects))
        .route("/api/file", get(object::get_file))
        .route("/api/download", get(object::download_file))
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let validation = ApiError::from_listing("Failed to list objects", ListingError::Validation("Missing bucket name".into()));
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.body.error, "Missing bucket name");

        let session = ApiError::from_listing("Failed to list objects", ListingError::Session("unknown session: x".into()));
        assert_eq!(session.status, StatusCode::UNAUTHORIZED);

        let storage = ApiError::from_listing("Failed to list objects", ListingError::Storage("AccessDenied".into()));
        assert_eq!(storage.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(storage.body.error, "Failed to list objects");
        assert_eq!(storage.body.details.as_deref(), Some("AccessDenied"));
    }
}
