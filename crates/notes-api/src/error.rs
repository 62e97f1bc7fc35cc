use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use docstore::StoreError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Document kinds served by this API, used to word lookup failures.
#[derive(Debug, Clone, Copy)]
pub enum Resource {
    Note,
    TestResult,
}

impl Resource {
    fn invalid_id(self) -> &'static str {
        match self {
            Resource::Note => "Invalid note ID",
            Resource::TestResult => "Invalid test result ID",
        }
    }

    fn not_found(self) -> &'static str {
        match self {
            Resource::Note => "Note not found",
            Resource::TestResult => "Test result not found",
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Maps a store failure for a single-document lookup of `resource`.
    pub fn lookup(resource: Resource, err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(_) => Self::bad_request(resource.invalid_id()),
            StoreError::NotFound(_) => Self::NotFound(resource.not_found().to_string()),
            other => other.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::InvalidId(id) => Self::bad_request(format!("invalid id `{id}`")),
            StoreError::InvalidName(msg) => Self::BadRequest(msg),
            StoreError::NotFound(key) => Self::NotFound(format!("`{key}` not found")),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: msg })).into_response()
            }
            ApiError::Unauthorized => {
                let mut response = (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorBody {
                        error: "Unauthorized access".to_string(),
                    }),
                )
                    .into_response();
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static("Basic realm=\"notes\""),
                );
                response
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody { error: msg })).into_response()
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error: msg })).into_response()
            }
        }
    }
}
