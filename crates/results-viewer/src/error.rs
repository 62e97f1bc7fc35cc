use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use docstore::StoreError;
use serde::Serialize;
use tracing::error;

/// Page-level failures, rendered as plain text.
#[derive(Debug)]
pub enum ViewerError {
    InvalidKey,
    NotFound,
    Internal(String),
}

impl ViewerError {
    fn status(&self) -> StatusCode {
        match self {
            ViewerError::InvalidKey => StatusCode::BAD_REQUEST,
            ViewerError::NotFound => StatusCode::NOT_FOUND,
            ViewerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ViewerError::InvalidKey => "Invalid result ID".to_string(),
            ViewerError::NotFound => "Result not found".to_string(),
            ViewerError::Internal(msg) => format!("Error loading results: {msg}"),
        }
    }

    /// JSON rendering for the listing API.
    pub fn into_json(self) -> Response {
        (self.status(), Json(ErrorBody { error: self.message() })).into_response()
    }
}

impl From<StoreError> for ViewerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::InvalidId(_) | StoreError::InvalidName(_) => Self::InvalidKey,
            StoreError::NotFound(_) => Self::NotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ViewerError {
    fn into_response(self) -> Response {
        if let ViewerError::Internal(msg) = &self {
            error!(error = %msg, "viewer request failed");
        }
        (self.status(), self.message()).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}
