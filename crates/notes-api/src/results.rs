//! Load-test result submissions. Results are immutable once stored.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use docstore::{ObjectId, Record};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    AppState,
    error::{ApiError, Resource},
};

pub const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "empty_object")]
    pub metrics: Value,
    #[serde(default)]
    pub full_results: Value,
    #[serde(default = "empty_object")]
    pub summary: Value,
}

impl TestResult {
    /// Builds a result from a submitted payload, stamping it with `now`.
    pub fn from_payload(mut payload: Map<String, Value>, now: DateTime<Utc>) -> Self {
        let test_id = match payload.get("test_id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => format!("test-{}", now.timestamp()),
        };
        let metrics = payload.get("metrics").cloned().unwrap_or_else(empty_object);
        let summary = payload.get("summary").cloned().unwrap_or_else(empty_object);
        let full_results = match payload.remove("full_results") {
            Some(full) => full,
            None => Value::Object(payload),
        };

        Self {
            test_id,
            timestamp: now,
            metrics,
            full_results,
            summary,
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    limit: Option<usize>,
}

pub async fn create_result(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = match body {
        Some(Json(Value::Object(map))) if !map.is_empty() => map,
        _ => return Err(ApiError::bad_request("Request body is required")),
    };

    let result = TestResult::from_payload(payload, Utc::now());
    let id = state.results.insert_one(&result).await?;
    info!(%id, test_id = %result.test_id, "test result stored");

    Ok((StatusCode::CREATED, Json(Record { id, doc: result })))
}

pub async fn list_results(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Record<TestResult>>>, ApiError> {
    let Query(params) = params.map_err(|_| {
        ApiError::bad_request("Invalid limit: expected a non-negative integer")
    })?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let mut results = state.results.find_all::<TestResult>().await?;
    results.sort_by(|a, b| {
        b.doc
            .timestamp
            .cmp(&a.doc.timestamp)
            .then_with(|| b.id.cmp(&a.id))
    });
    results.truncate(limit);
    Ok(Json(results))
}

pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record<TestResult>>, ApiError> {
    let id = id
        .parse::<ObjectId>()
        .map_err(|err| ApiError::lookup(Resource::TestResult, err))?;
    let result = state
        .results
        .find_one::<TestResult>(&id)
        .await
        .map_err(|err| ApiError::lookup(Resource::TestResult, err))?;
    Ok(Json(result))
}
