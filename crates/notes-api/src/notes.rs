use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, TimeDelta, Utc};
use docstore::{ObjectId, Record};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::{
    AppState,
    error::{ApiError, Resource},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct NewNote {
    title: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct NotePatch {
    title: Option<String>,
    content: Option<String>,
}

impl Note {
    fn new(title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        self.touch();
    }

    /// Moves `updated_at` to now, and always strictly past its previous value.
    fn touch(&mut self) {
        let floor = self.updated_at + TimeDelta::microseconds(1);
        self.updated_at = Utc::now().max(floor);
    }
}

pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Record<Note>>>, ApiError> {
    let notes = state.notes.find_all::<Note>().await?;
    Ok(Json(notes))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record<Note>>, ApiError> {
    let id = parse_id(&id)?;
    let note = state
        .notes
        .find_one::<Note>(&id)
        .await
        .map_err(|err| ApiError::lookup(Resource::Note, err))?;
    Ok(Json(note))
}

pub async fn create_note(
    State(state): State<AppState>,
    body: Option<Json<Map<String, Value>>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(body)) = body.filter(|Json(body)| body.contains_key("title")) else {
        return Err(ApiError::bad_request("Title is required"));
    };
    let new: NewNote = serde_json::from_value(Value::Object(body))
        .map_err(|err| ApiError::bad_request(format!("Invalid note: {err}")))?;

    let note = Note::new(new.title, new.content);
    let id = state.notes.insert_one(&note).await?;
    info!(%id, "note created");

    Ok((StatusCode::CREATED, Json(Record { id, doc: note })))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<Map<String, Value>>>,
) -> Result<Json<Record<Note>>, ApiError> {
    let id = parse_id(&id)?;
    let Some(Json(body)) = body.filter(|Json(body)| !body.is_empty()) else {
        return Err(ApiError::bad_request("Request body is required"));
    };
    let patch: NotePatch = serde_json::from_value(Value::Object(body))
        .map_err(|err| ApiError::bad_request(format!("Invalid note: {err}")))?;

    let note = state
        .notes
        .update_one::<Note, _>(&id, |note| note.apply(patch))
        .await
        .map_err(|err| ApiError::lookup(Resource::Note, err))?;
    info!(%id, "note updated");

    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state
        .notes
        .delete_one(&id)
        .await
        .map_err(|err| ApiError::lookup(Resource::Note, err))?;
    info!(%id, "note deleted");

    Ok(Json(json!({ "message": "Note deleted successfully" })))
}

fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    id.parse::<ObjectId>()
        .map_err(|err| ApiError::lookup(Resource::Note, err))
}
