//! File-backed document store.
//!
//! A store lives under `<root>/<database>`. Every collection is a directory and
//! every document is a JSON file named after its [`ObjectId`].

use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use thiserror::Error;
use tokio::fs;
use tracing::debug;

mod collection;
mod directory;
mod object_id;

pub use collection::{Collection, Record};
pub use directory::{FileEntry, JsonDirectory};
pub use object_id::ObjectId;

#[derive(Clone, Debug)]
pub struct DocumentStore {
    root: PathBuf,
    database: String,
    writers: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl DocumentStore {
    /// Opens (creating if needed) the database `database` under `url`.
    ///
    /// `url` is either a plain filesystem path or a `file://` URL.
    pub async fn connect(url: &str, database: &str) -> Result<Self, StoreError> {
        let base = base_path(url)?;
        validate_name(database)?;

        let root = base.join(database);
        fs::create_dir_all(&root)
            .await
            .map_err(|err| StoreError::Unavailable(format!("{}: {err}", root.display())))?;
        debug!(root = %root.display(), "document store opened");

        Ok(Self {
            root,
            database: database.to_string(),
            writers: Arc::default(),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection(&self, name: &str) -> Result<Collection, StoreError> {
        validate_name(name)?;
        let writes = self
            .writers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .clone();
        Ok(Collection::new(name, self.root.join(name), writes))
    }

    /// Checks that the database root is still reachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        match fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::Unavailable(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            Err(err) => Err(StoreError::Unavailable(format!(
                "{}: {err}",
                self.root.display()
            ))),
        }
    }
}

fn base_path(url: &str) -> Result<PathBuf, StoreError> {
    let path = match url.split_once("://") {
        Some(("file", rest)) => rest,
        Some((scheme, _)) => {
            return Err(StoreError::Unavailable(format!(
                "unsupported store scheme `{scheme}`"
            )));
        }
        None => url,
    };

    if path.is_empty() {
        return Err(StoreError::Unavailable("store path cannot be empty".to_string()));
    }
    Ok(PathBuf::from(path))
}

/// Accepts only a single, relative, normal path segment.
pub(crate) fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidName("name cannot be empty".to_string()));
    }

    let path = Path::new(name);
    if path.is_absolute() {
        return Err(StoreError::InvalidName(format!(
            "absolute paths are not allowed (got `{name}`)"
        )));
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(StoreError::InvalidName(format!(
            "`{name}` contains unsupported segments"
        ))),
    }
}

pub(crate) fn not_found_as<T>(
    result: std::io::Result<T>,
    key: impl FnOnce() -> String,
) -> Result<T, StoreError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(key())),
        Err(err) => Err(StoreError::from(err)),
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid document id: {0}")]
    InvalidId(String),
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("duplicate document id: {0}")]
    DuplicateId(ObjectId),
    #[error("malformed document: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}
