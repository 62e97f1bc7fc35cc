use std::{io::ErrorKind, path::PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::fs;

use crate::{StoreError, not_found_as, validate_name};

/// Read-only view over a flat directory of `*.json` files.
#[derive(Clone, Debug)]
pub struct JsonDirectory {
    root: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub modified: DateTime<Utc>,
    pub size: u64,
}

impl JsonDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Lists JSON files, most recently modified first.
    pub async fn list(&self) -> Result<Vec<FileEntry>, StoreError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.ends_with(".json") {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            files.push(FileEntry {
                name,
                modified: meta.modified().map(DateTime::<Utc>::from)?,
                size: meta.len(),
            });
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
        Ok(files)
    }

    pub async fn read(&self, name: &str) -> Result<Value, StoreError> {
        validate_name(name)?;
        if !name.ends_with(".json") {
            return Err(StoreError::InvalidName(format!("`{name}` is not a .json file")));
        }

        let bytes = not_found_as(fs::read(self.root.join(name)).await, || name.to_string())?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
