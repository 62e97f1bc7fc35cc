use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{ObjectId, StoreError, not_found_as};

const EXTENSION: &str = "json";

/// A stored document together with its identifier.
///
/// Serializes as the document's own fields plus an `id` string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: ObjectId,
    #[serde(flatten)]
    pub doc: T,
}

/// Handle to one collection.
///
/// Replacements, updates and deletes through handles from the same
/// [`DocumentStore`](crate::DocumentStore) are serialized per collection, so an
/// update never resurrects a document deleted concurrently.
#[derive(Clone, Debug)]
pub struct Collection {
    name: String,
    dir: PathBuf,
    writes: Arc<Mutex<()>>,
}

impl Collection {
    pub(crate) fn new(name: &str, dir: PathBuf, writes: Arc<Mutex<()>>) -> Self {
        Self {
            name: name.to_string(),
            dir,
            writes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn insert_one<T: Serialize>(&self, doc: &T) -> Result<ObjectId, StoreError> {
        fs::create_dir_all(&self.dir).await?;

        let id = ObjectId::new();
        let path = self.path_for(&id);
        if fs::try_exists(&path).await? {
            return Err(StoreError::DuplicateId(id));
        }

        self.write(&id, &path, doc).await?;
        debug!(collection = %self.name, %id, "document inserted");
        Ok(id)
    }

    pub async fn find_one<T: DeserializeOwned>(&self, id: &ObjectId) -> Result<Record<T>, StoreError> {
        let bytes = not_found_as(fs::read(self.path_for(id)).await, || id.to_string())?;
        let doc = serde_json::from_slice(&bytes)?;
        Ok(Record { id: *id, doc })
    }

    /// Every document in the collection, oldest id first.
    pub async fn find_all<T: DeserializeOwned>(&self) -> Result<Vec<Record<T>>, StoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = id_from_path(&entry.path()) {
                ids.push(id);
            }
        }
        ids.sort();

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.find_one(&id).await {
                Ok(record) => records.push(record),
                // deleted between listing and reading
                Err(StoreError::NotFound(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(records)
    }

    pub async fn replace_one<T: Serialize>(&self, id: &ObjectId, doc: &T) -> Result<(), StoreError> {
        let _guard = self.writes.lock().await;
        self.replace_existing(id, doc).await
    }

    /// Reads the document, applies `apply` and writes the result back.
    pub async fn update_one<T, F>(&self, id: &ObjectId, apply: F) -> Result<Record<T>, StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let _guard = self.writes.lock().await;
        let mut record = self.find_one::<T>(id).await?;
        apply(&mut record.doc);
        self.replace_existing(id, &record.doc).await?;
        debug!(collection = %self.name, %id, "document updated");
        Ok(record)
    }

    pub async fn delete_one(&self, id: &ObjectId) -> Result<(), StoreError> {
        let _guard = self.writes.lock().await;
        not_found_as(fs::remove_file(self.path_for(id)).await, || id.to_string())?;
        debug!(collection = %self.name, %id, "document deleted");
        Ok(())
    }

    // callers hold `writes`
    async fn replace_existing<T: Serialize>(&self, id: &ObjectId, doc: &T) -> Result<(), StoreError> {
        let path = self.path_for(id);
        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.write(id, &path, doc).await
    }

    fn path_for(&self, id: &ObjectId) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }

    async fn write<T: Serialize>(&self, id: &ObjectId, path: &Path, doc: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(doc)?;
        // unique per write so concurrent writers never share a temp file
        let tmp = self.dir.join(format!(".{id}.{}.{EXTENSION}.tmp", Uuid::new_v4().simple()));

        fs::write(&tmp, &bytes).await?;
        if let Err(err) = fs::rename(&tmp, path).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp file");
            }
            return Err(err.into());
        }
        Ok(())
    }
}

fn id_from_path(path: &Path) -> Option<ObjectId> {
    if path.extension()? != EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}
