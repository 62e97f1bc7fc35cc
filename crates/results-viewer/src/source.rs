use chrono::{DateTime, Utc};
use docstore::{Collection, JsonDirectory, ObjectId, Record, StoreError};
use serde_json::Value;
use tracing::warn;

use crate::metrics::KeyMetrics;

/// Most results shown by the list view and listing API.
pub const LIST_LIMIT: usize = 100;

/// Backing storage for the viewer.
#[derive(Clone, Debug)]
pub enum ResultSource {
    Store(Collection),
    Files(JsonDirectory),
}

/// One row of the results listing.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultSummary {
    /// Key accepted by [`ResultSource::fetch`]: a document id or a filename.
    pub key: String,
    /// Human-facing name: the run's `test_id`, or the filename.
    pub name: String,
    pub date: DateTime<Utc>,
    /// Size in bytes of the serialized document.
    pub size: u64,
    pub metrics: KeyMetrics,
}

#[derive(Clone, Debug)]
pub struct ResultDocument {
    pub name: String,
    pub body: Value,
}

impl ResultDocument {
    /// Attachment filename, always ending in a single `.json`.
    pub fn download_name(&self) -> String {
        let stem = self.name.strip_suffix(".json").unwrap_or(&self.name);
        let safe: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || "-_.".contains(c) { c } else { '_' })
            .collect();
        format!("{safe}.json")
    }
}

impl ResultSource {
    pub async fn list(&self, limit: usize) -> Result<Vec<ResultSummary>, StoreError> {
        let mut rows = match self {
            ResultSource::Store(collection) => collection
                .find_all::<Value>()
                .await?
                .into_iter()
                .map(|record| summarize_record(&record))
                .collect::<Result<Vec<_>, _>>()?,
            ResultSource::Files(dir) => {
                let mut rows = Vec::new();
                for entry in dir.list().await? {
                    let metrics = match dir.read(&entry.name).await {
                        Ok(doc) => KeyMetrics::extract(&doc),
                        Err(err) => {
                            warn!(file = %entry.name, error = %err, "unreadable result file");
                            KeyMetrics::default()
                        }
                    };
                    rows.push(ResultSummary {
                        key: entry.name.clone(),
                        name: entry.name,
                        date: entry.modified,
                        size: entry.size,
                        metrics,
                    });
                }
                rows
            }
        };

        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.key.cmp(&a.key)));
        rows.truncate(limit);
        Ok(rows)
    }

    pub async fn fetch(&self, key: &str) -> Result<ResultDocument, StoreError> {
        match self {
            ResultSource::Store(collection) => {
                let id: ObjectId = key.parse()?;
                let record = collection.find_one::<Value>(&id).await?;
                Ok(ResultDocument {
                    name: display_name(&record),
                    body: serde_json::to_value(&record)?,
                })
            }
            ResultSource::Files(dir) => Ok(ResultDocument {
                name: key.to_string(),
                body: dir.read(key).await?,
            }),
        }
    }
}

fn summarize_record(record: &Record<Value>) -> Result<ResultSummary, StoreError> {
    let date = record
        .doc
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_else(|| record.id.timestamp());

    Ok(ResultSummary {
        key: record.id.to_string(),
        name: display_name(record),
        date,
        size: serde_json::to_vec(record)?.len() as u64,
        metrics: KeyMetrics::extract(&record.doc),
    })
}

fn display_name(record: &Record<Value>) -> String {
    match record.doc.get("test_id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => record.id.to_string(),
    }
}
