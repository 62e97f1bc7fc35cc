use docstore::{Collection, DocumentStore, ObjectId};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::{TempDir, tempdir};
use tokio::task::JoinSet;

async fn notes_collection() -> (TempDir, Arc<Collection>) {
    let tmp = tempdir().unwrap();
    let store = DocumentStore::connect(tmp.path().to_str().unwrap(), "perf_db")
        .await
        .unwrap();
    (tmp, Arc::new(store.collection("notes").unwrap()))
}

fn note(i: usize, content_len: usize) -> Value {
    json!({
        "title": format!("note {i}"),
        "content": "x".repeat(content_len),
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z",
    })
}

/// Concurrent inserts of distinct documents
#[tokio::test]
async fn concurrent_inserts() {
    let (_tmp, notes) = notes_collection().await;
    let num_tasks = 100;

    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for i in 0..num_tasks {
        let notes = Arc::clone(&notes);
        tasks.spawn(async move { notes.insert_one(&note(i, 1024)).await.unwrap() });
    }

    let mut ids = Vec::with_capacity(num_tasks);
    while let Some(id) = tasks.join_next().await {
        ids.push(id.unwrap());
    }
    let elapsed = start.elapsed();

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), num_tasks);

    println!("\n=== Concurrent Inserts ===");
    println!("Tasks: {}", num_tasks);
    println!("Total time: {:?}", elapsed);
    println!("Throughput: {:.2} ops/sec", num_tasks as f64 / elapsed.as_secs_f64());
    println!("Avg latency: {:.2}ms", elapsed.as_millis() as f64 / num_tasks as f64);
}

/// Concurrent reads of one document
#[tokio::test]
async fn concurrent_reads_same_document() {
    let (_tmp, notes) = notes_collection().await;
    let id = notes.insert_one(&note(0, 100 * 1024)).await.unwrap();

    let num_tasks = 100;
    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for _ in 0..num_tasks {
        let notes = Arc::clone(&notes);
        tasks.spawn(async move {
            let record = notes.find_one::<Value>(&id).await.unwrap();
            assert_eq!(record.doc["content"].as_str().unwrap().len(), 100 * 1024);
        });
    }

    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }
    let elapsed = start.elapsed();

    println!("\n=== Concurrent Reads (Same Document) ===");
    println!("Tasks: {}", num_tasks);
    println!("Content size: 100KB");
    println!("Total time: {:?}", elapsed);
    println!("Throughput: {:.2} ops/sec", num_tasks as f64 / elapsed.as_secs_f64());
}

/// Mixed inserts, reads, updates and deletes
#[tokio::test]
async fn mixed_workload() {
    let (_tmp, notes) = notes_collection().await;

    let mut existing = Vec::new();
    for i in 0..50 {
        existing.push(notes.insert_one(&note(i, 10 * 1024)).await.unwrap());
    }
    let existing = Arc::new(existing);

    let num_tasks = 100;
    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for i in 0..num_tasks {
        let notes = Arc::clone(&notes);
        let existing = Arc::clone(&existing);

        tasks.spawn(async move {
            let id = existing[i % 50];
            match i % 10 {
                0..=3 => {
                    notes.insert_one(&note(i, 10 * 1024)).await.unwrap();
                }
                4..=6 => {
                    let _ = notes.find_one::<Value>(&id).await;
                }
                7..=8 => {
                    let _ = notes
                        .update_one::<Value, _>(&id, |doc| doc["title"] = json!("updated"))
                        .await;
                }
                _ => {
                    let _ = notes.delete_one(&id).await;
                }
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }
    let elapsed = start.elapsed();

    println!("\n=== Mixed Workload ===");
    println!("Tasks: {}", num_tasks);
    println!("Mix: 40% inserts, 30% reads, 20% updates, 10% deletes");
    println!("Total time: {:?}", elapsed);
    println!("Throughput: {:.2} ops/sec", num_tasks as f64 / elapsed.as_secs_f64());
}

/// Concurrent updates of one document; the last writer wins
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn update_contention_same_document() {
    let (_tmp, notes) = notes_collection().await;
    let id = notes.insert_one(&note(0, 16)).await.unwrap();
    let num_tasks = 50;

    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for i in 0..num_tasks {
        let notes = Arc::clone(&notes);
        tasks.spawn(async move {
            notes
                .update_one::<Value, _>(&id, |doc| doc["title"] = json!(format!("writer {i}")))
                .await
                .map(|_| ())
        });
    }

    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => failures.push(err.to_string()),
            Err(err) => failures.push(format!("task failed: {err}")),
        }
    }
    let elapsed = start.elapsed();

    let record = notes.find_one::<Value>(&id).await.unwrap();

    println!("\n=== Update Contention (Same Document) ===");
    println!("Concurrent writers: {}", num_tasks);
    println!("Failures: {}", failures.len());
    println!("Total time: {:?}", elapsed);
    println!("Final title: {}", record.doc["title"]);
    assert!(failures.is_empty(), "failed updates: {failures:?}");
}

/// Sustained insert rate over a fixed window
#[tokio::test]
async fn sustained_throughput() {
    let (_tmp, notes) = notes_collection().await;
    let duration = Duration::from_secs(5);

    let start = Instant::now();
    let mut tasks = JoinSet::new();
    let mut spawned = 0usize;

    while start.elapsed() < duration {
        let notes = Arc::clone(&notes);
        tasks.spawn(async move { notes.insert_one(&note(spawned, 10 * 1024)).await.unwrap() });
        spawned += 1;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }
    let elapsed = start.elapsed();

    println!("\n=== Sustained Throughput ===");
    println!("Duration: {:?}", elapsed);
    println!("Total inserts: {}", spawned);
    println!("Throughput: {:.2} ops/sec", spawned as f64 / elapsed.as_secs_f64());
}

/// Full scans as the collection grows
#[tokio::test]
async fn find_all_scaling() {
    let (_tmp, notes) = notes_collection().await;

    println!("\n=== Find All Scaling ===");

    let mut inserted = 0;
    for target in [10, 100, 1000] {
        while inserted < target {
            notes.insert_one(&note(inserted, 256)).await.unwrap();
            inserted += 1;
        }

        let start = Instant::now();
        let records = notes.find_all::<Value>().await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(records.len(), target);
        let ids: Vec<ObjectId> = records.iter().map(|r| r.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        println!("{} documents: {:?}", target, elapsed);
    }
}
