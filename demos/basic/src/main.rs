use docstore::DocumentStore;
use serde_json::{Value, json};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = DocumentStore::connect("demo-data", "notes_db").await?;
    let notes = store.collection("notes")?;

    let id = notes
        .insert_one(&json!({"title": "Hello", "content": "from the demo crate"}))
        .await?;
    println!("inserted {id} at {}", id.timestamp());

    let updated = notes
        .update_one::<Value, _>(&id, |doc| doc["content"] = json!("edited"))
        .await?;
    println!("{}", serde_json::to_string_pretty(&updated)?);

    notes.delete_one(&id).await?;
    println!("{} notes left", notes.find_all::<Value>().await?.len());
    Ok(())
}
