#[tokio::main]
async fn main() {
    if let Err(err) = notes_api::run().await {
        eprintln!("notes api failed: {err}");
        std::process::exit(1);
    }
}
