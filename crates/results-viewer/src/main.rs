#[tokio::main]
async fn main() {
    if let Err(err) = results_viewer::run().await {
        eprintln!("results viewer failed: {err}");
        std::process::exit(1);
    }
}
