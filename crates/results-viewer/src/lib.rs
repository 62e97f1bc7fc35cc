//! Read-only viewer for stored load-test results.

use std::error::Error;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::SecondsFormat;
use docstore::{DocumentStore, JsonDirectory};
use serde::Serialize;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod metrics;
pub mod render;
pub mod source;

use config::{Settings, SourceMode};
use error::ViewerError;
use source::{LIST_LIMIT, ResultSource};

pub type AnyError = Box<dyn Error + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub source: ResultSource,
}

impl AppState {
    pub async fn from_settings(settings: &Settings) -> Result<Self, AnyError> {
        let source = match settings.mode {
            SourceMode::Store => {
                let store = DocumentStore::connect(&settings.store_url, &settings.db_name).await?;
                ResultSource::Store(store.collection(&settings.results_collection)?)
            }
            SourceMode::Files => ResultSource::Files(JsonDirectory::new(&settings.results_dir)),
        };
        Ok(Self { source })
    }
}

pub async fn run() -> Result<(), AnyError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = Settings::from_env()?;
    let state = AppState::from_settings(&settings).await?;
    info!(mode = ?settings.mode, "results source ready");
    let router = build_router(state);

    let listener = TcpListener::bind(settings.bind_address).await?;
    info!("listening on http://{}", settings.bind_address);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/view/:key", get(view_result))
        .route("/download/:key", get(download_result))
        .route("/api/results", get(api_results))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, ViewerError> {
    let results = state.source.list(LIST_LIMIT).await?;
    Ok(Html(render::list_page(&results)))
}

async fn view_result(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Html<String>, ViewerError> {
    let doc = state.source.fetch(&key).await?;
    Ok(Html(render::detail_page(&doc)))
}

async fn download_result(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ViewerError> {
    let doc = state.source.fetch(&key).await?;
    let body = serde_json::to_string_pretty(&doc.body)
        .map_err(|err| ViewerError::Internal(err.to_string()))?;
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        doc.download_name()
    ))
    .map_err(|err| ViewerError::Internal(err.to_string()))?;

    let mut response = body.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
        .headers_mut()
        .insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

#[derive(Debug, Serialize)]
struct ResultListing {
    id: String,
    filename: String,
    date: String,
    size: u64,
}

async fn api_results(State(state): State<AppState>) -> Response {
    match state.source.list(LIST_LIMIT).await {
        Ok(results) => {
            let listing: Vec<ResultListing> = results
                .into_iter()
                .map(|r| ResultListing {
                    id: r.key,
                    filename: r.name,
                    date: r.date.to_rfc3339_opts(SecondsFormat::Secs, true),
                    size: r.size,
                })
                .collect();
            Json(listing).into_response()
        }
        Err(err) => ViewerError::from(err).into_json(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                warn!(error = %err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
