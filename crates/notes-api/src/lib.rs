//! Notes CRUD API and load-test results API over a shared document store.
//!
//! `/notes` routes require HTTP Basic credentials; `/test-results` and
//! `/health` are open.

use std::error::Error;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use docstore::{Collection, DocumentStore};
use serde_json::json;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod error;
pub mod notes;
pub mod results;

use auth::Credentials;
use config::Settings;

pub type AnyError = Box<dyn Error + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub notes: Collection,
    pub results: Collection,
    pub credentials: Credentials,
}

impl AppState {
    pub async fn connect(settings: &Settings) -> Result<Self, AnyError> {
        let store = DocumentStore::connect(&settings.store_url, &settings.db_name).await?;
        Ok(Self {
            notes: store.collection(&settings.notes_collection)?,
            results: store.collection(&settings.results_collection)?,
            credentials: settings.credentials.clone(),
            store,
        })
    }
}

pub async fn run() -> Result<(), AnyError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = Settings::from_env()?;
    let state = AppState::connect(&settings).await?;
    info!(
        store = %settings.store_url,
        database = %settings.db_name,
        "document store connected"
    );
    let router = build_router(state);

    let listener = TcpListener::bind(settings.bind_address).await?;
    info!("listening on http://{}", settings.bind_address);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let notes = Router::new()
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .route(
            "/test-results",
            get(results::list_results).post(results::create_result),
        )
        .route("/test-results/:id", get(results::get_result))
        .merge(notes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "database": "connected" })),
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // a second init (tests, embedding) keeps the first subscriber
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
