//! # HTTP Server
//!
//! Routes `did:web` resolution requests and identity generation requests to
//! the store and registrar.
//!
//! | Method | Path                     | Handler                  |
//! |--------|--------------------------|--------------------------|
//! | GET    | `/.well-known/did.json`  | root DID document        |
//! | GET    | `/{segment}/did.json`    | path DID document        |
//! | GET    | `/{a}/{b}/.../did.json`  | nested DID document      |
//! | POST   | `/api/did/generate`      | generate user identity   |
//! | POST   | `/api/did/generate-root` | generate root identity   |
//! | GET    | `/health`                | liveness                 |
//! | GET    | `/api/info`              | service description      |

use std::io;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::document::Document;
use crate::error::Error;
use crate::key::Suite;
use crate::registrar::{Generated, Registrar};
use crate::resolve::{ROOT_REQUEST, Resource, resolve};
use crate::store::FileStore;

const NAME: &str = "DID Web Server";
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    config: Config,
    store: FileStore,
    registrar: Registrar<FileStore>,
    started: Instant,
}

impl AppState {
    /// Create state for the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let domain = config.did_domain();
        let store = FileStore::new(&config.data_dir, domain.clone());
        Self {
            registrar: Registrar::new(domain, store.clone()),
            store,
            config,
            started: Instant::now(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_headers(Any);

    Router::new()
        .route(ROOT_REQUEST, get(root))
        .route("/{segment}/did.json", get(single))
        .route("/api/did/generate", post(generate))
        .route("/api/did/generate-root", post(generate_root))
        .route("/health", get(health))
        .route("/api/info", get(info))
        .fallback(fallback)
        .method_not_allowed_fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Run the server until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(config: Config) -> io::Result<()> {
    let state = AppState::new(config);
    let listener = TcpListener::bind(state.config.addr()).await?;

    let domain = state.config.display_domain();
    tracing::info!("listening on {}", listener.local_addr()?);
    tracing::info!("domain: {domain}");
    tracing::info!("documents: {}", state.config.data_dir.display());
    tracing::info!("root DID document: http://{domain}{ROOT_REQUEST}");

    axum::serve(listener, create_router(state)).with_graceful_shutdown(shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

// Handler to resolve the root DID document.
async fn root(State(state): State<Arc<AppState>>) -> Result<Json<Document>, AppError> {
    Ok(Json(resolve(&state.store, &Resource::Root).await?))
}

// Handler to resolve a single segment DID document.
async fn single(
    State(state): State<Arc<AppState>>, Path(segment): Path<String>,
) -> Result<Json<Document>, AppError> {
    Ok(Json(resolve(&state.store, &Resource::Single(segment)).await?))
}

// Nested document paths have no fixed depth so cannot be routed. Anything
// else unmatched, including a known path with the wrong method, is a 404.
async fn fallback(State(state): State<Arc<AppState>>, method: Method, uri: Uri) -> Response {
    if method == Method::GET {
        if let Some(resource) = Resource::classify(uri.path()) {
            return match resolve(&state.store, &resource).await {
                Ok(doc) => Json(doc).into_response(),
                Err(e) => AppError::from(e).into_response(),
            };
        }
    }

    let requested = uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str());
    tracing::warn!("no route for {method} {requested}");
    let body = json!({
        "error": "DID document not found",
        "message": "The requested DID document does not exist",
        "requestedPath": requested,
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Body of a successful generation response.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GenerateResponse {
    /// Always `true`.
    pub success: bool,

    /// The generated identity.
    #[serde(flatten)]
    pub generated: Generated,

    /// Human readable outcome.
    pub message: String,
}

// Handler to generate a new user identity.
async fn generate(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    let generated = state
        .registrar
        .generate_user()
        .await
        .map_err(|e| AppError::Generate("Failed to generate DID", e))?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            success: true,
            generated,
            message: "DID generated successfully".into(),
        }),
    ))
}

// Handler to generate (or replace) the root identity.
async fn generate_root(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    let generated = state
        .registrar
        .generate_root()
        .await
        .map_err(|e| AppError::Generate("Failed to generate root DID", e))?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            success: true,
            generated,
            message: "Root DID generated successfully".into(),
        }),
    ))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "uptime": state.started.elapsed().as_secs_f64(),
        "version": VERSION,
    }))
}

async fn info() -> Json<Value> {
    let suites: Vec<String> = Suite::ALL.iter().map(ToString::to_string).collect();
    Json(json!({
        "name": NAME,
        "version": VERSION,
        "description": "A lightweight server for DID Web services",
        "endpoints": {
            "GET /.well-known/did.json": "Root domain DID document",
            "GET /{path}/did.json": "Path-specific DID document (W3C compliant)",
            "GET /{path1}/{path2}/did.json": "Multi-level path DID document",
            "POST /api/did/generate": "Generate new user DID document",
            "POST /api/did/generate-root": "Generate/update root DID document",
            "GET /health": "Health check",
            "GET /api/info": "API information",
        },
        "didWebSupport": true,
        "cryptographicSuites": suites,
    }))
}

/// Application errors, translated into JSON error responses.
#[derive(Debug)]
pub enum AppError {
    /// A document could not be resolved.
    Resolve(Error),

    /// An identity could not be generated.
    Generate(&'static str, Error),
}

impl From<Error> for AppError {
    fn from(error: Error) -> Self {
        Self::Resolve(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Resolve(error) => {
                let status = StatusCode::from_u16(error.status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if error.is_client_error() {
                    tracing::warn!("{status}: {error}");
                } else {
                    tracing::error!("{status}: {error}");
                }
                (status, Json(error.to_json())).into_response()
            }
            Self::Generate(label, error) => {
                tracing::error!("{label}: {error}");
                let body = json!({
                    "success": false,
                    "error": label,
                    "message": error.public_message(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
