use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use eyre::Result;
use log::{error, info};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use crate::orchestrator::{
    DEFAULT_CHUNK_SIZE, DEFAULT_DEPTH, Orchestrator, SummaryOptions, SummaryPayload, is_invalid_input,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub youtube_url: String,
    #[serde(default = "default_chunk_size")]
    pub summary_length: usize,
    #[serde(default = "default_depth")]
    pub summary_depth: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_depth() -> usize {
    DEFAULT_DEPTH
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Maps pipeline errors onto a status code and a plain-text body
pub struct AppError(eyre::Report);

impl<E: Into<eyre::Report>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if is_invalid_input(&self.0) {
            return (StatusCode::BAD_REQUEST, self.0.to_string()).into_response();
        }
        error!("Summary request failed: {:?}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "failed to generate summary").into_response()
    }
}

pub fn router(orchestrator: Arc<Orchestrator>, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate_summary", get(generate_summary))
        .with_state(orchestrator)
        .fallback_service(ServeDir::new(static_dir))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn generate_summary(
    State(orchestrator): State<Arc<Orchestrator>>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryPayload>, AppError> {
    info!("Received summary request for {}", query.youtube_url);
    let options = SummaryOptions::new(query.summary_length, query.summary_depth)?;
    let payload = orchestrator.summarize_url(&query.youtube_url, options).await?;
    Ok(Json(payload))
}

/// Serve `app` on `addr` until Ctrl-C or SIGTERM
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_until(listener, app, shutdown_signal()).await
}

/// Serve `app` on `listener` until `shutdown` completes
pub async fn serve_until<F>(listener: tokio::net::TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
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
    info!("Shutdown signal received");
}
