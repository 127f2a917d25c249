//! REST surface
//!
//! `POST /profile/:key` treats the key as a username, `GET` and `DELETE`
//! treat it as an execution id.

use crate::error::ApiError;
use crate::handler::ApiHandler;
use crate::types::{JobStatusResponse, SubmitResponse};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use ghprofile_core::application::ShutdownToken;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Creates the REST router.
pub fn create_router(handler: Arc<ApiHandler>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/profile/:key",
            post(submit).get(status).delete(cancel),
        )
        .route("/profile/:key/:mods", post(submit_with_mods))
        .with_state(handler)
}

#[instrument(skip_all)]
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[derive(serde::Serialize)]
struct Accepted {
    id: String,
}

fn accepted(resp: SubmitResponse) -> (StatusCode, Json<Accepted>) {
    (StatusCode::ACCEPTED, Json(Accepted { id: resp.id }))
}

#[instrument(skip(handler))]
async fn submit(
    State(handler): State<Arc<ApiHandler>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let resp = handler.submit(&username, Vec::<String>::new()).await?;
    Ok(accepted(resp))
}

#[instrument(skip(handler))]
async fn submit_with_mods(
    State(handler): State<Arc<ApiHandler>>,
    Path((username, mods)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let resp = handler.submit_delimited(&username, &mods).await?;
    Ok(accepted(resp))
}

#[instrument(skip(handler))]
async fn status(
    State(handler): State<Arc<ApiHandler>>,
    Path(id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    Ok(Json(handler.status(&id).await?))
}

#[instrument(skip(handler))]
async fn cancel(
    State(handler): State<Arc<ApiHandler>>,
    Path(id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    Ok(Json(handler.cancel_job(&id).await?))
}

/// REST Server Configuration
#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RestServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

pub struct RestServer {
    config: RestServerConfig,
    handler: Arc<ApiHandler>,
}

impl RestServer {
    pub fn new(config: RestServerConfig, handler: Arc<ApiHandler>) -> Self {
        Self { config, handler }
    }

    /// Bind and serve in the background until `shutdown` fires
    pub async fn start(
        self,
        mut shutdown: ShutdownToken,
    ) -> Result<(SocketAddr, JoinHandle<()>), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let router = create_router(self.handler);
        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move { shutdown.wait().await })
                .await;
            if let Err(e) = served {
                error!(error = %e, "REST server failed");
            }
        });

        info!(addr = %local_addr, "REST server started");
        Ok((local_addr, handle))
    }
}
