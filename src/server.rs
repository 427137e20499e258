//! HTTP service exposing the recommender.
//!
//! ## Endpoints
//!
//! - `GET /health`: liveness check
//! - `GET /`: service name, version, and endpoint map
//! - `POST /recommend`: ranked, category-balanced recommendations

use std::net::SocketAddr;
use std::sync::Arc;

use assessrec_core::Recommendation;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{Instrument, info};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{Result, ServiceError};
use crate::startup::ServiceRecommender;

// ---------------------------------------------------------------------------
// Request and response types
// ---------------------------------------------------------------------------

/// Body of `POST /recommend`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// Job description or hiring query.
    pub query: String,
    /// Number of results wanted. Defaults to the server's `default_top_k`.
    #[serde(default)]
    pub top_k: Option<i64>,
}

/// Response of `POST /recommend`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub query: String,
    pub recommendations: Vec<Recommendation>,
    pub total_results: usize,
}

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    recommender: Arc<ServiceRecommender>,
    default_top_k: usize,
    max_top_k: usize,
}

impl AppState {
    pub fn new(recommender: Arc<ServiceRecommender>, config: &ServerConfig) -> Self {
        Self {
            recommender,
            default_top_k: config.default_top_k,
            max_top_k: config.max_top_k,
        }
    }

    /// Resolve a requested `top_k`, or explain why it is rejected.
    fn resolve_top_k(&self, requested: Option<i64>) -> std::result::Result<usize, String> {
        match requested {
            None => Ok(self.default_top_k.min(self.max_top_k)),
            Some(n) if n <= 0 => Err("top_k must be greater than 0".to_owned()),
            Some(n) => Ok(usize::try_from(n).map_or(self.max_top_k, |n| n.min(self.max_top_k))),
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/", get(handle_root))
        .route("/recommend", post(handle_recommend))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// RecommendServer
// ---------------------------------------------------------------------------

/// Recommendation HTTP server running in a background tokio task.
pub struct RecommendServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl RecommendServer {
    /// Bind to `{config.host}:{config.port}` (port `0` auto-assigns) and
    /// start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(recommender: Arc<ServiceRecommender>, config: &ServerConfig) -> Result<Self> {
        let app = router(AppState::new(recommender, config));

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ServiceError::Server(format!("bind to {bind_addr} failed: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ServiceError::Server(format!("failed to get local addr: {e}")))?;

        info!("recommendation server listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("recommendation server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for RecommendServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

fn detail(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message.into() })))
}

/// `GET /health`
async fn handle_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "assessment recommendation service is running",
    }))
}

/// `GET /`
async fn handle_root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /health",
            "recommend": "POST /recommend",
        },
    }))
}

/// `POST /recommend`
async fn handle_recommend(
    State(state): State<AppState>,
    body: std::result::Result<Json<RecommendRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return detail(rejection.status(), rejection.body_text()),
    };

    if request.query.trim().is_empty() {
        return detail(StatusCode::BAD_REQUEST, "query must not be empty");
    }
    let top_k = match state.resolve_top_k(request.top_k) {
        Ok(top_k) => top_k,
        Err(message) => return detail(StatusCode::BAD_REQUEST, message),
    };

    let span = tracing::info_span!("recommend", request_id = %Uuid::new_v4(), top_k);
    async move {
        tracing::debug!(query = %request.query, "recommend request");
        let recommendations = state.recommender.recommend(&request.query, top_k).await;
        info!(results = recommendations.len(), "recommend request served");

        let response = RecommendResponse {
            total_results: recommendations.len(),
            query: request.query,
            recommendations,
        };
        match serde_json::to_value(response) {
            Ok(json) => (StatusCode::OK, Json(json)),
            Err(e) => detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode response: {e}"),
            ),
        }
    }
    .instrument(span)
    .await
}
