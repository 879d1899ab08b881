//! HTTP surface: one ingestion route, one health probe.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use sealpost_core::{
    ConfigError, Delivery, ForwardError, MemoryTtlStore, ServerPipeline, SystemClock,
};
use sealpost_proto::{ForwardRequest, ForwardResponse, HealthResponse};
use tower_http::{
    limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::warn;

/// Request bodies past this size are rejected before JSON parsing.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Per-handler deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The pipeline type this server runs: in-memory dedup, wall-clock time,
/// type-erased delivery so tests can substitute a fake.
pub type Pipeline =
    ServerPipeline<MemoryTtlStore<SystemClock>, Arc<dyn Delivery>, SystemClock>;

/// State shared by all handlers.
pub struct AppState {
    pipeline: Pipeline,
    limiter: DefaultKeyedRateLimiter<std::net::IpAddr>,
}

impl AppState {
    /// Bundle the pipeline with a per-IP rate limiter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] when `requests_per_minute`
    /// is zero; a zero budget would silently reject every request.
    pub fn new(pipeline: Pipeline, requests_per_minute: u32) -> Result<Self, ConfigError> {
        let per_minute = std::num::NonZeroU32::new(requests_per_minute)
            .ok_or(ConfigError::InvalidSetting("rate limit must be at least one per minute"))?;
        Ok(Self { pipeline, limiter: RateLimiter::keyed(Quota::per_minute(per_minute)) })
    }

    /// The pipeline, for the periodic sweep task.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/forward-message", post(forward_message))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

/// POST /forward-message: the single ingestion endpoint.
///
/// The rate limit runs before any cryptographic work, so a flood cannot
/// buy HMAC computations with garbage requests.
async fn forward_message(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<ForwardRequest>,
) -> Response {
    if state.limiter.check_key(&addr.ip()).is_err() {
        return reject(&ForwardError::RateLimited);
    }

    match state.pipeline.handle(&request).await {
        Ok(outcome) => {
            let message = if outcome.duplicate {
                "duplicate suppressed".to_string()
            } else {
                format!("{} delivered", outcome.category)
            };
            (
                StatusCode::OK,
                Json(ForwardResponse {
                    success: true,
                    message,
                    delivery_id: outcome.delivery_id,
                }),
            )
                .into_response()
        },
        Err(err) => reject(&err),
    }
}

/// GET /health: liveness plus delivery configuration state.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let delivery_configured = state.pipeline.delivery_healthy().await;
    let status = if delivery_configured { "healthy" } else { "degraded" };
    Json(HealthResponse { status: status.to_string(), delivery_configured })
}

/// Map a pipeline rejection to a status and a content-free body.
fn reject(err: &ForwardError) -> Response {
    let status = match err {
        ForwardError::Malformed | ForwardError::Stale { .. } | ForwardError::FromFuture { .. } => {
            StatusCode::BAD_REQUEST
        },
        ForwardError::Authentication => StatusCode::UNAUTHORIZED,
        ForwardError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ForwardError::Delivery(_) => StatusCode::BAD_GATEWAY,
        ForwardError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        warn!(%err, "request failed on server side");
    }

    (
        status,
        Json(ForwardResponse {
            success: false,
            message: err.to_string(),
            delivery_id: None,
        }),
    )
        .into_response()
}

/// Spawn the background sweep that evicts expired dedup entries.
pub fn spawn_sweep(state: Arc<AppState>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = state.pipeline.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, "dedup sweep evicted expired entries");
            }
        }
    })
}
