//! HTTP surface.
//!
//! `POST /api/search` takes a [`SearchCriteria`] body and answers with one
//! streamed response whose body is the JSON Lines wire protocol. If the
//! upstream search cannot be started, or fails or stalls before its first
//! fragment, the handler answers 500 with a JSON error body instead, so an
//! empty stream always means "no results".

use crate::config::ServerConfig;
use crate::error::{
    ErrorResponse, ServerError, ServerResult, METHOD_NOT_ALLOWED_MESSAGE,
    UPSTREAM_FAILURE_MESSAGE,
};
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::{stream, StreamExt};
use plastfinder_core::{build_prompt, SearchCriteria};
use plastfinder_models::{BoxedUpstream, FragmentStream, GeminiSearchModel};
use plastfinder_streaming::{spawn_relay, RelayConfig, CONTENT_TYPE};
use serde_json::json;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::Instrument;
use uuid::Uuid;

/// Search route path.
pub const SEARCH_PATH: &str = "/api/search";

/// Shared state for the HTTP handlers.
pub struct AppState {
    /// Upstream model.
    pub upstream: BoxedUpstream,
    /// Relay settings applied to every response.
    pub relay: RelayConfig,
}

impl AppState {
    /// State with default relay settings.
    pub fn new(upstream: BoxedUpstream) -> Self {
        Self {
            upstream,
            relay: RelayConfig::default(),
        }
    }

    /// State for a configured Gemini upstream.
    pub fn from_config(config: &ServerConfig) -> Self {
        let model = GeminiSearchModel::new(&config.model, &config.api_key)
            .with_base_url(&config.base_url)
            .with_temperature(config.temperature)
            .with_thinking(Some(config.thinking_budget));

        Self {
            upstream: Arc::new(model),
            relay: RelayConfig::default().with_idle_timeout(config.idle_timeout),
        }
    }
}

/// Create the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(SEARCH_PATH, post(search).fallback(method_not_allowed))
        .route("/health", get(health_check))
        .with_state(Arc::new(state))
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve<F>(config: &ServerConfig, state: AppState, shutdown: F) -> ServerResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| ServerError::Bind(format!("{}: {e}", config.bind_addr)))?;

    tracing::info!(
        addr = %config.bind_addr,
        model = %state.upstream.identifier(),
        "Listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))
}

// Handler implementations

/// POST /api/search - Stream supplier records for the given criteria
async fn search(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchCriteria>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();

    let criteria = match payload {
        Ok(Json(criteria)) => criteria,
        Err(rejection) => {
            tracing::warn!(%request_id, error = %rejection.body_text(), "Rejected search request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_code(
                    rejection.body_text(),
                    "invalid_request",
                )),
            )
                .into_response();
        }
    };

    let span = tracing::info_span!("search", %request_id, criteria = %criteria.summary());
    start_search(state, criteria).instrument(span).await
}

async fn start_search(state: Arc<AppState>, criteria: SearchCriteria) -> Response {
    let prompt = build_prompt(&criteria);

    let mut fragments = match state.upstream.search_stream(&prompt).await {
        Ok(fragments) => fragments,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start upstream search");
            return upstream_failure();
        }
    };

    // Headers are not sent until the upstream has produced something.
    let first = tokio::time::timeout(state.relay.idle_timeout, fragments.next()).await;
    let fragments: FragmentStream = match first {
        Ok(Some(Ok(fragment))) => Box::pin(stream::iter([Ok(fragment)]).chain(fragments)),
        Ok(None) => Box::pin(stream::empty()),
        Ok(Some(Err(e))) => {
            tracing::error!(error = %e, "Upstream search failed before first fragment");
            return upstream_failure();
        }
        Err(_) => {
            tracing::error!(
                timeout = ?state.relay.idle_timeout,
                "Upstream search produced nothing before timeout"
            );
            return upstream_failure();
        }
    };

    tracing::info!("Streaming search results");
    let (lines, _relay) = spawn_relay(fragments, state.relay.clone());

    (
        [
            (header::CONTENT_TYPE, CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(lines.map(Ok::<_, Infallible>)),
    )
        .into_response()
}

fn upstream_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::with_code(
            UPSTREAM_FAILURE_MESSAGE,
            "upstream_error",
        )),
    )
        .into_response()
}

/// Any other method on the search route
async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(ErrorResponse::with_code(
            METHOD_NOT_ALLOWED_MESSAGE,
            "method_not_allowed",
        )),
    )
}

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "plastfinder"
    }))
}
