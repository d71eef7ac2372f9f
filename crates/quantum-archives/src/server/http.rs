//! JSON-over-HTTP API.
//!
//! Every mutating route returns the snapshot right after its intent was
//! applied; `/api/events` streams every later snapshot as server-sent events.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{delete, get, post, put},
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::WatchStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::SessionError;
use crate::models::{Physicist, Tab};
use crate::session::{SessionHandle, SessionState};

/// Shared state for HTTP handlers.
#[derive(Debug, Clone)]
pub struct HttpState {
    pub session: SessionHandle,
}

/// Body of `POST /api/physicist`.
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub physicist: String,
}

/// Body of `POST /api/collection`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectRequest {
    pub paper_id: String,
}

/// Body of `PUT /api/tab`.
#[derive(Debug, Deserialize)]
pub struct TabRequest {
    pub tab: String,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Block until the answer has arrived.
    #[serde(default)]
    pub wait: bool,
}

/// Errors returned as JSON bodies.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{0}")]
    InvalidTab(String),

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("A previous message is still being answered")]
    Busy,
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Session(SessionError::Closed) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Session(SessionError::UnknownPaper(_)) => StatusCode::NOT_FOUND,
            Self::Session(SessionError::UnknownPhysicist(_)) => StatusCode::BAD_REQUEST,
            Self::InvalidTab(_) | Self::EmptyMessage => StatusCode::BAD_REQUEST,
            Self::Busy => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Session(e) => e.to_user_message(),
            other => other.to_string(),
        };
        tracing::debug!(status = status.as_u16(), error = %self, "API request rejected");
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

type ApiResult = Result<Json<Arc<SessionState>>, ApiError>;

/// Create the HTTP router for a session.
pub fn create_router(session: SessionHandle) -> Router {
    let state = HttpState { session };

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/api/physicists", get(list_physicists))
        .route("/api/state", get(get_state))
        .route("/api/physicist", post(select_physicist))
        .route("/api/collection", post(collect_paper))
        .route("/api/collection/{id}", delete(remove_paper))
        .route("/api/tab", put(switch_tab))
        .route("/api/chat", post(send_message))
        .route("/api/events", get(events))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "quantum-archives",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_physicists() -> impl IntoResponse {
    Json(Physicist::ALL)
}

async fn get_state(State(state): State<HttpState>) -> Json<Arc<SessionState>> {
    Json(state.session.snapshot())
}

async fn select_physicist(
    State(state): State<HttpState>,
    Json(req): Json<SelectRequest>,
) -> ApiResult {
    let physicist: Physicist = req.physicist.parse()?;
    tracing::info!(physicist = %physicist, "Physicist selected over HTTP");
    Ok(Json(state.session.select_physicist(physicist).await?))
}

async fn collect_paper(
    State(state): State<HttpState>,
    Json(req): Json<CollectRequest>,
) -> ApiResult {
    Ok(Json(state.session.collect_by_id(&req.paper_id).await?))
}

async fn remove_paper(State(state): State<HttpState>, Path(id): Path<String>) -> ApiResult {
    if state.session.snapshot().collected(&id).is_none() {
        return Err(SessionError::UnknownPaper(id).into());
    }
    Ok(Json(state.session.remove(&id).await?))
}

async fn switch_tab(State(state): State<HttpState>, Json(req): Json<TabRequest>) -> ApiResult {
    let tab: Tab = req.tab.parse().map_err(ApiError::InvalidTab)?;
    Ok(Json(state.session.switch_tab(tab).await?))
}

async fn send_message(State(state): State<HttpState>, Json(req): Json<ChatRequest>) -> ApiResult {
    if req.message.trim().is_empty() {
        return Err(ApiError::EmptyMessage);
    }
    if state.session.snapshot().is_loading {
        return Err(ApiError::Busy);
    }

    let snapshot = state.session.send_message(req.message).await?;
    if req.wait {
        return Ok(Json(state.session.settled().await?));
    }
    Ok(Json(snapshot))
}

async fn events(
    State(state): State<HttpState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = WatchStream::new(state.session.subscribe()).map(|snapshot| {
        let event = Event::default().event("state").json_data(&*snapshot).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to encode snapshot");
            Event::default().event("error").data(e.to_string())
        });
        Ok(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
