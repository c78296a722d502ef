use crate::{
    core::{
        auth::{is_authorized, AuthToken},
        cache::SnapshotCache,
    },
    error::{BoardError, BoardResult},
    store::LapStore,
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

// Roles allowed to record laps.
const LAP_WRITER_ROLES: [&'static str; 2] = ["admin", "staff"];

// Header carrying the caller's role. The session layer in front of this
// service validates the login and injects it; an absent header means an
// anonymous caller.
const USER_ROLE_HEADER: &str = "x-user-role";

pub struct AppState {
    pub cache: SnapshotCache,
    pub store: Arc<dyn LapStore>,
}

pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/ranking", get(ranking))
        .route("/api/runners/{number}/laps", post(record_lap))
        .with_state(state)
}

pub async fn serve(addr: &str, state: Arc<AppState>) -> BoardResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BoardError::Server(e.to_string()))?;
    info!("Listening on {addr}.");
    axum::serve(listener, build_app(state))
        .await
        .map_err(|e| BoardError::Server(e.to_string()))
}

fn token_from_headers(headers: &HeaderMap) -> Option<AuthToken> {
    headers
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|role| AuthToken {
            role: role.to_string(),
        })
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn ranking(State(state): State<Arc<AppState>>) -> Response {
    match state.cache.get().await {
        Ok(snapshot) => (StatusCode::OK, Json(&*snapshot)).into_response(),
        Err(e) => {
            error!("Could not serve ranking snapshot. {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "ranking data unavailable" })),
            )
                .into_response()
        }
    }
}

async fn record_lap(
    State(state): State<Arc<AppState>>,
    Path(number): Path<u32>,
    headers: HeaderMap,
) -> Response {
    let token = token_from_headers(&headers);
    if !is_authorized(token.as_ref(), &LAP_WRITER_ROLES) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "forbidden" })),
        )
            .into_response();
    }

    match state.store.record_lap(number).await {
        Ok(laps) => (
            StatusCode::OK,
            Json(json!({ "number": number, "laps": laps })),
        )
            .into_response(),
        Err(e) => {
            error!("Could not record lap for runner {number}. {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "store unavailable" })),
            )
                .into_response()
        }
    }
}
