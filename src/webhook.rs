use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::HookAllowList;
use crate::changes::filter_changes;
use crate::config::JobSettings;
use crate::dispatcher::{dispatch, JobQueue};
use crate::error::Result;
use crate::models::PushEvent;

#[derive(Clone)]
pub struct AppState {
    pub allow_list: Arc<HookAllowList>,
    pub jobs: Arc<dyn JobQueue>,
    pub settings: Arc<JobSettings>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/bitbucket", post(bitbucket_push))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Authenticate a Bitbucket push and submit a Batch job for every commit that asks for one.
async fn bitbucket_push(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    state.allow_list.authenticate(&headers).await?;

    let event: PushEvent = serde_json::from_slice(&body)?;
    let requests = filter_changes(&event.push.changes)?;
    tracing::info!(
        "Push to {}: {} of {} changes request a job",
        event.repository.name,
        requests.len(),
        event.push.changes.len()
    );

    dispatch(state.jobs.as_ref(), &state.settings, &event.repository.name, requests).await?;

    Ok(StatusCode::NO_CONTENT)
}
