use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use pwn_core::{query_key, snapshot, ShardSet, ShardStats};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Filters are read-only once loaded, so handlers share them without a lock.
#[derive(Clone)]
pub struct AppState {
    pub filters: Arc<ShardSet>,
}

impl AppState {
    pub fn load(path: &Path) -> Result<Self> {
        let set = snapshot::load(path).with_context(|| format!("loading filters from {}", path.display()))?;
        tracing::info!(shards = set.len(), inserted = set.total_inserted(), "filters loaded");
        Ok(Self { filters: Arc::new(set) })
    }
}

#[derive(Serialize)]
pub struct CheckResponse {
    prefix: String,
    possibly_pwned: bool,
}

#[derive(Serialize)]
pub struct StatsResponse {
    shards: usize,
    active_index: usize,
    inserted: u64,
    per_shard: Vec<ShardStats>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/check/:hash", get(check_hash))
        .route("/stats", get(stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn check_hash(
    State(state): State<AppState>,
    UrlPath(hash): UrlPath<String>,
) -> Result<Json<CheckResponse>, StatusCode> {
    let key = query_key(&hash).ok_or(StatusCode::BAD_REQUEST)?;
    Ok(Json(CheckResponse {
        prefix: String::from_utf8_lossy(&key).into_owned(),
        possibly_pwned: state.filters.contains(&key),
    }))
}

async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let f = &state.filters;
    Json(StatsResponse {
        shards: f.len(),
        active_index: f.active_index(),
        inserted: f.total_inserted(),
        per_shard: f.stats(),
    })
}
