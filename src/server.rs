//! Read-only HTTP API over the summary store.

use crate::store::SummaryStore;
use anyhow::Result;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SummaryStore>,
}

pub fn router(store: Arc<SummaryStore>) -> Router {
    let cors = CorsLayer::new().allow_methods(Any).allow_origin(Any);
    let trace = TraceLayer::new_for_http();
    Router::new()
        .route("/api/stockdata", get(list_summaries))
        .route("/api/stockdata/{id}", get(summary_by_id))
        .layer(trace)
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .layer(cors)
        .with_state(AppState { store })
}

/// Binds the listener and serves the API until the process exits.
pub async fn serve(store: Arc<SummaryStore>, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(store)).await?;
    Ok(())
}

async fn list_summaries(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.list_all().await {
        Ok(rows) => (
            StatusCode::OK,
            Json(json!({"message": "success", "data": rows})),
        )
            .into_response(),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

async fn summary_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.store.get_by_id(id).await {
        Ok(Some(row)) => (
            StatusCode::OK,
            Json(json!({"message": "success", "row": row})),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("no row with id {id}")})),
        )
            .into_response(),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}
