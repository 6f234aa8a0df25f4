use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use ticketdesk_core::Dataset;

use super::error::ApiError;
use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Ticket System API läuft".to_string(),
        version: VERSION.to_string(),
        backend: state.store().backend_name().to_string(),
    })
}

/// Full snapshot: tickets, groups, authors and the admin password
pub async fn get_data(State(state): State<Arc<AppState>>) -> Result<Json<Dataset>, ApiError> {
    state
        .store()
        .load_all()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_store("Fehler beim Laden der Daten", e))
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state).await;
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
