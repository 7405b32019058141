//! Health check handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    environment: String,
    time: DateTime<Utc>,
    pipelines_loaded: usize,
    graph_db_connected: bool,
    pipelines: &'static [&'static str],
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "risk-service",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        time: Utc::now(),
        pipelines_loaded: state.engine.pipeline_names().len(),
        graph_db_connected: state.engine.network().graph_reachable().await,
        pipelines: state.engine.pipeline_names(),
    })
}
