//! Risk Service
//!
//! HTTP binding for the risk decisioning engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      RISK SERVICE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────────────────────────────┐   │
//! │  │  API      │  │  RiskEngine (Arc, read-only)         │   │
//! │  │  Gateway  │─▶│  transaction · user · fraud · credit │   │
//! │  │  (Axum)   │  │  anomaly · network · aml             │   │
//! │  └───────────┘  └──────────────────┬───────────────────┘   │
//! │                                    ▼                        │
//! │                    ┌──────────────────────────┐            │
//! │                    │  Signal sources / graph  │            │
//! │                    └──────────────────────────┘            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod extract;
mod handlers;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use risk_core::{EngineConfig, RiskEngine};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env().context("invalid environment configuration")?;

    // Initialize logging (JSON lines in production)
    let json_logs = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "risk_server=debug,risk_core=info,tower_http=debug".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Risk Service starting ({})...", config.environment);

    // Engine tables: built-in, optionally replaced from file, then env overrides
    let mut engine_config = EngineConfig::load(config.risk_config_path.as_deref().map(Path::new))
        .context("failed to load engine configuration")?;
    config.apply_overrides(&mut engine_config);

    let engine = RiskEngine::synthetic(engine_config, config.collaborator_timeout())
        .context("engine configuration rejected")?;

    // Build application state
    let state = AppState {
        config: config.clone(),
        engine: Arc::new(engine),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server terminated")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub engine: Arc<RiskEngine>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let risk_routes = Router::new()
        .route("/risk/assess-transaction", post(handlers::risk::assess_transaction))
        .route("/risk/assess-user", post(handlers::risk::assess_user))
        .route("/risk/fraud-detection", post(handlers::risk::fraud_detection))
        .route("/risk/network-analysis", post(handlers::risk::network_analysis))
        .route("/risk/anomaly-detection", post(handlers::risk::anomaly_detection))
        .route("/risk/credit-score", post(handlers::risk::credit_score));

    let kyc_routes = Router::new()
        .route("/kyc/aml-check", post(handlers::kyc::aml_check));

    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(risk_routes)
        .merge(kyc_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
