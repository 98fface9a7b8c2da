//! DeployGate - deployment-risk negotiation service
//!
//! Given a described code change and the current health of the target
//! service, the engine returns a deployment contract: a risk score with
//! calibrated confidence, a staged canary plan, and quantitative guardrails.
//! Recorded outcomes feed a background learning loop that retunes the
//! ensemble weights.
//!
//! ```text
//! assess:  request -> heuristic + ml -> ensemble -> canary policy
//! record:  request -> re-score -> outcome store
//! tuning:  scheduler -> tuner -> (reads store, swaps weights)
//! ```

mod config;
mod db;
mod engine;
mod error;
mod handlers;
mod middleware;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engine::EnsembleWeights;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "deploygate=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("DeployGate starting...");
    tracing::info!("Outcome store: {}", config.history_db_path);

    // Open the outcome store
    let pool = db::create_pool(&config.history_db_path)
        .await
        .expect("Failed to open outcome store");
    db::run_migrations(&pool)
        .await
        .expect("Failed to apply outcome store schema");

    // Build the engine
    let weights = EnsembleWeights::from_init(config.heuristic_weight_init, config.ml_weight_init);
    let engine = Arc::new(engine::Engine::new(pool, weights, config.retention_cap));

    match engine.refresh_calibration().await {
        Ok(value) => tracing::info!(calibration = value, "historical calibration loaded"),
        Err(e) => tracing::warn!("calibration bootstrap failed: {}", e),
    }

    // Background weight tuning
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let scheduler = if config.enable_tuning {
        Some(engine::scheduler::spawn(
            engine.clone(),
            Duration::from_secs(config.tuning_interval_sec),
            shutdown_rx,
        ))
    } else {
        tracing::info!("weight tuning scheduler disabled");
        None
    };

    // Build application state and router
    let state = AppState {
        engine: engine.clone(),
        config: config.clone(),
    };
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind service port");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Drain the scheduler, then release the store
    let _ = shutdown_tx.send(true);
    if let Some(handle) = scheduler {
        let _ = handle.await;
    }
    engine.pool().close().await;
    tracing::info!("DeployGate stopped");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<engine::Engine>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/engine/status", get(handlers::status::get))
        .route("/api/v1/assess", post(handlers::assess::assess))
        .route(
            "/api/v1/outcomes",
            post(handlers::outcomes::record).get(handlers::outcomes::list),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_api_key,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
