//! Documentation of the cookie clicker backend.
//!
//!
//!
//! # General Infrastructure
//! - Browser client renders the cookie and posts a click with its locally generated user id
//! - Server resolves the click against the player's record and returns the new totals
//! - Records live in Redis, one hash plus one prize list per user
//! - Client ids are trusted as-is, there is no login
//!
//!
//!
//! # Endpoints
//!
//! ## Click
//! `POST /api/click` with `{ "userId": "user_1731600000000" }`.
//!
//! Returns `totalScore`, `totalClicks`, `scoreIncrease`, `prize` (name or null) and `activeEffects`.
//! `scoreIncrease` is the gain before effects, the client renders effect bonuses on its own.
//!
//! ## Stats
//! `GET /api/stats/{userId}`.
//!
//! Returns the full record, or `{ totalScore: 0, totalClicks: 0, prizeCount: 0 }` for an
//! unknown id. Never creates a record.
//!
//! ## Health
//! `GET /health`, plain `ok`.
//!
//!
//!
//! # Notes
//!
//! ## Failures
//! Storage errors are logged and surfaced as a generic 500 with `{ "error": ... }`.
//! Nothing retries, the client just clicks again.
//!
//! ## In-memory Store
//! `STORE=memory` swaps Redis for a process-local map. Handy for local play, not for deploys.
//!
//!
//!
//! # Setup
//!
//! Environment, all optional.
//! ```sh
//! PORT=5000
//! STORE=redis
//! REDIS_URL=redis://127.0.0.1:6379
//! REDIS_TIMEOUT_MS=100
//! ALLOWED_ORIGINS=http://localhost:3000,https://cookie.example.app
//! RUST_LOG=info
//! ```
//!
//! Run.
//! ```sh
//! cargo run -p cookie
//! ```
//!
//! Click a few hundred times.
//! ```sh
//! cargo run -p tester -- user_local 500
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;

use routes::{click_handler, health_handler, stats_handler};
use state::AppState;
use utils::origin_headers;

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origin_headers(&state.config.allowed_origins)))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/click", post(click_handler))
        .route("/api/stats/{user_id}", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
