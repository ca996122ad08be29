//! Documentation of the Memeverse backend.
//!
//!
//!
//! # General Infrastructure
//! - One axum server fronting three data sources that never agree with
//!   each other: the remote template catalog, the Redis upload store, and
//!   the Redis overlay ledger of likes/comments
//! - The `engagement` crate reconciles them into the view models served to
//!   the Explore, Leaderboard, and Profile screens
//! - The catalog is fetched once at startup (cache file first, remote
//!   second) and held in memory; a failed fetch degrades to an empty
//!   catalog rather than refusing to boot
//!
//!
//!
//! # Failure Policy
//!
//! - Remote fetch failures degrade to empty result sets
//! - Unreadable or malformed overlay entries count as absent
//! - Blank comments are silently dropped
//! - Storage write failures and captioning failures are the only errors
//!   that reach the client (500/502)
//!
//!
//!
//! # Setup
//!
//! Run locally (needs a Redis and the captioning secrets under
//! `/run/secrets/`).
//! ```sh
//! RUST_LOG=info cargo run --bin memeverse
//! ```
//!
//! Refresh the template cache.
//! ```sh
//! cargo run --bin refresh
//! ```

use std::time::Duration;

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
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;

use routes::{
    comment_handler, explore_handler, leaderboard_handler, like_handler, meme_details_handler,
    profile_handler, profile_update_handler, templates_handler, upload_handler,
};
use state::State;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/templates", get(templates_handler))
        .route("/memes", get(explore_handler))
        .route("/memes/{id}", get(meme_details_handler))
        .route("/memes/{id}/like", post(like_handler))
        .route("/memes/{id}/comments", post(comment_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route("/profile", get(profile_handler).post(profile_update_handler))
        .route("/upload", post(upload_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
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
