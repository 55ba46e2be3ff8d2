//! FiskEat backend service.
//!
//! Thin axum shell over the `menu` crate: it wires configuration, the
//! Sodexo gateway, the flag store and the meal schedule into shared state,
//! and maps the core operations onto HTTP routes.
//!
//! # Endpoints
//!
//! - `GET /` — service banner
//! - `GET /api/menu/today` — today's normalized menu
//! - `GET /api/menu/{date}` — menu for a specific date
//! - `GET /api/food/{item_id}` — one item from today's menu
//! - `POST /api/flag` — mark an item unavailable during its live meal

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
pub mod error;
pub mod routes;
pub mod state;

use routes::{
    flag_handler, food_item_handler, home_handler, menu_by_date_handler, not_found_handler,
    todays_menu_handler,
};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new();

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/", get(home_handler))
        .route("/api/menu/today", get(todays_menu_handler))
        .route("/api/menu/{date}", get(menu_by_date_handler))
        .route("/api/food/{item_id}", get(food_item_handler))
        .route("/api/flag", post(flag_handler))
        .fallback(not_found_handler)
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
