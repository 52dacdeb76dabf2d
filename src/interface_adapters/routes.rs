use crate::interface_adapters::net::{
    stop_handler, watch_handler, watch_status_handler, ws_handler,
};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/map/watch", post(watch_handler).get(watch_status_handler))
        .route("/map/stop", post(stop_handler))
        // Viewers historically connect with a trailing slash.
        .route("/ws", get(ws_handler))
        .route("/ws/", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
