pub mod appointments;
pub mod auth;
pub mod health;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/appointments",
            get(appointments::index).post(appointments::create),
        )
        .route("/appointments/available", get(appointments::available))
        .route("/appointments/:id", delete(appointments::destroy))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ));

    Router::new()
        .route("/up", get(health::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
