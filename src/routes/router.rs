use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{AppState, handle_probe, health, latest_snapshot};
use crate::snmp::Connector;

pub fn create_router<C: Connector + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/snapshot", get(latest_snapshot::<C>))
        .route("/probe", post(handle_probe::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
