//! Axum router construction for the API server.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the API server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/lots/:lot_id` -- `WebSocket` status-change stream
/// - `GET /api/lots` -- lot availability summaries
/// - `GET /api/lots/nearest` -- nearest lot to a position
/// - `GET /api/lots/:id/nodes` / `edges` -- lot structure
/// - `GET /api/lots/:id/route` / `route-to-exit` / `find-spot` /
///   `alternative-routes` -- routing queries
/// - `POST /api/lots/:id/validate-path` -- path re-check
/// - `POST /api/lots/:id/nodes/:node_id/status` -- spot status change
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/lots/{lot_id}", get(ws::ws_lot))
        // REST API
        .route("/api/lots", get(handlers::list_lots))
        .route("/api/lots/nearest", get(handlers::nearest_lot))
        .route("/api/lots/{lot_id}/nodes", get(handlers::list_nodes))
        .route("/api/lots/{lot_id}/edges", get(handlers::list_edges))
        .route("/api/lots/{lot_id}/route", get(handlers::get_route))
        .route(
            "/api/lots/{lot_id}/route-to-exit",
            get(handlers::get_route_to_exit),
        )
        .route("/api/lots/{lot_id}/find-spot", get(handlers::find_spot))
        .route(
            "/api/lots/{lot_id}/alternative-routes",
            get(handlers::get_alternative_routes),
        )
        .route(
            "/api/lots/{lot_id}/validate-path",
            post(handlers::validate_path),
        )
        .route(
            "/api/lots/{lot_id}/nodes/{node_id}/status",
            post(handlers::set_status),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
