//! REST API endpoint handlers.
//!
//! All handlers go through the shared [`AppState`]'s registry; reads run
//! under the target lot's read lock and status writes serialize through
//! its write lock.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/lots` | List lot availability summaries |
//! | `GET` | `/api/lots/nearest` | Nearest lot to a position |
//! | `GET` | `/api/lots/:id/nodes` | All nodes plus grid dimensions |
//! | `GET` | `/api/lots/:id/edges` | All edges |
//! | `GET` | `/api/lots/:id/route` | Shortest route between two nodes |
//! | `GET` | `/api/lots/:id/route-to-exit` | Route to the nearest exit |
//! | `GET` | `/api/lots/:id/find-spot` | Recommend an available spot |
//! | `GET` | `/api/lots/:id/alternative-routes` | Ranked route variants |
//! | `POST` | `/api/lots/:id/validate-path` | Re-check an issued path |
//! | `POST` | `/api/lots/:id/nodes/:node_id/status` | Spot status change |

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use parkgrid_lot::router;
use parkgrid_types::{
    Edge, LotId, LotSummary, Node, NodeId, Orientation, PathValidation, SpotRecommendation,
    SpotStatus,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter and body structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/lots/nearest`.
#[derive(Debug, Deserialize)]
pub struct NearestQuery {
    /// Latitude of the caller, in degrees.
    pub latitude: f64,
    /// Longitude of the caller, in degrees.
    pub longitude: f64,
}

/// Query parameters for `GET /api/lots/:id/route`.
#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    /// Start node id.
    pub start: NodeId,
    /// End node id.
    pub end: NodeId,
}

/// Query parameters for `GET /api/lots/:id/route-to-exit`.
#[derive(Debug, Deserialize)]
pub struct ExitRouteQuery {
    /// The driver's current node.
    pub from: NodeId,
}

/// Query parameters for `GET /api/lots/:id/find-spot`.
#[derive(Debug, Deserialize)]
pub struct FindSpotQuery {
    /// The entrance to measure spot distance from.
    pub entrance: NodeId,
    /// Preferred spot orientation; falls back to any when none match.
    pub orientation: Option<Orientation>,
}

/// Query parameters for `GET /api/lots/:id/alternative-routes`.
#[derive(Debug, Deserialize)]
pub struct AlternativesQuery {
    /// Start node id.
    pub start: NodeId,
    /// End node id.
    pub end: NodeId,
    /// Maximum number of routes to return (default 3).
    pub count: Option<usize>,
}

/// Query parameters for `POST /api/lots/:id/nodes/:node_id/status`.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// The requested spot status.
    pub status: SpotStatus,
    /// Reservation hold window in seconds; required for `RESERVED`.
    pub ttl_seconds: Option<u64>,
}

/// Request body for `POST /api/lots/:id/validate-path`.
#[derive(Debug, Deserialize)]
pub struct ValidatePathRequest {
    /// The node sequence to re-check, in traversal order.
    pub node_ids: Vec<NodeId>,
}

// ---------------------------------------------------------------------------
// Response structs
// ---------------------------------------------------------------------------

/// Response for `GET /api/lots/:id/nodes`.
#[derive(Debug, Serialize)]
pub struct NodesResponse {
    /// Grid width (max x + 1).
    pub width: i64,
    /// Grid height (max y + 1).
    pub height: i64,
    /// Every node of the lot, in node-id order.
    pub nodes: Vec<Node>,
}

/// Response for `GET /api/lots/:id/route`.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    /// Coordinate path, endpoints included.
    pub path: Vec<(i32, i32)>,
}

/// Response for `GET /api/lots/:id/route-to-exit`.
#[derive(Debug, Serialize)]
pub struct ExitRouteResponse {
    /// The exit the route leads to.
    pub exit_id: NodeId,
    /// Coordinate path, endpoints included.
    pub path: Vec<(i32, i32)>,
}

/// Response for `GET /api/lots/:id/alternative-routes`.
#[derive(Debug, Serialize)]
pub struct AlternativesResponse {
    /// Routes ordered shortest first.
    pub routes: Vec<Vec<(i32, i32)>>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let lot_count = state.registry.lot_ids().await.len();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Parkgrid</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        code {{ color: #7ee787; }}
    </style>
</head>
<body>
    <h1>Parkgrid</h1>
    <p class="subtitle">Parking lot reservation engine</p>
    <p>Status: <span class="status">RUNNING</span> &mdash; {lot_count} lot(s) registered</p>
    <ul>
        <li><code>GET</code> <a href="/api/lots">/api/lots</a></li>
        <li><code>GET</code> /api/lots/nearest?latitude=..&amp;longitude=..</li>
        <li><code>GET</code> /api/lots/&#123;id&#125;/nodes</li>
        <li><code>GET</code> /api/lots/&#123;id&#125;/edges</li>
        <li><code>GET</code> /api/lots/&#123;id&#125;/route?start=..&amp;end=..</li>
        <li><code>GET</code> /api/lots/&#123;id&#125;/route-to-exit?from=..</li>
        <li><code>GET</code> /api/lots/&#123;id&#125;/find-spot?entrance=..</li>
        <li><code>GET</code> /api/lots/&#123;id&#125;/alternative-routes?start=..&amp;end=..</li>
        <li><code>POST</code> /api/lots/&#123;id&#125;/validate-path</li>
        <li><code>POST</code> /api/lots/&#123;id&#125;/nodes/&#123;node_id&#125;/status?status=..&amp;ttl_seconds=..</li>
        <li><code>WS</code> /ws/lots/&#123;id&#125;</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Lot discovery
// ---------------------------------------------------------------------------

/// `GET /api/lots` -- availability summaries for every lot.
pub async fn list_lots(State(state): State<Arc<AppState>>) -> Json<Vec<LotSummary>> {
    Json(state.registry.summaries().await)
}

/// `GET /api/lots/nearest` -- the lot closest to the caller's position.
pub async fn nearest_lot(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearestQuery>,
) -> Result<Json<LotSummary>, ApiError> {
    if !query.latitude.is_finite() || !query.longitude.is_finite() {
        return Err(ApiError::BadRequest(String::from(
            "latitude and longitude must be finite numbers",
        )));
    }
    let summary = state
        .registry
        .nearest_summary(query.latitude, query.longitude)
        .await?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// Lot structure
// ---------------------------------------------------------------------------

/// `GET /api/lots/:id/nodes` -- all nodes plus the grid dimensions.
pub async fn list_nodes(
    State(state): State<Arc<AppState>>,
    Path(lot_id): Path<LotId>,
) -> Result<Json<NodesResponse>, ApiError> {
    let response = state
        .registry
        .with_graph(lot_id, |g| {
            let (height, width) = g.dimensions();
            Ok(NodesResponse {
                width,
                height,
                nodes: g.nodes().cloned().collect(),
            })
        })
        .await?;
    Ok(Json(response))
}

/// `GET /api/lots/:id/edges` -- all edges of the lot.
pub async fn list_edges(
    State(state): State<Arc<AppState>>,
    Path(lot_id): Path<LotId>,
) -> Result<Json<Vec<Edge>>, ApiError> {
    let edges = state
        .registry
        .with_graph(lot_id, |g| Ok(g.edges().to_vec()))
        .await?;
    Ok(Json(edges))
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// `GET /api/lots/:id/route` -- shortest route between two nodes.
pub async fn get_route(
    State(state): State<Arc<AppState>>,
    Path(lot_id): Path<LotId>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    let path = state
        .registry
        .with_graph(lot_id, |g| router::route(g, query.start, query.end))
        .await?;
    Ok(Json(RouteResponse { path }))
}

/// `GET /api/lots/:id/route-to-exit` -- route to the nearest exit.
pub async fn get_route_to_exit(
    State(state): State<Arc<AppState>>,
    Path(lot_id): Path<LotId>,
    Query(query): Query<ExitRouteQuery>,
) -> Result<Json<ExitRouteResponse>, ApiError> {
    let (exit_id, path) = state
        .registry
        .with_graph(lot_id, |g| router::route_to_exit(g, query.from))
        .await?;
    Ok(Json(ExitRouteResponse { exit_id, path }))
}

/// `GET /api/lots/:id/find-spot` -- recommend the closest available spot.
pub async fn find_spot(
    State(state): State<Arc<AppState>>,
    Path(lot_id): Path<LotId>,
    Query(query): Query<FindSpotQuery>,
) -> Result<Json<SpotRecommendation>, ApiError> {
    let recommendation = state
        .registry
        .with_graph(lot_id, |g| {
            router::nearest_available_spot(g, query.entrance, query.orientation)
        })
        .await?;
    Ok(Json(recommendation))
}

/// `GET /api/lots/:id/alternative-routes` -- ranked route variants.
pub async fn get_alternative_routes(
    State(state): State<Arc<AppState>>,
    Path(lot_id): Path<LotId>,
    Query(query): Query<AlternativesQuery>,
) -> Result<Json<AlternativesResponse>, ApiError> {
    let count = query.count.unwrap_or(3);
    let routes = state
        .registry
        .with_graph(lot_id, |g| {
            router::alternative_routes(g, query.start, query.end, count)
        })
        .await?;
    Ok(Json(AlternativesResponse { routes }))
}

/// `POST /api/lots/:id/validate-path` -- re-check a previously issued path.
pub async fn validate_path(
    State(state): State<Arc<AppState>>,
    Path(lot_id): Path<LotId>,
    Json(body): Json<ValidatePathRequest>,
) -> Result<Json<PathValidation>, ApiError> {
    let validation = state
        .registry
        .with_graph(lot_id, |g| Ok(router::validate_path(g, &body.node_ids)))
        .await?;
    Ok(Json(validation))
}

// ---------------------------------------------------------------------------
// Spot status
// ---------------------------------------------------------------------------

/// `POST /api/lots/:id/nodes/:node_id/status` -- spot status change.
///
/// `ttl_seconds` is required (and must be positive) for `RESERVED`;
/// `AVAILABLE` with no TTL is the unconditional free.
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Path((lot_id, node_id)): Path<(LotId, NodeId)>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Node>, ApiError> {
    let ttl = Duration::from_secs(query.ttl_seconds.unwrap_or(0));
    let node = state
        .registry
        .set_status(lot_id, node_id, query.status, ttl)
        .await?;
    info!(%lot_id, %node_id, status = ?query.status, "spot status changed");
    Ok(Json(node))
}
