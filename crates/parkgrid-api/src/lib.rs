//! HTTP + `WebSocket` API server for the parkgrid reservation engine.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** for lot discovery (summaries, nearest lot), lot
//!   structure (nodes, edges), routing (shortest route, route to exit,
//!   spot recommendation, alternatives, path re-validation), and spot
//!   status changes
//! - **`WebSocket` endpoint** (`/ws/lots/:lot_id`) for real-time
//!   status-change streaming via [`tokio::sync::broadcast`]
//! - **Minimal HTML status page** (`GET /`) listing the API surface
//!
//! # Architecture
//!
//! All handlers operate on the engine's
//! [`LotRegistry`](parkgrid_engine::LotRegistry): reads run under the
//! target lot's read lock, status writes serialize through its write
//! lock, and `WebSocket` clients receive each lot's committed changes
//! in order via a broadcast channel with automatic lag handling.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
