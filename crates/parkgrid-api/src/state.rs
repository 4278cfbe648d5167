//! Shared application state for the API server.
//!
//! [`AppState`] is a thin wrapper around the engine's
//! [`LotRegistry`]: every handler reads and mutates lot state through
//! the registry, and the `WebSocket` layer obtains its per-lot event
//! receivers from it. There is no server-side cache in front of the
//! registry; the registry's own locks are the consistency boundary.

use std::sync::Arc;

use parkgrid_engine::LotRegistry;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The live lot registry.
    pub registry: Arc<LotRegistry>,
}

impl AppState {
    /// Create application state over an existing registry.
    pub const fn new(registry: Arc<LotRegistry>) -> Self {
        Self { registry }
    }
}
