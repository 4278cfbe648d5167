//! Lot graph store and router for the ParkGrid reservation engine.
//!
//! This crate owns the authoritative in-memory model of a parking lot --
//! a directed graph of typed nodes and edges -- and the pure computations
//! over it: deterministic shortest-path routing, nearest-exit and
//! nearest-spot searches, path re-validation, and the spot state machine.
//!
//! Nothing here locks or spawns: the engine crate wraps each [`LotGraph`]
//! in a per-lot lock and layers TTL expiry and event broadcasting on top.
//!
//! [`LotGraph`]: graph::LotGraph

pub mod error;
pub mod geo;
pub mod graph;
pub mod router;
pub mod spot;

pub use error::{ErrorKind, LayoutError, LotError};
pub use graph::LotGraph;
