//! Shared type definitions for the ParkGrid reservation engine.
//!
//! This crate is the single source of truth for the types used across the
//! ParkGrid workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the mobile client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer wrappers for lot and node identifiers
//! - [`enums`] -- Enumeration types (node kinds, spot status, edge status)
//! - [`structs`] -- Core entity structs (nodes, edges, lots, stream events)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EdgeStatus, NodeKind, Orientation, SpotStatus};
pub use ids::{LotId, NodeId};
pub use structs::{
    Edge, LotMeta, LotSummary, Node, PathValidation, SpotRecommendation, StatusChange,
};
