//! In-memory reservation engine.
//!
//! Owns the live state of every parking lot: a [`registry::LotRegistry`]
//! maps lot ids to their graphs, serializes all status mutations through
//! a per-lot write lock, fans out [`parkgrid_types::StatusChange`] events
//! to subscribers in commit order, and expires reservations whose hold
//! window lapses. [`seed`] loads the initial lot layouts from disk.

pub mod error;
pub mod registry;
pub mod seed;

pub use error::SeedError;
pub use registry::LotRegistry;
