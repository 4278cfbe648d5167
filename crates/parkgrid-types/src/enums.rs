//! Enumeration types for the lot graph and the spot state machine.
//!
//! All variants serialize in `SCREAMING_SNAKE_CASE` to match the wire
//! format the mobile client renders from.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

/// The role a node plays inside a lot's grid graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// A point where cars enter the lot.
    Entrance,
    /// A point where cars leave the lot.
    Exit,
    /// A drivable road cell connecting other nodes.
    Road,
    /// A parking spot. Only spots carry a [`SpotStatus`].
    ///
    /// [`SpotStatus`]: crate::SpotStatus
    Spot,
}

impl NodeKind {
    /// Whether this kind of node carries reservation state.
    pub const fn is_spot(self) -> bool {
        matches!(self, Self::Spot)
    }
}

// ---------------------------------------------------------------------------
// Spot status
// ---------------------------------------------------------------------------

/// The reservation state of a parking spot.
///
/// Legal transitions are enforced by the reservation engine:
/// `Available -> Reserved -> Occupied -> Available`, with
/// `Reserved -> Available` on cancellation or TTL expiry. A forced free
/// (status `Available` with no TTL) is legal from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpotStatus {
    /// The spot is free and may be reserved.
    Available,
    /// The spot is held by a driver en route, with an expiry deadline.
    Reserved,
    /// A car is parked in the spot. No expiry applies.
    Occupied,
}

// ---------------------------------------------------------------------------
// Edge status
// ---------------------------------------------------------------------------

/// Whether an edge is currently traversable.
///
/// Operators close edges for maintenance or blockage; closed edges stay in
/// the graph but are excluded from routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeStatus {
    /// The edge may be traversed.
    Open,
    /// The edge is closed and must not appear in routes.
    Closed,
}

// ---------------------------------------------------------------------------
// Spot orientation
// ---------------------------------------------------------------------------

/// The cardinal direction a parking spot faces.
///
/// Used by the client to draw the spot and by the find-spot query as an
/// optional preference filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    /// Facing up the grid.
    North,
    /// Facing right on the grid.
    East,
    /// Facing down the grid.
    South,
    /// Facing left on the grid.
    West,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_wire_format() {
        let json = serde_json::to_string(&NodeKind::Spot).ok();
        assert_eq!(json.as_deref(), Some("\"SPOT\""));
    }

    #[test]
    fn spot_status_wire_format() {
        let json = serde_json::to_string(&SpotStatus::Available).ok();
        assert_eq!(json.as_deref(), Some("\"AVAILABLE\""));
        let back: Option<SpotStatus> = serde_json::from_str("\"RESERVED\"").ok();
        assert_eq!(back, Some(SpotStatus::Reserved));
    }

    #[test]
    fn only_spots_carry_status() {
        assert!(NodeKind::Spot.is_spot());
        assert!(!NodeKind::Road.is_spot());
        assert!(!NodeKind::Entrance.is_spot());
        assert!(!NodeKind::Exit.is_spot());
    }
}
