//! Core entity structs for the lot graph and the client-facing API.
//!
//! These types are the wire format: lot layouts deserialize into them at
//! seed time, REST endpoints serialize them out, and [`StatusChange`] is
//! the payload pushed over the live status stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EdgeStatus, NodeKind, Orientation, SpotStatus};
use crate::ids::{LotId, NodeId};

// ---------------------------------------------------------------------------
// Graph entities
// ---------------------------------------------------------------------------

/// A discrete cell in a lot's grid graph.
///
/// `label`, `orientation`, `status`, and `reservation_expires_at` are
/// populated exactly for [`NodeKind::Spot`] nodes; for roads, entrances,
/// and exits they are `None` and omitted from the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Node {
    /// Identifier, unique within the lot.
    pub id: NodeId,
    /// The role this node plays in the graph.
    pub kind: NodeKind,
    /// Grid column. Coordinates are unique per lot.
    pub x: i32,
    /// Grid row.
    pub y: i32,
    /// Display label of a spot (e.g. `"A-12"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Cardinal direction a spot faces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    /// Reservation state of a spot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SpotStatus>,
    /// When a `RESERVED` hold lapses. `None` unless status is `RESERVED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_expires_at: Option<DateTime<Utc>>,
}

impl Node {
    /// Grid coordinates of this node as an `(x, y)` pair.
    pub const fn coords(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// A directed, optionally bidirectional connection between two nodes.
///
/// Identity is the ordered `(from, to)` pair. Only `status` mutates after
/// provisioning (operator road closures).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Edge {
    /// Origin node.
    pub from: NodeId,
    /// Destination node.
    pub to: NodeId,
    /// Whether the edge may also be traversed `to -> from`.
    #[serde(default = "default_bidirectional")]
    pub bidirectional: bool,
    /// Whether the edge is currently traversable.
    #[serde(default = "default_edge_status")]
    pub status: EdgeStatus,
}

const fn default_bidirectional() -> bool {
    true
}

const fn default_edge_status() -> EdgeStatus {
    EdgeStatus::Open
}

/// Descriptive metadata for one parking lot.
///
/// Geographic coordinates drive the nearest-lot query; the rest is
/// display data for lot summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LotMeta {
    /// Lot identifier.
    pub id: LotId,
    /// Human-readable lot name.
    pub name: String,
    /// Free-form address or district string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Latitude of the lot entrance, in degrees.
    pub latitude: f64,
    /// Longitude of the lot entrance, in degrees.
    pub longitude: f64,
}

// ---------------------------------------------------------------------------
// Live status stream
// ---------------------------------------------------------------------------

/// A committed spot status mutation, pushed to every subscriber of the lot.
///
/// Events are delivered in commit order. The stream carries no history:
/// a subscriber joining after an event never receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatusChange {
    /// The lot the mutation happened in.
    pub lot_id: LotId,
    /// The spot that changed.
    pub node_id: NodeId,
    /// The new status.
    pub status: SpotStatus,
    /// The new expiry deadline, if the spot is now `RESERVED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_expires_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Query responses
// ---------------------------------------------------------------------------

/// Aggregate availability figures for one lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LotSummary {
    /// Lot identifier.
    pub lot_id: LotId,
    /// Human-readable lot name.
    pub name: String,
    /// Free-form address or district string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Latitude of the lot entrance, in degrees.
    pub latitude: f64,
    /// Longitude of the lot entrance, in degrees.
    pub longitude: f64,
    /// Total number of spot nodes in the lot.
    pub total_spots: u32,
    /// Spots currently `AVAILABLE`.
    pub available: u32,
    /// Spots currently `RESERVED`.
    pub reserved: u32,
    /// Spots currently `OCCUPIED`.
    pub occupied: u32,
    /// Occupied-or-reserved share of all spots, 0.0 to 100.0.
    pub occupancy_percent: f64,
}

/// A recommended spot together with the route leading to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpotRecommendation {
    /// The recommended spot.
    pub node_id: NodeId,
    /// Display label of the spot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Orientation of the spot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    /// Coordinate path from the entrance to the spot, endpoints included.
    pub path: Vec<(i32, i32)>,
}

/// The result of re-checking a previously issued path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PathValidation {
    /// Whether the path is still traversable end to end.
    pub valid: bool,
    /// Human-readable explanation, useful when `valid` is `false`.
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn road_node_omits_spot_fields() {
        let node = Node {
            id: NodeId::new(1),
            kind: NodeKind::Road,
            x: 3,
            y: 4,
            label: None,
            orientation: None,
            status: None,
            reservation_expires_at: None,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json.get("kind").and_then(|v| v.as_str()), Some("ROAD"));
        assert!(json.get("status").is_none());
        assert!(json.get("label").is_none());
    }

    #[test]
    fn edge_defaults_apply_on_deserialize() {
        let edge: Edge = serde_json::from_str(r#"{"from": 1, "to": 2}"#).unwrap();
        assert!(edge.bidirectional);
        assert_eq!(edge.status, EdgeStatus::Open);
    }

    #[test]
    fn status_change_round_trips() {
        let change = StatusChange {
            lot_id: LotId::new(1),
            node_id: NodeId::new(9),
            status: SpotStatus::Reserved,
            reservation_expires_at: Some(Utc::now()),
        };
        let json = serde_json::to_string(&change).unwrap();
        let back: StatusChange = serde_json::from_str(&json).unwrap();
        assert_eq!(back.node_id, NodeId::new(9));
        assert_eq!(back.status, SpotStatus::Reserved);
    }
}
