//! The lot graph aggregate: nodes, edges, and adjacency indexes.
//!
//! A [`LotGraph`] owns every node and edge of one parking lot plus its
//! descriptive metadata. Construction validates the layout (unique ids,
//! unique coordinates, no dangling edges) and builds a directed adjacency
//! index: an edge contributes `from -> to` always, and `to -> from` only
//! when bidirectional. Closed edges stay in the edge list for clients to
//! render but are excluded from adjacency, so the router never sees them.
//!
//! Status writes go through [`LotGraph::apply_status`], which enforces the
//! spot state machine. Everything here is synchronous and lock-free; the
//! engine crate wraps each graph in a per-lot lock.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parkgrid_types::{Edge, EdgeStatus, LotMeta, LotSummary, Node, NodeId, SpotStatus};
use tracing::info;

use crate::error::{LayoutError, LotError};
use crate::spot;

/// The authoritative graph and spot state for one parking lot.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LotGraph {
    /// Descriptive metadata (name, geographic position).
    meta: LotMeta,
    /// All nodes indexed by identifier.
    nodes: BTreeMap<NodeId, Node>,
    /// All edges in layout order, closed ones included.
    edges: Vec<Edge>,
    /// Open-edge adjacency: node -> sorted list of reachable neighbors.
    outbound: BTreeMap<NodeId, Vec<NodeId>>,
}

impl LotGraph {
    /// Assemble a lot graph from layout data.
    ///
    /// Spot nodes missing a status default to `AVAILABLE`; non-spot nodes
    /// have any stray status fields cleared.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] for duplicate node ids, duplicate grid
    /// coordinates, or edges referencing missing nodes.
    pub fn new(meta: LotMeta, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, LayoutError> {
        let mut node_map: BTreeMap<NodeId, Node> = BTreeMap::new();
        let mut coords: BTreeMap<(i32, i32), NodeId> = BTreeMap::new();

        for mut node in nodes {
            if node.kind.is_spot() {
                if node.status.is_none() {
                    node.status = Some(SpotStatus::Available);
                }
            } else {
                node.status = None;
                node.reservation_expires_at = None;
            }

            if let Some(&other) = coords.get(&node.coords()) {
                return Err(LayoutError::DuplicateCoordinate {
                    a: other,
                    b: node.id,
                    x: node.x,
                    y: node.y,
                });
            }
            coords.insert(node.coords(), node.id);

            if node_map.insert(node.id, node.clone()).is_some() {
                return Err(LayoutError::DuplicateNode(node.id));
            }
        }

        let mut outbound: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for id in node_map.keys() {
            outbound.entry(*id).or_default();
        }

        for edge in &edges {
            if !node_map.contains_key(&edge.from) || !node_map.contains_key(&edge.to) {
                return Err(LayoutError::DanglingEdge {
                    from: edge.from,
                    to: edge.to,
                });
            }
            if edge.status == EdgeStatus::Closed {
                continue;
            }
            outbound.entry(edge.from).or_default().push(edge.to);
            if edge.bidirectional {
                outbound.entry(edge.to).or_default().push(edge.from);
            }
        }

        // Sorted, deduplicated neighbor lists keep traversal deterministic.
        for neighbors in outbound.values_mut() {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        info!(
            lot_id = %meta.id,
            nodes = node_map.len(),
            edges = edges.len(),
            "built lot graph"
        );

        Ok(Self {
            meta,
            nodes: node_map,
            edges,
            outbound,
        })
    }

    /// Descriptive metadata for this lot.
    pub const fn meta(&self) -> &LotMeta {
        &self.meta
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Iterate all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges in layout order, closed ones included.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The open-edge neighbors reachable from a node, in id order.
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.outbound.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Whether a single hop `from -> to` is legal over an open edge.
    pub fn has_open_hop(&self, from: NodeId, to: NodeId) -> bool {
        self.neighbors(from).contains(&to)
    }

    /// Grid extent as `(rows, cols)`, derived from node coordinates.
    pub fn dimensions(&self) -> (i64, i64) {
        let mut xs = self.nodes.values().map(|n| n.x);
        let mut ys = self.nodes.values().map(|n| n.y);
        let (Some(x0), Some(y0)) = (xs.next(), ys.next()) else {
            return (0, 0);
        };
        let (mut min_x, mut max_x) = (x0, x0);
        let (mut min_y, mut max_y) = (y0, y0);
        for n in self.nodes.values() {
            min_x = min_x.min(n.x);
            max_x = max_x.max(n.x);
            min_y = min_y.min(n.y);
            max_y = max_y.max(n.y);
        }
        let span = |max: i32, min: i32| {
            i64::from(max)
                .checked_sub(i64::from(min))
                .and_then(|d| d.checked_add(1))
                .unwrap_or(0)
        };
        (span(max_y, min_y), span(max_x, min_x))
    }

    /// Availability counters over all spot nodes and the lot summary row
    /// built from them.
    pub fn summary(&self) -> LotSummary {
        let mut total: u32 = 0;
        let mut available: u32 = 0;
        let mut reserved: u32 = 0;
        let mut occupied: u32 = 0;
        for node in self.nodes.values() {
            match node.status {
                Some(SpotStatus::Available) => {
                    total = total.saturating_add(1);
                    available = available.saturating_add(1);
                }
                Some(SpotStatus::Reserved) => {
                    total = total.saturating_add(1);
                    reserved = reserved.saturating_add(1);
                }
                Some(SpotStatus::Occupied) => {
                    total = total.saturating_add(1);
                    occupied = occupied.saturating_add(1);
                }
                None => {}
            }
        }
        let occupancy_percent = if total == 0 {
            0.0
        } else {
            f64::from(reserved.saturating_add(occupied)) / f64::from(total) * 100.0
        };
        LotSummary {
            lot_id: self.meta.id,
            name: self.meta.name.clone(),
            location: self.meta.location.clone(),
            latitude: self.meta.latitude,
            longitude: self.meta.longitude,
            total_spots: total,
            available,
            reserved,
            occupied,
            occupancy_percent,
        }
    }

    /// Apply a validated status change to a spot.
    ///
    /// `expires_at` must be `Some` exactly for `RESERVED` requests; the
    /// engine computes it from the caller's TTL. Returns the updated node.
    ///
    /// # Errors
    ///
    /// - [`LotError::NodeNotFound`] if the node does not exist.
    /// - [`LotError::NotASpot`] if the node is not a parking spot.
    /// - The state-machine errors from [`spot::check_transition`].
    pub fn apply_status(
        &mut self,
        node_id: NodeId,
        status: SpotStatus,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Node, LotError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(LotError::NodeNotFound(node_id))?;
        let Some(current) = node.status else {
            return Err(LotError::NotASpot(node_id));
        };

        spot::check_transition(node_id, current, status, expires_at.is_some())?;

        node.status = Some(status);
        node.reservation_expires_at = expires_at;
        Ok(node.clone())
    }
}
