//! Deterministic shortest-path routing over a lot graph snapshot.
//!
//! Every function here is a pure read of a [`LotGraph`]: the engine hands
//! the router a snapshot under the lot's read lock, so a route observes
//! either the pre- or post-state of any concurrent mutation, never a torn
//! value.
//!
//! Grid steps are uniform, so hop count is the cost metric. The search is
//! Dijkstra over a `BTreeSet<(distance, NodeId)>` min-queue; ties settle
//! on the lower node id and a neighbor only improves on strictly shorter
//! distance, which makes repeated calls over unchanged state return
//! byte-identical coordinate sequences. Clients diff routes across
//! recomputation, so this determinism is contractual.
//!
//! Parking spots are terminals: a search never expands outward from a
//! spot unless it is the start node, so a spot can appear in a route only
//! as an endpoint.

use std::collections::{BTreeMap, BTreeSet};

use parkgrid_types::{NodeId, NodeKind, Orientation, PathValidation, SpotRecommendation, SpotStatus};

use crate::error::LotError;
use crate::graph::LotGraph;

/// Distance and predecessor maps produced by one search run.
struct Search {
    dist: BTreeMap<NodeId, u32>,
    prev: BTreeMap<NodeId, NodeId>,
}

impl Search {
    /// Rebuild the node path from `start` to `goal`, endpoints included.
    fn path_to(&self, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
        if start == goal {
            return Some(vec![start]);
        }
        self.prev.get(&goal)?;
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(&predecessor) = self.prev.get(&current) {
            path.push(predecessor);
            current = predecessor;
            if current == start {
                path.reverse();
                return Some(path);
            }
        }
        None
    }
}

/// Run a full uniform-cost search from `start`.
///
/// `banned` suppresses one directed hop, used to derive alternative
/// routes. Spots other than the start node are settled but never
/// expanded.
fn search(graph: &LotGraph, start: NodeId, banned: Option<(NodeId, NodeId)>) -> Search {
    let mut dist: BTreeMap<NodeId, u32> = BTreeMap::new();
    let mut prev: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut queue: BTreeSet<(u32, NodeId)> = BTreeSet::new();

    dist.insert(start, 0);
    queue.insert((0, start));

    while let Some(&(current_dist, current)) = queue.iter().next() {
        queue.remove(&(current_dist, current));

        // A spot is a path terminal, never an interior hop.
        if current != start
            && let Some(node) = graph.node(current)
            && node.kind.is_spot()
        {
            continue;
        }

        for &neighbor in graph.neighbors(current) {
            if banned == Some((current, neighbor)) {
                continue;
            }
            let Some(new_dist) = current_dist.checked_add(1) else {
                continue;
            };

            let is_shorter = dist
                .get(&neighbor)
                .is_none_or(|&existing| new_dist < existing);

            if is_shorter {
                if let Some(&old_dist) = dist.get(&neighbor) {
                    queue.remove(&(old_dist, neighbor));
                }
                dist.insert(neighbor, new_dist);
                prev.insert(neighbor, current);
                queue.insert((new_dist, neighbor));
            }
        }
    }

    Search { dist, prev }
}

/// Map a node path to its `(x, y)` coordinate sequence.
fn to_coords(graph: &LotGraph, path: &[NodeId]) -> Vec<(i32, i32)> {
    path.iter()
        .filter_map(|id| graph.node(*id).map(parkgrid_types::Node::coords))
        .collect()
}

fn require_node(graph: &LotGraph, id: NodeId) -> Result<(), LotError> {
    if graph.node(id).is_none() {
        return Err(LotError::NodeNotFound(id));
    }
    Ok(())
}

/// Shortest route between two nodes as a coordinate sequence, both
/// endpoints included.
///
/// # Errors
///
/// [`LotError::NodeNotFound`] if either endpoint is absent,
/// [`LotError::NoPath`] if the endpoints are disconnected.
pub fn route(graph: &LotGraph, start: NodeId, end: NodeId) -> Result<Vec<(i32, i32)>, LotError> {
    require_node(graph, start)?;
    require_node(graph, end)?;

    let found = search(graph, start, None);
    let path = found
        .path_to(start, end)
        .ok_or(LotError::NoPath { from: start, to: end })?;
    Ok(to_coords(graph, &path))
}

/// Shortest route from `current` to the nearest `EXIT` node by hop count.
///
/// Equidistant exits settle on the lowest exit node id so repeated calls
/// steer the driver to the same door. Returns the chosen exit and the
/// coordinate path.
///
/// # Errors
///
/// [`LotError::NodeNotFound`] if `current` is absent,
/// [`LotError::NoExitReachable`] if no exit is reachable.
pub fn route_to_exit(
    graph: &LotGraph,
    current: NodeId,
) -> Result<(NodeId, Vec<(i32, i32)>), LotError> {
    require_node(graph, current)?;

    let found = search(graph, current, None);
    let best = graph
        .nodes()
        .filter(|n| n.kind == NodeKind::Exit)
        .filter_map(|n| found.dist.get(&n.id).map(|d| (*d, n.id)))
        .min();

    let Some((_, exit)) = best else {
        return Err(LotError::NoExitReachable(current));
    };
    let path = found
        .path_to(current, exit)
        .ok_or(LotError::NoExitReachable(current))?;
    Ok((exit, to_coords(graph, &path)))
}

/// Recommend the available spot closest to an entrance.
///
/// When an orientation preference is given, only matching spots are
/// considered; if the preference filters every candidate out, the search
/// falls back to all available spots rather than failing.
///
/// # Errors
///
/// [`LotError::NodeNotFound`] if `entrance` is absent,
/// [`LotError::NoAvailableSpot`] if no available spot is reachable.
pub fn nearest_available_spot(
    graph: &LotGraph,
    entrance: NodeId,
    orientation: Option<Orientation>,
) -> Result<SpotRecommendation, LotError> {
    require_node(graph, entrance)?;

    let available: Vec<&parkgrid_types::Node> = graph
        .nodes()
        .filter(|n| n.status == Some(SpotStatus::Available))
        .collect();
    if available.is_empty() {
        return Err(LotError::NoAvailableSpot(graph.meta().id));
    }

    let preferred: Vec<&parkgrid_types::Node> = match orientation {
        Some(wanted) => {
            let matching: Vec<_> = available
                .iter()
                .copied()
                .filter(|n| n.orientation == Some(wanted))
                .collect();
            if matching.is_empty() { available } else { matching }
        }
        None => available,
    };

    let found = search(graph, entrance, None);
    let best = preferred
        .iter()
        .filter_map(|n| found.dist.get(&n.id).map(|d| (*d, n.id)))
        .min();

    let Some((_, spot_id)) = best else {
        return Err(LotError::NoAvailableSpot(graph.meta().id));
    };
    let path = found
        .path_to(entrance, spot_id)
        .ok_or(LotError::NoAvailableSpot(graph.meta().id))?;

    let spot = graph
        .node(spot_id)
        .ok_or(LotError::NodeNotFound(spot_id))?;
    Ok(SpotRecommendation {
        node_id: spot_id,
        label: spot.label.clone(),
        orientation: spot.orientation,
        path: to_coords(graph, &path),
    })
}

/// Up to `count` loop-free routes between two nodes, shortest first.
///
/// Alternatives derive from the best route by suppressing one of its hops
/// at a time and re-searching, then deduplicating. The result is ordered
/// by length, then by coordinate sequence, so it is deterministic.
/// `count = 0` yields an empty list (the endpoints must still be
/// connected).
///
/// # Errors
///
/// Same as [`route`]: both endpoints must exist and be connected.
pub fn alternative_routes(
    graph: &LotGraph,
    start: NodeId,
    end: NodeId,
    count: usize,
) -> Result<Vec<Vec<(i32, i32)>>, LotError> {
    require_node(graph, start)?;
    require_node(graph, end)?;

    let found = search(graph, start, None);
    let best = found
        .path_to(start, end)
        .ok_or(LotError::NoPath { from: start, to: end })?;

    let mut candidates: Vec<Vec<NodeId>> = vec![best.clone()];
    for pair in best.windows(2) {
        let (&u, &v) = match pair {
            [u, v] => (u, v),
            _ => continue,
        };
        let detour = search(graph, start, Some((u, v)));
        if let Some(path) = detour.path_to(start, end) {
            candidates.push(path);
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();

    Ok(candidates
        .into_iter()
        .take(count)
        .map(|p| to_coords(graph, &p))
        .collect())
}

/// Re-check a previously issued path against current graph state.
///
/// A path is valid when every node still exists, every consecutive pair
/// is joined by an open edge in the traversal direction, and the
/// destination (if a spot) is not occupied. Mirrors the re-route check
/// the client performs after a deviation.
pub fn validate_path(graph: &LotGraph, node_ids: &[NodeId]) -> PathValidation {
    if node_ids.is_empty() {
        return PathValidation {
            valid: false,
            reason: String::from("path is empty"),
        };
    }

    for id in node_ids {
        if graph.node(*id).is_none() {
            return PathValidation {
                valid: false,
                reason: format!("node {id} does not exist"),
            };
        }
    }

    for pair in node_ids.windows(2) {
        let (&u, &v) = match pair {
            [u, v] => (u, v),
            _ => continue,
        };
        if !graph.has_open_hop(u, v) {
            return PathValidation {
                valid: false,
                reason: format!("no open edge from {u} to {v}"),
            };
        }
    }

    if let Some(last) = node_ids.last()
        && let Some(dest) = graph.node(*last)
        && dest.status == Some(SpotStatus::Occupied)
    {
        return PathValidation {
            valid: false,
            reason: format!("destination spot {last} is occupied"),
        };
    }

    PathValidation {
        valid: true,
        reason: String::from("path is clear"),
    }
}
