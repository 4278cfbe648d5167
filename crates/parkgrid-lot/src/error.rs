//! Error types for the `parkgrid-lot` crate.
//!
//! Runtime failures carry one of four [`ErrorKind`] tags that surface
//! verbatim in API error bodies: `NotFound`, `InvalidTransition`,
//! `Conflict`, and `NoPath`. Layout problems detected while building a
//! graph are a separate [`LayoutError`] because they are configuration
//! errors that abort seeding, never runtime responses.

use parkgrid_types::{LotId, NodeId, SpotStatus};
use serde::Serialize;

/// The coarse failure category exposed to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// An unknown lot or node, or an empty candidate set.
    NotFound,
    /// A requested status change that violates the spot state machine.
    InvalidTransition,
    /// A lost race: the spot changed under the caller. Retry against
    /// fresh state.
    Conflict,
    /// The graph is disconnected for the requested endpoints.
    NoPath,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let tag = match self {
            Self::NotFound => "NotFound",
            Self::InvalidTransition => "InvalidTransition",
            Self::Conflict => "Conflict",
            Self::NoPath => "NoPath",
        };
        write!(f, "{tag}")
    }
}

/// Errors raised by lot-graph reads, routing, and status writes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LotError {
    /// The lot id is not registered.
    #[error("lot {0} not found")]
    LotNotFound(LotId),

    /// The node id does not exist in the lot.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// A status write targeted a node that is not a parking spot.
    #[error("node {0} is not a parking spot")]
    NotASpot(NodeId),

    /// The requested status change is not a legal state-machine edge.
    #[error("invalid transition for spot {node}: {from:?} -> {to:?}")]
    InvalidTransition {
        /// The targeted spot.
        node: NodeId,
        /// Status before the request.
        from: SpotStatus,
        /// Requested status.
        to: SpotStatus,
    },

    /// A reserve request carried no expiry window.
    #[error("reserving spot {0} requires a positive TTL")]
    ReserveWithoutTtl(NodeId),

    /// The spot was taken by a concurrent caller.
    #[error("spot {node} is {status:?}")]
    Conflict {
        /// The contested spot.
        node: NodeId,
        /// The status the loser observed.
        status: SpotStatus,
    },

    /// No route exists between the requested endpoints.
    #[error("no path from node {from} to node {to}")]
    NoPath {
        /// Requested start node.
        from: NodeId,
        /// Requested end node.
        to: NodeId,
    },

    /// No exit node is reachable from the given position.
    #[error("no exit reachable from node {0}")]
    NoExitReachable(NodeId),

    /// No available spot is reachable from the given entrance.
    #[error("no available spot reachable in lot {0}")]
    NoAvailableSpot(LotId),

    /// The nearest-lot query ran against an empty registry.
    #[error("no parking lots registered")]
    NoLots,
}

impl LotError {
    /// The [`ErrorKind`] tag this error surfaces under.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::LotNotFound(_)
            | Self::NodeNotFound(_)
            | Self::NotASpot(_)
            | Self::NoLots => ErrorKind::NotFound,
            Self::InvalidTransition { .. } | Self::ReserveWithoutTtl(_) => {
                ErrorKind::InvalidTransition
            }
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NoPath { .. } | Self::NoExitReachable(_) | Self::NoAvailableSpot(_) => {
                ErrorKind::NoPath
            }
        }
    }
}

/// Errors detected while assembling a [`LotGraph`] from layout data.
///
/// These indicate a broken lot layout, not a bad request; seeding aborts
/// on the first one.
///
/// [`LotGraph`]: crate::graph::LotGraph
#[derive(Debug, Clone, thiserror::Error)]
pub enum LayoutError {
    /// Two nodes in the layout share an identifier.
    #[error("duplicate node id {0} in lot layout")]
    DuplicateNode(NodeId),

    /// Two nodes in the layout occupy the same grid cell.
    #[error("nodes {a} and {b} both occupy ({x}, {y})")]
    DuplicateCoordinate {
        /// First node at the cell.
        a: NodeId,
        /// Second node at the cell.
        b: NodeId,
        /// Grid column.
        x: i32,
        /// Grid row.
        y: i32,
    },

    /// An edge references a node that is not in the layout.
    #[error("edge {from} -> {to} references a missing node")]
    DanglingEdge {
        /// Edge origin.
        from: NodeId,
        /// Edge destination.
        to: NodeId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_taxonomy() {
        assert_eq!(LotError::LotNotFound(LotId::new(1)).kind(), ErrorKind::NotFound);
        assert_eq!(LotError::NotASpot(NodeId::new(2)).kind(), ErrorKind::NotFound);
        assert_eq!(
            LotError::Conflict { node: NodeId::new(3), status: SpotStatus::Reserved }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            LotError::NoPath { from: NodeId::new(1), to: NodeId::new(2) }.kind(),
            ErrorKind::NoPath
        );
        assert_eq!(
            LotError::ReserveWithoutTtl(NodeId::new(4)).kind(),
            ErrorKind::InvalidTransition
        );
    }

    #[test]
    fn kind_tags_render_for_wire() {
        assert_eq!(ErrorKind::NotFound.to_string(), "NotFound");
        assert_eq!(ErrorKind::InvalidTransition.to_string(), "InvalidTransition");
        assert_eq!(ErrorKind::Conflict.to_string(), "Conflict");
        assert_eq!(ErrorKind::NoPath.to_string(), "NoPath");
    }
}
