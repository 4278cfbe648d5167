//! The lot registry: per-lot locked state, TTL expiry, and fan-out.
//!
//! Each lot lives in its own [`LotCell`] -- the graph behind a
//! [`tokio::sync::RwLock`] plus a [`broadcast::Sender`] for status-change
//! events. All reads and writes for one lot serialize through that lot's
//! lock; operations on different lots proceed fully in parallel.
//!
//! The event send happens while the write lock is still held, so
//! subscribers observe mutations in exactly the order they committed.
//! The channel keeps no history: a receiver obtained after a mutation
//! never sees it, and a lagging receiver skips ahead rather than
//! blocking the mutating caller.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parkgrid_lot::{LotError, LotGraph, geo};
use parkgrid_types::{LotId, LotSummary, Node, NodeId, SpotStatus, StatusChange};
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use crate::error::SeedError;

/// Capacity of each lot's status-change broadcast channel.
///
/// A subscriber that falls behind by more than this many events receives
/// a [`broadcast::error::RecvError::Lagged`] and resumes from the newest
/// event instead of blocking delivery to anyone else.
const BROADCAST_CAPACITY: usize = 256;

/// One lot's locked graph and its event channel.
#[derive(Debug)]
pub struct LotCell {
    /// The authoritative graph, serialized behind this lot's lock.
    graph: RwLock<LotGraph>,
    /// Fan-out channel for committed status mutations.
    events: broadcast::Sender<StatusChange>,
}

/// Shared registry of all lots the engine serves.
///
/// Wrapped in [`Arc`] and handed to the API layer and to expiry tasks.
#[derive(Debug, Default)]
pub struct LotRegistry {
    /// Lot cells indexed by lot id.
    lots: RwLock<BTreeMap<LotId, Arc<LotCell>>>,
}

impl LotRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lot. Called at seed time, before serving traffic.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::DuplicateLot`] if the lot id is taken.
    pub async fn insert_lot(&self, graph: LotGraph) -> Result<(), SeedError> {
        let id = graph.meta().id;
        let mut lots = self.lots.write().await;
        if lots.contains_key(&id) {
            return Err(SeedError::DuplicateLot(id));
        }
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        lots.insert(
            id,
            Arc::new(LotCell {
                graph: RwLock::new(graph),
                events,
            }),
        );
        Ok(())
    }

    /// All registered lot ids in ascending order.
    pub async fn lot_ids(&self) -> Vec<LotId> {
        self.lots.read().await.keys().copied().collect()
    }

    /// Look up a lot's cell.
    async fn cell(&self, lot_id: LotId) -> Result<Arc<LotCell>, LotError> {
        self.lots
            .read()
            .await
            .get(&lot_id)
            .cloned()
            .ok_or(LotError::LotNotFound(lot_id))
    }

    /// Run a read-only closure against a lot's graph under its read lock.
    ///
    /// Router queries go through here: the closure sees a consistent
    /// snapshot and cannot hold the lock across an await point.
    ///
    /// # Errors
    ///
    /// [`LotError::LotNotFound`] if the lot id is unknown; otherwise
    /// whatever the closure returns.
    pub async fn with_graph<R>(
        &self,
        lot_id: LotId,
        f: impl FnOnce(&LotGraph) -> Result<R, LotError>,
    ) -> Result<R, LotError> {
        let cell = self.cell(lot_id).await?;
        let graph = cell.graph.read().await;
        f(&graph)
    }

    /// Availability summaries for every lot, in lot-id order.
    pub async fn summaries(&self) -> Vec<LotSummary> {
        let cells: Vec<Arc<LotCell>> = self.lots.read().await.values().cloned().collect();
        let mut result = Vec::with_capacity(cells.len());
        for cell in cells {
            result.push(cell.graph.read().await.summary());
        }
        result
    }

    /// Summary of the lot geographically closest to a position.
    ///
    /// # Errors
    ///
    /// [`LotError::NoLots`] when the registry is empty.
    pub async fn nearest_summary(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LotSummary, LotError> {
        let summaries = self.summaries().await;
        let metas: Vec<parkgrid_types::LotMeta> = summaries
            .iter()
            .map(|s| parkgrid_types::LotMeta {
                id: s.lot_id,
                name: s.name.clone(),
                location: s.location.clone(),
                latitude: s.latitude,
                longitude: s.longitude,
            })
            .collect();
        let nearest = geo::nearest_lot(&metas, latitude, longitude)?;
        summaries
            .into_iter()
            .find(|s| s.lot_id == nearest.id)
            .ok_or(LotError::LotNotFound(nearest.id))
    }

    /// Subscribe to a lot's status-change stream.
    ///
    /// The receiver only yields events committed after this call.
    ///
    /// # Errors
    ///
    /// [`LotError::LotNotFound`] if the lot id is unknown.
    pub async fn subscribe(
        &self,
        lot_id: LotId,
    ) -> Result<broadcast::Receiver<StatusChange>, LotError> {
        Ok(self.cell(lot_id).await?.events.subscribe())
    }

    /// Apply a spot status change with the caller's TTL.
    ///
    /// A `RESERVED` request with a positive TTL computes the expiry
    /// deadline and arms a background timer; `ttl` is ignored for every
    /// other status (per contract, `AVAILABLE` with `ttl = 0` is the
    /// unconditional free). Exactly one [`StatusChange`] is broadcast per
    /// accepted mutation, in commit order.
    ///
    /// # Errors
    ///
    /// [`LotError::LotNotFound`] / [`LotError::NodeNotFound`] /
    /// [`LotError::NotASpot`] for unknown targets, and the state-machine
    /// errors ([`LotError::Conflict`], [`LotError::InvalidTransition`],
    /// [`LotError::ReserveWithoutTtl`]) for illegal transitions.
    pub async fn set_status(
        &self,
        lot_id: LotId,
        node_id: NodeId,
        status: SpotStatus,
        ttl: Duration,
    ) -> Result<Node, LotError> {
        let cell = self.cell(lot_id).await?;

        let expires_at = if status == SpotStatus::Reserved && !ttl.is_zero() {
            Some(deadline_after(ttl))
        } else {
            None
        };

        let node = {
            let mut graph = cell.graph.write().await;
            let node = graph.apply_status(node_id, status, expires_at)?;
            let receivers = cell
                .events
                .send(StatusChange {
                    lot_id,
                    node_id,
                    status,
                    reservation_expires_at: expires_at,
                })
                .unwrap_or(0);
            debug!(%lot_id, %node_id, ?status, receivers, "status committed");
            node
        };

        if let Some(armed) = expires_at {
            arm_expiry(Arc::clone(&cell), lot_id, node_id, armed, ttl);
        }

        Ok(node)
    }
}

/// Compute `now + ttl` without panicking on pathological TTL values.
fn deadline_after(ttl: Duration) -> DateTime<Utc> {
    let delta = chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX);
    Utc::now()
        .checked_add_signed(delta)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Spawn the expiry timer for a freshly armed reservation.
///
/// The task captures the deadline it was armed with. On firing it frees
/// the spot only if the node is still `RESERVED` with that exact
/// deadline -- a spot that was occupied, freed, or re-reserved in the
/// meantime carries a different value and the stale timer becomes a
/// no-op. Stale firings are swallowed, never surfaced.
fn arm_expiry(
    cell: Arc<LotCell>,
    lot_id: LotId,
    node_id: NodeId,
    armed: DateTime<Utc>,
    ttl: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;

        let mut graph = cell.graph.write().await;
        let still_armed = graph.node(node_id).is_some_and(|n| {
            n.status == Some(SpotStatus::Reserved) && n.reservation_expires_at == Some(armed)
        });
        if !still_armed {
            debug!(%lot_id, %node_id, "expiry timer stale, ignoring");
            return;
        }

        match graph.apply_status(node_id, SpotStatus::Available, None) {
            Ok(_) => {
                let _ = cell.events.send(StatusChange {
                    lot_id,
                    node_id,
                    status: SpotStatus::Available,
                    reservation_expires_at: None,
                });
                debug!(%lot_id, %node_id, "reservation expired, spot auto-freed");
            }
            Err(e) => {
                // Raced with another mutation between the check and the
                // write; the other mutation won.
                debug!(%lot_id, %node_id, error = %e, "expiry no-op");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkgrid_lot::router;
    use parkgrid_types::{Edge, EdgeStatus, LotMeta, NodeKind};

    fn lot_graph(lot_id: u32) -> LotGraph {
        let nodes = vec![
            Node {
                id: NodeId::new(1),
                kind: NodeKind::Entrance,
                x: 0,
                y: 0,
                label: None,
                orientation: None,
                status: None,
                reservation_expires_at: None,
            },
            Node {
                id: NodeId::new(2),
                kind: NodeKind::Road,
                x: 0,
                y: 1,
                label: None,
                orientation: None,
                status: None,
                reservation_expires_at: None,
            },
            Node {
                id: NodeId::new(3),
                kind: NodeKind::Spot,
                x: 0,
                y: 2,
                label: Some(String::from("A-1")),
                orientation: None,
                status: None,
                reservation_expires_at: None,
            },
        ];
        let edges = vec![
            Edge {
                from: NodeId::new(1),
                to: NodeId::new(2),
                bidirectional: true,
                status: EdgeStatus::Open,
            },
            Edge {
                from: NodeId::new(2),
                to: NodeId::new(3),
                bidirectional: true,
                status: EdgeStatus::Open,
            },
        ];
        LotGraph::new(
            LotMeta {
                id: LotId::new(lot_id),
                name: format!("Lot {lot_id}"),
                location: None,
                latitude: 0.0,
                longitude: 0.0,
            },
            nodes,
            edges,
        )
        .unwrap()
    }

    async fn registry_with_lot() -> Arc<LotRegistry> {
        let registry = Arc::new(LotRegistry::new());
        registry.insert_lot(lot_graph(1)).await.unwrap();
        registry
    }

    const LOT: LotId = LotId::new(1);
    const SPOT: NodeId = NodeId::new(3);

    #[tokio::test]
    async fn reserve_then_occupy_then_free() {
        let registry = registry_with_lot().await;

        let node = registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(node.status, Some(SpotStatus::Reserved));
        assert!(node.reservation_expires_at.is_some());

        let node = registry
            .set_status(LOT, SPOT, SpotStatus::Occupied, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(node.status, Some(SpotStatus::Occupied));
        assert!(node.reservation_expires_at.is_none());

        let node = registry
            .set_status(LOT, SPOT, SpotStatus::Available, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(node.status, Some(SpotStatus::Available));
    }

    #[tokio::test]
    async fn direct_occupy_is_invalid() {
        let registry = registry_with_lot().await;
        let err = registry
            .set_status(LOT, SPOT, SpotStatus::Occupied, Duration::ZERO)
            .await;
        assert!(matches!(err, Err(LotError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn reserve_without_ttl_is_rejected() {
        let registry = registry_with_lot().await;
        let err = registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::ZERO)
            .await;
        assert!(matches!(err, Err(LotError::ReserveWithoutTtl(_))));
    }

    #[tokio::test]
    async fn concurrent_reserves_yield_one_winner() {
        let registry = registry_with_lot().await;
        let ttl = Duration::from_secs(900);

        let (a, b) = tokio::join!(
            registry.set_status(LOT, SPOT, SpotStatus::Reserved, ttl),
            registry.set_status(LOT, SPOT, SpotStatus::Reserved, ttl),
        );

        let winners = usize::from(a.is_ok()).saturating_add(usize::from(b.is_ok()));
        assert_eq!(winners, 1, "exactly one reserve must win");
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(LotError::Conflict { .. })));
    }

    #[tokio::test]
    async fn unconfirmed_reservation_expires() {
        let registry = registry_with_lot().await;
        registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_millis(100))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;

        let status = registry
            .with_graph(LOT, |g| {
                Ok(g.node(SPOT).and_then(|n| n.status))
            })
            .await
            .unwrap();
        assert_eq!(status, Some(SpotStatus::Available));
    }

    #[tokio::test]
    async fn occupying_defuses_the_expiry_timer() {
        let registry = registry_with_lot().await;
        registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_millis(150))
            .await
            .unwrap();
        registry
            .set_status(LOT, SPOT, SpotStatus::Occupied, Duration::ZERO)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;

        let status = registry
            .with_graph(LOT, |g| {
                Ok(g.node(SPOT).and_then(|n| n.status))
            })
            .await
            .unwrap();
        assert_eq!(status, Some(SpotStatus::Occupied));
    }

    #[tokio::test]
    async fn re_reserving_after_free_survives_the_stale_timer() {
        let registry = registry_with_lot().await;
        registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_millis(150))
            .await
            .unwrap();
        registry
            .set_status(LOT, SPOT, SpotStatus::Available, Duration::ZERO)
            .await
            .unwrap();
        // A fresh, longer hold. The first timer fires during it and must
        // not free the new reservation.
        registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_secs(900))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;

        let status = registry
            .with_graph(LOT, |g| {
                Ok(g.node(SPOT).and_then(|n| n.status))
            })
            .await
            .unwrap();
        assert_eq!(status, Some(SpotStatus::Reserved));
    }

    #[tokio::test]
    async fn forced_free_succeeds_from_any_state() {
        let registry = registry_with_lot().await;

        registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_secs(900))
            .await
            .unwrap();
        registry
            .set_status(LOT, SPOT, SpotStatus::Available, Duration::ZERO)
            .await
            .unwrap();

        registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_secs(900))
            .await
            .unwrap();
        registry
            .set_status(LOT, SPOT, SpotStatus::Occupied, Duration::ZERO)
            .await
            .unwrap();
        registry
            .set_status(LOT, SPOT, SpotStatus::Available, Duration::ZERO)
            .await
            .unwrap();
        // Freeing an already-available spot is an idempotent no-op.
        registry
            .set_status(LOT, SPOT, SpotStatus::Available, Duration::ZERO)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn events_arrive_in_commit_order() {
        let registry = registry_with_lot().await;
        let mut rx = registry.subscribe(LOT).await.unwrap();

        registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_secs(900))
            .await
            .unwrap();
        registry
            .set_status(LOT, SPOT, SpotStatus::Occupied, Duration::ZERO)
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.status, SpotStatus::Reserved);
        assert!(first.reservation_expires_at.is_some());
        assert_eq!(second.status, SpotStatus::Occupied);
        assert!(second.reservation_expires_at.is_none());
    }

    #[tokio::test]
    async fn late_subscribers_see_no_history() {
        let registry = registry_with_lot().await;

        registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_secs(900))
            .await
            .unwrap();

        let mut rx = registry.subscribe(LOT).await.unwrap();
        registry
            .set_status(LOT, SPOT, SpotStatus::Occupied, Duration::ZERO)
            .await
            .unwrap();

        // Only the event committed after subscribing is delivered.
        let event = rx.recv().await.unwrap();
        assert_eq!(event.status, SpotStatus::Occupied);
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn expiry_emits_a_broadcast() {
        let registry = registry_with_lot().await;
        let mut rx = registry.subscribe(LOT).await.unwrap();

        registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_millis(100))
            .await
            .unwrap();

        let reserved = rx.recv().await.unwrap();
        assert_eq!(reserved.status, SpotStatus::Reserved);
        let freed = rx.recv().await.unwrap();
        assert_eq!(freed.status, SpotStatus::Available);
        assert!(freed.reservation_expires_at.is_none());
    }

    #[tokio::test]
    async fn mutations_without_subscribers_succeed() {
        let registry = registry_with_lot().await;
        assert!(
            registry
                .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_secs(900))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn lots_are_independent() {
        let registry = registry_with_lot().await;
        registry.insert_lot(lot_graph(2)).await.unwrap();

        registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_secs(900))
            .await
            .unwrap();

        let other = registry
            .with_graph(LotId::new(2), |g| {
                Ok(g.node(SPOT).and_then(|n| n.status))
            })
            .await
            .unwrap();
        assert_eq!(other, Some(SpotStatus::Available));
    }

    #[tokio::test]
    async fn duplicate_lot_ids_rejected() {
        let registry = registry_with_lot().await;
        let err = registry.insert_lot(lot_graph(1)).await;
        assert!(matches!(err, Err(SeedError::DuplicateLot(_))));
    }

    #[tokio::test]
    async fn set_status_needs_no_shared_ownership() {
        // The expiry task clones the lot cell, not the registry, so a
        // plainly owned registry can mutate spots.
        let registry = LotRegistry::new();
        registry.insert_lot(lot_graph(1)).await.unwrap();
        let node = registry
            .set_status(LOT, SPOT, SpotStatus::Reserved, Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(node.status, Some(SpotStatus::Reserved));
    }

    #[tokio::test]
    async fn unknown_lot_reported() {
        let registry = registry_with_lot().await;
        let err = registry.subscribe(LotId::new(9)).await;
        assert!(matches!(err, Err(LotError::LotNotFound(_))));
    }

    #[tokio::test]
    async fn routing_runs_under_the_read_lock() {
        let registry = registry_with_lot().await;
        let path = registry
            .with_graph(LOT, |g| router::route(g, NodeId::new(1), SPOT))
            .await
            .unwrap();
        assert_eq!(path, vec![(0, 0), (0, 1), (0, 2)]);
    }
}
