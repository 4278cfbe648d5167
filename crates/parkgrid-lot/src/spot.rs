//! The spot state machine.
//!
//! A parking spot cycles through three states:
//!
//! ```text
//! AVAILABLE --hold(ttl)--> RESERVED --arrive--> OCCUPIED
//!     ^                        |                    |
//!     +----expiry / cancel-----+                    |
//!     +----------------free---------------------- --+
//! ```
//!
//! A *forced free* (requesting `AVAILABLE` with no expiry window) is legal
//! from any state, including `AVAILABLE` itself; it is how exits and
//! cancellations release a spot unconditionally. Requesting `RESERVED` on
//! a spot that is not available is the lost-race case and reports
//! [`LotError::Conflict`] so the caller can retry against fresh state.

use parkgrid_types::{NodeId, SpotStatus};

use crate::error::LotError;

/// Validate a requested status change against the spot state machine.
///
/// `with_expiry` is whether the request carries an expiry deadline. Only
/// a `RESERVED` request may (and must) carry one.
///
/// # Errors
///
/// - [`LotError::Conflict`] for `RESERVED` on a non-available spot.
/// - [`LotError::ReserveWithoutTtl`] for `RESERVED` with no deadline.
/// - [`LotError::InvalidTransition`] for every other illegal edge.
pub const fn check_transition(
    node: NodeId,
    current: SpotStatus,
    requested: SpotStatus,
    with_expiry: bool,
) -> Result<(), LotError> {
    match requested {
        SpotStatus::Reserved => {
            if !with_expiry {
                return Err(LotError::ReserveWithoutTtl(node));
            }
            match current {
                SpotStatus::Available => Ok(()),
                // Exactly one of two racing holds wins; the loser observes
                // the post-transition status.
                SpotStatus::Reserved | SpotStatus::Occupied => Err(LotError::Conflict {
                    node,
                    status: current,
                }),
            }
        }
        SpotStatus::Occupied => match current {
            SpotStatus::Reserved => Ok(()),
            SpotStatus::Available | SpotStatus::Occupied => Err(LotError::InvalidTransition {
                node,
                from: current,
                to: requested,
            }),
        },
        SpotStatus::Available => {
            if with_expiry {
                // AVAILABLE never carries a deadline.
                return Err(LotError::InvalidTransition {
                    node,
                    from: current,
                    to: requested,
                });
            }
            Ok(())
        }
    }
}
