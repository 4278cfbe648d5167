//! Type-safe identifier wrappers around plain integers.
//!
//! Lot layouts number their nodes with small integers, and those numbers
//! are the identifiers the mobile client sends back in route and status
//! requests. Wrapping them in newtypes prevents accidental mixing of lot
//! and node identifiers at compile time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around [`u32`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Wrap a raw integer identifier.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Return the inner integer value.
            pub const fn into_inner(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a parking lot.
    LotId
}

define_id! {
    /// Unique identifier for a node within a lot's graph.
    ///
    /// Node identifiers are unique per lot, not globally.
    NodeId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let lot = LotId::new(1);
        let node = NodeId::new(1);
        // Different types -- the compiler enforces no mixing.
        assert_eq!(lot.into_inner(), node.into_inner());
    }

    #[test]
    fn ids_order_numerically() {
        assert!(NodeId::new(2) < NodeId::new(10));
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&NodeId::new(7)).ok();
        assert_eq!(json.as_deref(), Some("7"));
    }
}
