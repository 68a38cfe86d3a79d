use core::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value as assigned by the backend.
            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifier of a single timeline event. Never reused within a timeline.
    EventId,
    "EventId"
);

entity_id!(
    /// Identifier of one dated flight occurrence. Keys the departure/arrival
    /// pairing and all one-shot notification bookkeeping.
    FlightId,
    "FlightId"
);

entity_id!(
    /// Identifier of an airport / warehouse location.
    LocationId,
    "LocationId"
);

entity_id!(
    /// Identifier of a shipped product.
    ProductId,
    "ProductId"
);

entity_id!(
    /// Identifier of a customer order.
    OrderId,
    "OrderId"
);
