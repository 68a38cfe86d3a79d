//! Warehouse capacity ledger.
//!
//! Subscribes to replay transitions and accumulates signed volume deltas per
//! location: a departure frees volume at the origin, an arrival occupies
//! volume at the destination. The merged view is base capacity plus the
//! accumulated delta, clamped into `[0, max]`. A `(flight, direction)`
//! dedupe set keeps volume from being double-applied when the same
//! transition is replayed.

pub mod ledger;

pub use ledger::{CapacityLedger, LocationUsage};
