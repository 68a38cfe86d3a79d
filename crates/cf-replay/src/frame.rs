//! Per-tick output types.

use cf_core::{FlightId, LocationId, OrderId, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One-shot status change observed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    Departed,
    Arrived,
}

/// Notification fired the first time a flight is observed past a status
/// boundary. `Departed` carries the origin location, `Arrived` the
/// destination; `volume` is the quantity the capacity ledger moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    pub flight_id: FlightId,
    pub flight_code: String,
    pub location: LocationId,
    pub volume: u32,
}

/// A flight currently between departure and effective arrival.
///
/// Recomputed from the pair list and current time on every tick; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveFlight {
    pub flight_id: FlightId,
    pub flight_code: String,
    pub product_id: ProductId,
    pub order_id: OrderId,
    pub origin: LocationId,
    pub destination: LocationId,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    /// Interpolated position along the leg, clamped to [0, 1].
    pub progress: f64,
}

/// Counts over the whole pair list at one virtual time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayStats {
    pub completed: usize,
    pub in_flight: usize,
    pub pending: usize,
}

/// Published output of one tick. Consumers never observe a partially
/// updated active set; the frame is assembled in full before it is returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickFrame {
    pub active: Vec<ActiveFlight>,
    pub transitions: Vec<Transition>,
    pub stats: ReplayStats,
}

impl TickFrame {
    pub fn completed_count(&self) -> usize {
        self.stats.completed
    }
}
