//! Replay state machine over indexed flight pairs.

use std::collections::HashSet;

use cf_core::{fraction, FlightId, LocationId};
use cf_timeline::FlightPair;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::frame::{ActiveFlight, TickFrame, Transition, TransitionKind};

/// A pair admitted into the replay, with its locations resolved up front.
#[derive(Debug, Clone)]
struct AdmittedPair {
    pair: FlightPair,
    origin: LocationId,
    destination: LocationId,
}

/// Timeline replay engine.
///
/// Holds the admitted pair list and the per-flight "already notified" sets.
/// Every call to [`tick`](Self::tick) re-derives the full active set from
/// scratch, which keeps the engine trivially restartable and seekable. The
/// notified sets are cleared by [`reset`](Self::reset) only; a backward seek
/// does not retract notifications that already fired.
#[derive(Debug)]
pub struct ReplayEngine {
    pairs: Vec<AdmittedPair>,
    excluded: usize,
    departed: HashSet<FlightId>,
    arrived: HashSet<FlightId>,
}

impl ReplayEngine {
    /// Build an engine over indexed pairs.
    ///
    /// Pairs whose origin or destination is missing or not among
    /// `valid_locations` are excluded permanently (logged once, never
    /// retried) so the active set stays free of unrenderable entities.
    pub fn new(pairs: Vec<FlightPair>, valid_locations: &HashSet<LocationId>) -> Self {
        let mut admitted = Vec::with_capacity(pairs.len());
        let mut excluded = 0;
        for pair in pairs {
            match Self::admit(&pair, valid_locations) {
                Some((origin, destination)) => admitted.push(AdmittedPair {
                    pair,
                    origin,
                    destination,
                }),
                None => {
                    excluded += 1;
                    warn!(
                        flight_id = %pair.flight_id(),
                        flight_code = pair.flight_code(),
                        "excluding flight with missing or unknown location"
                    );
                }
            }
        }
        Self {
            pairs: admitted,
            excluded,
            departed: HashSet::new(),
            arrived: HashSet::new(),
        }
    }

    fn admit(
        pair: &FlightPair,
        valid_locations: &HashSet<LocationId>,
    ) -> Option<(LocationId, LocationId)> {
        let origin = pair.origin().filter(|l| valid_locations.contains(l))?;
        let destination = pair.destination().filter(|l| valid_locations.contains(l))?;
        Some((origin, destination))
    }

    /// Replace the timeline. Rebuilds the pair list and clears all one-shot
    /// notification tracking, as for a freshly constructed engine.
    pub fn load(&mut self, pairs: Vec<FlightPair>, valid_locations: &HashSet<LocationId>) {
        *self = Self::new(pairs, valid_locations);
    }

    /// Clear derived state: the notified sets. The pair list stays.
    pub fn reset(&mut self) {
        self.departed.clear();
        self.arrived.clear();
    }

    /// Number of pairs admitted into the replay.
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Number of pairs dropped for data-quality reasons.
    pub fn excluded_count(&self) -> usize {
        self.excluded
    }

    /// Earliest departure and latest effective arrival over the admitted
    /// pairs, or `None` for an empty replay.
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.pairs.iter().map(|p| p.pair.departure_time()).min()?;
        let last = self
            .pairs
            .iter()
            .map(|p| p.pair.effective_arrival_time())
            .max()?;
        Some((first, last))
    }

    /// Advance the replay to `now` and publish the derived frame.
    ///
    /// Evaluates every admitted pair against `now`:
    /// - not yet departed: counted as pending, no event;
    /// - in flight: active with interpolated progress; fires `Departed`
    ///   the first time this flight is observed past its departure;
    /// - past effective arrival: counted as completed; fires `Arrived`
    ///   the first time. A `now` that jumped past both boundaries fires
    ///   `Departed` and `Arrived` in the same frame so the capacity ledger
    ///   sees both sides of the movement.
    ///
    /// Re-ticking at an unchanged `now` returns an identical frame with no
    /// further transitions.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickFrame {
        let mut frame = TickFrame::default();

        for entry in &self.pairs {
            let departure = entry.pair.departure_time();
            if now < departure {
                frame.stats.pending += 1;
                continue;
            }

            let flight_id = entry.pair.flight_id();
            let arrival = entry.pair.effective_arrival_time();

            if self.departed.insert(flight_id) {
                frame.transitions.push(Transition {
                    kind: TransitionKind::Departed,
                    flight_id,
                    flight_code: entry.pair.flight_code().to_string(),
                    location: entry.origin,
                    volume: entry.pair.volume(),
                });
            }

            if now < arrival {
                frame.stats.in_flight += 1;
                frame.active.push(ActiveFlight {
                    flight_id,
                    flight_code: entry.pair.flight_code().to_string(),
                    product_id: entry.pair.departure.product_id,
                    order_id: entry.pair.departure.order_id,
                    origin: entry.origin,
                    destination: entry.destination,
                    departure,
                    arrival,
                    progress: fraction(now - departure, arrival - departure),
                });
            } else {
                frame.stats.completed += 1;
                if self.arrived.insert(flight_id) {
                    frame.transitions.push(Transition {
                        kind: TransitionKind::Arrived,
                        flight_id,
                        flight_code: entry.pair.flight_code().to_string(),
                        location: entry.destination,
                        volume: entry.pair.volume(),
                    });
                }
            }
        }

        frame
    }
}
