//! Departure/arrival pairing index over a flat event timeline.

use std::collections::HashMap;

use cf_core::{days, FlightId, LocationId};
use chrono::{DateTime, Utc};

use crate::schema::{EventKind, TimelineEvent};

/// Assumed leg duration when neither an arrival event nor an explicit
/// transport duration is available.
pub const DEFAULT_TRANSPORT_DAYS: f64 = 7.0;

/// One flight's span on the timeline: its departure event and, when the
/// backend produced one, the matching arrival event.
///
/// Pairs are derived, never persisted; they are rebuilt wholesale whenever
/// the source timeline changes.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPair {
    pub departure: TimelineEvent,
    pub arrival: Option<TimelineEvent>,
}

impl FlightPair {
    pub fn flight_id(&self) -> FlightId {
        self.departure.flight_id
    }

    pub fn flight_code(&self) -> &str {
        &self.departure.flight_code
    }

    pub fn departure_time(&self) -> DateTime<Utc> {
        self.departure.time
    }

    /// Arrival time as reported by the backend, if an arrival event exists.
    pub fn arrival_time(&self) -> Option<DateTime<Utc>> {
        self.arrival.as_ref().map(|e| e.time)
    }

    /// Arrival time to replay against: the matched arrival event's time,
    /// otherwise departure plus the transport duration (default
    /// [`DEFAULT_TRANSPORT_DAYS`]).
    pub fn effective_arrival_time(&self) -> DateTime<Utc> {
        match self.arrival_time() {
            Some(t) => t,
            None => {
                let transport = self
                    .departure
                    .transport_duration_days
                    .unwrap_or(DEFAULT_TRANSPORT_DAYS);
                self.departure.time + days(transport)
            }
        }
    }

    pub fn origin(&self) -> Option<LocationId> {
        self.departure.origin
    }

    pub fn destination(&self) -> Option<LocationId> {
        self.departure.destination
    }

    pub fn volume(&self) -> u32 {
        self.departure.volume
    }
}

/// Index a flat event list into per-flight pairs.
///
/// O(n): builds a flight-id → arrival map (last wins on duplicates, which
/// well-formed timelines do not contain), then walks the DEPARTURE events in
/// input order attaching matches. A missing arrival is not an error; the
/// pair's arrival stays `None` and consumers fall back to the estimate.
pub fn pair_events(events: &[TimelineEvent]) -> Vec<FlightPair> {
    let mut arrivals: HashMap<FlightId, &TimelineEvent> = HashMap::new();
    for event in events {
        if event.kind == EventKind::Arrival {
            arrivals.insert(event.flight_id, event);
        }
    }

    events
        .iter()
        .filter(|e| e.kind == EventKind::Departure)
        .map(|departure| FlightPair {
            departure: departure.clone(),
            arrival: arrivals.get(&departure.flight_id).map(|e| (*e).clone()),
        })
        .collect()
}
