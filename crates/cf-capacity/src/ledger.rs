//! Per-location delta accumulators over base capacities.

use std::collections::{HashMap, HashSet};

use cf_core::{FlightId, LocationId};
use cf_replay::{Transition, TransitionKind};
use cf_timeline::AirportRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone)]
struct LocationEntry {
    base_used: i64,
    max: i64,
    delta: i64,
}

/// Merged capacity view of one location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationUsage {
    pub location: LocationId,
    /// Base used capacity plus accumulated delta, clamped to `[0, max]`.
    pub used: i64,
    pub max: i64,
    pub delta: i64,
    /// `used / max`, in percent.
    pub percent: f64,
}

/// Capacity ledger over a fixed set of locations.
#[derive(Debug, Clone)]
pub struct CapacityLedger {
    locations: HashMap<LocationId, LocationEntry>,
    applied: HashSet<(FlightId, TransitionKind)>,
}

impl CapacityLedger {
    pub fn new(airports: &[AirportRecord]) -> Self {
        let locations = airports
            .iter()
            .map(|a| {
                (
                    a.id,
                    LocationEntry {
                        base_used: a.base_used_capacity,
                        max: a.max_capacity,
                        delta: 0,
                    },
                )
            })
            .collect();
        Self {
            locations,
            applied: HashSet::new(),
        }
    }

    /// Apply one transition to the ledger.
    ///
    /// `Departed` subtracts the volume at the transition's location (the
    /// origin), `Arrived` adds it (the destination). Returns `false` without
    /// touching any accumulator when this `(flight, direction)` was already
    /// applied or the location is unknown.
    pub fn apply(&mut self, transition: &Transition) -> bool {
        let key = (transition.flight_id, transition.kind);
        if self.applied.contains(&key) {
            return false;
        }
        let Some(entry) = self.locations.get_mut(&transition.location) else {
            warn!(
                flight_id = %transition.flight_id,
                location = %transition.location,
                "dropping capacity event for unknown location"
            );
            return false;
        };

        let signed = i64::from(transition.volume);
        entry.delta += match transition.kind {
            TransitionKind::Departed => -signed,
            TransitionKind::Arrived => signed,
        };
        self.applied.insert(key);
        true
    }

    /// Accumulated delta for a location (zero when unknown or untouched).
    pub fn delta(&self, location: LocationId) -> i64 {
        self.locations.get(&location).map_or(0, |e| e.delta)
    }

    /// Current used capacity: `clamp(base + delta, 0, max)`.
    pub fn current_used(&self, location: LocationId) -> Option<i64> {
        self.locations
            .get(&location)
            .map(|e| (e.base_used + e.delta).clamp(0, e.max))
    }

    /// Current usage in percent of the location's maximum.
    pub fn percent(&self, location: LocationId) -> Option<f64> {
        let entry = self.locations.get(&location)?;
        let used = (entry.base_used + entry.delta).clamp(0, entry.max);
        Some(used as f64 / entry.max as f64 * 100.0)
    }

    /// Merged view over all locations, ordered by location id.
    pub fn view(&self) -> Vec<LocationUsage> {
        let mut rows: Vec<LocationUsage> = self
            .locations
            .iter()
            .map(|(&location, entry)| {
                let used = (entry.base_used + entry.delta).clamp(0, entry.max);
                LocationUsage {
                    location,
                    used,
                    max: entry.max,
                    delta: entry.delta,
                    percent: used as f64 / entry.max as f64 * 100.0,
                }
            })
            .collect();
        rows.sort_by_key(|r| r.location);
        rows
    }

    /// Clear all deltas and the dedupe set. Base capacities stay.
    pub fn reset_deltas(&mut self) {
        for entry in self.locations.values_mut() {
            entry.delta = 0;
        }
        self.applied.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(id: u64, base_used: i64, max: i64) -> AirportRecord {
        AirportRecord {
            id: LocationId(id),
            name: format!("AP{id}"),
            base_used_capacity: base_used,
            max_capacity: max,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    fn transition(kind: TransitionKind, flight: u64, location: u64, volume: u32) -> Transition {
        Transition {
            kind,
            flight_id: FlightId(flight),
            flight_code: format!("CF{flight}"),
            location: LocationId(location),
            volume,
        }
    }

    fn ledger() -> CapacityLedger {
        CapacityLedger::new(&[airport(1, 100, 1000), airport(2, 200, 1000)])
    }

    #[test]
    fn departure_subtracts_at_origin_arrival_adds_at_destination() {
        let mut ledger = ledger();

        assert!(ledger.apply(&transition(TransitionKind::Departed, 10, 1, 50)));
        assert_eq!(ledger.delta(LocationId(1)), -50);
        assert_eq!(ledger.delta(LocationId(2)), 0);
        assert_eq!(ledger.current_used(LocationId(1)), Some(50));

        assert!(ledger.apply(&transition(TransitionKind::Arrived, 10, 2, 50)));
        assert_eq!(ledger.delta(LocationId(2)), 50);
        assert_eq!(ledger.current_used(LocationId(2)), Some(250));
    }

    #[test]
    fn same_flight_and_direction_applies_once() {
        let mut ledger = ledger();
        let dep = transition(TransitionKind::Departed, 10, 1, 50);

        assert!(ledger.apply(&dep));
        assert!(!ledger.apply(&dep));
        assert_eq!(ledger.delta(LocationId(1)), -50);
    }

    #[test]
    fn both_directions_of_one_flight_apply() {
        let mut ledger = ledger();

        assert!(ledger.apply(&transition(TransitionKind::Departed, 10, 1, 50)));
        assert!(ledger.apply(&transition(TransitionKind::Arrived, 10, 2, 50)));
    }

    #[test]
    fn unknown_location_is_dropped() {
        let mut ledger = ledger();
        assert!(!ledger.apply(&transition(TransitionKind::Arrived, 10, 99, 50)));
        // The dedupe key is not consumed by a dropped event.
        assert_eq!(ledger.delta(LocationId(99)), 0);
    }

    #[test]
    fn merged_view_clamps_to_bounds() {
        let mut ledger = CapacityLedger::new(&[airport(1, 100, 1000)]);

        // Push the delta past both bounds.
        assert!(ledger.apply(&transition(TransitionKind::Departed, 10, 1, 500)));
        assert_eq!(ledger.current_used(LocationId(1)), Some(0));

        ledger.reset_deltas();
        assert!(ledger.apply(&transition(TransitionKind::Arrived, 11, 1, 2000)));
        assert_eq!(ledger.current_used(LocationId(1)), Some(1000));
        assert_eq!(ledger.percent(LocationId(1)), Some(100.0));
    }

    #[test]
    fn reset_keeps_base_capacities() {
        let mut ledger = ledger();
        ledger.apply(&transition(TransitionKind::Departed, 10, 1, 50));
        ledger.reset_deltas();

        assert_eq!(ledger.delta(LocationId(1)), 0);
        assert_eq!(ledger.current_used(LocationId(1)), Some(100));
        // The dedupe set is cleared too; the same transition applies again.
        assert!(ledger.apply(&transition(TransitionKind::Departed, 10, 1, 50)));
    }

    #[test]
    fn view_is_ordered_by_location() {
        let ledger = CapacityLedger::new(&[airport(2, 0, 10), airport(1, 0, 10)]);
        let rows = ledger.view();
        assert_eq!(rows[0].location, LocationId(1));
        assert_eq!(rows[1].location, LocationId(2));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Replaying an arbitrary transition sequence (duplicates included)
        /// leaves each location's delta at exactly its net
        /// (arrivals − departures) volume over the distinct transitions.
        #[test]
        fn deltas_equal_net_volume_under_replay(
            moves in prop::collection::vec(
                (0u64..20, prop::bool::ANY, 0u64..4, 1u32..100),
                1..60,
            ),
            dup_factor in 1usize..4,
        ) {
            let airports: Vec<AirportRecord> = (0..4)
                .map(|id| AirportRecord {
                    id: LocationId(id),
                    name: format!("AP{id}"),
                    base_used_capacity: 0,
                    max_capacity: 1_000_000,
                    latitude: 0.0,
                    longitude: 0.0,
                })
                .collect();
            let mut ledger = CapacityLedger::new(&airports);

            let transitions: Vec<Transition> = moves
                .iter()
                .map(|&(flight, arrived, location, volume)| Transition {
                    kind: if arrived {
                        TransitionKind::Arrived
                    } else {
                        TransitionKind::Departed
                    },
                    flight_id: FlightId(flight),
                    flight_code: format!("CF{flight}"),
                    location: LocationId(location),
                    volume,
                })
                .collect();

            for _ in 0..dup_factor {
                for t in &transitions {
                    ledger.apply(t);
                }
            }

            // Expected: first occurrence per (flight, direction) wins.
            let mut expected: std::collections::HashMap<LocationId, i64> = Default::default();
            let mut seen: HashSet<(FlightId, TransitionKind)> = HashSet::new();
            for t in &transitions {
                if seen.insert((t.flight_id, t.kind)) {
                    let signed = match t.kind {
                        TransitionKind::Arrived => i64::from(t.volume),
                        TransitionKind::Departed => -i64::from(t.volume),
                    };
                    *expected.entry(t.location).or_default() += signed;
                }
            }

            for id in 0..4 {
                let location = LocationId(id);
                prop_assert_eq!(
                    ledger.delta(location),
                    expected.get(&location).copied().unwrap_or(0)
                );
            }
        }
    }
}
