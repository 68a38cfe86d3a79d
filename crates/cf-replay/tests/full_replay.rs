//! Full forward play-throughs over generated timelines.

use std::collections::HashSet;

use cf_core::{EventId, FlightId, LocationId, OrderId, ProductId};
use cf_replay::{ReplayEngine, TransitionKind};
use cf_timeline::{pair_events, EventKind, TimelineEvent};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
}

fn departure(id: u64, flight: u64, offset_s: i64, leg_s: i64, valid: bool) -> TimelineEvent {
    TimelineEvent {
        event_id: EventId(id),
        kind: EventKind::Departure,
        time: base() + Duration::seconds(offset_s),
        flight_id: FlightId(flight),
        flight_code: format!("CF{flight}"),
        product_id: ProductId(1),
        order_id: OrderId(1),
        origin: valid.then_some(LocationId(1)),
        destination: Some(LocationId(2)),
        volume: 10,
        // Encode the leg length as a fractional-day transport duration so no
        // arrival event is needed.
        transport_duration_days: Some(leg_s as f64 / 86_400.0),
    }
}

proptest! {
    /// Over a full forward play, DEPARTED fires once per valid departure and
    /// ARRIVED once per effective arrival, regardless of step size.
    #[test]
    fn one_shot_counts_match_valid_departures(
        specs in prop::collection::vec((0i64..5_000, 1i64..5_000, any::<bool>()), 1..25),
        step_s in 50i64..2_000,
    ) {
        let events: Vec<TimelineEvent> = specs
            .iter()
            .enumerate()
            .map(|(i, &(offset, leg, valid))| {
                departure(i as u64, i as u64 + 100, offset, leg, valid)
            })
            .collect();
        let valid_count = specs.iter().filter(|&&(_, _, v)| v).count();

        let locations: HashSet<LocationId> =
            [LocationId(1), LocationId(2)].into_iter().collect();
        let mut engine = ReplayEngine::new(pair_events(&events), &locations);
        prop_assert_eq!(engine.pair_count(), valid_count);

        let mut departed = 0usize;
        let mut arrived = 0usize;
        let mut now = base();
        let end = base() + Duration::seconds(12_000);
        while now <= end {
            let frame = engine.tick(now);
            departed += frame
                .transitions
                .iter()
                .filter(|t| t.kind == TransitionKind::Departed)
                .count();
            arrived += frame
                .transitions
                .iter()
                .filter(|t| t.kind == TransitionKind::Arrived)
                .count();
            now += Duration::seconds(step_s);
        }

        prop_assert_eq!(departed, valid_count);
        prop_assert_eq!(arrived, valid_count);

        let final_frame = engine.tick(end);
        prop_assert_eq!(final_frame.stats.completed, valid_count);
        prop_assert!(final_frame.active.is_empty());
    }

    /// The stats partition is total at every instant.
    #[test]
    fn stats_partition_the_pair_list(
        specs in prop::collection::vec((0i64..5_000, 1i64..5_000), 1..25),
        probe_s in 0i64..12_000,
    ) {
        let events: Vec<TimelineEvent> = specs
            .iter()
            .enumerate()
            .map(|(i, &(offset, leg))| departure(i as u64, i as u64 + 100, offset, leg, true))
            .collect();

        let locations: HashSet<LocationId> =
            [LocationId(1), LocationId(2)].into_iter().collect();
        let mut engine = ReplayEngine::new(pair_events(&events), &locations);

        let frame = engine.tick(base() + Duration::seconds(probe_s));
        let total = frame.stats.pending + frame.stats.in_flight + frame.stats.completed;
        prop_assert_eq!(total, specs.len());
        prop_assert_eq!(frame.active.len(), frame.stats.in_flight);
    }
}
