//! Materialization of dated flight instances from recurring definitions.

use std::collections::HashSet;

use cf_core::{days, scale, FlightId, LocationId};
use chrono::{DateTime, Datelike, Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::schema::{AirportRecord, FlightDefinition, FlightInstance};

/// Materialize concrete dated flight occurrences from recurring definitions.
///
/// Emits one instance per operating weekday whose scheduled departure falls
/// inside `[start, start + horizon_hours)`. Definitions referencing airports
/// not present in `airports` are skipped with a warning; they are reference
/// data gaps, not reasons to abort the horizon.
pub fn generate_instances(
    defs: &[FlightDefinition],
    start: DateTime<Utc>,
    horizon_hours: f64,
    airports: &[AirportRecord],
) -> Vec<FlightInstance> {
    let known: HashSet<LocationId> = airports.iter().map(|a| a.id).collect();
    let end = start + scale(Duration::hours(1), horizon_hours);

    let mut instances = Vec::new();
    let mut date = start.date_naive();
    let last_date = end.date_naive();

    while date <= last_date {
        let weekday = date.weekday().num_days_from_monday() as u8;
        for def in defs {
            if !def.weekdays.contains(&weekday) {
                continue;
            }
            if !known.contains(&def.origin) || !known.contains(&def.destination) {
                warn!(
                    definition_id = def.definition_id,
                    flight_code = %def.flight_code,
                    "skipping definition with unknown airport reference"
                );
                continue;
            }
            let departure = date.and_time(def.departure_time).and_utc();
            if departure < start || departure >= end {
                continue;
            }
            instances.push(FlightInstance {
                flight_id: FlightId(Uuid::new_v4().as_u128() as u64),
                definition_id: def.definition_id,
                flight_code: def.flight_code.clone(),
                origin: def.origin,
                destination: def.destination,
                departure,
                arrival: departure + days(def.transport_duration_days),
                volume: def.volume,
            });
        }
        let Some(next) = date.succ_opt() else { break };
        date = next;
    }

    instances.sort_by(|a, b| {
        a.departure
            .cmp(&b.departure)
            .then_with(|| a.flight_code.cmp(&b.flight_code))
    });
    instances
}
