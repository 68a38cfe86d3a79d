//! Plan-file and backend payload schema definitions.

use cf_core::{EventId, FlightId, LocationId, OrderId, ProductId};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A complete plan handed over by the planning backend: airport reference
/// data, the dated event timeline produced by the last optimization run, and
/// recurring flight definitions for instance materialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanFile {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub airports: Vec<AirportRecord>,
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
    #[serde(default)]
    pub definitions: Vec<FlightDefinition>,
}

/// Departure or arrival, as tagged by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Departure,
    Arrival,
}

/// One dated timeline event. Immutable; supplied wholesale by the
/// optimization result. Event ids are never reused within a timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEvent {
    pub event_id: EventId,
    pub kind: EventKind,
    pub time: DateTime<Utc>,
    pub flight_id: FlightId,
    pub flight_code: String,
    pub product_id: ProductId,
    pub order_id: OrderId,
    /// Origin location. May be absent in degraded backend data; such events
    /// are excluded from replay as a data-quality measure.
    #[serde(default)]
    pub origin: Option<LocationId>,
    /// Destination location. Same data-quality caveat as `origin`.
    #[serde(default)]
    pub destination: Option<LocationId>,
    /// Shipped quantity moved between the origin and destination warehouses.
    pub volume: u32,
    /// Leg duration in fractional days, used to estimate a missing arrival.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_duration_days: Option<f64>,
}

/// Airport / warehouse reference record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirportRecord {
    pub id: LocationId,
    pub name: String,
    /// Warehouse volume already in use before the replay starts.
    pub base_used_capacity: i64,
    pub max_capacity: i64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Recurring flight template. Materialized into dated [`FlightInstance`]s
/// one horizon at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightDefinition {
    pub definition_id: u64,
    pub flight_code: String,
    pub origin: LocationId,
    pub destination: LocationId,
    /// Scheduled departure time of day (UTC).
    pub departure_time: NaiveTime,
    /// Operating weekdays, 0 = Monday .. 6 = Sunday.
    pub weekdays: Vec<u8>,
    pub transport_duration_days: f64,
    pub volume: u32,
}

/// One dated occurrence of a recurring flight definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightInstance {
    pub flight_id: FlightId,
    pub definition_id: u64,
    pub flight_code: String,
    pub origin: LocationId,
    pub destination: LocationId,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub volume: u32,
}

/// Assignment statistics returned by one re-optimization run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunStats {
    pub total_orders: u64,
    pub assigned_orders: u64,
    pub total_products: u64,
    pub assigned_products: u64,
}

impl RunStats {
    /// Fraction of orders the run managed to assign, in [0, 1].
    pub fn assignment_ratio(&self) -> f64 {
        if self.total_orders == 0 {
            return 1.0;
        }
        self.assigned_orders as f64 / self.total_orders as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> TimelineEvent {
        TimelineEvent {
            event_id: EventId(1),
            kind: EventKind::Departure,
            time: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
            flight_id: FlightId(10),
            flight_code: "CF100".to_string(),
            product_id: ProductId(5),
            order_id: OrderId(7),
            origin: Some(LocationId(1)),
            destination: Some(LocationId(2)),
            volume: 50,
            transport_duration_days: Some(0.5),
        }
    }

    #[test]
    fn event_kind_uses_backend_tags() {
        let json = serde_json::to_string(&EventKind::Departure).unwrap();
        assert_eq!(json, "\"DEPARTURE\"");
        let back: EventKind = serde_json::from_str("\"ARRIVAL\"").unwrap();
        assert_eq!(back, EventKind::Arrival);
    }

    #[test]
    fn event_round_trips_through_json() {
        let event = sample_event();
        let json = serde_json::to_string(&event).unwrap();
        let back: TimelineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn missing_locations_deserialize_as_none() {
        let json = r#"{
            "event_id": 1,
            "kind": "DEPARTURE",
            "time": "2026-03-01T08:00:00Z",
            "flight_id": 10,
            "flight_code": "CF100",
            "product_id": 5,
            "order_id": 7,
            "volume": 50
        }"#;
        let event: TimelineEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.origin, None);
        assert_eq!(event.destination, None);
        assert_eq!(event.transport_duration_days, None);
    }

    #[test]
    fn assignment_ratio_handles_empty_runs() {
        assert_eq!(RunStats::default().assignment_ratio(), 1.0);
        let stats = RunStats {
            total_orders: 4,
            assigned_orders: 3,
            total_products: 0,
            assigned_products: 0,
        };
        assert!((stats.assignment_ratio() - 0.75).abs() < 1e-12);
    }
}
