//! Plan-file validation logic.

use std::collections::HashSet;

use crate::schema::PlanFile;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

/// Structural validation of a plan file.
///
/// Rejects duplicate ids, bad capacities, and definitions referencing unknown
/// airports. Events with missing origin/destination are deliberately NOT
/// rejected here: those are data-quality cases the replay engine excludes
/// with a warning rather than configuration errors.
pub fn validate_plan(plan: &PlanFile) -> Result<(), ValidationError> {
    if plan.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: plan.version,
        });
    }

    let mut airport_ids = HashSet::new();
    for airport in &plan.airports {
        if !airport_ids.insert(airport.id) {
            return Err(ValidationError::DuplicateId {
                id: airport.id.to_string(),
                context: "airports".to_string(),
            });
        }
        if airport.max_capacity <= 0 {
            return Err(ValidationError::InvalidValue {
                field: format!("airports[{}].max_capacity", airport.id),
                value: airport.max_capacity.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if airport.base_used_capacity < 0 || airport.base_used_capacity > airport.max_capacity {
            return Err(ValidationError::InvalidValue {
                field: format!("airports[{}].base_used_capacity", airport.id),
                value: airport.base_used_capacity.to_string(),
                reason: "must lie within [0, max_capacity]".to_string(),
            });
        }
    }

    let mut event_ids = HashSet::new();
    for event in &plan.events {
        if !event_ids.insert(event.event_id) {
            return Err(ValidationError::DuplicateId {
                id: event.event_id.to_string(),
                context: "events".to_string(),
            });
        }
        if let Some(days) = event.transport_duration_days {
            if !days.is_finite() || days <= 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("events[{}].transport_duration_days", event.event_id),
                    value: days.to_string(),
                    reason: "must be a positive number of days".to_string(),
                });
            }
        }
    }

    let mut definition_ids = HashSet::new();
    for def in &plan.definitions {
        if !definition_ids.insert(def.definition_id) {
            return Err(ValidationError::DuplicateId {
                id: def.definition_id.to_string(),
                context: "definitions".to_string(),
            });
        }
        for (field, location) in [("origin", def.origin), ("destination", def.destination)] {
            if !airport_ids.contains(&location) {
                return Err(ValidationError::MissingReference {
                    id: location.to_string(),
                    context: format!("definitions[{}].{field}", def.definition_id),
                });
            }
        }
        if def.weekdays.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("definitions[{}].weekdays", def.definition_id),
                value: "[]".to_string(),
                reason: "at least one operating weekday required".to_string(),
            });
        }
        if let Some(&bad) = def.weekdays.iter().find(|&&d| d > 6) {
            return Err(ValidationError::InvalidValue {
                field: format!("definitions[{}].weekdays", def.definition_id),
                value: bad.to_string(),
                reason: "weekdays are 0 (Monday) .. 6 (Sunday)".to_string(),
            });
        }
        if !def.transport_duration_days.is_finite() || def.transport_duration_days <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("definitions[{}].transport_duration_days", def.definition_id),
                value: def.transport_duration_days.to_string(),
                reason: "must be a positive number of days".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        AirportRecord, EventKind, FlightDefinition, TimelineEvent,
    };
    use cf_core::{EventId, FlightId, LocationId, OrderId, ProductId};
    use chrono::{NaiveTime, TimeZone, Utc};

    fn airport(id: u64) -> AirportRecord {
        AirportRecord {
            id: LocationId(id),
            name: format!("AP{id}"),
            base_used_capacity: 100,
            max_capacity: 1000,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    fn event(id: u64) -> TimelineEvent {
        TimelineEvent {
            event_id: EventId(id),
            kind: EventKind::Departure,
            time: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
            flight_id: FlightId(id),
            flight_code: "CF1".to_string(),
            product_id: ProductId(1),
            order_id: OrderId(1),
            origin: Some(LocationId(1)),
            destination: Some(LocationId(2)),
            volume: 10,
            transport_duration_days: None,
        }
    }

    fn definition(id: u64) -> FlightDefinition {
        FlightDefinition {
            definition_id: id,
            flight_code: "CF1".to_string(),
            origin: LocationId(1),
            destination: LocationId(2),
            departure_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            weekdays: vec![0, 2, 4],
            transport_duration_days: 0.5,
            volume: 10,
        }
    }

    fn plan() -> PlanFile {
        PlanFile {
            version: 1,
            name: "test".to_string(),
            airports: vec![airport(1), airport(2)],
            events: vec![event(1), event(2)],
            definitions: vec![definition(1)],
        }
    }

    #[test]
    fn valid_plan_passes() {
        assert!(validate_plan(&plan()).is_ok());
    }

    #[test]
    fn duplicate_event_id_rejected() {
        let mut p = plan();
        p.events.push(event(1));
        assert!(matches!(
            validate_plan(&p),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn duplicate_airport_id_rejected() {
        let mut p = plan();
        p.airports.push(airport(1));
        assert!(matches!(
            validate_plan(&p),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn event_with_missing_location_is_not_a_validation_error() {
        let mut p = plan();
        p.events[0].origin = None;
        assert!(validate_plan(&p).is_ok());
    }

    #[test]
    fn definition_referencing_unknown_airport_rejected() {
        let mut p = plan();
        p.definitions[0].destination = LocationId(99);
        assert!(matches!(
            validate_plan(&p),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn bad_capacity_rejected() {
        let mut p = plan();
        p.airports[0].base_used_capacity = 2000;
        assert!(matches!(
            validate_plan(&p),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn out_of_range_weekday_rejected() {
        let mut p = plan();
        p.definitions[0].weekdays = vec![7];
        assert!(matches!(
            validate_plan(&p),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn future_version_rejected() {
        let mut p = plan();
        p.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_plan(&p),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }
}
