//! Plan-file-backed planning backend.
//!
//! A stand-in for the remote optimization service, answering every backend
//! call from a loaded [`PlanFile`]: reference data comes straight from the
//! plan, and re-optimization statistics are derived from the departures
//! scheduled inside the requested window. Used by the headless CLI and the
//! test suites; production deployments implement [`PlanningBackend`] against
//! the real service instead.

use std::collections::HashSet;

use async_trait::async_trait;
use cf_core::{scale, OrderId, ProductId};
use cf_scheduler::{PlanningBackend, SchedResult};
use cf_timeline::{AirportRecord, EventKind, FlightDefinition, PlanFile, RunStats};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

pub struct PlanBackend {
    plan: PlanFile,
}

impl PlanBackend {
    pub fn new(plan: PlanFile) -> Self {
        Self { plan }
    }
}

#[async_trait]
impl PlanningBackend for PlanBackend {
    /// Statistics over the window's departures: an order or product counts
    /// as assigned when its event carries both locations.
    async fn execute_reoptimization(
        &self,
        window_start: DateTime<Utc>,
        window_hours: f64,
    ) -> SchedResult<RunStats> {
        let window_end = window_start + scale(Duration::hours(1), window_hours);

        let mut orders: HashSet<OrderId> = HashSet::new();
        let mut assigned_orders: HashSet<OrderId> = HashSet::new();
        let mut products: HashSet<ProductId> = HashSet::new();
        let mut assigned_products: HashSet<ProductId> = HashSet::new();

        for event in &self.plan.events {
            if event.kind != EventKind::Departure
                || event.time < window_start
                || event.time >= window_end
            {
                continue;
            }
            orders.insert(event.order_id);
            products.insert(event.product_id);
            if event.origin.is_some() && event.destination.is_some() {
                assigned_orders.insert(event.order_id);
                assigned_products.insert(event.product_id);
            }
        }

        let stats = RunStats {
            total_orders: orders.len() as u64,
            assigned_orders: assigned_orders.len() as u64,
            total_products: products.len() as u64,
            assigned_products: assigned_products.len() as u64,
        };
        debug!(%window_start, window_hours, ?stats, "plan-backed re-optimization");
        Ok(stats)
    }

    async fn flight_definitions(&self) -> SchedResult<Vec<FlightDefinition>> {
        Ok(self.plan.definitions.clone())
    }

    async fn airports(&self) -> SchedResult<Vec<AirportRecord>> {
        Ok(self.plan.airports.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::{EventId, FlightId, LocationId};
    use cf_timeline::TimelineEvent;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    fn departure(id: u64, order: u64, offset_h: i64, assigned: bool) -> TimelineEvent {
        TimelineEvent {
            event_id: EventId(id),
            kind: EventKind::Departure,
            time: t0() + Duration::hours(offset_h),
            flight_id: FlightId(id),
            flight_code: format!("CF{id}"),
            product_id: ProductId(order),
            order_id: OrderId(order),
            origin: assigned.then_some(LocationId(1)),
            destination: Some(LocationId(2)),
            volume: 10,
            transport_duration_days: None,
        }
    }

    fn plan(events: Vec<TimelineEvent>) -> PlanFile {
        PlanFile {
            version: 1,
            name: "test".to_string(),
            airports: Vec::new(),
            events,
            definitions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn stats_cover_only_the_window() {
        let backend = PlanBackend::new(plan(vec![
            departure(1, 1, 0, true),
            departure(2, 2, 1, false),
            // Outside a 2-hour window.
            departure(3, 3, 5, true),
        ]));

        let stats = backend.execute_reoptimization(t0(), 2.0).await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.assigned_orders, 1);
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.assigned_products, 1);
    }

    #[tokio::test]
    async fn empty_window_yields_zero_stats() {
        let backend = PlanBackend::new(plan(vec![departure(1, 1, 48, true)]));
        let stats = backend.execute_reoptimization(t0(), 1.0).await.unwrap();
        assert_eq!(stats, RunStats::default());
    }
}
