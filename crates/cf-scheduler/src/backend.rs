//! External planning-backend interface.

use async_trait::async_trait;
use cf_timeline::{AirportRecord, FlightDefinition, RunStats};
use chrono::{DateTime, Utc};

use crate::SchedResult;

/// The optimization/backend collaborator, consumed as an opaque service.
///
/// `execute_reoptimization` may take seconds to minutes; the scheduler
/// treats it as a black box and never runs two calls concurrently.
#[async_trait]
pub trait PlanningBackend: Send + Sync + 'static {
    /// Run the optimization over one window and return assignment
    /// statistics.
    async fn execute_reoptimization(
        &self,
        window_start: DateTime<Utc>,
        window_hours: f64,
    ) -> SchedResult<RunStats>;

    /// Recurring flight templates for instance materialization.
    async fn flight_definitions(&self) -> SchedResult<Vec<FlightDefinition>>;

    /// Airport reference data, including base capacities and coordinates.
    async fn airports(&self) -> SchedResult<Vec<AirportRecord>>;
}
