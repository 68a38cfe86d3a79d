//! Windowed re-optimization scheduler.
//!
//! A second, coarser clock for live/background operation: it advances a
//! virtual day counter on a wall-clock cadence, decides when a
//! re-optimization window has elapsed, serializes calls to the external
//! planning backend (at most one in flight, at most one queued), and catches
//! up virtual time from wall-clock deltas after idle periods.
//!
//! The crate splits into a pure state machine ([`SchedulerCore`]) that owns
//! every scheduling decision, and a tokio driver ([`Scheduler`]) that owns
//! the tick task and the backend calls. All mutable state lives on the
//! driver task; the only concurrent operation is the spawned backend call.

pub mod backend;
pub mod driver;
pub mod state;

pub use backend::PlanningBackend;
pub use state::{SchedulerAction, SchedulerConfig, SchedulerCore, SchedulerPhase};
pub use driver::{Scheduler, SchedulerEvent, SchedulerHandle, SchedulerStatus};

pub type SchedResult<T> = Result<T, SchedError>;

#[derive(thiserror::Error, Debug)]
pub enum SchedError {
    /// Reference data is missing; starting would mean running degraded.
    #[error("no airports loaded; load airport reference data before starting")]
    NoAirports,

    #[error("no simulation start time configured")]
    NoStartTime,

    #[error("invalid configuration: {what}")]
    InvalidConfig { what: &'static str },

    #[error("backend error: {message}")]
    Backend { message: String },

    #[error("scheduler is not running")]
    NotRunning,
}
