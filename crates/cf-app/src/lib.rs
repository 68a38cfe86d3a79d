//! Shared application service layer for cargoflow.
//!
//! This crate provides the unified surface frontends consume: a
//! [`ReplaySession`] wiring the timeline index, replay engine, playback
//! clock, and capacity ledger behind read-only snapshots and the playback
//! mutators, plus a plan-file-backed planning backend for headless
//! operation.

pub mod error;
pub mod plan_backend;
pub mod session;

// Re-export key types for convenience
pub use cf_capacity::LocationUsage;
pub use cf_replay::{ActiveFlight, ReplayStats, Transition, TransitionKind};
pub use error::{AppError, AppResult};
pub use plan_backend::PlanBackend;
pub use session::{ReplaySession, ReplaySnapshot};
