//! Temporal replay engine for flight timelines.
//!
//! Walks a virtual "current time" against indexed departure/arrival pairs,
//! re-deriving the full set of in-flight entities on every tick and firing
//! each DEPARTED/ARRIVED transition exactly once. The engine is a plain
//! instance owning all of its state; independent replays can coexist.

pub mod engine;
pub mod frame;

pub use engine::ReplayEngine;
pub use frame::{ActiveFlight, ReplayStats, TickFrame, Transition, TransitionKind};
