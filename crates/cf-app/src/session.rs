//! Replay session facade.
//!
//! Wires the timeline index, replay engine, playback clock, and capacity
//! ledger together behind a single mutable handle. The presentation layer
//! sees read-only snapshots and the playback mutators; everything else stays
//! internal.

use std::collections::HashSet;

use cf_capacity::{CapacityLedger, LocationUsage};
use cf_clock::{ReplayClock, SpeedMultiplier};
use cf_core::LocationId;
use cf_replay::{ActiveFlight, ReplayEngine, ReplayStats, Transition};
use cf_timeline::{pair_events, PlanFile};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Read-only view of the replay at the current position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySnapshot {
    pub current_time: DateTime<Utc>,
    pub active_flights: Vec<ActiveFlight>,
    pub stats: ReplayStats,
    pub completed_count: usize,
    pub progress_percent: f64,
}

/// One replay over one plan.
///
/// The session owns its engine, clock, and ledger; independent sessions can
/// coexist. The host drives it with [`tick`](Self::tick) on a fixed cadence
/// (~100 ms) while playing.
pub struct ReplaySession {
    start: DateTime<Utc>,
    engine: ReplayEngine,
    clock: ReplayClock,
    ledger: CapacityLedger,
    snapshot: ReplaySnapshot,
    transition_log: Vec<Transition>,
}

impl ReplaySession {
    /// Build a session over a validated plan.
    ///
    /// Requires airport reference data and a non-empty event timeline; both
    /// are configuration errors, reported before anything starts. Events
    /// with missing or unknown locations are a data-quality matter handled
    /// by the engine (excluded with a warning), not grounds for failure.
    pub fn new(plan: &PlanFile) -> AppResult<Self> {
        if plan.airports.is_empty() {
            return Err(AppError::NoAirports);
        }
        if plan.events.is_empty() {
            return Err(AppError::EmptyTimeline);
        }

        let known: HashSet<LocationId> = plan.airports.iter().map(|a| a.id).collect();
        let engine = ReplayEngine::new(pair_events(&plan.events), &known);

        let (start, end) = match engine.span() {
            Some(span) => span,
            // Every pair was excluded: an empty span anchored at the first
            // event still yields a well-formed, immediately-complete session.
            None => {
                let first = plan
                    .events
                    .iter()
                    .map(|e| e.time)
                    .min()
                    .ok_or(AppError::EmptyTimeline)?;
                (first, first)
            }
        };

        let mut session = Self {
            start,
            engine,
            clock: ReplayClock::new(end - start),
            ledger: CapacityLedger::new(&plan.airports),
            snapshot: ReplaySnapshot {
                current_time: start,
                active_flights: Vec::new(),
                stats: ReplayStats::default(),
                completed_count: 0,
                progress_percent: 0.0,
            },
            transition_log: Vec::new(),
        };
        session.refresh();
        Ok(session)
    }

    /// Virtual time at the clock's current position.
    pub fn current_time(&self) -> DateTime<Utc> {
        self.start + self.clock.position()
    }

    /// Re-derive the frame at the current position and fold its transitions
    /// into the ledger before the snapshot is published.
    fn refresh(&mut self) {
        let now = self.current_time();
        let frame = self.engine.tick(now);
        for transition in &frame.transitions {
            self.ledger.apply(transition);
        }
        self.transition_log.extend(frame.transitions);
        self.snapshot = ReplaySnapshot {
            current_time: now,
            active_flights: frame.active,
            stats: frame.stats,
            completed_count: frame.stats.completed,
            progress_percent: self.clock.progress_percent(),
        };
    }

    /// Resume playback. A session standing at the end rewinds to the start
    /// first.
    pub fn play(&mut self) {
        self.clock.play();
        self.refresh();
    }

    /// Stop advancing, retaining the current position.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Stop, rewind, and clear all derived state: clock position, one-shot
    /// notification tracking, and capacity deltas.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.engine.reset();
        self.ledger.reset_deltas();
        self.transition_log.clear();
        self.refresh();
    }

    /// Jump to `offset` from the timeline start, clamped into the replayed
    /// span. Notification tracking is untouched, so seeking backward past an
    /// already-notified flight does not re-notify.
    pub fn seek(&mut self, offset: Duration) {
        self.clock.seek(offset);
        self.refresh();
    }

    pub fn set_speed(&mut self, speed: SpeedMultiplier) {
        self.clock.set_speed(speed);
    }

    pub fn speed(&self) -> SpeedMultiplier {
        self.clock.speed()
    }

    /// Advance by one host tick of `wall_dt` and publish the derived frame.
    pub fn tick(&mut self, wall_dt: Duration) -> &ReplaySnapshot {
        if self.clock.advance(wall_dt) {
            self.refresh();
        }
        &self.snapshot
    }

    /// Latest published frame.
    pub fn snapshot(&self) -> &ReplaySnapshot {
        &self.snapshot
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn at_end(&self) -> bool {
        self.clock.at_end()
    }

    /// First departure on the replayed timeline.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start
    }

    /// Length of the replayed span.
    pub fn total(&self) -> Duration {
        self.clock.total()
    }

    /// Merged capacity view over all locations, ordered by location id.
    pub fn capacity_view(&self) -> Vec<LocationUsage> {
        self.ledger.view()
    }

    /// Current usage of one location in percent of its maximum.
    pub fn capacity_percent(&self, location: LocationId) -> Option<f64> {
        self.ledger.percent(location)
    }

    /// Transitions observed since the last drain, in fire order.
    pub fn drain_transitions(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.transition_log)
    }

    /// Number of flights admitted into the replay.
    pub fn pair_count(&self) -> usize {
        self.engine.pair_count()
    }

    /// Number of flights dropped for data-quality reasons.
    pub fn excluded_count(&self) -> usize {
        self.engine.excluded_count()
    }
}
