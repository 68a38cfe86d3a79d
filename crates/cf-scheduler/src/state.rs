//! Pure scheduling state machine.
//!
//! Owns virtual time, the day counter, the window trigger, and the
//! run-coalescing slot. The driver feeds it wall-clock timestamps and
//! executes the actions it returns; nothing in here blocks or spawns.

use cf_core::{day_index, scale, SECONDS_PER_DAY};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{SchedError, SchedResult};

/// Scheduler tuning parameters.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Wall-clock period between ticks.
    pub tick_period: Duration,
    /// Virtual seconds advanced per wall-clock second.
    pub time_scale: f64,
    /// Virtual interval between re-optimization runs.
    pub window: Duration,
    /// Early-trigger margin subtracted from the window.
    pub trigger_buffer: Duration,
    /// Horizon for per-day flight instance materialization.
    pub horizon_hours: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::seconds(1),
            time_scale: 60.0,
            window: Duration::minutes(10),
            trigger_buffer: Duration::seconds(30),
            horizon_hours: 24.0,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> SchedResult<()> {
        if self.tick_period <= Duration::zero() {
            return Err(SchedError::InvalidConfig {
                what: "tick_period must be positive",
            });
        }
        if !self.time_scale.is_finite() || self.time_scale <= 0.0 {
            return Err(SchedError::InvalidConfig {
                what: "time_scale must be positive",
            });
        }
        if self.trigger_buffer < Duration::zero() {
            return Err(SchedError::InvalidConfig {
                what: "trigger_buffer must be non-negative",
            });
        }
        if self.window <= self.trigger_buffer {
            return Err(SchedError::InvalidConfig {
                what: "window must exceed trigger_buffer",
            });
        }
        if !self.horizon_hours.is_finite() || self.horizon_hours <= 0.0 {
            return Err(SchedError::InvalidConfig {
                what: "horizon_hours must be positive",
            });
        }
        Ok(())
    }

    /// The re-optimization window in hours, as handed to the backend.
    pub fn window_hours(&self) -> f64 {
        self.window.num_milliseconds() as f64 / 3_600_000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    Idle,
    Running,
    Paused,
}

/// Work the driver must perform after one [`SchedulerCore::advance`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerAction {
    /// A virtual day boundary was crossed; materialize that day's flights.
    AdvanceDay {
        day: i64,
        day_start: DateTime<Utc>,
    },
    /// A re-optimization window elapsed with no run in flight.
    TriggerRun { window_start: DateTime<Utc> },
}

/// The scheduling state machine proper.
///
/// Invariant: `run_in_flight` plus the single `queued_run` slot bound
/// pending work to one in-flight and one queued run; triggers arriving
/// while a run is in flight overwrite the slot rather than queueing.
#[derive(Debug, Clone)]
pub struct SchedulerCore {
    config: SchedulerConfig,
    start_time: DateTime<Utc>,
    phase: SchedulerPhase,
    current_virtual: DateTime<Utc>,
    day_count: i64,
    last_run_virtual: DateTime<Utc>,
    queued_run: Option<DateTime<Utc>>,
    run_in_flight: bool,
    last_wall: DateTime<Utc>,
}

impl SchedulerCore {
    pub fn new(
        config: SchedulerConfig,
        start_time: DateTime<Utc>,
        wall_now: DateTime<Utc>,
    ) -> SchedResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            start_time,
            phase: SchedulerPhase::Running,
            current_virtual: start_time,
            day_count: 0,
            last_run_virtual: start_time,
            queued_run: None,
            run_in_flight: false,
            last_wall: wall_now,
        })
    }

    /// Advance virtual time to match `wall_now` and collect due work.
    ///
    /// Virtual advance is computed from the wall-clock delta, not from an
    /// assumed tick period, so a stretch of missed ticks (suspended host)
    /// catches up in a single call. One `AdvanceDay` is emitted per crossed
    /// boundary; a window trigger either becomes a `TriggerRun` action or,
    /// while a run is in flight, overwrites the queued slot.
    pub fn advance(&mut self, wall_now: DateTime<Utc>) -> Vec<SchedulerAction> {
        if self.phase != SchedulerPhase::Running {
            return Vec::new();
        }

        let wall_dt = (wall_now - self.last_wall).max(Duration::zero());
        let before = self.current_virtual;
        self.current_virtual = before + scale(wall_dt, self.config.time_scale);
        self.last_wall = wall_now;

        let mut actions = Vec::new();

        let day_before = day_index(self.start_time, before);
        let day_after = day_index(self.start_time, self.current_virtual);
        for day in (day_before + 1)..=day_after {
            actions.push(SchedulerAction::AdvanceDay {
                day,
                day_start: self.start_time + Duration::seconds(day * SECONDS_PER_DAY),
            });
        }
        self.day_count = day_after.max(self.day_count);

        let due = self.current_virtual - self.last_run_virtual
            >= self.config.window - self.config.trigger_buffer;
        if due {
            if self.run_in_flight {
                self.queued_run = Some(self.current_virtual);
            } else {
                actions.push(SchedulerAction::TriggerRun {
                    window_start: self.current_virtual,
                });
            }
        }

        actions
    }

    /// Virtual time as of `wall_now`, without mutating stored state.
    ///
    /// Consumers asking "what is the simulation time right now" must not
    /// trust the stored value, which goes stale while the tick loop is
    /// suspended; project it forward from the last wall-clock stamp.
    pub fn projected_virtual_time(&self, wall_now: DateTime<Utc>) -> DateTime<Utc> {
        if self.phase != SchedulerPhase::Running {
            return self.current_virtual;
        }
        let wall_dt = (wall_now - self.last_wall).max(Duration::zero());
        self.current_virtual + scale(wall_dt, self.config.time_scale)
    }

    /// Record that a run was started for the window beginning at
    /// `window_start`. Stamping the window at start (not completion) keeps a
    /// long-running call from retriggering the moment it returns.
    pub fn note_run_started(&mut self, window_start: DateTime<Utc>) {
        self.run_in_flight = true;
        self.last_run_virtual = window_start;
    }

    /// Record completion. Returns the queued window start, if any; the
    /// caller starts exactly one follow-up run with it.
    pub fn note_run_completed(&mut self) -> Option<DateTime<Utc>> {
        self.run_in_flight = false;
        self.queued_run.take()
    }

    /// Record failure. The queued slot is dropped as well: honoring it
    /// immediately would amount to the automatic retry the failure policy
    /// rules out. The next natural window trigger attempts again.
    pub fn note_run_failed(&mut self) {
        self.run_in_flight = false;
        self.queued_run = None;
    }

    /// Freeze virtual time. Elapsed wall time up to `wall_now` is folded in
    /// first so a later resume does not replay it.
    pub fn pause(&mut self, wall_now: DateTime<Utc>) {
        if self.phase == SchedulerPhase::Running {
            self.current_virtual = self.projected_virtual_time(wall_now);
            self.last_wall = wall_now;
            self.phase = SchedulerPhase::Paused;
        }
    }

    pub fn resume(&mut self, wall_now: DateTime<Utc>) {
        if self.phase == SchedulerPhase::Paused {
            self.last_wall = wall_now;
            self.phase = SchedulerPhase::Running;
        }
    }

    pub fn stop(&mut self) {
        self.phase = SchedulerPhase::Idle;
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn current_virtual_time(&self) -> DateTime<Utc> {
        self.current_virtual
    }

    pub fn day_count(&self) -> i64 {
        self.day_count
    }

    pub fn run_in_flight(&self) -> bool {
        self.run_in_flight
    }

    pub fn queued_run(&self) -> Option<DateTime<Utc>> {
        self.queued_run
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}
