//! Tokio driver for the scheduling core.
//!
//! One task owns the [`SchedulerCore`] and everything mutable; it multiplexes
//! the tick interval, control commands, and backend-call completions with
//! `select!`, so state transitions never interleave mid-step. The spawned
//! backend call is the only concurrent piece, bounded to one at a time by
//! the core's in-flight flag.

use std::sync::Arc;

use cf_timeline::{
    generate_instances, AirportRecord, FlightDefinition, FlightInstance, RunStats,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::{SchedulerAction, SchedulerConfig, SchedulerCore, SchedulerPhase};
use crate::{PlanningBackend, SchedError, SchedResult};

/// Read-only scheduler status, published on every state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub phase: SchedulerPhase,
    pub current_virtual_time: DateTime<Utc>,
    pub day_count: i64,
    pub run_in_flight: bool,
    /// Statistics of the most recent successful run.
    pub kpi: Option<RunStats>,
}

/// Scheduler lifecycle notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    RunStarted {
        run_id: String,
        window_start: DateTime<Utc>,
    },
    RunCompleted {
        run_id: String,
        stats: RunStats,
    },
    /// The run failed; no automatic retry happens within the window.
    RunFailed {
        run_id: String,
        message: String,
    },
    /// A virtual day boundary was crossed; carries that day's materialized
    /// flight instances.
    DayAdvanced {
        day: i64,
        instances: Vec<FlightInstance>,
    },
}

enum Command {
    Pause,
    Resume,
    Stop,
}

/// Handle to a running scheduler. Dropping it does not stop the task; call
/// [`stop`](Self::stop).
pub struct SchedulerHandle {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<SchedulerStatus>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Freeze virtual time. An in-flight backend call is not cancelled; its
    /// result is still applied when it completes.
    pub async fn pause(&self) -> SchedResult<()> {
        self.commands
            .send(Command::Pause)
            .await
            .map_err(|_| SchedError::NotRunning)
    }

    pub async fn resume(&self) -> SchedResult<()> {
        self.commands
            .send(Command::Resume)
            .await
            .map_err(|_| SchedError::NotRunning)
    }

    /// Stop ticking and wait for the driver task to wind down.
    pub async fn stop(self) -> SchedResult<()> {
        self.commands
            .send(Command::Stop)
            .await
            .map_err(|_| SchedError::NotRunning)?;
        let _ = self.task.await;
        Ok(())
    }

    /// Latest published status.
    pub fn status(&self) -> SchedulerStatus {
        self.status.borrow().clone()
    }

    /// Watch channel for status changes.
    pub fn status_stream(&self) -> watch::Receiver<SchedulerStatus> {
        self.status.clone()
    }
}

struct RunOutcome {
    run_id: String,
    result: SchedResult<RunStats>,
}

/// Scheduler entry point.
pub struct Scheduler;

impl Scheduler {
    /// Validate reference data, run one forced re-optimization, and begin
    /// ticking.
    ///
    /// Refuses to start degraded: a missing start time and missing airport
    /// data are distinct configuration errors, reported before any clock
    /// starts.
    pub async fn start<B: PlanningBackend>(
        backend: Arc<B>,
        config: SchedulerConfig,
        start_time: Option<DateTime<Utc>>,
    ) -> SchedResult<(SchedulerHandle, mpsc::Receiver<SchedulerEvent>)> {
        let start_time = start_time.ok_or(SchedError::NoStartTime)?;
        config.validate()?;

        let airports = backend.airports().await?;
        if airports.is_empty() {
            return Err(SchedError::NoAirports);
        }
        let definitions = backend.flight_definitions().await?;

        let wall = WallClock::new();
        let core = SchedulerCore::new(config, start_time, wall.now())?;

        let (command_tx, command_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(64);
        let (status_tx, status_rx) = watch::channel(status_of(&core, None));

        let task = tokio::spawn(run_loop(
            core,
            backend,
            airports,
            definitions,
            wall,
            command_rx,
            event_tx,
            status_tx,
        ));

        info!(%start_time, "scheduler started");
        Ok((
            SchedulerHandle {
                commands: command_tx,
                status: status_rx,
                task,
            },
            event_rx,
        ))
    }
}

/// Wall clock anchored to the tokio time source, so the driver stays
/// testable under a paused runtime and monotonic in production.
#[derive(Clone, Copy)]
struct WallClock {
    base_wall: DateTime<Utc>,
    base_instant: tokio::time::Instant,
}

impl WallClock {
    fn new() -> Self {
        Self {
            base_wall: Utc::now(),
            base_instant: tokio::time::Instant::now(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.base_instant.elapsed();
        self.base_wall
            + Duration::milliseconds(elapsed.as_millis().min(i64::MAX as u128) as i64)
    }
}

fn status_of(core: &SchedulerCore, kpi: Option<RunStats>) -> SchedulerStatus {
    SchedulerStatus {
        phase: core.phase(),
        current_virtual_time: core.current_virtual_time(),
        day_count: core.day_count(),
        run_in_flight: core.run_in_flight(),
        kpi,
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_loop<B: PlanningBackend>(
    mut core: SchedulerCore,
    backend: Arc<B>,
    airports: Vec<AirportRecord>,
    definitions: Vec<FlightDefinition>,
    wall: WallClock,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<SchedulerEvent>,
    status: watch::Sender<SchedulerStatus>,
) {
    let tick_period = core
        .config()
        .tick_period
        .to_std()
        .unwrap_or(std::time::Duration::from_secs(1));
    let mut interval = tokio::time::interval(tick_period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let (done_tx, mut done_rx) = mpsc::channel::<RunOutcome>(1);
    let mut kpi: Option<RunStats> = None;

    // Forced initial run before the first tick.
    let initial_window = core.start_time();
    start_run(&mut core, &backend, initial_window, &done_tx, &events).await;
    let _ = status.send(status_of(&core, kpi));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let actions = core.advance(wall.now());
                for action in actions {
                    match action {
                        SchedulerAction::AdvanceDay { day, day_start } => {
                            debug!(day, %day_start, "virtual day boundary crossed");
                            let instances = generate_instances(
                                &definitions,
                                day_start,
                                core.config().horizon_hours,
                                &airports,
                            );
                            let _ = events
                                .send(SchedulerEvent::DayAdvanced { day, instances })
                                .await;
                        }
                        SchedulerAction::TriggerRun { window_start } => {
                            start_run(&mut core, &backend, window_start, &done_tx, &events)
                                .await;
                        }
                    }
                }
                let _ = status.send(status_of(&core, kpi));
            }
            Some(outcome) = done_rx.recv() => {
                match outcome.result {
                    Ok(stats) => {
                        info!(run_id = %outcome.run_id, "re-optimization completed");
                        kpi = Some(stats);
                        let _ = events
                            .send(SchedulerEvent::RunCompleted {
                                run_id: outcome.run_id,
                                stats,
                            })
                            .await;
                        if let Some(window_start) = core.note_run_completed() {
                            start_run(&mut core, &backend, window_start, &done_tx, &events)
                                .await;
                        }
                    }
                    Err(err) => {
                        warn!(run_id = %outcome.run_id, error = %err, "re-optimization failed");
                        core.note_run_failed();
                        let _ = events
                            .send(SchedulerEvent::RunFailed {
                                run_id: outcome.run_id,
                                message: err.to_string(),
                            })
                            .await;
                    }
                }
                let _ = status.send(status_of(&core, kpi));
            }
            command = commands.recv() => {
                match command {
                    Some(Command::Pause) => core.pause(wall.now()),
                    Some(Command::Resume) => core.resume(wall.now()),
                    Some(Command::Stop) | None => {
                        core.stop();
                        let _ = status.send(status_of(&core, kpi));
                        break;
                    }
                }
                let _ = status.send(status_of(&core, kpi));
            }
        }
    }
}

/// Spawn one backend call and mark the core in flight.
async fn start_run<B: PlanningBackend>(
    core: &mut SchedulerCore,
    backend: &Arc<B>,
    window_start: DateTime<Utc>,
    done: &mpsc::Sender<RunOutcome>,
    events: &mpsc::Sender<SchedulerEvent>,
) {
    let run_id = Uuid::new_v4().to_string();
    let window_hours = core.config().window_hours();
    core.note_run_started(window_start);
    info!(run_id = %run_id, %window_start, "re-optimization started");
    let _ = events
        .send(SchedulerEvent::RunStarted {
            run_id: run_id.clone(),
            window_start,
        })
        .await;

    let backend = Arc::clone(backend);
    let done = done.clone();
    tokio::spawn(async move {
        let result = backend
            .execute_reoptimization(window_start, window_hours)
            .await;
        let _ = done.send(RunOutcome { run_id, result }).await;
    });
}
