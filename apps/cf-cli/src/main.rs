use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cf_app::{AppError, AppResult, PlanBackend, ReplaySession};
use cf_clock::SpeedMultiplier;
use cf_scheduler::{Scheduler, SchedulerConfig, SchedulerEvent};
use cf_timeline::{generate_instances, PlanFile};
use chrono::{DateTime, Duration, Utc};

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "Cargoflow CLI - air-cargo timeline replay and scheduling tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate plan file syntax and structure
    Validate {
        /// Path to the plan file (YAML or JSON)
        plan_path: PathBuf,
    },
    /// Replay the plan's timeline to completion
    Replay {
        /// Path to the plan file (YAML or JSON)
        plan_path: PathBuf,
        /// Playback speed
        #[arg(long, value_enum, default_value = "day")]
        speed: SpeedArg,
        /// Host tick period in milliseconds
        #[arg(long, default_value_t = 100)]
        step_ms: u32,
        /// Suppress the per-transition log
        #[arg(long)]
        quiet: bool,
    },
    /// Materialize dated flight instances from the plan's definitions
    Instances {
        /// Path to the plan file (YAML or JSON)
        plan_path: PathBuf,
        /// Horizon start (RFC 3339); defaults to the first event time
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Horizon length in hours
        #[arg(long, default_value_t = 24.0)]
        horizon_hours: f64,
    },
    /// Run the windowed scheduler against the plan for a stretch of wall time
    Live {
        /// Path to the plan file (YAML or JSON)
        plan_path: PathBuf,
        /// Wall-clock seconds to keep the scheduler running
        #[arg(long, default_value_t = 30)]
        wall_seconds: u64,
        /// Virtual seconds advanced per wall second
        #[arg(long, default_value_t = 60.0)]
        time_scale: f64,
        /// Re-optimization window in virtual minutes
        #[arg(long, default_value_t = 10)]
        window_minutes: i64,
    },
}

/// Recognized playback speeds: one virtual unit per real second.
#[derive(Clone, Copy, ValueEnum)]
enum SpeedArg {
    Second,
    Minute,
    Hour,
    Day,
}

impl From<SpeedArg> for SpeedMultiplier {
    fn from(arg: SpeedArg) -> Self {
        match arg {
            SpeedArg::Second => SpeedMultiplier::RealTime,
            SpeedArg::Minute => SpeedMultiplier::MinutePerSecond,
            SpeedArg::Hour => SpeedMultiplier::HourPerSecond,
            SpeedArg::Day => SpeedMultiplier::DayPerSecond,
        }
    }
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { plan_path } => cmd_validate(&plan_path),
        Commands::Replay {
            plan_path,
            speed,
            step_ms,
            quiet,
        } => cmd_replay(&plan_path, speed.into(), step_ms, quiet),
        Commands::Instances {
            plan_path,
            start,
            horizon_hours,
        } => cmd_instances(&plan_path, start, horizon_hours),
        Commands::Live {
            plan_path,
            wall_seconds,
            time_scale,
            window_minutes,
        } => cmd_live(&plan_path, wall_seconds, time_scale, window_minutes),
    }
}

fn load_plan(path: &Path) -> AppResult<PlanFile> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(cf_timeline::load_yaml(path)?),
        Some("json") => Ok(cf_timeline::load_json(path)?),
        _ => Err(AppError::InvalidInput(format!(
            "unrecognized plan file extension: {}",
            path.display()
        ))),
    }
}

fn cmd_validate(plan_path: &Path) -> AppResult<()> {
    println!("Validating plan: {}", plan_path.display());
    let plan = load_plan(plan_path)?;
    println!("✓ Plan is valid");
    println!("  Airports:    {}", plan.airports.len());
    println!("  Events:      {}", plan.events.len());
    println!("  Definitions: {}", plan.definitions.len());
    Ok(())
}

fn cmd_replay(plan_path: &Path, speed: SpeedMultiplier, step_ms: u32, quiet: bool) -> AppResult<()> {
    if step_ms == 0 {
        return Err(AppError::InvalidInput(
            "step-ms must be at least 1".to_string(),
        ));
    }

    let plan = load_plan(plan_path)?;
    let mut session = ReplaySession::new(&plan)?;
    if session.excluded_count() > 0 {
        println!(
            "! Excluded {} flight(s) with missing or unknown locations",
            session.excluded_count()
        );
    }
    println!(
        "Replaying {} flight(s) from {} over {} virtual hours",
        session.pair_count(),
        session.start_time(),
        session.total().num_hours()
    );

    session.set_speed(speed);
    session.play();
    let step = Duration::milliseconds(i64::from(step_ms));
    loop {
        for transition in session.drain_transitions() {
            if !quiet {
                print_transition(&transition);
            }
        }
        if !session.is_playing() {
            break;
        }
        session.tick(step);
    }

    let snapshot = session.snapshot();
    println!(
        "✓ Replay complete: {} flight(s) completed at {}",
        snapshot.completed_count, snapshot.current_time
    );
    println!("Final capacities:");
    for row in session.capacity_view() {
        println!(
            "  location {:<8} used {:>8} / {:<8} ({:>5.1}%)  delta {:+}",
            row.location, row.used, row.max, row.percent, row.delta
        );
    }
    Ok(())
}

fn print_transition(transition: &cf_app::Transition) {
    let (label, sign) = match transition.kind {
        cf_app::TransitionKind::Departed => ("DEPARTED", '-'),
        cf_app::TransitionKind::Arrived => ("ARRIVED ", '+'),
    };
    println!(
        "  {} {:<8} location {:<8} volume {}{}",
        label, transition.flight_code, transition.location, sign, transition.volume
    );
}

fn cmd_instances(
    plan_path: &Path,
    start: Option<DateTime<Utc>>,
    horizon_hours: f64,
) -> AppResult<()> {
    let plan = load_plan(plan_path)?;
    let start = start
        .or_else(|| plan.events.iter().map(|e| e.time).min())
        .ok_or_else(|| {
            AppError::InvalidInput(
                "no horizon start: pass --start or include timeline events".to_string(),
            )
        })?;

    let instances = generate_instances(&plan.definitions, start, horizon_hours, &plan.airports);
    if instances.is_empty() {
        println!(
            "No instances within {} hour(s) of {}",
            horizon_hours, start
        );
        return Ok(());
    }

    println!("Instances from {} ({} hour horizon):", start, horizon_hours);
    for instance in &instances {
        println!(
            "  {:<8} {} → {}  dep {}  arr {}  volume {}",
            instance.flight_code,
            instance.origin,
            instance.destination,
            instance.departure,
            instance.arrival,
            instance.volume
        );
    }
    println!("✓ {} instance(s)", instances.len());
    Ok(())
}

fn cmd_live(
    plan_path: &Path,
    wall_seconds: u64,
    time_scale: f64,
    window_minutes: i64,
) -> AppResult<()> {
    let plan = load_plan(plan_path)?;
    let start_time = plan.events.iter().map(|e| e.time).min();
    let config = SchedulerConfig {
        time_scale,
        window: Duration::minutes(window_minutes),
        ..SchedulerConfig::default()
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let (handle, mut events) =
            Scheduler::start(Arc::new(PlanBackend::new(plan)), config, start_time).await?;

        let deadline = tokio::time::sleep(std::time::Duration::from_secs(wall_seconds));
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                event = events.recv() => match event {
                    Some(event) => print_scheduler_event(&event),
                    None => break,
                },
            }
        }

        let status = handle.status();
        println!(
            "Final status: day {}, virtual time {}",
            status.day_count, status.current_virtual_time
        );
        if let Some(kpi) = status.kpi {
            println!(
                "KPI: {}/{} orders assigned, {}/{} products assigned",
                kpi.assigned_orders, kpi.total_orders, kpi.assigned_products, kpi.total_products
            );
        }
        handle.stop().await?;
        Ok(())
    })
}

fn print_scheduler_event(event: &SchedulerEvent) {
    match event {
        SchedulerEvent::RunStarted {
            run_id,
            window_start,
        } => println!("Run {} started (window {})", run_id, window_start),
        SchedulerEvent::RunCompleted { run_id, stats } => println!(
            "✓ Run {} completed: {}/{} orders, {}/{} products",
            run_id,
            stats.assigned_orders,
            stats.total_orders,
            stats.assigned_products,
            stats.total_products
        ),
        SchedulerEvent::RunFailed { run_id, message } => {
            println!("✗ Run {} failed: {}", run_id, message)
        }
        SchedulerEvent::DayAdvanced { day, instances } => {
            println!("Day {}: {} flight instance(s) materialized", day, instances.len())
        }
    }
}
