//! cf-timeline: canonical plan-file format, validation, and timeline indexing.
//!
//! The planning backend hands over a flat list of dated departure/arrival
//! events plus airport reference data. This crate owns that payload schema,
//! validates it, pairs events into per-flight spans, and materializes dated
//! flight instances from recurring definitions.

pub mod index;
pub mod instances;
pub mod schema;
pub mod validate;

pub use index::{pair_events, FlightPair, DEFAULT_TRANSPORT_DAYS};
pub use instances::generate_instances;
pub use schema::*;
pub use validate::{validate_plan, ValidationError, LATEST_VERSION};

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(thiserror::Error, Debug)]
pub enum TimelineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &std::path::Path) -> TimelineResult<PlanFile> {
    let content = std::fs::read_to_string(path)?;
    let plan: PlanFile = serde_yaml::from_str(&content)?;
    validate_plan(&plan)?;
    Ok(plan)
}

pub fn save_yaml(path: &std::path::Path, plan: &PlanFile) -> TimelineResult<()> {
    validate_plan(plan)?;
    let content = serde_yaml::to_string(plan)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> TimelineResult<PlanFile> {
    let content = std::fs::read_to_string(path)?;
    let plan: PlanFile = serde_json::from_str(&content)?;
    validate_plan(&plan)?;
    Ok(plan)
}

pub fn save_json(path: &std::path::Path, plan: &PlanFile) -> TimelineResult<()> {
    validate_plan(plan)?;
    let content = serde_json::to_string_pretty(plan)?;
    std::fs::write(path, content)?;
    Ok(())
}
