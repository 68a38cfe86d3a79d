//! Error types for the cf-app service layer.

/// Application error type that wraps errors from the library crates and
/// provides a unified error interface for frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no airports loaded; load airport reference data before starting")]
    NoAirports,

    #[error("plan contains no timeline events to replay")]
    EmptyTimeline,

    #[error("Timeline error: {0}")]
    Timeline(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cf-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<cf_timeline::TimelineError> for AppError {
    fn from(err: cf_timeline::TimelineError) -> Self {
        AppError::Timeline(err.to_string())
    }
}

impl From<cf_scheduler::SchedError> for AppError {
    fn from(err: cf_scheduler::SchedError) -> Self {
        AppError::Scheduler(err.to_string())
    }
}
