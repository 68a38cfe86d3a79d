//! Virtual-time helpers shared across the replay and scheduling crates.

use chrono::{DateTime, Duration, Utc};

/// Seconds in one virtual day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Convert a fractional number of days into a `Duration`.
///
/// Transport durations arrive from the backend as fractional days
/// (e.g. `0.5` for a 12-hour leg). Rounded to whole milliseconds.
pub fn days(days: f64) -> Duration {
    Duration::milliseconds((days * (SECONDS_PER_DAY as f64) * 1000.0).round() as i64)
}

/// Scale a duration by a dimensionless factor, in millisecond resolution.
///
/// Used to map wall-clock advance onto virtual time (`wall_dt * speed`).
pub fn scale(duration: Duration, factor: f64) -> Duration {
    Duration::milliseconds((duration.num_milliseconds() as f64 * factor).round() as i64)
}

/// Clamp a value to [0, 1].
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Fraction of `total` covered by `elapsed`, clamped to [0, 1].
///
/// A non-positive `total` reads as already complete.
pub fn fraction(elapsed: Duration, total: Duration) -> f64 {
    if total <= Duration::zero() {
        return 1.0;
    }
    clamp_unit(elapsed.num_milliseconds() as f64 / total.num_milliseconds() as f64)
}

/// Zero-based index of the virtual day containing `now`, counted from `start`.
///
/// Uses floor semantics: times before `start` land in negative days.
pub fn day_index(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (now - start).num_seconds();
    secs.div_euclid(SECONDS_PER_DAY)
}
