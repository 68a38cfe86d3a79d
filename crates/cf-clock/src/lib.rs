//! Seekable, speed-scaled playback clock for timeline replay.
//!
//! The clock owns a virtual position inside `[0, total]` and maps wall-clock
//! advance onto virtual time through a discrete speed multiplier. The host
//! drives it with [`ReplayClock::advance`] on a fixed cadence (~100 ms).

pub mod clock;

pub use clock::{PlaybackState, ReplayClock, SpeedMultiplier};
