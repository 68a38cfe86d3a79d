//! Playback clock state machine.

use cf_core::{fraction, scale};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Recognized playback speeds: one virtual second/minute/hour/day per real
/// second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedMultiplier {
    #[default]
    RealTime,
    MinutePerSecond,
    HourPerSecond,
    DayPerSecond,
}

impl SpeedMultiplier {
    /// Virtual seconds per wall-clock second.
    pub fn factor(self) -> f64 {
        match self {
            SpeedMultiplier::RealTime => 1.0,
            SpeedMultiplier::MinutePerSecond => 60.0,
            SpeedMultiplier::HourPerSecond => 3_600.0,
            SpeedMultiplier::DayPerSecond => 86_400.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Playing,
    Paused,
}

/// Seekable playback clock over a bounded virtual span.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayClock {
    total: Duration,
    position: Duration,
    speed: SpeedMultiplier,
    state: PlaybackState,
}

impl ReplayClock {
    /// Create a paused clock at position zero. A negative `total` reads as
    /// an empty span.
    pub fn new(total: Duration) -> Self {
        Self {
            total: total.max(Duration::zero()),
            position: Duration::zero(),
            speed: SpeedMultiplier::default(),
            state: PlaybackState::Paused,
        }
    }

    /// Resume advancing. A clock standing at the end rewinds to zero first.
    pub fn play(&mut self) {
        if self.at_end() {
            self.position = Duration::zero();
        }
        self.state = PlaybackState::Playing;
    }

    /// Stop advancing, retaining the current position.
    pub fn pause(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Stop and return to position zero.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Paused;
        self.position = Duration::zero();
    }

    /// Jump to `to`, clamped into `[0, total]`. Playback state is untouched.
    pub fn seek(&mut self, to: Duration) {
        self.position = to.clamp(Duration::zero(), self.total);
    }

    pub fn set_speed(&mut self, speed: SpeedMultiplier) {
        self.speed = speed;
    }

    pub fn speed(&self) -> SpeedMultiplier {
        self.speed
    }

    /// Advance virtual time by `wall_dt * speed` while playing.
    ///
    /// Reaching the end clamps the position and auto-pauses. Returns whether
    /// the position moved.
    pub fn advance(&mut self, wall_dt: Duration) -> bool {
        if self.state != PlaybackState::Playing || wall_dt <= Duration::zero() {
            return false;
        }
        let step = scale(wall_dt, self.speed.factor());
        if step <= Duration::zero() {
            return false;
        }
        self.position = (self.position + step).min(self.total);
        if self.at_end() {
            self.state = PlaybackState::Paused;
        }
        true
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.total
    }

    /// Position as a percentage of the total span (100 for an empty span).
    pub fn progress_percent(&self) -> f64 {
        fraction(self.position, self.total) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(total_s: i64) -> ReplayClock {
        ReplayClock::new(Duration::seconds(total_s))
    }

    #[test]
    fn paused_clock_does_not_advance() {
        let mut c = clock(100);
        assert!(!c.advance(Duration::milliseconds(100)));
        assert_eq!(c.position(), Duration::zero());
    }

    #[test]
    fn advance_scales_by_speed() {
        let mut c = clock(1_000_000);
        c.set_speed(SpeedMultiplier::MinutePerSecond);
        c.play();

        // One 100ms host tick at 60x is 6 virtual seconds.
        assert!(c.advance(Duration::milliseconds(100)));
        assert_eq!(c.position(), Duration::seconds(6));
    }

    #[test]
    fn reaching_the_end_auto_pauses() {
        let mut c = clock(10);
        c.set_speed(SpeedMultiplier::MinutePerSecond);
        c.play();

        assert!(c.advance(Duration::seconds(1)));
        assert_eq!(c.position(), Duration::seconds(10));
        assert!(!c.is_playing());
        assert!(c.at_end());
    }

    #[test]
    fn play_at_end_rewinds_first() {
        let mut c = clock(10);
        c.seek(Duration::seconds(10));
        assert!(c.at_end());

        c.play();
        assert_eq!(c.position(), Duration::zero());
        assert!(c.is_playing());
    }

    #[test]
    fn seek_clamps_to_span() {
        let mut c = clock(100);
        c.seek(Duration::seconds(250));
        assert_eq!(c.position(), Duration::seconds(100));
        c.seek(Duration::seconds(-5));
        assert_eq!(c.position(), Duration::zero());
    }

    #[test]
    fn seek_does_not_change_playback_state() {
        let mut c = clock(100);
        c.play();
        c.seek(Duration::seconds(50));
        assert!(c.is_playing());
    }

    #[test]
    fn reset_returns_to_zero_paused() {
        let mut c = clock(100);
        c.play();
        c.advance(Duration::seconds(2));
        c.reset();

        assert_eq!(c.position(), Duration::zero());
        assert!(!c.is_playing());
    }

    #[test]
    fn progress_percent_tracks_position() {
        let mut c = clock(200);
        c.seek(Duration::seconds(50));
        assert!((c.progress_percent() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn empty_span_reads_complete() {
        let c = clock(0);
        assert!(c.at_end());
        assert_eq!(c.progress_percent(), 100.0);
    }

    #[test]
    fn speed_round_trips_through_serde() {
        let json = serde_json::to_string(&SpeedMultiplier::DayPerSecond).unwrap();
        assert_eq!(json, "\"day_per_second\"");
        let back: SpeedMultiplier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SpeedMultiplier::DayPerSecond);
    }
}
