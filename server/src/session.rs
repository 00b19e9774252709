//! Match clock
//!
//! The session starts the first time the player count reaches the configured
//! threshold and never restarts afterwards. Time left is derived from wall
//! clock elapsed time, floored at zero.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct GameSession {
    started_at: Option<Instant>,
    duration: Duration,
}

impl GameSession {
    pub fn new(duration: Duration) -> Self {
        Self {
            started_at: None,
            duration,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Fixes the start timestamp if it is not set yet. Returns true only on the
    /// call that actually started the clock.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Seconds remaining at `now`; the full duration while not started.
    pub fn time_left(&self, now: Instant) -> f32 {
        match self.started_at {
            Some(started_at) => self
                .duration
                .saturating_sub(now.saturating_duration_since(started_at))
                .as_secs_f32(),
            None => self.duration.as_secs_f32(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_unstarted_session_reports_full_duration() {
        let session = GameSession::new(Duration::from_secs(300));
        assert!(!session.is_started());
        assert_approx_eq!(session.time_left(Instant::now()), 300.0);
    }

    #[test]
    fn test_start_is_fixed_once() {
        let mut session = GameSession::new(Duration::from_secs(300));
        let t0 = Instant::now();

        assert!(session.start(t0));
        assert!(!session.start(t0 + Duration::from_secs(100)));

        assert_approx_eq!(session.time_left(t0 + Duration::from_secs(100)), 200.0, 0.001);
    }

    #[test]
    fn test_time_left_decreases_then_floors_at_zero() {
        let mut session = GameSession::new(Duration::from_secs(300));
        let t0 = Instant::now();
        session.start(t0);

        let mut previous = session.time_left(t0);
        for second in (30..=300).step_by(30) {
            let left = session.time_left(t0 + Duration::from_secs(second));
            assert!(left < previous, "time left must strictly decrease");
            previous = left;
        }

        assert_eq!(session.time_left(t0 + Duration::from_secs(300)), 0.0);
        assert_eq!(session.time_left(t0 + Duration::from_secs(301)), 0.0);
        assert_eq!(session.time_left(t0 + Duration::from_secs(10_000)), 0.0);
    }

    #[test]
    fn test_time_before_start_is_not_negative_elapsed() {
        let mut session = GameSession::new(Duration::from_secs(10));
        let t0 = Instant::now() + Duration::from_secs(5);
        session.start(t0);

        assert_approx_eq!(session.time_left(Instant::now()), 10.0, 0.001);
    }
}
