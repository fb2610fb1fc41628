use std::time::Duration;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Host timestamp of the tick, in milliseconds.
    pub now_ms: f64,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots from host timestamps.
///
/// Hosts report frame timestamps in milliseconds (the same unit as
/// `requestAnimationFrame`); deltas are reported in seconds.
///
/// The first tick has no predecessor and reports `dt = 0`. Deltas are clamped
/// to `[dt_min, dt_max]`; by default that is `[0, unbounded]`, so a late frame
/// still reports the full elapsed time.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock. Backwards timestamps yield a zero delta; forward
    /// deltas are not capped.
    pub fn new() -> Self {
        Self::with_clamps(Duration::ZERO, Duration::MAX)
    }

    /// Creates a clock with custom delta-time clamps, e.g. to cap the step
    /// after a suspended host resumes.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last_ms: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Forgets the previous timestamp; the next tick reports `dt = 0`.
    ///
    /// Useful when resuming from suspension.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Advances the clock to `now_ms` and returns a new `FrameTime`.
    pub fn tick_at(&mut self, now_ms: f64) -> FrameTime {
        let dt = match self.last_ms {
            None => 0.0,
            Some(prev) => {
                let raw = now_ms * 0.001 - prev * 0.001;
                raw.clamp(self.dt_min.as_secs_f64(), self.dt_max.as_secs_f64())
            }
        };

        self.last_ms = Some(now_ms);

        let ft = FrameTime {
            dt: dt as f32,
            now_ms,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn first_tick_has_zero_delta() {
        let mut clock = FrameClock::new();
        let ft = clock.tick_at(12_345.0);
        assert_eq!(ft.dt, 0.0);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn milliseconds_scale_to_seconds() {
        let mut clock = FrameClock::new();
        clock.tick_at(1000.0);
        let ft = clock.tick_at(1016.0);
        assert!(close(ft.dt, 0.016), "dt = {}", ft.dt);
        assert_eq!(ft.frame_index, 1);
        assert_eq!(ft.now_ms, 1016.0);
    }

    #[test]
    fn backwards_timestamp_clamps_to_zero() {
        let mut clock = FrameClock::new();
        clock.tick_at(500.0);
        assert_eq!(clock.tick_at(400.0).dt, 0.0);
    }

    #[test]
    fn long_gap_is_reported_in_full() {
        let mut clock = FrameClock::new();
        clock.tick_at(0.0);
        assert!(close(clock.tick_at(1000.0).dt, 1.0));
        assert!(close(clock.tick_at(11_000.0).dt, 10.0));
    }

    #[test]
    fn opt_in_cap_limits_long_gaps() {
        let mut clock = FrameClock::with_clamps(Duration::ZERO, Duration::from_millis(250));
        clock.tick_at(0.0);
        assert!(close(clock.tick_at(10_000.0).dt, 0.25));
    }

    #[test]
    fn custom_clamps_apply() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_secs(5));
        clock.tick_at(0.0);
        assert!(close(clock.tick_at(0.0).dt, 0.001));
        assert!(close(clock.tick_at(3000.0).dt, 3.0));
    }

    #[test]
    fn reset_forgets_previous_timestamp() {
        let mut clock = FrameClock::new();
        clock.tick_at(0.0);
        clock.reset();
        let ft = clock.tick_at(100.0);
        assert_eq!(ft.dt, 0.0);
        assert_eq!(ft.frame_index, 1);
    }
}
