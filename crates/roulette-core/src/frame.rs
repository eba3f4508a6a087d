//! Frame timing fed by the host's animation-frame timestamps.

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Host timestamp of this frame, in milliseconds.
    pub now_ms: f64,
    /// Clamped time since the previous frame, in milliseconds.
    pub dt_ms: f64,
    pub frame_index: u64,
    /// Frames per second over the last completed sample window.
    pub fps: f64,
}

/// Produces [`FrameTime`]s from monotonic millisecond timestamps.
///
/// Delta time is clamped so a backgrounded tab or a debugger pause does not
/// hand every animation one huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    frame_index: u64,
    dt_min: f64,
    dt_max: f64,
    window_ms: f64,
    window_start: Option<f64>,
    window_frames: u32,
    fps: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(0.1, 250.0)
    }

    pub fn with_clamps(dt_min: f64, dt_max: f64) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
            window_ms: 1000.0,
            window_start: None,
            window_frames: 0,
            fps: 0.0,
        }
    }

    /// Forgets the previous timestamp, e.g. after the loop was paused.
    pub fn reset(&mut self) {
        self.last = None;
        self.window_start = None;
        self.window_frames = 0;
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Advances to `now_ms`. The first tick after construction or a reset
    /// reports the minimum delta.
    pub fn tick(&mut self, now_ms: f64) -> FrameTime {
        let dt = match self.last {
            Some(last) => (now_ms - last).clamp(self.dt_min, self.dt_max),
            None => self.dt_min,
        };
        self.last = Some(now_ms);

        let start = *self.window_start.get_or_insert(now_ms);
        self.window_frames += 1;
        let span = now_ms - start;
        if span >= self.window_ms {
            self.fps = (f64::from(self.window_frames) * 1000.0 / span).round();
            self.window_start = Some(now_ms);
            self.window_frames = 0;
        }

        let time = FrameTime {
            now_ms,
            dt_ms: dt,
            frame_index: self.frame_index,
            fps: self.fps,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        time
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

    #[test]
    fn test_delta_is_clamped() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1000.0).dt_ms, 0.1);
        assert_eq!(clock.tick(1016.0).dt_ms, 16.0);
        assert_eq!(clock.tick(1016.0).dt_ms, 0.1);
        assert_eq!(clock.tick(60_000.0).dt_ms, 250.0);
    }

    #[test]
    fn test_frame_index_counts_up() {
        let mut clock = FrameClock::new();
        let indices: Vec<_> = (0..3).map(|i| clock.tick(f64::from(i) * 16.0).frame_index).collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn test_fps_sampled_per_window() {
        let mut clock = FrameClock::new();
        let mut last = FrameTime {
            now_ms: 0.0,
            dt_ms: 0.0,
            frame_index: 0,
            fps: 0.0,
        };
        // 60 Hz for a bit over one second.
        for i in 0..=61 {
            last = clock.tick(f64::from(i) * 1000.0 / 60.0);
        }
        assert!((last.fps - 60.0).abs() <= 1.0, "fps = {}", last.fps);
    }

    #[test]
    fn test_reset_restarts_delta() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.tick(16.0);
        clock.reset();
        assert_eq!(clock.tick(5_000.0).dt_ms, 0.1);
    }
}
