use crate::constants::MAX_FRAME_DT_SEC;
use instant::Instant;

/// Timing for one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    pub dt: f32,
    pub elapsed: f32,
    pub frame: u64,
}

/// Turns wall-clock instants into clamped per-frame deltas.
#[derive(Debug)]
pub struct FrameClock {
    last: Option<Instant>,
    elapsed: f32,
    frame: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: None,
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Sample the wall clock. The first tick has a zero delta.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let raw = self
            .last
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last = Some(now);
        self.advance(raw)
    }

    /// Advance by an externally measured delta, e.g. from a
    /// `requestAnimationFrame` timestamp.
    pub fn advance(&mut self, raw_dt: f32) -> FrameTime {
        let dt = if raw_dt.is_finite() {
            raw_dt.clamp(0.0, MAX_FRAME_DT_SEC)
        } else {
            0.0
        };
        self.elapsed += dt;
        self.frame += 1;
        FrameTime {
            dt,
            elapsed: self.elapsed,
            frame: self.frame,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Forget the last instant so a resumed loop does not see the pause as
    /// one long frame.
    pub fn pause(&mut self) {
        self.last = None;
    }
}
