//! Frame time sources and the scaled uniform clock.

use std::time::Instant;

use crate::error::{Error, Result};

/// Source of host elapsed seconds, sampled once per frame
pub trait TimeSource {
    fn elapsed_s(&mut self) -> f32;
}

/// Monotonic wall clock started at construction
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallClock {
    fn elapsed_s(&mut self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Deterministic clock for recording: frame `n` reports `n / fps`
pub struct FixedStepClock {
    fps: u32,
    frame: u64,
}

impl FixedStepClock {
    pub fn new(fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(Error::InvalidConfig("fps must be at least 1".to_string()));
        }
        Ok(Self { fps, frame: 0 })
    }
}

impl TimeSource for FixedStepClock {
    fn elapsed_s(&mut self) -> f32 {
        let t = self.frame as f64 / f64::from(self.fps);
        self.frame += 1;
        t as f32
    }
}

/// Turns host elapsed seconds into the surface's uniform time
///
/// Scales by `time_scale` and never goes backwards.
pub struct FrameTimer<S: TimeSource> {
    source: S,
    time_scale: f32,
    last: f32,
}

impl<S: TimeSource> FrameTimer<S> {
    pub fn new(source: S, time_scale: f32) -> Self {
        Self {
            source,
            time_scale,
            last: 0.0,
        }
    }

    /// Uniform time for the next frame
    pub fn tick(&mut self) -> f32 {
        let time = self.source.elapsed_s() * self.time_scale;
        self.last = self.last.max(time);
        self.last
    }
}
