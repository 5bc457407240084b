//! Frame timing
//!
//! Converts driver timestamps into bounded per-frame deltas.

use crate::consts::MAX_FRAME_DT;

/// Clamp an elapsed-time value into `[0, MAX_FRAME_DT]`.
///
/// Negative and non-finite inputs become zero.
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt.min(MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Tracks the previous frame timestamp.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Elapsed seconds since the previous call, clamped.
    ///
    /// The first call after construction or `rebaseline` yields zero.
    pub fn delta(&mut self, now_secs: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (now_secs - last) as f32,
            None => 0.0,
        };
        self.last = Some(now_secs);
        clamp_dt(dt)
    }

    /// Forget the previous timestamp so the next delta starts from zero
    pub fn rebaseline(&mut self) {
        self.last = None;
    }
}
