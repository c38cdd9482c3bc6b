use foundation::time::Time;

/// Longest step a single frame may advance scene time by.
///
/// A backgrounded tab or a stalled ticker resumes with one bounded step
/// instead of a jump.
pub const MAX_FRAME_DT_S: f64 = 0.25;

/// Display-frame metadata.
///
/// The per-frame rotation deltas and the highlight timers are all driven from
/// this; nothing in the scene reads the wall clock directly.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame, clamped to [`MAX_FRAME_DT_S`].
    pub dt_s: f64,
    /// Scene time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn first(dt_s: f64) -> Self {
        Self {
            index: 0,
            dt_s: clamp_dt(dt_s),
            time: Time(0.0),
        }
    }

    /// The frame following `self`, `dt_s` seconds later.
    pub fn next(self, dt_s: f64) -> Self {
        let dt_s = clamp_dt(dt_s);
        Self {
            index: self.index + 1,
            dt_s,
            time: self.time.after(dt_s),
        }
    }
}

fn clamp_dt(dt_s: f64) -> f64 {
    if dt_s.is_finite() {
        dt_s.clamp(0.0, MAX_FRAME_DT_S)
    } else {
        0.0
    }
}
