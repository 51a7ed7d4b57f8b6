//! Frame counting and logical timestamps
//!
//! The optimizer runs off an external per-frame tick, so time is measured in
//! frames and in a monotonic stamp counter rather than wall-clock instants.
//! Stamps are strictly increasing, which keeps LRU ordering deterministic even
//! when many cache touches land in the same millisecond.

/// Monotonic frame counter plus a logical clock for "last used" stamps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    frame: u64,
    stamp: u64,
}

impl FrameClock {
    /// Create a clock at frame 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next frame and return its number (first frame is 1)
    pub fn begin_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    /// Current frame number (0 before the first tick)
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Produce the next logical timestamp
    pub fn stamp(&mut self) -> u64 {
        self.stamp += 1;
        self.stamp
    }

    /// Most recently issued timestamp
    pub fn last_stamp(&self) -> u64 {
        self.stamp
    }
}
