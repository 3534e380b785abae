use std::time::Duration;

/// Timing passed to update hooks each tick.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame; zero on the first frame after start.
    pub delta: f32,

    /// Seconds since the first frame after start.
    pub elapsed: f32,

    pub frame_index: u64,
}

/// Turns host timestamps into [`FrameTime`] snapshots.
///
/// Timestamps are whatever monotonic clock the host frame callback provides.
/// The first tick after a reset reports a zero delta so a long gap between
/// `start` and the first frame does not become one huge step.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    first: Option<Duration>,
    last: Option<Duration>,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn tick(&mut self, timestamp: Duration) -> FrameTime {
        let first = *self.first.get_or_insert(timestamp);

        // Out-of-order timestamps saturate to zero rather than going negative.
        let delta = self
            .last
            .map(|last| timestamp.saturating_sub(last))
            .unwrap_or_default();

        self.last = Some(timestamp);

        let time = FrameTime {
            delta: delta.as_secs_f32(),
            elapsed: timestamp.saturating_sub(first).as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.frame_index += 1;
        time
    }
}
