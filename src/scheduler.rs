#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

/// The host's per-frame callback mechanism, in the shape of
/// `requestAnimationFrame` / `cancelAnimationFrame`: the core asks for one
/// future frame at a time and may withdraw the request.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequestId;

    fn cancel_frame(&mut self, id: FrameRequestId);
}

/// Scheduler for hosts that pump frames themselves. It only remembers the
/// outstanding request; the host checks [`ManualScheduler::pending`] and calls
/// `SceneManager::frame` when it wants to.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameRequestId>,
    requested: usize,
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameRequestId> {
        self.pending
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequestId {
        let id = FrameRequestId(self.next_id);
        self.next_id += 1;
        self.pending = Some(id);
        self.requested += 1;
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        if self.pending == Some(id) {
            self.pending = None;
            self.cancelled += 1;
        } else {
            log::warn!("Cancelling frame request {:?} that is not pending", id);
        }
    }
}
