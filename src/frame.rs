// frame.rs — per-frame tick scheduling

/// Identifies which camera transition a scheduled tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
    pub generation: u64,
}

/// Something that can run a tick right before the next display refresh.
pub trait FrameScheduler {
    fn request_tick(&mut self, token: TickToken);
}

/// Ticks queued for the next redraw. The event loop drains it in
/// `RedrawRequested` and hands each token back to its owner.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: Vec<TickToken>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every tick requested so far. Ticks requested while the
    /// returned batch is being processed land in the next frame.
    pub fn take_due(&mut self) -> Vec<TickToken> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_tick(&mut self, token: TickToken) {
        self.pending.push(token);
    }
}
