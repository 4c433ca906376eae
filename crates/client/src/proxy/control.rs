//! Client-control primitive.

use std::sync::atomic::{AtomicBool, Ordering};

/// What a lifecycle handler may ask of its host besides completing the event.
pub trait ClientControl: Send + Sync {
    /// Activate the freshly installed worker without waiting for existing
    /// clients to close.
    fn skip_waiting(&self);

    /// Take control of clients that are already open.
    fn claim(&self);
}

/// In-process host control that records what was requested.
#[derive(Debug, Default)]
pub struct HostControl {
    skip_waiting: AtomicBool,
    claimed: AtomicBool,
}

impl HostControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::Acquire)
    }

    pub fn claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}

impl ClientControl for HostControl {
    fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::Release);
    }

    fn claim(&self) {
        self.claimed.store(true, Ordering::Release);
    }
}
