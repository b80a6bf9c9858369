//! One-slot frame mailboxes.

use parking_lot::Mutex;

use crate::frame::Frame;

/// The handoff point between one universe's ingest adapter and the render
/// dispatcher.
///
/// Holds at most one frame. Publishing replaces any unconsumed frame, so a
/// consumer that falls behind sees only the newest data and never a backlog.
/// Neither side blocks beyond the mutex itself.
#[derive(Debug, Default)]
pub struct FrameSlot {
    slot: Mutex<Option<Frame>>,
}

impl FrameSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a frame, replacing any unconsumed one.
    pub fn publish(&self, frame: Frame) {
        *self.slot.lock() = Some(frame);
    }

    /// Take the pending frame, leaving the slot empty.
    pub fn take(&self) -> Option<Frame> {
        self.slot.lock().take()
    }

    /// Discard any pending frame.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// Whether a frame is waiting to be consumed.
    pub fn is_pending(&self) -> bool {
        self.slot.lock().is_some()
    }
}
