//! Converts protocol payloads into frames for one universe's mailbox.

use std::sync::Arc;

use tracing::trace;

use crate::frame::Frame;
use crate::mailbox::FrameSlot;
use crate::mode::{Mode, ModeSwitch};
use crate::universe::UniverseId;

/// One universe's ingest callback target.
///
/// The protocol layer invokes [`submit`](IngestAdapter::submit) once per
/// arriving payload, from its own delivery thread. Payloads arriving
/// outside Show mode, and payloads holding no complete RGB triple, are
/// dropped without error.
#[derive(Clone)]
pub struct IngestAdapter {
    universe: UniverseId,
    mode: Arc<ModeSwitch>,
    inbox: Arc<FrameSlot>,
}

impl IngestAdapter {
    /// Create the adapter for `universe`.
    pub fn new(universe: UniverseId, mode: Arc<ModeSwitch>, inbox: Arc<FrameSlot>) -> Self {
        Self {
            universe,
            mode,
            inbox,
        }
    }

    /// Decode `payload` and publish it to the universe's mailbox, replacing
    /// any unconsumed frame.
    pub fn submit(&self, payload: &[u8]) {
        if self.mode.current() != Mode::Show {
            trace!(
                "universe {}: dropped payload outside show mode",
                self.universe
            );
            return;
        }
        match Frame::decode(payload) {
            Some(frame) => self.inbox.publish(frame),
            None => trace!(
                "universe {}: dropped {}-byte payload with no complete triple",
                self.universe,
                payload.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(initial: Mode) -> (IngestAdapter, Arc<FrameSlot>) {
        let mode = Arc::new(ModeSwitch::new(initial));
        let inbox = Arc::new(FrameSlot::new());
        (
            IngestAdapter::new(1, mode, Arc::clone(&inbox)),
            inbox,
        )
    }

    #[test]
    fn test_submit_publishes_in_show_mode() {
        let (adapter, inbox) = adapter(Mode::Show);
        adapter.submit(&[10, 20, 30]);
        let frame = inbox.take().unwrap();
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_submit_drops_payload_in_loop_mode() {
        let (adapter, inbox) = adapter(Mode::Loop);
        adapter.submit(&[10, 20, 30]);
        assert!(inbox.take().is_none());
    }

    #[test]
    fn test_submit_drops_undecodable_payload() {
        let (adapter, inbox) = adapter(Mode::Show);
        adapter.submit(&[10, 20]);
        assert!(inbox.take().is_none());
    }

    #[test]
    fn test_submit_overwrites_unconsumed_frame() {
        let (adapter, inbox) = adapter(Mode::Show);
        adapter.submit(&[1, 1, 1]);
        adapter.submit(&[2, 2, 2]);
        let frame = inbox.take().unwrap();
        assert_eq!(frame.pixels()[0].r, 2);
        assert!(inbox.take().is_none());
    }
}
