//! In-process input source and cursor.
//!
//! Used by the console binary on hosts without hook support and by tests to
//! inject synthetic events.

use std::sync::Mutex;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{CaptureError, InputSource, RawInputEvent};
use crate::application::forward_input::CursorController;

/// An [`InputSource`] fed by [`MockInputSource::inject_event`].
#[derive(Default)]
pub struct MockInputSource {
    sender: Mutex<Option<UnboundedSender<RawInputEvent>>>,
}

impl MockInputSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Returns `false` when the source is not started or the receiver is gone.
    pub fn inject_event(&self, event: RawInputEvent) -> bool {
        let guard = self.sender.lock().expect("lock poisoned");
        match guard.as_ref() {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }
}

impl InputSource for MockInputSource {
    fn start(&self) -> Result<UnboundedReceiver<RawInputEvent>, CaptureError> {
        let mut guard = self.sender.lock().expect("lock poisoned");
        if guard.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *guard = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Dropping the sender closes the channel.
        *self.sender.lock().expect("lock poisoned") = None;
    }
}

/// A cursor that only remembers where it was put.
pub struct MockCursor {
    pos: Mutex<(i32, i32)>,
}

impl MockCursor {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            pos: Mutex::new((x, y)),
        }
    }
}

impl CursorController for MockCursor {
    fn teleport_cursor(&self, x: i32, y: i32) {
        *self.pos.lock().expect("lock poisoned") = (x, y);
    }

    fn get_cursor_pos(&self) -> (i32, i32) {
        *self.pos.lock().expect("lock poisoned")
    }
}
