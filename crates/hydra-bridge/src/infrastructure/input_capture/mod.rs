//! Input capture infrastructure for the bridge.
//!
//! Platform hooks (low-level keyboard and mouse hooks on Windows) run on a
//! thread owned by the operating system.  They must return quickly, so they
//! only push [`RawInputEvent`]s into an unbounded channel; the Tokio side
//! drains it and feeds the `ForwardInputUseCase`.
//!
//! # Testability
//!
//! The [`InputSource`] and `CursorController` traits let the binary and the
//! tests run with [`mock::MockInputSource`] and [`mock::MockCursor`] instead of
//! real hooks.

use tokio::sync::mpsc::UnboundedReceiver;

pub use crate::application::forward_input::{MouseButton, RawInputEvent};

pub mod mock;

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to install input hook: {0}")]
    HookInstallFailed(String),
    #[error("capture source has already been started")]
    AlreadyStarted,
}

/// Trait abstracting input event production.
pub trait InputSource: Send + Sync {
    /// Starts the source and returns the receiving end of its event channel.
    fn start(&self) -> Result<UnboundedReceiver<RawInputEvent>, CaptureError>;
    /// Stops the source; the channel closes once pending events are drained.
    fn stop(&self);
}
