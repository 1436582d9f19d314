//! Infrastructure layer for the bridge.
//!
//! Contains OS-facing adapters: the serial link to the dongle, input capture
//! hooks, configuration file storage, and the operator console parser.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `hydra_core`, but MUST NOT be imported by the `application` layer.

pub mod console;
pub mod input_capture;
pub mod serial;
pub mod storage;
