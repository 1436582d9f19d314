//! Infrastructure layer for the dongle.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `hydra_core`, but MUST NOT be imported by the `application` layer.
//!
//! - **`serial`** – The command processor that owns the serial link: frame
//!   reading, text command execution, verbose `log: ` mirroring, and the
//!   interactive emulation sub-loop.
//!
//! - **`loopback`** – In-process implementations of the stack ports, used by
//!   the simulator binary and by tests.

pub mod loopback;
pub mod serial;
