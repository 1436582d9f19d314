//! Application layer of the dongle.
//!
//! - **`stack`** – The ports the dongle logic uses to reach the wireless stack
//!   ([`stack::HidTransport`]) and the bonded-device store
//!   ([`stack::BondStore`]), plus the [`stack::StackEvent`]s the stack delivers.
//!
//! - **`central_registry`** – Which centrals are connected, their resolved
//!   identities, and which one is active.
//!
//! - **`delivery`** – The one-report-at-a-time delivery state machine and its
//!   counters.
//!
//! - **`dongle`** – Ties the registry and the engine to the stack and the bond
//!   store and applies stack events to them.

pub mod central_registry;
pub mod delivery;
pub mod dongle;
pub mod stack;
