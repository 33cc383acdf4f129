//! Gate controller engine: relay state machines, command dispatch and the
//! cooperative control loop.
//!
//! The [`Device`] bundles all controller state behind the transport-facing
//! API (`feed_byte` / `take_frame` / `handle_frame` / `tick`), with the
//! persistent store and digital outputs injected as capabilities. The
//! [`Runtime`] drives a device from an inbound byte channel and a 100 ms
//! tick, answering on a half-duplex bus.

pub mod device;
pub mod dispatch;
pub mod handlers;
pub mod relay;
pub mod runtime;

pub use device::{Device, DispatchResult};
pub use dispatch::{Handler, HandlerReply, HandlerTable, Lookup};
pub use relay::{RelayBank, RelayState};
pub use runtime::{RunExit, Runtime};
