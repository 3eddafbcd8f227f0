//! # encoder-core
//!
//! Shared library for the encoder bridge containing the JSON wire messages and
//! the pure logic that turns raw encoder readings into directions.
//!
//! This crate has zero dependencies on GPIO drivers, sockets, or async
//! runtimes, so everything in it can be tested with plain `#[test]` functions.
//!
//! # Architecture overview
//!
//! The bridge reads a rotary encoder and a push button and forwards each
//! interaction to a WebSocket server as a small JSON record.  This crate holds
//! the two halves of that translation that do not touch hardware or network:
//!
//! - **`protocol`** – The records that travel over the wire
//!   (`{"type":"encoder","value":1}`, `{"type":"button","value":"pressed"}`)
//!   and their JSON encoding.
//!
//! - **`domain`** – Hardware events as the input source reports them, the
//!   [`EncoderTracker`] that derives a direction from consecutive position
//!   readings, and the [`QuadratureDecoder`] that turns CLK/DT pin levels
//!   into detent steps, plus the [`ButtonDebouncer`] that turns button
//!   samples into presses.

pub mod domain;
pub mod protocol;

pub use domain::button::ButtonDebouncer;
pub use domain::event::HardwareEvent;
pub use domain::quadrature::{PinLevels, QuadratureDecoder};
pub use domain::tracker::EncoderTracker;
pub use protocol::messages::{ButtonAction, Direction, InputMessage, MessageError};
