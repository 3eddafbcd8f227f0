//! Application layer for encoder-bridge.
//!
//! Knows *what* to send for each hardware event, but not *how* it reaches the
//! server.
//!
//! # Responsibilities
//!
//! - Deriving encoder direction from consecutive position readings
//! - Producing exactly one record per button press
//! - Handing records to a [`MessageSink`] without ever blocking
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or retrying connections (that is infrastructure)
//! - Reading GPIO pins (that is infrastructure)

pub mod dispatch;

pub use dispatch::{EventDispatcher, MessageSink, SinkError};
