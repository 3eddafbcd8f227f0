//! Input sources for the encoder and button.
//!
//! An input source runs on its own thread (hardware callbacks or a blocking
//! read loop) and places [`HardwareEvent`]s into a `std::sync::mpsc` channel.
//! The event dispatcher consumes that channel on a separate blocking thread,
//! so nothing here ever waits on the network.
//!
//! # Implementations
//!
//! - [`gpio::GpioInputSource`]: Raspberry Pi pins via `rppal` (feature `gpio`).
//! - [`stdin::StdinInputSource`]: line commands on stdin, for development.
//! - [`mock::MockInputSource`]: synthetic events for tests.

use std::sync::mpsc;

use encoder_core::HardwareEvent;

#[cfg(all(feature = "gpio", target_os = "linux"))]
pub mod gpio;
pub mod mock;
pub mod stdin;

/// Error type for input source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The GPIO controller or a pin could not be opened.
    #[error("GPIO error: {0}")]
    Gpio(String),
    /// `start` was called twice without `stop`.
    #[error("input source is already running")]
    AlreadyStarted,
    /// The reader thread could not be spawned.
    #[error("failed to spawn input thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Trait abstracting the hardware that produces encoder and button events.
pub trait InputSource: Send {
    /// Starts producing events and returns the receiving end.
    fn start(&self) -> Result<mpsc::Receiver<HardwareEvent>, SourceError>;

    /// Stops producing events.  The receiver returned by `start` disconnects.
    fn stop(&self);

    /// Encoder position at start-up, used as the first comparison baseline.
    fn initial_position(&self) -> i64 {
        0
    }
}
