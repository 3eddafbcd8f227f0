//! Domain layer for encoder-core.
//!
//! Pure types describing what the hardware reports and how consecutive
//! readings become directions.  Nothing here performs I/O.

pub mod button;
pub mod event;
pub mod quadrature;
pub mod tracker;

pub use button::ButtonDebouncer;
pub use event::HardwareEvent;
pub use quadrature::{PinLevels, QuadratureDecoder};
pub use tracker::EncoderTracker;
