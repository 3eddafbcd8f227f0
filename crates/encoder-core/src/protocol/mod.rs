//! Protocol module containing the JSON wire messages.

pub mod messages;

pub use messages::*;
