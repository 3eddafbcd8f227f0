//! Infrastructure layer for encoder-bridge.
//!
//! # Responsibilities
//!
//! - Opening and re-opening the outbound WebSocket connection
//! - Writing JSON text frames and draining anything the server sends back
//! - Reading the encoder and button (GPIO pins, or stdin during development)
//! - Loading the optional TOML config file
//!
//! # What does NOT belong here?
//!
//! - Deciding which record an event produces (that is the application layer)
//! - Configuration defaults and validation (that is the domain layer)

pub mod config_file;
pub mod connection;
pub mod input_source;

pub use connection::{ConnectionManager, ConnectionState, WsConnector};
pub use input_source::InputSource;
