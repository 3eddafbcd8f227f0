//! Domain layer for encoder-bridge.
//!
//! Plain configuration types that the infrastructure layer fills in from CLI
//! arguments, environment variables, or a TOML file.

pub mod config;

pub use config::{BridgeConfig, InvalidConfig, PinConfig};
