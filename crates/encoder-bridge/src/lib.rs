//! encoder-bridge library crate.
//!
//! Reads a rotary encoder and a push button and forwards every interaction to
//! a WebSocket server as a one-line JSON record, reconnecting forever when the
//! server goes away.
//!
//! # Architecture
//!
//! ```text
//! Input source (GPIO pins / stdin)          hardware thread
//!         │  std::sync::mpsc<HardwareEvent>
//!         ▼
//! [application::dispatch]                   blocking thread
//!   EventDispatcher: HardwareEvent → InputMessage
//!         │  tokio::sync::mpsc<InputMessage> (try_send, never blocks)
//!         ▼
//! [infrastructure::connection]              tokio task
//!   ConnectionManager: ensure_connected / send / reconnect
//!         │  JSON text frames
//!         ▼
//! WebSocket server
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O: configuration values and their validation.
//! - `application` depends on `domain` and `encoder-core` only.
//! - `infrastructure` owns sockets, threads and files.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: hardware event translation.
pub mod application;

/// Infrastructure layer: WebSocket connection, input sources, config file.
pub mod infrastructure;
