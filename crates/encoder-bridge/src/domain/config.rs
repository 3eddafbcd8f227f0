//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for all runtime settings.
//! Its defaults reproduce the fixed constants of a stock installation: server
//! at `ws://localhost:8080`, a two-second reconnect backoff, and the encoder
//! on BCM pins 17 (CLK) / 18 (DT) with the button on pin 27.
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! reads here) makes the bridge easy to embed in tests.  `main.rs` is
//! responsible for layering the TOML file, environment, and CLI on top.

use std::time::Duration;

use thiserror::Error;

/// A configuration value that the bridge cannot run with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidConfig {
    /// The endpoint is not a plain `ws://` URL with a host.
    #[error("endpoint '{0}' must be a ws:// URL with a host")]
    Endpoint(String),

    /// A zero backoff would turn the reconnect loop into a busy loop.
    #[error("reconnect backoff must be greater than zero")]
    ZeroBackoff,

    /// Bounded channels need room for at least one message.
    #[error("channel capacity must be at least 1")]
    ZeroCapacity,

    /// Two inputs were assigned the same GPIO pin.
    #[error("GPIO pin {0} is assigned more than once")]
    DuplicatePin(u8),
}

/// GPIO pin assignment (BCM numbering) for the encoder and button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinConfig {
    /// Encoder CLK (A) contact.
    pub clk: u8,
    /// Encoder DT (B) contact.
    pub dt: u8,
    /// Push button contact.
    pub button: u8,
    /// Ignore further presses for this long after one is reported.
    pub button_debounce: Option<Duration>,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            clk: 17,
            dt: 18,
            button: 27,
            button_debounce: None,
        }
    }
}

/// All runtime configuration for the bridge.
///
/// # Example
///
/// ```rust
/// use encoder_bridge::domain::BridgeConfig;
///
/// let cfg = BridgeConfig::default();
/// assert_eq!(cfg.endpoint, "ws://localhost:8080");
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// WebSocket URL of the server that receives the JSON records.
    pub endpoint: String,

    /// Fixed wait between failed connection attempts.  There is no maximum
    /// number of attempts and no exponential growth.
    pub reconnect_backoff: Duration,

    /// Capacity of the channel between the event dispatcher and the
    /// connection task.  Records that do not fit are dropped.
    pub channel_capacity: usize,

    /// GPIO pin assignment, used by the `gpio` input source.
    pub pins: PinConfig,
}

impl Default for BridgeConfig {
    /// | Field             | Default               |
    /// |-------------------|-----------------------|
    /// | endpoint          | `ws://localhost:8080` |
    /// | reconnect_backoff | 2 seconds             |
    /// | channel_capacity  | 64                    |
    /// | pins              | CLK 17, DT 18, BTN 27 |
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:8080".to_string(),
            reconnect_backoff: Duration::from_secs(2),
            channel_capacity: 64,
            pins: PinConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Checks the values that would otherwise fail at runtime.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidConfig`] found.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        let host = self
            .endpoint
            .strip_prefix("ws://")
            .ok_or_else(|| InvalidConfig::Endpoint(self.endpoint.clone()))?;
        if host.is_empty() || host.starts_with('/') || host.starts_with(':') {
            return Err(InvalidConfig::Endpoint(self.endpoint.clone()));
        }

        if self.reconnect_backoff.is_zero() {
            return Err(InvalidConfig::ZeroBackoff);
        }
        if self.channel_capacity == 0 {
            return Err(InvalidConfig::ZeroCapacity);
        }

        let (clk, dt, button) = (self.pins.clk, self.pins.dt, self.pins.button);
        if clk == dt || clk == button {
            return Err(InvalidConfig::DuplicatePin(clk));
        }
        if dt == button {
            return Err(InvalidConfig::DuplicatePin(dt));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_is_local_port_8080() {
        // Arrange / Act
        let cfg = BridgeConfig::default();
        // Assert
        assert_eq!(cfg.endpoint, "ws://localhost:8080");
    }

    #[test]
    fn test_default_backoff_is_two_seconds() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.reconnect_backoff, Duration::from_secs(2));
    }

    #[test]
    fn test_default_pins_match_stock_wiring() {
        let pins = PinConfig::default();
        assert_eq!((pins.clk, pins.dt, pins.button), (17, 18, 27));
        assert_eq!(pins.button_debounce, None);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(BridgeConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_accepts_ip_endpoint_with_path() {
        let cfg = BridgeConfig {
            endpoint: "ws://192.168.1.20:9000/input".to_string(),
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_http_endpoint() {
        // Arrange
        let cfg = BridgeConfig {
            endpoint: "http://localhost:8080".to_string(),
            ..Default::default()
        };

        // Act
        let result = cfg.validate();

        // Assert
        assert!(matches!(result, Err(InvalidConfig::Endpoint(_))));
    }

    #[test]
    fn test_validate_rejects_tls_endpoint() {
        // The socket is plain text; there is no TLS support to fall back on.
        let cfg = BridgeConfig {
            endpoint: "wss://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(InvalidConfig::Endpoint(_))));
    }

    #[test]
    fn test_validate_rejects_endpoint_without_host() {
        for endpoint in ["ws://", "ws:///path", "ws://:8080"] {
            let cfg = BridgeConfig {
                endpoint: endpoint.to_string(),
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "{endpoint} must be rejected");
        }
    }

    #[test]
    fn test_validate_rejects_zero_backoff() {
        let cfg = BridgeConfig {
            reconnect_backoff: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(InvalidConfig::ZeroBackoff));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let cfg = BridgeConfig {
            channel_capacity: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(InvalidConfig::ZeroCapacity));
    }

    #[test]
    fn test_validate_rejects_shared_pin() {
        let cfg = BridgeConfig {
            pins: PinConfig {
                clk: 17,
                dt: 27,
                button: 27,
                button_debounce: None,
            },
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(InvalidConfig::DuplicatePin(27)));
    }
}
