//! Encoder bridge entry point.
//!
//! Reads a rotary encoder and a push button and forwards each interaction to
//! a WebSocket server as a JSON text frame:
//!
//! ```text
//! {"type":"encoder","value":1}       one detent clockwise
//! {"type":"encoder","value":-1}      one detent counter-clockwise
//! {"type":"button","value":"pressed"}
//! ```
//!
//! # Usage
//!
//! ```text
//! encoder-bridge [OPTIONS]
//!
//! Options:
//!   --config <PATH>              TOML config file
//!   --endpoint <URL>             WebSocket server [default: ws://localhost:8080]
//!   --backoff-secs <SECS>        Wait between connection attempts [default: 2]
//!   --channel-capacity <N>       Records buffered for the connection task [default: 64]
//!   --clk-pin <BCM>              Encoder CLK pin [default: 17]
//!   --dt-pin <BCM>               Encoder DT pin [default: 18]
//!   --button-pin <BCM>           Button pin [default: 27]
//!   --button-debounce-ms <MS>    Ignore repeat presses inside this window
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                          | Flag                   |
//! |-----------------------------------|------------------------|
//! | `ENCODER_BRIDGE_CONFIG`           | `--config`             |
//! | `ENCODER_BRIDGE_ENDPOINT`         | `--endpoint`           |
//! | `ENCODER_BRIDGE_BACKOFF_SECS`     | `--backoff-secs`       |
//! | `ENCODER_BRIDGE_CHANNEL_CAPACITY` | `--channel-capacity`   |
//! | `ENCODER_BRIDGE_CLK_PIN`          | `--clk-pin`            |
//! | `ENCODER_BRIDGE_DT_PIN`           | `--dt-pin`             |
//! | `ENCODER_BRIDGE_BUTTON_PIN`       | `--button-pin`         |
//! | `ENCODER_BRIDGE_DEBOUNCE_MS`      | `--button-debounce-ms` |
//!
//! Precedence, lowest first: built-in defaults, config file, environment,
//! CLI flags.
//!
//! Without the `gpio` feature the bridge reads commands from stdin instead of
//! the pins (`+`, `-`, an absolute position, or `p` for a press).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use encoder_bridge::application::EventDispatcher;
use encoder_bridge::domain::BridgeConfig;
use encoder_bridge::infrastructure::config_file::FileConfig;
use encoder_bridge::infrastructure::{ConnectionManager, InputSource, WsConnector};

/// How long shutdown waits for the connection task to close the socket.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Forwards rotary encoder and button events to a WebSocket server.
#[derive(Debug, Parser)]
#[command(
    name = "encoder-bridge",
    about = "Forwards rotary encoder and button events to a WebSocket server as JSON",
    version
)]
struct Cli {
    /// TOML config file.  Flags and environment variables override its values.
    #[arg(long, env = "ENCODER_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// WebSocket URL of the receiving server (`ws://` only).
    #[arg(long, env = "ENCODER_BRIDGE_ENDPOINT")]
    endpoint: Option<String>,

    /// Seconds to wait between failed connection attempts.
    #[arg(long, env = "ENCODER_BRIDGE_BACKOFF_SECS")]
    backoff_secs: Option<u64>,

    /// Records buffered between the input thread and the connection task.
    #[arg(long, env = "ENCODER_BRIDGE_CHANNEL_CAPACITY")]
    channel_capacity: Option<usize>,

    /// BCM pin of the encoder CLK contact.
    #[arg(long, env = "ENCODER_BRIDGE_CLK_PIN")]
    clk_pin: Option<u8>,

    /// BCM pin of the encoder DT contact.
    #[arg(long, env = "ENCODER_BRIDGE_DT_PIN")]
    dt_pin: Option<u8>,

    /// BCM pin of the push button.
    #[arg(long, env = "ENCODER_BRIDGE_BUTTON_PIN")]
    button_pin: Option<u8>,

    /// Ignore button presses closer together than this many milliseconds.
    /// `0` disables debouncing.
    #[arg(long, env = "ENCODER_BRIDGE_DEBOUNCE_MS")]
    button_debounce_ms: Option<u64>,
}

impl Cli {
    /// Layers the config file and the flags over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the merged
    /// configuration is invalid.
    fn into_bridge_config(self) -> anyhow::Result<BridgeConfig> {
        let mut config = BridgeConfig::default();
        if let Some(path) = &self.config {
            config = FileConfig::load(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?
                .apply(config);
        }

        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(secs) = self.backoff_secs {
            config.reconnect_backoff = Duration::from_secs(secs);
        }
        if let Some(capacity) = self.channel_capacity {
            config.channel_capacity = capacity;
        }
        if let Some(clk) = self.clk_pin {
            config.pins.clk = clk;
        }
        if let Some(dt) = self.dt_pin {
            config.pins.dt = dt;
        }
        if let Some(button) = self.button_pin {
            config.pins.button = button;
        }
        if let Some(ms) = self.button_debounce_ms {
            config.pins.button_debounce = (ms > 0).then(|| Duration::from_millis(ms));
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[cfg(all(feature = "gpio", target_os = "linux"))]
fn input_source(config: &BridgeConfig) -> Box<dyn InputSource> {
    use encoder_bridge::infrastructure::input_source::gpio::GpioInputSource;
    Box::new(GpioInputSource::new(config.pins.clone()))
}

#[cfg(not(all(feature = "gpio", target_os = "linux")))]
fn input_source(_config: &BridgeConfig) -> Box<dyn InputSource> {
    use encoder_bridge::infrastructure::input_source::stdin::StdinInputSource;
    info!("GPIO support not built in; reading commands from stdin (+, -, <position>, p)");
    Box::new(StdinInputSource::new())
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. Logging is initialised from `RUST_LOG` (default `info`).
/// 2. The configuration is assembled and validated.
/// 3. The input source starts; its events are translated on a blocking
///    thread and queued for the connection task.
/// 4. The connection task connects (retrying forever) and sends every record.
/// 5. Ctrl+C stops the input source, which drains the pipeline and closes the
///    socket.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_bridge_config()?;
    info!(
        "encoder bridge starting: endpoint={}, backoff={:?}",
        config.endpoint, config.reconnect_backoff
    );

    // ── Input side ────────────────────────────────────────────────────────────
    let source = input_source(&config);
    let events = source.start().context("failed to start input source")?;
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let dispatcher = EventDispatcher::new(tx, source.initial_position());
    let dispatch_task = tokio::task::spawn_blocking(move || dispatcher.run(events));

    // ── Connection side ───────────────────────────────────────────────────────
    let mut manager = ConnectionManager::new(
        WsConnector::new(config.endpoint.clone()),
        config.reconnect_backoff,
    );
    let mut manager_task = tokio::spawn(async move {
        manager.run(rx).await;
        manager.close().await;
    });

    let manager_finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("received Ctrl+C, shutting down"),
                Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
            }
            false
        }
        result = &mut manager_task => {
            if let Err(e) = result {
                warn!("connection task ended unexpectedly: {e}");
            }
            true
        }
    };

    // ── Shutdown ──────────────────────────────────────────────────────────────
    source.stop();
    if let Err(e) = dispatch_task.await {
        warn!("event dispatcher panicked: {e}");
    }
    if !manager_finished
        && tokio::time::timeout(SHUTDOWN_GRACE, &mut manager_task)
            .await
            .is_err()
    {
        // Still waiting for a server that is not there.
        manager_task.abort();
    }

    info!("encoder bridge stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("encoder-bridge").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_without_flags_leaves_everything_unset() {
        // Arrange / Act
        let cli = cli(&[]);

        // Assert
        assert!(cli.endpoint.is_none());
        assert!(cli.backoff_secs.is_none());
        assert!(cli.clk_pin.is_none());
    }

    #[test]
    fn test_into_bridge_config_defaults() {
        let config = cli(&[]).into_bridge_config().unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_cli_endpoint_override() {
        let config = cli(&["--endpoint", "ws://10.0.0.5:9000"])
            .into_bridge_config()
            .unwrap();
        assert_eq!(config.endpoint, "ws://10.0.0.5:9000");
    }

    #[test]
    fn test_cli_backoff_override() {
        let config = cli(&["--backoff-secs", "5"]).into_bridge_config().unwrap();
        assert_eq!(config.reconnect_backoff, Duration::from_secs(5));
    }

    #[test]
    fn test_cli_pin_overrides() {
        // Arrange
        let cli = cli(&["--clk-pin", "5", "--dt-pin", "6", "--button-pin", "13"]);

        // Act
        let config = cli.into_bridge_config().unwrap();

        // Assert
        assert_eq!(
            (config.pins.clk, config.pins.dt, config.pins.button),
            (5, 6, 13)
        );
    }

    #[test]
    fn test_cli_debounce_override() {
        let config = cli(&["--button-debounce-ms", "25"])
            .into_bridge_config()
            .unwrap();
        assert_eq!(config.pins.button_debounce, Some(Duration::from_millis(25)));
    }

    #[test]
    fn test_into_bridge_config_rejects_non_ws_endpoint() {
        let result = cli(&["--endpoint", "http://localhost:8080"]).into_bridge_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_into_bridge_config_rejects_zero_backoff() {
        let result = cli(&["--backoff-secs", "0"]).into_bridge_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_into_bridge_config_rejects_shared_pin() {
        let result = cli(&["--dt-pin", "17"]).into_bridge_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_into_bridge_config_missing_config_file_is_an_error() {
        let result = cli(&["--config", "/nonexistent/encoder-bridge.toml"]).into_bridge_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        // Arrange
        let path = std::env::temp_dir().join(format!(
            "encoder-bridge-main-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "endpoint = \"ws://from-file:8080\"\nreconnect_backoff_secs = 7\n",
        )
        .unwrap();
        let path_arg = path.to_string_lossy().into_owned();

        // Act
        let config = cli(&["--config", &path_arg, "--endpoint", "ws://from-flag:8080"])
            .into_bridge_config();
        let _ = std::fs::remove_file(&path);

        // Assert
        let config = config.unwrap();
        assert_eq!(config.endpoint, "ws://from-flag:8080");
        assert_eq!(config.reconnect_backoff, Duration::from_secs(7));
    }
}
