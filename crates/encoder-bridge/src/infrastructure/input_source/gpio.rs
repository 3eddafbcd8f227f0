//! Raspberry Pi GPIO input source (feature `gpio`, Linux only).
//!
//! All three pins are configured as inputs with the internal pull-up enabled.
//! A dedicated thread owns the pins and samples them every
//! [`POLL_INTERVAL`]; encoder levels go through a [`QuadratureDecoder`] and
//! the button level through a [`ButtonDebouncer`].

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::time::{Duration, Instant};

use encoder_core::{ButtonDebouncer, HardwareEvent, PinLevels, QuadratureDecoder};
use rppal::gpio::{Gpio, InputPin};
use tracing::{debug, info};

use super::{InputSource, SourceError};
use crate::domain::PinConfig;

/// Time between two samples of the pins.
pub const POLL_INTERVAL: Duration = Duration::from_micros(500);

/// Reads the encoder and button from BCM-numbered GPIO pins.
pub struct GpioInputSource {
    pins: PinConfig,
    sender: Arc<Mutex<Option<Sender<HardwareEvent>>>>,
    running: Arc<AtomicBool>,
}

impl GpioInputSource {
    /// Creates a stopped source for the given pin assignment.
    pub fn new(pins: PinConfig) -> Self {
        Self {
            pins,
            sender: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

struct Pins {
    clk: InputPin,
    dt: InputPin,
    button: InputPin,
}

impl Pins {
    fn open(config: &PinConfig) -> Result<Self, SourceError> {
        let gpio = Gpio::new().map_err(|e| SourceError::Gpio(e.to_string()))?;
        let input = |pin: u8| {
            gpio.get(pin)
                .map(|p| p.into_input_pullup())
                .map_err(|e| SourceError::Gpio(format!("pin {pin}: {e}")))
        };
        Ok(Self {
            clk: input(config.clk)?,
            dt: input(config.dt)?,
            button: input(config.button)?,
        })
    }

    fn encoder_levels(&self) -> PinLevels {
        PinLevels::new(self.clk.is_high(), self.dt.is_high())
    }
}

impl InputSource for GpioInputSource {
    fn start(&self) -> Result<mpsc::Receiver<HardwareEvent>, SourceError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SourceError::AlreadyStarted);
        }

        let pins = match Pins::open(&self.pins) {
            Ok(pins) => pins,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        info!(
            "GPIO ready: CLK={} DT={} button={}",
            self.pins.clk, self.pins.dt, self.pins.button
        );

        let (tx, rx) = mpsc::channel();
        *self.sender.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);

        let slot = Arc::clone(&self.sender);
        let running = Arc::clone(&self.running);
        let debounce = self.pins.button_debounce;
        let spawned = std::thread::Builder::new()
            .name("gpio-input".to_string())
            .spawn(move || poll_pins(pins, debounce, &slot, &running));
        if let Err(e) = spawned {
            self.stop();
            return Err(SourceError::Spawn(e));
        }
        Ok(rx)
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        *self.sender.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

fn poll_pins(
    pins: Pins,
    debounce: Option<Duration>,
    slot: &Mutex<Option<Sender<HardwareEvent>>>,
    running: &AtomicBool,
) {
    let mut decoder = QuadratureDecoder::with_initial(pins.encoder_levels());
    let mut button = ButtonDebouncer::new(debounce);
    // A button already held at start-up is not a press.
    button.update(pins.button.is_high(), Instant::now());

    while running.load(Ordering::SeqCst) {
        let mut events = Vec::with_capacity(2);
        if decoder.update(pins.encoder_levels()).is_some() {
            events.push(HardwareEvent::Rotated {
                position: decoder.position(),
            });
        }
        if button.update(pins.button.is_high(), Instant::now()) {
            events.push(HardwareEvent::Pressed);
        }

        if !events.is_empty() {
            let guard = slot.lock().unwrap_or_else(|e| e.into_inner());
            let Some(sender) = guard.as_ref() else {
                break;
            };
            if events.into_iter().any(|event| sender.send(event).is_err()) {
                break;
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    debug!("GPIO polling thread exiting");
}
