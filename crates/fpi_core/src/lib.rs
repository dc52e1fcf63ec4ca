//! Per-frame input and window snapshot layer.
//!
//! Raw OS events arrive asynchronously; the application wants one consistent,
//! edge-detected view per simulation frame. [`Device::pull`] builds that view by
//! handing control to a cooperative [`MessagePump`], folding the event-sourced deltas
//! it accumulated into absolute state, and re-polling the keyboard, cursor and
//! controller. [`Device::push`] writes the outputs back.
//!
//! Everything OS-specific sits behind the collaborator traits in [`device`] and
//! [`clock`]; `fpi_platform` provides the real ones.

pub mod accumulator;
pub mod button;
pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod gamepad;
pub mod keyboard;
pub mod mouse;
pub mod pump;
#[cfg(test)]
mod scripted;
pub mod window;

pub use accumulator::FrameAccumulator;
pub use button::{AnalogButton, DigitalButton, Stick};
pub use clock::{CounterSource, FrameClock};
pub use config::{load_config_from_path, ControllerConfig, DeviceConfig, WindowConfig};
pub use device::{
    Backends, ControllerBackend, Device, DeviceSnapshot, NullController, Presenter, WindowBackend,
};
pub use error::{ConfigError, InitError};
pub use gamepad::{ButtonReading, ControllerReading, Gamepad};
pub use keyboard::{Key, Keyboard, MAX_KEYS};
pub use mouse::{Mouse, MouseButton};
pub use pump::{MessagePump, MessageSource, PlatformMessage, RawMouse, YieldReason};
pub use window::{ClientGeometry, WindowPlacement, WindowState};
