//! Frame snapshot assembly.
//!
//! One [`Device`] is created at startup and threaded through the application's
//! frame loop; it owns every collaborator and the snapshot the application reads.
//!
//! `pull` establishes this ordering within a frame:
//!
//!   reset accumulator → resume message pump → fold deltas → poll clock →
//!   poll keyboard → poll cursor → poll controller → snapshot visible
//!
//! `push` forwards outputs (vibration) and presents the frame.

use glam::IVec2;

use crate::accumulator::FrameAccumulator;
use crate::clock::{CounterSource, FrameClock};
use crate::config::DeviceConfig;
use crate::error::{InitError, NOT_INITIALIZED};
use crate::gamepad::{ControllerReading, Gamepad};
use crate::keyboard::{Keyboard, MAX_KEYS};
use crate::mouse::Mouse;
use crate::pump::{MessagePump, MessageSource, YieldReason};
use crate::window::{ClientGeometry, WindowPlacement, WindowState};

/// Swaps the rendered frame onto the window.
pub trait Presenter {
    fn present(&mut self);
    fn resize(&mut self, size: IVec2);
}

/// Window and message provider.
pub trait WindowBackend: MessageSource {
    /// Size of the primary screen, if the platform can tell before a window exists.
    fn screen_size(&self) -> Option<IVec2>;

    /// Creates and shows the window, plus a presentation surface when `graphics` is set.
    fn create_window(
        &mut self,
        title: &str,
        placement: &WindowPlacement,
        graphics: bool,
    ) -> Result<(), InitError>;

    /// Subscribes the window to relative (raw) mouse input.
    fn register_raw_mouse(&mut self) -> Result<(), InitError>;

    fn client_geometry(&self) -> ClientGeometry;

    /// Cursor position relative to the client area's top-left corner.
    fn cursor_position(&self) -> Option<IVec2>;

    /// Fills `table` with the current down state of every virtual key. Returns `false`
    /// when the table could not be read; the previous frame's keys then stand.
    fn keyboard_state(&self, table: &mut [bool; MAX_KEYS]) -> bool;

    fn presenter(&mut self) -> Option<&mut dyn Presenter> {
        None
    }

    /// Shows `message` to the user (blocking) and terminates the process.
    fn exit_with_error(&mut self, message: &str) -> !;
}

/// Controller provider, addressed by controller index.
pub trait ControllerBackend {
    /// `false` when no controller driver could be loaded.
    fn available(&self) -> bool {
        true
    }

    /// Current reading, `None` when the controller is disconnected.
    fn poll(&mut self, index: usize) -> Option<ControllerReading>;

    fn set_vibration(&mut self, index: usize, left_motor: u16, right_motor: u16);
}

/// Controller provider used when no controller support is compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullController;

impl ControllerBackend for NullController {
    fn available(&self) -> bool {
        false
    }

    fn poll(&mut self, _index: usize) -> Option<ControllerReading> {
        None
    }

    fn set_vibration(&mut self, _index: usize, _left_motor: u16, _right_motor: u16) {}
}

pub struct Backends {
    pub window: Box<dyn WindowBackend>,
    pub controller: Box<dyn ControllerBackend>,
    pub counter: Box<dyn CounterSource>,
}

/// Everything the application observes for one frame.
#[derive(Debug, Clone)]
pub struct DeviceSnapshot {
    pub window: WindowState,
    pub time: FrameClock,
    pub keyboard: Keyboard,
    pub gamepad: Gamepad,
    pub mouse: Mouse,
    /// Text typed this frame, `None` when nothing was typed.
    pub text: Option<String>,
}

pub struct Device {
    initialized: bool,
    quit: bool,
    error: Option<String>,
    warning: Option<String>,
    config: DeviceConfig,
    snapshot: DeviceSnapshot,
    accumulator: FrameAccumulator,
    pump: MessagePump,
    last_yield: YieldReason,
    key_table: [bool; MAX_KEYS],
    backends: Backends,
}

impl Device {
    pub fn new(config: DeviceConfig, backends: Backends) -> Self {
        let snapshot = DeviceSnapshot {
            window: WindowState {
                title: config.window.title.clone(),
                centered: config.window.centered,
                ..WindowState::default()
            },
            time: FrameClock::default(),
            keyboard: Keyboard::new(),
            gamepad: Gamepad::new(&config.controller),
            mouse: Mouse::default(),
            text: None,
        };
        Self {
            initialized: false,
            quit: false,
            error: None,
            warning: None,
            config,
            snapshot,
            accumulator: FrameAccumulator::new(),
            pump: MessagePump::new(),
            last_yield: YieldReason::QueueDrained,
            key_table: [false; MAX_KEYS],
            backends,
        }
    }

    /// Creates the window, starts the clock and registers input devices, then pulls
    /// once so the first frame starts from valid state. On failure the error string
    /// is set and the caller is expected to terminate (see [`Device::exit_with_error`]).
    pub fn initialize(&mut self) -> Result<(), InitError> {
        if self.initialized {
            return Err(InitError::AlreadyInitialized);
        }
        self.try_initialize().inspect_err(|err| {
            log::error!("Initialization failed: {err}");
            self.error = Some(err.to_string());
        })?;

        self.initialized = true;
        log::info!("Device initialized: \"{}\"", self.snapshot.window.title);
        self.pull();
        Ok(())
    }

    fn try_initialize(&mut self) -> Result<(), InitError> {
        let window_config = &self.config.window;
        let placement =
            WindowPlacement::resolve(window_config, self.backends.window.screen_size());
        self.backends.window.create_window(
            &window_config.title,
            &placement,
            window_config.graphics,
        )?;

        self.snapshot.time.initialize(self.backends.counter.as_ref());

        self.backends.window.register_raw_mouse()?;

        if !self.backends.controller.available() {
            let message = "Controller driver unavailable; gamepad reports disconnected.";
            log::warn!("{message}");
            self.warning = Some(message.to_string());
        }
        Ok(())
    }

    /// Assembles this frame's snapshot. Returns `false` once the window is gone.
    pub fn pull(&mut self) -> bool {
        if !self.initialized {
            self.fail(NOT_INITIALIZED);
        }
        self.pull_window();
        self.snapshot.time.pull(self.backends.counter.as_ref());
        self.pull_keyboard();
        self.pull_mouse();
        self.pull_gamepad();
        !self.quit
    }

    fn pull_window(&mut self) {
        self.accumulator.reset();

        self.last_yield = self
            .pump
            .resume(self.backends.window.as_mut(), &mut self.accumulator);
        if self.last_yield == YieldReason::ForcedByModalTimer {
            log::trace!("Frame pulled from inside an OS modal loop");
        }

        if self.accumulator.destroyed() {
            self.quit = true;
        }
        self.accumulator.fold_into(&mut self.snapshot.mouse);
        self.snapshot.text = self.accumulator.text().map(str::to_owned);

        let geometry = self.backends.window.client_geometry();
        let window = &mut self.snapshot.window;
        window.resized = self.accumulator.resized();
        if geometry.size != window.size {
            log::debug!(
                "Client area {}x{} -> {}x{}",
                window.size.x,
                window.size.y,
                geometry.size.x,
                geometry.size.y
            );
            if let Some(presenter) = self.backends.window.presenter() {
                presenter.resize(geometry.size);
            }
        }
        window.position = geometry.position;
        window.size = geometry.size;
    }

    fn pull_keyboard(&mut self) {
        if self.backends.window.keyboard_state(&mut self.key_table) {
            self.snapshot.keyboard.pull(&self.key_table);
        }
    }

    fn pull_mouse(&mut self) {
        if let Some(cursor) = self.backends.window.cursor_position() {
            self.snapshot.mouse.position = cursor;
        }
    }

    fn pull_gamepad(&mut self) {
        let reading = self
            .backends
            .controller
            .poll(self.config.controller.index);
        self.snapshot.gamepad.apply(reading);
    }

    /// Sends vibration and presents the frame.
    pub fn push(&mut self) -> bool {
        if !self.initialized {
            self.fail(NOT_INITIALIZED);
        }
        let (left, right) = self.snapshot.gamepad.motor_output();
        self.backends
            .controller
            .set_vibration(self.config.controller.index, left, right);
        if let Some(presenter) = self.backends.window.presenter() {
            presenter.present();
        }
        !self.quit
    }

    /// `push` followed by `pull`.
    pub fn update(&mut self) -> bool {
        self.push();
        self.pull()
    }

    fn fail(&mut self, fallback: &str) -> ! {
        let message = self
            .error
            .get_or_insert_with(|| fallback.to_string())
            .clone();
        log::error!("{message}");
        self.backends.window.exit_with_error(&message)
    }

    /// Reports the current error string and terminates the process.
    pub fn exit_with_error(&mut self) -> ! {
        self.fail("Unknown error.")
    }

    pub fn snapshot(&self) -> &DeviceSnapshot {
        &self.snapshot
    }

    pub fn window(&self) -> &WindowState {
        &self.snapshot.window
    }

    pub fn time(&self) -> &FrameClock {
        &self.snapshot.time
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.snapshot.keyboard
    }

    pub fn mouse(&self) -> &Mouse {
        &self.snapshot.mouse
    }

    pub fn gamepad(&self) -> &Gamepad {
        &self.snapshot.gamepad
    }

    pub fn text(&self) -> Option<&str> {
        self.snapshot.text.as_deref()
    }

    /// Motor speeds in `[0, 1]`, sent on the next push.
    pub fn set_motor_speeds(&mut self, left: f32, right: f32) {
        self.snapshot.gamepad.left_motor_speed = left;
        self.snapshot.gamepad.right_motor_speed = right;
    }

    /// Makes the next `pull`/`push` report `false`.
    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn quit(&self) -> bool {
        self.quit
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Whether the last pull was cut short by the forced-yield timer of an OS modal loop.
    pub fn in_modal_loop(&self) -> bool {
        self.last_yield == YieldReason::ForcedByModalTimer
    }
}
