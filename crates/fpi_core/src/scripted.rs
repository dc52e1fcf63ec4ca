//! Scripted collaborators for driving a `Device` without an OS window.
//!
//! Each backend shares its state with the test through `Rc<RefCell<_>>`, so the test
//! can queue messages and change polled state between pulls after the backend has
//! been boxed into the device.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use glam::IVec2;

use crate::clock::CounterSource;
use crate::config::DeviceConfig;
use crate::device::{Backends, ControllerBackend, Device, Presenter, WindowBackend};
use crate::error::InitError;
use crate::gamepad::ControllerReading;
use crate::keyboard::{Key, MAX_KEYS};
use crate::pump::{MessageSource, PlatformMessage};
use crate::window::{ClientGeometry, WindowPlacement};

#[derive(Debug, Default)]
pub struct ScriptedSource {
    queue: VecDeque<PlatformMessage>,
    timer: Option<Duration>,
    arms: u32,
    kills: u32,
}

impl ScriptedSource {
    pub fn queue(&mut self, messages: impl IntoIterator<Item = PlatformMessage>) {
        self.queue.extend(messages);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn timer_interval(&self) -> Option<Duration> {
        self.timer
    }

    pub fn timer_arms(&self) -> u32 {
        self.arms
    }

    pub fn timer_kills(&self) -> u32 {
        self.kills
    }
}

impl MessageSource for ScriptedSource {
    fn peek_message(&mut self) -> Option<PlatformMessage> {
        self.queue.pop_front()
    }

    fn set_forced_yield_timer(&mut self, interval: Duration) {
        self.timer = Some(interval);
        self.arms += 1;
    }

    fn kill_forced_yield_timer(&mut self) {
        self.timer = None;
        self.kills += 1;
    }
}

#[derive(Debug, Default)]
pub struct WindowScript {
    pub source: ScriptedSource,
    pub screen: Option<IVec2>,
    pub geometry: ClientGeometry,
    pub cursor: Option<IVec2>,
    pub held_keys: Vec<Key>,
    pub keyboard_unavailable: bool,
    pub fail_create: Option<InitError>,
    pub fail_raw_mouse: bool,
    pub created: Option<(String, WindowPlacement, bool)>,
    pub raw_mouse_registered: bool,
    pub presents: u32,
    pub resizes: Vec<IVec2>,
}

struct ScriptedPresenter {
    script: Rc<RefCell<WindowScript>>,
}

impl Presenter for ScriptedPresenter {
    fn present(&mut self) {
        self.script.borrow_mut().presents += 1;
    }

    fn resize(&mut self, size: IVec2) {
        self.script.borrow_mut().resizes.push(size);
    }
}

struct ScriptedWindow {
    script: Rc<RefCell<WindowScript>>,
    presenter: Option<ScriptedPresenter>,
}

impl MessageSource for ScriptedWindow {
    fn peek_message(&mut self) -> Option<PlatformMessage> {
        self.script.borrow_mut().source.peek_message()
    }

    fn set_forced_yield_timer(&mut self, interval: Duration) {
        self.script.borrow_mut().source.set_forced_yield_timer(interval);
    }

    fn kill_forced_yield_timer(&mut self) {
        self.script.borrow_mut().source.kill_forced_yield_timer();
    }
}

impl WindowBackend for ScriptedWindow {
    fn screen_size(&self) -> Option<IVec2> {
        self.script.borrow().screen
    }

    fn create_window(
        &mut self,
        title: &str,
        placement: &WindowPlacement,
        graphics: bool,
    ) -> Result<(), InitError> {
        let mut script = self.script.borrow_mut();
        if let Some(err) = script.fail_create.clone() {
            return Err(err);
        }
        script.created = Some((title.to_string(), *placement, graphics));
        if graphics {
            self.presenter = Some(ScriptedPresenter {
                script: Rc::clone(&self.script),
            });
        }
        Ok(())
    }

    fn register_raw_mouse(&mut self) -> Result<(), InitError> {
        let mut script = self.script.borrow_mut();
        if script.fail_raw_mouse {
            return Err(InitError::InputDeviceRegistration(
                "raw mouse rejected".to_string(),
            ));
        }
        script.raw_mouse_registered = true;
        Ok(())
    }

    fn client_geometry(&self) -> ClientGeometry {
        self.script.borrow().geometry
    }

    fn cursor_position(&self) -> Option<IVec2> {
        self.script.borrow().cursor
    }

    fn keyboard_state(&self, table: &mut [bool; MAX_KEYS]) -> bool {
        let script = self.script.borrow();
        if script.keyboard_unavailable {
            return false;
        }
        table.fill(false);
        for key in &script.held_keys {
            table[key.index()] = true;
        }
        true
    }

    fn presenter(&mut self) -> Option<&mut dyn Presenter> {
        self.presenter
            .as_mut()
            .map(|presenter| presenter as &mut dyn Presenter)
    }

    fn exit_with_error(&mut self, message: &str) -> ! {
        panic!("{message}")
    }
}

#[derive(Debug, Default)]
pub struct ControllerScript {
    pub unavailable: bool,
    pub reading: Option<ControllerReading>,
    pub vibration: Vec<(usize, u16, u16)>,
}

struct ScriptedController(Rc<RefCell<ControllerScript>>);

impl ControllerBackend for ScriptedController {
    fn available(&self) -> bool {
        !self.0.borrow().unavailable
    }

    fn poll(&mut self, _index: usize) -> Option<ControllerReading> {
        self.0.borrow().reading
    }

    fn set_vibration(&mut self, index: usize, left_motor: u16, right_motor: u16) {
        self.0
            .borrow_mut()
            .vibration
            .push((index, left_motor, right_motor));
    }
}

struct ScriptedCounter(Rc<Cell<u64>>);

impl CounterSource for ScriptedCounter {
    fn frequency(&self) -> u64 {
        1_000_000
    }

    fn now(&self) -> u64 {
        self.0.get()
    }
}

/// Shared handles to every scripted backend of one device.
pub struct Harness {
    pub window: Rc<RefCell<WindowScript>>,
    pub controller: Rc<RefCell<ControllerScript>>,
    /// Counter value in microseconds.
    pub counter: Rc<Cell<u64>>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            window: Rc::new(RefCell::new(WindowScript::default())),
            controller: Rc::new(RefCell::new(ControllerScript::default())),
            counter: Rc::new(Cell::new(0)),
        }
    }

    pub fn device(&self, config: DeviceConfig) -> Device {
        let backends = Backends {
            window: Box::new(ScriptedWindow {
                script: Rc::clone(&self.window),
                presenter: None,
            }),
            controller: Box::new(ScriptedController(Rc::clone(&self.controller))),
            counter: Box::new(ScriptedCounter(Rc::clone(&self.counter))),
        };
        Device::new(config, backends)
    }

    pub fn initialized(&self, config: DeviceConfig) -> Device {
        let mut device = self.device(config);
        device.initialize().expect("scripted initialize");
        device
    }

    pub fn queue(&self, messages: impl IntoIterator<Item = PlatformMessage>) {
        self.window.borrow_mut().source.queue(messages);
    }
}
