//! Window and message provider on top of winit.
//!
//! The event loop is never handed control for good: every `peek_message` that finds
//! the local queue empty pumps the OS once with a zero timeout
//! (`pump_app_events`), converting winit events into `PlatformMessage`s as they are
//! dispatched. Keyboard state and cursor position are tracked here so the device
//! can poll them like an OS key table.
//!
//! During an OS modal loop (interactive resize or menu tracking on Windows)
//! `pump_app_events` does not return until the loop ends. winit keeps calling the
//! handler, but nothing can hand control back to the frame loop from there, so this
//! backend never reports modal-loop brackets and the forced-yield timer is never
//! armed. The frame loop stalls for the duration of the modal loop.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use fpi_core::window::{ClientGeometry, WindowPlacement};
use fpi_core::{
    InitError, Key, MessageSource, PlatformMessage, Presenter, RawMouse, WindowBackend, MAX_KEYS,
};
use glam::{DVec2, IVec2};
use winit::application::ApplicationHandler;
use winit::event::{
    DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, MouseScrollDelta, StartCause,
    WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, DeviceEvents, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::presenter::WgpuPresenter;
use crate::window::{create_window, WindowRequest};

/// Trackpads report scrolling in pixels; this many make one wheel notch.
const PIXELS_PER_NOTCH: f64 = 120.0;

/// State touched by winit callbacks while the event loop is being pumped.
struct WinitState {
    window: Option<Arc<Window>>,
    presenter: Option<WgpuPresenter>,
    request: Option<WindowRequest>,
    create_result: Option<Result<(), InitError>>,
    screen_size: Option<IVec2>,
    queue: VecDeque<PlatformMessage>,
    keys: [bool; MAX_KEYS],
    cursor: Option<IVec2>,
    motion_remainder: DVec2,
    wheel_remainder: f64,
    exited: bool,
}

impl WinitState {
    fn new() -> Self {
        Self {
            window: None,
            presenter: None,
            request: None,
            create_result: None,
            screen_size: None,
            queue: VecDeque::new(),
            keys: [false; MAX_KEYS],
            cursor: None,
            motion_remainder: DVec2::ZERO,
            wheel_remainder: 0.0,
            exited: false,
        }
    }

    fn on_active(&mut self, event_loop: &ActiveEventLoop) {
        if self.screen_size.is_none() {
            self.screen_size = event_loop
                .primary_monitor()
                .or_else(|| event_loop.available_monitors().next())
                .map(|monitor| {
                    let size = monitor.size();
                    IVec2::new(size.width as i32, size.height as i32)
                });
        }

        if let Some(request) = self.request.take() {
            let result = create_window(event_loop, &request).map(|window| {
                log::info!(
                    "Window created: \"{}\" {}x{}",
                    request.title,
                    window.inner_size().width,
                    window.inner_size().height
                );
                self.window = Some(window);
            });
            self.create_result = Some(result);
        }
    }

    fn destroy_window(&mut self) {
        // The surface must go before the window it was created from.
        self.presenter = None;
        if self.window.take().is_some() {
            self.queue.push_back(PlatformMessage::Destroy);
        }
    }

    fn on_key(&mut self, event: &KeyEvent) {
        let down = event.state == ElementState::Pressed;
        if let PhysicalKey::Code(code) = event.physical_key {
            if let Some(key) = map_key(code) {
                self.keys[key.index()] = down;
            }
        }
        if down {
            if let Some(text) = &event.text {
                self.queue.extend(text.chars().map(PlatformMessage::Char));
            }
        }
    }

    fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let down = state == ElementState::Pressed;
        let raw = match button {
            MouseButton::Left => {
                self.keys[Key::MOUSE_LEFT.index()] = down;
                RawMouse {
                    left: Some(down),
                    ..RawMouse::default()
                }
            }
            MouseButton::Right => {
                self.keys[Key::MOUSE_RIGHT.index()] = down;
                RawMouse {
                    right: Some(down),
                    ..RawMouse::default()
                }
            }
            MouseButton::Middle => {
                self.keys[Key::MOUSE_MIDDLE.index()] = down;
                return;
            }
            _ => return,
        };
        self.queue.push_back(PlatformMessage::RawMouse(raw));
    }

    fn on_wheel(&mut self, delta: MouseScrollDelta) {
        self.wheel_remainder += match delta {
            MouseScrollDelta::LineDelta(_, y) => y as f64,
            MouseScrollDelta::PixelDelta(position) => position.y / PIXELS_PER_NOTCH,
        };
        let notches = self.wheel_remainder.trunc();
        self.wheel_remainder -= notches;
        if notches != 0.0 {
            self.queue.push_back(PlatformMessage::RawMouse(RawMouse {
                wheel: notches as i32,
                ..RawMouse::default()
            }));
        }
    }

    fn next_message(&mut self) -> Option<PlatformMessage> {
        self.queue.pop_front()
    }

    fn on_window_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, destroying window.");
                self.destroy_window();
            }
            WindowEvent::Destroyed => {
                self.presenter = None;
                self.window = None;
                self.queue.push_back(PlatformMessage::Destroy);
            }
            WindowEvent::Resized(_) => {
                self.queue.push_back(PlatformMessage::Sizing);
            }
            WindowEvent::Focused(false) => {
                // Releases that happen while unfocused are never delivered.
                self.keys.fill(false);
            }
            WindowEvent::KeyboardInput { event, .. } => self.on_key(&event),
            WindowEvent::MouseInput { state, button, .. } => self.on_mouse_button(button, state),
            WindowEvent::MouseWheel { delta, .. } => self.on_wheel(delta),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(IVec2::new(
                    position.x.round() as i32,
                    position.y.round() as i32,
                ));
            }
            _ => {}
        }
    }

    fn on_motion(&mut self, delta: (f64, f64)) {
        self.motion_remainder += DVec2::new(delta.0, delta.1);
        let whole = self.motion_remainder.trunc();
        self.motion_remainder -= whole;
        if whole != DVec2::ZERO {
            self.queue.push_back(PlatformMessage::RawMouse(RawMouse {
                dx: whole.x as i32,
                dy: whole.y as i32,
                ..RawMouse::default()
            }));
        }
    }
}

impl ApplicationHandler for WinitState {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, _cause: StartCause) {
        self.on_active(event_loop);
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.on_active(event_loop);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.on_window_event(event);
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.on_motion(delta);
        }
    }
}

pub struct WinitBackend {
    event_loop: EventLoop<()>,
    state: WinitState,
    needs_pump: bool,
}

impl WinitBackend {
    pub fn new() -> Result<Self, InitError> {
        let event_loop =
            EventLoop::new().map_err(|e| InitError::WindowClassRegistration(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut backend = Self {
            event_loop,
            state: WinitState::new(),
            needs_pump: true,
        };
        // The first pass activates the loop so monitors can be queried.
        backend.pump();
        Ok(backend)
    }

    fn pump(&mut self) {
        if self.state.exited {
            return;
        }
        let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state);
        if let PumpStatus::Exit(code) = status {
            log::info!("Event loop exited with code {code}");
            self.state.exited = true;
            self.state.presenter = None;
            self.state.window = None;
            self.state.queue.push_back(PlatformMessage::Destroy);
        }
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.state.window.as_ref()
    }
}

impl MessageSource for WinitBackend {
    fn peek_message(&mut self) -> Option<PlatformMessage> {
        if self.needs_pump {
            self.needs_pump = false;
            self.pump();
        }
        let message = self.state.next_message();
        if message.is_none() {
            self.needs_pump = true;
        }
        message
    }

    // Only armed after `EnterModalLoop`, which this backend never queues.
    fn set_forced_yield_timer(&mut self, interval: Duration) {
        log::debug!("Forced-yield timer ({interval:?}) is not supported on winit");
    }

    fn kill_forced_yield_timer(&mut self) {}
}

impl WindowBackend for WinitBackend {
    fn screen_size(&self) -> Option<IVec2> {
        self.state.screen_size
    }

    fn create_window(
        &mut self,
        title: &str,
        placement: &WindowPlacement,
        graphics: bool,
    ) -> Result<(), InitError> {
        self.state.request = Some(WindowRequest {
            title: title.to_string(),
            placement: *placement,
        });
        self.pump();
        self.state.create_result.take().unwrap_or_else(|| {
            Err(InitError::WindowCreation(
                "event loop never became active".to_string(),
            ))
        })?;

        if graphics {
            let window = self
                .state
                .window
                .clone()
                .ok_or_else(|| InitError::GraphicsContext("window is gone".to_string()))?;
            let presenter = WgpuPresenter::new(window).map_err(InitError::GraphicsContext)?;
            self.state.presenter = Some(presenter);
        }
        Ok(())
    }

    fn register_raw_mouse(&mut self) -> Result<(), InitError> {
        if self.state.window.is_none() {
            return Err(InitError::InputDeviceRegistration(
                "no window to receive raw mouse input".to_string(),
            ));
        }
        self.event_loop.listen_device_events(DeviceEvents::WhenFocused);
        Ok(())
    }

    fn client_geometry(&self) -> ClientGeometry {
        let Some(window) = &self.state.window else {
            return ClientGeometry::default();
        };
        let size = window.inner_size();
        let position = window
            .inner_position()
            .map(|p| IVec2::new(p.x, p.y))
            .unwrap_or_default();
        ClientGeometry {
            position,
            size: IVec2::new(size.width as i32, size.height as i32),
        }
    }

    fn cursor_position(&self) -> Option<IVec2> {
        self.state.cursor
    }

    fn keyboard_state(&self, table: &mut [bool; MAX_KEYS]) -> bool {
        table.copy_from_slice(&self.state.keys);
        true
    }

    fn presenter(&mut self) -> Option<&mut dyn Presenter> {
        self.state
            .presenter
            .as_mut()
            .map(|presenter| presenter as &mut dyn Presenter)
    }

    fn exit_with_error(&mut self, message: &str) -> ! {
        log::error!("FPI ERROR: {message}");
        fatal_error_dialog(message).show();
        std::process::exit(1)
    }
}

/// Blocking error box shown before the process terminates.
fn fatal_error_dialog(message: &str) -> rfd::MessageDialog {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("FPI ERROR")
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
}

/// Maps a physical key onto its virtual-key code.
pub fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Backspace => Key::BACKSPACE,
        KeyCode::Tab => Key::TAB,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::ENTER,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::SHIFT,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::CONTROL,
        KeyCode::AltLeft | KeyCode::AltRight => Key::ALT,
        KeyCode::Pause => Key::PAUSE,
        KeyCode::CapsLock => Key::CAPS_LOCK,
        KeyCode::Escape => Key::ESCAPE,
        KeyCode::Space => Key::SPACE,
        KeyCode::PageUp => Key::PAGE_UP,
        KeyCode::PageDown => Key::PAGE_DOWN,
        KeyCode::End => Key::END,
        KeyCode::Home => Key::HOME,
        KeyCode::ArrowLeft => Key::LEFT,
        KeyCode::ArrowUp => Key::UP,
        KeyCode::ArrowRight => Key::RIGHT,
        KeyCode::ArrowDown => Key::DOWN,
        KeyCode::Insert => Key::INSERT,
        KeyCode::Delete => Key::DELETE,
        KeyCode::Digit0 => Key(b'0'),
        KeyCode::Digit1 => Key(b'1'),
        KeyCode::Digit2 => Key(b'2'),
        KeyCode::Digit3 => Key(b'3'),
        KeyCode::Digit4 => Key(b'4'),
        KeyCode::Digit5 => Key(b'5'),
        KeyCode::Digit6 => Key(b'6'),
        KeyCode::Digit7 => Key(b'7'),
        KeyCode::Digit8 => Key(b'8'),
        KeyCode::Digit9 => Key(b'9'),
        KeyCode::KeyA => Key(b'A'),
        KeyCode::KeyB => Key(b'B'),
        KeyCode::KeyC => Key(b'C'),
        KeyCode::KeyD => Key(b'D'),
        KeyCode::KeyE => Key(b'E'),
        KeyCode::KeyF => Key(b'F'),
        KeyCode::KeyG => Key(b'G'),
        KeyCode::KeyH => Key(b'H'),
        KeyCode::KeyI => Key(b'I'),
        KeyCode::KeyJ => Key(b'J'),
        KeyCode::KeyK => Key(b'K'),
        KeyCode::KeyL => Key(b'L'),
        KeyCode::KeyM => Key(b'M'),
        KeyCode::KeyN => Key(b'N'),
        KeyCode::KeyO => Key(b'O'),
        KeyCode::KeyP => Key(b'P'),
        KeyCode::KeyQ => Key(b'Q'),
        KeyCode::KeyR => Key(b'R'),
        KeyCode::KeyS => Key(b'S'),
        KeyCode::KeyT => Key(b'T'),
        KeyCode::KeyU => Key(b'U'),
        KeyCode::KeyV => Key(b'V'),
        KeyCode::KeyW => Key(b'W'),
        KeyCode::KeyX => Key(b'X'),
        KeyCode::KeyY => Key(b'Y'),
        KeyCode::KeyZ => Key(b'Z'),
        KeyCode::Numpad0 => Key(0x60),
        KeyCode::Numpad1 => Key(0x61),
        KeyCode::Numpad2 => Key(0x62),
        KeyCode::Numpad3 => Key(0x63),
        KeyCode::Numpad4 => Key(0x64),
        KeyCode::Numpad5 => Key(0x65),
        KeyCode::Numpad6 => Key(0x66),
        KeyCode::Numpad7 => Key(0x67),
        KeyCode::Numpad8 => Key(0x68),
        KeyCode::Numpad9 => Key(0x69),
        KeyCode::F1 => Key(0x70),
        KeyCode::F2 => Key(0x71),
        KeyCode::F3 => Key(0x72),
        KeyCode::F4 => Key(0x73),
        KeyCode::F5 => Key(0x74),
        KeyCode::F6 => Key(0x75),
        KeyCode::F7 => Key(0x76),
        KeyCode::F8 => Key(0x77),
        KeyCode::F9 => Key(0x78),
        KeyCode::F10 => Key(0x79),
        KeyCode::F11 => Key(0x7A),
        KeyCode::F12 => Key(0x7B),
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpi_core::{FrameAccumulator, MessagePump, YieldReason};
    use winit::dpi::PhysicalSize;

    /// Drains the converted winit events the way `WinitBackend` hands them out.
    struct Converted<'a>(&'a mut WinitState);

    impl MessageSource for Converted<'_> {
        fn peek_message(&mut self) -> Option<PlatformMessage> {
            self.0.next_message()
        }

        fn set_forced_yield_timer(&mut self, _interval: Duration) {
            panic!("winit events never open a modal loop");
        }

        fn kill_forced_yield_timer(&mut self) {}
    }

    #[test]
    fn resize_during_pump_is_sizing_without_modal_brackets() {
        let mut state = WinitState::new();
        state.on_window_event(WindowEvent::Resized(PhysicalSize::new(800, 600)));
        state.on_window_event(WindowEvent::Resized(PhysicalSize::new(820, 610)));
        assert_eq!(
            state.queue.iter().copied().collect::<Vec<_>>(),
            vec![PlatformMessage::Sizing, PlatformMessage::Sizing]
        );

        let mut pump = MessagePump::new();
        let mut accumulator = FrameAccumulator::new();
        let reason = pump.resume(&mut Converted(&mut state), &mut accumulator);
        assert_eq!(reason, YieldReason::QueueDrained);
        assert!(!pump.in_modal_loop());
        assert!(accumulator.resized());
        assert!(state.queue.is_empty());
    }

    #[test]
    fn destroyed_window_queues_destroy() {
        let mut state = WinitState::new();
        state.on_window_event(WindowEvent::Destroyed);
        assert_eq!(state.next_message(), Some(PlatformMessage::Destroy));
        assert!(state.window.is_none());
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut state = WinitState::new();
        state.on_mouse_button(MouseButton::Right, ElementState::Pressed);
        state.keys[Key::ESCAPE.index()] = true;
        state.on_window_event(WindowEvent::Focused(false));
        assert!(state.keys.iter().all(|down| !down));
    }

    #[test]
    fn fatal_dialog_builds_without_showing() {
        let _dialog = fatal_error_dialog("Failed to create window: no display");
    }

    #[test]
    fn map_key_uses_virtual_key_codes() {
        assert_eq!(map_key(KeyCode::Escape), Some(Key::ESCAPE));
        assert_eq!(map_key(KeyCode::KeyA), Key::from_char('a'));
        assert_eq!(map_key(KeyCode::Digit7), Key::from_char('7'));
        assert_eq!(map_key(KeyCode::F12), Key::function(12));
        assert_eq!(map_key(KeyCode::ControlRight), Some(Key::CONTROL));
        assert_eq!(map_key(KeyCode::Fn), None);
    }

    #[test]
    fn motion_keeps_subpixel_remainder() {
        let mut state = WinitState::new();
        state.on_motion((0.6, -0.4));
        assert!(state.queue.is_empty());
        state.on_motion((0.6, -0.8));
        assert_eq!(
            state.queue.pop_front(),
            Some(PlatformMessage::RawMouse(RawMouse {
                dx: 1,
                dy: -1,
                ..RawMouse::default()
            }))
        );
    }

    #[test]
    fn wheel_lines_become_notches() {
        let mut state = WinitState::new();
        state.on_wheel(MouseScrollDelta::LineDelta(0.0, -2.0));
        assert_eq!(
            state.queue.pop_front(),
            Some(PlatformMessage::RawMouse(RawMouse {
                wheel: -2,
                ..RawMouse::default()
            }))
        );
    }

    #[test]
    fn mouse_buttons_update_key_table_and_queue() {
        let mut state = WinitState::new();
        state.on_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(state.keys[Key::MOUSE_LEFT.index()]);
        assert_eq!(
            state.queue.pop_front(),
            Some(PlatformMessage::RawMouse(RawMouse {
                left: Some(true),
                ..RawMouse::default()
            }))
        );

        state.on_mouse_button(MouseButton::Middle, ElementState::Pressed);
        assert!(state.keys[Key::MOUSE_MIDDLE.index()]);
        assert!(state.queue.is_empty());
    }
}
