//! Controller provider backed by gilrs.
//!
//! A missing or broken gamepad backend is not fatal: the provider reports itself
//! unavailable and every poll returns "disconnected".

use fpi_core::{ButtonReading, ControllerBackend, ControllerReading};
use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Repeat, Replay, Ticks};
use gilrs::{Axis, Button, EventType, Gamepad, GamepadId, Gilrs};

struct Rumble {
    effect: Effect,
    speeds: (u16, u16),
}

pub struct GilrsController {
    gilrs: Option<Gilrs>,
    active: Option<GamepadId>,
    rumble: Option<Rumble>,
    ff_warned: bool,
}

impl GilrsController {
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                log::info!("Initialized gilrs controller interface");
                Some(g)
            }
            Err(e) => {
                log::warn!("Failed to initialize gilrs, controllers disabled: {}", e);
                None
            }
        };
        Self {
            gilrs,
            active: None,
            rumble: None,
            ff_warned: false,
        }
    }

    fn stop_rumble(&mut self) {
        if let Some(rumble) = self.rumble.take() {
            if let Err(e) = rumble.effect.stop() {
                log::debug!("Failed to stop rumble: {}", e);
            }
        }
    }
}

impl Default for GilrsController {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerBackend for GilrsController {
    fn available(&self) -> bool {
        self.gilrs.is_some()
    }

    fn poll(&mut self, index: usize) -> Option<ControllerReading> {
        let gilrs = self.gilrs.as_mut()?;

        // gilrs only updates cached gamepad state while events are drained.
        while let Some(event) = gilrs.next_event() {
            match event.event {
                EventType::Connected => {
                    log::info!("Gamepad {} connected", event.id);
                }
                EventType::Disconnected => {
                    log::info!("Gamepad {} disconnected", event.id);
                }
                _ => {}
            }
        }

        let Some((id, gamepad)) = gilrs.gamepads().nth(index) else {
            self.active = None;
            return None;
        };
        if self.active != Some(id) {
            log::info!("Selected gamepad: {} ({})", gamepad.name(), id);
        }
        let reading = read_gamepad(&gamepad);
        self.active = Some(id);
        Some(reading)
    }

    fn set_vibration(&mut self, _index: usize, left_motor: u16, right_motor: u16) {
        let speeds = (left_motor, right_motor);
        if self.rumble.as_ref().map(|r| r.speeds) == Some(speeds) {
            return;
        }
        if speeds == (0, 0) {
            self.stop_rumble();
            return;
        }
        let (Some(gilrs), Some(id)) = (self.gilrs.as_mut(), self.active) else {
            return;
        };
        if !gilrs.gamepad(id).is_ff_supported() {
            if !self.ff_warned {
                log::warn!("Gamepad {} does not support force feedback", id);
                self.ff_warned = true;
            }
            return;
        }

        let scheduling = Replay {
            play_for: Ticks::from_ms(1000),
            ..Default::default()
        };
        let built = EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong {
                    magnitude: left_motor,
                },
                scheduling,
                envelope: Default::default(),
            })
            .add_effect(BaseEffect {
                kind: BaseEffectType::Weak {
                    magnitude: right_motor,
                },
                scheduling,
                envelope: Default::default(),
            })
            .repeat(Repeat::Infinitely)
            .gamepads(&[id])
            .finish(gilrs);

        self.stop_rumble();
        match built {
            Ok(effect) => {
                if let Err(e) = effect.play() {
                    log::warn!("Failed to play rumble: {}", e);
                }
                self.rumble = Some(Rumble { effect, speeds });
            }
            Err(e) => log::warn!("Failed to build rumble effect: {}", e),
        }
    }
}

fn read_gamepad(gamepad: &Gamepad<'_>) -> ControllerReading {
    let trigger = |button: Button| {
        gamepad
            .button_data(button)
            .map_or(0.0, |data| data.value())
    };
    ControllerReading {
        buttons: ButtonReading {
            up: gamepad.is_pressed(Button::DPadUp),
            down: gamepad.is_pressed(Button::DPadDown),
            left: gamepad.is_pressed(Button::DPadLeft),
            right: gamepad.is_pressed(Button::DPadRight),
            start: gamepad.is_pressed(Button::Start),
            back: gamepad.is_pressed(Button::Select),
            left_thumb: gamepad.is_pressed(Button::LeftThumb),
            right_thumb: gamepad.is_pressed(Button::RightThumb),
            left_shoulder: gamepad.is_pressed(Button::LeftTrigger),
            right_shoulder: gamepad.is_pressed(Button::RightTrigger),
            a: gamepad.is_pressed(Button::South),
            b: gamepad.is_pressed(Button::East),
            x: gamepad.is_pressed(Button::West),
            y: gamepad.is_pressed(Button::North),
        },
        left_trigger: trigger(Button::LeftTrigger2),
        right_trigger: trigger(Button::RightTrigger2),
        left_stick: [
            gamepad.value(Axis::LeftStickX),
            gamepad.value(Axis::LeftStickY),
        ],
        right_stick: [
            gamepad.value(Axis::RightStickX),
            gamepad.value(Axis::RightStickY),
        ],
    }
}
