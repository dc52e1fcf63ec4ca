//! Single-controller state: fourteen digital buttons, two triggers, two sticks and
//! the two vibration motor speeds the application writes back.

use crate::button::{AnalogButton, DigitalButton, Stick};
use crate::config::ControllerConfig;

/// Digital button states as read from the controller this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ButtonReading {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub start: bool,
    pub back: bool,
    pub left_thumb: bool,
    pub right_thumb: bool,
    pub left_shoulder: bool,
    pub right_shoulder: bool,
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
}

/// One poll of a connected controller. Triggers are in `[0, 1]`, stick axes in `[-1, 1]`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ControllerReading {
    pub buttons: ButtonReading,
    pub left_trigger: f32,
    pub right_trigger: f32,
    pub left_stick: [f32; 2],
    pub right_stick: [f32; 2],
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Gamepad {
    pub connected: bool,
    pub up_button: DigitalButton,
    pub down_button: DigitalButton,
    pub left_button: DigitalButton,
    pub right_button: DigitalButton,
    pub start_button: DigitalButton,
    pub back_button: DigitalButton,
    pub left_thumb_button: DigitalButton,
    pub right_thumb_button: DigitalButton,
    pub left_shoulder_button: DigitalButton,
    pub right_shoulder_button: DigitalButton,
    pub a_button: DigitalButton,
    pub b_button: DigitalButton,
    pub x_button: DigitalButton,
    pub y_button: DigitalButton,
    pub left_trigger: AnalogButton,
    pub right_trigger: AnalogButton,
    pub left_thumb_stick: Stick,
    pub right_thumb_stick: Stick,
    /// Written by the application, sent on push. Clamped to `[0, 1]` on output.
    pub left_motor_speed: f32,
    pub right_motor_speed: f32,
}

impl Gamepad {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            left_trigger: AnalogButton::with_threshold(config.trigger_threshold),
            right_trigger: AnalogButton::with_threshold(config.trigger_threshold),
            left_thumb_stick: Stick::with_threshold(config.left_stick_deadzone),
            right_thumb_stick: Stick::with_threshold(config.right_stick_deadzone),
            ..Self::default()
        }
    }

    /// Folds one poll into the gamepad. `None` marks the controller disconnected; its
    /// inputs go back to rest, releasing anything that was held.
    pub fn apply(&mut self, reading: Option<ControllerReading>) {
        let connected = reading.is_some();
        if connected != self.connected {
            log::info!(
                "Controller {}",
                if connected { "connected" } else { "disconnected" }
            );
        }
        self.connected = connected;
        let reading = reading.unwrap_or_default();

        let b = reading.buttons;
        self.up_button.update(b.up);
        self.down_button.update(b.down);
        self.left_button.update(b.left);
        self.right_button.update(b.right);
        self.start_button.update(b.start);
        self.back_button.update(b.back);
        self.left_thumb_button.update(b.left_thumb);
        self.right_thumb_button.update(b.right_thumb);
        self.left_shoulder_button.update(b.left_shoulder);
        self.right_shoulder_button.update(b.right_shoulder);
        self.a_button.update(b.a);
        self.b_button.update(b.b);
        self.x_button.update(b.x);
        self.y_button.update(b.y);
        self.left_trigger.update(reading.left_trigger);
        self.right_trigger.update(reading.right_trigger);
        self.left_thumb_stick
            .update(reading.left_stick[0], reading.left_stick[1]);
        self.right_thumb_stick
            .update(reading.right_stick[0], reading.right_stick[1]);
    }

    /// Motor speeds scaled to the output device's 16-bit range.
    pub fn motor_output(&self) -> (u16, u16) {
        (
            motor_speed_to_u16(self.left_motor_speed),
            motor_speed_to_u16(self.right_motor_speed),
        )
    }
}

fn motor_speed_to_u16(speed: f32) -> u16 {
    if speed.is_nan() {
        return 0;
    }
    (speed.clamp(0.0, 1.0) * u16::MAX as f32) as u16
}
