//! Edge detection for digital buttons, analog buttons and deadzone-filtered sticks.
//!
//! Every `update` computes `pressed`/`released` relative to the button's own previous
//! `down`. Callers must update each input source exactly once per frame: a second
//! update in the same frame compares against the first update's result, not against
//! the state the frame started with, and edges get lost.

use glam::Vec2;

/// Edge-detected on/off input (keyboard key, mouse button, controller face button).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DigitalButton {
    pub down: bool,
    pub pressed: bool,
    pub released: bool,
}

impl DigitalButton {
    pub fn update(&mut self, down: bool) {
        let was_down = self.down;
        self.pressed = !was_down && down;
        self.released = was_down && !down;
        self.down = down;
    }
}

/// Analog input (trigger) reported as digital through a single threshold.
///
/// The same boundary is used for entering and leaving `down`, so a value sitting
/// exactly on `threshold` and jittering around it re-triggers edges.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AnalogButton {
    pub threshold: f32,
    pub value: f32,
    pub down: bool,
    pub pressed: bool,
    pub released: bool,
}

impl AnalogButton {
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    pub fn update(&mut self, value: f32) {
        self.value = value;
        let was_down = self.down;
        self.down = value >= self.threshold;
        self.pressed = !was_down && self.down;
        self.released = was_down && !self.down;
    }
}

/// Two-axis stick with a per-axis deadzone.
///
/// Axes are filtered independently (square deadzone); values outside the deadzone
/// pass through without rescaling.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Stick {
    pub threshold: f32,
    pub x: f32,
    pub y: f32,
}

impl Stick {
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    pub fn update(&mut self, x: f32, y: f32) {
        self.x = apply_deadzone(x, self.threshold);
        self.y = apply_deadzone(y, self.threshold);
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn is_deflected(&self) -> bool {
        self.x != 0.0 || self.y != 0.0
    }
}

fn apply_deadzone(value: f32, threshold: f32) -> f32 {
    if value.abs() <= threshold {
        0.0
    } else {
        value
    }
}

/// Maps an 8-bit trigger reading to `[0, 1]`.
pub fn normalize_trigger(raw: u8) -> f32 {
    raw as f32 / 255.0
}

/// Maps a signed 16-bit thumbstick reading to roughly `[-1, 1]`.
pub fn normalize_thumb(raw: i16) -> f32 {
    2.0 * (((raw as f32 + 32768.0) / 65535.0) - 0.5)
}
