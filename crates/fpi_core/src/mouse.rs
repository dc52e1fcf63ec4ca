use glam::IVec2;

use crate::button::DigitalButton;

/// Mouse state as seen by the application for one frame.
///
/// `delta_position` and `delta_wheel` are what raw input reported during the frame;
/// `position` and `wheel` are the running absolutes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Mouse {
    pub left_button: DigitalButton,
    pub right_button: DigitalButton,
    pub wheel: i32,
    pub delta_wheel: i32,
    pub position: IVec2,
    pub delta_position: IVec2,
}

impl Mouse {
    pub fn button(&self, button: MouseButton) -> DigitalButton {
        match button {
            MouseButton::Left => self.left_button,
            MouseButton::Right => self.right_button,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}
