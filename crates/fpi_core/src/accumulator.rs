//! Event-sourced per-frame deltas.
//!
//! Lifecycle within one pull: `reset` → messages recorded while the pump runs →
//! `fold_into` the absolute mouse state → not touched again until the next pull.
//! Several raw events in one frame sum up; the fold applies the sum exactly once.
//!
//! Mouse buttons still get one edge update per frame. A press and release that both
//! land inside one frame (a trackpad tap) report `pressed` in that frame and the
//! release is deferred to the next fold.

use glam::IVec2;

use crate::mouse::Mouse;
use crate::pump::{MessageHandler, PlatformMessage, RawMouse};

/// Text buffer capacity in bytes, including room for a terminator on platforms that
/// want one. Characters that would overflow it are dropped for the frame.
pub const MAX_TEXT: usize = 256;

/// Raw transitions of one mouse button within a frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ButtonLatch {
    /// Latest raw state, `None` if no event touched the button.
    latest: Option<bool>,
    went_down: bool,
    /// A tap was reported down last fold; release it on this one. Survives `reset`.
    release_pending: bool,
}

impl ButtonLatch {
    fn reset(&mut self) {
        self.latest = None;
        self.went_down = false;
    }

    fn record(&mut self, down: bool) {
        self.went_down |= down;
        self.latest = Some(down);
    }

    /// The down state the edge detector sees this frame, given the state it saw last.
    fn resolve(&mut self, previous: bool) -> bool {
        if self.release_pending {
            self.release_pending = false;
            return self.latest.unwrap_or(false);
        }
        let down = self.latest.unwrap_or(previous);
        if self.went_down && !down && !previous {
            self.release_pending = true;
            return true;
        }
        down
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameAccumulator {
    pub delta_position: IVec2,
    pub delta_wheel: i32,
    text: String,
    left_button: ButtonLatch,
    right_button: ButtonLatch,
    resized: bool,
    /// Sticky: survives `reset`.
    destroyed: bool,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self {
            text: String::with_capacity(MAX_TEXT),
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        self.delta_position = IVec2::ZERO;
        self.delta_wheel = 0;
        self.text.clear();
        self.left_button.reset();
        self.right_button.reset();
        self.resized = false;
    }

    fn record_mouse(&mut self, raw: &RawMouse) {
        self.delta_position += IVec2::new(raw.dx, raw.dy);
        self.delta_wheel += raw.wheel;
        if let Some(down) = raw.left {
            self.left_button.record(down);
        }
        if let Some(down) = raw.right {
            self.right_button.record(down);
        }
    }

    fn record_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if self.text.len() + c.len_utf8() > MAX_TEXT - 1 {
            log::debug!("Text buffer full, dropping {:?}", c);
            return;
        }
        self.text.push(c);
    }

    /// Applies this frame's deltas to the absolute mouse state. Each mouse button
    /// goes through the edge detector exactly once.
    pub fn fold_into(&mut self, mouse: &mut Mouse) {
        mouse.delta_position = self.delta_position;
        mouse.delta_wheel = self.delta_wheel;
        mouse.position += self.delta_position;
        mouse.wheel += self.delta_wheel;

        let left_down = self.left_button.resolve(mouse.left_button.down);
        mouse.left_button.update(left_down);
        let right_down = self.right_button.resolve(mouse.right_button.down);
        mouse.right_button.update(right_down);
    }

    /// Text typed this frame, `None` when nothing arrived.
    pub fn text(&self) -> Option<&str> {
        (!self.text.is_empty()).then_some(self.text.as_str())
    }

    pub fn resized(&self) -> bool {
        self.resized
    }

    pub fn destroyed(&self) -> bool {
        self.destroyed
    }
}

impl MessageHandler for FrameAccumulator {
    fn handle(&mut self, message: &PlatformMessage) {
        match message {
            PlatformMessage::RawMouse(raw) => self.record_mouse(raw),
            PlatformMessage::Char(c) => self.record_char(*c),
            PlatformMessage::Sizing => self.resized = true,
            PlatformMessage::Destroy => {
                if !self.destroyed {
                    log::info!("Window destroyed");
                }
                self.destroyed = true;
            }
            PlatformMessage::EnterModalLoop
            | PlatformMessage::ExitModalLoop
            | PlatformMessage::Timer => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse_move(dx: i32, dy: i32) -> PlatformMessage {
        PlatformMessage::RawMouse(RawMouse {
            dx,
            dy,
            ..RawMouse::default()
        })
    }

    fn left(down: bool) -> PlatformMessage {
        PlatformMessage::RawMouse(RawMouse {
            left: Some(down),
            ..RawMouse::default()
        })
    }

    #[test]
    fn mouse_moves_accumulate_and_fold_once() {
        let mut acc = FrameAccumulator::new();
        acc.handle(&mouse_move(3, -1));
        acc.handle(&mouse_move(2, 4));
        assert_eq!(acc.delta_position, IVec2::new(5, 3));

        let mut mouse = Mouse {
            position: IVec2::new(100, 100),
            ..Mouse::default()
        };
        acc.fold_into(&mut mouse);
        assert_eq!(mouse.delta_position, IVec2::new(5, 3));
        assert_eq!(mouse.position, IVec2::new(105, 103));
    }

    #[test]
    fn wheel_accumulates() {
        let mut acc = FrameAccumulator::new();
        for wheel in [1, 1, -3] {
            acc.handle(&PlatformMessage::RawMouse(RawMouse {
                wheel,
                ..RawMouse::default()
            }));
        }
        let mut mouse = Mouse {
            wheel: 10,
            ..Mouse::default()
        };
        acc.fold_into(&mut mouse);
        assert_eq!(mouse.delta_wheel, -1);
        assert_eq!(mouse.wheel, 9);
    }

    #[test]
    fn reset_zeroes_deltas_but_keeps_destroyed() {
        let mut acc = FrameAccumulator::new();
        acc.handle(&mouse_move(1, 1));
        acc.handle(&PlatformMessage::Char('x'));
        acc.handle(&PlatformMessage::Sizing);
        acc.handle(&PlatformMessage::Destroy);
        acc.handle(&left(true));
        acc.reset();

        assert_eq!(acc.delta_position, IVec2::ZERO);
        assert_eq!(acc.delta_wheel, 0);
        assert_eq!(acc.text(), None);
        assert!(!acc.resized());
        assert!(acc.destroyed());

        let mut mouse = Mouse::default();
        acc.fold_into(&mut mouse);
        assert!(!mouse.left_button.down);
    }

    #[test]
    fn text_is_none_until_typed() {
        let mut acc = FrameAccumulator::new();
        assert_eq!(acc.text(), None);
        acc.handle(&PlatformMessage::Char('a'));
        assert_eq!(acc.text(), Some("a"));
    }

    #[test]
    fn control_characters_are_not_text() {
        let mut acc = FrameAccumulator::new();
        acc.handle(&PlatformMessage::Char('\u{8}'));
        acc.handle(&PlatformMessage::Char('\r'));
        assert_eq!(acc.text(), None);
    }

    #[test]
    fn text_overflow_drops_characters() {
        let mut acc = FrameAccumulator::new();
        for _ in 0..MAX_TEXT + 10 {
            acc.handle(&PlatformMessage::Char('z'));
        }
        assert_eq!(acc.text().map(str::len), Some(MAX_TEXT - 1));
        // A multi-byte character no longer fits either.
        acc.handle(&PlatformMessage::Char('é'));
        assert_eq!(acc.text().map(str::len), Some(MAX_TEXT - 1));
    }

    #[test]
    fn mouse_button_edges_computed_once_per_frame() {
        let mut acc = FrameAccumulator::new();
        let mut mouse = Mouse::default();

        acc.handle(&left(true));
        acc.fold_into(&mut mouse);
        assert!(mouse.left_button.pressed);

        // Held with no further events.
        acc.reset();
        acc.fold_into(&mut mouse);
        assert!(mouse.left_button.down);
        assert!(!mouse.left_button.pressed);

        acc.reset();
        acc.handle(&left(false));
        acc.fold_into(&mut mouse);
        assert!(mouse.left_button.released);
        assert!(!mouse.left_button.pressed);
    }

    #[test]
    fn tap_within_one_frame_presses_then_releases_next_frame() {
        let mut acc = FrameAccumulator::new();
        let mut mouse = Mouse::default();
        acc.handle(&left(true));
        acc.handle(&left(false));
        acc.fold_into(&mut mouse);
        assert!(mouse.left_button.down);
        assert!(mouse.left_button.pressed);
        assert!(!mouse.left_button.released);

        acc.reset();
        acc.fold_into(&mut mouse);
        assert!(!mouse.left_button.down);
        assert!(!mouse.left_button.pressed);
        assert!(mouse.left_button.released);

        acc.reset();
        acc.fold_into(&mut mouse);
        assert!(!mouse.left_button.released);
    }

    #[test]
    fn press_after_tap_keeps_button_down() {
        let mut acc = FrameAccumulator::new();
        let mut mouse = Mouse::default();
        acc.handle(&left(true));
        acc.handle(&left(false));
        acc.fold_into(&mut mouse);

        acc.reset();
        acc.handle(&left(true));
        acc.fold_into(&mut mouse);
        assert!(mouse.left_button.down);
        assert!(!mouse.left_button.released);
    }

    #[test]
    fn release_then_press_of_held_button_has_no_edges() {
        let mut acc = FrameAccumulator::new();
        let mut mouse = Mouse::default();
        acc.handle(&left(true));
        acc.fold_into(&mut mouse);

        acc.reset();
        acc.handle(&left(false));
        acc.handle(&left(true));
        acc.fold_into(&mut mouse);
        assert!(mouse.left_button.down);
        assert!(!mouse.left_button.pressed);
        assert!(!mouse.left_button.released);
    }

    #[test]
    fn right_button_tracked_separately() {
        let mut acc = FrameAccumulator::new();
        let mut mouse = Mouse::default();
        acc.handle(&PlatformMessage::RawMouse(RawMouse {
            right: Some(true),
            ..RawMouse::default()
        }));
        acc.fold_into(&mut mouse);
        assert!(mouse.right_button.pressed);
        assert!(!mouse.left_button.down);
    }
}
