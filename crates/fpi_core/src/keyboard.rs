//! Keyboard table with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (down):** true every frame the key is physically down.
//! - **Edge-triggered (pressed / released):** true only during the frame the
//!   transition was observed.
//!
//! The table is indexed by virtual-key code and re-polled in full on every pull,
//! so each key runs through the edge detector exactly once per frame.

use crate::button::DigitalButton;

pub const MAX_KEYS: usize = 256;

/// Virtual-key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub u8);

impl Key {
    pub const MOUSE_LEFT: Key = Key(0x01);
    pub const MOUSE_RIGHT: Key = Key(0x02);
    pub const MOUSE_MIDDLE: Key = Key(0x04);
    pub const BACKSPACE: Key = Key(0x08);
    pub const TAB: Key = Key(0x09);
    pub const ENTER: Key = Key(0x0D);
    pub const SHIFT: Key = Key(0x10);
    pub const CONTROL: Key = Key(0x11);
    pub const ALT: Key = Key(0x12);
    pub const PAUSE: Key = Key(0x13);
    pub const CAPS_LOCK: Key = Key(0x14);
    pub const ESCAPE: Key = Key(0x1B);
    pub const SPACE: Key = Key(0x20);
    pub const PAGE_UP: Key = Key(0x21);
    pub const PAGE_DOWN: Key = Key(0x22);
    pub const END: Key = Key(0x23);
    pub const HOME: Key = Key(0x24);
    pub const LEFT: Key = Key(0x25);
    pub const UP: Key = Key(0x26);
    pub const RIGHT: Key = Key(0x27);
    pub const DOWN: Key = Key(0x28);
    pub const INSERT: Key = Key(0x2D);
    pub const DELETE: Key = Key(0x2E);

    /// `'0'..='9'` and `'A'..='Z'` (either case) map onto their virtual-key codes.
    pub const fn from_char(c: char) -> Option<Key> {
        match c {
            '0'..='9' | 'A'..='Z' => Some(Key(c as u8)),
            'a'..='z' => Some(Key(c.to_ascii_uppercase() as u8)),
            _ => None,
        }
    }

    /// `F1` is `function(1)`; returns `None` outside `1..=24`.
    pub const fn function(n: u8) -> Option<Key> {
        if n >= 1 && n <= 24 {
            Some(Key(0x70 + n - 1))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Keyboard {
    pub keys: [DigitalButton; MAX_KEYS],
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            keys: [DigitalButton::default(); MAX_KEYS],
        }
    }

    /// Runs the edge detector over a freshly polled key table.
    pub fn pull(&mut self, table: &[bool; MAX_KEYS]) {
        for (button, &down) in self.keys.iter_mut().zip(table.iter()) {
            button.update(down);
        }
    }

    pub fn key(&self, key: Key) -> DigitalButton {
        self.keys[key.index()]
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.keys[key.index()].down
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys[key.index()].pressed
    }

    pub fn is_released(&self, key: Key) -> bool {
        self.keys[key.index()].released
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}
