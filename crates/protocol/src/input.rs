//! Player input for a single frame.
//!
//! Inputs are collected every fixed tick and exchanged between peers;
//! one byte is enough for the five buttons.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Bitflags for the pressed buttons of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct PlayerInput {
    /// Raw bitfield of pressed inputs.
    pub bits: u8,
}

impl PlayerInput {
    pub const UP: u8 = 1 << 0;
    pub const DOWN: u8 = 1 << 1;
    pub const LEFT: u8 = 1 << 2;
    pub const RIGHT: u8 = 1 << 3;
    pub const SHOOT: u8 = 1 << 4;

    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self { bits }
    }

    #[inline]
    pub const fn is_pressed(&self, input: u8) -> bool {
        self.bits & input != 0
    }

    #[inline]
    pub fn set(&mut self, input: u8, pressed: bool) {
        if pressed {
            self.bits |= input;
        } else {
            self.bits &= !input;
        }
    }

    #[inline]
    pub const fn up(&self) -> bool {
        self.is_pressed(Self::UP)
    }

    #[inline]
    pub const fn down(&self) -> bool {
        self.is_pressed(Self::DOWN)
    }

    #[inline]
    pub const fn left(&self) -> bool {
        self.is_pressed(Self::LEFT)
    }

    #[inline]
    pub const fn right(&self) -> bool {
        self.is_pressed(Self::RIGHT)
    }

    #[inline]
    pub const fn shoot(&self) -> bool {
        self.is_pressed(Self::SHOOT)
    }

    /// Horizontal axis as -1, 0 or 1.
    pub const fn horizontal(&self) -> i8 {
        match (self.left(), self.right()) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }

    /// Vertical axis as -1, 0 or 1.
    pub const fn vertical(&self) -> i8 {
        match (self.down(), self.up()) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }

    /// True if any directional button wins over its opposite.
    pub const fn is_moving(&self) -> bool {
        self.horizontal() != 0 || self.vertical() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_flags() {
        let mut input = PlayerInput::new();
        assert!(!input.shoot());

        input.set(PlayerInput::SHOOT, true);
        assert!(input.shoot());
        assert!(!input.up());

        input.set(PlayerInput::UP, true);
        assert!(input.shoot());
        assert!(input.up());

        input.set(PlayerInput::SHOOT, false);
        assert!(!input.shoot());
        assert!(input.up());
    }

    #[test]
    fn axis_values() {
        let mut input = PlayerInput::new();
        assert_eq!(input.horizontal(), 0);
        assert_eq!(input.vertical(), 0);
        assert!(!input.is_moving());

        input.set(PlayerInput::LEFT, true);
        assert_eq!(input.horizontal(), -1);
        assert!(input.is_moving());

        input.set(PlayerInput::RIGHT, true);
        // Both pressed = cancel out
        assert_eq!(input.horizontal(), 0);
        assert!(!input.is_moving());

        input.set(PlayerInput::LEFT, false);
        assert_eq!(input.horizontal(), 1);
    }
}
