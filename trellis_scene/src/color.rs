// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colors.

use core::fmt;

/// An sRGB color with alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel; 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Cyan.
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    /// Dark gray.
    pub const DARK_GRAY: Self = Self::rgb(64, 64, 64);
    /// Gray.
    pub const GRAY: Self = Self::rgb(128, 128, 128);
    /// Green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Light gray.
    pub const LIGHT_GRAY: Self = Self::rgb(192, 192, 192);
    /// Magenta.
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    /// Orange.
    pub const ORANGE: Self = Self::rgb(255, 200, 0);
    /// Pink.
    pub const PINK: Self = Self::rgb(255, 175, 175);
    /// Red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Yellow.
    pub const YELLOW: Self = Self::rgb(255, 255, 0);

    const NAMED: [(Self, &'static str); 13] = [
        (Self::BLACK, "BLACK"),
        (Self::BLUE, "BLUE"),
        (Self::CYAN, "CYAN"),
        (Self::DARK_GRAY, "DARK_GRAY"),
        (Self::GRAY, "GRAY"),
        (Self::GREEN, "GREEN"),
        (Self::LIGHT_GRAY, "LIGHT_GRAY"),
        (Self::MAGENTA, "MAGENTA"),
        (Self::ORANGE, "ORANGE"),
        (Self::PINK, "PINK"),
        (Self::RED, "RED"),
        (Self::WHITE, "WHITE"),
        (Self::YELLOW, "YELLOW"),
    ];

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The 24-bit `0xRRGGBB` value, ignoring alpha.
    pub const fn to_rgb24(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Name of one of the predefined colors, if this is one.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(c, _)| *c == self)
            .map(|(_, name)| *name)
    }
}

/// Predefined colors print their name, anything else prints as `0xRRGGBB`
/// without zero padding.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:X}", self.to_rgb24()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_display_their_name() {
        assert_eq!(Color::DARK_GRAY.to_string(), "DARK_GRAY");
        assert_eq!(Color::rgb(255, 200, 0).to_string(), "ORANGE");
    }

    #[test]
    fn other_colors_display_as_hex() {
        assert_eq!(Color::rgb(0x12, 0xAB, 0x0F).to_string(), "0x12AB0F");
        assert_eq!(Color::rgb(0, 0, 1).to_string(), "0x1");
    }

    #[test]
    fn alpha_is_not_part_of_the_name() {
        assert_eq!(Color::rgba(255, 0, 0, 10).name(), None);
        assert_eq!(Color::rgba(255, 0, 0, 10).to_rgb24(), 0xFF_0000);
    }
}
