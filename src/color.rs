//! Stroke colours and their CSS-style string forms.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Parse a CSS colour: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb(r, g, b)`, `rgba(r, g, b, a)` or a basic named colour.
    pub fn parse(input: &str) -> Result<Self, ConfigurationError> {
        let err = || ConfigurationError::Color(input.to_string());
        let s = input.trim().to_ascii_lowercase();

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }
        if let Some(args) = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_functional(args).ok_or_else(err);
        }
        named(&s).ok_or_else(err)
    }

    fn channel_u8(value: f32) -> u8 {
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = (
            Self::channel_u8(self.r),
            Self::channel_u8(self.g),
            Self::channel_u8(self.b),
        );
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", r, g, b, self.a.max(0.0))
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let (r, g, b, a) = match hex.len() {
        3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
        4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
        6 => (byte(0)?, byte(2)?, byte(4)?, 255),
        8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
        _ => return None,
    };
    let mut color = Color::from_rgb8(r, g, b);
    color.a = a as f32 / 255.0;
    Some(color)
}

fn parse_functional(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let mut channels = [0.0f32; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        let value: f32 = match part.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => part.parse::<f32>().ok()? / 255.0,
        };
        if !(0.0..=1.0).contains(&value) {
            return None;
        }
        *slot = value;
    }
    let alpha = match parts.get(3) {
        Some(part) => {
            let a: f32 = part.parse().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            a
        }
        None => 1.0,
    };
    Some(Color::rgba(channels[0], channels[1], channels[2], alpha))
}

fn named(name: &str) -> Option<Color> {
    let hex = match name {
        "black" => 0x000000,
        "white" => 0xffffff,
        "gray" | "grey" => 0x808080,
        "silver" => 0xc0c0c0,
        "red" => 0xff0000,
        "maroon" => 0x800000,
        "orange" => 0xffa500,
        "yellow" => 0xffff00,
        "olive" => 0x808000,
        "lime" => 0x00ff00,
        "green" => 0x008000,
        "aqua" | "cyan" => 0x00ffff,
        "teal" => 0x008080,
        "blue" => 0x0000ff,
        "navy" => 0x000080,
        "fuchsia" | "magenta" => 0xff00ff,
        "purple" => 0x800080,
        "transparent" => return Some(Color::TRANSPARENT),
        _ => return None,
    };
    Some(Color::from_hex(hex))
}
