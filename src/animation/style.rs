//! Opacity styles for the spokes.
//!
//! A style maps a spoke's phase within the revolution to an opacity. Every
//! style except [`Style::Sparkle`] is a pure function of
//! `(frame, total_frames, variant)`.
//!
//! ## Styles
//!
//! - [`Style::Wave`] - Symmetric power-curve pulse, peaking half way through the cycle
//! - [`Style::Trail`] - Quadratic ramp repeated `variant + 1` times per revolution
//! - [`Style::Pan`] - Binary on/off wedges
//! - [`Style::Sparkle`] - Random flicker, independent of the frame

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::color::Color;
use crate::error::ConfigurationError;

/// Exponent used by [`Style::Wave`] when the variant is zero.
pub const WAVE_DEFAULT_EXPONENT: f64 = 2.3;
/// Highest sparkle variant; larger variants use this one.
pub const SPARKLE_MAX_VARIANT: u32 = 4;

/// Opacity modulation style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Style {
    /// Smoothly pulsing comet-like trail
    #[default]
    Wave,
    /// `variant + 1` bright heads per revolution
    Trail,
    /// Alternating on/off wedges
    Pan,
    /// Stochastic flicker
    Sparkle,
}

/// What a style decided for one spoke
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpokeTone {
    /// Opacity in `[0, 1]`
    pub opacity: f64,
    /// Colour override for this spoke, if the style picks one
    pub color: Option<Color>,
}

impl SpokeTone {
    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
            color: None,
        }
    }
}

impl Style {
    pub const ALL: [Style; 4] = [Style::Wave, Style::Trail, Style::Pan, Style::Sparkle];

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Wave => "wave",
            Style::Trail => "trail",
            Style::Pan => "pan",
            Style::Sparkle => "sparkle",
        }
    }

    /// Whether the style ignores the frame and draws randomly
    pub fn is_stochastic(self) -> bool {
        matches!(self, Style::Sparkle)
    }

    /// Evaluate the style for a spoke at `frame`.
    ///
    /// `rng` is only consulted by [`Style::Sparkle`].
    pub fn evaluate<R: Rng>(
        self,
        frame: f64,
        total_frames: f64,
        variant: u32,
        rng: &mut R,
    ) -> SpokeTone {
        match self {
            Style::Wave => SpokeTone::opacity(wave(frame, total_frames, variant)),
            Style::Trail => SpokeTone::opacity(trail(frame, total_frames, variant)),
            Style::Pan => SpokeTone::opacity(pan(frame, total_frames, variant)),
            Style::Sparkle => sparkle(variant, rng),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Style::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigurationError::Style(s.to_string()))
    }
}

/// Position within the revolution, in `[0, 1)`
fn cycle_position(frame: f64, total_frames: f64) -> f64 {
    let t = (frame / total_frames).rem_euclid(1.0);
    // rem_euclid may round up to exactly 1.0
    if t >= 1.0 {
        0.0
    } else {
        t
    }
}

pub fn wave(frame: f64, total_frames: f64, variant: u32) -> f64 {
    let exponent = if variant == 0 {
        WAVE_DEFAULT_EXPONENT
    } else {
        variant as f64
    };
    let t = cycle_position(frame, total_frames);
    let rise = if t < 0.5 { 2.0 * t } else { 2.0 * (1.0 - t) };
    rise.powf(exponent).clamp(0.0, 1.0)
}

pub fn trail(frame: f64, total_frames: f64, variant: u32) -> f64 {
    let segments = variant as f64 + 1.0;
    let u = cycle_position(frame * segments, total_frames);
    (u * u).clamp(0.0, 1.0)
}

pub fn pan(frame: f64, total_frames: f64, variant: u32) -> f64 {
    let t = cycle_position(frame, total_frames);
    let on = match variant {
        0 => t < 0.5,
        1 => t < 1.0 / 3.0,
        v => {
            let wedges = 2 * u64::from(v);
            let wedge = ((t * wedges as f64).floor() as u64).min(wedges - 1);
            wedge % 2 == 0
        }
    };
    if on {
        1.0
    } else {
        0.0
    }
}

pub fn sparkle<R: Rng>(variant: u32, rng: &mut R) -> SpokeTone {
    match variant.min(SPARKLE_MAX_VARIANT) {
        0 => SpokeTone::opacity(rng.random::<f64>()),
        1 => SpokeTone::opacity(if rng.random_bool(0.5) { 1.0 } else { 0.0 }),
        2 => SpokeTone::opacity(if rng.random_bool(0.25) { 1.0 } else { 0.2 }),
        3 => SpokeTone::opacity(rng.random::<f64>().powi(3)),
        _ => SpokeTone {
            opacity: rng.random::<f64>(),
            color: Some(Color::from_rgb8(rng.random(), rng.random(), rng.random())),
        },
    }
}
