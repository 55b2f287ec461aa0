//! Spinner configuration: primary parameters, validation, and the single
//! dispatch used by both per-parameter and bulk updates.

use std::fmt;
use std::str::FromStr;

use crate::animation::Style;
use crate::color::Color;
use crate::error::ConfigurationError;
use crate::invalidation::ChangeFlags;

/// Upper bound for any frame rate, explicit or derived.
pub const MAX_FRAME_RATE: f64 = 1000.0;
/// Frame rate used when the rate is not pinned.
pub const DEFAULT_FRAME_RATE: f64 = 20.0;
/// Minimum frame count an automatic rate aims for on short periods.
pub const SHORT_PERIOD_MIN_FRAMES: f64 = 5.0;
/// A cycle needs at least this many frames to show motion at all.
pub const MIN_FRAMES: f64 = 2.0;

const FRAME_EPSILON: f64 = 1e-9;

/// Duration of one full revolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Period {
    Short,
    Normal,
    Long,
    Seconds(f64),
}

impl Period {
    pub fn seconds(self) -> f64 {
        match self {
            Period::Short => 0.5,
            Period::Normal => 1.5,
            Period::Long => 2.5,
            Period::Seconds(s) => s,
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Normal
    }
}

impl FromStr for Period {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(Period::Short),
            "normal" => Ok(Period::Normal),
            "long" => Ok(Period::Long),
            other => other
                .parse::<f64>()
                .map(Period::Seconds)
                .map_err(|_| ConfigurationError::Period(s.to_string())),
        }
    }
}

/// Frame rate setting. A fixed rate pins the rate; `Auto` derives it from the period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FrameRate {
    #[default]
    Auto,
    Fixed(f64),
}

impl FrameRate {
    /// Resolve to frames per second for the given period.
    pub fn resolve(self, period: f64) -> f64 {
        match self {
            FrameRate::Fixed(fps) => fps,
            FrameRate::Auto => auto_frame_rate(period),
        }
    }

    pub fn is_pinned(self) -> bool {
        matches!(self, FrameRate::Fixed(_))
    }
}

impl FromStr for FrameRate {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(FrameRate::Auto);
        }
        trimmed
            .parse::<f64>()
            .map(FrameRate::Fixed)
            .map_err(|_| ConfigurationError::FrameRate(s.to_string()))
    }
}

/// Default rate, raised on short periods so a cycle still has enough frames.
pub fn auto_frame_rate(period: f64) -> f64 {
    if period * DEFAULT_FRAME_RATE < SHORT_PERIOD_MIN_FRAMES {
        (SHORT_PERIOD_MIN_FRAMES / period).min(MAX_FRAME_RATE)
    } else {
        DEFAULT_FRAME_RATE
    }
}

/// The full, validated parameter record of a spinner.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinnerConfig {
    pub spoke_count: u32,
    pub spoke_width: f64,
    pub spoke_color: Color,
    pub spoke_length: f64,
    pub spoke_outset: f64,
    pub style: Style,
    pub style_variant: u32,
    pub clockwise: bool,
    /// Seconds per revolution
    pub period: f64,
    pub frame_rate: FrameRate,
    pub autostart: bool,
}

impl Default for SpinnerConfig {
    fn default() -> Self {
        Self {
            spoke_count: 12,
            spoke_width: 2.0,
            spoke_color: Color::from_hex(0x333333),
            spoke_length: 6.0,
            spoke_outset: 5.0,
            style: Style::Wave,
            style_variant: 0,
            clockwise: true,
            period: Period::Normal.seconds(),
            frame_rate: FrameRate::Auto,
            autostart: true,
        }
    }
}

impl SpinnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoke_count(mut self, count: u32) -> Self {
        self.spoke_count = count;
        self
    }

    pub fn spoke_width(mut self, width: f64) -> Self {
        self.spoke_width = width;
        self
    }

    pub fn spoke_color(mut self, color: Color) -> Self {
        self.spoke_color = color;
        self
    }

    pub fn spoke_length(mut self, length: f64) -> Self {
        self.spoke_length = length;
        self
    }

    pub fn spoke_outset(mut self, outset: f64) -> Self {
        self.spoke_outset = outset;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn style_variant(mut self, variant: u32) -> Self {
        self.style_variant = variant;
        self
    }

    pub fn clockwise(mut self, clockwise: bool) -> Self {
        self.clockwise = clockwise;
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = period.seconds();
        self
    }

    pub fn frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn autostart(mut self, autostart: bool) -> Self {
        self.autostart = autostart;
        self
    }

    /// Frames per second currently in effect.
    pub fn resolved_frame_rate(&self) -> f64 {
        self.frame_rate.resolve(self.period)
    }

    /// Fractional frame count of one revolution.
    pub fn total_frames(&self) -> f64 {
        self.period * self.resolved_frame_rate()
    }

    /// Milliseconds between two frames.
    pub fn frame_delay(&self) -> f64 {
        1000.0 / self.resolved_frame_rate()
    }

    /// Check every field of a config built outside the setters.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_spoke_count(self.spoke_count)?;
        validate_positive("spokeWidth", self.spoke_width)?;
        validate_positive("spokeLength", self.spoke_length)?;
        validate_positive("spokeOutset", self.spoke_outset)?;
        validate_period(self.period)?;
        if let FrameRate::Fixed(fps) = self.frame_rate {
            validate_frame_rate(fps)?;
        }
        validate_timing(self.period, self.frame_rate).map(|_| ())
    }

    /// Validate and commit a single parameter.
    ///
    /// Returns the derived state the change invalidates. On error the
    /// configuration is left untouched.
    pub fn apply(
        &mut self,
        name: ParamName,
        value: &ParamValue,
    ) -> Result<ChangeFlags, ConfigurationError> {
        let flags = match name {
            ParamName::SpokeCount => {
                let count = value.as_u32(name)?;
                validate_spoke_count(count)?;
                self.spoke_count = count;
                ChangeFlags::GEOMETRY
            }
            ParamName::SpokeWidth => {
                self.spoke_width = validate_positive(name.as_str(), value.as_f64(name)?)?;
                ChangeFlags::GEOMETRY
            }
            ParamName::SpokeColor => {
                self.spoke_color = value.as_color(name)?;
                ChangeFlags::GEOMETRY
            }
            ParamName::SpokeLength => {
                self.spoke_length = validate_positive(name.as_str(), value.as_f64(name)?)?;
                ChangeFlags::GEOMETRY
            }
            ParamName::SpokeOutset => {
                self.spoke_outset = validate_positive(name.as_str(), value.as_f64(name)?)?;
                ChangeFlags::GEOMETRY
            }
            ParamName::Style => {
                self.style = value.as_style(name)?;
                ChangeFlags::PAINT
            }
            ParamName::StyleVariant => {
                self.style_variant = value.as_u32(name)?;
                ChangeFlags::PAINT
            }
            ParamName::Clockwise => {
                let clockwise = value.as_bool(name)?;
                let changed = clockwise != self.clockwise;
                self.clockwise = clockwise;
                if changed {
                    ChangeFlags::DIRECTION
                } else {
                    ChangeFlags::empty()
                }
            }
            ParamName::Period => {
                let period = validate_period(value.as_period(name)?.seconds())?;
                validate_timing(period, self.frame_rate)?;
                self.commit_timing(period, self.frame_rate)
            }
            ParamName::FrameRate => {
                let frame_rate = value.as_frame_rate(name)?;
                if let FrameRate::Fixed(fps) = frame_rate {
                    validate_frame_rate(fps)?;
                }
                validate_timing(self.period, frame_rate)?;
                self.commit_timing(self.period, frame_rate)
            }
            ParamName::Autostart => {
                self.autostart = value.as_bool(name)?;
                ChangeFlags::empty()
            }
        };
        Ok(flags)
    }

    /// Resolve `period` and `frameRate` from one batch together.
    ///
    /// A field that fails on its own is logged and falls back to its current
    /// value. The resulting pair must still yield enough frames; otherwise the
    /// batch's timing is rejected and nothing is committed.
    pub fn apply_timing(
        &mut self,
        period: Option<&ParamValue>,
        frame_rate: Option<&ParamValue>,
    ) -> Result<ChangeFlags, ConfigurationError> {
        let period = match period {
            Some(value) => match value
                .as_period(ParamName::Period)
                .and_then(|p| validate_period(p.seconds()))
            {
                Ok(seconds) => seconds,
                Err(e) => {
                    log::warn!("Ignoring period in bulk configuration: {}", e);
                    self.period
                }
            },
            None => self.period,
        };

        let frame_rate = match frame_rate {
            Some(value) => match value.as_frame_rate(ParamName::FrameRate).and_then(|r| {
                if let FrameRate::Fixed(fps) = r {
                    validate_frame_rate(fps)?;
                }
                Ok(r)
            }) {
                Ok(rate) => rate,
                Err(e) => {
                    log::warn!("Ignoring frameRate in bulk configuration: {}", e);
                    self.frame_rate
                }
            },
            None => self.frame_rate,
        };

        validate_timing(period, frame_rate)?;
        Ok(self.commit_timing(period, frame_rate))
    }

    fn commit_timing(&mut self, period: f64, frame_rate: FrameRate) -> ChangeFlags {
        let old_frames = self.total_frames();
        let old_fps = self.resolved_frame_rate();
        self.period = period;
        self.frame_rate = frame_rate;
        if old_frames == self.total_frames() && old_fps == self.resolved_frame_rate() {
            ChangeFlags::empty()
        } else {
            ChangeFlags::TIMING
        }
    }

    /// Read a parameter back in its dynamic form.
    pub fn get(&self, name: ParamName) -> ParamValue {
        match name {
            ParamName::SpokeCount => ParamValue::Int(self.spoke_count as i64),
            ParamName::SpokeWidth => ParamValue::Number(self.spoke_width),
            ParamName::SpokeColor => ParamValue::Text(self.spoke_color.to_string()),
            ParamName::SpokeLength => ParamValue::Number(self.spoke_length),
            ParamName::SpokeOutset => ParamValue::Number(self.spoke_outset),
            ParamName::Style => ParamValue::Text(self.style.as_str().to_string()),
            ParamName::StyleVariant => ParamValue::Int(self.style_variant as i64),
            ParamName::Clockwise => ParamValue::Bool(self.clockwise),
            ParamName::Period => ParamValue::Number(self.period),
            ParamName::FrameRate => ParamValue::Number(self.resolved_frame_rate()),
            ParamName::Autostart => ParamValue::Bool(self.autostart),
        }
    }
}

pub fn validate_spoke_count(count: u32) -> Result<u32, ConfigurationError> {
    if count > 1 {
        Ok(count)
    } else {
        Err(ConfigurationError::SpokeCount(count))
    }
}

pub fn validate_positive(name: &'static str, value: f64) -> Result<f64, ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigurationError::NotPositive { name, value })
    }
}

/// A period must be positive and long enough for two frames at the fastest rate.
pub fn validate_period(seconds: f64) -> Result<f64, ConfigurationError> {
    let seconds = validate_positive("period", seconds)?;
    let frames = seconds * MAX_FRAME_RATE;
    if frames + FRAME_EPSILON < MIN_FRAMES {
        return Err(ConfigurationError::TooFewFrames {
            period: seconds,
            frame_rate: MAX_FRAME_RATE,
            frames,
        });
    }
    Ok(seconds)
}

pub fn validate_frame_rate(fps: f64) -> Result<f64, ConfigurationError> {
    if fps.is_finite() && fps > 0.0 && fps <= MAX_FRAME_RATE {
        Ok(fps)
    } else {
        Err(ConfigurationError::FrameRateRange {
            value: fps,
            max: MAX_FRAME_RATE,
        })
    }
}

/// Check that the pair yields at least [`MIN_FRAMES`]; returns the resolved rate.
pub fn validate_timing(period: f64, frame_rate: FrameRate) -> Result<f64, ConfigurationError> {
    let fps = frame_rate.resolve(period);
    let frames = period * fps;
    if frames + FRAME_EPSILON < MIN_FRAMES {
        return Err(ConfigurationError::TooFewFrames {
            period,
            frame_rate: fps,
            frames,
        });
    }
    Ok(fps)
}

/// Names of every configurable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamName {
    SpokeCount,
    SpokeWidth,
    SpokeColor,
    SpokeLength,
    SpokeOutset,
    Style,
    StyleVariant,
    Clockwise,
    Period,
    FrameRate,
    Autostart,
}

impl ParamName {
    pub const ALL: [ParamName; 11] = [
        ParamName::SpokeCount,
        ParamName::SpokeWidth,
        ParamName::SpokeColor,
        ParamName::SpokeLength,
        ParamName::SpokeOutset,
        ParamName::Style,
        ParamName::StyleVariant,
        ParamName::Clockwise,
        ParamName::Period,
        ParamName::FrameRate,
        ParamName::Autostart,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamName::SpokeCount => "spokeCount",
            ParamName::SpokeWidth => "spokeWidth",
            ParamName::SpokeColor => "spokeColor",
            ParamName::SpokeLength => "spokeLength",
            ParamName::SpokeOutset => "spokeOutset",
            ParamName::Style => "style",
            ParamName::StyleVariant => "styleVariant",
            ParamName::Clockwise => "clockwise",
            ParamName::Period => "period",
            ParamName::FrameRate => "frameRate",
            ParamName::Autostart => "autostart",
        }
    }

    /// Parameters resolved jointly in bulk updates.
    pub fn is_timing(self) -> bool {
        matches!(self, ParamName::Period | ParamName::FrameRate)
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamName {
    type Err = ConfigurationError;

    /// Accepts the camelCase names and their snake_case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| *c != '_').collect();
        ParamName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ConfigurationError::UnknownParameter(s.to_string()))
    }
}

/// A dynamically typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Number(f64),
    Text(String),
    Bool(bool),
}

impl ParamValue {
    fn wrong_type(name: ParamName, expected: &'static str) -> ConfigurationError {
        ConfigurationError::WrongType {
            name: name.as_str(),
            expected,
        }
    }

    pub fn as_f64(&self, name: ParamName) -> Result<f64, ConfigurationError> {
        match self {
            ParamValue::Int(v) => Ok(*v as f64),
            ParamValue::Number(v) => Ok(*v),
            ParamValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| Self::wrong_type(name, "a number")),
            ParamValue::Bool(_) => Err(Self::wrong_type(name, "a number")),
        }
    }

    /// Non-negative integers only; fractional numbers are rejected.
    pub fn as_u32(&self, name: ParamName) -> Result<u32, ConfigurationError> {
        let value = self.as_f64(name)?;
        if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
            return Err(Self::wrong_type(name, "a non-negative integer"));
        }
        Ok(value as u32)
    }

    pub fn as_bool(&self, name: ParamName) -> Result<bool, ConfigurationError> {
        match self {
            ParamValue::Bool(b) => Ok(*b),
            ParamValue::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            ParamValue::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(Self::wrong_type(name, "a boolean")),
        }
    }

    pub fn as_color(&self, name: ParamName) -> Result<Color, ConfigurationError> {
        match self {
            ParamValue::Text(s) => Color::parse(s),
            _ => Err(Self::wrong_type(name, "a color string")),
        }
    }

    pub fn as_style(&self, name: ParamName) -> Result<Style, ConfigurationError> {
        match self {
            ParamValue::Text(s) => s.parse(),
            _ => Err(Self::wrong_type(name, "a style name")),
        }
    }

    pub fn as_period(&self, name: ParamName) -> Result<Period, ConfigurationError> {
        match self {
            ParamValue::Text(s) => s.parse(),
            _ => self.as_f64(name).map(Period::Seconds),
        }
    }

    pub fn as_frame_rate(&self, name: ParamName) -> Result<FrameRate, ConfigurationError> {
        match self {
            ParamValue::Text(s) => s.parse(),
            _ => self.as_f64(name).map(FrameRate::Fixed),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<Color> for ParamValue {
    fn from(v: Color) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<Style> for ParamValue {
    fn from(v: Style) -> Self {
        ParamValue::Text(v.as_str().to_string())
    }
}

impl From<Period> for ParamValue {
    fn from(v: Period) -> Self {
        match v {
            Period::Short => ParamValue::Text("short".into()),
            Period::Normal => ParamValue::Text("normal".into()),
            Period::Long => ParamValue::Text("long".into()),
            Period::Seconds(s) => ParamValue::Number(s),
        }
    }
}

impl From<FrameRate> for ParamValue {
    fn from(v: FrameRate) -> Self {
        match v {
            FrameRate::Auto => ParamValue::Text("auto".into()),
            FrameRate::Fixed(fps) => ParamValue::Number(fps),
        }
    }
}

/// An ordered batch of parameter assignments for bulk application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    entries: Vec<(ParamName, ParamValue)>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment. A later assignment to the same name replaces the earlier one.
    pub fn set(mut self, name: ParamName, value: impl Into<ParamValue>) -> Self {
        self.entries.retain(|(n, _)| *n != name);
        self.entries.push((name, value.into()));
        self
    }

    /// Add an assignment by parameter name.
    pub fn set_named(self, name: &str, value: impl Into<ParamValue>) -> Result<Self, ConfigurationError> {
        let name: ParamName = name.parse()?;
        Ok(self.set(name, value))
    }

    pub fn spoke_count(self, count: u32) -> Self {
        self.set(ParamName::SpokeCount, count)
    }

    pub fn spoke_width(self, width: f64) -> Self {
        self.set(ParamName::SpokeWidth, width)
    }

    pub fn spoke_color(self, color: impl Into<ParamValue>) -> Self {
        self.set(ParamName::SpokeColor, color)
    }

    pub fn spoke_length(self, length: f64) -> Self {
        self.set(ParamName::SpokeLength, length)
    }

    pub fn spoke_outset(self, outset: f64) -> Self {
        self.set(ParamName::SpokeOutset, outset)
    }

    pub fn style(self, style: impl Into<ParamValue>) -> Self {
        self.set(ParamName::Style, style)
    }

    pub fn style_variant(self, variant: u32) -> Self {
        self.set(ParamName::StyleVariant, variant)
    }

    pub fn clockwise(self, clockwise: bool) -> Self {
        self.set(ParamName::Clockwise, clockwise)
    }

    pub fn period(self, period: impl Into<ParamValue>) -> Self {
        self.set(ParamName::Period, period)
    }

    pub fn frame_rate(self, frame_rate: impl Into<ParamValue>) -> Self {
        self.set(ParamName::FrameRate, frame_rate)
    }

    pub fn autostart(self, autostart: bool) -> Self {
        self.set(ParamName::Autostart, autostart)
    }

    pub fn get(&self, name: ParamName) -> Option<&ParamValue> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamName, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }
}

impl From<&SpinnerConfig> for ConfigUpdate {
    fn from(config: &SpinnerConfig) -> Self {
        ParamName::ALL
            .into_iter()
            .fold(ConfigUpdate::new(), |update, name| {
                let value = match name {
                    // Keep the pinned/auto distinction rather than the resolved rate
                    ParamName::FrameRate => config.frame_rate.into(),
                    _ => config.get(name),
                };
                update.set(name, value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = SpinnerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolved_frame_rate(), DEFAULT_FRAME_RATE);
        assert!(approx(config.total_frames(), 30.0));
        assert!(approx(config.frame_delay(), 50.0));
    }

    #[test]
    fn test_explicit_rate_derivation() {
        let config = SpinnerConfig::new()
            .spoke_count(9)
            .period(Period::Seconds(1.5))
            .frame_rate(FrameRate::Fixed(15.0));
        assert!(config.validate().is_ok());
        assert!(approx(config.total_frames(), 22.5));
        assert!(approx(config.frame_delay(), 66.666_666_7));
    }

    #[test]
    fn test_auto_rate_on_short_period() {
        let mut config = SpinnerConfig::default();
        config
            .apply(ParamName::Period, &ParamValue::Number(0.2))
            .unwrap();
        config
            .apply(ParamName::FrameRate, &"auto".into())
            .unwrap();
        assert!(approx(config.total_frames(), 5.0));
        assert!(approx(config.resolved_frame_rate(), 25.0));
    }

    #[test]
    fn test_auto_rate_follows_period_unless_pinned() {
        let mut config = SpinnerConfig::default();
        config.apply(ParamName::Period, &Period::Long.into()).unwrap();
        assert!(approx(config.total_frames(), 50.0));

        config.apply(ParamName::FrameRate, &10.0.into()).unwrap();
        config.apply(ParamName::Period, &Period::Short.into()).unwrap();
        assert_eq!(config.resolved_frame_rate(), 10.0);
        assert!(approx(config.total_frames(), 5.0));
    }

    #[test]
    fn test_frame_rate_above_bound_is_rejected() {
        let mut config = SpinnerConfig::default().frame_rate(FrameRate::Fixed(30.0));
        let err = config
            .apply(ParamName::FrameRate, &2000.0.into())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::FrameRateRange { .. }));
        assert_eq!(config.frame_rate, FrameRate::Fixed(30.0));
    }

    #[test]
    fn test_period_too_short_for_pinned_rate() {
        let mut config = SpinnerConfig::default().frame_rate(FrameRate::Fixed(10.0));
        let err = config.apply(ParamName::Period, &0.1.into()).unwrap_err();
        assert!(matches!(err, ConfigurationError::TooFewFrames { .. }));
        assert_eq!(config.period, 1.5);
    }

    #[test]
    fn test_invalid_values_leave_config_untouched() {
        let mut config = SpinnerConfig::default();
        let before = config.clone();
        assert!(config.apply(ParamName::SpokeCount, &1i64.into()).is_err());
        assert!(config.apply(ParamName::SpokeCount, &2.5.into()).is_err());
        assert!(config.apply(ParamName::SpokeWidth, &0.0.into()).is_err());
        assert!(config.apply(ParamName::SpokeLength, &(-3.0).into()).is_err());
        assert!(config.apply(ParamName::SpokeColor, &"nope".into()).is_err());
        assert!(config.apply(ParamName::Style, &"spiral".into()).is_err());
        assert!(config.apply(ParamName::StyleVariant, &(-1i64).into()).is_err());
        assert!(config.apply(ParamName::Clockwise, &3i64.into()).is_err());
        assert!(config.apply(ParamName::Period, &0.0.into()).is_err());
        assert!(config.apply(ParamName::FrameRate, &0.0.into()).is_err());
        assert_eq!(config, before);
    }

    #[test]
    fn test_change_flags_per_parameter() {
        let mut config = SpinnerConfig::default();
        assert_eq!(
            config.apply(ParamName::SpokeCount, &9i64.into()).unwrap(),
            ChangeFlags::GEOMETRY
        );
        assert_eq!(
            config.apply(ParamName::Style, &"pan".into()).unwrap(),
            ChangeFlags::PAINT
        );
        assert_eq!(
            config.apply(ParamName::Autostart, &false.into()).unwrap(),
            ChangeFlags::empty()
        );
        assert_eq!(
            config.apply(ParamName::Clockwise, &false.into()).unwrap(),
            ChangeFlags::DIRECTION
        );
        assert_eq!(
            config.apply(ParamName::Clockwise, &false.into()).unwrap(),
            ChangeFlags::empty()
        );
        assert_eq!(
            config.apply(ParamName::Period, &2.0.into()).unwrap(),
            ChangeFlags::TIMING
        );
    }

    #[test]
    fn test_joint_timing_honors_explicit_rate() {
        let mut config = SpinnerConfig::default();
        let flags = config
            .apply_timing(Some(&0.2.into()), Some(&10.0.into()))
            .unwrap();
        assert_eq!(flags, ChangeFlags::TIMING);
        assert_eq!(config.frame_rate, FrameRate::Fixed(10.0));
        assert!(approx(config.total_frames(), 2.0));
    }

    #[test]
    fn test_joint_timing_falls_back_per_field() {
        let mut config = SpinnerConfig::default();
        config
            .apply_timing(Some(&"long".into()), Some(&5000.0.into()))
            .unwrap();
        assert_eq!(config.period, 2.5);
        assert_eq!(config.frame_rate, FrameRate::Auto);
    }

    #[test]
    fn test_joint_timing_without_fallback_errors() {
        let mut config = SpinnerConfig::default();
        let err = config
            .apply_timing(Some(&0.1.into()), Some(&10.0.into()))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::TooFewFrames { .. }));
        assert_eq!(config.period, 1.5);
        assert_eq!(config.frame_rate, FrameRate::Auto);
    }

    #[test]
    fn test_param_names_parse() {
        assert_eq!("spokeCount".parse::<ParamName>().unwrap(), ParamName::SpokeCount);
        assert_eq!("frame_rate".parse::<ParamName>().unwrap(), ParamName::FrameRate);
        assert!("spokeCounts".parse::<ParamName>().is_err());
        for name in ParamName::ALL {
            assert_eq!(name.as_str().parse::<ParamName>().unwrap(), name);
        }
    }

    #[test]
    fn test_update_from_config_roundtrips() {
        let config = SpinnerConfig::new()
            .spoke_count(7)
            .style(Style::Trail)
            .frame_rate(FrameRate::Fixed(12.0));
        let update = ConfigUpdate::from(&config);
        let mut rebuilt = SpinnerConfig::default();
        for (name, value) in update.iter().filter(|(n, _)| !n.is_timing()) {
            rebuilt.apply(name, value).unwrap();
        }
        rebuilt
            .apply_timing(
                update.get(ParamName::Period),
                update.get(ParamName::FrameRate),
            )
            .unwrap();
        assert_eq!(rebuilt, config);
    }
}
