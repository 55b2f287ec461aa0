//! The spinner widget: configuration controller and playback state machine.
//!
//! Configuration lives here; attachment and playback transitions are in
//! [`lifecycle`](self::lifecycle).

mod lifecycle;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::animation::{Clock, FrameEngine, Style, SystemClock};
use crate::color::Color;
use crate::config::{ConfigUpdate, FrameRate, ParamName, ParamValue, Period, SpinnerConfig};
use crate::error::{ConfigurationError, Result};
use crate::invalidation::ChangeFlags;
use crate::platform::{Document, Surface};

pub use lifecycle::PlaybackState;

/// Tag of the element wrapping the drawing surface.
pub const CONTAINER_TAG: &str = "span";
/// Tag of the drawing surface element.
pub const SURFACE_TAG: &str = "canvas";

/// Periodic draw timer. Exists only while playing.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Timer {
    /// Time the next frame is due, in milliseconds
    next_due: f64,
}

/// A radial-spoke progress indicator bound to a host document and surface.
///
/// The container and surface nodes are created once and reused for every
/// attach/detach cycle.
pub struct Spinner<D: Document, S: Surface> {
    config: SpinnerConfig,
    engine: FrameEngine,
    document: D,
    surface: S,
    container: D::Node,
    canvas: D::Node,
    state: PlaybackState,
    /// Node the container stands in for while attached; reattach point while detached
    insertion_point: Option<D::Node>,
    observer: Option<D::Observer>,
    timer: Option<Timer>,
    pending_autostart: bool,
    clock: Box<dyn Clock>,
    rng: SmallRng,
}

impl<D: Document, S: Surface> Spinner<D, S> {
    /// Create a spinner with the default configuration.
    pub fn new(document: D, surface: S) -> Result<Self> {
        Self::with_config(document, surface, SpinnerConfig::default())
    }

    pub fn with_config(document: D, surface: S, config: SpinnerConfig) -> Result<Self> {
        config.validate()?;

        let container = document.create_element(CONTAINER_TAG);
        let canvas = document.create_element(SURFACE_TAG);
        document.append_child(&container, &canvas)?;

        let mut spinner = Self {
            config,
            engine: FrameEngine::new(),
            document,
            surface,
            container,
            canvas,
            state: PlaybackState::Detached,
            insertion_point: None,
            observer: None,
            timer: None,
            pending_autostart: false,
            clock: Box::new(SystemClock::new()),
            rng: SmallRng::from_os_rng(),
        };
        spinner.recompute()?;
        Ok(spinner)
    }

    /// Replace the wall clock, e.g. with a [`ManualClock`](crate::animation::ManualClock).
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Seed the generator used by the sparkle style.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Element inserted into the document in place of the target.
    pub fn container(&self) -> &D::Node {
        &self.container
    }

    /// Drawing surface element, a child of the container.
    pub fn canvas(&self) -> &D::Node {
        &self.canvas
    }

    pub fn frame(&self) -> f64 {
        self.engine.frame()
    }

    pub fn total_frames(&self) -> f64 {
        self.engine.total_frames()
    }

    /// Milliseconds between frames.
    pub fn frame_delay(&self) -> f64 {
        self.engine.frame_delay()
    }

    pub fn surface_size(&self) -> f64 {
        self.engine.size()
    }

    fn now(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Recompute derived parameters and draw once.
    fn recompute(&mut self) -> std::result::Result<(), crate::error::SurfaceError> {
        let now = self.now();
        let playing = self.is_playing();
        self.engine
            .recompute(&self.config, &mut self.surface, &mut self.rng, now, playing)
    }

    /// Draw the frame due now. This is the periodic timer callback.
    pub fn draw_frame(&mut self) {
        let now = self.now();
        let playing = self.is_playing();
        self.engine
            .draw(&self.config, &mut self.surface, &mut self.rng, now, playing);
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn configuration(&self) -> &SpinnerConfig {
        &self.config
    }

    /// Read a parameter in its dynamic form.
    pub fn parameter(&self, name: ParamName) -> ParamValue {
        self.config.get(name)
    }

    /// Validate and commit one parameter, then bring derived state up to date.
    pub fn set_parameter(
        &mut self,
        name: ParamName,
        value: impl Into<ParamValue>,
    ) -> std::result::Result<(), ConfigurationError> {
        let flags = self.config.apply(name, &value.into())?;
        self.apply_changes(flags);
        Ok(())
    }

    /// [`set_parameter`](Self::set_parameter) by camelCase or snake_case name.
    pub fn set_named(
        &mut self,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> std::result::Result<(), ConfigurationError> {
        let name: ParamName = name.parse()?;
        self.set_parameter(name, value)
    }

    /// Apply a batch of parameters.
    ///
    /// Each field is validated on its own; rejected fields are logged and keep
    /// their previous value. `period` and `frameRate` are resolved together.
    /// The only error returned is an unresolvable period/frame-rate pair, in
    /// which case both keep their previous values while the rest of the batch
    /// is still applied.
    pub fn set_configuration(
        &mut self,
        update: &ConfigUpdate,
    ) -> std::result::Result<(), ConfigurationError> {
        let mut flags = ChangeFlags::empty();
        for (name, value) in update.iter().filter(|(name, _)| !name.is_timing()) {
            match self.config.apply(name, value) {
                Ok(changed) => flags |= changed,
                Err(e) => log::warn!("Ignoring {} in bulk configuration: {}", name, e),
            }
        }

        let period = update.get(ParamName::Period);
        let frame_rate = update.get(ParamName::FrameRate);
        let timing = if period.is_some() || frame_rate.is_some() {
            self.config.apply_timing(period, frame_rate)
        } else {
            Ok(ChangeFlags::empty())
        };

        match timing {
            Ok(changed) => {
                self.apply_changes(flags | changed);
                Ok(())
            }
            Err(e) => {
                self.apply_changes(flags);
                Err(e)
            }
        }
    }

    /// Bring derived state in line with a committed configuration change.
    fn apply_changes(&mut self, flags: ChangeFlags) {
        if !flags.needs_recompute() {
            return;
        }

        if self.is_playing() {
            let now = self.now();
            if flags.needs_restart() {
                log::debug!("Timing changed while playing, restarting");
                self.engine.advance(now);
                self.timer = None;
                self.state = PlaybackState::Paused;
                self.recompute_logged();
                self.resume_playing(now);
                return;
            }
            if flags.contains(ChangeFlags::DIRECTION) {
                self.engine.advance(now);
                self.engine.reanchor(now, self.config.clockwise);
            }
        }
        self.recompute_logged();
    }

    fn recompute_logged(&mut self) {
        if let Err(e) = self.recompute() {
            log::error!("Failed to apply configuration to the surface: {}", e);
        }
    }

    pub fn spoke_count(&self) -> u32 {
        self.config.spoke_count
    }

    pub fn set_spoke_count(&mut self, count: u32) -> std::result::Result<(), ConfigurationError> {
        self.set_parameter(ParamName::SpokeCount, count)
    }

    pub fn spoke_width(&self) -> f64 {
        self.config.spoke_width
    }

    pub fn set_spoke_width(&mut self, width: f64) -> std::result::Result<(), ConfigurationError> {
        self.set_parameter(ParamName::SpokeWidth, width)
    }

    pub fn spoke_color(&self) -> Color {
        self.config.spoke_color
    }

    /// Accepts any CSS colour string understood by [`Color::parse`].
    pub fn set_spoke_color(&mut self, color: &str) -> std::result::Result<(), ConfigurationError> {
        self.set_parameter(ParamName::SpokeColor, color)
    }

    pub fn spoke_length(&self) -> f64 {
        self.config.spoke_length
    }

    pub fn set_spoke_length(&mut self, length: f64) -> std::result::Result<(), ConfigurationError> {
        self.set_parameter(ParamName::SpokeLength, length)
    }

    pub fn spoke_outset(&self) -> f64 {
        self.config.spoke_outset
    }

    pub fn set_spoke_outset(&mut self, outset: f64) -> std::result::Result<(), ConfigurationError> {
        self.set_parameter(ParamName::SpokeOutset, outset)
    }

    pub fn style(&self) -> Style {
        self.config.style
    }

    pub fn set_style(&mut self, style: Style) -> std::result::Result<(), ConfigurationError> {
        self.set_parameter(ParamName::Style, style)
    }

    pub fn style_variant(&self) -> u32 {
        self.config.style_variant
    }

    pub fn set_style_variant(&mut self, variant: u32) -> std::result::Result<(), ConfigurationError> {
        self.set_parameter(ParamName::StyleVariant, variant)
    }

    pub fn clockwise(&self) -> bool {
        self.config.clockwise
    }

    pub fn set_clockwise(&mut self, clockwise: bool) -> std::result::Result<(), ConfigurationError> {
        self.set_parameter(ParamName::Clockwise, clockwise)
    }

    /// Seconds per revolution.
    pub fn period(&self) -> f64 {
        self.config.period
    }

    pub fn set_period(&mut self, period: Period) -> std::result::Result<(), ConfigurationError> {
        self.set_parameter(ParamName::Period, period)
    }

    /// Frames per second in effect, whether pinned or automatic.
    pub fn frame_rate(&self) -> f64 {
        self.config.resolved_frame_rate()
    }

    pub fn frame_rate_setting(&self) -> FrameRate {
        self.config.frame_rate
    }

    pub fn set_frame_rate(
        &mut self,
        frame_rate: FrameRate,
    ) -> std::result::Result<(), ConfigurationError> {
        self.set_parameter(ParamName::FrameRate, frame_rate)
    }

    pub fn autostart(&self) -> bool {
        self.config.autostart
    }

    pub fn set_autostart(&mut self, autostart: bool) -> std::result::Result<(), ConfigurationError> {
        self.set_parameter(ParamName::Autostart, autostart)
    }
}
