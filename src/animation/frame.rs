//! Wall-clock anchored frame engine.
//!
//! The engine never counts ticks. Each draw derives the due frame from the
//! time elapsed since `start`, so a late timer tick jumps straight to the
//! right frame instead of replaying the ones it missed.

use std::f64::consts::TAU;

use rand::Rng;

use crate::config::SpinnerConfig;
use crate::error::SurfaceError;
use crate::platform::{LineCap, Surface};

/// Derived rendering parameters plus the live frame counter.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameEngine {
    /// Current position in `[0, total_frames)`
    frame: f64,
    /// Wall-clock anchor in milliseconds
    start: f64,
    /// Direction the anchor was computed for
    anchored_clockwise: bool,
    total_frames: f64,
    /// Milliseconds per frame
    frame_delay: f64,
    /// Side of the square surface
    size: f64,
}

impl FrameEngine {
    pub fn new() -> Self {
        Self {
            frame: 0.0,
            start: 0.0,
            anchored_clockwise: true,
            total_frames: 0.0,
            frame_delay: 0.0,
            size: 0.0,
        }
    }

    pub fn frame(&self) -> f64 {
        self.frame
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn total_frames(&self) -> f64 {
        self.total_frames
    }

    pub fn frame_delay(&self) -> f64 {
        self.frame_delay
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Side length of the square that holds every spoke, stroke caps included.
    pub fn surface_size(config: &SpinnerConfig) -> f64 {
        2.0 * (config.spoke_outset + config.spoke_length) + config.spoke_width
    }

    /// Frame due at `now` under the current anchor.
    pub fn due_frame(&self, now: f64) -> f64 {
        if self.total_frames <= 0.0 || self.frame_delay <= 0.0 {
            return self.frame;
        }
        let elapsed = if self.anchored_clockwise {
            (now - self.start) / self.frame_delay
        } else {
            (self.start - now) / self.frame_delay
        };
        wrap(elapsed, self.total_frames)
    }

    /// Move the frame counter to the frame due at `now`.
    pub fn advance(&mut self, now: f64) {
        self.frame = self.due_frame(now);
    }

    /// Re-anchor `start` so that drawing at `now` reproduces the current frame.
    pub fn reanchor(&mut self, now: f64, clockwise: bool) {
        self.anchored_clockwise = clockwise;
        let offset = self.frame * self.frame_delay;
        self.start = if clockwise { now - offset } else { now + offset };
    }

    /// Recompute surface size and timing from `config`, then draw once.
    ///
    /// When the frame count changes the counter keeps its relative position
    /// in the revolution.
    pub fn recompute<S: Surface + ?Sized, R: Rng>(
        &mut self,
        config: &SpinnerConfig,
        surface: &mut S,
        rng: &mut R,
        now: f64,
        playing: bool,
    ) -> Result<(), SurfaceError> {
        // Timing does not depend on the surface, so it is settled even if the resize fails
        let total_frames = config.total_frames();
        if self.total_frames > 0.0 && total_frames != self.total_frames {
            self.frame = wrap(self.frame / self.total_frames * total_frames, total_frames);
        }
        self.total_frames = total_frames;
        self.frame_delay = config.frame_delay();

        let size = Self::surface_size(config);
        if size != self.size {
            let px = size.ceil() as u32;
            surface.resize(px, px)?;
            self.size = size;
        }
        surface.set_line_width(config.spoke_width);
        surface.set_stroke_color(config.spoke_color);
        surface.set_line_cap(LineCap::Round);

        log::debug!(
            "Recomputed spinner: size {}, {} frames every {:.2}ms",
            self.size,
            self.total_frames,
            self.frame_delay
        );

        self.draw(config, surface, rng, now, playing);
        Ok(())
    }

    /// Render one pass. While playing the frame counter first catches up with `now`.
    ///
    /// Spokes are laid out counter-clockwise from the top with increasing
    /// phase, so a rising frame counter moves the pattern clockwise and a
    /// falling one moves it counter-clockwise. Direction is carried by the
    /// frame counter alone; the rotation step never changes sign.
    pub fn draw<S: Surface + ?Sized, R: Rng>(
        &mut self,
        config: &SpinnerConfig,
        surface: &mut S,
        rng: &mut R,
        now: f64,
        playing: bool,
    ) {
        if playing {
            self.advance(now);
        }

        let size = self.size;
        let count = config.spoke_count;
        let spacing = self.total_frames / count as f64;
        let step = TAU / count as f64;
        let inner = config.spoke_outset;
        let outer = config.spoke_outset + config.spoke_length;

        surface.clear_rect(0.0, 0.0, size, size);
        surface.save();
        surface.translate(size / 2.0, size / 2.0);
        surface.set_line_width(config.spoke_width);
        surface.set_line_cap(LineCap::Round);
        surface.set_stroke_color(config.spoke_color);

        for i in 0..count {
            let phase = self.frame + i as f64 * spacing;
            let tone = config
                .style
                .evaluate(phase, self.total_frames, config.style_variant, rng);
            if let Some(color) = tone.color {
                surface.set_stroke_color(color);
            }
            surface.set_global_alpha(tone.opacity);
            surface.begin_path();
            surface.move_to(0.0, -inner);
            surface.line_to(0.0, -outer);
            surface.stroke();
            surface.rotate(-step);
        }

        surface.restore();
    }
}

impl Default for FrameEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap `frame` into `[0, total)`.
fn wrap(frame: f64, total: f64) -> f64 {
    let wrapped = frame.rem_euclid(total);
    if wrapped >= total {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Style;
    use crate::config::{FrameRate, Period};
    use crate::platform::{DrawCommand, RecordingSurface};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn engine_for(config: &SpinnerConfig) -> (FrameEngine, RecordingSurface, SmallRng) {
        let mut engine = FrameEngine::new();
        let mut surface = RecordingSurface::new();
        let mut rng = SmallRng::seed_from_u64(1);
        engine
            .recompute(config, &mut surface, &mut rng, 0.0, false)
            .unwrap();
        (engine, surface, rng)
    }

    fn fifteen_fps() -> SpinnerConfig {
        SpinnerConfig::new()
            .spoke_count(9)
            .period(Period::Seconds(1.5))
            .frame_rate(FrameRate::Fixed(15.0))
    }

    #[test]
    fn test_recompute_derives_timing_and_size() {
        let config = fifteen_fps().spoke_outset(4.0).spoke_length(6.0).spoke_width(3.0);
        let (engine, surface, _) = engine_for(&config);
        assert!((engine.total_frames() - 22.5).abs() < 1e-9);
        assert!((engine.frame_delay() - 1000.0 / 15.0).abs() < 1e-9);
        assert_eq!(engine.size(), 23.0);
        assert_eq!(surface.size(), (23, 23));
    }

    #[test]
    fn test_recompute_draws_immediately() {
        let (_, surface, _) = engine_for(&fifteen_fps());
        assert_eq!(surface.strokes().len(), 9);
    }

    #[test]
    fn test_clockwise_frame_follows_elapsed_time() {
        let config = fifteen_fps();
        let (mut engine, mut surface, mut rng) = engine_for(&config);
        engine.reanchor(1000.0, true);
        let delay = engine.frame_delay();
        engine.draw(&config, &mut surface, &mut rng, 1000.0 + 3.0 * delay, true);
        assert!((engine.frame() - 3.0).abs() < 1e-9);
        // Wraps after a full revolution
        engine.draw(&config, &mut surface, &mut rng, 1000.0 + 25.0 * delay, true);
        assert!((engine.frame() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_counter_clockwise_frame_runs_backwards_and_stays_positive() {
        let config = fifteen_fps().clockwise(false);
        let (mut engine, mut surface, mut rng) = engine_for(&config);
        engine.reanchor(0.0, false);
        let delay = engine.frame_delay();
        engine.draw(&config, &mut surface, &mut rng, 2.0 * delay, true);
        assert!((engine.frame() - 20.5).abs() < 1e-9);
        engine.draw(&config, &mut surface, &mut rng, 1000.0 * delay, true);
        assert!(engine.frame() >= 0.0 && engine.frame() < engine.total_frames());
    }

    #[test]
    fn test_late_tick_jumps_to_due_frame() {
        let config = fifteen_fps();
        let (mut engine, mut surface, mut rng) = engine_for(&config);
        engine.reanchor(0.0, true);
        let delay = engine.frame_delay();
        engine.draw(&config, &mut surface, &mut rng, delay, true);
        // Next tick arrives seven frames late
        engine.draw(&config, &mut surface, &mut rng, 9.0 * delay, true);
        assert!((engine.frame() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_reanchor_preserves_frame_across_direction_flip() {
        let config = fifteen_fps();
        let (mut engine, mut surface, mut rng) = engine_for(&config);
        engine.reanchor(0.0, true);
        engine.draw(&config, &mut surface, &mut rng, 437.0, true);
        let before = engine.frame();

        engine.reanchor(437.0, false);
        let flipped = config.clone().clockwise(false);
        engine.draw(&flipped, &mut surface, &mut rng, 437.0, true);
        assert!((engine.frame() - before).abs() < 1e-9);
    }

    #[test]
    fn test_paused_draw_keeps_frame() {
        let config = fifteen_fps();
        let (mut engine, mut surface, mut rng) = engine_for(&config);
        engine.reanchor(0.0, true);
        engine.draw(&config, &mut surface, &mut rng, 200.0, true);
        let frame = engine.frame();
        engine.draw(&config, &mut surface, &mut rng, 5000.0, false);
        assert_eq!(engine.frame(), frame);
    }

    #[test]
    fn test_failed_resize_still_updates_timing() {
        let config = fifteen_fps();
        let (mut engine, mut surface, mut rng) = engine_for(&config);
        surface.fail_resizes(true);

        let changed = config
            .clone()
            .spoke_length(20.0)
            .frame_rate(FrameRate::Fixed(10.0));
        let result = engine.recompute(&changed, &mut surface, &mut rng, 0.0, false);
        assert!(matches!(result, Err(SurfaceError::Resize { .. })));
        assert!((engine.total_frames() - 15.0).abs() < 1e-9);
        assert!((engine.frame_delay() - 100.0).abs() < 1e-9);
        // Size stays at what the surface actually has
        assert_eq!(engine.size(), FrameEngine::surface_size(&config));
    }

    #[test]
    fn test_recompute_rescales_frame_to_new_total() {
        let config = fifteen_fps();
        let (mut engine, mut surface, mut rng) = engine_for(&config);
        engine.reanchor(0.0, true);
        engine.draw(&config, &mut surface, &mut rng, 11.25 * engine.frame_delay(), true);
        assert!((engine.frame() - 11.25).abs() < 1e-9);

        let doubled = config.clone().frame_rate(FrameRate::Fixed(30.0));
        engine
            .recompute(&doubled, &mut surface, &mut rng, 0.0, false)
            .unwrap();
        assert!((engine.total_frames() - 45.0).abs() < 1e-9);
        assert!((engine.frame() - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_spokes_follow_style_opacity() {
        let config = SpinnerConfig::new()
            .spoke_count(4)
            .period(Period::Seconds(1.0))
            .frame_rate(FrameRate::Fixed(20.0))
            .style(Style::Pan)
            .style_variant(0);
        let (_, surface, _) = engine_for(&config);
        let alphas: Vec<f64> = surface.strokes().iter().map(|s| s.alpha).collect();
        // Phases 0, 5, 10, 15 of 20: first half on
        assert_eq!(alphas, vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_spoke_geometry() {
        let config = fifteen_fps().spoke_outset(5.0).spoke_length(6.0);
        let (_, surface, _) = engine_for(&config);
        let segments: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::LineTo { x, y } => Some((*x, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(segments.len(), 9);
        assert!(segments.iter().all(|&(x, y)| x == 0.0 && y == -11.0));
        let rotations = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rotate { .. }))
            .count();
        assert_eq!(rotations, 9);
    }

    #[test]
    fn test_sparkle_color_override_is_scoped_to_pass() {
        let config = fifteen_fps().style(Style::Sparkle).style_variant(4);
        let (mut engine, mut surface, mut rng) = engine_for(&config);
        let plain = config.clone().style(Style::Wave);
        surface.clear_log();
        engine.draw(&plain, &mut surface, &mut rng, 0.0, false);
        assert!(surface
            .strokes()
            .iter()
            .all(|s| s.color == plain.spoke_color));
    }
}
