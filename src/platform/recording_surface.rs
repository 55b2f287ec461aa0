//! A [`Surface`] that records draw calls instead of rasterising them.

use crate::color::Color;
use crate::error::SurfaceError;

use super::{LineCap, Surface};

/// A single recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Resize {
        width: u32,
        height: u32,
    },
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Save,
    Restore,
    Translate {
        x: f64,
        y: f64,
    },
    Rotate {
        radians: f64,
    },
    BeginPath,
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    /// Stroke of the current path with the state in effect at that moment
    Stroke(StrokeRecord),
}

/// Drawing state captured when a path is stroked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeRecord {
    pub alpha: f64,
    pub color: Color,
    pub width: f64,
    pub cap: LineCap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawState {
    alpha: f64,
    color: Color,
    width: f64,
    cap: LineCap,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            color: Color::BLACK,
            width: 1.0,
            cap: LineCap::Butt,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    state: DrawState,
    stack: Vec<DrawState>,
    commands: Vec<DrawCommand>,
    fail_resize: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following resize fail, as a lost context would.
    pub fn fail_resizes(&mut self, fail: bool) {
        self.fail_resize = fail;
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear_log(&mut self) {
        self.commands.clear();
    }

    /// Strokes of the most recent pass, i.e. since the last clear.
    pub fn strokes(&self) -> Vec<StrokeRecord> {
        let from = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::ClearRect { .. }))
            .unwrap_or(0);
        self.commands[from..]
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Stroke(record) => Some(*record),
                _ => None,
            })
            .collect()
    }

    /// Number of passes drawn since the log was last cleared.
    pub fn pass_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::ClearRect { .. }))
            .count()
    }

    /// Depth of the save/restore stack; zero between passes.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if self.fail_resize {
            return Err(SurfaceError::Resize { width, height });
        }
        self.width = width;
        self.height = height;
        // Resizing a canvas resets its context state
        self.state = DrawState::default();
        self.stack.clear();
        self.commands.push(DrawCommand::Resize { width, height });
        Ok(())
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn save(&mut self) {
        self.stack.push(self.state);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::Translate { x, y });
    }

    fn rotate(&mut self, radians: f64) {
        self.commands.push(DrawCommand::Rotate { radians });
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.width = width;
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state.cap = cap;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha;
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo { x, y });
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke(StrokeRecord {
            alpha: self.state.alpha,
            color: self.state.color,
            width: self.state.width,
            cap: self.state.cap,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_pops_state() {
        let mut surface = RecordingSurface::new();
        surface.set_global_alpha(0.5);
        surface.save();
        surface.set_global_alpha(0.1);
        surface.stroke();
        surface.restore();
        surface.stroke();
        let alphas: Vec<f64> = surface.strokes().iter().map(|s| s.alpha).collect();
        assert_eq!(alphas, vec![0.1, 0.5]);
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn test_failed_resize_keeps_size() {
        let mut surface = RecordingSurface::new();
        surface.resize(10, 10).unwrap();
        surface.fail_resizes(true);
        assert_eq!(
            surface.resize(20, 20),
            Err(SurfaceError::Resize {
                width: 20,
                height: 20
            })
        );
        assert_eq!(surface.size(), (10, 10));
    }

    #[test]
    fn test_strokes_only_cover_last_pass() {
        let mut surface = RecordingSurface::new();
        surface.clear_rect(0.0, 0.0, 1.0, 1.0);
        surface.stroke();
        surface.clear_rect(0.0, 0.0, 1.0, 1.0);
        surface.stroke();
        surface.stroke();
        assert_eq!(surface.strokes().len(), 2);
        assert_eq!(surface.pass_count(), 2);
    }
}
