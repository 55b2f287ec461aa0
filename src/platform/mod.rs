//! Host collaborators: the document tree the widget lives in and the 2D
//! surface it draws on.
//!
//! Both are consumed through traits. [`MemoryDocument`] and
//! [`RecordingSurface`] are in-process implementations used for headless
//! hosts and tests.

mod memory_document;
mod recording_surface;

use std::fmt;

use crate::color::Color;
use crate::error::{DocumentError, SurfaceError};

pub use memory_document::{MemoryDocument, MemoryObserver, NodeId};
pub use recording_surface::{DrawCommand, RecordingSurface, StrokeRecord};

/// Host document tree.
///
/// Implementations are handles: methods take `&self` and mutate the shared
/// tree behind them, the way a DOM document handle does.
pub trait Document {
    type Node: Clone + PartialEq + fmt::Debug;
    type Observer: RemovalObserver<Node = Self::Node>;

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> Self::Node;

    /// Move `child` to the end of `parent`'s children.
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DocumentError>;

    fn parent_of(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Whether `node` is reachable from the document root.
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// Put `replacement` at `node`'s position; `node` leaves the tree.
    fn replace_with(&self, node: &Self::Node, replacement: &Self::Node)
        -> Result<(), DocumentError>;

    /// Watch `nodes` for being disconnected from the document.
    fn observe_removal(&self, nodes: &[Self::Node]) -> Self::Observer;
}

/// Handle returned by [`Document::observe_removal`].
pub trait RemovalObserver {
    type Node;

    /// Drain the watched nodes that were disconnected since the last call.
    fn take_records(&mut self) -> Vec<Self::Node>;

    /// Stop watching. Pending records are dropped.
    fn disconnect(&mut self);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Immediate-mode 2D drawing context.
pub trait Surface {
    /// Set the backing size in pixels. Clears the surface.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, radians: f64);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_global_alpha(&mut self, alpha: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn stroke(&mut self);
}
