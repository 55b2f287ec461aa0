use thiserror::Error;

/// A configuration value was rejected. The previous value is retained.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("spokeCount must be greater than 1, got {0}")]
    SpokeCount(u32),
    #[error("{name} must be a positive number, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("invalid color: {0:?}")]
    Color(String),
    #[error("unknown style: {0:?}")]
    Style(String),
    #[error("frameRate must be in (0, {max}], got {value}")]
    FrameRateRange { value: f64, max: f64 },
    #[error("period {period}s at {frame_rate} fps yields {frames} frames, at least 2 are required")]
    TooFewFrames {
        period: f64,
        frame_rate: f64,
        frames: f64,
    },
    #[error("invalid period: {0:?}")]
    Period(String),
    #[error("invalid frameRate: {0:?}")]
    FrameRate(String),
    #[error("unknown parameter: {0:?}")]
    UnknownParameter(String),
    #[error("parameter {name} expects {expected}")]
    WrongType {
        name: &'static str,
        expected: &'static str,
    },
}

/// Failure reported by the host document tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("node is not part of the document")]
    NotConnected,
    #[error("node has no parent to replace it in")]
    NoParent,
    #[error("stale or unknown node handle")]
    UnknownNode,
    #[error("a node cannot be placed inside itself")]
    Cycle,
}

/// Failure reported by the drawing surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface cannot be resized to {width}x{height}")]
    Resize { width: u32, height: u32 },
    #[error("drawing context lost")]
    ContextLost,
}

/// The widget could not be inserted into the document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttachmentError {
    #[error("no insertion point given and none remembered")]
    NoTarget,
    #[error("target node is not part of the live document")]
    NotInDocument,
    #[error("document rejected the insertion: {0}")]
    Document(#[from] DocumentError),
    #[error("drawing surface failed during insertion: {0}")]
    Surface(#[from] SurfaceError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpinnerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

pub type Result<T> = std::result::Result<T, SpinnerError>;
