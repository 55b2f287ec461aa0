//! A radial-spoke indeterminate progress indicator.
//!
//! A [`Spinner`] replaces a node of a host [`Document`] with a container
//! holding a square drawing [`Surface`], and animates a ring of spokes whose
//! opacities follow one of four [`Style`]s. Playback is anchored to the wall
//! clock, so late timer ticks skip frames instead of slowing the rotation.
//!
//! The crate is single-threaded and cooperative: the host calls
//! [`Spinner::update`] from its event loop and waits for the returned delay.

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod invalidation;
pub mod platform;
pub mod spinner;

pub use animation::Style;
pub use color::Color;
pub use config::{ConfigUpdate, FrameRate, ParamName, ParamValue, Period, SpinnerConfig};
pub use error::{AttachmentError, ConfigurationError, SpinnerError};
pub use platform::{Document, Surface};
pub use spinner::{PlaybackState, Spinner};

pub mod prelude {
    pub use crate::animation::{Clock, ManualClock, Style, SystemClock};
    pub use crate::color::Color;
    pub use crate::config::{
        ConfigUpdate, FrameRate, ParamName, ParamValue, Period, SpinnerConfig,
    };
    pub use crate::error::{AttachmentError, ConfigurationError, SpinnerError};
    pub use crate::platform::{
        Document, LineCap, MemoryDocument, RecordingSurface, RemovalObserver, Surface,
    };
    pub use crate::spinner::{PlaybackState, Spinner};
}
