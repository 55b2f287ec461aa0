mod clock;
mod frame;
mod style;

pub use clock::{Clock, ManualClock, SystemClock};
pub use frame::FrameEngine;
pub use style::{
    pan, sparkle, trail, wave, SpokeTone, Style, SPARKLE_MAX_VARIANT, WAVE_DEFAULT_EXPONENT,
};
