//! Control-surface layer for the DJ TechTools MIDI Fighter Twister.
//!
//! Four banks of 16 push encoders, each with an RGB light and an LED ring,
//! plus three side buttons on each side per bank. Raw Control Change traffic
//! is turned into encoder adjustments and button gestures, and light state is
//! turned back into the device's wire format.
//!
//! Everything here is single-threaded. Time is passed in by the caller, which
//! makes gesture timing deterministic under test.

pub mod animation;
pub mod bank;
pub mod button;
pub mod color_supplier;
pub mod cursor;
pub mod encoder;
pub mod knob;
pub mod lights;
pub mod midi;
pub mod output;
pub mod palette;
pub mod scroll;
pub mod surface;
pub mod timer;
pub mod value;

pub use surface::{ControlSurface, SurfaceContext};
