//! touch-keyboard - a multi-touch keyboard that turns fingers into MIDI
//!
//! The keyboard tiles a small layout (two rows of piano keys, or colored
//! stripes) across a pannable, zoomable viewport. Every finger owns at most
//! one note; sliding either moves the note to the next key or scrolls the
//! keyboard. Velocity comes from touch pressure.
//!
//! ```no_run
//! use touch_keyboard::{KeyboardConfig, KeyboardView};
//!
//! let mut keyboard = KeyboardView::new(KeyboardConfig::default(), 1920.0, 400.0);
//! keyboard.touch_down(0, 30.0, 300.0, 0.7);
//! for key in keyboard.render() {
//!     // paint key.rect with key.fill
//! }
//! keyboard.touch_up(0);
//! ```

#[macro_use]
extern crate custom_derive;
#[macro_use]
extern crate enum_derive;

pub mod cli;
pub mod config;
pub mod controls;
pub mod error;
#[cfg(feature = "evdev")]
pub mod evdev;
pub mod instrument;
pub mod jack_output;
pub mod keyboard;
pub mod midi;
pub mod script;
pub mod sink;
pub mod touch;
#[cfg(feature = "sdl")]
pub mod ui;

pub use config::{DragMode, KeyboardConfig};
pub use controls::{ControlPanel, Knob, Routed};
pub use error::{Error, Result};
pub use instrument::Instrument;
pub use keyboard::layouts::LayoutPreset;
pub use keyboard::velocity::compute_velocity;
pub use keyboard::KeyboardView;
pub use midi::MidiEvent;
pub use sink::{ChannelSink, EventSink, NullSink};
pub use touch::{PointerPhase, PointerSample};
