//! The multi-touch keyboard widget.
//!
//! `KeyboardView` owns the geometry, the finger tracker and the event sink.
//! Platform code feeds it pointer samples and remote note updates on a single
//! thread, then asks for a fresh projection whenever `take_repaint` says so.

pub mod geometry;
pub mod layout;
pub mod layouts;
pub mod render;
pub mod tracker;
pub mod velocity;

use self::geometry::{Geometry, Viewport};
use self::render::KeyPaint;
use self::tracker::TouchTracker;
use crate::config::KeyboardConfig;
use crate::sink::{EventSink, NullSink};
use crate::touch::{PointerPhase, PointerSample};

pub struct KeyboardView {
    geometry: Geometry,
    tracker: TouchTracker,
    config: KeyboardConfig,
    sink: Box<dyn EventSink>,
    needs_repaint: bool,
}

impl KeyboardView {
    pub fn new(config: KeyboardConfig, width: f32, height: f32) -> KeyboardView {
        let config = config.sanitized();
        KeyboardView {
            geometry: Geometry::new(
                config.layout.build(),
                Viewport::new(width, height),
                config.first_key,
                config.n_keys,
            ),
            tracker: TouchTracker::new(config.drag_mode, config.velocity_curve(), config.channel),
            config,
            sink: Box::new(NullSink),
            needs_repaint: true,
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sink = sink;
    }

    pub fn config(&self) -> &KeyboardConfig {
        &self.config
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn tracker(&self) -> &TouchTracker {
        &self.tracker
    }

    /// Applies a whole configuration at once. Swapping the layout releases
    /// every held note first, since finger positions mean different keys
    /// afterwards. Changing the drag mode keeps held notes.
    pub fn apply_config(&mut self, config: KeyboardConfig) {
        let config = config.sanitized();
        if config == self.config {
            return;
        }
        log::info!("applying keyboard config: {:?}", config);
        let old = self.config;
        let layout_changed = config.layout != old.layout
            || config.first_key != old.first_key
            || config.n_keys != old.n_keys;
        if layout_changed || config.channel != old.channel {
            self.needs_repaint |= self.tracker.release_all(self.sink.as_mut());
        }
        if config.layout != old.layout {
            self.geometry.set_layout(config.layout.build());
        }
        if config.first_key != old.first_key || config.n_keys != old.n_keys {
            self.geometry.set_key_range(config.first_key, config.n_keys);
        }
        self.tracker
            .set_drag_mode(config.drag_mode, self.geometry.viewport().offset);
        self.tracker.set_velocity_curve(config.velocity_curve());
        self.tracker.set_channel(config.channel);
        self.config = config;
        self.needs_repaint |= layout_changed;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.geometry.set_size(width, height);
        self.needs_repaint = true;
    }

    pub fn on_pointer(&mut self, sample: PointerSample) {
        match sample.phase {
            PointerPhase::Down => {
                self.touch_down(sample.finger, sample.x, sample.y, sample.pressure)
            }
            PointerPhase::Move => self.touch_move(sample.finger, sample.x, sample.y),
            PointerPhase::Up => self.touch_up(sample.finger),
        }
    }

    pub fn touch_down(&mut self, finger: usize, x: f32, y: f32, pressure: f32) {
        self.needs_repaint |=
            self.tracker
                .touch_down(&self.geometry, self.sink.as_mut(), finger, x, y, pressure);
    }

    pub fn touch_move(&mut self, finger: usize, x: f32, y: f32) {
        self.needs_repaint |=
            self.tracker
                .touch_move(&mut self.geometry, self.sink.as_mut(), finger, x, y);
    }

    pub fn touch_up(&mut self, finger: usize) {
        self.needs_repaint |= self.tracker.touch_up(self.sink.as_mut(), finger);
    }

    pub fn release_all(&mut self) {
        self.needs_repaint |= self.tracker.release_all(self.sink.as_mut());
    }

    /// Shows a note played elsewhere, velocity 0 meaning off. Never emits.
    pub fn set_remote_note(&mut self, note: u8, velocity: u8) {
        self.needs_repaint |= self.tracker.set_remote_note(note, velocity);
    }

    pub fn set_scroll_zoom(&mut self, offset: f32, zoom: f32) {
        let before = *self.geometry.viewport();
        self.geometry.set_scroll_zoom(offset, zoom);
        self.tracker.sync_scroll(offset);
        let after = self.geometry.viewport();
        self.needs_repaint |= after.offset != before.offset || after.zoom != before.zoom;
    }

    pub fn max_scroll(&self) -> f32 {
        self.geometry.max_scroll()
    }

    pub fn note_velocity(&self, note: u8) -> u8 {
        self.tracker.notes().velocity(note)
    }

    pub fn finger_note(&self, finger: usize) -> Option<u8> {
        self.tracker.finger_note(finger)
    }

    pub fn render(&self) -> Vec<KeyPaint> {
        render::render(&self.geometry, self.tracker.notes())
    }

    /// Returns whether anything visible changed since the last call.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::replace(&mut self.needs_repaint, false)
    }

    pub fn sink(&mut self) -> &mut dyn EventSink {
        self.sink.as_mut()
    }
}
