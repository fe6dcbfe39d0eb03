//! Mapping between screen coordinates and rendered keys.
//!
//! The layout period is tiled `n_keys / period` times across the drawing
//! area. `offset` pans in pixels, `zoom` magnifies horizontally.

use super::layout::{KeyboardLayout, Rect};
use crate::midi::NOTES;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub stroke_width: f32,
    pub offset: f32,
    pub zoom: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Viewport {
        Viewport {
            width,
            height,
            stroke_width: 1.0,
            offset: 0.0,
            zoom: 1.0,
        }
    }
}

fn sanitize_zoom(zoom: f32) -> f32 {
    if zoom >= 1.0 && zoom.is_finite() {
        zoom
    } else {
        1.0
    }
}

#[derive(Debug, Clone)]
pub struct Geometry {
    layout: KeyboardLayout,
    viewport: Viewport,
    first_key: u8,
    n_keys: usize,
    keyboard_scale: f32,
}

impl Geometry {
    pub fn new(layout: KeyboardLayout, viewport: Viewport, first_key: u8, n_keys: usize) -> Geometry {
        let mut geometry = Geometry {
            layout,
            viewport: Viewport {
                zoom: sanitize_zoom(viewport.zoom),
                ..viewport
            },
            first_key: 0,
            n_keys: 1,
            keyboard_scale: 0.0,
        };
        geometry.set_key_range(first_key, n_keys);
        geometry
    }

    fn update_scale(&mut self) {
        self.keyboard_scale = self.viewport.zoom / self.layout.repeat_width()
            * self.layout.period() as f32
            / self.n_keys as f32;
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn first_key(&self) -> u8 {
        self.first_key
    }

    pub fn n_keys(&self) -> usize {
        self.n_keys
    }

    pub fn keyboard_scale(&self) -> f32 {
        self.keyboard_scale
    }

    pub fn set_layout(&mut self, layout: KeyboardLayout) {
        self.layout = layout;
        self.update_scale();
    }

    /// Rendered keys are clipped so that the highest one is still a valid
    /// MIDI note, and there is always at least one key.
    pub fn set_key_range(&mut self, first_key: u8, n_keys: usize) {
        let first_key = first_key.min(NOTES as u8 - 1);
        self.first_key = first_key;
        self.n_keys = n_keys.clamp(1, NOTES - first_key as usize);
        self.update_scale();
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn set_scroll_zoom(&mut self, offset: f32, zoom: f32) {
        self.viewport.offset = offset;
        self.viewport.zoom = sanitize_zoom(zoom);
        self.update_scale();
    }

    pub fn set_offset(&mut self, offset: f32) {
        let zoom = self.viewport.zoom;
        self.set_scroll_zoom(offset, zoom);
    }

    pub fn max_scroll(&self) -> f32 {
        (self.viewport.zoom - 1.0) * self.viewport.width
    }

    fn scales(&self) -> (f32, f32) {
        let stroke = self.viewport.stroke_width;
        let xscale = (self.viewport.width - stroke) * self.keyboard_scale;
        let yscale = (self.viewport.height - stroke) / self.layout.height();
        (xscale, yscale)
    }

    fn origin(&self) -> (f32, f32) {
        let half_stroke = self.viewport.stroke_width * 0.5;
        (half_stroke + self.viewport.offset, half_stroke)
    }

    pub fn note_for_index(&self, index: usize) -> u8 {
        self.first_key + index as u8
    }

    /// Screen rectangle of rendered key `index`.
    pub fn project(&self, index: usize) -> Rect {
        let (xscale, yscale) = self.scales();
        let (x0, y0) = self.origin();
        let period = self.layout.period();
        let key = self.layout.key(index);
        let period_left = (index / period) as f32 * self.layout.repeat_width();
        Rect {
            left: x0 + (period_left + key.rect.left) * xscale,
            top: y0 + key.rect.top * yscale,
            width: key.rect.width * xscale,
            height: key.rect.height * yscale,
        }
    }

    /// Note under the screen point, if any. Gaps between keys are misses.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<u8> {
        let (xscale, yscale) = self.scales();
        if !(xscale > 0.0 && yscale > 0.0) {
            return None;
        }
        let (x0, y0) = self.origin();
        let xk = (x - x0) / xscale;
        let yk = (y - y0) / yscale;
        if !(xk.is_finite() && yk.is_finite()) {
            return None;
        }
        let period = self.layout.period();
        let n_periods = (self.n_keys + period - 1) / period;
        let period_position = xk / self.layout.repeat_width();
        if period_position < -1.0 || period_position > n_periods as f32 + 1.0 {
            return None;
        }
        // keys may stick out of their period by a bit, so check the neighbours too
        let center = period_position.floor() as i64;
        for period_index in (center - 1)..=(center + 1) {
            if period_index < 0 || period_index >= n_periods as i64 {
                continue;
            }
            let period_index = period_index as usize;
            let period_left = period_index as f32 * self.layout.repeat_width();
            for (k, key) in self.layout.keys().iter().enumerate() {
                let index = period_index * period + k;
                if index >= self.n_keys {
                    break;
                }
                if key.rect.contains(xk - period_left, yk) {
                    return Some(self.note_for_index(index));
                }
            }
        }
        None
    }
}
