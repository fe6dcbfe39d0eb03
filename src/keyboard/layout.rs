use crate::error::{Error, Result};
use palette::Srgb;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Rect {
        Rect {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let x_in = x >= self.left && x < self.right();
        let y_in = y >= self.top && y < self.bottom();
        x_in && y_in
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.left + self.width * 0.5,
            self.top + self.height * 0.5,
        )
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

pub fn rgb(red: u8, green: u8, blue: u8) -> Srgb<u8> {
    Srgb::new(red, green, blue)
}

pub fn black() -> Srgb<u8> {
    rgb(0, 0, 0)
}

pub fn white() -> Srgb<u8> {
    rgb(255, 255, 255)
}

/// One key of a repeat unit, in layout units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeySpec {
    pub rect: Rect,
    pub color: Srgb<u8>,
}

impl KeySpec {
    pub fn new(rect: Rect, color: Srgb<u8>) -> KeySpec {
        KeySpec { rect, color }
    }

    pub fn is_black(&self) -> bool {
        self.color == black()
    }
}

/// The keys of one period plus the width over which they tile. Never mutated
/// after construction; switching styles swaps the whole layout.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardLayout {
    keys: Vec<KeySpec>,
    repeat_width: f32,
    height: f32,
}

impl KeyboardLayout {
    pub fn new(keys: Vec<KeySpec>, repeat_width: f32, height: f32) -> Result<KeyboardLayout> {
        if keys.is_empty() {
            return Err(Error::Layout("a layout needs at least one key".to_string()));
        }
        if !(repeat_width > 0.0 && repeat_width.is_finite()) {
            return Err(Error::Layout(format!(
                "repeat width must be positive, got {}",
                repeat_width
            )));
        }
        if !(height > 0.0 && height.is_finite()) {
            return Err(Error::Layout(format!(
                "height must be positive, got {}",
                height
            )));
        }
        Ok(KeyboardLayout {
            keys,
            repeat_width,
            height,
        })
    }

    pub fn keys(&self) -> &[KeySpec] {
        &self.keys
    }

    pub fn period(&self) -> usize {
        self.keys.len()
    }

    pub fn repeat_width(&self) -> f32 {
        self.repeat_width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Key shape for rendered key `index`, tiling the period.
    pub fn key(&self, index: usize) -> &KeySpec {
        &self.keys[index % self.keys.len()]
    }
}
