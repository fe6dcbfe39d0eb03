use super::layout::{black, white, KeySpec, KeyboardLayout, Rect};
use crate::error::{Error, Result};
use palette::{FromColor, Hsv, Srgb};
use std::fmt;
use std::str::FromStr;

custom_derive! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, IterVariants(LayoutPresetVariants))]
    pub enum LayoutPreset {
        TwoRow,
        Stripes,
    }
}

impl Default for LayoutPreset {
    fn default() -> Self {
        LayoutPreset::TwoRow
    }
}

impl LayoutPreset {
    pub fn name(&self) -> &'static str {
        match self {
            LayoutPreset::TwoRow => "2row",
            LayoutPreset::Stripes => "stripes",
        }
    }

    pub fn names() -> Vec<&'static str> {
        LayoutPreset::iter_variants().map(|preset| preset.name()).collect()
    }

    pub fn build(&self) -> KeyboardLayout {
        match self {
            LayoutPreset::TwoRow => two_row(),
            LayoutPreset::Stripes => stripes(),
        }
    }
}

impl fmt::Display for LayoutPreset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LayoutPreset {
    type Err = Error;

    fn from_str(input: &str) -> Result<LayoutPreset> {
        LayoutPreset::iter_variants()
            .find(|preset| preset.name().eq_ignore_ascii_case(input))
            .ok_or_else(|| {
                Error::Config(format!(
                    "unknown layout: {}, possible values: {:?}",
                    input,
                    LayoutPreset::names()
                ))
            })
    }
}

const BLACK_PITCH_CLASSES: [bool; 12] = [
    false, true, false, true, false, false, true, false, true, false, true, false,
];

/// White keys as unit squares in the lower row, black keys in the upper row
/// straddling the white-key boundaries. Keys are listed chromatically.
fn two_row() -> KeyboardLayout {
    let mut keys = Vec::with_capacity(12);
    let mut white_index = 0;
    for is_black in BLACK_PITCH_CLASSES.iter() {
        if *is_black {
            let left = white_index as f32 - 0.5;
            keys.push(KeySpec::new(Rect::new(left, 0.0, 1.0, 1.0), black()));
        } else {
            keys.push(KeySpec::new(
                Rect::new(white_index as f32, 1.0, 1.0, 1.0),
                white(),
            ));
            white_index += 1;
        }
    }
    finish(keys, 7.0, 2.0)
}

fn stripes() -> KeyboardLayout {
    let keys = (0..12)
        .map(|pitch_class| {
            KeySpec::new(
                Rect::new(pitch_class as f32, 0.0, 1.0, 1.0),
                fifths_color(pitch_class),
            )
        })
        .collect();
    finish(keys, 12.0, 1.0)
}

fn finish(keys: Vec<KeySpec>, repeat_width: f32, height: f32) -> KeyboardLayout {
    match KeyboardLayout::new(keys, repeat_width, height) {
        Ok(layout) => layout,
        Err(e) => unreachable!("built-in layout is invalid: {}", e),
    }
}

/// Hue walks the circle of fifths, so C is always blue.
fn fifths_color(pitch_class: i32) -> Srgb<u8> {
    let hue_number = (pitch_class * 7) % 12;
    let hsv: Hsv = Hsv::new(hue_number as f32 * 30.0 + 240.0, 1.0, 1.0);
    let color: Srgb<f32> = Srgb::from_color(hsv);
    color.into_format()
}
