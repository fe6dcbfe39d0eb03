//! Preference values handed to the keyboard as one value object.

use crate::error::{Error, Result};
use crate::keyboard::layouts::LayoutPreset;
use crate::keyboard::velocity::VelocityCurve;
use std::fmt;
use std::str::FromStr;

custom_derive! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, IterVariants(DragModeVariants))]
    pub enum DragMode {
        PlayNotes,
        ScrollKeyboard,
    }
}

impl Default for DragMode {
    fn default() -> Self {
        DragMode::PlayNotes
    }
}

impl DragMode {
    pub fn name(&self) -> &'static str {
        match self {
            DragMode::PlayNotes => "play",
            DragMode::ScrollKeyboard => "scroll",
        }
    }

    /// Accepts the stored preference strings as well as the short names.
    /// Anything unrecognised falls back to playing notes.
    pub fn from_preference(input: &str) -> DragMode {
        input.parse().unwrap_or_else(|_| {
            log::warn!("unknown drag mode {:?}, playing notes instead", input);
            DragMode::PlayNotes
        })
    }
}

impl fmt::Display for DragMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DragMode {
    type Err = Error;

    fn from_str(input: &str) -> Result<DragMode> {
        match input {
            "play" | "PlayNotes" | "TDA_PlayNotes" => Ok(DragMode::PlayNotes),
            "scroll" | "ScrollKeyboard" | "TDA_ScrollKeyboard" => Ok(DragMode::ScrollKeyboard),
            _ => Err(Error::Config(format!(
                "unknown drag mode: {}, possible values: {:?}",
                input,
                DragMode::iter_variants()
                    .map(|mode| mode.name())
                    .collect::<Vec<_>>()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardConfig {
    pub layout: LayoutPreset,
    pub velocity_sensitivity: f32,
    pub velocity_average: f32,
    pub drag_mode: DragMode,
    pub channel: u8,
    pub first_key: u8,
    pub n_keys: usize,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        KeyboardConfig {
            layout: LayoutPreset::default(),
            velocity_sensitivity: 0.5,
            velocity_average: 64.0,
            drag_mode: DragMode::default(),
            channel: 0,
            first_key: 12,
            n_keys: 96,
        }
    }
}

fn clamp_field(name: &str, value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    let result = if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    };
    if result != value {
        log::warn!("{} {} out of range, using {}", name, value, result);
    }
    result
}

impl KeyboardConfig {
    /// Copy with every field forced into its valid range.
    pub fn sanitized(self) -> KeyboardConfig {
        let defaults = KeyboardConfig::default();
        let channel = self.channel.min(15);
        if channel != self.channel {
            log::warn!("midi channel {} out of range, using {}", self.channel, channel);
        }
        let first_key = self.first_key.min(127);
        let n_keys = self.n_keys.clamp(1, 128 - first_key as usize);
        if n_keys != self.n_keys {
            log::warn!("key count {} out of range, using {}", self.n_keys, n_keys);
        }
        KeyboardConfig {
            velocity_sensitivity: clamp_field(
                "velocity sensitivity",
                self.velocity_sensitivity,
                0.0,
                1.0,
                defaults.velocity_sensitivity,
            ),
            velocity_average: clamp_field(
                "velocity average",
                self.velocity_average,
                0.0,
                127.0,
                defaults.velocity_average,
            ),
            channel,
            first_key,
            n_keys,
            ..self
        }
    }

    pub fn velocity_curve(&self) -> VelocityCurve {
        VelocityCurve {
            sensitivity: self.velocity_sensitivity,
            average: self.velocity_average,
        }
    }
}
