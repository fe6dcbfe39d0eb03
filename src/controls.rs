//! Synth knobs, the preset selector and the routing of inbound MIDI from a
//! hardware controller onto them.

use crate::error::{Error, Result};
use crate::midi::MidiEvent;
use crate::sink::EventSink;
use std::fmt;
use std::str::FromStr;

pub const PRESET_COUNT: u8 = 32;

const CC_DIAL_SELECT: u8 = 98;
const CC_DIAL_DECREMENT: u8 = 97;
const CC_DIAL_INCREMENT: u8 = 96;
const VALUE_ENCODER: u8 = 64;

custom_derive! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, IterVariants(KnobVariants))]
    pub enum Knob {
        Cutoff,
        Resonance,
        Overdrive,
    }
}

impl Knob {
    pub fn name(&self) -> &'static str {
        match self {
            Knob::Cutoff => "cutoff",
            Knob::Resonance => "resonance",
            Knob::Overdrive => "overdrive",
        }
    }

    /// Controller number the knob sends on.
    pub fn controller(&self) -> u8 {
        match self {
            Knob::Cutoff => 1,
            Knob::Resonance => 2,
            Knob::Overdrive => 3,
        }
    }

    /// Controller number of the hardware dial that moves the knob.
    pub fn dial(&self) -> u8 {
        match self {
            Knob::Cutoff => 80,
            Knob::Resonance => 71,
            Knob::Overdrive => 82,
        }
    }

    fn from_dial(controller: u8) -> Option<Knob> {
        Knob::iter_variants().find(|knob| knob.dial() == controller)
    }

    fn index(&self) -> usize {
        match self {
            Knob::Cutoff => 0,
            Knob::Resonance => 1,
            Knob::Overdrive => 2,
        }
    }
}

impl fmt::Display for Knob {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Knob {
    type Err = Error;

    fn from_str(input: &str) -> Result<Knob> {
        Knob::iter_variants()
            .find(|knob| knob.name() == input)
            .ok_or_else(|| {
                Error::Config(format!(
                    "unknown knob: {}, possible values: {:?}",
                    input,
                    Knob::iter_variants().map(|k| k.name()).collect::<Vec<_>>()
                ))
            })
    }
}

/// What an inbound message turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    RemoteNote { note: u8, velocity: u8 },
    Knob(Knob),
    Preset(u8),
    Dial(u8),
    Ignored,
}

fn knob_value(value: u8) -> f32 {
    f32::min(1.0, value as f32 / 127.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    knobs: [f32; 3],
    preset: u8,
    preset_count: u8,
    current_dial: u8,
    channel: u8,
}

impl ControlPanel {
    pub fn new(channel: u8) -> ControlPanel {
        ControlPanel::with_presets(channel, PRESET_COUNT)
    }

    pub fn with_presets(channel: u8, preset_count: u8) -> ControlPanel {
        ControlPanel {
            knobs: [0.0; 3],
            preset: 0,
            preset_count: preset_count.clamp(1, 128),
            current_dial: 0,
            channel,
        }
    }

    pub fn knob(&self, knob: Knob) -> f32 {
        self.knobs[knob.index()]
    }

    pub fn preset(&self) -> u8 {
        self.preset
    }

    pub fn preset_count(&self) -> u8 {
        self.preset_count
    }

    pub fn current_dial(&self) -> u8 {
        self.current_dial
    }

    pub fn set_channel(&mut self, channel: u8) {
        self.channel = channel.min(15);
    }

    /// Moves a knob and sends its controller value, `round(value * 127)`.
    pub fn set_knob(&mut self, sink: &mut dyn EventSink, knob: Knob, value: f32) {
        let value = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            log::warn!("ignoring non-finite value for knob {}", knob);
            return;
        };
        self.knobs[knob.index()] = value;
        let controller_value = (value * 127.0).round() as u8;
        sink.controller_change(self.channel, knob.controller(), controller_value);
    }

    /// Selects a preset and announces it as a program change. Out-of-range
    /// presets are rejected.
    pub fn select_preset(&mut self, sink: &mut dyn EventSink, preset: u8) -> bool {
        if preset >= self.preset_count {
            log::info!("out of range preset: {}", preset);
            return false;
        }
        log::info!("selecting preset {}", preset);
        self.preset = preset;
        sink.program_change(self.channel, preset);
        true
    }

    fn step_preset(&mut self, sink: &mut dyn EventSink, step: i16) -> Routed {
        let target = self.preset as i16 + step;
        if target < 0 || target >= self.preset_count as i16 {
            return Routed::Ignored;
        }
        self.select_preset(sink, target as u8);
        Routed::Preset(self.preset)
    }

    /// Routes a message from the controller input. Notes are handed back to
    /// the caller for the keyboard's remote path.
    pub fn handle_inbound(&mut self, sink: &mut dyn EventSink, event: MidiEvent) -> Routed {
        match event {
            MidiEvent::NoteOn { note, velocity, .. } => Routed::RemoteNote { note, velocity },
            MidiEvent::NoteOff { note, .. } => Routed::RemoteNote { note, velocity: 0 },
            MidiEvent::ControllerChange {
                controller, value, ..
            } => self.handle_controller(sink, controller, value),
            MidiEvent::ProgramChange { program, .. } => {
                if self.select_preset(sink, program) {
                    Routed::Preset(program)
                } else {
                    Routed::Ignored
                }
            }
        }
    }

    fn handle_controller(&mut self, sink: &mut dyn EventSink, controller: u8, value: u8) -> Routed {
        if let Some(knob) = Knob::from_dial(controller) {
            self.knobs[knob.index()] = knob_value(value);
            sink.controller_change(self.channel, knob.controller(), value);
            return Routed::Knob(knob);
        }
        match (controller, self.current_dial) {
            (CC_DIAL_SELECT, _) => {
                self.current_dial = value;
                Routed::Dial(value)
            }
            (CC_DIAL_DECREMENT, VALUE_ENCODER) => self.step_preset(sink, -1),
            (CC_DIAL_INCREMENT, VALUE_ENCODER) => self.step_preset(sink, 1),
            _ => {
                log::trace!("unmapped controller {} = {}", controller, value);
                Routed::Ignored
            }
        }
    }
}
