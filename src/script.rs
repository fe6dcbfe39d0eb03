//! Line-based command scripts for driving the instrument without a screen.
//!
//! ```text
//! # finger x y [pressure]
//! down 0 5 150 0.7
//! move 0 15 150
//! up 0
//! note 60 100
//! knob cutoff 0.5
//! preset 3
//! zoom -40 2
//! midi b0 50 7f
//! config drag scroll
//! ```

use crate::config::{DragMode, KeyboardConfig};
use crate::controls::Knob;
use crate::error::{Error, Result};
use crate::instrument::Instrument;
use crate::keyboard::layouts::LayoutPreset;
use crate::keyboard::velocity::NEUTRAL_PRESSURE;
use crate::midi::MidiEvent;
use std::io::BufRead;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigChange {
    Layout(LayoutPreset),
    DragMode(DragMode),
    Sensitivity(f32),
    Average(f32),
    Channel(u8),
}

impl ConfigChange {
    pub fn apply(&self, config: KeyboardConfig) -> KeyboardConfig {
        match *self {
            ConfigChange::Layout(layout) => KeyboardConfig { layout, ..config },
            ConfigChange::DragMode(drag_mode) => KeyboardConfig { drag_mode, ..config },
            ConfigChange::Sensitivity(velocity_sensitivity) => KeyboardConfig {
                velocity_sensitivity,
                ..config
            },
            ConfigChange::Average(velocity_average) => KeyboardConfig {
                velocity_average,
                ..config
            },
            ConfigChange::Channel(channel) => KeyboardConfig { channel, ..config },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Down {
        finger: usize,
        x: f32,
        y: f32,
        pressure: f32,
    },
    Move {
        finger: usize,
        x: f32,
        y: f32,
    },
    Up {
        finger: usize,
    },
    RemoteNote {
        note: u8,
        velocity: u8,
    },
    Knob {
        knob: Knob,
        value: f32,
    },
    Preset(u8),
    ScrollZoom {
        offset: f32,
        zoom: f32,
    },
    Inbound(MidiEvent),
    Config(ConfigChange),
    Render,
}

fn arg<T>(words: &[&str], index: usize, name: &str) -> std::result::Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let word = words
        .get(index)
        .ok_or_else(|| format!("missing argument: {}", name))?;
    word.parse()
        .map_err(|e| format!("invalid {} {:?}: {}", name, word, e))
}

fn parse_hex_bytes(words: &[&str]) -> std::result::Result<Vec<u8>, String> {
    words
        .iter()
        .map(|word| u8::from_str_radix(word, 16).map_err(|e| format!("invalid byte {:?}: {}", word, e)))
        .collect()
}

fn parse_config(words: &[&str]) -> std::result::Result<ConfigChange, String> {
    let key: String = arg(words, 1, "config key")?;
    let change = match key.as_str() {
        "layout" => ConfigChange::Layout(arg(words, 2, "layout")?),
        "drag" => ConfigChange::DragMode(arg(words, 2, "drag mode")?),
        "sensitivity" => ConfigChange::Sensitivity(arg(words, 2, "sensitivity")?),
        "average" => ConfigChange::Average(arg(words, 2, "average")?),
        "channel" => ConfigChange::Channel(arg(words, 2, "channel")?),
        other => return Err(format!("unknown config key: {}", other)),
    };
    Ok(change)
}

fn parse_words(words: &[&str]) -> std::result::Result<Command, String> {
    let command = match words[0] {
        "down" => Command::Down {
            finger: arg(words, 1, "finger")?,
            x: arg(words, 2, "x")?,
            y: arg(words, 3, "y")?,
            pressure: if words.len() > 4 {
                arg(words, 4, "pressure")?
            } else {
                NEUTRAL_PRESSURE
            },
        },
        "move" => Command::Move {
            finger: arg(words, 1, "finger")?,
            x: arg(words, 2, "x")?,
            y: arg(words, 3, "y")?,
        },
        "up" => Command::Up {
            finger: arg(words, 1, "finger")?,
        },
        "note" => Command::RemoteNote {
            note: arg(words, 1, "note")?,
            velocity: arg(words, 2, "velocity")?,
        },
        "knob" => Command::Knob {
            knob: arg(words, 1, "knob")?,
            value: arg(words, 2, "value")?,
        },
        "preset" => Command::Preset(arg(words, 1, "preset")?),
        "zoom" => Command::ScrollZoom {
            offset: arg(words, 1, "offset")?,
            zoom: arg(words, 2, "zoom")?,
        },
        "midi" => {
            let bytes = parse_hex_bytes(&words[1..])?;
            let event = MidiEvent::from_raw_midi(&bytes)
                .ok_or_else(|| format!("unsupported midi message: {:02x?}", bytes))?;
            Command::Inbound(event)
        }
        "config" => Command::Config(parse_config(words)?),
        "render" => Command::Render,
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(command)
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line_number: usize, line: &str) -> Result<Option<Command>> {
    let content = match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    };
    let words: Vec<&str> = content.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    parse_words(&words)
        .map(Some)
        .map_err(|message| Error::Script {
            line: line_number,
            message,
        })
}

impl Instrument {
    pub fn execute(&mut self, command: &Command) {
        log::debug!("executing {:?}", command);
        match *command {
            Command::Down {
                finger,
                x,
                y,
                pressure,
            } => self.keyboard.touch_down(finger, x, y, pressure),
            Command::Move { finger, x, y } => self.keyboard.touch_move(finger, x, y),
            Command::Up { finger } => self.keyboard.touch_up(finger),
            Command::RemoteNote { note, velocity } => self.keyboard.set_remote_note(note, velocity),
            Command::Knob { knob, value } => self.set_knob(knob, value),
            Command::Preset(preset) => {
                self.select_preset(preset);
            }
            Command::ScrollZoom { offset, zoom } => self.keyboard.set_scroll_zoom(offset, zoom),
            Command::Inbound(event) => {
                let routed = self.handle_inbound(event);
                log::debug!("{:?} routed to {:?}", event, routed);
            }
            Command::Config(change) => {
                let config = change.apply(*self.keyboard.config());
                self.apply_config(config);
            }
            Command::Render => {
                for paint in self.keyboard.render() {
                    if self.keyboard.note_velocity(paint.note) > 0 {
                        log::info!(
                            "note {} at ({:.1}, {:.1}) filled {:?}",
                            paint.note,
                            paint.rect.left,
                            paint.rect.top,
                            paint.fill
                        );
                    }
                }
            }
        }
    }
}

/// Runs every line of a script, calling `after_command` after each one, e.g.
/// to flush the events it produced. Stops at the first malformed line.
pub fn run_script<R, F>(reader: R, instrument: &mut Instrument, mut after_command: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(&mut Instrument),
{
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(command) = parse_line(index + 1, &line)? {
            instrument.execute(&command);
            after_command(instrument);
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sink::ChannelSink;

    mod parse_line {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn parses_commands() -> Result<()> {
            let table = vec![
                (
                    "down 1 5 150",
                    Command::Down {
                        finger: 1,
                        x: 5.0,
                        y: 150.0,
                        pressure: 0.5,
                    },
                ),
                (
                    "down 1 5 150 0.9",
                    Command::Down {
                        finger: 1,
                        x: 5.0,
                        y: 150.0,
                        pressure: 0.9,
                    },
                ),
                (
                    "move 1 -3.5 20",
                    Command::Move {
                        finger: 1,
                        x: -3.5,
                        y: 20.0,
                    },
                ),
                ("up 4", Command::Up { finger: 4 }),
                (
                    "note 60 0",
                    Command::RemoteNote {
                        note: 60,
                        velocity: 0,
                    },
                ),
                (
                    "knob resonance 0.25",
                    Command::Knob {
                        knob: Knob::Resonance,
                        value: 0.25,
                    },
                ),
                ("preset 7", Command::Preset(7)),
                (
                    "zoom -40 2",
                    Command::ScrollZoom {
                        offset: -40.0,
                        zoom: 2.0,
                    },
                ),
                (
                    "midi b0 50 7f",
                    Command::Inbound(MidiEvent::ControllerChange {
                        channel: 0,
                        controller: 80,
                        value: 127,
                    }),
                ),
                (
                    "config drag TDA_ScrollKeyboard",
                    Command::Config(ConfigChange::DragMode(DragMode::ScrollKeyboard)),
                ),
                (
                    "config layout stripes",
                    Command::Config(ConfigChange::Layout(LayoutPreset::Stripes)),
                ),
                ("  render  # show it", Command::Render),
            ];
            for (line, expected) in table {
                assert_eq!(parse_line(1, line)?, Some(expected), "line: {}", line);
            }
            Ok(())
        }

        #[test]
        fn skips_blank_lines_and_comments() -> Result<()> {
            assert_eq!(parse_line(1, "")?, None);
            assert_eq!(parse_line(2, "   # nothing here")?, None);
            Ok(())
        }

        #[test]
        fn reports_the_line_of_bad_commands() {
            let table = vec!["jump 1", "down 1 5", "down x 5 5", "knob volume 1", "midi f8", "midi zz"];
            for line in table {
                match parse_line(12, line) {
                    Err(Error::Script { line: 12, .. }) => {}
                    other => panic!("{:?} parsed to {:?}", line, other),
                }
            }
        }
    }

    mod run_script {
        use super::*;
        use crate::midi::MidiEvent::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn plays_a_script_through_the_sink() -> Result<()> {
            let mut instrument = Instrument::new(KeyboardConfig::default(), 561.0, 201.0);
            let (sink, receiver) = ChannelSink::new(64);
            instrument.set_sink(Box::new(sink));
            let script = "
                down 0 5 150
                move 0 15 150
                up 0
                knob cutoff 1
            ";
            let mut flushes = 0;
            run_script(script.as_bytes(), &mut instrument, |_| flushes += 1)?;
            assert_eq!(flushes, 4);
            assert_eq!(
                receiver.try_iter().collect::<Vec<_>>(),
                vec![
                    NoteOn {
                        channel: 0,
                        note: 12,
                        velocity: 64
                    },
                    NoteOff {
                        channel: 0,
                        note: 12,
                        velocity: 64
                    },
                    NoteOn {
                        channel: 0,
                        note: 14,
                        velocity: 64
                    },
                    NoteOff {
                        channel: 0,
                        note: 14,
                        velocity: 64
                    },
                    ControllerChange {
                        channel: 0,
                        controller: 1,
                        value: 127
                    },
                ]
            );
            Ok(())
        }

        #[test]
        fn applies_config_changes() -> Result<()> {
            let mut instrument = Instrument::new(KeyboardConfig::default(), 561.0, 201.0);
            run_script(
                "config drag scroll\nconfig channel 3\n".as_bytes(),
                &mut instrument,
                |_| {},
            )?;
            assert_eq!(instrument.keyboard.config().drag_mode, DragMode::ScrollKeyboard);
            assert_eq!(instrument.keyboard.config().channel, 3);
            Ok(())
        }

        #[test]
        fn stops_at_the_first_bad_line() {
            let mut instrument = Instrument::new(KeyboardConfig::default(), 561.0, 201.0);
            let result = run_script("note 60 100\nbogus\nnote 61 100\n".as_bytes(), &mut instrument, |_| {});
            match result {
                Err(Error::Script { line: 2, .. }) => {}
                other => panic!("unexpected result: {:?}", other),
            }
            assert_eq!(instrument.keyboard.note_velocity(60), 100);
            assert_eq!(instrument.keyboard.note_velocity(61), 0);
        }
    }
}
