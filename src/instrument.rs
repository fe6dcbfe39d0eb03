//! The keyboard together with the knob panel, sharing one event sink.

use crate::config::KeyboardConfig;
use crate::controls::{ControlPanel, Knob, Routed};
use crate::keyboard::KeyboardView;
use crate::midi::MidiEvent;
use crate::sink::EventSink;

pub struct Instrument {
    pub keyboard: KeyboardView,
    pub controls: ControlPanel,
}

impl Instrument {
    pub fn new(config: KeyboardConfig, width: f32, height: f32) -> Instrument {
        let keyboard = KeyboardView::new(config, width, height);
        let controls = ControlPanel::new(keyboard.config().channel);
        Instrument { keyboard, controls }
    }

    pub fn set_sink(&mut self, sink: Box<dyn EventSink>) {
        self.keyboard.set_sink(sink);
    }

    pub fn apply_config(&mut self, config: KeyboardConfig) {
        self.keyboard.apply_config(config);
        self.controls.set_channel(self.keyboard.config().channel);
    }

    pub fn set_knob(&mut self, knob: Knob, value: f32) {
        self.controls.set_knob(self.keyboard.sink(), knob, value);
    }

    pub fn select_preset(&mut self, preset: u8) -> bool {
        self.controls.select_preset(self.keyboard.sink(), preset)
    }

    /// Routes a message from an external controller. Notes light up keys,
    /// dials move knobs and program changes pick presets.
    pub fn handle_inbound(&mut self, event: MidiEvent) -> Routed {
        let routed = self.controls.handle_inbound(self.keyboard.sink(), event);
        if let Routed::RemoteNote { note, velocity } = routed {
            self.keyboard.set_remote_note(note, velocity);
        }
        routed
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::midi::MidiEvent::*;
    use crate::sink::ChannelSink;

    mod handle_inbound {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn shows_inbound_notes_on_the_keyboard() {
            let mut instrument = Instrument::new(KeyboardConfig::default(), 561.0, 201.0);
            instrument.handle_inbound(NoteOn {
                channel: 0,
                note: 60,
                velocity: 70,
            });
            assert_eq!(instrument.keyboard.note_velocity(60), 70);
            instrument.handle_inbound(NoteOn {
                channel: 0,
                note: 60,
                velocity: 0,
            });
            assert_eq!(instrument.keyboard.note_velocity(60), 0);
        }

        #[test]
        fn forwards_dial_moves_through_the_keyboard_sink() {
            let mut instrument = Instrument::new(
                KeyboardConfig {
                    channel: 2,
                    ..KeyboardConfig::default()
                },
                561.0,
                201.0,
            );
            let (sink, receiver) = ChannelSink::new(8);
            instrument.set_sink(Box::new(sink));
            instrument.handle_inbound(ControllerChange {
                channel: 9,
                controller: 82,
                value: 33,
            });
            assert_eq!(
                receiver.try_iter().collect::<Vec<_>>(),
                vec![ControllerChange {
                    channel: 2,
                    controller: 3,
                    value: 33
                }]
            );
        }
    }

    mod apply_config {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn moves_the_knobs_to_the_new_channel() {
            let mut instrument = Instrument::new(KeyboardConfig::default(), 561.0, 201.0);
            let (sink, receiver) = ChannelSink::new(8);
            instrument.set_sink(Box::new(sink));
            instrument.apply_config(KeyboardConfig {
                channel: 5,
                ..KeyboardConfig::default()
            });
            instrument.set_knob(Knob::Cutoff, 1.0);
            instrument.select_preset(3);
            assert_eq!(
                receiver.try_iter().collect::<Vec<_>>(),
                vec![
                    ControllerChange {
                        channel: 5,
                        controller: 1,
                        value: 127
                    },
                    ProgramChange {
                        channel: 5,
                        program: 3
                    },
                ]
            );
        }
    }
}
