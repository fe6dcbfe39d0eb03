//! Event sinks. Emission is fire-and-forget: a sink that cannot take an event
//! drops it and the caller never finds out.

use crate::midi::MidiEvent;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

pub trait EventSink {
    fn send(&mut self, event: MidiEvent);

    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.send(MidiEvent::NoteOn {
            channel,
            note,
            velocity,
        });
    }

    fn note_off(&mut self, channel: u8, note: u8, velocity: u8) {
        self.send(MidiEvent::NoteOff {
            channel,
            note,
            velocity,
        });
    }

    fn controller_change(&mut self, channel: u8, controller: u8, value: u8) {
        self.send(MidiEvent::ControllerChange {
            channel,
            controller,
            value,
        });
    }

    fn program_change(&mut self, channel: u8, program: u8) {
        self.send(MidiEvent::ProgramChange { channel, program });
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn send(&mut self, event: MidiEvent) {
        log::trace!("NullSink: dropping {:?}", event);
    }
}

impl EventSink for Vec<MidiEvent> {
    fn send(&mut self, event: MidiEvent) {
        self.push(event);
    }
}

/// Hands events to another thread through a bounded queue. When the queue is
/// full or the receiving side is gone the event is dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<MidiEvent>,
    dropped: usize,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (ChannelSink, Receiver<MidiEvent>) {
        let (sender, receiver) = bounded(capacity);
        (ChannelSink { sender, dropped: 0 }, receiver)
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl EventSink for ChannelSink {
    fn send(&mut self, event: MidiEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.dropped += 1;
                log::warn!("ChannelSink: queue full, dropping {:?}", event);
            }
            Err(TrySendError::Disconnected(event)) => {
                self.dropped += 1;
                log::warn!("ChannelSink: receiver gone, dropping {:?}", event);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    mod channel_sink {
        use super::*;

        #[test]
        fn forwards_events_to_the_receiver() {
            let (mut sink, receiver) = ChannelSink::new(4);
            sink.note_on(0, 60, 100);
            sink.note_off(0, 60, 100);
            assert_eq!(
                receiver.try_iter().collect::<Vec<_>>(),
                vec![
                    MidiEvent::NoteOn {
                        channel: 0,
                        note: 60,
                        velocity: 100
                    },
                    MidiEvent::NoteOff {
                        channel: 0,
                        note: 60,
                        velocity: 100
                    },
                ]
            );
        }

        #[test]
        fn drops_events_instead_of_blocking_when_full() {
            let (mut sink, receiver) = ChannelSink::new(1);
            sink.controller_change(0, 1, 10);
            sink.controller_change(0, 1, 20);
            assert_eq!(sink.dropped(), 1);
            assert_eq!(
                receiver.try_iter().collect::<Vec<_>>(),
                vec![MidiEvent::ControllerChange {
                    channel: 0,
                    controller: 1,
                    value: 10
                }]
            );
        }

        #[test]
        fn survives_a_disconnected_receiver() {
            let (mut sink, receiver) = ChannelSink::new(1);
            drop(receiver);
            sink.program_change(0, 3);
            assert_eq!(sink.dropped(), 1);
        }
    }
}
