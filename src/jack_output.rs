//! JACK MIDI ports. Outgoing events arrive through the receiver of a
//! `ChannelSink` and are written in the process callback. Messages from the
//! controller input are parsed there and queued for the UI thread.

use crate::error::Result;
use crate::midi::MidiEvent;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

const INBOUND_QUEUE: usize = 256;

pub struct JackMidi {
    _active_client: jack::AsyncClient<(), MidiProcessHandler>,
    inbound: Receiver<MidiEvent>,
}

impl JackMidi {
    pub fn new(client_name: &str, outgoing: Receiver<MidiEvent>) -> Result<JackMidi> {
        let (client, _status) =
            jack::Client::new(client_name, jack::ClientOptions::NO_START_SERVER)?;
        let output = client.register_port("output", jack::MidiOut::default())?;
        let controller = client.register_port("controller", jack::MidiIn::default())?;
        let (inbound_sender, inbound) = bounded(INBOUND_QUEUE);
        log::info!(
            "jack client {} running at {} Hz",
            client.name(),
            client.sample_rate()
        );
        let active_client = client.activate_async(
            (),
            MidiProcessHandler {
                output,
                controller,
                outgoing,
                inbound: inbound_sender,
            },
        )?;
        Ok(JackMidi {
            _active_client: active_client,
            inbound,
        })
    }

    /// Messages received on the controller port since the last call.
    pub fn inbound(&self) -> &Receiver<MidiEvent> {
        &self.inbound
    }
}

struct MidiProcessHandler {
    output: jack::Port<jack::MidiOut>,
    controller: jack::Port<jack::MidiIn>,
    outgoing: Receiver<MidiEvent>,
    inbound: Sender<MidiEvent>,
}

impl jack::ProcessHandler for MidiProcessHandler {
    fn process(&mut self, _client: &jack::Client, scope: &jack::ProcessScope) -> jack::Control {
        for raw_midi in self.controller.iter(scope) {
            if let Some(event) = MidiEvent::from_raw_midi(raw_midi.bytes) {
                forward_inbound(&self.inbound, event);
            }
        }
        let mut writer = self.output.writer(scope);
        for event in self.outgoing.try_iter() {
            let bytes = event.to_bytes();
            let result = writer.write(&jack::RawMidi {
                time: 0,
                bytes: &bytes,
            });
            if let Err(e) = result {
                log::error!("MidiProcessHandler.process: error: {:?}", e);
            }
        }
        jack::Control::Continue
    }
}

fn forward_inbound(sender: &Sender<MidiEvent>, event: MidiEvent) {
    match sender.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => log::warn!("inbound queue full, dropping {:?}", event),
        Err(TrySendError::Disconnected(_)) => {}
    }
}
