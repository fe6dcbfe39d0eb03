use crossbeam_channel::Receiver;
use std::fs::File;
use std::io::{self, BufReader};
use touch_keyboard::cli::{self, Args};
use touch_keyboard::jack_output::JackMidi;
use touch_keyboard::{script, ChannelSink, Instrument, MidiEvent, Result};

const CLIENT_NAME: &str = "touch-keyboard";
const QUEUE_SIZE: usize = 1024;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("touch-keyboard: {}", e);
        std::process::exit(1);
    }
}

/// Where the produced events go: a JACK port, or stdout.
struct Output {
    jack: Option<JackMidi>,
    printed: Option<Receiver<MidiEvent>>,
}

impl Output {
    fn new(args: &Args, outgoing: Receiver<MidiEvent>) -> Result<Output> {
        if args.midi {
            Ok(Output {
                jack: Some(JackMidi::new(CLIENT_NAME, outgoing)?),
                printed: None,
            })
        } else {
            Ok(Output {
                jack: None,
                printed: Some(outgoing),
            })
        }
    }

    fn flush(&self, instrument: &mut Instrument) {
        if let Some(jack) = &self.jack {
            for event in jack.inbound().try_iter() {
                instrument.handle_inbound(event);
            }
        }
        if let Some(printed) = &self.printed {
            for event in printed.try_iter() {
                println!("{:02x?} {:?}", event.to_bytes(), event);
            }
        }
    }
}

fn run() -> Result<()> {
    let args = cli::parse()?;
    log::info!("starting with {:?}", args);
    let mut instrument = Instrument::new(args.config, args.width, args.height);
    let (sink, outgoing) = ChannelSink::new(QUEUE_SIZE);
    instrument.set_sink(Box::new(sink));
    let output = Output::new(&args, outgoing)?;
    if let Some(device) = &args.touch_device {
        run_touch_device(&args, device, &mut instrument, &output)
    } else if args.window {
        run_window(&mut instrument, &output)
    } else {
        match &args.script {
            Some(path) => {
                let file = File::open(path)?;
                script::run_script(BufReader::new(file), &mut instrument, |i| output.flush(i))
            }
            None => {
                let stdin = io::stdin();
                script::run_script(stdin.lock(), &mut instrument, |i| output.flush(i))
            }
        }
    }
}

#[cfg(feature = "evdev")]
fn run_touch_device(
    args: &Args,
    device: &str,
    instrument: &mut Instrument,
    output: &Output,
) -> Result<()> {
    let source = touch_keyboard::evdev::InputEventSource::new(device)?;
    for sample in source.pointer_samples(args.width, args.height) {
        instrument.keyboard.on_pointer(sample);
        output.flush(instrument);
    }
    Ok(())
}

#[cfg(not(feature = "evdev"))]
fn run_touch_device(_: &Args, device: &str, _: &mut Instrument, _: &Output) -> Result<()> {
    Err(touch_keyboard::Error::Config(format!(
        "can't read {}: built without the evdev feature",
        device
    )))
}

#[cfg(feature = "sdl")]
fn run_window(instrument: &mut Instrument, output: &Output) -> Result<()> {
    touch_keyboard::ui::run(instrument, |i| output.flush(i))
}

#[cfg(not(feature = "sdl"))]
fn run_window(_: &mut Instrument, _: &Output) -> Result<()> {
    Err(touch_keyboard::Error::Config(
        "can't open a window: built without the sdl feature".to_string(),
    ))
}
