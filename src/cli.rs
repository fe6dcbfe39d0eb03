use crate::config::{DragMode, KeyboardConfig};
use crate::error::{Error, Result};
use crate::keyboard::layouts::LayoutPreset;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub config: KeyboardConfig,
    pub width: f32,
    pub height: f32,
    pub midi: bool,
    pub script: Option<String>,
    pub touch_device: Option<String>,
    pub window: bool,
}

pub fn command() -> Command {
    Command::new("touch-keyboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("multi-touch keyboard that sends midi")
        .arg(
            Arg::new("layout")
                .long("layout")
                .value_name("LAYOUT")
                .help(format!(
                    "keyboard layout, possible values: {:?} (default: {})",
                    LayoutPreset::names(),
                    LayoutPreset::default()
                )),
        )
        .arg(
            Arg::new("sensitivity")
                .long("sensitivity")
                .value_name("0..1")
                .help("how much pressure changes the velocity (default: 0.5)"),
        )
        .arg(
            Arg::new("velocity-average")
                .long("velocity-average")
                .value_name("0..127")
                .help("velocity at neutral pressure (default: 64)"),
        )
        .arg(
            Arg::new("drag-mode")
                .long("drag-mode")
                .value_name("MODE")
                .help("what sliding a finger does: play or scroll (default: play)"),
        )
        .arg(
            Arg::new("channel")
                .long("channel")
                .value_name("0..15")
                .help("midi channel (default: 0)"),
        )
        .arg(
            Arg::new("first-key")
                .long("first-key")
                .value_name("MIDI")
                .help("lowest rendered note (default: 12)"),
        )
        .arg(
            Arg::new("keys")
                .long("keys")
                .value_name("COUNT")
                .help("number of rendered keys (default: 96)"),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .value_name("PIXELS")
                .help("drawing width (default: 1920)"),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .value_name("PIXELS")
                .help("drawing height (default: 400)"),
        )
        .arg(
            Arg::new("midi")
                .long("midi")
                .help("send events to a jack midi port instead of printing them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("script")
                .long("script")
                .value_name("FILE")
                .help("read commands from FILE instead of stdin"),
        )
        .arg(
            Arg::new("touch-device")
                .long("touch-device")
                .value_name("DEVICE")
                .help("read touches from an evdev device, e.g. /dev/input/event15"),
        )
        .arg(
            Arg::new("window")
                .long("window")
                .help("open a window showing the keyboard")
                .action(ArgAction::SetTrue),
        )
}

pub fn parse() -> Result<Args> {
    from_matches(&command().get_matches())
}

pub fn parse_from<I, T>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = command()
        .try_get_matches_from(args)
        .map_err(|e| Error::Config(e.to_string()))?;
    from_matches(&matches)
}

fn from_matches(matches: &ArgMatches) -> Result<Args> {
    let defaults = KeyboardConfig::default();
    let config = KeyboardConfig {
        layout: parse_with_default(matches, "layout", defaults.layout)?,
        velocity_sensitivity: parse_with_default(
            matches,
            "sensitivity",
            defaults.velocity_sensitivity,
        )?,
        velocity_average: parse_with_default(matches, "velocity-average", defaults.velocity_average)?,
        drag_mode: parse_with_default::<DragMode>(matches, "drag-mode", defaults.drag_mode)?,
        channel: parse_with_default(matches, "channel", defaults.channel)?,
        first_key: parse_with_default(matches, "first-key", defaults.first_key)?,
        n_keys: parse_with_default(matches, "keys", defaults.n_keys)?,
    };
    Ok(Args {
        config: config.sanitized(),
        width: parse_with_default(matches, "width", 1920.0)?,
        height: parse_with_default(matches, "height", 400.0)?,
        midi: matches.get_flag("midi"),
        script: matches.get_one::<String>("script").cloned(),
        touch_device: matches.get_one::<String>("touch-device").cloned(),
        window: matches.get_flag("window"),
    })
}

fn parse_with_default<N>(matches: &ArgMatches, name: &str, default: N) -> Result<N>
where
    N: FromStr,
    <N as FromStr>::Err: Display,
{
    match matches.get_one::<String>(name) {
        None => Ok(default),
        Some(string) => string
            .parse()
            .map_err(|e| Error::Config(format!("--{}: {}", name, e))),
    }
}
