use crate::error::{AddMessage, Result};
use crate::touch::{Calibration, MultitouchDecoder, PointerSample, RawTouchEvent};
use evdev_rs::enums::{EventCode, EV_ABS, EV_SYN};
use evdev_rs::{Device, DeviceWrapper, GrabMode, InputEvent, ReadFlag, ReadStatus};
use std::time::Duration;

pub struct InputEventSource {
    device: Device,
}

impl InputEventSource {
    pub fn new(path: &str) -> Result<InputEventSource> {
        let mut device =
            Device::new_from_path(path).add_message(format!("can't open {}", path))?;
        device
            .grab(GrabMode::Grab)
            .add_message(format!("can't grab {}", path))?;
        log::info!(
            "reading touches from {} ({})",
            path,
            device.name().unwrap_or("unnamed device")
        );
        Ok(InputEventSource { device })
    }

    /// Raw ranges of the touch axes, mapped onto a `width` x `height` area.
    pub fn calibration(&self, width: f32, height: f32) -> Calibration {
        let range = |axis| {
            self.device
                .abs_info(&EventCode::EV_ABS(axis))
                .map(|info| (info.minimum, info.maximum))
        };
        Calibration {
            x_range: range(EV_ABS::ABS_MT_POSITION_X).unwrap_or((0, width as i32)),
            y_range: range(EV_ABS::ABS_MT_POSITION_Y).unwrap_or((0, height as i32)),
            pressure_max: range(EV_ABS::ABS_MT_PRESSURE).map(|(_, max)| max),
            width,
            height,
        }
    }

    pub fn pointer_samples(self, width: f32, height: f32) -> impl Iterator<Item = PointerSample> {
        let decoder = MultitouchDecoder::new(self.calibration(width, height));
        decoder.decode(self.filter_map(|event| to_raw_touch_event(&event)))
    }
}

impl Iterator for InputEventSource {
    type Item = InputEvent;

    fn next(&mut self) -> Option<InputEvent> {
        match self
            .device
            .next_event(ReadFlag::NORMAL | ReadFlag::BLOCKING)
        {
            Err(e) => {
                log::error!("error reading touch device: {}", e);
                None
            }
            Ok((status, event)) => {
                if status == ReadStatus::Sync {
                    log::debug!("touch device is resyncing");
                }
                Some(event)
            }
        }
    }
}

pub fn to_raw_touch_event(event: &InputEvent) -> Option<RawTouchEvent> {
    let value = event.value;
    match event.event_code {
        EventCode::EV_ABS(EV_ABS::ABS_MT_SLOT) => Some(RawTouchEvent::Slot(value)),
        EventCode::EV_ABS(EV_ABS::ABS_MT_TRACKING_ID) => Some(RawTouchEvent::TrackingId(value)),
        EventCode::EV_ABS(EV_ABS::ABS_MT_POSITION_X) => Some(RawTouchEvent::PositionX(value)),
        EventCode::EV_ABS(EV_ABS::ABS_MT_POSITION_Y) => Some(RawTouchEvent::PositionY(value)),
        EventCode::EV_ABS(EV_ABS::ABS_MT_PRESSURE) => Some(RawTouchEvent::Pressure(value)),
        EventCode::EV_SYN(EV_SYN::SYN_REPORT) => {
            let time = Duration::from_secs(event.time.tv_sec.max(0) as u64)
                + Duration::from_micros(event.time.tv_usec.max(0) as u64);
            Some(RawTouchEvent::SynReport(time))
        }
        EventCode::EV_SYN(EV_SYN::SYN_DROPPED) => Some(RawTouchEvent::SynDropped),
        _ => None,
    }
}
