//! SDL window showing the keyboard. Mouse and touch both play; the wheel zooms.

use crate::error::{Error, Result};
use crate::instrument::Instrument;
use crate::keyboard::layout::Rect;
use crate::keyboard::render::KeyPaint;
use crate::keyboard::velocity::NEUTRAL_PRESSURE;
use crate::touch::SlotAllocator;
use palette::Srgb;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::Color;
use sdl2::render::Canvas;
use sdl2::video::Window;

/// Finger id the mouse is registered under, next to the real touches.
const MOUSE_ID: i64 = i64::MIN;
const ZOOM_STEP: f32 = 1.25;
const FRAME_MILLIS: u32 = 16;

fn device_error<E: ToString>(e: E) -> Error {
    Error::Device(e.to_string())
}

pub fn to_sdl_rect(rect: &Rect) -> sdl2::rect::Rect {
    sdl2::rect::Rect::new(
        rect.left.round() as i32,
        rect.top.round() as i32,
        rect.width.round().max(1.0) as u32,
        rect.height.round().max(1.0) as u32,
    )
}

pub fn to_sdl_color(color: Srgb<u8>) -> Color {
    Color::RGB(color.red, color.green, color.blue)
}

/// Zoom keeps the point under the cursor in place.
fn zoom_around(offset: f32, zoom: f32, new_zoom: f32, x: f32) -> f32 {
    x - (x - offset) * new_zoom / zoom
}

struct Ui {
    canvas: Canvas<Window>,
    fingers: SlotAllocator,
    mouse_x: f32,
}

impl Ui {
    fn draw(&mut self, paints: &[KeyPaint]) -> Result<()> {
        self.canvas.set_draw_color(Color::RGB(40, 40, 40));
        self.canvas.clear();
        for paint in paints {
            let rect = to_sdl_rect(&paint.rect);
            self.canvas.set_draw_color(to_sdl_color(paint.fill));
            self.canvas.fill_rect(rect).map_err(device_error)?;
            self.canvas.set_draw_color(to_sdl_color(paint.outline));
            self.canvas.draw_rect(rect).map_err(device_error)?;
            // no font rendering, C keys get a marker at the label anchor
            if let Some(label) = &paint.label {
                let marker = sdl2::rect::Rect::new(label.x as i32 - 2, label.y as i32 - 2, 4, 4);
                self.canvas.fill_rect(marker).map_err(device_error)?;
            }
        }
        self.canvas.present();
        Ok(())
    }

    fn handle_event(&mut self, instrument: &mut Instrument, event: Event) {
        let (width, height) = self.canvas.output_size().unwrap_or((1, 1));
        let keyboard = &mut instrument.keyboard;
        match event {
            Event::MouseButtonDown { x, y, .. } if !event.is_touch() => {
                self.mouse_x = x as f32;
                if let Some(slot) = self.fingers.down(MOUSE_ID) {
                    keyboard.touch_down(slot, x as f32, y as f32, NEUTRAL_PRESSURE);
                }
            }
            Event::MouseMotion {
                x, y, mousestate, ..
            } if !event.is_touch() => {
                self.mouse_x = x as f32;
                if let (true, Some(slot)) = (mousestate.left(), self.fingers.lookup(MOUSE_ID)) {
                    keyboard.touch_move(slot, x as f32, y as f32);
                }
            }
            Event::MouseButtonUp { .. } if !event.is_touch() => {
                if let Some(slot) = self.fingers.up(MOUSE_ID) {
                    keyboard.touch_up(slot);
                }
            }
            Event::FingerDown {
                finger_id,
                x,
                y,
                pressure,
                ..
            } => {
                if let Some(slot) = self.fingers.down(finger_id) {
                    keyboard.touch_down(slot, x * width as f32, y * height as f32, pressure);
                }
            }
            Event::FingerMotion {
                finger_id, x, y, ..
            } => {
                if let Some(slot) = self.fingers.lookup(finger_id) {
                    keyboard.touch_move(slot, x * width as f32, y * height as f32);
                }
            }
            Event::FingerUp { finger_id, .. } => {
                if let Some(slot) = self.fingers.up(finger_id) {
                    keyboard.touch_up(slot);
                }
            }
            Event::MouseWheel { y, .. } => {
                let viewport = *keyboard.geometry().viewport();
                let new_zoom = if y > 0 {
                    viewport.zoom * ZOOM_STEP
                } else {
                    (viewport.zoom / ZOOM_STEP).max(1.0)
                };
                let offset = zoom_around(viewport.offset, viewport.zoom, new_zoom, self.mouse_x);
                keyboard.set_scroll_zoom(offset, new_zoom);
            }
            Event::Window {
                win_event: WindowEvent::SizeChanged(width, height),
                ..
            } => keyboard.resize(width as f32, height as f32),
            _ => {}
        }
    }
}

/// Runs until the window is closed or escape is pressed. `after_frame` is
/// called once per frame, e.g. to exchange events with the outside world.
pub fn run<F>(instrument: &mut Instrument, mut after_frame: F) -> Result<()>
where
    F: FnMut(&mut Instrument),
{
    let sdl = sdl2::init().map_err(device_error)?;
    let video = sdl.video().map_err(device_error)?;
    let (width, height) = {
        let viewport = instrument.keyboard.geometry().viewport();
        (viewport.width as u32, viewport.height as u32)
    };
    let window = video
        .window("touch-keyboard", width, height)
        .resizable()
        .build()
        .map_err(device_error)?;
    let canvas = window.into_canvas().build().map_err(device_error)?;
    let mut event_pump = sdl.event_pump().map_err(device_error)?;
    let mut ui = Ui {
        canvas,
        fingers: SlotAllocator::new(),
        mouse_x: 0.0,
    };
    'main: loop {
        let first = event_pump.wait_event_timeout(FRAME_MILLIS);
        for event in first.into_iter().chain(event_pump.poll_iter()) {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main,
                event => ui.handle_event(instrument, event),
            }
        }
        after_frame(instrument);
        if instrument.keyboard.take_repaint() {
            ui.draw(&instrument.keyboard.render())?;
        }
    }
    instrument.keyboard.release_all();
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    mod to_sdl_rect {
        use super::*;

        #[test]
        fn rounds_to_whole_pixels() {
            assert_eq!(
                to_sdl_rect(&Rect::new(0.5, 100.4, 10.0, 99.6)),
                sdl2::rect::Rect::new(1, 100, 10, 100)
            );
        }

        #[test]
        fn keeps_tiny_keys_visible() {
            assert_eq!(to_sdl_rect(&Rect::new(0.0, 0.0, 0.2, 0.2)).width(), 1);
        }
    }

    mod mouse_id {
        use super::*;

        #[test]
        fn gets_its_own_slot_next_to_touches() {
            let mut fingers = SlotAllocator::new();
            let mouse = fingers.down(MOUSE_ID);
            let touch = fingers.down(0);
            assert_eq!(mouse, Some(0));
            assert_eq!(touch, Some(1));
            assert_eq!(fingers.up(MOUSE_ID), Some(0));
            assert_eq!(fingers.lookup(0), Some(1));
        }
    }

    mod zoom_around {
        use super::*;

        #[test]
        fn keeps_the_point_under_the_cursor() {
            let offset = zoom_around(0.0, 1.0, 2.0, 100.0);
            assert_eq!(offset, -100.0);
            // layout position under x = 100 was 100 before, and is (100 - offset) / 2 after
            assert_eq!((100.0 - offset) / 2.0, 100.0);
        }
    }
}
