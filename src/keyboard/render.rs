use super::geometry::Geometry;
use super::layout::{black, rgb, white, Rect};
use super::tracker::NoteState;
use crate::midi::note_name;
use palette::Srgb;

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Everything needed to draw one key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPaint {
    pub note: u8,
    pub rect: Rect,
    pub fill: Srgb<u8>,
    pub outline: Srgb<u8>,
    pub label: Option<Label>,
}

/// Green for soft notes, through yellow at 64, to red for hard notes.
pub fn velocity_color(velocity: u8) -> Srgb<u8> {
    let velocity = velocity.min(127) as u32;
    if velocity < 64 {
        rgb((velocity * 4) as u8, 255, 0)
    } else {
        rgb(255, (255 - (velocity - 64) * 4) as u8, 0)
    }
}

fn outline_color(base: Srgb<u8>) -> Srgb<u8> {
    if base == black() {
        white()
    } else {
        black()
    }
}

fn label(note: u8, rect: &Rect) -> Option<Label> {
    if note % 12 != 0 {
        return None;
    }
    let (x, y) = rect.center();
    Some(Label {
        text: note_name(note),
        x,
        y,
    })
}

/// Projects every rendered key to screen space. Pure with respect to its
/// inputs, so it can be called as often as the platform wants to repaint.
pub fn render(geometry: &Geometry, notes: &NoteState) -> Vec<KeyPaint> {
    (0..geometry.n_keys())
        .map(|index| {
            let note = geometry.note_for_index(index);
            let base = geometry.layout().key(index).color;
            let rect = geometry.project(index);
            let fill = match notes.velocity(note) {
                0 => base,
                velocity => velocity_color(velocity),
            };
            KeyPaint {
                note,
                label: label(note, &rect),
                rect,
                fill,
                outline: outline_color(base),
            }
        })
        .collect()
}
