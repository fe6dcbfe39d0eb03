//! Per-finger note ownership.
//!
//! Every finger slot owns at most one note and every sounding note has at
//! most one owner: either a finger or the remote path. Methods return `true`
//! when the visible state changed and the keyboard has to be repainted.

use super::geometry::Geometry;
use super::velocity::{VelocityCurve, DEFAULT_VELOCITY};
use crate::config::DragMode;
use crate::midi::NOTES;
use crate::sink::EventSink;

pub const FINGERS: usize = 10;

pub type Slots<T> = [T; FINGERS];

/// Velocity per note number, 0 meaning silent.
#[derive(Clone, PartialEq, Eq)]
pub struct NoteState {
    velocities: [u8; NOTES],
}

impl NoteState {
    pub fn new() -> NoteState {
        NoteState {
            velocities: [0; NOTES],
        }
    }

    pub fn velocity(&self, note: u8) -> u8 {
        self.velocities.get(note as usize).copied().unwrap_or(0)
    }

    pub fn is_sounding(&self, note: u8) -> bool {
        self.velocity(note) > 0
    }

    fn set(&mut self, note: u8, velocity: u8) {
        if let Some(slot) = self.velocities.get_mut(note as usize) {
            *slot = velocity;
        }
    }

    pub fn sounding(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.velocities
            .iter()
            .enumerate()
            .filter(|(_, velocity)| **velocity > 0)
            .map(|(note, velocity)| (note as u8, *velocity))
    }
}

impl Default for NoteState {
    fn default() -> Self {
        NoteState::new()
    }
}

impl std::fmt::Debug for NoteState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_map().entries(self.sounding()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FingerSlot {
    note: Option<u8>,
    last_x: f32,
}

const IDLE_FINGER: FingerSlot = FingerSlot {
    note: None,
    last_x: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerPhase {
    Idle,
    HoldingNote(u8),
    Scrolling(u8),
}

#[derive(Debug, Clone)]
pub struct TouchTracker {
    notes: NoteState,
    fingers: Slots<FingerSlot>,
    scroll_tracking_offset: f64,
    drag_mode: DragMode,
    velocity_curve: VelocityCurve,
    channel: u8,
}

impl TouchTracker {
    pub fn new(drag_mode: DragMode, velocity_curve: VelocityCurve, channel: u8) -> TouchTracker {
        TouchTracker {
            notes: NoteState::new(),
            fingers: [IDLE_FINGER; FINGERS],
            scroll_tracking_offset: 0.0,
            drag_mode,
            velocity_curve,
            channel,
        }
    }

    pub fn notes(&self) -> &NoteState {
        &self.notes
    }

    pub fn drag_mode(&self) -> DragMode {
        self.drag_mode
    }

    pub fn velocity_curve(&self) -> VelocityCurve {
        self.velocity_curve
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn scroll_tracking_offset(&self) -> f64 {
        self.scroll_tracking_offset
    }

    /// Held notes keep their owners; only the meaning of future motion changes.
    pub fn set_drag_mode(&mut self, drag_mode: DragMode, current_offset: f32) {
        if drag_mode != self.drag_mode {
            self.drag_mode = drag_mode;
            self.scroll_tracking_offset = current_offset as f64;
        }
    }

    pub fn set_velocity_curve(&mut self, velocity_curve: VelocityCurve) {
        self.velocity_curve = velocity_curve;
    }

    /// Note offs go out on the current channel, so release held notes first.
    pub fn set_channel(&mut self, channel: u8) {
        self.channel = channel;
    }

    /// Realigns the scroll accumulator after the offset was set from outside.
    pub fn sync_scroll(&mut self, offset: f32) {
        self.scroll_tracking_offset = offset as f64;
    }

    pub fn finger_note(&self, finger: usize) -> Option<u8> {
        self.fingers.get(finger).and_then(|slot| slot.note)
    }

    pub fn finger_phase(&self, finger: usize) -> FingerPhase {
        match (self.finger_note(finger), self.drag_mode) {
            (None, _) => FingerPhase::Idle,
            (Some(note), DragMode::PlayNotes) => FingerPhase::HoldingNote(note),
            (Some(note), DragMode::ScrollKeyboard) => FingerPhase::Scrolling(note),
        }
    }

    pub fn owner(&self, note: u8) -> Option<usize> {
        self.fingers.iter().position(|slot| slot.note == Some(note))
    }

    pub fn active_fingers(&self) -> usize {
        self.fingers.iter().filter(|slot| slot.note.is_some()).count()
    }

    fn is_free(&self, note: u8) -> bool {
        !self.notes.is_sounding(note) && self.owner(note).is_none()
    }

    pub fn touch_down(
        &mut self,
        geometry: &Geometry,
        sink: &mut dyn EventSink,
        finger: usize,
        x: f32,
        y: f32,
        pressure: f32,
    ) -> bool {
        if finger >= FINGERS {
            log::trace!("ignoring down for finger {}", finger);
            return false;
        }
        // a down without a preceding up means the platform lost the release
        let mut changed = self.release(sink, finger);
        self.fingers[finger].last_x = x;
        match geometry.hit_test(x, y) {
            Some(note) if self.is_free(note) => {
                let velocity = self.velocity_curve.velocity(pressure);
                log::debug!(
                    "finger {} down on note {} (velocity {})",
                    finger,
                    note,
                    velocity
                );
                self.fingers[finger].note = Some(note);
                self.notes.set(note, velocity);
                sink.note_on(self.channel, note, velocity);
                if self.drag_mode == DragMode::ScrollKeyboard && self.active_fingers() == 1 {
                    self.scroll_tracking_offset = geometry.viewport().offset as f64;
                }
                changed = true;
            }
            Some(note) => {
                log::trace!("finger {} down on busy note {}", finger, note);
            }
            None => {}
        }
        changed
    }

    pub fn touch_move(
        &mut self,
        geometry: &mut Geometry,
        sink: &mut dyn EventSink,
        finger: usize,
        x: f32,
        y: f32,
    ) -> bool {
        if finger >= FINGERS {
            return false;
        }
        let changed = match (self.drag_mode, self.fingers[finger].note) {
            (DragMode::ScrollKeyboard, Some(_)) => self.scroll(geometry, finger, x),
            (_, old_note) => self.retarget(geometry, sink, finger, old_note, x, y),
        };
        self.fingers[finger].last_x = x;
        changed
    }

    pub fn touch_up(&mut self, sink: &mut dyn EventSink, finger: usize) -> bool {
        if finger >= FINGERS {
            return false;
        }
        self.release(sink, finger)
    }

    /// Force-releases every finger, e.g. before the layout is swapped.
    pub fn release_all(&mut self, sink: &mut dyn EventSink) -> bool {
        let mut changed = false;
        for finger in 0..FINGERS {
            changed |= self.release(sink, finger);
        }
        changed
    }

    /// Externally driven note state. Notes held by a finger stay under the
    /// finger's control.
    pub fn set_remote_note(&mut self, note: u8, velocity: u8) -> bool {
        if note as usize >= NOTES {
            return false;
        }
        if let Some(finger) = self.owner(note) {
            log::debug!(
                "ignoring remote update of note {}, held by finger {}",
                note,
                finger
            );
            return false;
        }
        let velocity = velocity.min(127);
        if self.notes.velocity(note) == velocity {
            return false;
        }
        self.notes.set(note, velocity);
        true
    }

    fn release(&mut self, sink: &mut dyn EventSink, finger: usize) -> bool {
        match self.fingers[finger].note.take() {
            None => false,
            Some(note) => {
                let velocity = self.notes.velocity(note);
                log::debug!("finger {} releases note {}", finger, note);
                sink.note_off(self.channel, note, velocity);
                self.notes.set(note, 0);
                true
            }
        }
    }

    fn retarget(
        &mut self,
        geometry: &Geometry,
        sink: &mut dyn EventSink,
        finger: usize,
        old_note: Option<u8>,
        x: f32,
        y: f32,
    ) -> bool {
        let new_note = match geometry.hit_test(x, y) {
            Some(note) if Some(note) != old_note && self.is_free(note) => note,
            _ => return false,
        };
        // the old velocity carries over, re-sensed pressure tends to be too high
        let velocity = match old_note {
            Some(old_note) => {
                let velocity = self.notes.velocity(old_note);
                sink.note_off(self.channel, old_note, velocity);
                self.notes.set(old_note, 0);
                velocity
            }
            None => DEFAULT_VELOCITY,
        };
        log::debug!(
            "finger {} slides from {:?} to note {}",
            finger,
            old_note,
            new_note
        );
        sink.note_on(self.channel, new_note, velocity);
        self.notes.set(new_note, velocity);
        self.fingers[finger].note = Some(new_note);
        true
    }

    /// Spreads the motion over all fingers holding notes, so one finger
    /// scrolls 1:1 and several fingers scroll by their average motion.
    fn scroll(&mut self, geometry: &mut Geometry, finger: usize, x: f32) -> bool {
        let active = self.active_fingers().max(1) as f64;
        let delta = (x - self.fingers[finger].last_x) as f64;
        self.scroll_tracking_offset += delta / active;
        let applied = geometry.viewport().offset as f64;
        if (self.scroll_tracking_offset - applied).abs() >= 1.0 {
            geometry.set_offset(self.scroll_tracking_offset as f32);
            true
        } else {
            false
        }
    }
}
