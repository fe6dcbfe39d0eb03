//! Pointer samples and the decoding of multitouch report streams into them.
//!
//! Touchscreens report per-slot state changes grouped by `SynReport`. The
//! decoder keeps the state of every slot and turns each report into
//! down/move/up samples in screen coordinates.

use crate::keyboard::tracker::{Slots, FINGERS};
use crate::keyboard::velocity::NEUTRAL_PRESSURE;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub finger: usize,
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
    pub time: Duration,
}

/// The parts of a kernel multitouch (protocol B) stream the decoder cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTouchEvent {
    Slot(i32),
    TrackingId(i32),
    PositionX(i32),
    PositionY(i32),
    Pressure(i32),
    SynReport(Duration),
    SynDropped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynChunk {
    pub events: Vec<RawTouchEvent>,
    pub time: Duration,
}

/// Groups raw events into the chunks terminated by `SynReport`.
pub struct SynChunks<I> {
    events: I,
    last_time: Duration,
}

impl<I: Iterator<Item = RawTouchEvent>> SynChunks<I> {
    pub fn new(events: I) -> SynChunks<I> {
        SynChunks {
            events,
            last_time: Duration::default(),
        }
    }
}

impl<I: Iterator<Item = RawTouchEvent>> Iterator for SynChunks<I> {
    type Item = SynChunk;

    fn next(&mut self) -> Option<SynChunk> {
        let mut events = vec![];
        loop {
            match self.events.next() {
                None => {
                    if events.is_empty() {
                        return None;
                    } else {
                        break;
                    }
                }
                Some(RawTouchEvent::SynDropped) => {
                    log::warn!("touch device dropped events");
                }
                Some(RawTouchEvent::SynReport(time)) => {
                    self.last_time = time;
                    break;
                }
                Some(event) => events.push(event),
            }
        }
        Some(SynChunk {
            events,
            time: self.last_time,
        })
    }
}

/// Maps raw device ranges onto the drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub x_range: (i32, i32),
    pub y_range: (i32, i32),
    pub pressure_max: Option<i32>,
    pub width: f32,
    pub height: f32,
}

impl Calibration {
    /// Raw values already are screen pixels and there's no pressure axis.
    pub fn identity() -> Calibration {
        Calibration {
            x_range: (0, 1),
            y_range: (0, 1),
            pressure_max: None,
            width: 1.0,
            height: 1.0,
        }
    }

    fn scale(value: i32, (min, max): (i32, i32), size: f32) -> f32 {
        if max == min {
            return value as f32;
        }
        (value - min) as f32 / (max - min) as f32 * size
    }

    pub fn x(&self, raw: i32) -> f32 {
        Calibration::scale(raw, self.x_range, self.width)
    }

    pub fn y(&self, raw: i32) -> f32 {
        Calibration::scale(raw, self.y_range, self.height)
    }

    pub fn pressure(&self, raw: Option<i32>) -> f32 {
        match (raw, self.pressure_max) {
            (Some(raw), Some(max)) if max > 0 => (raw as f32 / max as f32).clamp(0.0, 1.0),
            _ => NEUTRAL_PRESSURE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SlotState {
    tracking_id: i32,
    x: i32,
    y: i32,
    pressure: Option<i32>,
    touching: bool,
}

const EMPTY_SLOT: SlotState = SlotState {
    tracking_id: -1,
    x: 0,
    y: 0,
    pressure: None,
    touching: false,
};

#[derive(Debug, Clone, Copy)]
struct SlotChange {
    was_touching: bool,
    restarted: bool,
}

pub struct MultitouchDecoder {
    calibration: Calibration,
    slots: Slots<SlotState>,
    active_slot: Option<usize>,
}

impl MultitouchDecoder {
    pub fn new(calibration: Calibration) -> MultitouchDecoder {
        MultitouchDecoder {
            calibration,
            slots: [EMPTY_SLOT; FINGERS],
            active_slot: None,
        }
    }

    pub fn process_chunk(&mut self, chunk: SynChunk) -> Vec<PointerSample> {
        let mut changes: Slots<Option<SlotChange>> = [None; FINGERS];
        for event in chunk.events {
            if let RawTouchEvent::Slot(slot) = event {
                self.active_slot = if slot >= 0 && (slot as usize) < FINGERS {
                    Some(slot as usize)
                } else {
                    log::trace!("ignoring touch slot {}", slot);
                    None
                };
                continue;
            }
            let active_slot = match self.active_slot {
                Some(active_slot) => active_slot,
                None => continue,
            };
            let state = &mut self.slots[active_slot];
            let change = changes[active_slot].get_or_insert(SlotChange {
                was_touching: state.touching,
                restarted: false,
            });
            match event {
                RawTouchEvent::TrackingId(-1) => state.touching = false,
                RawTouchEvent::TrackingId(tracking_id) => {
                    // a new contact in the same report as the release of the old one
                    if change.was_touching && tracking_id != state.tracking_id {
                        change.restarted = true;
                    }
                    state.tracking_id = tracking_id;
                    state.touching = true;
                }
                RawTouchEvent::PositionX(x) => state.x = x,
                RawTouchEvent::PositionY(y) => state.y = y,
                RawTouchEvent::Pressure(pressure) => state.pressure = Some(pressure),
                RawTouchEvent::Slot(_)
                | RawTouchEvent::SynReport(_)
                | RawTouchEvent::SynDropped => {}
            }
        }
        let mut result = vec![];
        for (slot, change) in changes.iter().enumerate() {
            if let Some(change) = change {
                self.push_samples(&mut result, slot, *change, chunk.time);
            }
        }
        result
    }

    fn push_samples(
        &self,
        result: &mut Vec<PointerSample>,
        slot: usize,
        change: SlotChange,
        time: Duration,
    ) {
        let state = self.slots[slot];
        let sample = |phase| PointerSample {
            finger: slot,
            phase,
            x: self.calibration.x(state.x),
            y: self.calibration.y(state.y),
            pressure: self.calibration.pressure(state.pressure),
            time,
        };
        match (change.was_touching, state.touching, change.restarted) {
            (true, true, true) => {
                result.push(sample(PointerPhase::Up));
                result.push(sample(PointerPhase::Down));
            }
            (true, true, false) => result.push(sample(PointerPhase::Move)),
            (false, true, _) => result.push(sample(PointerPhase::Down)),
            (true, false, _) => result.push(sample(PointerPhase::Up)),
            (false, false, _) => {}
        }
    }

    /// Decodes a whole event stream lazily.
    pub fn decode<I>(mut self, events: I) -> impl Iterator<Item = PointerSample>
    where
        I: Iterator<Item = RawTouchEvent>,
    {
        SynChunks::new(events).flat_map(move |chunk| self.process_chunk(chunk))
    }
}

/// Assigns platform finger ids, which can be arbitrary numbers, to the lowest
/// free tracker slot. Fingers beyond the slot count are ignored.
#[derive(Debug, Clone, Default)]
pub struct SlotAllocator {
    slots: Slots<Option<i64>>,
}

impl SlotAllocator {
    pub fn new() -> SlotAllocator {
        SlotAllocator::default()
    }

    pub fn down(&mut self, id: i64) -> Option<usize> {
        if let Some(slot) = self.lookup(id) {
            return Some(slot);
        }
        let slot = self.slots.iter().position(|slot| slot.is_none());
        match slot {
            Some(slot) => self.slots[slot] = Some(id),
            None => log::debug!("no free slot for finger {}", id),
        }
        slot
    }

    pub fn lookup(&self, id: i64) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(id))
    }

    pub fn up(&mut self, id: i64) -> Option<usize> {
        let slot = self.lookup(id)?;
        self.slots[slot] = None;
        Some(slot)
    }
}

#[cfg(test)]
mod test {
    use super::RawTouchEvent::*;
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn samples(events: Vec<RawTouchEvent>) -> Vec<PointerSample> {
        MultitouchDecoder::new(Calibration::identity())
            .decode(events.into_iter())
            .collect()
    }

    fn sample(finger: usize, phase: PointerPhase, x: f32, y: f32, time: Duration) -> PointerSample {
        PointerSample {
            finger,
            phase,
            x,
            y,
            pressure: NEUTRAL_PRESSURE,
            time,
        }
    }

    mod syn_chunks {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn groups_events_until_syn_report() {
            let events = vec![Slot(1), Slot(2), SynReport(ms(3))];
            assert_eq!(
                SynChunks::new(events.into_iter()).next(),
                Some(SynChunk {
                    events: vec![Slot(1), Slot(2)],
                    time: ms(3)
                })
            );
        }

        #[test]
        fn bundles_subsequent_chunks_correctly() {
            let events = vec![Slot(1), SynReport(ms(1)), Slot(2), SynReport(ms(2))];
            let mut chunks = SynChunks::new(events.into_iter());
            chunks.next();
            assert_eq!(
                chunks.next(),
                Some(SynChunk {
                    events: vec![Slot(2)],
                    time: ms(2)
                })
            );
        }

        #[test]
        fn skips_dropped_markers() {
            let events = vec![Slot(1), SynDropped, PositionX(3), SynReport(ms(1))];
            assert_eq!(
                SynChunks::new(events.into_iter()).next().map(|chunk| chunk.events),
                Some(vec![Slot(1), PositionX(3)])
            );
        }

        #[test]
        fn handles_terminating_streams_gracefully() {
            let mut chunks = SynChunks::new(vec![Slot(1)].into_iter());
            assert_eq!(chunks.next().map(|chunk| chunk.events), Some(vec![Slot(1)]));
            assert_eq!(chunks.next(), None);
            assert_eq!(chunks.next(), None);
        }
    }

    mod decoder {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn reports_a_new_contact_as_down() {
            let samples = samples(vec![
                Slot(0),
                TrackingId(0),
                PositionX(23),
                PositionY(42),
                SynReport(ms(5)),
            ]);
            assert_eq!(samples, vec![sample(0, PointerPhase::Down, 23.0, 42.0, ms(5))]);
        }

        #[test]
        fn reports_following_positions_as_moves() {
            let samples = samples(vec![
                Slot(0),
                TrackingId(0),
                PositionX(23),
                PositionY(42),
                SynReport(ms(1)),
                PositionX(51),
                SynReport(ms(2)),
            ]);
            assert_eq!(
                samples,
                vec![
                    sample(0, PointerPhase::Down, 23.0, 42.0, ms(1)),
                    sample(0, PointerPhase::Move, 51.0, 42.0, ms(2)),
                ]
            );
        }

        #[test]
        fn reports_releases_as_up() {
            let samples = samples(vec![
                Slot(0),
                TrackingId(0),
                PositionX(23),
                PositionY(42),
                SynReport(ms(1)),
                TrackingId(-1),
                SynReport(ms(2)),
            ]);
            assert_eq!(
                samples,
                vec![
                    sample(0, PointerPhase::Down, 23.0, 42.0, ms(1)),
                    sample(0, PointerPhase::Up, 23.0, 42.0, ms(2)),
                ]
            );
        }

        #[test]
        fn keeps_slots_apart() {
            let samples = samples(vec![
                Slot(0),
                TrackingId(0),
                PositionX(23),
                PositionY(42),
                SynReport(ms(1)),
                Slot(1),
                TrackingId(1),
                PositionX(1000),
                PositionY(1000),
                SynReport(ms(2)),
                TrackingId(-1),
                SynReport(ms(3)),
                Slot(0),
                PositionX(51),
                PositionY(84),
                SynReport(ms(4)),
            ]);
            assert_eq!(
                samples,
                vec![
                    sample(0, PointerPhase::Down, 23.0, 42.0, ms(1)),
                    sample(1, PointerPhase::Down, 1000.0, 1000.0, ms(2)),
                    sample(1, PointerPhase::Up, 1000.0, 1000.0, ms(3)),
                    sample(0, PointerPhase::Move, 51.0, 84.0, ms(4)),
                ]
            );
        }

        #[test]
        fn handles_slot_changes_and_releases_in_the_same_report() {
            let samples = samples(vec![
                Slot(0),
                TrackingId(0),
                PositionX(23),
                PositionY(42),
                SynReport(ms(1)),
                TrackingId(-1),
                Slot(1),
                TrackingId(1),
                PositionX(1000),
                PositionY(1000),
                SynReport(ms(2)),
            ]);
            assert_eq!(
                samples,
                vec![
                    sample(0, PointerPhase::Down, 23.0, 42.0, ms(1)),
                    sample(0, PointerPhase::Up, 23.0, 42.0, ms(2)),
                    sample(1, PointerPhase::Down, 1000.0, 1000.0, ms(2)),
                ]
            );
        }

        #[test]
        fn splits_a_replaced_contact_into_up_and_down() {
            let samples = samples(vec![
                Slot(0),
                TrackingId(0),
                PositionX(10),
                PositionY(10),
                SynReport(ms(1)),
                TrackingId(7),
                PositionX(90),
                SynReport(ms(2)),
            ]);
            assert_eq!(
                samples,
                vec![
                    sample(0, PointerPhase::Down, 10.0, 10.0, ms(1)),
                    sample(0, PointerPhase::Up, 90.0, 10.0, ms(2)),
                    sample(0, PointerPhase::Down, 90.0, 10.0, ms(2)),
                ]
            );
        }

        #[test]
        fn assumes_no_active_slot_at_startup() {
            let samples = samples(vec![TrackingId(0), PositionX(23), SynReport(ms(1))]);
            assert_eq!(samples, vec![]);
        }

        #[test]
        fn ignores_out_of_bound_slots() {
            let too_high = samples(vec![Slot(1000), TrackingId(0), SynReport(ms(1))]);
            let negative = samples(vec![Slot(-1), TrackingId(0), SynReport(ms(1))]);
            assert_eq!(too_high, vec![]);
            assert_eq!(negative, vec![]);
        }

        #[test]
        fn calibrates_positions_and_pressure() {
            let calibration = Calibration {
                x_range: (0, 4000),
                y_range: (100, 1100),
                pressure_max: Some(255),
                width: 800.0,
                height: 200.0,
            };
            let samples: Vec<PointerSample> = MultitouchDecoder::new(calibration)
                .decode(
                    vec![
                        Slot(2),
                        TrackingId(5),
                        PositionX(2000),
                        PositionY(600),
                        Pressure(255),
                        SynReport(ms(1)),
                    ]
                    .into_iter(),
                )
                .collect();
            assert_eq!(
                samples,
                vec![PointerSample {
                    finger: 2,
                    phase: PointerPhase::Down,
                    x: 400.0,
                    y: 100.0,
                    pressure: 1.0,
                    time: ms(1),
                }]
            );
        }
    }

    mod slot_allocator {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn hands_out_the_lowest_free_slot() {
            let mut allocator = SlotAllocator::new();
            assert_eq!(allocator.down(1234), Some(0));
            assert_eq!(allocator.down(99), Some(1));
            assert_eq!(allocator.up(1234), Some(0));
            assert_eq!(allocator.down(7), Some(0));
            assert_eq!(allocator.lookup(99), Some(1));
        }

        #[test]
        fn reuses_the_slot_of_a_known_finger() {
            let mut allocator = SlotAllocator::new();
            allocator.down(5);
            assert_eq!(allocator.down(5), Some(0));
            assert_eq!(allocator.down(6), Some(1));
        }

        #[test]
        fn ignores_extra_fingers() {
            let mut allocator = SlotAllocator::new();
            for id in 0..FINGERS as i64 {
                allocator.down(id);
            }
            assert_eq!(allocator.down(100), None);
            assert_eq!(allocator.up(100), None);
        }
    }
}
