//! Measures: fixed-capacity containers on the score timeline

use serde::{Deserialize, Serialize};

use super::chord::{Chord, ChordRest};
use super::duration::Fraction;
use super::segment::{Segment, SegmentType};

/// A fixed-capacity span of the timeline. Capacity comes from the time
/// signature active at the measure's start; segments are kept ordered by
/// tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Absolute start tick.
    pub tick: Fraction,
    /// Nominal length in whole notes (numerator/denominator of the
    /// active time signature).
    pub len: Fraction,
    pub segments: Vec<Segment>,
}

impl Measure {
    pub fn new(tick: Fraction, len: Fraction) -> Self {
        Self {
            tick,
            len,
            segments: Vec::new(),
        }
    }

    pub fn end_tick(&self) -> Fraction {
        self.tick + self.len
    }

    pub fn contains(&self, tick: Fraction) -> bool {
        tick >= self.tick && tick < self.end_tick()
    }

    /// Chord-rest segment at an absolute tick, if present.
    pub fn segment_at(&self, tick: Fraction) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| s.tick == tick && s.segment_type == SegmentType::ChordRest)
    }

    pub fn segment_at_mut(&mut self, tick: Fraction) -> Option<&mut Segment> {
        self.segments
            .iter_mut()
            .find(|s| s.tick == tick && s.segment_type == SegmentType::ChordRest)
    }

    /// Chord-rest segment at an absolute tick, created in tick order if
    /// missing.
    pub fn get_or_create_segment(&mut self, tick: Fraction) -> &mut Segment {
        debug_assert!(self.contains(tick));
        if let Some(pos) = self
            .segments
            .iter()
            .position(|s| s.tick == tick && s.segment_type == SegmentType::ChordRest)
        {
            return &mut self.segments[pos];
        }
        let insert_at = self
            .segments
            .iter()
            .position(|s| s.tick > tick)
            .unwrap_or(self.segments.len());
        self.segments
            .insert(insert_at, Segment::new(tick, SegmentType::ChordRest));
        &mut self.segments[insert_at]
    }

    /// Drop a segment again if the last event in it was removed.
    pub fn prune_segment(&mut self, tick: Fraction) {
        self.segments
            .retain(|s| !(s.tick == tick && s.segment_type == SegmentType::ChordRest && s.is_empty()));
    }

    /// First chord at the given tick and track, main chords only.
    pub fn find_chord(&self, tick: Fraction, track: usize) -> Option<&Chord> {
        self.segment_at(tick)
            .and_then(|s| s.element(track))
            .and_then(ChordRest::as_chord)
    }
}
