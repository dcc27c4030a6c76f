//! Segments: time-ordered event slots inside a measure

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::chord::ChordRest;
use super::duration::Fraction;

/// Category of events a segment holds at its tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentType {
    ChordRest,
    Clef,
    KeySig,
    TimeSig,
}

/// One tick offset within a measure, holding at most one event per track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Absolute tick of this segment.
    pub tick: Fraction,
    pub segment_type: SegmentType,
    /// Track index to the event occupying it. BTreeMap keeps the saved
    /// form deterministic.
    pub elements: BTreeMap<usize, ChordRest>,
}

impl Segment {
    pub fn new(tick: Fraction, segment_type: SegmentType) -> Self {
        Self {
            tick,
            segment_type,
            elements: BTreeMap::new(),
        }
    }

    pub fn element(&self, track: usize) -> Option<&ChordRest> {
        self.elements.get(&track)
    }

    pub fn element_mut(&mut self, track: usize) -> Option<&mut ChordRest> {
        self.elements.get_mut(&track)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
