//! Data models for the notation document core
//!
//! Ownership runs Score → Measure → Segment → ChordRest → Note; ties and
//! selection refer to notes by id rather than by position.

pub mod chord;
pub mod duration;
pub mod measure;
pub mod note;
pub mod property;
pub mod score;
pub mod segment;

pub use chord::{Articulation, ArticulationKind, Chord, ChordRest, ElemId, NoteType, Rest, Tremolo, TremoloType};
pub use duration::{DurationType, Fraction, TDuration};
pub use measure::Measure;
pub use note::{Direction, DirectionH, Note, NoteHeadGroup, NoteHeadType, NoteId, VeloType};
pub use property::{EditError, Pid, PropertyValue};
pub use score::{InputState, Score};
pub use segment::{Segment, SegmentType};
