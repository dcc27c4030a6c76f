//! Generic property identifiers and tagged property values
//!
//! Every notation element exposes its semantic attributes through a single
//! `Pid` → `PropertyValue` interface, so that edit commands, undo records and
//! serialization can treat all attributes uniformly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::note::{Direction, DirectionH, NoteHeadGroup, NoteHeadType, VeloType};

/// Property identifier: one enumerated key per semantic attribute.
///
/// The mapping from a `Pid` to a typed slot on the owning element is total
/// and fixed at compile time; access goes through `get_property` /
/// `set_property` on the element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pid {
    Pitch,
    Tpc1,
    Tpc2,
    Small,
    MirrorHead,
    DotPosition,
    HeadGroup,
    HeadType,
    VeloOffset,
    Tuning,
    Fret,
    String,
    Ghost,
    VeloType,
}

impl Pid {
    /// All property identifiers defined for a Note, in declaration order.
    pub const NOTE_PROPERTIES: &'static [Pid] = &[
        Pid::Pitch,
        Pid::Tpc1,
        Pid::Tpc2,
        Pid::Small,
        Pid::MirrorHead,
        Pid::DotPosition,
        Pid::HeadGroup,
        Pid::HeadType,
        Pid::VeloOffset,
        Pid::Tuning,
        Pid::Fret,
        Pid::String,
        Pid::Ghost,
        Pid::VeloType,
    ];
}

/// Tagged value carried through the generic property interface.
///
/// Enumerated properties travel either as their dedicated variant or as an
/// `Int` holding the integer code; `set_property` accepts both forms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Int(i32),
    Bool(bool),
    Float(f64),
    Direction(Direction),
    DirectionH(DirectionH),
    HeadGroup(NoteHeadGroup),
    HeadType(NoteHeadType),
    VeloType(VeloType),
}

impl PropertyValue {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            PropertyValue::Direction(v) => Some(*v as i32),
            PropertyValue::DirectionH(v) => Some(*v as i32),
            PropertyValue::HeadGroup(v) => Some(*v as i32),
            PropertyValue::HeadType(v) => Some(*v as i32),
            PropertyValue::VeloType(v) => Some(*v as i32),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

/// Errors raised by the edit layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// The property key is not defined for the element, or the supplied
    /// value has the wrong shape for it.
    #[error("property {0:?} is not applicable here")]
    InvalidPropertyKind(Pid),

    /// The value is of the right shape but outside the property's domain.
    #[error("value out of range for property {0:?}")]
    ValueOutOfRange(Pid),

    /// A structural edit was attempted outside a command bracket.
    #[error("mutation attempted outside a command bracket")]
    UncommittedMutation,

    /// An element id did not resolve to a live element.
    #[error("element not found")]
    ElementNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_conversions() {
        assert_eq!(PropertyValue::Int(7).as_int(), Some(7));
        assert_eq!(PropertyValue::DirectionH(DirectionH::Right).as_int(), Some(2));
        assert_eq!(PropertyValue::Bool(true).as_int(), None);
    }

    #[test]
    fn test_float_accepts_int() {
        assert_eq!(PropertyValue::Int(3).as_float(), Some(3.0));
        assert_eq!(PropertyValue::Float(1.3).as_float(), Some(1.3));
    }

    #[test]
    fn test_note_property_list_is_complete() {
        assert_eq!(Pid::NOTE_PROPERTIES.len(), 14);
    }
}
