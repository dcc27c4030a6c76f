//! Note: a single pitched notation event
//!
//! A Note is owned by exactly one Chord. Its attributes are reachable both
//! through typed accessors and through the generic `get_property` /
//! `set_property` interface keyed by `Pid`.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::property::{EditError, Pid, PropertyValue};
use crate::pitch::tpc::{pitch_to_tpc, Key, Prefer, TPC_INVALID, TPC_MAX, TPC_MIN};

/// Stable identity of a Note within one Score. Ties refer to notes by id,
/// never by position, so a deleted note leaves no dangling reference to
/// chase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(pub u32);

/// Vertical placement override (dot position).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum Direction {
    #[default]
    Auto = 0,
    Up = 1,
    Down = 2,
}

/// Horizontal placement override (notehead mirroring).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum DirectionH {
    #[default]
    Auto = 0,
    Left = 1,
    Right = 2,
}

/// Notehead shape family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum NoteHeadGroup {
    #[default]
    Normal = 0,
    Cross = 1,
    Diamond = 2,
    Triangle = 3,
    Slash = 4,
    XCircle = 5,
    Do = 6,
    Re = 7,
}

impl NoteHeadGroup {
    pub const COUNT: i32 = 8;

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(NoteHeadGroup::Normal),
            1 => Some(NoteHeadGroup::Cross),
            2 => Some(NoteHeadGroup::Diamond),
            3 => Some(NoteHeadGroup::Triangle),
            4 => Some(NoteHeadGroup::Slash),
            5 => Some(NoteHeadGroup::XCircle),
            6 => Some(NoteHeadGroup::Do),
            7 => Some(NoteHeadGroup::Re),
            _ => None,
        }
    }
}

/// Notehead fill/duration override, independent of the rhythmic duration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum NoteHeadType {
    #[default]
    Auto = 0,
    Whole = 1,
    Half = 2,
    Quarter = 3,
    Breve = 4,
}

impl NoteHeadType {
    pub const COUNT: i32 = 5;

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(NoteHeadType::Auto),
            1 => Some(NoteHeadType::Whole),
            2 => Some(NoteHeadType::Half),
            3 => Some(NoteHeadType::Quarter),
            4 => Some(NoteHeadType::Breve),
            _ => None,
        }
    }
}

/// How `velo_offset` is interpreted: an offset from the default dynamic,
/// or an absolute user value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum VeloType {
    #[default]
    Offset = 0,
    User = 1,
}

impl VeloType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(VeloType::Offset),
            1 => Some(VeloType::User),
            _ => None,
        }
    }
}

pub const PITCH_MIN: i32 = 0;
pub const PITCH_MAX: i32 = 127;

/// Clamp a caller-supplied chromatic pitch into the representable range.
/// Out-of-range input is normalized silently, never rejected.
pub fn clamp_pitch(pitch: i32) -> i32 {
    pitch.clamp(PITCH_MIN, PITCH_MAX)
}

/// A pitched notation event.
///
/// `tpc1` carries the concert-pitch spelling, `tpc2` the written spelling
/// under the instrument's transposition; the two are equal for
/// non-transposing instruments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub track: usize,
    pitch: i32,
    pub tpc1: i32,
    pub tpc2: i32,
    pub head_group: NoteHeadGroup,
    pub head_type: NoteHeadType,
    pub small: bool,
    pub user_mirror: DirectionH,
    pub user_dot_position: Direction,
    pub velo_type: VeloType,
    pub velo_offset: i32,
    pub tuning: f64,
    pub fret: i32,
    pub string: i32,
    pub ghost: bool,
    /// Forward tie: the note this one sustains into.
    pub tie_for: Option<NoteId>,
    /// Backward tie: the note this one is sustained from.
    pub tie_back: Option<NoteId>,
}

impl Note {
    pub fn new(id: NoteId, track: usize) -> Self {
        Self {
            id,
            track,
            pitch: 60,
            tpc1: TPC_INVALID,
            tpc2: TPC_INVALID,
            head_group: NoteHeadGroup::default(),
            head_type: NoteHeadType::default(),
            small: false,
            user_mirror: DirectionH::default(),
            user_dot_position: Direction::default(),
            velo_type: VeloType::default(),
            velo_offset: 0,
            tuning: 0.0,
            fret: -1,
            string: -1,
            ghost: false,
            tie_for: None,
            tie_back: None,
        }
    }

    pub fn pitch(&self) -> i32 {
        self.pitch
    }

    /// Set the chromatic pitch, clamping into [0, 127].
    pub fn set_pitch(&mut self, pitch: i32) {
        self.pitch = clamp_pitch(pitch);
    }

    /// Derive both spelling slots from the chromatic pitch in a key
    /// context, nearest spelling.
    pub fn set_tpc_from_pitch(&mut self, key: Key) {
        self.tpc1 = pitch_to_tpc(self.pitch, key, Prefer::Nearest);
        self.tpc2 = self.tpc1;
    }

    /// The active spelling slot: concert (`tpc1`) or written (`tpc2`).
    pub fn tpc(&self, concert_pitch: bool) -> i32 {
        if concert_pitch {
            self.tpc1
        } else {
            self.tpc2
        }
    }

    /// Generic property read. All `Pid`s in `Pid::NOTE_PROPERTIES` are
    /// defined for a Note.
    pub fn get_property(&self, pid: Pid) -> PropertyValue {
        match pid {
            Pid::Pitch => PropertyValue::Int(self.pitch),
            Pid::Tpc1 => PropertyValue::Int(self.tpc1),
            Pid::Tpc2 => PropertyValue::Int(self.tpc2),
            Pid::Small => PropertyValue::Bool(self.small),
            Pid::MirrorHead => PropertyValue::DirectionH(self.user_mirror),
            Pid::DotPosition => PropertyValue::Direction(self.user_dot_position),
            Pid::HeadGroup => PropertyValue::HeadGroup(self.head_group),
            Pid::HeadType => PropertyValue::HeadType(self.head_type),
            Pid::VeloOffset => PropertyValue::Int(self.velo_offset),
            Pid::Tuning => PropertyValue::Float(self.tuning),
            Pid::Fret => PropertyValue::Int(self.fret),
            Pid::String => PropertyValue::Int(self.string),
            Pid::Ghost => PropertyValue::Bool(self.ghost),
            Pid::VeloType => PropertyValue::VeloType(self.velo_type),
        }
    }

    /// Generic property write; returns the previous value.
    ///
    /// Pitch is clamped silently. Fret and string clamp negative input to
    /// the unset sentinel rather than rejecting it. Enumerated codes
    /// outside their defined range are `ValueOutOfRange`; a value of the
    /// wrong shape for the pid is `InvalidPropertyKind`.
    pub fn set_property(&mut self, pid: Pid, value: PropertyValue) -> Result<PropertyValue, EditError> {
        let previous = self.get_property(pid);
        match pid {
            Pid::Pitch => {
                let v = value.as_int().ok_or(EditError::InvalidPropertyKind(pid))?;
                self.set_pitch(v);
            }
            Pid::Tpc1 => {
                let v = value.as_int().ok_or(EditError::InvalidPropertyKind(pid))?;
                if !(TPC_MIN..=TPC_MAX).contains(&v) {
                    return Err(EditError::ValueOutOfRange(pid));
                }
                self.tpc1 = v;
            }
            Pid::Tpc2 => {
                let v = value.as_int().ok_or(EditError::InvalidPropertyKind(pid))?;
                if !(TPC_MIN..=TPC_MAX).contains(&v) {
                    return Err(EditError::ValueOutOfRange(pid));
                }
                self.tpc2 = v;
            }
            Pid::Small => {
                self.small = value.as_bool().ok_or(EditError::InvalidPropertyKind(pid))?;
            }
            Pid::MirrorHead => {
                let code = value.as_int().ok_or(EditError::InvalidPropertyKind(pid))?;
                self.user_mirror = match code {
                    0 => DirectionH::Auto,
                    1 => DirectionH::Left,
                    2 => DirectionH::Right,
                    _ => return Err(EditError::ValueOutOfRange(pid)),
                };
            }
            Pid::DotPosition => {
                let code = value.as_int().ok_or(EditError::InvalidPropertyKind(pid))?;
                self.user_dot_position = match code {
                    0 => Direction::Auto,
                    1 => Direction::Up,
                    2 => Direction::Down,
                    _ => return Err(EditError::ValueOutOfRange(pid)),
                };
            }
            Pid::HeadGroup => {
                let code = value.as_int().ok_or(EditError::InvalidPropertyKind(pid))?;
                self.head_group =
                    NoteHeadGroup::from_code(code).ok_or(EditError::ValueOutOfRange(pid))?;
            }
            Pid::HeadType => {
                let code = value.as_int().ok_or(EditError::InvalidPropertyKind(pid))?;
                self.head_type =
                    NoteHeadType::from_code(code).ok_or(EditError::ValueOutOfRange(pid))?;
            }
            Pid::VeloOffset => {
                self.velo_offset = value.as_int().ok_or(EditError::InvalidPropertyKind(pid))?;
            }
            Pid::Tuning => {
                self.tuning = value.as_float().ok_or(EditError::InvalidPropertyKind(pid))?;
            }
            Pid::Fret => {
                let v = value.as_int().ok_or(EditError::InvalidPropertyKind(pid))?;
                self.fret = v.max(-1);
            }
            Pid::String => {
                let v = value.as_int().ok_or(EditError::InvalidPropertyKind(pid))?;
                self.string = v.max(-1);
            }
            Pid::Ghost => {
                self.ghost = value.as_bool().ok_or(EditError::InvalidPropertyKind(pid))?;
            }
            Pid::VeloType => {
                let code = value.as_int().ok_or(EditError::InvalidPropertyKind(pid))?;
                self.velo_type = VeloType::from_code(code).ok_or(EditError::ValueOutOfRange(pid))?;
            }
        }
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_note() -> Note {
        Note::new(NoteId(1), 0)
    }

    #[test]
    fn test_pitch_clamps_silently() {
        let mut note = make_note();
        note.set_pitch(140);
        assert_eq!(note.pitch(), 127);
        note.set_pitch(-40);
        assert_eq!(note.pitch(), 0);
        note.set_property(Pid::Pitch, PropertyValue::Int(300)).unwrap();
        assert_eq!(note.pitch(), 127);
    }

    #[test]
    fn test_set_property_returns_previous() {
        let mut note = make_note();
        note.set_property(Pid::VeloOffset, PropertyValue::Int(71)).unwrap();
        let prev = note.set_property(Pid::VeloOffset, PropertyValue::Int(38)).unwrap();
        assert_eq!(prev, PropertyValue::Int(71));
        assert_eq!(note.velo_offset, 38);
    }

    #[test]
    fn test_enum_codes_accepted_as_int() {
        let mut note = make_note();
        note.set_property(Pid::MirrorHead, PropertyValue::Int(1)).unwrap();
        assert_eq!(note.user_mirror, DirectionH::Left);
        note.set_property(Pid::MirrorHead, PropertyValue::DirectionH(DirectionH::Right)).unwrap();
        assert_eq!(note.user_mirror, DirectionH::Right);
    }

    #[test]
    fn test_enum_code_out_of_range_rejected() {
        let mut note = make_note();
        assert_eq!(
            note.set_property(Pid::HeadGroup, PropertyValue::Int(99)),
            Err(EditError::ValueOutOfRange(Pid::HeadGroup))
        );
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let mut note = make_note();
        assert_eq!(
            note.set_property(Pid::Small, PropertyValue::Int(1)),
            Err(EditError::InvalidPropertyKind(Pid::Small))
        );
    }

    #[test]
    fn test_tpc_from_pitch() {
        use crate::pitch::tpc::{Key, TPC_C, TPC_F_S};
        let mut note = make_note();
        note.set_pitch(60);
        note.set_tpc_from_pitch(Key::C);
        assert_eq!(note.tpc1, TPC_C);
        note.set_pitch(66);
        note.set_tpc_from_pitch(Key::C);
        assert_eq!(note.tpc1, TPC_F_S);
    }
}
