// Read/write round trips for every note property, through the typed
// accessors and through the generic property interface.

use notation_core::models::{
    Direction, DirectionH, Note, NoteHeadGroup, NoteHeadType, NoteId, Pid, PropertyValue, VeloType,
};
use notation_core::rw::write_read_element;
use pretty_assertions::assert_eq;

fn make_note() -> Note {
    Note::new(NoteId(1), 0)
}

fn round_trip(note: &Note) -> Note {
    write_read_element(note).expect("note round trip")
}

#[test]
fn test_pitch_round_trip() {
    let mut note = make_note();
    note.set_pitch(33);
    note.set_tpc_from_pitch(notation_core::Key::C);
    let n = round_trip(&note);
    assert_eq!(n.pitch(), 33);
}

#[test]
fn test_tpc_round_trip() {
    let mut note = make_note();
    note.tpc1 = 22;
    let n = round_trip(&note);
    assert_eq!(n.tpc1, 22);

    note.tpc1 = 23;
    note.tpc2 = 23;
    let n = round_trip(&note);
    assert_eq!(n.tpc2, 23);
}

#[test]
fn test_small_round_trip() {
    let mut note = make_note();
    note.small = true;
    let n = round_trip(&note);
    assert!(n.small);
}

#[test]
fn test_mirror_round_trip() {
    let mut note = make_note();
    for mirror in [DirectionH::Left, DirectionH::Right, DirectionH::Auto] {
        note.user_mirror = mirror;
        let n = round_trip(&note);
        assert_eq!(n.user_mirror, mirror);
    }
}

#[test]
fn test_dot_position_round_trip() {
    let mut note = make_note();
    for dir in [Direction::Up, Direction::Down, Direction::Auto] {
        note.user_dot_position = dir;
        let n = round_trip(&note);
        assert_eq!(n.user_dot_position, dir);
    }
}

#[test]
fn test_head_group_round_trip() {
    let mut note = make_note();
    for code in 0..NoteHeadGroup::COUNT {
        note.head_group = NoteHeadGroup::from_code(code).unwrap();
        let n = round_trip(&note);
        assert_eq!(n.head_group as i32, code);
    }
}

#[test]
fn test_head_type_round_trip() {
    let mut note = make_note();
    for code in 0..NoteHeadType::COUNT {
        note.head_type = NoteHeadType::from_code(code).unwrap();
        let n = round_trip(&note);
        assert_eq!(n.head_type as i32, code);
    }
}

#[test]
fn test_velo_offset_round_trip() {
    let mut note = make_note();
    note.velo_offset = 71;
    let n = round_trip(&note);
    assert_eq!(n.velo_offset, 71);
}

#[test]
fn test_tuning_round_trip() {
    let mut note = make_note();
    note.tuning = 1.3;
    let n = round_trip(&note);
    assert_eq!(n.tuning, 1.3);
}

#[test]
fn test_fret_and_string_round_trip() {
    let mut note = make_note();
    note.fret = 9;
    note.string = 3;
    let n = round_trip(&note);
    assert_eq!(n.fret, 9);
    assert_eq!(n.string, 3);
}

#[test]
fn test_ghost_round_trip() {
    let mut note = make_note();
    note.ghost = true;
    let n = round_trip(&note);
    assert!(n.ghost);
}

#[test]
fn test_velo_type_round_trip() {
    let mut note = make_note();
    for vt in [VeloType::User, VeloType::Offset] {
        note.velo_type = vt;
        let n = round_trip(&note);
        assert_eq!(n.velo_type, vt);
    }
}

// ---- the same attributes through the generic property interface --------

#[test]
fn test_set_property_pitch() {
    let mut note = make_note();
    note.set_property(Pid::Pitch, PropertyValue::Int(32)).unwrap();
    let n = round_trip(&note);
    assert_eq!(n.pitch(), 32);
}

#[test]
fn test_set_property_tpc() {
    let mut note = make_note();
    note.set_property(Pid::Tpc1, PropertyValue::Int(21)).unwrap();
    let n = round_trip(&note);
    assert_eq!(n.tpc1, 21);

    note.set_property(Pid::Tpc1, PropertyValue::Int(22)).unwrap();
    note.set_property(Pid::Tpc2, PropertyValue::Int(22)).unwrap();
    let n = round_trip(&note);
    assert_eq!(n.tpc2, 22);
}

#[test]
fn test_set_property_small() {
    let mut note = make_note();
    note.set_property(Pid::Small, PropertyValue::Bool(false)).unwrap();
    assert!(!round_trip(&note).small);
    note.set_property(Pid::Small, PropertyValue::Bool(true)).unwrap();
    assert!(round_trip(&note).small);
}

#[test]
fn test_set_property_mirror_by_code() {
    let mut note = make_note();
    for (code, expected) in [
        (1, DirectionH::Left),
        (2, DirectionH::Right),
        (0, DirectionH::Auto),
    ] {
        note.set_property(Pid::MirrorHead, PropertyValue::Int(code)).unwrap();
        assert_eq!(round_trip(&note).user_mirror, expected);
    }
}

#[test]
fn test_set_property_dot_position() {
    let mut note = make_note();
    for (value, expected) in [
        (Direction::Up, Direction::Up),
        (Direction::Down, Direction::Down),
        (Direction::Auto, Direction::Auto),
    ] {
        note.set_property(Pid::DotPosition, PropertyValue::Direction(value)).unwrap();
        assert_eq!(round_trip(&note).user_dot_position, expected);
    }
}

#[test]
fn test_set_property_head_group_all_codes() {
    let mut note = make_note();
    for code in 0..NoteHeadGroup::COUNT {
        note.set_property(Pid::HeadGroup, PropertyValue::Int(code)).unwrap();
        assert_eq!(round_trip(&note).head_group as i32, code);
    }
}

#[test]
fn test_set_property_head_type_all_codes() {
    let mut note = make_note();
    for code in 0..NoteHeadType::COUNT {
        note.set_property(Pid::HeadType, PropertyValue::Int(code)).unwrap();
        assert_eq!(round_trip(&note).head_type as i32, code);
    }
}

#[test]
fn test_set_property_velo_offset() {
    let mut note = make_note();
    note.set_property(Pid::VeloOffset, PropertyValue::Int(38)).unwrap();
    assert_eq!(round_trip(&note).velo_offset, 38);
}

#[test]
fn test_set_property_tuning() {
    let mut note = make_note();
    note.set_property(Pid::Tuning, PropertyValue::Float(2.4)).unwrap();
    assert_eq!(round_trip(&note).tuning, 2.4);
}

#[test]
fn test_set_property_fret_and_string() {
    let mut note = make_note();
    note.set_property(Pid::Fret, PropertyValue::Int(7)).unwrap();
    note.set_property(Pid::String, PropertyValue::Int(4)).unwrap();
    let n = round_trip(&note);
    assert_eq!(n.fret, 7);
    assert_eq!(n.string, 4);

    // negative input clamps to the -1 unset sentinel
    note.set_property(Pid::Fret, PropertyValue::Int(-5)).unwrap();
    note.set_property(Pid::String, PropertyValue::Int(-2)).unwrap();
    assert_eq!(note.fret, -1);
    assert_eq!(note.string, -1);
}

#[test]
fn test_set_property_ghost() {
    let mut note = make_note();
    note.set_property(Pid::Ghost, PropertyValue::Bool(false)).unwrap();
    assert!(!round_trip(&note).ghost);
    note.set_property(Pid::Ghost, PropertyValue::Bool(true)).unwrap();
    assert!(round_trip(&note).ghost);
}

#[test]
fn test_set_property_velo_type_by_code() {
    let mut note = make_note();
    note.set_property(Pid::VeloType, PropertyValue::Int(VeloType::User as i32)).unwrap();
    assert_eq!(round_trip(&note).velo_type, VeloType::User);
    note.set_property(Pid::VeloType, PropertyValue::Int(VeloType::Offset as i32)).unwrap();
    assert_eq!(round_trip(&note).velo_type, VeloType::Offset);
}

#[test]
fn test_every_pid_survives_round_trip() {
    let mut note = make_note();
    note.set_pitch(64);
    note.set_property(Pid::Tuning, PropertyValue::Float(1.3)).unwrap();
    note.set_property(Pid::Ghost, PropertyValue::Bool(true)).unwrap();
    let n = round_trip(&note);
    for &pid in Pid::NOTE_PROPERTIES {
        assert_eq!(n.get_property(pid), note.get_property(pid), "pid {:?}", pid);
    }
}
