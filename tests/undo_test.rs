// Transaction atomicity: everything between one start_cmd/end_cmd pair
// undoes and redoes as a single unit, restoring the document to a state
// observationally identical to the one before the bracket opened.

use notation_core::models::{
    DurationType, Fraction, Pid, PropertyValue, Score, TDuration,
};
use notation_core::rw::compare_saved_form;
use pretty_assertions::assert_eq;

fn entry_score() -> Score {
    let mut score = Score::new();
    let state = score.input_state_mut();
    state.track = 0;
    state.duration = TDuration::new(DurationType::Quarter);
    state.note_entry_mode = true;
    score
}

#[test]
fn test_n_mutations_undo_as_one() {
    let mut score = entry_score();
    let id = score.cmd_add_pitch(60, false, false).unwrap();
    let before = score.save_form();

    score.start_cmd();
    score.set_note_property(id, Pid::Small, PropertyValue::Bool(true)).unwrap();
    score.set_note_property(id, Pid::VeloOffset, PropertyValue::Int(71)).unwrap();
    score.set_note_property(id, Pid::Tuning, PropertyValue::Float(1.3)).unwrap();
    score.set_note_property(id, Pid::Fret, PropertyValue::Int(9)).unwrap();
    score.set_note_property(id, Pid::String, PropertyValue::Int(3)).unwrap();
    score.end_cmd();

    let after = score.save_form();
    assert_ne!(before, after);

    score.undo();
    assert!(compare_saved_form(&score.save_form(), &before));
    for (pid, expected) in [
        (Pid::Small, PropertyValue::Bool(false)),
        (Pid::VeloOffset, PropertyValue::Int(0)),
        (Pid::Fret, PropertyValue::Int(-1)),
    ] {
        assert_eq!(score.get_note_property(id, pid).unwrap(), expected);
    }

    score.redo();
    assert!(compare_saved_form(&score.save_form(), &after));
    assert_eq!(
        score.get_note_property(id, Pid::Tuning).unwrap(),
        PropertyValue::Float(1.3)
    );
}

#[test]
fn test_note_entry_undoes_structurally() {
    let mut score = entry_score();
    let before = score.save_form();

    // a breve from beat two: fragments, ties and appended measures,
    // all in one bracket
    score.cmd_add_pitch(60, false, false).unwrap();
    score.input_state_mut().tick = Fraction::new(1, 4);
    score.input_state_mut().duration = TDuration::new(DurationType::Breve);
    score.cmd_add_pitch(64, false, false).unwrap();

    score.undo(); // breve entry
    score.undo(); // quarter entry
    // measure chain, segments and ties all back to the empty document
    assert_eq!(score.measures.len(), 1);
    assert!(score.all_note_ids().is_empty());
    assert!(compare_saved_form(&score.save_form(), &before));
}

#[test]
fn test_undo_redo_round_trip_is_stable() {
    let mut score = entry_score();
    score.cmd_add_pitch(60, false, false).unwrap();
    score.cmd_add_pitch(64, false, false).unwrap();
    let committed = score.save_form();

    score.undo();
    score.redo();
    assert!(compare_saved_form(&score.save_form(), &committed));
}

#[test]
fn test_undo_with_empty_history_is_noop() {
    let mut score = entry_score();
    score.undo();
    score.redo();
    assert_eq!(score.measures.len(), 1);
    assert!(!score.can_undo());
    assert!(!score.can_redo());
}

#[test]
fn test_new_edit_clears_redo() {
    let mut score = entry_score();
    score.cmd_add_pitch(60, false, false).unwrap();
    score.undo();
    assert!(score.can_redo());
    score.input_state_mut().tick = Fraction::new(0, 1);
    score.cmd_add_pitch(62, false, false).unwrap();
    assert!(!score.can_redo());
}

#[test]
fn test_nested_brackets_commit_once() {
    let mut score = entry_score();
    let id = score.cmd_add_pitch(60, false, false).unwrap();

    score.start_cmd();
    score.set_note_property(id, Pid::Ghost, PropertyValue::Bool(true)).unwrap();
    // entry point joins the open bracket instead of committing its own
    score.cmd_add_pitch(64, true, false).unwrap();
    score.end_cmd();

    score.undo();
    assert_eq!(
        score.get_note_property(id, Pid::Ghost).unwrap(),
        PropertyValue::Bool(false)
    );
    // the stacked note went with the same undo step
    let chord = score
        .first_measure()
        .find_chord(Fraction::new(0, 1), 0)
        .unwrap();
    assert_eq!(chord.notes.len(), 1);
}

#[test]
fn test_idempotent_set_still_records() {
    let mut score = entry_score();
    let id = score.cmd_add_pitch(60, false, false).unwrap();

    score.start_cmd();
    score.set_note_property(id, Pid::VeloOffset, PropertyValue::Int(0)).unwrap();
    score.end_cmd();

    // same observable value, but the call still committed its own
    // transaction: one undo pops it and leaves the entry intact
    assert!(score.can_undo());
    score.undo();
    assert!(score.find_note(id).is_some());
    assert_eq!(
        score.get_note_property(id, Pid::VeloOffset).unwrap(),
        PropertyValue::Int(0)
    );
}

#[test]
fn test_removing_tied_fragment_clears_partner_tie() {
    let mut score = entry_score();
    score.input_state_mut().duration = TDuration::new(DurationType::Breve);
    let first = score.cmd_add_pitch(60, false, false).unwrap();
    let fragments: Vec<_> = score.tied_notes(first).iter().map(|n| n.id).collect();
    assert_eq!(fragments.len(), 2);

    // remove the second fragment; the first must not be left pointing at it
    score.cmd_remove_chord_rest(Fraction::new(1, 1), 0).unwrap();
    assert!(score.find_note(fragments[1]).is_none());
    assert!(score.find_note(fragments[0]).unwrap().tie_for.is_none());

    // and undo restores the link
    score.undo();
    assert_eq!(
        score.find_note(fragments[0]).unwrap().tie_for,
        Some(fragments[1])
    );
}
