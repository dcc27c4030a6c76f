//! Score: the document root
//!
//! Owns the measure chain, the key / time-signature context, the undo
//! history and the note-entry cursor. Every mutation routes through the
//! command bracket (`start_cmd` / `end_cmd`); the low-level
//! `apply_change` replay is shared by forward edits, undo and redo so the
//! three can never drift apart.

use serde::{Deserialize, Serialize};

use super::chord::ChordRest;
use super::duration::{DurationType, Fraction, TDuration};
use super::measure::Measure;
use super::note::{Note, NoteId};
use super::property::{EditError, Pid, PropertyValue};
use crate::pitch::interval::{transpose_tpc, Interval};
use crate::pitch::tpc::Key;
use crate::undo::{Change, UndoStack};

/// Note-entry cursor: where the next entered event lands and how long it
/// is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    pub track: usize,
    pub tick: Fraction,
    pub duration: TDuration,
    pub note_entry_mode: bool,
    /// Slot of the most recent entry, for stacking further notes onto the
    /// same chord.
    pub last_entry: Option<(Fraction, usize)>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            track: 0,
            tick: Fraction::new(0, 1),
            duration: TDuration::new(DurationType::Quarter),
            note_entry_mode: false,
            last_entry: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Score {
    pub measures: Vec<Measure>,
    /// Key signature context, sorted by tick. Read-only during edits.
    key_map: Vec<(Fraction, Key)>,
    /// Time signature context, sorted by tick.
    time_sig_map: Vec<(Fraction, (i32, i32))>,
    /// Whether the active spelling slot is the concert one (`tpc1`).
    concert_pitch: bool,
    /// Instrument transposition from concert to written spelling.
    transposition: Interval,
    next_id: u32,
    #[serde(skip)]
    pub(crate) undo: UndoStack,
    #[serde(skip)]
    input_state: InputState,
    #[serde(skip)]
    selection: Vec<NoteId>,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    /// An empty score: one 4/4 measure in C, more measures appended on
    /// demand during note entry.
    pub fn new() -> Self {
        Self::with_time_signature(4, 4)
    }

    pub fn with_time_signature(numerator: i32, denominator: i32) -> Self {
        let len = Fraction::new(numerator, denominator);
        Self {
            measures: vec![Measure::new(Fraction::new(0, 1), len)],
            key_map: vec![(Fraction::new(0, 1), Key::C)],
            time_sig_map: vec![(Fraction::new(0, 1), (numerator, denominator))],
            concert_pitch: false,
            transposition: Interval::default(),
            next_id: 1,
            undo: UndoStack::default(),
            input_state: InputState::default(),
            selection: Vec::new(),
        }
    }

    // ---- context -------------------------------------------------------

    pub fn key_at(&self, tick: Fraction) -> Key {
        self.key_map
            .iter()
            .rev()
            .find(|(t, _)| *t <= tick)
            .map(|(_, k)| *k)
            .unwrap_or_default()
    }

    pub fn time_signature_at(&self, tick: Fraction) -> (i32, i32) {
        self.time_sig_map
            .iter()
            .rev()
            .find(|(t, _)| *t <= tick)
            .map(|(_, ts)| *ts)
            .unwrap_or((4, 4))
    }

    /// Install a key signature in the read-only context. Part of document
    /// setup, not an undoable edit.
    pub fn set_key(&mut self, tick: Fraction, key: Key) {
        self.key_map.retain(|(t, _)| *t != tick);
        self.key_map.push((tick, key));
        self.key_map.sort_by_key(|(t, _)| *t);
    }

    pub fn set_time_signature(&mut self, tick: Fraction, numerator: i32, denominator: i32) {
        self.time_sig_map.retain(|(t, _)| *t != tick);
        self.time_sig_map.push((tick, (numerator, denominator)));
        self.time_sig_map.sort_by_key(|(t, _)| *t);
    }

    pub fn concert_pitch(&self) -> bool {
        self.concert_pitch
    }

    pub fn transposition(&self) -> Interval {
        self.transposition
    }

    pub fn set_transposition(&mut self, interval: Interval) {
        self.transposition = interval;
    }

    // ---- cursor and selection ------------------------------------------

    pub fn input_state(&self) -> &InputState {
        &self.input_state
    }

    pub fn input_state_mut(&mut self) -> &mut InputState {
        &mut self.input_state
    }

    pub fn selection(&self) -> &[NoteId] {
        &self.selection
    }

    pub fn select_notes(&mut self, notes: Vec<NoteId>) {
        self.selection = notes;
    }

    // ---- element lookup ------------------------------------------------

    pub fn first_measure(&self) -> &Measure {
        &self.measures[0]
    }

    pub fn measure_containing(&self, tick: Fraction) -> Option<&Measure> {
        self.measures.iter().find(|m| m.contains(tick))
    }

    fn measure_containing_mut(&mut self, tick: Fraction) -> Option<&mut Measure> {
        self.measures.iter_mut().find(|m| m.contains(tick))
    }

    pub fn end_tick(&self) -> Fraction {
        self.measures
            .last()
            .map(Measure::end_tick)
            .unwrap_or_else(|| Fraction::new(0, 1))
    }

    pub fn chord_rest_at(&self, tick: Fraction, track: usize) -> Option<&ChordRest> {
        self.measure_containing(tick)
            .and_then(|m| m.segment_at(tick))
            .and_then(|s| s.element(track))
    }

    pub fn find_note(&self, id: NoteId) -> Option<&Note> {
        for m in &self.measures {
            for s in &m.segments {
                for cr in s.elements.values() {
                    if let ChordRest::Chord(c) = cr {
                        if let Some(n) = c.find_note(id) {
                            return Some(n);
                        }
                    }
                }
            }
        }
        None
    }

    fn find_note_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        for m in &mut self.measures {
            for s in &mut m.segments {
                for cr in s.elements.values_mut() {
                    if let ChordRest::Chord(c) = cr {
                        if let Some(n) = c.find_note_mut(id) {
                            return Some(n);
                        }
                    }
                }
            }
        }
        None
    }

    /// Follow forward ties from a note, returning the whole tied run
    /// including the starting note.
    pub fn tied_notes(&self, id: NoteId) -> Vec<&Note> {
        let mut out = Vec::new();
        let mut cursor = self.find_note(id);
        // walk back to the head of the chain first
        while let Some(n) = cursor {
            match n.tie_back.and_then(|b| self.find_note(b)) {
                Some(prev) => cursor = Some(prev),
                None => {
                    cursor = Some(n);
                    break;
                }
            }
        }
        while let Some(n) = cursor {
            out.push(n);
            cursor = n.tie_for.and_then(|f| self.find_note(f));
        }
        out
    }

    pub(crate) fn new_note_id(&mut self) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn new_elem_id(&mut self) -> super::chord::ElemId {
        let id = super::chord::ElemId(self.next_id);
        self.next_id += 1;
        id
    }

    // ---- command bracket ------------------------------------------------

    pub fn start_cmd(&mut self) {
        self.undo.start_cmd();
    }

    pub fn end_cmd(&mut self) {
        self.undo.end_cmd();
    }

    pub fn in_cmd(&self) -> bool {
        self.undo.in_cmd()
    }

    /// Undo the most recent committed transaction. A no-op on empty
    /// history.
    pub fn undo(&mut self) {
        if let Some(txn) = self.undo.pull_undo() {
            for change in txn.changes.iter().rev() {
                self.apply_change(change, false);
            }
        }
    }

    /// Reapply the most recently undone transaction.
    pub fn redo(&mut self) {
        if let Some(txn) = self.undo.pull_redo() {
            for change in txn.changes.iter() {
                self.apply_change(change, true);
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    // ---- recorded mutations ---------------------------------------------

    /// Generic property write through the command engine. Emits exactly
    /// one change record per call, idempotent-value calls included.
    pub fn set_note_property(
        &mut self,
        id: NoteId,
        pid: Pid,
        value: PropertyValue,
    ) -> Result<PropertyValue, EditError> {
        if !self.undo.in_cmd() {
            debug_assert!(false, "property mutation outside a command bracket");
            return Err(EditError::UncommittedMutation);
        }
        let note = self.find_note_mut(id).ok_or(EditError::ElementNotFound)?;
        let old = note.set_property(pid, value)?;
        let new = note.get_property(pid);
        self.undo.record(Change::SetNoteProperty {
            note: id,
            pid,
            old: old.clone(),
            new,
        })?;
        Ok(old)
    }

    pub fn get_note_property(&self, id: NoteId, pid: Pid) -> Result<PropertyValue, EditError> {
        self.find_note(id)
            .map(|n| n.get_property(pid))
            .ok_or(EditError::ElementNotFound)
    }

    /// Replace whatever occupies one segment slot, recording the old
    /// snapshot for undo.
    pub(crate) fn replace_chord_rest(
        &mut self,
        tick: Fraction,
        track: usize,
        new: Option<ChordRest>,
    ) -> Result<(), EditError> {
        if !self.undo.in_cmd() {
            debug_assert!(false, "structural edit outside a command bracket");
            return Err(EditError::UncommittedMutation);
        }
        let old = self.chord_rest_at(tick, track).cloned();
        let change = Change::ReplaceChordRest {
            tick,
            track,
            old,
            new,
        };
        self.undo.record(change.clone())?;
        self.apply_change(&change, true);
        Ok(())
    }

    /// Link two notes with a tie (two endpoint records, forward then
    /// backward).
    pub(crate) fn connect_tie(&mut self, from: NoteId, to: NoteId) -> Result<(), EditError> {
        self.record_tie_endpoint(from, true, Some(to))?;
        self.record_tie_endpoint(to, false, Some(from))
    }

    pub(crate) fn record_tie_endpoint(
        &mut self,
        note: NoteId,
        forward: bool,
        new: Option<NoteId>,
    ) -> Result<(), EditError> {
        if !self.undo.in_cmd() {
            debug_assert!(false, "tie edit outside a command bracket");
            return Err(EditError::UncommittedMutation);
        }
        let n = self.find_note(note).ok_or(EditError::ElementNotFound)?;
        let old = if forward { n.tie_for } else { n.tie_back };
        let change = Change::SetTie {
            note,
            forward,
            old,
            new,
        };
        self.undo.record(change.clone())?;
        self.apply_change(&change, true);
        Ok(())
    }

    /// Append measures until `tick` falls inside one.
    pub(crate) fn ensure_measure(&mut self, tick: Fraction) -> Result<(), EditError> {
        while self.end_tick() <= tick {
            let start = self.end_tick();
            let (num, den) = self.time_signature_at(start);
            let change = Change::AddMeasure {
                tick: start,
                len: Fraction::new(num, den),
            };
            self.undo.record(change.clone())?;
            self.apply_change(&change, true);
        }
        Ok(())
    }

    /// Remove the event at a slot, clearing any ties into or out of its
    /// notes first so no reference dangles.
    pub fn cmd_remove_chord_rest(&mut self, tick: Fraction, track: usize) -> Result<(), EditError> {
        let owned = !self.undo.in_cmd();
        if owned {
            self.start_cmd();
        }
        let result = self.remove_chord_rest_inner(tick, track);
        if owned {
            self.end_cmd();
        }
        result
    }

    fn remove_chord_rest_inner(&mut self, tick: Fraction, track: usize) -> Result<(), EditError> {
        let removed_ids = match self.chord_rest_at(tick, track) {
            Some(ChordRest::Chord(c)) => c.note_ids(),
            Some(ChordRest::Rest(_)) => Vec::new(),
            None => return Err(EditError::ElementNotFound),
        };
        for id in removed_ids {
            let (tie_for, tie_back) = {
                let n = self.find_note(id).ok_or(EditError::ElementNotFound)?;
                (n.tie_for, n.tie_back)
            };
            if let Some(next) = tie_for {
                self.record_tie_endpoint(next, false, None)?;
                self.record_tie_endpoint(id, true, None)?;
            }
            if let Some(prev) = tie_back {
                self.record_tie_endpoint(prev, true, None)?;
                self.record_tie_endpoint(id, false, None)?;
            }
        }
        self.replace_chord_rest(tick, track, None)
    }

    // ---- concert pitch --------------------------------------------------

    /// Toggle between written and concert display, re-deriving every
    /// note's written spelling slot from the concert one. One batch
    /// transaction; sounding pitch is untouched.
    pub fn cmd_concert_pitch_changed(&mut self, enabled: bool) -> Result<(), EditError> {
        if enabled == self.concert_pitch {
            return Ok(());
        }
        let owned = !self.undo.in_cmd();
        if owned {
            self.start_cmd();
        }
        let result = self.concert_pitch_changed_inner(enabled);
        if owned {
            self.end_cmd();
        }
        result
    }

    fn concert_pitch_changed_inner(&mut self, enabled: bool) -> Result<(), EditError> {
        let change = Change::SetConcertPitch {
            old: self.concert_pitch,
            new: enabled,
        };
        self.undo.record(change.clone())?;
        self.apply_change(&change, true);

        let interval = self.transposition;
        let ids: Vec<NoteId> = self.all_note_ids();
        log::debug!(
            "concert pitch -> {}, respelling {} note(s)",
            enabled,
            ids.len()
        );
        for id in ids {
            let tpc1 = self
                .find_note(id)
                .ok_or(EditError::ElementNotFound)?
                .tpc1;
            let tpc2 = if interval.is_zero() {
                tpc1
            } else {
                transpose_tpc(tpc1, interval, true)
            };
            self.set_note_property(id, Pid::Tpc2, PropertyValue::Int(tpc2))?;
        }
        Ok(())
    }

    pub fn all_note_ids(&self) -> Vec<NoteId> {
        let mut ids = Vec::new();
        for m in &self.measures {
            for s in &m.segments {
                for cr in s.elements.values() {
                    if let ChordRest::Chord(c) = cr {
                        ids.extend(c.note_ids());
                    }
                }
            }
        }
        ids
    }

    // ---- replay core ----------------------------------------------------

    /// Apply one change record forward or backward. The single replay
    /// path used by edits, undo and redo.
    fn apply_change(&mut self, change: &Change, forward: bool) {
        match change {
            Change::SetNoteProperty { note, pid, old, new } => {
                let value = if forward { new } else { old };
                if let Some(n) = self.find_note_mut(*note) {
                    // value came from a successful set; replay cannot fail
                    let _ = n.set_property(*pid, value.clone());
                }
            }
            Change::ReplaceChordRest { tick, track, old, new } => {
                let value = if forward { new } else { old };
                let tick = *tick;
                let track = *track;
                if let Some(m) = self.measure_containing_mut(tick) {
                    match value {
                        Some(cr) => {
                            let seg = m.get_or_create_segment(tick);
                            seg.elements.insert(track, cr.clone());
                        }
                        None => {
                            if let Some(seg) = m.segment_at_mut(tick) {
                                seg.elements.remove(&track);
                            }
                            m.prune_segment(tick);
                        }
                    }
                }
            }
            Change::SetTie { note, forward: fwd, old, new } => {
                let value = if forward { new } else { old };
                if let Some(n) = self.find_note_mut(*note) {
                    if *fwd {
                        n.tie_for = *value;
                    } else {
                        n.tie_back = *value;
                    }
                }
            }
            Change::AddMeasure { tick, len } => {
                if forward {
                    self.measures.push(Measure::new(*tick, *len));
                } else {
                    debug_assert_eq!(self.measures.last().map(|m| m.tick), Some(*tick));
                    self.measures.pop();
                }
            }
            Change::SetConcertPitch { old, new } => {
                self.concert_pitch = if forward { *new } else { *old };
            }
        }
    }

    // ---- saved form -----------------------------------------------------

    /// Canonical saved form of the document content. Identical edit
    /// sequences produce identical text, so saved forms compare
    /// deterministically; bookkeeping such as the id counter is not part
    /// of the observable document and stays out of it.
    pub fn save_form(&self) -> String {
        #[derive(Serialize)]
        struct SavedForm<'a> {
            measures: &'a [Measure],
            key_map: &'a [(Fraction, Key)],
            time_sig_map: &'a [(Fraction, (i32, i32))],
            concert_pitch: bool,
            transposition: Interval,
        }
        let form = SavedForm {
            measures: &self.measures,
            key_map: &self.key_map,
            time_sig_map: &self.time_sig_map,
            concert_pitch: self.concert_pitch,
            transposition: self.transposition,
        };
        serde_json::to_string_pretty(&form).unwrap_or_default()
    }
}
