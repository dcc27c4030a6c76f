//! Note entry: duration splitting, tie synthesis, intervals, grace notes
//!
//! The entry points operate against the score's input cursor. A requested
//! duration that does not fit the remainder of a measure as one notated
//! length is split greedily into representable fragments, each fragment
//! tied to the next, crossing as many measure boundaries as it takes.
//! Every emission is recorded through the command bracket; entry points
//! open their own bracket only when the caller has none open
//! (bracket-or-inherit).

use crate::models::chord::{
    Articulation, ArticulationKind, Chord, ChordRest, NoteType, Rest, Tremolo, TremoloType,
};
use crate::models::duration::{max_fitting, Fraction, TDuration};
use crate::models::note::{clamp_pitch, Note, NoteId};
use crate::models::property::EditError;
use crate::models::score::Score;
use crate::pitch::interval::{transpose_tpc, Interval};

/// Address of a chord on the timeline; `grace` selects one of its grace
/// chords instead of the main chord.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChordLoc {
    pub tick: Fraction,
    pub track: usize,
    pub grace: Option<usize>,
}

impl ChordLoc {
    pub fn main(tick: Fraction, track: usize) -> Self {
        Self {
            tick,
            track,
            grace: None,
        }
    }
}

impl Score {
    /// Enter a pitched note at the cursor.
    ///
    /// `pitch` is clamped to [0, 127]; arbitrary caller input is
    /// tolerated, never an error. With `add_to_chord` the note is stacked
    /// onto the most recently entered chord instead of consuming new
    /// time. With `allow_transpose` the pitch is taken as written and
    /// shifted by the instrument transposition first.
    ///
    /// Returns the id of the first emitted (or stacked) note.
    pub fn cmd_add_pitch(
        &mut self,
        pitch: i32,
        add_to_chord: bool,
        allow_transpose: bool,
    ) -> Result<NoteId, EditError> {
        let mut pitch = clamp_pitch(pitch);
        if allow_transpose && !self.concert_pitch() {
            pitch = clamp_pitch(pitch + self.transposition().chromatic);
        }
        let owned = !self.in_cmd();
        if owned {
            self.start_cmd();
        }
        let result = if add_to_chord {
            self.stack_pitch(pitch)
        } else {
            self.enter_pitch_run(pitch)
        };
        if owned {
            self.end_cmd();
        }
        result
    }

    /// Enter a rest of the given duration at the cursor, splitting across
    /// measure boundaries like note entry but without ties.
    pub fn cmd_enter_rest(&mut self, duration: TDuration) -> Result<(), EditError> {
        self.input_state_mut().duration = duration;
        let owned = !self.in_cmd();
        if owned {
            self.start_cmd();
        }
        let result = self.enter_rest_run();
        if owned {
            self.end_cmd();
        }
        result
    }

    /// Diatonic interval transposition of the given notes. `steps` is a
    /// signed 1-based ordinal (+8 an octave up, -8 an octave down).
    /// Pitch clamps at the range boundary; repeated application in
    /// either direction never errors.
    pub fn add_interval(&mut self, steps: i32, notes: &[NoteId]) -> Result<(), EditError> {
        let ordinal = steps.abs().clamp(1, 8);
        let up = steps > 0;
        let interval = Interval::from_ordinal(ordinal);
        let owned = !self.in_cmd();
        if owned {
            self.start_cmd();
        }
        let result = self.add_interval_inner(interval, up, notes);
        if owned {
            self.end_cmd();
        }
        result
    }

    fn add_interval_inner(
        &mut self,
        interval: Interval,
        up: bool,
        notes: &[NoteId],
    ) -> Result<(), EditError> {
        use crate::models::property::{Pid, PropertyValue};
        for &id in notes {
            let (pitch, tpc1, tpc2) = {
                let n = self.find_note(id).ok_or(EditError::ElementNotFound)?;
                (n.pitch(), n.tpc1, n.tpc2)
            };
            let delta = if up {
                interval.chromatic
            } else {
                -interval.chromatic
            };
            let new_pitch = clamp_pitch(pitch + delta);
            let new_tpc1 = transpose_tpc(tpc1, interval, up);
            let new_tpc2 = transpose_tpc(tpc2, interval, up);
            self.set_note_property(id, Pid::Pitch, PropertyValue::Int(new_pitch))?;
            self.set_note_property(id, Pid::Tpc1, PropertyValue::Int(new_tpc1))?;
            self.set_note_property(id, Pid::Tpc2, PropertyValue::Int(new_tpc2))?;
        }
        Ok(())
    }

    /// Tie the last selected note into the chord-rest slot that follows
    /// it, synthesizing the continuation note if the slot is empty or a
    /// rest.
    pub fn cmd_add_tie(&mut self) -> Result<(), EditError> {
        let id = *self
            .selection()
            .last()
            .ok_or(EditError::ElementNotFound)?;
        let owned = !self.in_cmd();
        if owned {
            self.start_cmd();
        }
        let result = self.add_tie_inner(id);
        if owned {
            self.end_cmd();
        }
        result
    }

    fn add_tie_inner(&mut self, id: NoteId) -> Result<(), EditError> {
        let (tick, track, duration, is_grace) = self
            .locate_note_chord(id)
            .ok_or(EditError::ElementNotFound)?;
        let (pitch, tpc1, tpc2) = {
            let n = self.find_note(id).ok_or(EditError::ElementNotFound)?;
            (n.pitch(), n.tpc1, n.tpc2)
        };
        // a grace note ties into its host chord at the same tick; a main
        // note ties into whatever follows it
        let end_tick = if is_grace { tick } else { tick + duration.ticks() };

        // an existing note of the same pitch in the target slot just gets
        // linked
        let target = match self.chord_rest_at(end_tick, track) {
            Some(ChordRest::Chord(c)) => Some(c.clone()),
            _ => None,
        };
        if let Some(mut chord) = target {
            if let Some(n) = chord.notes.iter().find(|n| n.pitch() == pitch) {
                let to = n.id;
                return self.connect_tie(id, to);
            }
            if is_grace {
                // no matching pitch in the host chord: stack one
                let note_id = self.new_note_id();
                let mut note = Note::new(note_id, track);
                note.set_pitch(pitch);
                note.tpc1 = tpc1;
                note.tpc2 = tpc2;
                chord.add(note);
                self.replace_chord_rest(end_tick, track, Some(ChordRest::Chord(chord)))?;
                return self.connect_tie(id, note_id);
            }
        }

        // otherwise synthesize the continuation with the same duration
        let first = self.emit_note_run(pitch, tpc1, tpc2, track, end_tick, duration.ticks())?;
        self.connect_tie(id, first)
    }

    // ---- grace notes and chord attachments ------------------------------

    /// Attach a grace chord with a single note ahead of the main chord.
    pub fn set_grace_note(
        &mut self,
        tick: Fraction,
        track: usize,
        pitch: i32,
        note_type: NoteType,
        duration: TDuration,
    ) -> Result<NoteId, EditError> {
        let owned = !self.in_cmd();
        if owned {
            self.start_cmd();
        }
        let result = self.set_grace_note_inner(tick, track, pitch, note_type, duration);
        if owned {
            self.end_cmd();
        }
        result
    }

    fn set_grace_note_inner(
        &mut self,
        tick: Fraction,
        track: usize,
        pitch: i32,
        note_type: NoteType,
        duration: TDuration,
    ) -> Result<NoteId, EditError> {
        let key = self.key_at(tick);
        let mut chord = match self.chord_rest_at(tick, track) {
            Some(ChordRest::Chord(c)) => c.clone(),
            _ => return Err(EditError::ElementNotFound),
        };
        let note_id = self.new_note_id();
        let mut grace = Chord::new(self.new_elem_id(), track, duration);
        grace.note_type = note_type;
        let mut note = Note::new(note_id, track);
        note.set_pitch(pitch);
        note.set_tpc_from_pitch(key);
        grace.add(note);
        chord.grace_notes.push(grace);
        self.replace_chord_rest(tick, track, Some(ChordRest::Chord(chord)))?;
        self.select_notes(vec![note_id]);
        Ok(note_id)
    }

    /// Attach a tremolo to a chord (grace or main), replacing any
    /// existing one.
    pub fn add_tremolo(&mut self, loc: ChordLoc, tremolo_type: TremoloType) -> Result<(), EditError> {
        self.rewrite_chord(loc, |chord, track| {
            chord.tremolo = Some(Tremolo {
                tremolo_type,
                track,
            });
        })
    }

    /// Attach an articulation to a chord (grace or main).
    pub fn add_articulation(&mut self, loc: ChordLoc, kind: ArticulationKind) -> Result<(), EditError> {
        self.rewrite_chord(loc, |chord, track| {
            chord.articulations.push(Articulation { kind, track });
        })
    }

    fn rewrite_chord(
        &mut self,
        loc: ChordLoc,
        f: impl FnOnce(&mut Chord, usize),
    ) -> Result<(), EditError> {
        let owned = !self.in_cmd();
        if owned {
            self.start_cmd();
        }
        let result = (|| {
            let mut main = match self.chord_rest_at(loc.tick, loc.track) {
                Some(ChordRest::Chord(c)) => c.clone(),
                _ => return Err(EditError::ElementNotFound),
            };
            let track = loc.track;
            match loc.grace {
                Some(i) => {
                    let grace = main
                        .grace_notes
                        .get_mut(i)
                        .ok_or(EditError::ElementNotFound)?;
                    f(grace, track);
                }
                None => f(&mut main, track),
            }
            self.replace_chord_rest(loc.tick, loc.track, Some(ChordRest::Chord(main)))
        })();
        if owned {
            self.end_cmd();
        }
        result
    }

    // ---- entry internals -------------------------------------------------

    /// Stack a note onto the most recently entered chord without
    /// consuming time.
    fn stack_pitch(&mut self, pitch: i32) -> Result<NoteId, EditError> {
        let (tick, track) = self
            .input_state()
            .last_entry
            .ok_or(EditError::ElementNotFound)?;
        let key = self.key_at(tick);
        let mut chord = match self.chord_rest_at(tick, track) {
            Some(ChordRest::Chord(c)) => c.clone(),
            _ => return Err(EditError::ElementNotFound),
        };
        let note_id = self.new_note_id();
        let mut note = Note::new(note_id, track);
        note.set_pitch(pitch);
        note.set_tpc_from_pitch(key);
        self.respell_written(&mut note);
        chord.add(note);
        self.replace_chord_rest(tick, track, Some(ChordRest::Chord(chord)))?;
        self.select_notes(vec![note_id]);
        Ok(note_id)
    }

    /// Enter a pitch run at the cursor and advance it past the emitted
    /// fragments.
    fn enter_pitch_run(&mut self, pitch: i32) -> Result<NoteId, EditError> {
        let start = self.input_state().tick;
        let track = self.input_state().track;
        let requested = self.input_state().duration.ticks();
        let key = self.key_at(start);
        let tpc1 = crate::pitch::tpc::pitch_to_tpc(pitch, key, crate::pitch::tpc::Prefer::Nearest);
        let interval = self.transposition();
        let tpc2 = if interval.is_zero() {
            tpc1
        } else {
            transpose_tpc(tpc1, interval, true)
        };

        let first = self.emit_note_run(pitch, tpc1, tpc2, track, start, requested)?;

        let state = self.input_state_mut();
        state.tick = start + requested;
        state.last_entry = Some((start, track));
        let run: Vec<NoteId> = self.tied_notes(first).iter().map(|n| n.id).collect();
        self.select_notes(run);
        Ok(first)
    }

    fn respell_written(&self, note: &mut Note) {
        let interval = self.transposition();
        if !interval.is_zero() {
            note.tpc2 = transpose_tpc(note.tpc1, interval, true);
        }
    }

    /// Emit the tied fragment chain for one logical note. The greedy
    /// chunk is the largest representable length fitting both the
    /// remaining request and the remainder of the current measure, so the
    /// loop strictly shrinks the request by at least the smallest unit
    /// and must terminate. The emitted lengths sum to the request
    /// exactly.
    fn emit_note_run(
        &mut self,
        pitch: i32,
        tpc1: i32,
        tpc2: i32,
        track: usize,
        start: Fraction,
        requested: Fraction,
    ) -> Result<NoteId, EditError> {
        let mut remaining = requested;
        let mut tick = start;
        let mut prev: Option<NoteId> = None;
        let mut first: Option<NoteId> = None;

        while remaining > Fraction::new(0, 1) {
            self.ensure_measure(tick)?;
            let measure_end = self
                .measure_containing(tick)
                .map(|m| m.end_tick())
                .unwrap_or(tick);
            let room = measure_end - tick;
            let chunk = match max_fitting(remaining.min(room)) {
                Some(d) => d,
                // below the smallest unit: nothing representable remains
                None => break,
            };
            log::trace!(
                "emit fragment {:?} at {} ({} remaining)",
                chunk,
                tick,
                remaining
            );

            let note_id = self.new_note_id();
            let mut note = Note::new(note_id, track);
            note.set_pitch(pitch);
            note.tpc1 = tpc1;
            note.tpc2 = tpc2;
            let mut chord = Chord::new(self.new_elem_id(), track, chunk);
            chord.add(note);
            self.replace_chord_rest(tick, track, Some(ChordRest::Chord(chord)))?;

            if let Some(p) = prev {
                self.connect_tie(p, note_id)?;
            }
            if first.is_none() {
                first = Some(note_id);
            }
            prev = Some(note_id);
            tick += chunk.ticks();
            remaining -= chunk.ticks();
        }
        first.ok_or(EditError::ElementNotFound)
    }

    /// Rest entry: the same decomposition, without ties.
    fn enter_rest_run(&mut self) -> Result<(), EditError> {
        let start = self.input_state().tick;
        let track = self.input_state().track;
        let mut remaining = self.input_state().duration.ticks();
        let mut tick = start;

        while remaining > Fraction::new(0, 1) {
            self.ensure_measure(tick)?;
            let measure_end = self
                .measure_containing(tick)
                .map(|m| m.end_tick())
                .unwrap_or(tick);
            let room = measure_end - tick;
            let chunk = match max_fitting(remaining.min(room)) {
                Some(d) => d,
                None => break,
            };
            self.replace_chord_rest(
                tick,
                track,
                Some(ChordRest::Rest(Rest {
                    track,
                    duration: chunk,
                })),
            )?;
            tick += chunk.ticks();
            remaining -= chunk.ticks();
        }

        let state = self.input_state_mut();
        state.tick = tick;
        state.last_entry = None;
        Ok(())
    }

    /// Rhythmic duration of the chord owning a note.
    pub fn note_chord_duration(&self, id: NoteId) -> Option<TDuration> {
        self.locate_note_chord(id).map(|(_, _, d, _)| d)
    }

    /// Tick, track and duration of the chord owning a note, with a flag
    /// for notes living in a grace chord.
    fn locate_note_chord(&self, id: NoteId) -> Option<(Fraction, usize, TDuration, bool)> {
        for m in &self.measures {
            for s in &m.segments {
                for (track, cr) in &s.elements {
                    if let ChordRest::Chord(c) = cr {
                        if c.notes.iter().any(|n| n.id == id) {
                            return Some((s.tick, *track, c.duration, false));
                        }
                        if c.grace_notes
                            .iter()
                            .any(|g| g.notes.iter().any(|n| n.id == id))
                        {
                            return Some((s.tick, *track, c.duration, true));
                        }
                    }
                }
            }
        }
        None
    }
}
