//! Chord and rest events
//!
//! A Chord is an ordered set of simultaneous Notes sharing one duration
//! and track. It owns its grace chords, at most one tremolo, and its
//! articulations. Chords and rests share a segment slot, so they travel
//! together as `ChordRest`.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::duration::TDuration;
use super::note::{Note, NoteId};

/// Stable identity of a Chord within one Score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElemId(pub u32);

/// Kind of chord: a normal timeline chord or one of the grace varieties
/// attached ahead of a main chord.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum NoteType {
    #[default]
    Normal = 0,
    Appoggiatura = 1,
    Acciaccatura = 2,
}

/// Measured tremolo stroke count on a single chord.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum TremoloType {
    R8 = 0,
    R16 = 1,
    R32 = 2,
    R64 = 3,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tremolo {
    pub tremolo_type: TremoloType,
    pub track: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ArticulationKind {
    AccentAbove = 0,
    StaccatoAbove = 1,
    TenutoAbove = 2,
    MarcatoAbove = 3,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Articulation {
    pub kind: ArticulationKind,
    pub track: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub id: ElemId,
    pub track: usize,
    pub duration: TDuration,
    pub note_type: NoteType,
    /// Ordered bottom-up; exclusive ownership.
    pub notes: Vec<Note>,
    pub grace_notes: Vec<Chord>,
    pub tremolo: Option<Tremolo>,
    pub articulations: Vec<Articulation>,
}

impl Chord {
    pub fn new(id: ElemId, track: usize, duration: TDuration) -> Self {
        Self {
            id,
            track,
            duration,
            note_type: NoteType::Normal,
            notes: Vec::new(),
            grace_notes: Vec::new(),
            tremolo: None,
            articulations: Vec::new(),
        }
    }

    /// Add a note keeping the bottom-up pitch order.
    pub fn add(&mut self, note: Note) {
        let pos = self
            .notes
            .iter()
            .position(|n| n.pitch() > note.pitch())
            .unwrap_or(self.notes.len());
        self.notes.insert(pos, note);
    }

    pub fn up_note(&self) -> Option<&Note> {
        self.notes.last()
    }

    pub fn down_note(&self) -> Option<&Note> {
        self.notes.first()
    }

    pub fn find_note(&self, id: NoteId) -> Option<&Note> {
        self.notes
            .iter()
            .find(|n| n.id == id)
            .or_else(|| self.grace_notes.iter().find_map(|g| g.find_note(id)))
    }

    pub fn find_note_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        if let Some(pos) = self.notes.iter().position(|n| n.id == id) {
            return self.notes.get_mut(pos);
        }
        self.grace_notes.iter_mut().find_map(|g| g.find_note_mut(id))
    }

    /// Ids of every note owned by this chord, grace chords included.
    pub fn note_ids(&self) -> Vec<NoteId> {
        let mut ids: Vec<NoteId> = self.notes.iter().map(|n| n.id).collect();
        for g in &self.grace_notes {
            ids.extend(g.note_ids());
        }
        ids
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub track: usize,
    pub duration: TDuration,
}

/// The event occupying one track slot of a chord-rest segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChordRest {
    Chord(Chord),
    Rest(Rest),
}

impl ChordRest {
    pub fn duration(&self) -> TDuration {
        match self {
            ChordRest::Chord(c) => c.duration,
            ChordRest::Rest(r) => r.duration,
        }
    }

    pub fn as_chord(&self) -> Option<&Chord> {
        match self {
            ChordRest::Chord(c) => Some(c),
            ChordRest::Rest(_) => None,
        }
    }

    pub fn as_chord_mut(&mut self) -> Option<&mut Chord> {
        match self {
            ChordRest::Chord(c) => Some(c),
            ChordRest::Rest(_) => None,
        }
    }
}
