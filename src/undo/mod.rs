//! Transactional change log and undo/redo history
//!
//! Every document mutation is recorded as an invertible `Change` while a
//! command bracket is open. `end_cmd` commits the accumulated log as one
//! atomic transaction; `undo` replays a transaction's inverses in reverse
//! order. The bracket is a reentrancy discipline for a single-threaded
//! document, not a lock.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::models::chord::ChordRest;
use crate::models::duration::Fraction;
use crate::models::note::NoteId;
use crate::models::property::{EditError, Pid, PropertyValue};

/// One invertible mutation, recorded as before/after snapshots.
///
/// Snapshots rather than closures: property values and chord-rest events
/// are small, cheaply clonable data, and snapshot pairs replay identically
/// in both directions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Change {
    SetNoteProperty {
        note: NoteId,
        pid: Pid,
        old: PropertyValue,
        new: PropertyValue,
    },
    /// Replace whatever occupies one segment slot: covers element
    /// creation (`old: None`), removal (`new: None`) and in-place
    /// rewrites such as appending a note to an existing chord.
    ReplaceChordRest {
        tick: Fraction,
        track: usize,
        old: Option<ChordRest>,
        new: Option<ChordRest>,
    },
    /// Rewire one tie endpoint on one note.
    SetTie {
        note: NoteId,
        forward: bool,
        old: Option<NoteId>,
        new: Option<NoteId>,
    },
    /// A measure appended at the end of the timeline.
    AddMeasure { tick: Fraction, len: Fraction },
    SetConcertPitch { old: bool, new: bool },
}

/// One committed command bracket.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub changes: Vec<Change>,
}

/// Undo/redo history plus the open-bracket state machine.
///
/// Idle when `depth == 0`; nested `start_cmd` calls flatten, so only the
/// outermost bracket commits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UndoStack {
    transactions: VecDeque<Transaction>,
    /// Position in `transactions`: everything before it is undoable,
    /// everything at or after it is redoable.
    current_index: usize,
    max_size: usize,
    #[serde(skip)]
    depth: u32,
    #[serde(skip)]
    current: Option<Vec<Change>>,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(400)
    }
}

impl UndoStack {
    pub fn new(max_size: usize) -> Self {
        Self {
            transactions: VecDeque::new(),
            current_index: 0,
            max_size,
            depth: 0,
            current: None,
        }
    }

    pub fn in_cmd(&self) -> bool {
        self.depth > 0
    }

    /// Open a command bracket. Reentrant: an already-open bracket absorbs
    /// the call and only the matching outermost `end_cmd` commits.
    pub fn start_cmd(&mut self) {
        self.depth += 1;
        if self.depth == 1 {
            log::trace!("start_cmd: opening change log");
            self.current = Some(Vec::new());
        }
    }

    /// Close a command bracket. Closing the outermost bracket commits the
    /// change log (if non-empty) as one transaction and clears the redo
    /// history. Unbalanced calls while Idle are no-ops.
    pub fn end_cmd(&mut self) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return;
        }
        let changes = self.current.take().unwrap_or_default();
        if changes.is_empty() {
            return;
        }
        log::debug!("end_cmd: committing {} change(s)", changes.len());
        self.transactions.truncate(self.current_index);
        self.transactions.push_back(Transaction { changes });
        self.current_index = self.transactions.len();
        if self.transactions.len() > self.max_size {
            self.transactions.pop_front();
            self.current_index -= 1;
        }
    }

    /// Append one change to the open log.
    ///
    /// Mutating while Idle is a programming error in correct call
    /// sequences, hence the debug assertion; release builds report it as
    /// an error instead.
    pub fn record(&mut self, change: Change) -> Result<(), EditError> {
        debug_assert!(self.in_cmd(), "mutation outside a command bracket");
        match self.current.as_mut() {
            Some(log) => {
                log.push(change);
                Ok(())
            }
            None => Err(EditError::UncommittedMutation),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index < self.transactions.len()
    }

    /// Step back one transaction, returning a copy of it to replay in
    /// reverse. `None` when there is nothing to undo.
    pub fn pull_undo(&mut self) -> Option<Transaction> {
        if !self.can_undo() {
            return None;
        }
        self.current_index -= 1;
        Some(self.transactions[self.current_index].clone())
    }

    /// Step forward one transaction, returning a copy of it to replay.
    pub fn pull_redo(&mut self) -> Option<Transaction> {
        if !self.can_redo() {
            return None;
        }
        let txn = self.transactions[self.current_index].clone();
        self.current_index += 1;
        Some(txn)
    }

    pub fn undo_count(&self) -> usize {
        self.current_index
    }

    pub fn redo_count(&self) -> usize {
        self.transactions.len() - self.current_index
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
        self.current_index = 0;
        self.depth = 0;
        self.current = None;
    }
}
