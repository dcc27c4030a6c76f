//! Editable document core of a music notation engine
//!
//! Four layers, leaves first: the generic property store on every
//! element, pure tonal-spelling functions, the transactional command
//! engine every mutation routes through, and the duration-splitting
//! engine that turns a requested note length into a correctly tied
//! sequence of notated fragments.

pub mod entry;
pub mod models;
pub mod pitch;
pub mod rw;
pub mod undo;

// Re-export commonly used types
pub use models::*;
pub use pitch::{tpc_to_degree, Interval, Key};
pub use undo::UndoStack;
