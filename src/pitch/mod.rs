//! Pitch semantics: tonal pitch classes, keys and interval transposition

pub mod interval;
pub mod tpc;

pub use interval::{transpose_tpc, Interval};
pub use tpc::{pitch_to_tpc, tpc_to_degree, Key, Prefer};
