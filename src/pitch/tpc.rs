//! Tonal pitch classes and pure spelling functions
//!
//! A tonal pitch class (tpc) is a spelling-aware pitch identity positioned
//! on the circle of fifths: C♯ and D♭ sound alike but carry different tpc
//! values. Stepping +1 in tpc space moves one fifth sharpward; every letter
//! name with a given alteration occupies a contiguous run of seven values.
//!
//! All functions here are pure and total over the defined tpc range.

use serde::{Deserialize, Serialize};

pub const TPC_MIN: i32 = -1; // F double-flat
pub const TPC_MAX: i32 = 33; // B double-sharp
pub const TPC_INVALID: i32 = -9;

pub const TPC_F_B: i32 = 6;
pub const TPC_C_B: i32 = 7;
pub const TPC_G_B: i32 = 8;
pub const TPC_D_B: i32 = 9;
pub const TPC_A_B: i32 = 10;
pub const TPC_E_B: i32 = 11;
pub const TPC_B_B: i32 = 12;
pub const TPC_F: i32 = 13;
pub const TPC_C: i32 = 14;
pub const TPC_G: i32 = 15;
pub const TPC_D: i32 = 16;
pub const TPC_A: i32 = 17;
pub const TPC_E: i32 = 18;
pub const TPC_B: i32 = 19;
pub const TPC_F_S: i32 = 20;
pub const TPC_C_S: i32 = 21;
pub const TPC_G_S: i32 = 22;
pub const TPC_D_S: i32 = 23;
pub const TPC_A_S: i32 = 24;
pub const TPC_E_S: i32 = 25;
pub const TPC_B_S: i32 = 26;

/// Key signature as a signed count of accidentals: positive sharps,
/// negative flats. C major is 0, C♯ major is +7, C♭ major is -7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key(pub i32);

impl Key {
    pub const C_B: Key = Key(-7);
    pub const C: Key = Key(0);
    pub const G: Key = Key(1);
    pub const D: Key = Key(2);
    pub const C_S: Key = Key(7);

    /// Tpc of the key's tonic. C major sits at TPC_C and each sharp moves
    /// one fifth up the circle.
    pub fn tonic_tpc(self) -> i32 {
        TPC_C + self.0
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::C
    }
}

/// Spelling preference when deriving a tpc from a chromatic pitch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prefer {
    Flats = 8,
    Nearest = 11,
    Sharps = 13,
}

/// Semitone offsets of the natural letters C D E F G A B.
pub(crate) const STEP_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Tpc of each natural letter, indexed by step (0 = C .. 6 = B).
const STEP_TPC: [i32; 7] = [TPC_C, TPC_D, TPC_E, TPC_F, TPC_G, TPC_A, TPC_B];

/// Letter step (0 = C .. 6 = B) of a tpc. Moving one fifth sharpward
/// advances four letter steps.
pub fn tpc_to_step(tpc: i32) -> i32 {
    ((tpc - TPC_C) * 4).rem_euclid(7)
}

/// Alteration of a tpc: 0 natural, +1 sharp, -1 flat, and so on.
pub fn tpc_to_alter(tpc: i32) -> i32 {
    (tpc - TPC_F).div_euclid(7)
}

/// Chromatic pitch class (0 = C .. 11 = B) of a tpc.
pub fn tpc_to_pitch_class(tpc: i32) -> i32 {
    let pc = STEP_SEMITONES[tpc_to_step(tpc) as usize] + tpc_to_alter(tpc);
    pc.rem_euclid(12)
}

/// Tpc of a letter step with an alteration.
pub fn step_to_tpc(step: i32, alter: i32) -> i32 {
    STEP_TPC[step.rem_euclid(7) as usize] + 7 * alter
}

/// Scale degree (0 = tonic .. 6) of a tpc within the diatonic scale of
/// `key`.
///
/// Computed on the circle of fifths, not modulo-12 pitch: one fifth above
/// the tonic is degree 4, so the degree is the fifths-offset from the
/// tonic times four, reduced mod 7. Enharmonically equal spellings of one
/// sounding pitch may land on different degrees, which is the point.
pub fn tpc_to_degree(tpc: i32, key: Key) -> i32 {
    ((tpc - key.tonic_tpc()) * 4).rem_euclid(7)
}

/// Spell a chromatic pitch in a key.
///
/// Closed form over the circle of fifths: the seven tpc values nearest the
/// key signature (shifted by `prefer`) cover all twelve pitch classes, and
/// `pitch * 7` walks the circle.
pub fn pitch_to_tpc(pitch: i32, key: Key, prefer: Prefer) -> i32 {
    let shift = prefer as i32 + key.0;
    (pitch * 7 + 26 - shift).rem_euclid(12) + shift
}
