//! Diatonic intervals and spelling-aware transposition
//!
//! Transposition here walks letter steps (diatonic) and semitones
//! (chromatic) together, so the resulting spelling is musically correct
//! rather than a modulo-12 respelling.

use serde::{Deserialize, Serialize};

use super::tpc::{
    pitch_to_tpc, step_to_tpc, tpc_to_pitch_class, tpc_to_step, Key, Prefer, STEP_SEMITONES,
};

/// A transposition interval as paired diatonic steps and chromatic
/// semitones, both non-negative; direction is supplied at the call site.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub diatonic: i32,
    pub chromatic: i32,
}

impl Interval {
    pub fn new(diatonic: i32, chromatic: i32) -> Self {
        Self { diatonic, chromatic }
    }

    pub fn is_zero(&self) -> bool {
        self.diatonic == 0 && self.chromatic == 0
    }

    /// Interval for a 1-based ordinal (1 = unison .. 8 = octave), using the
    /// perfect/major quality for each.
    pub fn from_ordinal(ordinal: i32) -> Self {
        const TABLE: [(i32, i32); 8] = [
            (0, 0),  // unison
            (1, 2),  // major second
            (2, 4),  // major third
            (3, 5),  // perfect fourth
            (4, 7),  // perfect fifth
            (5, 9),  // major sixth
            (6, 11), // major seventh
            (7, 12), // octave
        ];
        let idx = ordinal.clamp(1, 8) as usize - 1;
        let (d, c) = TABLE[idx];
        Interval::new(d, c)
    }
}

/// Transpose a tpc by an interval, keeping the letter-step movement
/// diatonic. When the exact spelling would need more than a double
/// accidental, fall back to the nearest spelling of the target pitch
/// class.
pub fn transpose_tpc(tpc: i32, interval: Interval, up: bool) -> i32 {
    if interval.is_zero() {
        return tpc;
    }
    let (dsteps, dsemis) = if up {
        (interval.diatonic, interval.chromatic)
    } else {
        (-interval.diatonic, -interval.chromatic)
    };

    let old_step = tpc_to_step(tpc);
    let old_pc = tpc_to_pitch_class(tpc);
    let new_step = (old_step + dsteps).rem_euclid(7);
    let new_pc = (old_pc + dsemis).rem_euclid(12);

    // Alteration that places the new letter on the new pitch class,
    // reduced to the nearest representative.
    let mut alter = (new_pc - STEP_SEMITONES[new_step as usize]).rem_euclid(12);
    if alter > 6 {
        alter -= 12;
    }
    if alter.abs() > 2 {
        return pitch_to_tpc(new_pc, Key::C, Prefer::Nearest);
    }
    step_to_tpc(new_step, alter)
}
