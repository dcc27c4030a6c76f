//! Notated durations and the representable-duration vocabulary
//!
//! Tick positions and lengths are exact rationals measured in whole notes
//! (a quarter note is 1/4, a breve is 2/1). Notated lengths are not
//! arbitrary rationals: they are drawn from a finite ordered vocabulary of
//! power-of-two base lengths, optionally extended by one dot.

use num_rational::Rational32;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Exact tick arithmetic, in units of a whole note.
pub type Fraction = Rational32;

/// Base notated length, longest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DurationType {
    Long,
    Breve,
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
    OneHundredTwentyEighth,
}

impl DurationType {
    pub const ALL: &'static [DurationType] = &[
        DurationType::Long,
        DurationType::Breve,
        DurationType::Whole,
        DurationType::Half,
        DurationType::Quarter,
        DurationType::Eighth,
        DurationType::Sixteenth,
        DurationType::ThirtySecond,
        DurationType::SixtyFourth,
        DurationType::OneHundredTwentyEighth,
    ];

    /// Undotted length of this duration type.
    pub fn fraction(self) -> Fraction {
        match self {
            DurationType::Long => Fraction::new(4, 1),
            DurationType::Breve => Fraction::new(2, 1),
            DurationType::Whole => Fraction::new(1, 1),
            DurationType::Half => Fraction::new(1, 2),
            DurationType::Quarter => Fraction::new(1, 4),
            DurationType::Eighth => Fraction::new(1, 8),
            DurationType::Sixteenth => Fraction::new(1, 16),
            DurationType::ThirtySecond => Fraction::new(1, 32),
            DurationType::SixtyFourth => Fraction::new(1, 64),
            DurationType::OneHundredTwentyEighth => Fraction::new(1, 128),
        }
    }
}

/// A notated duration: base type plus dot count (at most one dot).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TDuration {
    pub duration_type: DurationType,
    pub dots: u8,
}

impl TDuration {
    pub fn new(duration_type: DurationType) -> Self {
        Self { duration_type, dots: 0 }
    }

    pub fn dotted(duration_type: DurationType) -> Self {
        Self { duration_type, dots: 1 }
    }

    /// Exact length in whole notes, including the dot.
    pub fn ticks(&self) -> Fraction {
        let base = self.duration_type.fraction();
        if self.dots == 0 {
            base
        } else {
            base * Fraction::new(3, 2)
        }
    }
}

impl From<DurationType> for TDuration {
    fn from(duration_type: DurationType) -> Self {
        TDuration::new(duration_type)
    }
}

/// The smallest representable length; every legal tick position is a
/// multiple of it, which is what guarantees the splitting loop terminates.
pub const SMALLEST_UNIT: (i32, i32) = (1, 128);

pub fn smallest_unit() -> Fraction {
    Fraction::new(SMALLEST_UNIT.0, SMALLEST_UNIT.1)
}

/// Full representable vocabulary, dotted forms interleaved, longest first.
/// The dotted 128th is omitted: a dot below the smallest unit is not
/// representable on the tick grid.
static VOCABULARY: Lazy<Vec<TDuration>> = Lazy::new(|| {
    let mut v = Vec::new();
    for &dt in DurationType::ALL {
        if dt != DurationType::OneHundredTwentyEighth {
            v.push(TDuration::dotted(dt));
        }
        v.push(TDuration::new(dt));
    }
    v.sort_by(|a, b| b.ticks().cmp(&a.ticks()));
    v
});

/// Largest representable duration whose length is at most `limit`.
///
/// Returns `None` when `limit` is below the smallest unit.
pub fn max_fitting(limit: Fraction) -> Option<TDuration> {
    VOCABULARY.iter().copied().find(|d| d.ticks() <= limit)
}

/// Greedy decomposition of `len` into representable durations, longest
/// first. `len` must be a non-negative multiple of the smallest unit.
pub fn to_duration_list(mut len: Fraction) -> Vec<TDuration> {
    let mut out = Vec::new();
    while len > Fraction::new(0, 1) {
        match max_fitting(len) {
            Some(d) => {
                out.push(d);
                len -= d.ticks();
            }
            None => break,
        }
    }
    out
}
