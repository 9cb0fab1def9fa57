//! Sifting and quantum bit error rate estimation.
//!
//! After transmission Alice and Bob publish their bases and keep only the
//! positions where they agree. The QBER is the disagreement rate over those
//! kept positions. An exchange with no kept positions has no defined QBER;
//! that condition is carried as [`Qber::NoSiftedBits`] instead of a zero.

use serde::{Deserialize, Serialize};

use crate::gate::decision_gate;
use crate::round::Bb84Round;

/// Estimated quantum bit error rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qber {
    /// Fraction of kept rounds with disagreeing bits, in [0, 1].
    Rate(f64),
    /// No round survived sifting.
    NoSiftedBits,
}

impl Qber {
    /// The rate, or `None` if no bits were sifted.
    pub fn rate(&self) -> Option<f64> {
        match self {
            Qber::Rate(r) => Some(*r),
            Qber::NoSiftedBits => None,
        }
    }

    /// True if the rate is defined.
    pub fn is_defined(&self) -> bool {
        matches!(self, Qber::Rate(_))
    }

    /// Apply the decision gate. An undefined QBER never passes.
    pub fn passes_gate(&self) -> bool {
        self.rate().is_some_and(decision_gate)
    }
}

impl std::fmt::Display for Qber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Qber::Rate(r) => write!(f, "{:.4}", r),
            Qber::NoSiftedBits => write!(f, "undefined (no sifted bits)"),
        }
    }
}

/// Alice's and Bob's bits at the basis-matched positions, in round order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiftedKey {
    /// Alice's sifted bits.
    pub alice: Vec<u8>,
    /// Bob's sifted bits.
    pub bob: Vec<u8>,
}

impl SiftedKey {
    /// Number of kept positions.
    pub fn len(&self) -> usize {
        self.alice.len()
    }

    /// True when nothing survived sifting.
    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }

    /// Number of positions where the two parties disagree.
    pub fn mismatches(&self) -> usize {
        self.alice
            .iter()
            .zip(&self.bob)
            .filter(|(a, b)| a != b)
            .count()
    }
}

/// Keep the rounds whose public bases match.
pub fn sift(rounds: &[Bb84Round]) -> SiftedKey {
    let (alice, bob) = rounds
        .iter()
        .filter(|r| r.kept)
        .map(|r| (r.alice_bit, r.bob_bit))
        .unzip();
    SiftedKey { alice, bob }
}

/// Disagreement rate over the sifted positions.
pub fn estimate_qber(key: &SiftedKey) -> Qber {
    if key.is_empty() {
        return Qber::NoSiftedBits;
    }
    Qber::Rate(key.mismatches() as f64 / key.len() as f64)
}
