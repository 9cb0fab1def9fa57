//! Per-round BB84 records.
//!
//! A round captures everything that happened to one transmitted qubit:
//! Alice's preparation, an optional intercept-resend by Eve, an optional
//! channel bit-flip, and Bob's measurement.

use serde::{Deserialize, Serialize};

/// Preparation / measurement basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Computational basis {|0⟩, |1⟩}.
    Z,
    /// Hadamard basis {|+⟩, |−⟩}.
    X,
}

impl Basis {
    /// Map a fair coin to a basis (`false` → Z, `true` → X).
    pub fn from_coin(coin: bool) -> Self {
        if coin { Basis::X } else { Basis::Z }
    }

    /// Short label used in reports.
    pub fn symbol(&self) -> &'static str {
        match self {
            Basis::Z => "Z",
            Basis::X => "X",
        }
    }
}

impl std::fmt::Display for Basis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// What the adversary did to a round's qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interception {
    /// The qubit reached the channel untouched.
    None,
    /// Eve measured in `basis`, obtained `measured`, and resent a fresh
    /// qubit prepared as (`measured`, `basis`).
    InterceptResend {
        /// Basis Eve measured and re-prepared in.
        basis: Basis,
        /// Bit Eve observed and re-encoded.
        measured: u8,
    },
}

/// One simulated BB84 round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bb84Round {
    /// Bit Alice encoded (0 or 1).
    pub alice_bit: u8,
    /// Basis Alice prepared in.
    pub alice_basis: Basis,
    /// Basis Bob measured in.
    pub bob_basis: Basis,
    /// Bit Bob obtained.
    pub bob_bit: u8,
    /// Adversary action on this round.
    pub interception: Interception,
    /// Whether the channel flipped the transmitted bit.
    pub noise_flipped: bool,
    /// Public basis comparison: Alice's original basis equals Bob's.
    pub kept: bool,
}

impl Bb84Round {
    /// True when Eve intercepted and resent this round's qubit.
    pub fn eve_intercepted(&self) -> bool {
        matches!(self.interception, Interception::InterceptResend { .. })
    }

    /// Basis of the qubit that actually entered the channel after Eve.
    pub fn transmitted_basis(&self) -> Basis {
        match self.interception {
            Interception::None => self.alice_basis,
            Interception::InterceptResend { basis, .. } => basis,
        }
    }

    /// True for a kept round where Alice's and Bob's bits disagree.
    pub fn is_error(&self) -> bool {
        self.kept && self.alice_bit != self.bob_bit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(interception: Interception) -> Bb84Round {
        Bb84Round {
            alice_bit: 1,
            alice_basis: Basis::Z,
            bob_basis: Basis::Z,
            bob_bit: 0,
            interception,
            noise_flipped: false,
            kept: true,
        }
    }

    #[test]
    fn test_basis_from_coin() {
        assert_eq!(Basis::from_coin(false), Basis::Z);
        assert_eq!(Basis::from_coin(true), Basis::X);
        assert_eq!(Basis::X.to_string(), "X");
    }

    #[test]
    fn test_transmitted_basis_follows_eve() {
        let clean = round(Interception::None);
        assert!(!clean.eve_intercepted());
        assert_eq!(clean.transmitted_basis(), Basis::Z);

        let attacked = round(Interception::InterceptResend {
            basis: Basis::X,
            measured: 1,
        });
        assert!(attacked.eve_intercepted());
        assert_eq!(attacked.transmitted_basis(), Basis::X);
    }

    #[test]
    fn test_error_requires_kept() {
        let mut r = round(Interception::None);
        assert!(r.is_error());
        r.kept = false;
        assert!(!r.is_error());
    }
}
