//! BB84 key-exchange simulation and QBER gating.
//!
//! Simulates the prepare-and-measure BB84 protocol between Alice and Bob
//! over a channel that may be attacked by an intercept-resend adversary
//! and may flip bits:
//!
//! - **Round simulation** with fully seeded randomness ([`simulate_bb84`])
//! - **Sifting** on the public basis comparison and **QBER** estimation,
//!   with an explicit [`Qber::NoSiftedBits`] marker
//! - **Decision gate** against the 0.11 intercept-resend bound
//! - **Sweeps**: QBER vs. attack probability, QBER heatmaps, and
//!   attack-free key collection
//!
//! # Quick start
//!
//! ```rust
//! use qpipe_qkd::{Qber, decision_gate, simulate_bb84};
//!
//! let session = simulate_bb84(1000, 0.0, 0.0, 1).unwrap();
//! assert_eq!(session.qber, Qber::Rate(0.0));
//! assert!(decision_gate(0.0));
//!
//! let attacked = simulate_bb84(1000, 1.0, 0.0, 1).unwrap();
//! assert!(attacked.qber.rate().unwrap() > 0.15);
//! ```

pub mod error;
pub mod gate;
pub mod round;
pub mod sifting;
pub mod simulator;
pub mod sweep;

pub use error::{QkdError, QkdResult};
pub use gate::{QBER_THRESHOLD, decision_gate};
pub use round::{Basis, Bb84Round, Interception};
pub use sifting::{Qber, SiftedKey, estimate_qber, sift};
pub use simulator::{Bb84Channel, Bb84Session, bit_walkthrough, simulate_bb84};
pub use sweep::{
    CollectedKey, QberHeatmap, SweepPoint, collect_key, eve_sweep, key_session_seed, linspace,
    qber_heatmap,
};
