//! BB84 round simulation with an intercept-resend adversary.
//!
//! Each round consumes exactly eight draws from the session RNG, in a
//! fixed order, whatever the attack and noise probabilities are:
//!
//! | # | draw                     |
//! |---|--------------------------|
//! | 1 | Alice's bit              |
//! | 2 | Alice's basis            |
//! | 3 | Bob's basis              |
//! | 4 | Eve event, `u < p_eve`   |
//! | 5 | Eve's basis              |
//! | 6 | Eve's outcome coin       |
//! | 7 | noise event, `u < p_noise` |
//! | 8 | Bob's outcome coin       |
//!
//! Fixing the layout keeps sessions with the same seed aligned round by
//! round across different `p_eve` / `p_noise` values.
//!
//! Measuring a state in the basis it was prepared in returns the encoded
//! bit; measuring in the other basis returns a uniformly random bit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QkdResult, check_probability};
use crate::round::{Basis, Bb84Round, Interception};
use crate::sifting::{Qber, SiftedKey, estimate_qber, sift};

/// Channel model: adversary interception and bit-flip noise probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bb84Channel {
    p_eve: f64,
    p_noise: f64,
}

impl Bb84Channel {
    /// Validate and build a channel model.
    pub fn new(p_eve: f64, p_noise: f64) -> QkdResult<Self> {
        check_probability("p_eve", p_eve)?;
        check_probability("p_noise", p_noise)?;
        Ok(Self { p_eve, p_noise })
    }

    /// An attack-free, noiseless channel.
    pub fn ideal() -> Self {
        Self {
            p_eve: 0.0,
            p_noise: 0.0,
        }
    }

    /// Probability that Eve intercepts a round.
    pub fn p_eve(&self) -> f64 {
        self.p_eve
    }

    /// Probability that the channel flips a bit.
    pub fn p_noise(&self) -> f64 {
        self.p_noise
    }

    /// Simulate one round, consuming exactly eight draws from `rng`.
    pub fn simulate_round<R: Rng>(&self, rng: &mut R) -> Bb84Round {
        let alice_bit = u8::from(rng.r#gen::<bool>());
        let alice_basis = Basis::from_coin(rng.r#gen());
        let bob_basis = Basis::from_coin(rng.r#gen());
        let eve_event = rng.r#gen::<f64>() < self.p_eve;
        let eve_basis = Basis::from_coin(rng.r#gen());
        let eve_coin = u8::from(rng.r#gen::<bool>());
        let noise_flipped = rng.r#gen::<f64>() < self.p_noise;
        let bob_coin = u8::from(rng.r#gen::<bool>());

        let (interception, sent_bit, sent_basis) = if eve_event {
            let measured = measure(alice_bit, alice_basis, eve_basis, eve_coin);
            (
                Interception::InterceptResend {
                    basis: eve_basis,
                    measured,
                },
                measured,
                eve_basis,
            )
        } else {
            (Interception::None, alice_bit, alice_basis)
        };

        let received_bit = sent_bit ^ u8::from(noise_flipped);
        let bob_bit = measure(received_bit, sent_basis, bob_basis, bob_coin);

        Bb84Round {
            alice_bit,
            alice_basis,
            bob_basis,
            bob_bit,
            interception,
            noise_flipped,
            kept: alice_basis == bob_basis,
        }
    }

    /// Simulate `n` rounds with the supplied RNG.
    pub fn simulate_with_rng<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<Bb84Round> {
        (0..n).map(|_| self.simulate_round(rng)).collect()
    }
}

/// Outcome of measuring a qubit prepared as (`bit`, `prepared`) in `basis`.
fn measure(bit: u8, prepared: Basis, basis: Basis, coin: u8) -> u8 {
    if prepared == basis { bit } else { coin }
}

/// A complete simulated BB84 exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bb84Session {
    /// Number of transmitted rounds.
    pub n: usize,
    /// Interception probability used.
    pub p_eve: f64,
    /// Bit-flip probability used.
    pub p_noise: f64,
    /// Seed the session RNG was built from.
    pub seed: u64,
    /// Every round, in transmission order.
    pub rounds: Vec<Bb84Round>,
    /// Estimated QBER over the kept rounds.
    pub qber: Qber,
    /// Basis-matched bits of both parties.
    pub sifted: SiftedKey,
}

impl Bb84Session {
    /// Number of kept (basis-matched) rounds.
    pub fn kept(&self) -> usize {
        self.sifted.len()
    }

    /// Number of kept rounds with disagreeing bits.
    pub fn errors(&self) -> usize {
        self.sifted.mismatches()
    }

    /// Number of rounds Eve intercepted.
    pub fn intercepted(&self) -> usize {
        self.rounds.iter().filter(|r| r.eve_intercepted()).count()
    }

    /// Number of rounds the channel flipped.
    pub fn noise_flips(&self) -> usize {
        self.rounds.iter().filter(|r| r.noise_flipped).count()
    }

    /// Sifted fraction of the raw rounds (0 for an empty session).
    pub fn sift_ratio(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.kept() as f64 / self.n as f64
        }
    }
}

/// Simulate a seeded BB84 session of `n` rounds.
///
/// Probabilities are validated before any randomness is consumed. `n = 0`
/// yields an empty session whose QBER is [`Qber::NoSiftedBits`].
pub fn simulate_bb84(n: usize, p_eve: f64, p_noise: f64, seed: u64) -> QkdResult<Bb84Session> {
    let channel = Bb84Channel::new(p_eve, p_noise)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let rounds = channel.simulate_with_rng(n, &mut rng);
    let sifted = sift(&rounds);
    let qber = estimate_qber(&sifted);

    debug!(
        n,
        p_eve,
        p_noise,
        seed,
        kept = sifted.len(),
        errors = sifted.mismatches(),
        %qber,
        "simulated BB84 session"
    );

    Ok(Bb84Session {
        n,
        p_eve,
        p_noise,
        seed,
        rounds,
        qber,
        sifted,
    })
}

/// Round-by-round record of a session, exactly `n` entries long.
pub fn bit_walkthrough(n: usize, p_eve: f64, p_noise: f64, seed: u64) -> QkdResult<Vec<Bb84Round>> {
    let channel = Bb84Channel::new(p_eve, p_noise)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(channel.simulate_with_rng(n, &mut rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QkdError;

    /// RNG that replays a scripted sequence of `u64` words.
    struct Scripted(std::vec::IntoIter<u64>);

    impl rand::RngCore for Scripted {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }
        fn next_u64(&mut self) -> u64 {
            self.0.next().expect("script exhausted")
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let word = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&word[..chunk.len()]);
            }
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn test_invalid_probabilities_rejected() {
        assert!(matches!(
            simulate_bb84(10, 1.5, 0.0, 1),
            Err(QkdError::InvalidProbability { name: "p_eve", .. })
        ));
        assert!(matches!(
            simulate_bb84(10, 0.0, -0.1, 1),
            Err(QkdError::InvalidProbability { name: "p_noise", .. })
        ));
    }

    #[test]
    fn test_empty_session() {
        let s = simulate_bb84(0, 0.3, 0.1, 9).unwrap();
        assert!(s.rounds.is_empty());
        assert_eq!(s.qber, Qber::NoSiftedBits);
        assert_eq!(s.sift_ratio(), 0.0);
    }

    #[test]
    fn test_ideal_channel_has_no_errors() {
        let s = simulate_bb84(500, 0.0, 0.0, 4).unwrap();
        assert_eq!(s.qber, Qber::Rate(0.0));
        assert_eq!(s.intercepted(), 0);
        assert_eq!(s.noise_flips(), 0);
    }

    #[test]
    fn test_round_consumes_eight_draws() {
        // Eight words for the first round, one sentinel left afterwards.
        let mut rng = Scripted(vec![0; 9].into_iter());
        let _ = Bb84Channel::ideal().simulate_round(&mut rng);
        assert_eq!(rng.0.len(), 1);
    }

    #[test]
    fn test_same_basis_measurement_is_deterministic() {
        assert_eq!(measure(1, Basis::X, Basis::X, 0), 1);
        assert_eq!(measure(0, Basis::Z, Basis::Z, 1), 0);
        assert_eq!(measure(1, Basis::Z, Basis::X, 0), 0);
    }

    #[test]
    fn test_full_noise_flips_every_kept_bit() {
        let s = simulate_bb84(400, 0.0, 1.0, 11).unwrap();
        assert_eq!(s.qber, Qber::Rate(1.0));
        assert_eq!(s.noise_flips(), 400);
    }

    #[test]
    fn test_kept_uses_alice_original_basis() {
        let s = simulate_bb84(300, 1.0, 0.0, 5).unwrap();
        for r in &s.rounds {
            assert_eq!(r.kept, r.alice_basis == r.bob_basis);
            assert!(r.eve_intercepted());
        }
    }

    #[test]
    fn test_walkthrough_matches_session_rounds() {
        let s = simulate_bb84(64, 0.5, 0.05, 77).unwrap();
        let w = bit_walkthrough(64, 0.5, 0.05, 77).unwrap();
        assert_eq!(w.len(), 64);
        assert_eq!(w, s.rounds);
    }
}
