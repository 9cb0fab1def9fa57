//! Tests for BB84 session simulation.

use qpipe_qkd::{Basis, Interception, Qber, QkdError, simulate_bb84};

// ---------------------------------------------------------------------------
// Reference scenarios
// ---------------------------------------------------------------------------

#[test]
fn attack_free_noiseless_channel_has_zero_qber() {
    let session = simulate_bb84(1000, 0.0, 0.0, 1).unwrap();
    assert_eq!(session.qber, Qber::Rate(0.0));
    assert_eq!(session.errors(), 0);
    assert!(session.kept() > 0);
}

#[test]
fn full_interception_elevates_qber() {
    let session = simulate_bb84(1000, 1.0, 0.0, 1).unwrap();
    let rate = session.qber.rate().unwrap();
    assert!(rate > 0.15 && rate < 0.35, "qber {rate} not near 0.25");
    assert_eq!(session.intercepted(), 1000);
}

#[test]
fn full_interception_qber_exceeds_threshold_at_scale() {
    let session = simulate_bb84(20_000, 1.0, 0.0, 1).unwrap();
    let rate = session.qber.rate().unwrap();
    assert!(rate > 0.2, "qber {rate} should approach 0.25");
}

#[test]
fn noise_alone_tracks_flip_probability() {
    let session = simulate_bb84(20_000, 0.0, 0.1, 3).unwrap();
    let rate = session.qber.rate().unwrap();
    assert!((rate - 0.1).abs() < 0.02, "qber {rate} should be near 0.1");
}

// ---------------------------------------------------------------------------
// Reproducibility
// ---------------------------------------------------------------------------

#[test]
fn identical_arguments_give_identical_sessions() {
    let a = simulate_bb84(2048, 0.3, 0.05, 99).unwrap();
    let b = simulate_bb84(2048, 0.3, 0.05, 99).unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_seeds_give_different_sessions() {
    let a = simulate_bb84(256, 0.0, 0.0, 1).unwrap();
    let b = simulate_bb84(256, 0.0, 0.0, 2).unwrap();
    assert_ne!(a.rounds, b.rounds);
}

#[test]
fn alice_choices_do_not_depend_on_attack_probability() {
    // The draw layout is fixed, so Alice's and Bob's choices line up.
    let clean = simulate_bb84(512, 0.0, 0.0, 17).unwrap();
    let attacked = simulate_bb84(512, 1.0, 0.2, 17).unwrap();
    for (c, a) in clean.rounds.iter().zip(&attacked.rounds) {
        assert_eq!(c.alice_bit, a.alice_bit);
        assert_eq!(c.alice_basis, a.alice_basis);
        assert_eq!(c.bob_basis, a.bob_basis);
        assert_eq!(c.kept, a.kept);
    }
}

// ---------------------------------------------------------------------------
// Round semantics
// ---------------------------------------------------------------------------

#[test]
fn eve_in_matching_basis_is_invisible_without_noise() {
    let session = simulate_bb84(4000, 1.0, 0.0, 21).unwrap();
    for r in session.rounds.iter().filter(|r| r.kept) {
        if let Interception::InterceptResend { basis, measured } = r.interception {
            if basis == r.alice_basis {
                assert_eq!(measured, r.alice_bit);
                assert_eq!(r.bob_bit, r.alice_bit);
            }
        }
    }
}

#[test]
fn bob_recovers_flipped_bit_in_transmitted_basis() {
    let session = simulate_bb84(2000, 0.0, 1.0, 8).unwrap();
    for r in session.rounds.iter().filter(|r| r.bob_basis == r.transmitted_basis()) {
        assert_eq!(r.bob_bit, r.alice_bit ^ 1);
    }
}

#[test]
fn both_bases_are_used() {
    let session = simulate_bb84(256, 0.0, 0.0, 5).unwrap();
    assert!(session.rounds.iter().any(|r| r.alice_basis == Basis::Z));
    assert!(session.rounds.iter().any(|r| r.alice_basis == Basis::X));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn nan_probability_is_invalid() {
    assert!(matches!(
        simulate_bb84(10, f64::NAN, 0.0, 1),
        Err(QkdError::InvalidProbability { .. })
    ));
}

#[test]
fn zero_rounds_is_undefined_not_zero() {
    let session = simulate_bb84(0, 0.0, 0.0, 1).unwrap();
    assert_eq!(session.qber, Qber::NoSiftedBits);
    assert_ne!(session.qber, Qber::Rate(0.0));
}
