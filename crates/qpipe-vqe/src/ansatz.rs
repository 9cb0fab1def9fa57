//! Hardware-efficient two-qubit ansatz as a direct state-vector transform.
//!
//! Starting from |00⟩ the ansatz applies `reps` blocks of
//! [RY, RZ on each qubit → CX(0→1)] and closes with one more rotation
//! layer. Each rotation layer consumes four angles, in the order
//! `RY(q0), RY(q1), RZ(q0), RZ(q1)`, so a depth-`reps` ansatz has
//! `4·(reps + 1)` parameters.
//!
//! Gate kernels act in place on little-endian amplitudes
//! (`i = q0 + 2·q1`).

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex64;

use crate::error::{VqeError, VqeResult};
use crate::hamiltonian::PauliHamiltonian;

/// Number of qubits the ansatz acts on.
pub const NUM_QUBITS: usize = 2;

/// Normalized two-qubit state vector.
pub type AnsatzState = [Complex64; 4];

const ANGLES_PER_LAYER: usize = 2 * NUM_QUBITS;

/// Parameter count for a depth-`reps` ansatz.
pub fn num_parameters(reps: usize) -> usize {
    ANGLES_PER_LAYER * (reps + 1)
}

/// The computational basis state |00⟩.
pub fn reference_state() -> AnsatzState {
    let zero = Complex64::new(0.0, 0.0);
    [Complex64::new(1.0, 0.0), zero, zero, zero]
}

/// Build the ansatz state for `theta`.
pub fn prepare_state(theta: &[f64], reps: usize) -> VqeResult<AnsatzState> {
    check_parameters(theta, reps)?;
    Ok(evolve(theta, reps))
}

/// ⟨ψ(θ)|H|ψ(θ)⟩ for the depth-`reps` ansatz.
pub fn energy(theta: &[f64], reps: usize, hamiltonian: &PauliHamiltonian) -> VqeResult<f64> {
    let state = prepare_state(theta, reps)?;
    Ok(hamiltonian.expectation(&state))
}

/// Squared norm of a state.
pub fn norm_sqr(state: &[Complex64]) -> f64 {
    state.iter().map(|a| a.norm_sqr()).sum()
}

fn check_parameters(theta: &[f64], reps: usize) -> VqeResult<()> {
    let expected = num_parameters(reps);
    if theta.len() != expected {
        return Err(VqeError::InvalidParameter(format!(
            "ansatz with reps={reps} takes {expected} parameters, got {}",
            theta.len()
        )));
    }
    Ok(())
}

/// Apply the circuit; `theta` must already have the right length.
pub(crate) fn evolve(theta: &[f64], reps: usize) -> AnsatzState {
    let mut state = reference_state();
    let mut layers = theta.chunks_exact(ANGLES_PER_LAYER);

    for layer in layers.by_ref().take(reps) {
        rotation_layer(&mut state, layer);
        apply_cx(&mut state, 0, 1);
    }
    if let Some(layer) = layers.next() {
        rotation_layer(&mut state, layer);
    }
    state
}

fn rotation_layer(state: &mut [Complex64], angles: &[f64]) {
    for q in 0..NUM_QUBITS {
        apply_ry(state, q, angles[q]);
    }
    for q in 0..NUM_QUBITS {
        apply_rz(state, q, angles[NUM_QUBITS + q]);
    }
}

/// Hadamard on qubit `q`.
pub fn apply_h(state: &mut [Complex64], q: usize) {
    for i in 0..state.len() {
        if (i >> q) & 1 == 0 {
            let j = i | (1 << q);
            let (a, b) = (state[i], state[j]);
            state[i] = (a + b) * FRAC_1_SQRT_2;
            state[j] = (a - b) * FRAC_1_SQRT_2;
        }
    }
}

/// RY(θ) on qubit `q`.
pub fn apply_ry(state: &mut [Complex64], q: usize, theta: f64) {
    let (s, c) = (theta / 2.0).sin_cos();
    for i in 0..state.len() {
        if (i >> q) & 1 == 0 {
            let j = i | (1 << q);
            let (a, b) = (state[i], state[j]);
            state[i] = a * c - b * s;
            state[j] = a * s + b * c;
        }
    }
}

/// RZ(θ) on qubit `q`.
pub fn apply_rz(state: &mut [Complex64], q: usize, theta: f64) {
    let phase0 = Complex64::from_polar(1.0, -theta / 2.0);
    let phase1 = Complex64::from_polar(1.0, theta / 2.0);
    for (i, amp) in state.iter_mut().enumerate() {
        *amp *= if (i >> q) & 1 == 0 { phase0 } else { phase1 };
    }
}

/// CX with the given control and target.
pub fn apply_cx(state: &mut [Complex64], control: usize, target: usize) {
    for i in 0..state.len() {
        if (i >> control) & 1 == 1 && (i >> target) & 1 == 0 {
            state.swap(i, i | (1 << target));
        }
    }
}

/// Result of the H·H|0⟩ simulator self-check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SanityOutcome {
    /// Most likely Z-basis outcome.
    pub outcome: u8,
    /// Probability of measuring 1.
    pub p_one: f64,
}

impl SanityOutcome {
    /// True when the kernels returned |0⟩ deterministically.
    pub fn passed(&self) -> bool {
        self.outcome == 0 && self.p_one < 1e-12
    }
}

/// Apply H twice to |0⟩ and measure in Z; a correct simulator yields 0.
pub fn hadamard_sanity() -> SanityOutcome {
    let mut state = [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
    apply_h(&mut state, 0);
    apply_h(&mut state, 0);
    let p_one = state[1].norm_sqr();
    SanityOutcome {
        outcome: u8::from(p_one > 0.5),
        p_one,
    }
}
