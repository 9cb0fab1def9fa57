//! Variational ground-state energy of the two-qubit H2 model.
//!
//! - **Hamiltonian table**: bond length → Pauli coefficients and a dense
//!   4×4 Hermitian matrix ([`H2Hamiltonian`])
//! - **Exact solver**: Jacobi diagonalization of Hermitian matrices
//!   ([`ground_state_energy`])
//! - **Ansatz**: hardware-efficient RY/RZ + CX state preparation as a
//!   direct state-vector transform ([`prepare_state`], [`energy`])
//! - **Optimizer**: BFGS with numerical gradients ([`Bfgs`])
//! - **Curve**: VQE vs. exact energies over a bond-length grid
//!   ([`compute_vqe_curve`])
//!
//! # Example
//!
//! ```rust
//! use qpipe_vqe::{H2Hamiltonian, ground_state_energy};
//!
//! let h = H2Hamiltonian::new(0.735).unwrap();
//! let e0 = ground_state_energy(&h.matrix()).unwrap();
//! assert!(e0 < -1.2 && e0 > -1.4);
//! ```
//!
//! # Features
//!
//! - `parallel`: evaluate bond lengths on the rayon thread pool. Each
//!   point's seed depends only on its index, so results are unchanged.

pub mod ansatz;
pub mod curve;
pub mod error;
pub mod exact;
pub mod hamiltonian;
pub mod optimizer;

pub use ansatz::{
    AnsatzState, SanityOutcome, energy, hadamard_sanity, num_parameters, prepare_state,
};
pub use curve::{VqePoint, compute_vqe_curve, initial_parameters, solve_point};
pub use error::{VqeError, VqeResult};
pub use exact::{eigenvalues, ground_state_energy};
pub use hamiltonian::{H2Hamiltonian, Pauli, PauliHamiltonian, PauliTerm};
pub use optimizer::{Bfgs, OptimizationResult, Optimizer};
