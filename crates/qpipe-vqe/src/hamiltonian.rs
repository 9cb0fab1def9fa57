//! Pauli Hamiltonians and the tabulated two-qubit H2 model.
//!
//! A Hamiltonian is represented as a sum of Pauli strings:
//! H = Σᵢ cᵢ Pᵢ
//! where each Pᵢ is a tensor product of Pauli operators. Basis states are
//! indexed little-endian, `i = q0 + 2·q1`.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{VqeError, VqeResult};

/// A single Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity operator.
    I,
    /// Pauli-X operator.
    X,
    /// Pauli-Y operator.
    Y,
    /// Pauli-Z operator.
    Z,
}

impl std::fmt::Display for Pauli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Pauli::I => "I",
            Pauli::X => "X",
            Pauli::Y => "Y",
            Pauli::Z => "Z",
        };
        write!(f, "{name}")
    }
}

/// A single term cᵢ · (P₀ ⊗ P₁ ⊗ ...).
///
/// Only non-identity operators are stored; an empty list is the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliTerm {
    /// The coefficient of this term.
    pub coefficient: f64,
    /// The non-identity Pauli operators, as (qubit_index, pauli).
    pub operators: Vec<(usize, Pauli)>,
}

impl PauliTerm {
    /// Create a new Pauli term.
    pub fn new(coefficient: f64, operators: Vec<(usize, Pauli)>) -> Self {
        Self {
            coefficient,
            operators,
        }
    }

    /// Create an identity term (scalar).
    pub fn identity(coefficient: f64) -> Self {
        Self::new(coefficient, vec![])
    }

    /// Create a single-qubit Z term.
    pub fn z(coefficient: f64, qubit: usize) -> Self {
        Self::new(coefficient, vec![(qubit, Pauli::Z)])
    }

    /// Create a ZZ term.
    pub fn zz(coefficient: f64, qubit1: usize, qubit2: usize) -> Self {
        Self::new(coefficient, vec![(qubit1, Pauli::Z), (qubit2, Pauli::Z)])
    }

    /// Create an XX term.
    pub fn xx(coefficient: f64, qubit1: usize, qubit2: usize) -> Self {
        Self::new(coefficient, vec![(qubit1, Pauli::X), (qubit2, Pauli::X)])
    }

    /// Create a YY term.
    pub fn yy(coefficient: f64, qubit1: usize, qubit2: usize) -> Self {
        Self::new(coefficient, vec![(qubit1, Pauli::Y), (qubit2, Pauli::Y)])
    }

    /// Check if this is an identity term.
    pub fn is_identity(&self) -> bool {
        self.operators.is_empty()
    }

    /// Get the maximum qubit index.
    pub fn max_qubit(&self) -> Option<usize> {
        self.operators.iter().map(|(q, _)| *q).max()
    }

    /// Apply the Pauli string to basis state `index`.
    ///
    /// Returns `(j, phase)` with `P|index⟩ = phase·|j⟩`.
    pub fn apply_to_basis(&self, index: usize) -> (usize, Complex64) {
        let mut new_index = index;
        let mut phase = Complex64::new(1.0, 0.0);

        for &(qubit, pauli) in &self.operators {
            let bit = (index >> qubit) & 1;
            match pauli {
                Pauli::I => {}
                Pauli::X => new_index ^= 1 << qubit,
                Pauli::Y => {
                    new_index ^= 1 << qubit;
                    phase *= if bit == 0 {
                        Complex64::i()
                    } else {
                        -Complex64::i()
                    };
                }
                Pauli::Z => {
                    if bit == 1 {
                        phase = -phase;
                    }
                }
            }
        }

        (new_index, phase)
    }
}

impl std::fmt::Display for PauliTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.coefficient >= 0.0 {
            write!(f, "+{:.4} ", self.coefficient)?;
        } else {
            write!(f, "{:.4} ", self.coefficient)?;
        }

        if self.operators.is_empty() {
            write!(f, "I")?;
        } else {
            for (i, (qubit, pauli)) in self.operators.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}[{}]", pauli, qubit)?;
            }
        }
        Ok(())
    }
}

/// A Hamiltonian represented as a sum of Pauli terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliHamiltonian {
    /// The terms in the Hamiltonian.
    pub terms: Vec<PauliTerm>,
}

impl PauliHamiltonian {
    /// Create a new Hamiltonian from a list of terms.
    pub fn new(terms: Vec<PauliTerm>) -> Self {
        Self { terms }
    }

    /// Get the number of terms.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Get the number of qubits needed.
    pub fn num_qubits(&self) -> usize {
        self.terms
            .iter()
            .filter_map(|t| t.max_qubit())
            .max()
            .map(|m| m + 1)
            .unwrap_or(0)
    }

    /// Get the identity coefficient (if any).
    pub fn identity_coefficient(&self) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.is_identity())
            .map(|t| t.coefficient)
            .sum()
    }

    /// Dense matrix over `num_qubits` qubits.
    ///
    /// Column `i` holds the image of basis state `|i⟩`.
    pub fn to_matrix(&self, num_qubits: usize) -> Array2<Complex64> {
        let dim = 1usize << num_qubits;
        let mut matrix = Array2::<Complex64>::zeros((dim, dim));
        for term in &self.terms {
            for i in 0..dim {
                let (j, phase) = term.apply_to_basis(i);
                matrix[[j, i]] += phase * term.coefficient;
            }
        }
        matrix
    }

    /// Real expectation value ⟨ψ|H|ψ⟩ of a state vector.
    pub fn expectation(&self, statevector: &[Complex64]) -> f64 {
        let mut energy = 0.0;
        for term in &self.terms {
            let mut term_value = Complex64::new(0.0, 0.0);
            for (i, &amplitude) in statevector.iter().enumerate() {
                let (j, phase) = term.apply_to_basis(i);
                term_value += statevector[j].conj() * phase * amplitude;
            }
            energy += term.coefficient * term_value.re;
        }
        energy
    }
}

impl std::fmt::Display for PauliHamiltonian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Hamiltonian ({} terms, {} qubits):",
            self.num_terms(),
            self.num_qubits()
        )?;
        for term in &self.terms {
            writeln!(f, "  {}", term)?;
        }
        Ok(())
    }
}

/// Tabulated H2 coefficients (STO-3G, two-qubit reduction), in Hartree.
///
/// Rows are `(r, g0, g1, g2, g3, g4, g5)` with r in Å, strictly increasing.
const H2_TABLE: [(f64, f64, f64, f64, f64, f64, f64); 11] = [
    (0.30, 0.2252, -0.5069, -0.5069, 0.1809, 0.0453, 0.0453),
    (0.50, -0.4804, -0.2280, -0.2280, 0.1792, 0.0888, 0.0888),
    (0.70, -0.8624, -0.0826, -0.0826, 0.1716, 0.1194, 0.1194),
    (0.735, -0.8979, -0.0529, -0.0529, 0.1699, 0.1218, 0.1218),
    (0.80, -0.9256, -0.0217, -0.0217, 0.1678, 0.1239, 0.1239),
    (1.00, -0.9924, 0.0548, 0.0548, 0.1594, 0.1265, 0.1265),
    (1.20, -1.0105, 0.1073, 0.1073, 0.1519, 0.1237, 0.1237),
    (1.50, -1.0010, 0.1582, 0.1582, 0.1418, 0.1159, 0.1159),
    (2.00, -0.9670, 0.2071, 0.2071, 0.1284, 0.1009, 0.1009),
    (2.50, -0.9378, 0.2370, 0.2370, 0.1182, 0.0862, 0.0862),
    (3.00, -0.9156, 0.2563, 0.2563, 0.1104, 0.0733, 0.0733),
];

/// Smallest tabulated bond length (Å).
pub const TABLE_MIN_BOND_LENGTH: f64 = H2_TABLE[0].0;

/// Largest tabulated bond length (Å).
pub const TABLE_MAX_BOND_LENGTH: f64 = H2_TABLE[H2_TABLE.len() - 1].0;

/// H2 Hamiltonian in the two-qubit Jordan-Wigner reduced form
///
/// H = g₀ I + g₁ Z₀ + g₂ Z₁ + g₃ Z₀Z₁ + g₄ X₀X₁ + g₅ Y₀Y₁
///
/// The coefficients are a piecewise-linear interpolation of a table
/// over [0.30, 3.00] Å. Outside the table the nearest segment is
/// extrapolated; those values are not physically representative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct H2Hamiltonian {
    /// Bond distance in Angstroms
    pub bond_length: f64,
    /// Identity coefficient
    pub g0: f64,
    /// Z₀ coefficient
    pub g1: f64,
    /// Z₁ coefficient
    pub g2: f64,
    /// Z₀Z₁ coefficient
    pub g3: f64,
    /// X₀X₁ coefficient
    pub g4: f64,
    /// Y₀Y₁ coefficient
    pub g5: f64,
}

impl H2Hamiltonian {
    /// Coefficients at bond length `r` (Å).
    ///
    /// Fails with [`VqeError::InvalidParameter`] unless `r` is finite and
    /// positive.
    pub fn new(r: f64) -> VqeResult<Self> {
        if !r.is_finite() || r <= 0.0 {
            return Err(VqeError::InvalidParameter(format!(
                "bond length must be finite and positive, got {r}"
            )));
        }
        if !Self::in_table_range(r) {
            warn!(
                bond_length = r,
                min = TABLE_MIN_BOND_LENGTH,
                max = TABLE_MAX_BOND_LENGTH,
                "bond length outside tabulated range, extrapolating"
            );
        }

        let [g0, g1, g2, g3, g4, g5] = interpolate_coefficients(r);
        Ok(Self {
            bond_length: r,
            g0,
            g1,
            g2,
            g3,
            g4,
            g5,
        })
    }

    /// Whether `r` lies inside the tabulated grid.
    pub fn in_table_range(r: f64) -> bool {
        (TABLE_MIN_BOND_LENGTH..=TABLE_MAX_BOND_LENGTH).contains(&r)
    }

    /// The six coefficients `[g0, ..., g5]`.
    pub fn coefficients(&self) -> [f64; 6] {
        [self.g0, self.g1, self.g2, self.g3, self.g4, self.g5]
    }

    /// Pauli-sum form on qubits 0 and 1.
    pub fn to_pauli(&self) -> PauliHamiltonian {
        PauliHamiltonian::new(vec![
            PauliTerm::identity(self.g0),
            PauliTerm::z(self.g1, 0),
            PauliTerm::z(self.g2, 1),
            PauliTerm::zz(self.g3, 0, 1),
            PauliTerm::xx(self.g4, 0, 1),
            PauliTerm::yy(self.g5, 0, 1),
        ])
    }

    /// Dense 4×4 Hermitian matrix over `|q1 q0⟩`.
    pub fn matrix(&self) -> Array2<Complex64> {
        self.to_pauli().to_matrix(2)
    }
}

/// Linear interpolation on the table, extrapolating from the end segments.
fn interpolate_coefficients(r: f64) -> [f64; 6] {
    let last = H2_TABLE.len() - 2;
    let seg = H2_TABLE
        .windows(2)
        .position(|w| r <= w[1].0)
        .unwrap_or(last);

    let (lo, hi) = (H2_TABLE[seg], H2_TABLE[seg + 1]);
    let t = (r - lo.0) / (hi.0 - lo.0);
    let lerp = |a: f64, b: f64| a + t * (b - a);

    [
        lerp(lo.1, hi.1),
        lerp(lo.2, hi.2),
        lerp(lo.3, hi.3),
        lerp(lo.4, hi.4),
        lerp(lo.5, hi.5),
        lerp(lo.6, hi.6),
    ]
}
