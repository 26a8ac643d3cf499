//! Elementary gate matrices for one light-cone star.
//!
//! A star is a center qubit (index 0) plus `b` branch qubits (indices
//! `1..=b`). Operators act on `2^(1+b)` dimensions with qubit 0 as the
//! most significant Kronecker factor.
//!
//! # Conventions
//!
//! - Problem rotation: `cos(γ/2)·I − i·sin(γ/2)·Z_i Z_j`
//! - Mixer rotation:   `cos(β/2)·I − i·sin(β/2)·X_i`

use ndarray::{Array1, Array2, ArrayView2, array};
use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Identity on `dim` dimensions.
pub fn identity(dim: usize) -> Array2<Complex64> {
    Array2::eye(dim)
}

/// Pauli-X.
pub fn pauli_x() -> Array2<Complex64> {
    array![[ZERO, ONE], [ONE, ZERO]]
}

/// Pauli-Z.
pub fn pauli_z() -> Array2<Complex64> {
    array![[ONE, ZERO], [ZERO, -ONE]]
}

/// Kronecker product `a ⊗ b`.
pub fn kron(a: ArrayView2<'_, Complex64>, b: ArrayView2<'_, Complex64>) -> Array2<Complex64> {
    let (br, bc) = b.dim();
    let (ar, ac) = a.dim();
    Array2::from_shape_fn((ar * br, ac * bc), |(i, j)| {
        a[[i / br, j / bc]] * b[[i % br, j % bc]]
    })
}

/// Conjugate transpose.
pub fn dagger(m: ArrayView2<'_, Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// Embed single-qubit operators into an `n`-qubit space.
///
/// Qubits not listed in `ops` receive an identity factor.
pub fn embed(n: usize, ops: &[(usize, ArrayView2<'_, Complex64>)]) -> Array2<Complex64> {
    let eye = identity(2);
    (0..n).fold(identity(1), |acc, q| {
        let factor = ops
            .iter()
            .find(|(qubit, _)| *qubit == q)
            .map_or_else(|| eye.view(), |(_, op)| op.view());
        kron(acc.view(), factor)
    })
}

/// `cos(θ/2)·I − i·sin(θ/2)·generator`.
fn rotation(generator: Array2<Complex64>, theta: f64) -> Array2<Complex64> {
    let (s, c) = (theta / 2.0).sin_cos();
    let mut out = generator.mapv(|z| z * Complex64::new(0.0, -s));
    out.diag_mut().mapv_inplace(|d| d + c);
    out
}

/// Ising coupling `exp(−iγ/2·Z_i Z_j)` on `n` qubits.
pub fn pairwise_rotation(n: usize, i: usize, j: usize, gamma: f64) -> Array2<Complex64> {
    debug_assert!(i != j && i < n && j < n);
    let z = pauli_z();
    rotation(embed(n, &[(i, z.view()), (j, z.view())]), gamma)
}

/// Mixer `exp(−iβ/2·X_i)` on `n` qubits.
pub fn site_rotation(n: usize, i: usize, beta: f64) -> Array2<Complex64> {
    debug_assert!(i < n);
    let x = pauli_x();
    rotation(embed(n, &[(i, x.view())]), beta)
}

/// One QAOA round on a star with `branches` neighbours.
///
/// Couples the center to every branch, then applies the mixer layer on all
/// `1 + branches` sites when `parity` is set.
pub fn step_operator(branches: usize, beta: f64, gamma: f64, parity: bool) -> Array2<Complex64> {
    let n = branches + 1;
    let mut step = identity(1 << n);
    for k in 1..=branches {
        step = pairwise_rotation(n, 0, k, gamma).dot(&step);
    }
    if parity {
        for q in 0..n {
            step = site_rotation(n, q, beta).dot(&step);
        }
    }
    step
}

/// Normalized equal superposition on `n` qubits.
pub fn uniform_state(n: usize) -> Array1<Complex64> {
    let dim = 1usize << n;
    Array1::from_elem(dim, Complex64::new(1.0 / (dim as f64).sqrt(), 0.0))
}
