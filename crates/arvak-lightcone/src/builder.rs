//! Per-vertex tensor stacks.
//!
//! A vertex whose parity is set carries the observable: its stack is the
//! forward rounds `1..p-1`, the sandwich `U_p† · O · U_p`, then the adjoint
//! rounds in reverse. A vertex without parity opens and closes the circuit
//! instead: `U_1·|+⟩`, rounds `2..p` forward and back, then `⟨+|·U_1†`.
//!
//! Boundary stacks are the same construction for a leaf (no branches).

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use crate::error::{LightconeError, LightconeResult};
use crate::gates::{dagger, step_operator, uniform_state};
use crate::stack::TensorStack;
use crate::tensor::ElementaryTensor;

/// Stack for an internal vertex with `branches` children.
///
/// `observable` acts on the `1 + branches` qubits of the star (center
/// first) and defaults to the identity. It only enters when `parity` is set.
pub fn bulk_stack(
    branches: usize,
    betas: &[f64],
    gammas: &[f64],
    parity: bool,
    observable: Option<&Array2<Complex64>>,
) -> LightconeResult<TensorStack> {
    if betas.is_empty() || betas.len() != gammas.len() {
        return Err(LightconeError::AnglesRequired {
            betas: betas.len(),
            gammas: gammas.len(),
        });
    }
    let steps: Vec<Array2<Complex64>> = betas
        .iter()
        .zip(gammas)
        .map(|(&beta, &gamma)| step_operator(branches, beta, gamma, parity))
        .collect();
    let tensors = layered_tensors(branches, &steps, parity, observable)?;
    TensorStack::from_elementary_tensors(branches, tensors)
}

/// Stack for a leaf vertex.
///
/// Without couplings only the mixer acts, so with `parity` unset the stack
/// reduces to `|+⟩` and `⟨+|` with identities in between.
pub fn boundary_stack(
    betas: &[f64],
    parity: bool,
    observable: Option<&Array2<Complex64>>,
) -> LightconeResult<TensorStack> {
    if betas.is_empty() {
        return Err(LightconeError::AnglesRequired {
            betas: 0,
            gammas: 0,
        });
    }
    let steps: Vec<Array2<Complex64>> = betas
        .iter()
        .map(|&beta| step_operator(0, beta, 0.0, parity))
        .collect();
    let tensors = layered_tensors(0, &steps, parity, observable)?;
    TensorStack::from_elementary_tensors(0, tensors)
}

fn layered_tensors(
    branches: usize,
    steps: &[Array2<Complex64>],
    parity: bool,
    observable: Option<&Array2<Complex64>>,
) -> LightconeResult<Vec<ElementaryTensor>> {
    let qubits = branches + 1;
    let p = steps.len();
    let mut tensors = Vec::with_capacity(2 * p);

    if parity {
        let last = &steps[p - 1];
        let middle = match observable {
            Some(op) => {
                let dim = 1usize << qubits;
                if op.dim() != (dim, dim) {
                    return Err(LightconeError::ObservableDimension {
                        expected: dim,
                        expected_qubits: qubits,
                        found: op.nrows().max(op.ncols()),
                    });
                }
                dagger(last.view()).dot(op).dot(last)
            }
            None => dagger(last.view()).dot(last),
        };
        for step in &steps[..p - 1] {
            tensors.push(ElementaryTensor::from_matrix(qubits, step.view())?);
        }
        tensors.push(ElementaryTensor::from_matrix(qubits, middle.view())?);
        for step in steps[..p - 1].iter().rev() {
            tensors.push(ElementaryTensor::from_matrix(qubits, dagger(step.view()).view())?);
        }
    } else {
        if observable.is_some() {
            debug!(qubits, "observable ignored on a vertex without parity");
        }
        let plus = uniform_state(qubits);
        let first = &steps[0];
        tensors.push(ElementaryTensor::from_vector(qubits, first.dot(&plus).view())?);
        for step in &steps[1..] {
            tensors.push(ElementaryTensor::from_matrix(qubits, step.view())?);
        }
        for step in steps[1..].iter().rev() {
            tensors.push(ElementaryTensor::from_matrix(qubits, dagger(step.view()).view())?);
        }
        let closing = plus.dot(&dagger(first.view()));
        tensors.push(ElementaryTensor::from_vector(qubits, closing.view())?);
    }
    Ok(tensors)
}
