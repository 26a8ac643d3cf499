//! Elementary tensors: the per-layer building blocks of a tensor stack.
//!
//! Every axis of an elementary tensor is a qubit leg of dimension 2. A
//! vector on a star with `b` branches has `1 + b` axes (center first). A
//! matrix has `2·(1 + b)` axes: the output (row) legs followed by the input
//! (column) legs, each in qubit order.

use ndarray::{ArrayD, ArrayView, Dimension, IxDyn};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{LightconeError, LightconeResult};

/// Declared classification of an elementary tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TensorKind {
    /// One leg per qubit.
    Vector,
    /// One output and one input leg per qubit.
    Matrix,
}

/// A dense complex array tagged as a vector or a matrix.
///
/// The tag is fixed at construction; [`ElementaryTensor::validate`] checks the
/// shape against it rather than inferring the kind from the rank.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementaryTensor {
    /// State-like tensor with shape `[2; 1 + b]`.
    Vector(ArrayD<Complex64>),
    /// Operator-like tensor with shape `[2; 2·(1 + b)]`.
    Matrix(ArrayD<Complex64>),
}

/// Expected vector shape for a star with `branches` neighbours.
pub fn vector_shape(branches: usize) -> Vec<usize> {
    vec![2; branches + 1]
}

/// Expected matrix shape for a star with `branches` neighbours.
pub fn matrix_shape(branches: usize) -> Vec<usize> {
    vec![2; 2 * (branches + 1)]
}

/// Copy any array into logical row-major order with `axes` qubit legs.
pub(crate) fn to_qubit_axes<D: Dimension>(
    array: ArrayView<'_, Complex64, D>,
    axes: usize,
) -> LightconeResult<ArrayD<Complex64>> {
    let data: Vec<Complex64> = array.iter().copied().collect();
    Ok(ArrayD::from_shape_vec(IxDyn(&vec![2; axes]), data)?)
}

impl ElementaryTensor {
    /// Wrap a `2^qubits` state vector.
    pub fn from_vector(
        qubits: usize,
        vector: ArrayView<'_, Complex64, ndarray::Ix1>,
    ) -> LightconeResult<Self> {
        Ok(Self::Vector(to_qubit_axes(vector, qubits)?))
    }

    /// Wrap a `2^qubits × 2^qubits` operator.
    pub fn from_matrix(
        qubits: usize,
        matrix: ArrayView<'_, Complex64, ndarray::Ix2>,
    ) -> LightconeResult<Self> {
        Ok(Self::Matrix(to_qubit_axes(matrix, 2 * qubits)?))
    }

    /// Declared classification.
    pub fn kind(&self) -> TensorKind {
        match self {
            Self::Vector(_) => TensorKind::Vector,
            Self::Matrix(_) => TensorKind::Matrix,
        }
    }

    /// Shape of the underlying array.
    pub fn shape(&self) -> &[usize] {
        self.data().shape()
    }

    /// Underlying array.
    pub fn data(&self) -> &ArrayD<Complex64> {
        match self {
            Self::Vector(data) | Self::Matrix(data) => data,
        }
    }

    /// Consume the tensor, returning the underlying array.
    pub fn into_data(self) -> ArrayD<Complex64> {
        match self {
            Self::Vector(data) | Self::Matrix(data) => data,
        }
    }

    /// Check the shape against the declared kind for a star with `branches`
    /// neighbours. `index` is reported in the error.
    pub fn validate(&self, branches: usize, index: usize) -> LightconeResult<()> {
        let vector = vector_shape(branches);
        let matrix = matrix_shape(branches);
        let expected = match self.kind() {
            TensorKind::Vector => &vector,
            TensorKind::Matrix => &matrix,
        };
        if self.shape() == expected.as_slice() {
            return Ok(());
        }
        Err(LightconeError::ShapeMismatch {
            index,
            kind: self.kind(),
            found: self.shape().to_vec(),
            vector,
            matrix,
        })
    }
}
