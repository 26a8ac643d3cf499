//! Error types for the lightcone crate.

use thiserror::Error;

use crate::tensor::TensorKind;
use crate::tree::VertexId;

/// Errors produced while building or contracting light-cone tensor stacks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LightconeError {
    /// The angle schedule is empty or the two sequences differ in length.
    #[error("angles required: got {betas} betas and {gammas} gammas, need p >= 1 of each")]
    AnglesRequired {
        /// Number of mixer angles supplied.
        betas: usize,
        /// Number of problem angles supplied.
        gammas: usize,
    },

    /// An elementary tensor does not have the shape its tag demands.
    #[error(
        "shape mismatch at tensor {index} ({kind:?}): got {found:?}, expected {vector:?} for a vector or {matrix:?} for a matrix"
    )]
    ShapeMismatch {
        /// Position of the offending tensor in the construction list.
        index: usize,
        /// Declared classification of the tensor.
        kind: TensorKind,
        /// Shape that was supplied.
        found: Vec<usize>,
        /// Acceptable vector shape for the stack's branching factor.
        vector: Vec<usize>,
        /// Acceptable matrix shape for the stack's branching factor.
        matrix: Vec<usize>,
    },

    /// Two stacks were combined in a way that breaks the leg-pairing contract.
    #[error("precondition violation: {0}")]
    Precondition(#[from] PreconditionViolation),

    /// A star observable does not act on the star's Hilbert space.
    #[error("observable has dimension {found}, star with {expected_qubits} qubits needs {expected}")]
    ObservableDimension {
        /// Required operator dimension, `2^(1+b)`.
        expected: usize,
        /// Number of qubits in the star.
        expected_qubits: usize,
        /// Supplied operator dimension.
        found: usize,
    },

    /// A per-vertex observable is not a single-qubit operator.
    #[error("observable on vertex {vertex} must be 2x2, got {rows}x{cols}")]
    InvalidObservable {
        /// Vertex the observable was attached to.
        vertex: VertexId,
        /// Row count of the supplied matrix.
        rows: usize,
        /// Column count of the supplied matrix.
        cols: usize,
    },

    /// A node was given a different number of legs than its array has axes.
    #[error("node has {legs} legs but its array has rank {rank}")]
    LegCount {
        /// Leg identifiers supplied.
        legs: usize,
        /// Rank of the array.
        rank: usize,
    },

    /// The same leg was registered with two different dimensions.
    #[error("leg {leg} has dimension {found}, previously registered as {expected}")]
    LegDimension {
        /// Offending leg.
        leg: usize,
        /// Dimension already on record.
        expected: usize,
        /// Dimension of the new occurrence.
        found: usize,
    },

    /// A contraction step referenced a node that was already consumed.
    #[error("node {node} was already consumed by an earlier contraction")]
    ConsumedNode {
        /// Arena slot of the dead node.
        node: usize,
    },

    /// Full contraction left a different set of open legs than requested.
    #[error("contraction left open legs {found:?}, requested {expected:?}")]
    OutputMismatch {
        /// Requested output legs.
        expected: Vec<usize>,
        /// Legs left on the final node.
        found: Vec<usize>,
    },

    /// An array could not be reshaped into qubit axes.
    #[error("reshape failed: {0}")]
    Reshape(#[from] ndarray::ShapeError),
}

/// Violations of the branch/root leg contract of a [`TensorStack`].
///
/// [`TensorStack`]: crate::stack::TensorStack
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PreconditionViolation {
    /// Number of branch vectors differs from the stack's branch count.
    #[error("expected {expected} branch vectors, got {found}")]
    BranchCount {
        /// Branch lists exposed by the stack.
        expected: usize,
        /// Branch vectors supplied.
        found: usize,
    },

    /// A branch argument still exposes branch legs of its own.
    #[error("branch {branch} is not a vector: it still exposes {exposed} branch lists")]
    BranchNotVector {
        /// Index of the offending branch.
        branch: usize,
        /// Number of branch lists it exposes.
        exposed: usize,
    },

    /// A branch vector's root legs do not match the stack's branch list.
    #[error("branch {branch} exposes {found} root legs, branch list holds {expected}")]
    BranchLegCount {
        /// Index of the offending branch.
        branch: usize,
        /// Legs in this stack's branch list.
        expected: usize,
        /// Root legs exposed by the branch vector.
        found: usize,
    },

    /// The root vector's leg count differs from this stack's root legs.
    #[error("root vector exposes {found} root legs, stack holds {expected}")]
    RootLegCount {
        /// Root legs of this stack.
        expected: usize,
        /// Root legs of the supplied root vector.
        found: usize,
    },

    /// The root vector still exposes branch legs.
    #[error("root vector is not a vector: it still exposes {exposed} branch lists")]
    RootNotVector {
        /// Number of branch lists it exposes.
        exposed: usize,
    },
}

/// Result type for light-cone evaluation.
pub type LightconeResult<T> = Result<T, LightconeError>;
