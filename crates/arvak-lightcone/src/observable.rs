//! Sparse single-qubit observables attached to tree vertices.

use ndarray::Array2;
use num_complex::Complex64;
use rustc_hash::FxHashMap;

use crate::error::{LightconeError, LightconeResult};
use crate::gates::{identity, kron, pauli_z};
use crate::tree::VertexId;

/// Vertex → 2×2 operator map; vertices without an entry carry the identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observables {
    ops: FxHashMap<VertexId, Array2<Complex64>>,
}

impl Observables {
    /// No observables: every vertex carries the identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// `Z ⊗ Z` on the edge `(u, v)`.
    pub fn zz(u: impl Into<VertexId>, v: impl Into<VertexId>) -> Self {
        let mut ops = FxHashMap::default();
        ops.insert(u.into(), pauli_z());
        ops.insert(v.into(), pauli_z());
        Self { ops }
    }

    /// Attach `op` to `vertex`, replacing any previous entry.
    pub fn insert(
        &mut self,
        vertex: impl Into<VertexId>,
        op: Array2<Complex64>,
    ) -> LightconeResult<()> {
        let vertex = vertex.into();
        let (rows, cols) = op.dim();
        if (rows, cols) != (2, 2) {
            return Err(LightconeError::InvalidObservable { vertex, rows, cols });
        }
        self.ops.insert(vertex, op);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, vertex: impl Into<VertexId>, op: Array2<Complex64>) -> LightconeResult<Self> {
        self.insert(vertex, op)?;
        Ok(self)
    }

    /// Operator on `vertex`, if one was attached.
    pub fn get(&self, vertex: &VertexId) -> Option<&Array2<Complex64>> {
        self.ops.get(vertex)
    }

    /// Number of vertices with an attached operator.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if every vertex carries the identity.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Kronecker product of the operators on `vertices`, in order.
    ///
    /// Returns `None` when none of them carries an operator, leaving the
    /// identity implicit.
    pub fn local_operator(&self, vertices: &[VertexId]) -> Option<Array2<Complex64>> {
        if !vertices.iter().any(|v| self.ops.contains_key(v)) {
            return None;
        }
        let eye = identity(2);
        Some(vertices.iter().fold(identity(1), |acc, v| {
            let factor = self.ops.get(v).unwrap_or(&eye);
            kron(acc.view(), factor.view())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::pauli_x;

    #[test]
    fn test_rejects_non_single_qubit_operator() {
        let mut obs = Observables::new();
        let err = obs.insert([0], identity(4)).unwrap_err();
        assert!(matches!(
            err,
            LightconeError::InvalidObservable {
                rows: 4,
                cols: 4,
                ..
            }
        ));
        assert!(obs.is_empty());
    }

    #[test]
    fn test_local_operator_defaults_to_identity() {
        let obs = Observables::new().with([1], pauli_x()).unwrap();
        let star = [VertexId::root(), VertexId::from([0])];
        assert!(obs.local_operator(&star).is_none());

        let star = [VertexId::root(), VertexId::from([0]), VertexId::from([1])];
        let op = obs.local_operator(&star).unwrap();
        let expected = kron(identity(4).view(), pauli_x().view());
        assert_eq!(op, expected);
    }

    #[test]
    fn test_zz_places_center_first() {
        let obs = Observables::zz(VertexId::root(), [2]);
        let star = [VertexId::root(), VertexId::from([0]), VertexId::from([2])];
        let op = obs.local_operator(&star).unwrap();
        // Z ⊗ I ⊗ Z is diagonal with sign (-1)^(q0 + q2).
        assert_eq!(op[[0, 0]], Complex64::new(1.0, 0.0));
        assert_eq!(op[[1, 1]], Complex64::new(-1.0, 0.0));
        assert_eq!(op[[2, 2]], Complex64::new(1.0, 0.0));
        assert_eq!(op[[5, 5]], Complex64::new(1.0, 0.0));
        assert_eq!(obs.len(), 2);
    }
}
