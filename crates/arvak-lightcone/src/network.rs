//! Index-addressed arena of legged tensors.
//!
//! Every node carries one [`LegId`] per array axis. Two nodes sharing a leg
//! are joined by an edge that is summed during contraction; a leg held by a
//! single node is open. Each leg joins at most two nodes.
//!
//! Contraction consumes the arena: nodes move into the pairwise products and
//! a consumed slot can never be read again.

use ndarray::{Array2, ArrayD, IxDyn};
use num_complex::Complex64;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::error::{LightconeError, LightconeResult};
use crate::path::{ContractionStrategy, find_path};

/// Identifier of one tensor leg.
pub type LegId = usize;

/// Arena slot of one node.
pub type NodeId = usize;

/// A dense tensor together with the identifiers of its legs.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    legs: Vec<LegId>,
    data: ArrayD<Complex64>,
}

impl Node {
    /// Attach leg identifiers to an array, one per axis.
    pub fn new(legs: Vec<LegId>, data: ArrayD<Complex64>) -> LightconeResult<Self> {
        if legs.len() != data.ndim() {
            return Err(LightconeError::LegCount {
                legs: legs.len(),
                rank: data.ndim(),
            });
        }
        Ok(Self { legs, data })
    }

    /// Label the axes of `data` with legs `0..rank`.
    pub(crate) fn from_axes(data: ArrayD<Complex64>) -> Self {
        Self {
            legs: (0..data.ndim()).collect(),
            data,
        }
    }

    /// Leg identifiers in axis order.
    pub fn legs(&self) -> &[LegId] {
        &self.legs
    }

    /// Underlying array.
    pub fn data(&self) -> &ArrayD<Complex64> {
        &self.data
    }

    /// Consume the node, returning its array.
    pub fn into_data(self) -> ArrayD<Complex64> {
        self.data
    }

    /// Rename every leg through `f`.
    pub(crate) fn relabel(mut self, mut f: impl FnMut(LegId) -> LegId) -> Self {
        for leg in &mut self.legs {
            *leg = f(*leg);
        }
        self
    }
}

/// A collection of nodes awaiting full contraction.
#[derive(Debug, Default)]
pub struct TensorNetwork {
    nodes: Vec<Node>,
    dims: FxHashMap<LegId, usize>,
}

impl TensorNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, registering the dimension of each of its legs.
    pub fn add_node(&mut self, node: Node) -> LightconeResult<NodeId> {
        for (&leg, &dim) in node.legs.iter().zip(node.data.shape()) {
            match self.dims.get(&leg) {
                Some(&expected) if expected != dim => {
                    return Err(LightconeError::LegDimension {
                        leg,
                        expected,
                        found: dim,
                    });
                }
                Some(_) => {}
                None => {
                    self.dims.insert(leg, dim);
                }
            }
        }
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the network holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of distinct legs.
    pub fn leg_count(&self) -> usize {
        self.dims.len()
    }

    /// Contract every node into one tensor whose axes follow `output`.
    ///
    /// An empty network contracts to the scalar one.
    pub fn contract(
        self,
        output: &[LegId],
        strategy: &ContractionStrategy,
    ) -> LightconeResult<ArrayD<Complex64>> {
        let inputs: Vec<Vec<LegId>> = self.nodes.iter().map(|n| n.legs.clone()).collect();
        let path = find_path(&inputs, output, &self.dims, strategy);

        let mut slots: Vec<Option<Node>> = self.nodes.into_iter().map(Some).collect();
        for (left, right) in path {
            let a = slots
                .get_mut(left)
                .and_then(Option::take)
                .ok_or(LightconeError::ConsumedNode { node: left })?;
            let b = slots
                .get_mut(right)
                .and_then(Option::take)
                .ok_or(LightconeError::ConsumedNode { node: right })?;
            slots[left] = Some(contract_pair(a, b)?);
        }

        let mut remaining = slots.into_iter().flatten();
        let Some(result) = remaining.next() else {
            return Ok(ArrayD::from_elem(IxDyn(&[]), Complex64::new(1.0, 0.0)));
        };
        if remaining.next().is_some() {
            return Err(LightconeError::OutputMismatch {
                expected: output.to_vec(),
                found: result.legs,
            });
        }
        into_output_order(result, output)
    }
}

/// Permute the final node so its axes follow `output`.
fn into_output_order(node: Node, output: &[LegId]) -> LightconeResult<ArrayD<Complex64>> {
    let unique: FxHashSet<LegId> = output.iter().copied().collect();
    let perm: Option<Vec<usize>> = output
        .iter()
        .map(|leg| node.legs.iter().position(|l| l == leg))
        .collect();
    match perm {
        Some(perm) if perm.len() == node.legs.len() && unique.len() == output.len() => Ok(node
            .data
            .permuted_axes(IxDyn(&perm))
            .as_standard_layout()
            .into_owned()),
        _ => Err(LightconeError::OutputMismatch {
            expected: output.to_vec(),
            found: node.legs,
        }),
    }
}

/// Contract two nodes over every leg they share.
///
/// The result carries the free legs of `a` followed by those of `b`.
fn contract_pair(a: Node, b: Node) -> LightconeResult<Node> {
    let mut shared_a = Vec::new();
    let mut shared_b = Vec::new();
    let mut free_a = Vec::new();
    for (axis, leg) in a.legs.iter().enumerate() {
        match b.legs.iter().position(|l| l == leg) {
            Some(partner) => {
                shared_a.push(axis);
                shared_b.push(partner);
            }
            None => free_a.push(axis),
        }
    }
    let free_b: Vec<usize> = (0..b.legs.len())
        .filter(|axis| !shared_b.contains(axis))
        .collect();

    trace!(
        left_rank = a.legs.len(),
        right_rank = b.legs.len(),
        summed = shared_a.len(),
        "contracting node pair"
    );

    let lhs = matricize(&a.data, &free_a, &shared_a)?;
    let rhs = matricize(&b.data, &shared_b, &free_b)?;
    let product = lhs.dot(&rhs);

    let shape: Vec<usize> = free_a
        .iter()
        .map(|&axis| a.data.shape()[axis])
        .chain(free_b.iter().map(|&axis| b.data.shape()[axis]))
        .collect();
    let legs: Vec<LegId> = free_a
        .iter()
        .map(|&axis| a.legs[axis])
        .chain(free_b.iter().map(|&axis| b.legs[axis]))
        .collect();
    let data = ArrayD::from_shape_vec(IxDyn(&shape), product.iter().copied().collect())?;
    Node::new(legs, data)
}

/// Flatten `rows` axes into matrix rows and `cols` axes into columns.
fn matricize(
    data: &ArrayD<Complex64>,
    rows: &[usize],
    cols: &[usize],
) -> LightconeResult<Array2<Complex64>> {
    let shape = data.shape();
    let m: usize = rows.iter().map(|&axis| shape[axis]).product();
    let n: usize = cols.iter().map(|&axis| shape[axis]).product();
    let perm: Vec<usize> = rows.iter().chain(cols).copied().collect();
    let view = data.view().permuted_axes(IxDyn(&perm));
    Ok(Array2::from_shape_vec((m, n), view.iter().copied().collect())?)
}
