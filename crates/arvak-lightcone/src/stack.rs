//! Tensor stacks: owned node collections with classified dangling legs.
//!
//! A [`TensorStack`] exposes one ordered list of root legs and one ordered
//! list per branch. The order fixes the pairing contract: the i-th leg of
//! branch list `k` joins the i-th root leg of the stack supplied for branch
//! `k`. A stack with no branch lists is a vector over its root legs.
//!
//! Contraction consumes the stacks involved, so a node can take part in at
//! most one contraction.

use ndarray::ArrayD;
use num_complex::Complex64;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{LightconeResult, PreconditionViolation};
use crate::network::{LegId, Node, TensorNetwork};
use crate::path::ContractionStrategy;
use crate::tensor::{ElementaryTensor, TensorKind};

/// A set of tensor nodes plus their externally visible legs.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorStack {
    nodes: Vec<Node>,
    root_legs: Vec<LegId>,
    branch_legs: Vec<Vec<LegId>>,
    /// First leg identifier not used by any node.
    next_leg: LegId,
}

impl TensorStack {
    /// Wrap per-layer tensors for a star with `branches` neighbours.
    ///
    /// Each tensor gets fresh legs. A matrix contributes its input legs and
    /// then its output legs to the lists; a vector contributes its single
    /// leg per qubit. Qubit 0 feeds the root list and qubit `k` the branch
    /// list `k - 1`.
    pub fn from_elementary_tensors(
        branches: usize,
        tensors: Vec<ElementaryTensor>,
    ) -> LightconeResult<Self> {
        let qubits = branches + 1;
        let mut stack = Self {
            nodes: Vec::with_capacity(tensors.len()),
            root_legs: Vec::new(),
            branch_legs: vec![Vec::new(); branches],
            next_leg: 0,
        };

        for (index, tensor) in tensors.into_iter().enumerate() {
            tensor.validate(branches, index)?;
            let rank = tensor.shape().len();
            let legs: Vec<LegId> = (stack.next_leg..stack.next_leg + rank).collect();
            stack.next_leg += rank;

            match tensor.kind() {
                TensorKind::Matrix => {
                    stack.expose(&legs[qubits..]);
                    stack.expose(&legs[..qubits]);
                }
                TensorKind::Vector => stack.expose(&legs),
            }
            stack.nodes.push(Node::new(legs, tensor.into_data())?);
        }

        debug!(
            branches,
            n_nodes = stack.nodes.len(),
            n_root_legs = stack.root_legs.len(),
            "built tensor stack"
        );
        Ok(stack)
    }

    /// A single-node stack with no branches, one root leg per axis of `data`.
    pub fn vector(data: ArrayD<Complex64>) -> Self {
        let node = Node::from_axes(data);
        let root_legs = node.legs().to_vec();
        Self {
            next_leg: root_legs.len(),
            nodes: vec![node],
            root_legs,
            branch_legs: Vec::new(),
        }
    }

    /// Append one leg per qubit: qubit 0 to the root list, the rest to
    /// their branch lists.
    fn expose(&mut self, per_qubit: &[LegId]) {
        let Some((&center, branches)) = per_qubit.split_first() else {
            return;
        };
        self.root_legs.push(center);
        for (list, &leg) in self.branch_legs.iter_mut().zip(branches) {
            list.push(leg);
        }
    }

    /// Number of branch lists still exposed.
    pub fn branch_count(&self) -> usize {
        self.branch_legs.len()
    }

    /// True if the stack exposes no branch lists.
    pub fn is_vector(&self) -> bool {
        self.branch_legs.is_empty()
    }

    /// Dangling root legs in pairing order.
    pub fn root_legs(&self) -> &[LegId] {
        &self.root_legs
    }

    /// Dangling legs of branch `k`, if it exists.
    pub fn branch_legs(&self, k: usize) -> Option<&[LegId]> {
        self.branch_legs.get(k).map(Vec::as_slice)
    }

    /// Number of owned nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Owned nodes in construction order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// [`contract_branches_with`](Self::contract_branches_with) using the
    /// greedy strategy.
    pub fn contract_branches(self, branch_vectors: Vec<TensorStack>) -> LightconeResult<Self> {
        self.contract_branches_with(branch_vectors, &ContractionStrategy::Greedy)
    }

    /// Join every branch list with the root legs of the matching branch
    /// vector and contract everything into one node.
    ///
    /// The result is a vector stack whose legs follow this stack's root legs.
    pub fn contract_branches_with(
        self,
        branch_vectors: Vec<TensorStack>,
        strategy: &ContractionStrategy,
    ) -> LightconeResult<Self> {
        self.check_branches(&branch_vectors)?;
        let Self {
            nodes,
            root_legs,
            branch_legs,
            mut next_leg,
        } = self;

        let mut network = TensorNetwork::new();
        for node in nodes {
            network.add_node(node)?;
        }
        for (vector, targets) in branch_vectors.into_iter().zip(&branch_legs) {
            let bindings: FxHashMap<LegId, LegId> = vector
                .root_legs
                .iter()
                .copied()
                .zip(targets.iter().copied())
                .collect();
            absorb(&mut network, vector.nodes, bindings, &mut next_leg)?;
        }

        debug!(
            branches = branch_legs.len(),
            n_nodes = network.len(),
            n_legs = network.leg_count(),
            n_open = root_legs.len(),
            "contracting branches"
        );
        let data = network.contract(&root_legs, strategy)?;
        Ok(Self::vector(data))
    }

    /// [`contract_branches_and_root_with`](Self::contract_branches_and_root_with)
    /// using the greedy strategy.
    pub fn contract_branches_and_root(
        self,
        branch_vectors: Vec<TensorStack>,
        root_vector: TensorStack,
    ) -> LightconeResult<Complex64> {
        self.contract_branches_and_root_with(
            branch_vectors,
            root_vector,
            &ContractionStrategy::Greedy,
        )
    }

    /// Contract the branches, then close the root legs against
    /// `root_vector`, leaving a scalar.
    pub fn contract_branches_and_root_with(
        self,
        branch_vectors: Vec<TensorStack>,
        root_vector: TensorStack,
        strategy: &ContractionStrategy,
    ) -> LightconeResult<Complex64> {
        if !root_vector.is_vector() {
            return Err(PreconditionViolation::RootNotVector {
                exposed: root_vector.branch_count(),
            }
            .into());
        }
        if root_vector.root_legs.len() != self.root_legs.len() {
            return Err(PreconditionViolation::RootLegCount {
                expected: self.root_legs.len(),
                found: root_vector.root_legs.len(),
            }
            .into());
        }

        let contracted = self.contract_branches_with(branch_vectors, strategy)?;
        let mut next_leg = contracted.next_leg;
        let bindings: FxHashMap<LegId, LegId> = root_vector
            .root_legs
            .iter()
            .copied()
            .zip(contracted.root_legs.iter().copied())
            .collect();

        let mut network = TensorNetwork::new();
        for node in contracted.nodes {
            network.add_node(node)?;
        }
        absorb(&mut network, root_vector.nodes, bindings, &mut next_leg)?;
        debug!(n_nodes = network.len(), "closing root legs");
        Ok(network.contract(&[], strategy)?.sum())
    }

    fn check_branches(&self, branch_vectors: &[TensorStack]) -> LightconeResult<()> {
        if branch_vectors.len() != self.branch_legs.len() {
            return Err(PreconditionViolation::BranchCount {
                expected: self.branch_legs.len(),
                found: branch_vectors.len(),
            }
            .into());
        }
        for (branch, (vector, targets)) in branch_vectors.iter().zip(&self.branch_legs).enumerate()
        {
            if !vector.is_vector() {
                return Err(PreconditionViolation::BranchNotVector {
                    branch,
                    exposed: vector.branch_count(),
                }
                .into());
            }
            if vector.root_legs.len() != targets.len() {
                return Err(PreconditionViolation::BranchLegCount {
                    branch,
                    expected: targets.len(),
                    found: vector.root_legs.len(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Move `nodes` into `network`, renaming bound legs to their partners and
/// every other leg to a fresh identifier.
fn absorb(
    network: &mut TensorNetwork,
    nodes: Vec<Node>,
    mut bindings: FxHashMap<LegId, LegId>,
    next_leg: &mut LegId,
) -> LightconeResult<()> {
    for node in nodes {
        let node = node.relabel(|leg| {
            *bindings.entry(leg).or_insert_with(|| {
                let fresh = *next_leg;
                *next_leg += 1;
                fresh
            })
        });
        network.add_node(node)?;
    }
    Ok(())
}
