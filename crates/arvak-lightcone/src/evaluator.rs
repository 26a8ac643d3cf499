//! Bottom-up contraction of a light-cone tree into one expectation value.
//!
//! Every vertex becomes one tensor stack. Parity alternates with depth and
//! marks the layer where the observable is inserted: a vertex with parity
//! set carries the `U† · O · U` sandwich for its star, a vertex without
//! parity carries the initial and final `|+⟩` states instead.
//!
//! At the root the children are split into a first half (`⌊n/2⌋`, no
//! parity) and a second half (parity). The two halves are contracted
//! separately and their root legs closed against each other, so the root
//! star's observable is inserted exactly once.
//!
//! # Example
//!
//! ```rust
//! use arvak_lightcone::{
//!     AngleSchedule, EvaluatorConfig, LightconeEvaluator, Observables, RegularTree, VertexId,
//! };
//!
//! let tree = RegularTree::new(3, 2);
//! let schedule = AngleSchedule::new(vec![0.3], vec![0.8]).unwrap();
//! let evaluator = LightconeEvaluator::new(EvaluatorConfig::default());
//!
//! // Identity observables always give <psi|psi> = 1.
//! let norm = evaluator
//!     .evaluate(&tree, &VertexId::root(), &schedule, &Observables::new())
//!     .unwrap();
//! assert!((norm.re - 1.0).abs() < 1e-12);
//! ```

use std::hash::{Hash, Hasher};
use std::iter;
use std::time::Instant;

use num_complex::Complex64;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::builder::{boundary_stack, bulk_stack};
use crate::error::LightconeResult;
use crate::observable::Observables;
use crate::path::ContractionStrategy;
use crate::schedule::AngleSchedule;
use crate::stack::TensorStack;
use crate::tree::{RootedTree, VertexId};

/// Evaluator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Contraction order used for every stack contraction.
    pub strategy: ContractionStrategy,
    /// Evaluate sibling subtrees on the rayon thread pool.
    pub parallel: bool,
    /// Contract structurally identical sibling subtrees only once.
    pub reuse_subtrees: bool,
    /// Imaginary magnitude above which the result is reported as suspect.
    pub imaginary_tolerance: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            strategy: ContractionStrategy::Greedy,
            parallel: true,
            reuse_subtrees: true,
            imaginary_tolerance: 1e-9,
        }
    }
}

impl EvaluatorConfig {
    /// Set the contraction strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ContractionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable parallel sibling evaluation.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable or disable sibling subtree reuse.
    #[must_use]
    pub fn with_subtree_reuse(mut self, reuse: bool) -> Self {
        self.reuse_subtrees = reuse;
        self
    }

    /// Set the imaginary-part warning threshold.
    #[must_use]
    pub fn with_imaginary_tolerance(mut self, tolerance: f64) -> Self {
        self.imaginary_tolerance = tolerance;
        self
    }
}

/// Computes local expectation values of depth-p QAOA states on trees.
#[derive(Debug, Clone, Default)]
pub struct LightconeEvaluator {
    config: EvaluatorConfig,
}

impl LightconeEvaluator {
    /// Create an evaluator with the given settings.
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Active settings.
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// `⟨ψ| ⊗_v O_v |ψ⟩` for the QAOA state on `tree` rooted at `root`.
    ///
    /// The full complex value is returned; its imaginary part vanishes up
    /// to rounding for Hermitian observables. The tree depth must cover the
    /// light cone of the observables, which is not checked here.
    pub fn evaluate<T>(
        &self,
        tree: &T,
        root: &VertexId,
        schedule: &AngleSchedule,
        observables: &Observables,
    ) -> LightconeResult<Complex64>
    where
        T: RootedTree + Sync,
    {
        let started = Instant::now();
        info!(
            rounds = schedule.rounds(),
            n_observables = observables.len(),
            strategy = ?self.config.strategy,
            parallel = self.config.parallel,
            "evaluating light-cone expectation value"
        );

        let fingerprints = self
            .config
            .reuse_subtrees
            .then(|| subtree_fingerprints(tree, root, observables));
        let walk = Walk {
            tree,
            schedule,
            observables,
            config: &self.config,
            fingerprints,
        };

        let children = tree.children(root);
        let (first, second) = children.split_at(children.len() / 2);
        let (opening, closing) = if self.config.parallel {
            rayon::join(
                || walk.subtree(false, root, first),
                || walk.subtree(true, root, second),
            )
        } else {
            (
                walk.subtree(false, root, first),
                walk.subtree(true, root, second),
            )
        };
        let value = opening?.contract_branches_and_root_with(
            Vec::new(),
            closing?,
            &self.config.strategy,
        )?;

        if value.im.abs() > self.config.imaginary_tolerance {
            warn!(
                real = value.re,
                imag = value.im,
                tolerance = self.config.imaginary_tolerance,
                "expectation value has a non-negligible imaginary part"
            );
        }
        info!(
            real = value.re,
            imag = value.im,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "light-cone evaluation finished"
        );
        Ok(value)
    }
}

/// One evaluation pass over an immutable tree.
struct Walk<'a, T> {
    tree: &'a T,
    schedule: &'a AngleSchedule,
    observables: &'a Observables,
    config: &'a EvaluatorConfig,
    fingerprints: Option<FxHashMap<VertexId, u64>>,
}

impl<T: RootedTree + Sync> Walk<'_, T> {
    /// Vector stack for `vertex` restricted to `children`.
    fn subtree(
        &self,
        parity: bool,
        vertex: &VertexId,
        children: &[VertexId],
    ) -> LightconeResult<TensorStack> {
        let observable = if parity {
            let star: Vec<VertexId> = iter::once(vertex.clone())
                .chain(children.iter().cloned())
                .collect();
            self.observables.local_operator(&star)
        } else {
            None
        };

        if children.is_empty() {
            return boundary_stack(self.schedule.betas(), parity, observable.as_ref());
        }

        let branch_vectors = self.branch_vectors(!parity, children)?;
        debug!(
            vertex = %vertex,
            branches = children.len(),
            parity,
            has_observable = observable.is_some(),
            "contracting subtree"
        );
        let stack = bulk_stack(
            children.len(),
            self.schedule.betas(),
            self.schedule.gammas(),
            parity,
            observable.as_ref(),
        )?;
        stack.contract_branches_with(branch_vectors, &self.config.strategy)
    }

    /// One vector per child, each evaluated with `parity`.
    fn branch_vectors(
        &self,
        parity: bool,
        children: &[VertexId],
    ) -> LightconeResult<Vec<TensorStack>> {
        let (distinct, slots) = self.distinct_children(children);
        let evaluate = |child: &&VertexId| {
            let grandchildren = self.tree.children(child);
            self.subtree(parity, child, &grandchildren)
        };
        let vectors: Vec<TensorStack> = if self.config.parallel && distinct.len() > 1 {
            distinct
                .par_iter()
                .map(evaluate)
                .collect::<LightconeResult<_>>()?
        } else {
            distinct
                .iter()
                .map(evaluate)
                .collect::<LightconeResult<_>>()?
        };
        if distinct.len() < children.len() {
            debug!(
                children = children.len(),
                distinct = distinct.len(),
                "reusing identical sibling subtrees"
            );
        }
        Ok(slots.into_iter().map(|slot| vectors[slot].clone()).collect())
    }

    /// Representative children and, per child, the index of its
    /// representative.
    fn distinct_children<'c>(&self, children: &'c [VertexId]) -> (Vec<&'c VertexId>, Vec<usize>) {
        let Some(fingerprints) = &self.fingerprints else {
            return (children.iter().collect(), (0..children.len()).collect());
        };
        let mut seen: FxHashMap<u64, usize> = FxHashMap::default();
        let mut distinct = Vec::new();
        let mut slots = Vec::with_capacity(children.len());
        for child in children {
            let slot = match fingerprints.get(child) {
                Some(&print) => *seen.entry(print).or_insert_with(|| {
                    distinct.push(child);
                    distinct.len() - 1
                }),
                None => {
                    distinct.push(child);
                    distinct.len() - 1
                }
            };
            slots.push(slot);
        }
        (distinct, slots)
    }
}

/// Structural hash of every subtree: shape plus attached observables.
fn subtree_fingerprints<T: RootedTree>(
    tree: &T,
    root: &VertexId,
    observables: &Observables,
) -> FxHashMap<VertexId, u64> {
    fn visit<T: RootedTree>(
        tree: &T,
        vertex: &VertexId,
        observables: &Observables,
        out: &mut FxHashMap<VertexId, u64>,
    ) -> u64 {
        let children = tree.children(vertex);
        let mut hasher = FxHasher::default();
        children.len().hash(&mut hasher);
        match observables.get(vertex) {
            Some(op) => {
                1u8.hash(&mut hasher);
                for z in op {
                    z.re.to_bits().hash(&mut hasher);
                    z.im.to_bits().hash(&mut hasher);
                }
            }
            None => 0u8.hash(&mut hasher),
        }
        for child in &children {
            visit(tree, child, observables, out).hash(&mut hasher);
        }
        let print = hasher.finish();
        out.insert(vertex.clone(), print);
        print
    }

    let mut out = FxHashMap::default();
    visit(tree, root, observables, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ExplicitTree, RegularTree};

    #[test]
    fn test_fingerprints_distinguish_observables() {
        let tree = RegularTree::new(3, 2);
        let obs = Observables::zz(VertexId::root(), [0]);
        let prints = subtree_fingerprints(&tree, &VertexId::root(), &obs);
        assert_eq!(prints.len(), tree.vertex_count());
        assert_ne!(prints[&VertexId::from([0])], prints[&VertexId::from([1])]);
        assert_eq!(prints[&VertexId::from([1])], prints[&VertexId::from([2])]);
        assert_eq!(prints[&VertexId::from([0, 0])], prints[&VertexId::from([2, 1])]);
    }

    #[test]
    fn test_fingerprints_distinguish_shapes() {
        let tree = ExplicitTree::new()
            .with_children(VertexId::root(), 2)
            .with_children([0], 1)
            .with_children([1], 2);
        let prints = subtree_fingerprints(&tree, &VertexId::root(), &Observables::new());
        assert_ne!(prints[&VertexId::from([0])], prints[&VertexId::from([1])]);
    }

    #[test]
    fn test_reuse_matches_full_walk() {
        let tree = RegularTree::new(3, 3);
        let schedule = AngleSchedule::new(vec![0.4, -0.9], vec![0.7, 1.3]).unwrap();
        let obs = Observables::zz(VertexId::root(), [1]);
        let reused = LightconeEvaluator::new(EvaluatorConfig::default())
            .evaluate(&tree, &VertexId::root(), &schedule, &obs)
            .unwrap();
        let full = LightconeEvaluator::new(
            EvaluatorConfig::default()
                .with_subtree_reuse(false)
                .with_parallel(false),
        )
        .evaluate(&tree, &VertexId::root(), &schedule, &obs)
        .unwrap();
        assert!((reused - full).norm() < 1e-12);
    }

    #[test]
    fn test_config_builders() {
        let config = EvaluatorConfig::default()
            .with_strategy(ContractionStrategy::Sequential)
            .with_parallel(false)
            .with_subtree_reuse(false)
            .with_imaginary_tolerance(1e-6);
        assert_eq!(config.strategy, ContractionStrategy::Sequential);
        assert!(!config.parallel);
        assert!(!config.reuse_subtrees);
        assert_eq!(config.imaginary_tolerance, 1e-6);
    }
}
