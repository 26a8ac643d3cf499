//! MaxCut cost from a single-edge `⟨Z Z⟩` expectation.
//!
//! On a `k`-regular graph of large girth every edge sees the same tree, so
//! the expected cut fraction of depth-p QAOA is `½·(1 − ⟨Z_u Z_v⟩)` for the
//! edge between the root and its first child.

use num_complex::Complex64;

use crate::error::LightconeResult;
use crate::evaluator::LightconeEvaluator;
use crate::observable::Observables;
use crate::schedule::AngleSchedule;
use crate::tree::{RegularTree, VertexId};

/// `Z ⊗ Z` on the root and its first child.
pub fn edge_observables() -> Observables {
    Observables::zz(VertexId::root(), [0])
}

/// Fraction of edges cut given `⟨Z_u Z_v⟩`.
pub fn cut_fraction(zz: Complex64) -> f64 {
    0.5 * (1.0 - zz.re)
}

/// Smallest tree depth covering the light cone of one edge after `rounds`.
pub fn light_cone_depth(rounds: usize) -> usize {
    rounds + 1
}

/// Expected cut fraction of depth-p QAOA on a `degree`-regular graph.
pub fn edge_cut_fraction(
    evaluator: &LightconeEvaluator,
    degree: usize,
    schedule: &AngleSchedule,
) -> LightconeResult<f64> {
    let tree = RegularTree::new(degree, light_cone_depth(schedule.rounds()));
    let zz = evaluator.evaluate(&tree, &VertexId::root(), schedule, &edge_observables())?;
    Ok(cut_fraction(zz))
}
