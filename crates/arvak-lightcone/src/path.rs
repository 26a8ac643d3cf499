//! Contraction-order search over a network of legged tensors.
//!
//! Paths are emitted in replace-left form: the pair `(i, j)` contracts node
//! `j` into node `i`, after which slot `j` is dead and slot `i` holds the
//! result.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::network::LegId;

/// Number of cheapest candidates the random-greedy chooser samples from.
const RANDOM_GREEDY_BRANCHES: usize = 8;

/// Replace-left contraction path.
pub type SimplePath = Vec<(usize, usize)>;

/// Strategy used to order pairwise contractions.
///
/// Every strategy fully contracts the network; they differ only in cost.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContractionStrategy {
    /// Repeatedly contract the connected pair that removes the most memory.
    #[default]
    Greedy,
    /// Greedy with Boltzmann-weighted sampling among the cheapest candidates.
    RandomGreedy {
        /// RNG seed.
        seed: u64,
        /// Relative temperature; `0.0` reduces to plain greedy.
        temperature: f64,
    },
    /// Fold every node into the first one in arena order.
    Sequential,
}

/// Find a contraction path for `inputs`, keeping `output` legs open.
///
/// `dims` maps every leg to its dimension.
pub fn find_path(
    inputs: &[Vec<LegId>],
    output: &[LegId],
    dims: &FxHashMap<LegId, usize>,
    strategy: &ContractionStrategy,
) -> SimplePath {
    let path = match strategy {
        ContractionStrategy::Greedy => PathSearch::new(inputs, output, dims).greedy(None),
        ContractionStrategy::RandomGreedy { seed, temperature } => {
            let mut rng = StdRng::seed_from_u64(*seed);
            PathSearch::new(inputs, output, dims).greedy(Some((&mut rng, *temperature)))
        }
        ContractionStrategy::Sequential => (1..inputs.len()).map(|j| (0, j)).collect(),
    };
    debug!(
        n_inputs = inputs.len(),
        n_steps = path.len(),
        ?strategy,
        "found contraction path"
    );
    path
}

/// A pairwise contraction under consideration.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f64,
    left: usize,
    right: usize,
}

/// Mutable bookkeeping for a greedy path search.
struct PathSearch<'a> {
    /// Legs of each slot; `None` once the slot has been consumed.
    slots: Vec<Option<Vec<LegId>>>,
    /// How many live slots hold each leg.
    ref_counts: FxHashMap<LegId, usize>,
    output: FxHashSet<LegId>,
    dims: &'a FxHashMap<LegId, usize>,
}

impl<'a> PathSearch<'a> {
    fn new(inputs: &[Vec<LegId>], output: &[LegId], dims: &'a FxHashMap<LegId, usize>) -> Self {
        let mut ref_counts = FxHashMap::default();
        for legs in inputs {
            for &leg in legs {
                *ref_counts.entry(leg).or_insert(0) += 1;
            }
        }
        Self {
            slots: inputs.iter().cloned().map(Some).collect(),
            ref_counts,
            output: output.iter().copied().collect(),
            dims,
        }
    }

    fn size(&self, legs: &[LegId]) -> f64 {
        legs.iter()
            .map(|leg| self.dims.get(leg).copied().unwrap_or(1) as f64)
            .product()
    }

    /// Legs left open after contracting `a` with `b`.
    fn merged_legs(&self, a: &[LegId], b: &[LegId]) -> Vec<LegId> {
        let keep = |leg: &LegId| {
            let held = usize::from(a.contains(leg)) + usize::from(b.contains(leg));
            self.output.contains(leg) || self.ref_counts.get(leg).copied().unwrap_or(0) > held
        };
        let mut merged: Vec<LegId> = a.iter().copied().filter(|leg| keep(leg)).collect();
        merged.extend(b.iter().copied().filter(|leg| !a.contains(leg) && keep(leg)));
        merged
    }

    fn live(&self) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|&i| self.slots[i].is_some())
            .collect()
    }

    fn legs(&self, slot: usize) -> &[LegId] {
        self.slots[slot].as_deref().unwrap_or_default()
    }

    /// Memory-removed cost of every connected pair, cheapest first.
    fn candidates(&self, live: &[usize]) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for (n, &left) in live.iter().enumerate() {
            let a = self.legs(left);
            for &right in &live[n + 1..] {
                let b = self.legs(right);
                if !a.iter().any(|leg| b.contains(leg)) {
                    continue;
                }
                let merged = self.merged_legs(a, b);
                let cost = self.size(&merged) - self.size(a) - self.size(b);
                candidates.push(Candidate { cost, left, right });
            }
        }
        candidates.sort_by(|x, y| x.cost.total_cmp(&y.cost));
        candidates
    }

    /// The two smallest live slots, used when nothing is connected.
    fn outer_product(&self, live: &[usize]) -> Candidate {
        let mut by_size: Vec<usize> = live.to_vec();
        by_size.sort_by(|&x, &y| self.size(self.legs(x)).total_cmp(&self.size(self.legs(y))));
        let (left, right) = (by_size[0].min(by_size[1]), by_size[0].max(by_size[1]));
        Candidate {
            cost: 0.0,
            left,
            right,
        }
    }

    fn apply(&mut self, left: usize, right: usize) {
        let a = self.slots[left].take().unwrap_or_default();
        let b = self.slots[right].take().unwrap_or_default();
        let merged = self.merged_legs(&a, &b);
        for leg in a.iter().chain(&b) {
            if let Some(count) = self.ref_counts.get_mut(leg) {
                *count = count.saturating_sub(1);
            }
        }
        for &leg in &merged {
            *self.ref_counts.entry(leg).or_insert(0) += 1;
        }
        self.slots[left] = Some(merged);
    }

    fn greedy(mut self, mut thermal: Option<(&mut StdRng, f64)>) -> SimplePath {
        let mut path = Vec::with_capacity(self.slots.len().saturating_sub(1));
        loop {
            let live = self.live();
            if live.len() < 2 {
                break;
            }
            let candidates = self.candidates(&live);
            let choice = if candidates.is_empty() {
                self.outer_product(&live)
            } else if let Some((rng, temperature)) = thermal.as_mut() {
                thermal_choice(&candidates, *temperature, rng)
            } else {
                candidates[0]
            };
            self.apply(choice.left, choice.right);
            path.push((choice.left, choice.right));
        }
        path
    }
}

/// Sample among the cheapest candidates with weight `exp(-(c - c_min) / T)`.
///
/// The temperature is scaled by the magnitude of the best cost so that it is
/// insensitive to the absolute tensor sizes.
fn thermal_choice(candidates: &[Candidate], temperature: f64, rng: &mut StdRng) -> Candidate {
    let pool = &candidates[..candidates.len().min(RANDOM_GREEDY_BRANCHES)];
    let best = pool[0].cost;
    if pool.len() == 1 || temperature <= 0.0 {
        return pool[0];
    }
    let scale = temperature * best.abs().max(1.0);
    let weights: Vec<f64> = pool.iter().map(|c| (-(c.cost - best) / scale).exp()).collect();
    match WeightedIndex::new(&weights) {
        Ok(dist) => pool[dist.sample(rng)],
        Err(_) => pool[0],
    }
}
