//! Property-based tests for light-cone evaluation.
//!
//! Random small trees, angles and Hermitian observables are checked against
//! normalization, reality and a brute-force statevector simulation.

mod common;

use std::f64::consts::PI;

use arvak_lightcone::{
    AngleSchedule, ContractionStrategy, EvaluatorConfig, LightconeEvaluator, Observables,
    RegularTree, VertexId,
};
use ndarray::Array2;
use num_complex::Complex64;
use proptest::prelude::*;

use common::{hermitian, statevector_expectation};

/// Random angle schedule with 1-2 rounds.
fn arb_schedule() -> impl Strategy<Value = AngleSchedule> {
    (1_usize..=2).prop_flat_map(|rounds| {
        (
            prop::collection::vec(-PI..PI, rounds),
            prop::collection::vec(-PI..PI, rounds),
        )
            .prop_map(|(betas, gammas)| {
                AngleSchedule::new(betas, gammas).expect("rounds match by construction")
            })
    })
}

/// Small trees that stay within brute-force reach (at most 10 vertices).
fn arb_tree() -> impl Strategy<Value = RegularTree> {
    prop_oneof![
        (1_usize..=4).prop_map(|degree| RegularTree::new(degree, 1)),
        (1_usize..=3).prop_map(|degree| RegularTree::new(degree, 2)),
        Just(RegularTree::new(2, 3)),
    ]
}

/// Random Hermitian 2x2 operator.
fn arb_hermitian() -> impl Strategy<Value = Array2<Complex64>> {
    (-1.0..1.0, -1.0..1.0, -1.0..1.0, -1.0..1.0).prop_map(|(a, x, y, z)| hermitian(a, x, y, z))
}

/// Hermitian operators on the root and on one of its children.
fn arb_observables(degree: usize) -> impl Strategy<Value = Observables> {
    (0..degree, arb_hermitian(), arb_hermitian()).prop_map(|(child, root_op, child_op)| {
        Observables::new()
            .with(VertexId::root(), root_op)
            .and_then(|obs| obs.with([child], child_op))
            .expect("2x2 operators")
    })
}

fn arb_case() -> impl Strategy<Value = (RegularTree, Observables)> {
    arb_tree().prop_flat_map(|tree| {
        let degree = tree.degree();
        (Just(tree), arb_observables(degree))
    })
}

fn evaluate(
    config: EvaluatorConfig,
    tree: &RegularTree,
    schedule: &AngleSchedule,
    observables: &Observables,
) -> Complex64 {
    LightconeEvaluator::new(config)
        .evaluate(tree, &VertexId::root(), schedule, observables)
        .expect("evaluation succeeds")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Identity observables always contract to `<psi|psi> = 1`.
    #[test]
    fn test_identity_observables_normalize(tree in arb_tree(), schedule in arb_schedule()) {
        let value = evaluate(EvaluatorConfig::default(), &tree, &schedule, &Observables::new());
        prop_assert!((value - Complex64::new(1.0, 0.0)).norm() < 1e-10, "norm {}", value);
    }

    /// Hermitian observables give real expectation values that agree with
    /// explicit simulation of the circuit on the same tree.
    #[test]
    fn test_matches_statevector((tree, observables) in arb_case(), schedule in arb_schedule()) {
        let value = evaluate(EvaluatorConfig::default(), &tree, &schedule, &observables);
        let expected = statevector_expectation(&tree, &VertexId::root(), &schedule, &observables);
        prop_assert!(value.im.abs() < 1e-9, "imaginary part {}", value.im);
        prop_assert!((value - expected).norm() < 1e-9, "{} vs {}", value, expected);
    }

    /// The contraction order never changes the value.
    #[test]
    fn test_random_greedy_agrees_with_greedy(
        (tree, observables) in arb_case(),
        schedule in arb_schedule(),
        seed in any::<u64>(),
        temperature in 0.1..10.0,
    ) {
        let greedy = evaluate(EvaluatorConfig::default(), &tree, &schedule, &observables);
        let random = evaluate(
            EvaluatorConfig::default()
                .with_strategy(ContractionStrategy::RandomGreedy { seed, temperature })
                .with_parallel(false),
            &tree,
            &schedule,
            &observables,
        );
        prop_assert!((greedy - random).norm() < 1e-10, "{} vs {}", greedy, random);
    }
}
