//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::f64::consts::FRAC_PI_4;

use arvak_lightcone::{AngleSchedule, Observables, RootedTree, VertexId};
use ndarray::Array2;
use num_complex::Complex64;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// p = 1 optimum for 3-regular graphs.
pub fn p1_schedule() -> AngleSchedule {
    AngleSchedule::new(vec![-FRAC_PI_4], vec![(1.0 / 2.0_f64.sqrt()).atan()]).unwrap()
}

/// p = 2 optimum for 3-regular graphs.
pub fn p2_schedule() -> AngleSchedule {
    AngleSchedule::new(
        vec![2.0 * 2.12560098, 2.0 * -0.2923307],
        vec![-0.4878635, 2.24375996],
    )
    .unwrap()
}

/// p = 3 optimum for 3-regular graphs.
pub fn p3_schedule() -> AngleSchedule {
    AngleSchedule::new(
        vec![-1.2179003614135828, -0.919135388006731, -0.47134027402675227],
        vec![0.4218611104081891, 0.7984026466580224, 0.9369808532109891],
    )
    .unwrap()
}

/// Near-optimal p = 4 angles for 3-regular graphs.
pub fn p4_schedule() -> AngleSchedule {
    AngleSchedule::new(
        vec![-1.2, -0.868, -0.594, -0.318],
        vec![0.409, 0.781, 0.988, 1.156],
    )
    .unwrap()
}

/// Hermitian 2x2 operator `a·I + x·X + y·Y + z·Z`.
pub fn hermitian(a: f64, x: f64, y: f64, z: f64) -> Array2<Complex64> {
    ndarray::array![[c(a + z, 0.0), c(x, -y)], [c(x, y), c(a - z, 0.0)]]
}

// ---------------------------------------------------------------------------
// Brute-force statevector reference
// ---------------------------------------------------------------------------

/// All vertices (pre-order) and parent-child edges of a rooted tree.
fn flatten(tree: &impl RootedTree, root: &VertexId) -> (Vec<VertexId>, Vec<(usize, usize)>) {
    let mut vertices = vec![root.clone()];
    let mut edges = Vec::new();
    let mut next = 0;
    while next < vertices.len() {
        let parent = next;
        for child in tree.children(&vertices[parent].clone()) {
            vertices.push(child);
            edges.push((parent, vertices.len() - 1));
        }
        next += 1;
    }
    (vertices, edges)
}

/// Apply a 2x2 operator to one qubit of a statevector.
fn apply_single(amplitudes: &mut [Complex64], qubit: usize, op: &Array2<Complex64>) {
    let mask = 1usize << qubit;
    for i in 0..amplitudes.len() {
        if i & mask == 0 {
            let j = i | mask;
            let (a0, a1) = (amplitudes[i], amplitudes[j]);
            amplitudes[i] = op[[0, 0]] * a0 + op[[0, 1]] * a1;
            amplitudes[j] = op[[1, 0]] * a0 + op[[1, 1]] * a1;
        }
    }
}

/// `<psi| (x)_v O_v |psi>` by explicit simulation of the QAOA circuit on the
/// whole tree graph.
pub fn statevector_expectation(
    tree: &impl RootedTree,
    root: &VertexId,
    schedule: &AngleSchedule,
    observables: &Observables,
) -> Complex64 {
    let (vertices, edges) = flatten(tree, root);
    let n = vertices.len();
    assert!(n <= 20, "tree too large for brute force: {n} vertices");
    let dim = 1usize << n;
    let mut psi = vec![c(1.0 / (dim as f64).sqrt(), 0.0); dim];

    for (&beta, &gamma) in schedule.betas().iter().zip(schedule.gammas()) {
        let (s, co) = (gamma / 2.0).sin_cos();
        for (i, amp) in psi.iter_mut().enumerate() {
            let mut phase = c(1.0, 0.0);
            for &(u, v) in &edges {
                let aligned = ((i >> u) & 1) == ((i >> v) & 1);
                phase *= if aligned { c(co, -s) } else { c(co, s) };
            }
            *amp *= phase;
        }
        let (s, co) = (beta / 2.0).sin_cos();
        let mixer = ndarray::array![[c(co, 0.0), c(0.0, -s)], [c(0.0, -s), c(co, 0.0)]];
        for q in 0..n {
            apply_single(&mut psi, q, &mixer);
        }
    }

    let mut phi = psi.clone();
    for (q, vertex) in vertices.iter().enumerate() {
        if let Some(op) = observables.get(vertex) {
            apply_single(&mut phi, q, op);
        }
    }
    psi.iter().zip(&phi).map(|(a, b)| a.conj() * b).sum()
}
