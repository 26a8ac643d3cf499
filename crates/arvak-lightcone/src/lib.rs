//! `arvak-lightcone`: exact QAOA expectation values on regular graphs.
//!
//! After `p` rounds of nearest-neighbour evolution a local observable only
//! depends on the depth-`p` neighbourhood of its support. On a regular graph
//! of large girth that neighbourhood is a regular tree, and the expectation
//! value is a tree-shaped tensor network contracted bottom-up:
//!
//! - [`gates`] builds the per-star evolution operators
//! - [`builder`] turns them into per-vertex [`TensorStack`]s
//! - [`stack`] pairs branch and root legs and contracts stacks
//! - [`evaluator`] walks the tree and returns the final scalar
//!
//! # Quick start
//!
//! ```rust
//! use arvak_lightcone::{AngleSchedule, LightconeEvaluator, maxcut};
//!
//! // p = 1 on 3-regular graphs at the optimal angles.
//! let schedule = AngleSchedule::new(
//!     vec![-std::f64::consts::FRAC_PI_4],
//!     vec![(1.0 / 2.0_f64.sqrt()).atan()],
//! )
//! .unwrap();
//! let evaluator = LightconeEvaluator::default();
//! let cut = maxcut::edge_cut_fraction(&evaluator, 3, &schedule).unwrap();
//! assert!((cut - 0.6924500897298674).abs() < 1e-9);
//! ```

pub mod builder;
pub mod error;
pub mod evaluator;
pub mod gates;
pub mod maxcut;
pub mod network;
pub mod observable;
pub mod path;
pub mod schedule;
pub mod stack;
pub mod tensor;
pub mod tree;

pub use builder::{boundary_stack, bulk_stack};
pub use error::{LightconeError, LightconeResult, PreconditionViolation};
pub use evaluator::{EvaluatorConfig, LightconeEvaluator};
pub use network::{LegId, Node, NodeId, TensorNetwork};
pub use observable::Observables;
pub use path::{ContractionStrategy, SimplePath};
pub use schedule::AngleSchedule;
pub use stack::TensorStack;
pub use tensor::{ElementaryTensor, TensorKind};
pub use tree::{ExplicitTree, RegularTree, RootedTree, VertexId};
