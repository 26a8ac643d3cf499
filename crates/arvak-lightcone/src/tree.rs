//! Rooted trees consumed by the evaluator.
//!
//! The evaluator only asks for the ordered children of a vertex. Vertices
//! are named by their ancestry path: the root is the empty path and the
//! `i`-th child of `v` is `v` extended by `i`.

use std::fmt;

use rustc_hash::FxHashMap;

/// Ancestry path of a tree vertex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub Vec<usize>);

impl VertexId {
    /// The root vertex.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// The `index`-th child of this vertex.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    /// Distance from the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// True for the root vertex.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{step}")?;
        }
        write!(f, ")")
    }
}

impl<const N: usize> From<[usize; N]> for VertexId {
    fn from(path: [usize; N]) -> Self {
        Self(path.to_vec())
    }
}

/// A rooted tree answering "children of vertex".
pub trait RootedTree {
    /// Ordered children of `vertex`; empty for a leaf.
    fn children(&self, vertex: &VertexId) -> Vec<VertexId>;
}

/// The depth-bounded neighbourhood of a vertex in a `degree`-regular graph.
///
/// The root has `degree` children, every other vertex above `depth` has
/// `degree - 1`, and vertices at `depth` are leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegularTree {
    degree: usize,
    depth: usize,
}

impl RegularTree {
    /// Create a tree of the given branching degree and depth.
    pub fn new(degree: usize, depth: usize) -> Self {
        Self { degree, depth }
    }

    /// Branching degree.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Depth of the leaves.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Total number of vertices.
    pub fn vertex_count(&self) -> usize {
        let mut total = 1;
        let mut level = 1;
        for d in 0..self.depth {
            level *= if d == 0 {
                self.degree
            } else {
                self.degree.saturating_sub(1)
            };
            total += level;
        }
        total
    }
}

impl RootedTree for RegularTree {
    fn children(&self, vertex: &VertexId) -> Vec<VertexId> {
        if vertex.depth() >= self.depth {
            return Vec::new();
        }
        let count = if vertex.is_root() {
            self.degree
        } else {
            self.degree.saturating_sub(1)
        };
        (0..count).map(|i| vertex.child(i)).collect()
    }
}

/// A tree given by explicit per-vertex child counts.
///
/// Vertices without an entry are leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitTree {
    child_counts: FxHashMap<VertexId, usize>,
}

impl ExplicitTree {
    /// Create a tree consisting of the root only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `vertex` exactly `count` children.
    #[must_use]
    pub fn with_children(mut self, vertex: impl Into<VertexId>, count: usize) -> Self {
        self.child_counts.insert(vertex.into(), count);
        self
    }
}

impl RootedTree for ExplicitTree {
    fn children(&self, vertex: &VertexId) -> Vec<VertexId> {
        let count = self.child_counts.get(vertex).copied().unwrap_or(0);
        (0..count).map(|i| vertex.child(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_vertices(tree: &impl RootedTree, vertex: &VertexId) -> usize {
        1 + tree
            .children(vertex)
            .iter()
            .map(|c| count_vertices(tree, c))
            .sum::<usize>()
    }

    #[test]
    fn test_regular_tree_shape() {
        let tree = RegularTree::new(3, 2);
        let root = VertexId::root();
        assert_eq!(tree.children(&root).len(), 3);
        assert_eq!(tree.children(&VertexId::from([0])).len(), 2);
        assert!(tree.children(&VertexId::from([0, 1])).is_empty());
        assert_eq!(count_vertices(&tree, &root), 10);
        assert_eq!(tree.vertex_count(), 10);
    }

    #[test]
    fn test_children_extend_ancestry_path() {
        let tree = RegularTree::new(4, 3);
        let children = tree.children(&VertexId::from([2]));
        assert_eq!(
            children,
            vec![
                VertexId::from([2, 0]),
                VertexId::from([2, 1]),
                VertexId::from([2, 2])
            ]
        );
    }

    #[test]
    fn test_explicit_tree() {
        let tree = ExplicitTree::new()
            .with_children(VertexId::root(), 2)
            .with_children([1], 3);
        assert_eq!(tree.children(&VertexId::from([0])), Vec::<VertexId>::new());
        assert_eq!(tree.children(&VertexId::from([1])).len(), 3);
        assert_eq!(count_vertices(&tree, &VertexId::root()), 6);
    }

    #[test]
    fn test_display() {
        assert_eq!(VertexId::root().to_string(), "()");
        assert_eq!(VertexId::from([0, 2]).to_string(), "(0, 2)");
    }
}
