//! Tolerance-aware k-d tree for finding coincident coordinates.
//!
//! The tree is built once by alternating-axis median splits and is never
//! modified afterwards. Every internal node keeps the bounding box of its
//! subtree, which is the only thing queries use for pruning.

use tracing::debug;

use crate::types::{Coordinate, DEFAULT_EPSILON};

const DIM: usize = 3;

#[derive(Debug, Clone)]
struct Node {
    min: [f64; DIM],
    max: [f64; DIM],
    kind: NodeKind,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Leaf(Coordinate),
    Split { left: u32, right: u32 },
}

/// Balanced k-d tree answering "which coordinates lie within ε of this one".
///
/// Nodes live in a flat arena and reference their children by index.
///
/// # Example
///
/// ```
/// use mesh_manifold::{Coordinate, CoordinateIndex};
///
/// let coords = vec![
///     Coordinate::from_coords(0.0, 0.0, 0.0, 0),
///     Coordinate::from_coords(1.0, 0.0, 0.0, 1),
///     Coordinate::from_coords(0.0, 0.0, 5e-7, 2),
/// ];
/// let index = CoordinateIndex::build(&coords);
///
/// let mut ids: Vec<u32> = index.matches(&coords[0]).iter().map(|c| c.id).collect();
/// ids.sort();
/// assert_eq!(ids, vec![0, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct CoordinateIndex {
    nodes: Vec<Node>,
    root: Option<u32>,
    epsilon: f64,
    len: usize,
}

impl CoordinateIndex {
    /// Build an index with the default tolerance of `1e-6`.
    pub fn build(coordinates: &[Coordinate]) -> Self {
        Self::with_epsilon(coordinates, DEFAULT_EPSILON)
    }

    /// Build an index with a custom per-axis tolerance.
    pub fn with_epsilon(coordinates: &[Coordinate], epsilon: f64) -> Self {
        // Median selection reorders its input, so work on a private copy.
        let mut scratch = coordinates.to_vec();
        let mut nodes = Vec::with_capacity((2 * scratch.len()).saturating_sub(1));

        let root = if scratch.is_empty() {
            None
        } else {
            Some(build_node(&mut nodes, &mut scratch, 0))
        };

        debug!(
            "Built coordinate index: {} points, {} nodes, epsilon = {:e}",
            coordinates.len(),
            nodes.len(),
            epsilon
        );

        Self {
            nodes,
            root,
            epsilon,
            len: coordinates.len(),
        }
    }

    /// Number of indexed coordinates.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no coordinates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Per-axis tolerance used by [`matches`](Self::matches).
    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Length of the longest root-to-leaf path, in edges.
    ///
    /// Always `⌈log2 N⌉` for `N` indexed coordinates (0 when `N <= 1`).
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };

        let mut deepest = 0;
        let mut stack = vec![(root, 0usize)];
        while let Some((idx, level)) = stack.pop() {
            match self.nodes[idx as usize].kind {
                NodeKind::Leaf(_) => deepest = deepest.max(level),
                NodeKind::Split { left, right } => {
                    stack.push((left, level + 1));
                    stack.push((right, level + 1));
                }
            }
        }
        deepest
    }

    /// Every indexed coordinate within `epsilon` of `query` on all three axes.
    ///
    /// A query that was itself indexed is always part of its own result.
    /// Result order is unspecified.
    pub fn matches(&self, query: &Coordinate) -> Vec<Coordinate> {
        let mut found = Vec::new();
        let Some(root) = self.root else {
            return found;
        };

        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx as usize];
            match node.kind {
                NodeKind::Leaf(coord) => {
                    if coord.approx_eq(query, self.epsilon) {
                        found.push(coord);
                    }
                }
                NodeKind::Split { left, right } => {
                    if self.may_contain(node, query) {
                        stack.push(right);
                        stack.push(left);
                    }
                }
            }
        }

        found
    }

    /// False when the ε-inflated box of `node` cannot contain `query`.
    fn may_contain(&self, node: &Node, query: &Coordinate) -> bool {
        (0..DIM).all(|axis| {
            let q = query.position[axis];
            node.min[axis] - self.epsilon <= q && node.max[axis] + self.epsilon >= q
        })
    }
}

/// Build the subtree over `coords`, returning the arena index of its root.
///
/// `coords` must be non-empty. The left half receives `⌈n/2⌉` points.
fn build_node(nodes: &mut Vec<Node>, coords: &mut [Coordinate], axis: usize) -> u32 {
    if coords.len() == 1 {
        let coord = coords[0];
        let p = [coord.position.x, coord.position.y, coord.position.z];
        return push_node(
            nodes,
            Node {
                min: p,
                max: p,
                kind: NodeKind::Leaf(coord),
            },
        );
    }

    let mid = (coords.len() - 1) / 2;
    coords.select_nth_unstable_by(mid, |a, b| a.position[axis].total_cmp(&b.position[axis]));

    let next_axis = (axis + 1) % DIM;
    let (lower, upper) = coords.split_at_mut(mid + 1);
    let left = build_node(nodes, lower, next_axis);
    let right = build_node(nodes, upper, next_axis);

    let (l, r) = (&nodes[left as usize], &nodes[right as usize]);
    let mut min = [0.0; DIM];
    let mut max = [0.0; DIM];
    for a in 0..DIM {
        min[a] = l.min[a].min(r.min[a]);
        max[a] = l.max[a].max(r.max[a]);
    }

    push_node(
        nodes,
        Node {
            min,
            max,
            kind: NodeKind::Split { left, right },
        },
    )
}

fn push_node(nodes: &mut Vec<Node>, node: Node) -> u32 {
    nodes.push(node);
    (nodes.len() - 1) as u32
}
