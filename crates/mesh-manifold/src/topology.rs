//! Vertex/edge/triangle graph built from a merged triangle-corner stream.

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use tracing::info;

use crate::types::{Coordinate, Edge, EdgeUse, Triangle, Vertex};

/// Immutable connectivity graph of a triangle soup after vertex merging.
///
/// Every three consecutive input coordinates form one triangle. Edges are
/// deduplicated on their unordered vertex pair and remember every triangle
/// that uses them.
///
/// # Example
///
/// ```
/// use mesh_manifold::{Coordinate, MeshTopology};
///
/// let coords = vec![
///     Coordinate::from_coords(0.0, 0.0, 0.0, 0),
///     Coordinate::from_coords(1.0, 0.0, 0.0, 1),
///     Coordinate::from_coords(0.0, 1.0, 0.0, 2),
/// ];
/// let topology = MeshTopology::build(&coords, &[0, 1, 2]);
///
/// assert_eq!(topology.vertex_count(), 3);
/// assert_eq!(topology.edge_count(), 3);
/// assert_eq!(topology.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeshTopology {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    triangles: Vec<Triangle>,
}

impl MeshTopology {
    /// Build the graph from the corner stream and its representative mapping.
    ///
    /// `representative[i]` is the representative coordinate id of
    /// `coordinates[i]`, as returned by
    /// [`resolve_duplicates`](crate::dedup::resolve_duplicates).
    ///
    /// Vertices are created in order of first appearance of their
    /// representative. For each triangle the corner pairs 0-1, 1-2, 2-0 are
    /// visited in that order; the first triangle to use a vertex pair creates
    /// the edge in its own traversal direction and gets `forward = true`,
    /// every later triangle is appended to the edge and gets `forward = false`.
    /// Trailing coordinates that do not complete a triangle are ignored.
    pub fn build(coordinates: &[Coordinate], representative: &[u32]) -> Self {
        debug_assert_eq!(coordinates.len(), representative.len());

        // Vertices, and the vertex each corner resolves to.
        let mut vertex_of_rep: Vec<Option<u32>> = vec![None; coordinates.len()];
        let mut vertices: Vec<Vertex> = Vec::new();
        let mut corner_vertex: Vec<u32> = Vec::with_capacity(representative.len());

        for &rep in representative {
            let slot = &mut vertex_of_rep[rep as usize];
            let vertex_id = match *slot {
                Some(id) => id,
                None => {
                    let id = vertices.len() as u32;
                    vertices.push(Vertex {
                        id,
                        coordinate: coordinates[rep as usize],
                    });
                    *slot = Some(id);
                    id
                }
            };
            corner_vertex.push(vertex_id);
        }

        // Edges and triangles. Key is the unordered vertex pair (min, max).
        let mut edge_lookup: HashMap<(u32, u32), u32> = HashMap::new();
        let mut edges: Vec<Edge> = Vec::new();
        let mut triangles: Vec<Triangle> = Vec::with_capacity(corner_vertex.len() / 3);

        for (tri_idx, corners) in corner_vertex.chunks_exact(3).enumerate() {
            let tri_id = tri_idx as u32;
            let mut slots = [EdgeUse {
                edge: 0,
                forward: false,
            }; 3];

            for (j, slot) in slots.iter_mut().enumerate() {
                let p1 = corners[j];
                let p2 = corners[(j + 1) % 3];
                let key = if p1 <= p2 { (p1, p2) } else { (p2, p1) };

                *slot = match edge_lookup.entry(key) {
                    Entry::Occupied(entry) => {
                        let edge_id = *entry.get();
                        edges[edge_id as usize].incident_triangles.push(tri_id);
                        EdgeUse {
                            edge: edge_id,
                            forward: false,
                        }
                    }
                    Entry::Vacant(entry) => {
                        let edge_id = edges.len() as u32;
                        edges.push(Edge {
                            id: edge_id,
                            start: p1,
                            end: p2,
                            incident_triangles: vec![tri_id],
                        });
                        entry.insert(edge_id);
                        EdgeUse {
                            edge: edge_id,
                            forward: true,
                        }
                    }
                };
            }

            triangles.push(Triangle {
                id: tri_id,
                edges: slots,
            });
        }

        info!(
            "Built topology: {} vertices, {} edges, {} triangles",
            vertices.len(),
            edges.len(),
            triangles.len()
        );

        Self {
            vertices,
            edges,
            triangles,
        }
    }

    /// Number of merged vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of unique edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True when there are no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// All vertices in id order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All edges in id order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All triangles in id order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Vertex by id.
    pub fn vertex(&self, id: u32) -> Option<&Vertex> {
        self.vertices.get(id as usize)
    }

    /// Edge by id.
    pub fn edge(&self, id: u32) -> Option<&Edge> {
        self.edges.get(id as usize)
    }

    /// Triangle by id.
    pub fn triangle(&self, id: u32) -> Option<&Triangle> {
        self.triangles.get(id as usize)
    }

    /// The vertex a triangle leaves from in one of its edge slots.
    ///
    /// A forward slot follows the edge's stored direction and yields `start`;
    /// any other slot yields `end`.
    #[inline]
    pub fn slot_vertex(&self, slot: EdgeUse) -> u32 {
        let edge = &self.edges[slot.edge as usize];
        if slot.forward {
            edge.start
        } else {
            edge.end
        }
    }

    /// Vertex ids of a triangle in slot order, as written to exported faces.
    pub fn face_vertices(&self, triangle: &Triangle) -> [u32; 3] {
        triangle.edges.map(|slot| self.slot_vertex(slot))
    }

    /// Face vertex triples (0-based) for every triangle in id order.
    pub fn face_indices(&self) -> Vec<[u32; 3]> {
        self.triangles.iter().map(|t| self.face_vertices(t)).collect()
    }

    /// Edges used by exactly one triangle.
    pub fn boundary_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(|e| e.is_boundary())
    }

    /// Edges used by three or more triangles.
    pub fn singular_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(|e| e.is_singular())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_default, cube_soup, single_triangle_soup};
    use crate::TriangleSoup;

    #[test]
    fn test_cube_counts() {
        let topology = build_default(&cube_soup());
        assert_eq!(topology.vertex_count(), 8);
        assert_eq!(topology.edge_count(), 18);
        assert_eq!(topology.triangle_count(), 12);
        assert!(topology.edges().iter().all(Edge::is_manifold));
    }

    #[test]
    fn test_cube_orientation_is_opposite_on_shared_edges() {
        let topology = build_default(&cube_soup());

        for edge in topology.edges() {
            let [first, second] = edge.incident_triangles[..] else {
                panic!("edge {} should have two triangles", edge.id);
            };
            let flag = |tri: u32| {
                topology.triangles()[tri as usize]
                    .edges
                    .iter()
                    .find(|slot| slot.edge == edge.id)
                    .map(|slot| slot.forward)
                    .expect("triangle references edge")
            };
            assert!(flag(first), "creator of edge {} must be forward", edge.id);
            assert!(!flag(second), "second user of edge {} must be reversed", edge.id);
        }
    }

    #[test]
    fn test_cube_faces_follow_input_winding() {
        let soup = cube_soup();
        let topology = build_default(&soup);

        for (tri, face) in topology.triangles().iter().zip(topology.face_indices()) {
            let positions = face.map(|v| topology.vertices()[v as usize].position());
            for (corner, p) in positions.iter().enumerate() {
                let expected = soup.triangles()[tri.id as usize][corner];
                assert_eq!(p.x as f32, expected[0]);
                assert_eq!(p.y as f32, expected[1]);
                assert_eq!(p.z as f32, expected[2]);
            }
        }
    }

    #[test]
    fn test_single_triangle() {
        let topology = build_default(&single_triangle_soup());
        assert_eq!(topology.vertex_count(), 3);
        assert_eq!(topology.edge_count(), 3);
        assert_eq!(topology.triangle_count(), 1);
        assert_eq!(topology.boundary_edges().count(), 3);

        let tri = &topology.triangles()[0];
        assert!(tri.edges.iter().all(|slot| slot.forward));
        assert_eq!(topology.face_vertices(tri), [0, 1, 2]);
    }

    #[test]
    fn test_edge_keeps_creating_direction() {
        let topology = build_default(&single_triangle_soup());
        // Third slot is corner 2 → corner 0 and must not be normalized.
        let closing = &topology.edges()[2];
        assert_eq!((closing.start, closing.end), (2, 0));
    }

    #[test]
    fn test_vertices_in_first_appearance_order() {
        let soup = TriangleSoup::from_triangles([
            [[5.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 5.0, 0.0]],
            [[0.0, 0.0, 0.0], [5.0, 0.0, 0.0], [0.0, -5.0, 0.0]],
        ]);
        let topology = build_default(&soup);

        assert_eq!(topology.vertex_count(), 4);
        let xs: Vec<f64> = topology.vertices().iter().map(|v| v.position().x).collect();
        assert_eq!(xs, vec![5.0, 0.0, 0.0, 0.0]);
        // Vertex 0 owns coordinate 0, vertex 1 coordinate 1.
        assert_eq!(topology.vertices()[1].coordinate.id, 1);
        assert_eq!(topology.vertices()[3].coordinate.id, 5);
    }

    #[test]
    fn test_shared_edge_is_deduplicated() {
        let soup = TriangleSoup::from_triangles([
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, -1.0, 0.0]],
        ]);
        let topology = build_default(&soup);

        assert_eq!(topology.edge_count(), 5);
        let shared = &topology.edges()[0];
        assert_eq!(shared.incident_triangles, vec![0, 1]);
        assert_eq!(topology.triangles()[1].edges[0], EdgeUse { edge: 0, forward: false });
        assert_eq!(topology.face_indices()[1], [1, 0, 3]);
    }

    #[test]
    fn test_near_duplicates_become_one_vertex() {
        let soup = TriangleSoup::from_triangles([
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[1.0, 0.0, 0.0], [0.0, 0.0, 5e-7], [0.0, -1.0, 0.0]],
        ]);
        let topology = build_default(&soup);
        assert_eq!(topology.vertex_count(), 4);
        assert_eq!(topology.edges()[0].incident_count(), 2);
    }

    #[test]
    fn test_degenerate_triangle_kept() {
        let soup = TriangleSoup::from_triangles([[
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
        ]]);
        let topology = build_default(&soup);

        assert_eq!(topology.vertex_count(), 2);
        assert_eq!(topology.triangle_count(), 1);
        // Collapsed edge (0,0) plus edge (0,1) used twice by the same triangle.
        assert_eq!(topology.edge_count(), 2);
        assert_eq!(topology.edges()[1].incident_triangles, vec![0, 0]);
    }

    #[test]
    fn test_empty_input() {
        let topology = MeshTopology::build(&[], &[]);
        assert!(topology.is_empty());
        assert_eq!(topology.vertex_count(), 0);
        assert_eq!(topology.edge_count(), 0);
    }
}
