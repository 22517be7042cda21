//! Core mesh data types.
//!
//! Vertices, edges and triangles live in separate arenas owned by
//! [`MeshTopology`](crate::topology::MeshTopology) and refer to each other by
//! dense `u32` ids, so the edge ↔ triangle back-references never form an
//! ownership cycle.

use nalgebra::Point3;
use serde::Serialize;

/// Default per-axis tolerance for coordinate equality.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// One triangle corner as it appeared in the input stream.
///
/// The `id` is unique per occurrence, not per location: the same point
/// referenced by six triangles yields six coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// 3D position.
    pub position: Point3<f64>,

    /// Position of this corner in the flattened input stream.
    pub id: u32,
}

impl Coordinate {
    /// Create a coordinate from a position and its stream id.
    #[inline]
    pub fn new(position: Point3<f64>, id: u32) -> Self {
        Self { position, id }
    }

    /// Create a coordinate from raw components.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64, id: u32) -> Self {
        Self::new(Point3::new(x, y, z), id)
    }

    /// Tolerance equality: every axis differs by at most `epsilon`.
    ///
    /// This is an L∞ box test and is not transitive.
    #[inline]
    pub fn approx_eq(&self, other: &Coordinate, epsilon: f64) -> bool {
        (0..3).all(|axis| (self.position[axis] - other.position[axis]).abs() <= epsilon)
    }
}

/// A merged vertex. Ids are dense and follow creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Dense vertex id (0..vertex_count).
    pub id: u32,

    /// Copy of the representative coordinate this vertex was created from.
    pub coordinate: Coordinate,
}

impl Vertex {
    /// Position of the vertex.
    #[inline]
    pub fn position(&self) -> Point3<f64> {
        self.coordinate.position
    }
}

/// An undirected edge between two merged vertices.
///
/// `start`/`end` keep the direction in which the first incident triangle
/// traversed the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Dense edge id (0..edge_count).
    pub id: u32,

    /// Vertex id the creating triangle left from.
    pub start: u32,

    /// Vertex id the creating triangle arrived at.
    pub end: u32,

    /// Ids of every triangle using this edge, in stream order.
    pub incident_triangles: Vec<u32>,
}

impl Edge {
    /// Number of triangles sharing this edge.
    #[inline]
    pub fn incident_count(&self) -> usize {
        self.incident_triangles.len()
    }

    /// Shared by exactly two triangles.
    #[inline]
    pub fn is_manifold(&self) -> bool {
        self.incident_count() == 2
    }

    /// Used by a single triangle.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.incident_count() == 1
    }

    /// Shared by three or more triangles.
    #[inline]
    pub fn is_singular(&self) -> bool {
        self.incident_count() > 2
    }
}

/// One edge slot of a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeUse {
    /// Edge id.
    pub edge: u32,

    /// `true` when the triangle created the edge, so its traversal matches the
    /// stored `start → end`. `false` when an earlier triangle fixed the direction.
    pub forward: bool,
}

/// A triangle as three edge slots in corner-pair order 0-1, 1-2, 2-0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangle {
    /// Dense triangle id, equal to its position in the input stream.
    pub id: u32,

    /// Edge slots with their orientation flags.
    pub edges: [EdgeUse; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq_is_per_axis() {
        let a = Coordinate::from_coords(0.0, 0.0, 0.0, 0);
        let b = Coordinate::from_coords(9e-7, -9e-7, 9e-7, 1);
        let c = Coordinate::from_coords(0.0, 0.0, 2e-6, 2);

        assert!(a.approx_eq(&b, DEFAULT_EPSILON));
        assert!(!a.approx_eq(&c, DEFAULT_EPSILON));
    }

    #[test]
    fn test_approx_eq_uses_box_not_sphere() {
        // Euclidean distance is ~1.56e-6 but each axis is within tolerance.
        let a = Coordinate::from_coords(0.0, 0.0, 0.0, 0);
        let b = Coordinate::from_coords(9e-7, 9e-7, 9e-7, 1);
        assert!(a.approx_eq(&b, DEFAULT_EPSILON));
    }

    #[test]
    fn test_edge_classification() {
        let mut edge = Edge {
            id: 0,
            start: 0,
            end: 1,
            incident_triangles: vec![0],
        };
        assert!(edge.is_boundary());
        assert!(!edge.is_manifold());

        edge.incident_triangles.push(1);
        assert!(edge.is_manifold());

        edge.incident_triangles.push(2);
        assert!(edge.is_singular());
        assert_eq!(edge.incident_count(), 3);
    }
}
