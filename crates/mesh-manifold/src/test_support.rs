//! Shared fixtures for unit tests.

use crate::config::CheckConfig;
use crate::dedup::resolve_duplicates;
use crate::io::{coordinates_from_source, TriangleSoup};
use crate::kdtree::CoordinateIndex;
use crate::topology::MeshTopology;

const CUBE_CORNERS: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
];

/// Consistently wound, so every edge is traversed once in each direction.
const CUBE_FACES: [[usize; 3]; 12] = [
    [0, 1, 2],
    [0, 2, 3],
    [4, 6, 5],
    [4, 7, 6],
    [0, 4, 5],
    [0, 5, 1],
    [2, 6, 7],
    [2, 7, 3],
    [0, 3, 7],
    [0, 7, 4],
    [1, 5, 6],
    [1, 6, 2],
];

/// Unit cube as 12 triangles / 36 corners.
pub(crate) fn cube_soup() -> TriangleSoup {
    TriangleSoup::from_triangles(CUBE_FACES.iter().map(|f| f.map(|i| CUBE_CORNERS[i])))
}

/// One isolated triangle.
pub(crate) fn single_triangle_soup() -> TriangleSoup {
    TriangleSoup::from_triangles([[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]])
}

/// Run index → merge → build with the default configuration.
pub(crate) fn build_default(soup: &TriangleSoup) -> MeshTopology {
    let config = CheckConfig::default();
    let coords = coordinates_from_source(soup);
    let index = CoordinateIndex::with_epsilon(&coords, config.epsilon);
    let reps = resolve_duplicates(&coords, &index, config.merge);
    MeshTopology::build(&coords, &reps)
}
