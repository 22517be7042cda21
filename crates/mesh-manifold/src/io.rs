//! Triangle soup loading (STL, OBJ) and OBJ export of the merged topology.

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::ops::Range;
use std::path::Path;

use hashbrown::HashSet;
use nalgebra::Point3;
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::topology::MeshTopology;
use crate::types::Coordinate;

/// Read access to triangle corners grouped by solid.
///
/// Solids cover contiguous, ordered ranges of triangle indices.
pub trait TriangleSource {
    /// Number of solids.
    fn solid_count(&self) -> usize;

    /// Half-open range of triangle indices belonging to `solid`.
    fn solid_triangles(&self, solid: usize) -> Range<usize>;

    /// Position of corner `corner` (0, 1 or 2) of triangle `triangle`.
    fn corner(&self, triangle: usize, corner: usize) -> [f32; 3];
}

/// Unindexed triangles, three corners each, as stored in STL files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleSoup {
    triangles: Vec<[[f32; 3]; 3]>,
    solids: Vec<Range<usize>>,
}

impl TriangleSoup {
    /// Create an empty soup with no solids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a soup holding a single solid.
    pub fn from_triangles(triangles: impl IntoIterator<Item = [[f32; 3]; 3]>) -> Self {
        let mut soup = Self::new();
        soup.push_solid(triangles);
        soup
    }

    /// Append a solid made of `triangles`.
    pub fn push_solid(&mut self, triangles: impl IntoIterator<Item = [[f32; 3]; 3]>) {
        let start = self.triangles.len();
        self.triangles.extend(triangles);
        self.solids.push(start..self.triangles.len());
    }

    /// All triangles across solids, in order.
    pub fn triangles(&self) -> &[[[f32; 3]; 3]] {
        &self.triangles
    }

    /// Total number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

impl TriangleSource for TriangleSoup {
    fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn solid_triangles(&self, solid: usize) -> Range<usize> {
        self.solids[solid].clone()
    }

    fn corner(&self, triangle: usize, corner: usize) -> [f32; 3] {
        self.triangles[triangle][corner]
    }
}

/// Flatten a source into the corner stream: solids, then triangles, then
/// corners 0, 1, 2. Ids are stream positions starting at 0.
pub fn coordinates_from_source<S: TriangleSource + ?Sized>(source: &S) -> Vec<Coordinate> {
    let mut coordinates = Vec::new();

    for solid in 0..source.solid_count() {
        for triangle in source.solid_triangles(solid) {
            for corner in 0..3 {
                let [x, y, z] = source.corner(triangle, corner);
                let id = coordinates.len() as u32;
                coordinates.push(Coordinate::new(
                    Point3::new(x as f64, y as f64, z as f64),
                    id,
                ));
            }
        }
    }

    coordinates
}

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
}

impl MeshFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "stl" => Some(MeshFormat::Stl),
                "obj" => Some(MeshFormat::Obj),
                _ => None,
            })
    }
}

/// Load a triangle soup, auto-detecting format from extension.
///
/// Nothing is cleaned up: degenerate triangles are kept and a file without
/// triangles yields an empty soup.
pub fn load_soup(path: &Path) -> MeshResult<TriangleSoup> {
    let format = MeshFormat::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path.extension().and_then(|e| e.to_str()).map(String::from),
    })?;

    info!("Loading triangles from {:?} (format: {:?})", path, format);

    let soup = match format {
        MeshFormat::Stl => load_stl(path)?,
        MeshFormat::Obj => load_obj(path)?,
    };

    info!(
        "Loaded {} triangles in {} solid(s)",
        soup.triangle_count(),
        soup.solid_count()
    );

    Ok(soup)
}

/// Load an STL file.
///
/// Binary files hold exactly one solid. ASCII files may hold several
/// `solid ... endsolid` blocks; each block becomes its own solid.
fn load_stl(path: &Path) -> MeshResult<TriangleSoup> {
    let bytes = std::fs::read(path).map_err(|e| MeshError::IoRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let parse_error = |details: String| MeshError::ParseError {
        path: path.to_path_buf(),
        details,
    };

    let mut soup = TriangleSoup::new();

    match ascii_stl_text(&bytes) {
        Some(text) => {
            let blocks = split_ascii_solids(text).map_err(parse_error)?;
            for (i, block) in blocks.iter().enumerate() {
                let triangles = read_stl_block(block.as_bytes())
                    .map_err(|e| parse_error(format!("solid {}: {}", i, e)))?;
                soup.push_solid(triangles);
            }
        }
        None => {
            let triangles = read_stl_block(&bytes).map_err(|e| parse_error(e.to_string()))?;
            soup.push_solid(triangles);
        }
    }

    debug!(
        "STL contains {} triangles in {} solid(s)",
        soup.triangle_count(),
        soup.solid_count()
    );

    Ok(soup)
}

/// The file as text when it is ASCII STL, `None` when it is binary.
///
/// Binary headers may also start with `solid`, so a size matching the
/// binary triangle count wins.
fn ascii_stl_text(bytes: &[u8]) -> Option<&str> {
    if bytes.len() >= 84 {
        let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as u64;
        if 84 + 50 * count == bytes.len() as u64 {
            return None;
        }
    }

    let text = std::str::from_utf8(bytes).ok()?;
    text.trim_start().starts_with("solid").then_some(text)
}

/// Split ASCII STL text into its `solid ... endsolid` blocks.
///
/// Blank lines between blocks are skipped. Anything else outside a block is
/// an error. A final block without `endsolid` is kept as is.
fn split_ascii_solids(text: &str) -> Result<Vec<&str>, String> {
    let mut blocks = Vec::new();
    let mut start: Option<usize> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        match start {
            None if trimmed.is_empty() => {}
            None if trimmed.starts_with("solid") => start = Some(offset),
            None => {
                return Err(format!("unexpected content outside a solid: {:?}", trimmed));
            }
            Some(s) if trimmed.starts_with("endsolid") => {
                blocks.push(&text[s..offset + line.len()]);
                start = None;
            }
            Some(_) => {}
        }
        offset += line.len();
    }

    if let Some(s) = start {
        blocks.push(&text[s..]);
    }

    Ok(blocks)
}

/// Parse one STL solid into per-corner triangles.
fn read_stl_block(bytes: &[u8]) -> std::io::Result<Vec<[[f32; 3]; 3]>> {
    // stl_io indexes exactly equal vertices; expand back to per-corner positions.
    let stl = stl_io::read_stl(&mut Cursor::new(bytes))?;
    Ok(stl
        .faces
        .iter()
        .map(|face| face.vertices.map(|i| stl.vertices[i].0))
        .collect())
}

/// Load an OBJ file; each model becomes one solid.
fn load_obj(path: &Path) -> MeshResult<TriangleSoup> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| MeshError::ParseError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    let mut soup = TriangleSoup::new();

    for model in &models {
        debug!("OBJ model '{}': loading", model.name);

        let positions = &model.mesh.positions;
        let corner = |index: u32| -> MeshResult<[f32; 3]> {
            let base = index as usize * 3;
            positions
                .get(base..base + 3)
                .map(|p| [p[0], p[1], p[2]])
                .ok_or_else(|| MeshError::ParseError {
                    path: path.to_path_buf(),
                    details: format!("model '{}' references missing vertex {}", model.name, index),
                })
        };

        let mut triangles = Vec::with_capacity(model.mesh.indices.len() / 3);
        for chunk in model.mesh.indices.chunks_exact(3) {
            triangles.push([corner(chunk[0])?, corner(chunk[1])?, corner(chunk[2])?]);
        }
        soup.push_solid(triangles);
    }

    debug!(
        "OBJ loaded: {} triangles from {} models",
        soup.triangle_count(),
        models.len()
    );

    Ok(soup)
}

/// Write the topology as OBJ text.
///
/// Output is a count header, one `v` line per vertex in ascending id order and
/// one `f` line per triangle in id order with 1-based indices. Each face
/// corner is the edge's `start` for a forward slot and its `end` otherwise.
pub fn write_obj<W: Write>(topology: &MeshTopology, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "# verticesCount: {}", topology.vertex_count())?;
    writeln!(writer, "# edgesCount: {}", topology.edge_count())?;
    writeln!(writer, "# trianglesCount: {}", topology.triangle_count())?;

    // Vertices reachable through triangle edges, first-seen order, then by id.
    let mut seen_edges: HashSet<u32> = HashSet::new();
    let mut seen_vertices: HashSet<u32> = HashSet::new();
    let mut used: Vec<u32> = Vec::with_capacity(topology.vertex_count());
    for triangle in topology.triangles() {
        for slot in &triangle.edges {
            if !seen_edges.insert(slot.edge) {
                continue;
            }
            let edge = &topology.edges()[slot.edge as usize];
            for v in [edge.start, edge.end] {
                if seen_vertices.insert(v) {
                    used.push(v);
                }
            }
        }
    }
    used.sort_unstable();

    for id in used {
        let p = topology.vertices()[id as usize].position();
        writeln!(writer, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
    }

    for triangle in topology.triangles() {
        // OBJ uses 1-based indexing
        let [i0, i1, i2] = topology.face_vertices(triangle).map(|v| v as u64 + 1);
        writeln!(writer, "f {} {} {}", i0, i1, i2)?;
    }

    writer.flush()
}

/// Save the topology to an OBJ file.
///
/// Fails with [`MeshError::IoWrite`] when the path cannot be created or written.
pub fn save_obj(topology: &MeshTopology, path: &Path) -> MeshResult<()> {
    info!("Saving topology to {:?} (OBJ format)", path);

    let file = File::create(path).map_err(|e| MeshError::IoWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    write_obj(topology, BufWriter::new(file)).map_err(|e| MeshError::IoWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!(
        "Saved {} vertices and {} faces to {:?}",
        topology.vertex_count(),
        topology.triangle_count(),
        path
    );

    Ok(())
}
