//! Non-manifold edge detection and reporting.

use nalgebra::Point3;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::topology::MeshTopology;

/// One triangle's view of an edge whose incident count is not 2.
///
/// An edge shared by three triangles produces three occurrences, one per
/// triangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NonManifoldOccurrence {
    /// Triangle that references the edge.
    pub triangle: u32,

    /// Offending edge.
    pub edge: u32,

    /// Number of triangles sharing the edge.
    pub incident_count: usize,

    /// Edge start vertex id.
    pub start_vertex: u32,

    /// Edge start position.
    pub start_position: [f64; 3],

    /// Edge end vertex id.
    pub end_vertex: u32,

    /// Edge end position.
    pub end_position: [f64; 3],
}

impl std::fmt::Display for NonManifoldOccurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [sx, sy, sz] = self.start_position;
        let [ex, ey, ez] = self.end_position;
        writeln!(f, "NonManifold: {}", self.incident_count)?;
        writeln!(f, "Triangle: {}", self.triangle)?;
        writeln!(f, "Edge: {}", self.edge)?;
        writeln!(f, "Start Vertex: {}", self.start_vertex)?;
        writeln!(f, "({}, {}, {})", sx, sy, sz)?;
        writeln!(f, "End Vertex: {}", self.end_vertex)?;
        write!(f, "({}, {}, {})", ex, ey, ez)
    }
}

/// Receiver for analyzer diagnostics.
pub trait DiagnosticSink {
    /// Called once per (triangle, non-manifold edge) pair, in triangle order.
    fn non_manifold(&mut self, occurrence: &NonManifoldOccurrence);

    /// Called after the walk with the number of occurrences reported.
    fn finished(&mut self, _total: usize) {}
}

/// Sink that logs every occurrence through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn non_manifold(&mut self, o: &NonManifoldOccurrence) {
        warn!(
            triangle = o.triangle,
            edge = o.edge,
            incident = o.incident_count,
            "non-manifold edge {} -> {} ({:?} -> {:?})",
            o.start_vertex,
            o.end_vertex,
            o.start_position,
            o.end_position
        );
    }

    fn finished(&mut self, total: usize) {
        info!("Non-manifold check finished: {} occurrence(s)", total);
    }
}

/// Sink that keeps every occurrence in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    /// Occurrences in report order.
    pub occurrences: Vec<NonManifoldOccurrence>,

    /// Total passed to [`DiagnosticSink::finished`], once the walk is done.
    pub total: Option<usize>,
}

impl DiagnosticSink for CollectingSink {
    fn non_manifold(&mut self, occurrence: &NonManifoldOccurrence) {
        self.occurrences.push(occurrence.clone());
    }

    fn finished(&mut self, total: usize) {
        self.total = Some(total);
    }
}

/// Summary of a non-manifold check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonManifoldReport {
    /// Per-triangle occurrences of edges with incident count ≠ 2.
    pub occurrences: usize,

    /// Unique edges with exactly one incident triangle.
    pub boundary_edge_count: usize,

    /// Unique edges with three or more incident triangles.
    pub singular_edge_count: usize,

    /// Merged vertex count.
    pub vertex_count: usize,

    /// Unique edge count.
    pub edge_count: usize,

    /// Triangle count.
    pub triangle_count: usize,
}

impl NonManifoldReport {
    /// Every edge is shared by exactly two triangles.
    pub fn is_manifold(&self) -> bool {
        self.occurrences == 0
    }

    /// No edge is used by a single triangle.
    pub fn is_watertight(&self) -> bool {
        self.boundary_edge_count == 0
    }
}

impl std::fmt::Display for NonManifoldReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Topology Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(
            f,
            "  Watertight: {} (boundary edges: {})",
            if self.is_watertight() { "yes" } else { "NO" },
            self.boundary_edge_count
        )?;
        writeln!(
            f,
            "  Manifold: {} (singular edges: {}, occurrences: {})",
            if self.is_manifold() { "yes" } else { "NO" },
            self.singular_edge_count,
            self.occurrences
        )?;
        Ok(())
    }
}

/// Walk every triangle's edges and report those not shared by exactly two
/// triangles.
///
/// Reports go to `sink` once per referencing triangle, so a boundary edge is
/// reported once and an edge shared by `k >= 3` triangles `k` times. The
/// topology is not modified and nothing here aborts.
pub fn check_non_manifold<S: DiagnosticSink + ?Sized>(
    topology: &MeshTopology,
    sink: &mut S,
) -> NonManifoldReport {
    let mut occurrences = 0;

    for triangle in topology.triangles() {
        for slot in &triangle.edges {
            let edge = &topology.edges()[slot.edge as usize];
            if edge.is_manifold() {
                continue;
            }

            let start = &topology.vertices()[edge.start as usize];
            let end = &topology.vertices()[edge.end as usize];
            let occurrence = NonManifoldOccurrence {
                triangle: triangle.id,
                edge: edge.id,
                incident_count: edge.incident_count(),
                start_vertex: start.id,
                start_position: as_array(start.position()),
                end_vertex: end.id,
                end_position: as_array(end.position()),
            };

            sink.non_manifold(&occurrence);
            occurrences += 1;
        }
    }

    sink.finished(occurrences);

    let report = NonManifoldReport {
        occurrences,
        boundary_edge_count: topology.boundary_edges().count(),
        singular_edge_count: topology.singular_edges().count(),
        vertex_count: topology.vertex_count(),
        edge_count: topology.edge_count(),
        triangle_count: topology.triangle_count(),
    };

    debug!("{}", report);

    report
}

fn as_array(p: Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

/// Log a short summary of a report.
pub fn log_report(report: &NonManifoldReport) {
    info!(
        "Topology: {} verts, {} edges, {} triangles",
        report.vertex_count, report.edge_count, report.triangle_count
    );

    if report.is_manifold() {
        info!("Every edge is shared by exactly two triangles");
    } else {
        if !report.is_watertight() {
            warn!("Not watertight: {} boundary edges", report.boundary_edge_count);
        }
        if report.singular_edge_count > 0 {
            warn!("Not manifold: {} singular edges", report.singular_edge_count);
        }
    }
}
