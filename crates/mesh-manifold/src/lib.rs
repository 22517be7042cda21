//! Non-manifold edge detection for triangle soups.
//!
//! STL files store every triangle with its own three corners, so shared
//! vertices and edges only exist implicitly. This crate recovers them:
//!
//! - **Indexing**: a KD-tree over all corners answers "which corners lie
//!   within ε of this one" ([`CoordinateIndex`])
//! - **Merging**: near-duplicate corners get one representative id
//!   ([`dedup::resolve_duplicates`])
//! - **Topology**: unique vertices, undirected edges with their incident
//!   triangles, and triangles that remember each edge's direction
//!   ([`MeshTopology`])
//! - **Analysis**: every edge not shared by exactly two triangles is reported
//!   to a [`DiagnosticSink`]
//! - **Export**: the welded mesh is written as Wavefront OBJ
//!
//! # Example
//!
//! ```no_run
//! use mesh_manifold::{CheckConfig, ManifoldChecker, TracingSink};
//!
//! let checker = ManifoldChecker::load("model.stl", &CheckConfig::default()).unwrap();
//!
//! let report = checker.check_non_manifold(&mut TracingSink);
//! println!("{}", report);
//!
//! checker.export_obj("welded.obj").unwrap();
//! ```

mod error;
mod types;

pub mod config;
pub mod dedup;
pub mod io;
pub mod kdtree;
pub mod topology;
pub mod validate;

#[cfg(test)]
mod test_support;

use std::path::Path;

use tracing::debug;

pub use config::{CheckConfig, MergeStrategy};
pub use error::{MeshError, MeshResult};
pub use io::{coordinates_from_source, load_soup, save_obj, write_obj, MeshFormat, TriangleSoup, TriangleSource};
pub use kdtree::CoordinateIndex;
pub use topology::MeshTopology;
pub use types::{Coordinate, Edge, EdgeUse, Triangle, Vertex, DEFAULT_EPSILON};
pub use validate::{
    check_non_manifold, log_report, CollectingSink, DiagnosticSink, NonManifoldOccurrence,
    NonManifoldReport, TracingSink,
};

/// Merged topology of one triangle soup, ready to analyze and export.
#[derive(Debug, Clone)]
pub struct ManifoldChecker {
    topology: MeshTopology,
    config: CheckConfig,
}

impl ManifoldChecker {
    /// Index, merge and build topology for an in-memory source.
    pub fn from_source<S: TriangleSource + ?Sized>(
        source: &S,
        config: &CheckConfig,
    ) -> MeshResult<Self> {
        let config = config.clone().validated()?;
        debug!(
            "Checking {} triangles (epsilon: {}, merge: {:?})",
            (0..source.solid_count())
                .map(|s| source.solid_triangles(s).len())
                .sum::<usize>(),
            config.epsilon,
            config.merge
        );

        let coordinates = coordinates_from_source(source);
        let index = CoordinateIndex::with_epsilon(&coordinates, config.epsilon);
        let representative = dedup::resolve_duplicates(&coordinates, &index, config.merge);
        let topology = MeshTopology::build(&coordinates, &representative);

        Ok(Self { topology, config })
    }

    /// Load a file, auto-detecting format from extension, and build its topology.
    pub fn load(path: impl AsRef<Path>, config: &CheckConfig) -> MeshResult<Self> {
        let soup = io::load_soup(path.as_ref())?;
        Self::from_source(&soup, config)
    }

    /// The merged topology.
    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    /// Configuration the topology was built with.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Report every non-manifold edge occurrence to `sink`.
    pub fn check_non_manifold<S: DiagnosticSink + ?Sized>(&self, sink: &mut S) -> NonManifoldReport {
        validate::check_non_manifold(&self.topology, sink)
    }

    /// Write the merged mesh as Wavefront OBJ.
    pub fn export_obj(&self, path: impl AsRef<Path>) -> MeshResult<()> {
        io::save_obj(&self.topology, path.as_ref())
    }
}
