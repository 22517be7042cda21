//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};
use crate::types::DEFAULT_EPSILON;

/// How near-duplicate coordinates are grouped into vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Resolve coordinates one query at a time in input order.
    ///
    /// Each unresolved coordinate's match set is assigned its smallest id.
    /// Grouping depends on input order and is not transitive: with A≈B and
    /// B≈C but A≉C, C may end up on its own.
    #[default]
    PerQuery,

    /// Union every matching pair and use the smallest id per cluster.
    ///
    /// Chains A≈B≈C always collapse to one vertex.
    Transitive,
}

/// Parameters for the merge → build → analyze pipeline.
///
/// # Example
///
/// ```
/// use mesh_manifold::{CheckConfig, MergeStrategy};
///
/// let config = CheckConfig::from_toml("epsilon = 1e-4\nmerge = \"transitive\"").unwrap();
/// assert_eq!(config.epsilon, 1e-4);
/// assert_eq!(config.merge, MergeStrategy::Transitive);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Per-axis tolerance for treating two coordinates as the same point.
    pub epsilon: f64,

    /// Grouping policy for near-duplicates.
    pub merge: MergeStrategy,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            merge: MergeStrategy::PerQuery,
        }
    }
}

impl CheckConfig {
    /// Set the merge tolerance.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the merge strategy.
    pub fn with_merge(mut self, merge: MergeStrategy) -> Self {
        self.merge = merge;
        self
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(source: &str) -> MeshResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| MeshError::InvalidConfig {
            details: e.to_string(),
        })?;
        config.validated()
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> MeshResult<String> {
        toml::to_string(self).map_err(|e| MeshError::InvalidConfig {
            details: e.to_string(),
        })
    }

    /// Reject tolerances that would make every comparison meaningless.
    pub fn validated(self) -> MeshResult<Self> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(MeshError::InvalidConfig {
                details: format!("epsilon must be a finite non-negative number, got {}", self.epsilon),
            });
        }
        Ok(self)
    }
}
