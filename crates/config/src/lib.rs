//! Shared configuration for proximity queries and normal synthesis
//!
//! This crate provides the single source of truth for the tunables and
//! constants used by the `proximity` and `smoothing` crates. Every config
//! type is serde-serializable and fills missing fields from its `Default`,
//! so partial documents load cleanly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sorting plane normal used by [`ProjectionPlane::Fixed`] (normalized at use).
///
/// Chosen to avoid the axis-aligned and diagonal planes common in modelled data.
pub const FIXED_PLANE_NORMAL: [f32; 3] = [0.8523, 0.34321, 0.5736];

/// Default epsilon as a fraction of the bounding box diagonal.
pub const DEFAULT_EPSILON_SCALE: f32 = 1e-5;

/// Per-component tolerance for identical-position lookups, in units in the last place.
pub const IDENTICAL_TOLERANCE_ULPS: u32 = 4;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid epsilon scale: {0} (must be finite and >= 0)")]
    InvalidEpsilonScale(f32),
    #[error("Invalid absolute epsilon: {0} (must be finite and >= 0)")]
    InvalidAbsoluteEpsilon(f32),
}

/// How the sorting plane normal of a spatial index is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionPlane {
    /// Use [`FIXED_PLANE_NORMAL`]
    #[default]
    Fixed,
    /// Use the axis of maximum variance of the indexed points.
    ///
    /// Costs one extra pass over the points. Falls back to the fixed normal
    /// when the points have no spread.
    PrincipalAxis,
}

/// Rule deciding whether two smoothing-group tags belong together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMatch {
    /// Tags merge only when equal (`None` with `None`, `Some(a)` with `Some(a)`)
    #[default]
    Exact,
    /// Tags are bit sets (3DS/ASE convention) and merge when they share a bit
    Bitmask,
}

/// What happens to a position slot referenced by triangles from different groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupConflictPolicy {
    /// Duplicate the slot once per additional group so every group gets its own normal
    #[default]
    SplitVertices,
    /// Keep one slot; the first group to write it (in triangle order) keeps its normal
    FirstClaimWins,
}

/// How the coincidence tolerance for normal merging is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpsilonMode {
    /// Bounding box diagonal multiplied by `scale`
    Relative { scale: f32 },
    /// Fixed value in model units (formats with known fixed-point precision)
    Absolute(f32),
}

impl Default for EpsilonMode {
    fn default() -> Self {
        Self::Relative {
            scale: DEFAULT_EPSILON_SCALE,
        }
    }
}

impl EpsilonMode {
    /// Check that the configured value is usable as a distance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Relative { scale } if !scale.is_finite() || scale < 0.0 => {
                Err(ConfigError::InvalidEpsilonScale(scale))
            }
            Self::Absolute(value) if !value.is_finite() || value < 0.0 => {
                Err(ConfigError::InvalidAbsoluteEpsilon(value))
            }
            _ => Ok(()),
        }
    }
}

/// Configuration for building a spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Sorting plane selection
    pub projection: ProjectionPlane,
}

impl IndexConfig {
    /// Create an index config with the given projection plane
    pub fn new(projection: ProjectionPlane) -> Self {
        Self { projection }
    }
}

/// Configuration for smoothing-group normal synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalConfig {
    /// Coincidence tolerance for merging flat normals
    pub epsilon: EpsilonMode,
    /// Smoothing-group tag comparison
    pub group_match: GroupMatch,
    /// Resolution for slots shared by several groups
    pub conflict_policy: GroupConflictPolicy,
    /// Sorting plane of the internal spatial index
    pub projection: ProjectionPlane,
}

impl NormalConfig {
    /// Override the derived epsilon with an absolute value.
    #[must_use]
    pub fn with_absolute_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = EpsilonMode::Absolute(epsilon);
        self
    }

    /// Scale the derived epsilon by a custom fraction of the bounding box diagonal.
    #[must_use]
    pub fn with_relative_epsilon(mut self, scale: f32) -> Self {
        self.epsilon = EpsilonMode::Relative { scale };
        self
    }

    #[must_use]
    pub fn with_group_match(mut self, group_match: GroupMatch) -> Self {
        self.group_match = group_match;
        self
    }

    #[must_use]
    pub fn with_conflict_policy(mut self, policy: GroupConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    #[must_use]
    pub fn with_projection(mut self, projection: ProjectionPlane) -> Self {
        self.projection = projection;
        self
    }

    /// Index configuration derived from this config
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig::new(self.projection)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.epsilon.validate()
    }
}
