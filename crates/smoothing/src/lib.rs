//! Smoothing-group vertex normals
//!
//! Importers for formats such as 3DS and ASE deliver triangles tagged with
//! smoothing groups instead of vertex normals. This crate rebuilds the
//! normals: coincident corners of triangles in the same group share one
//! area-weighted average, while edges between groups stay hard.
//!
//! - [`types`] - Triangles with groups and the mesh container
//! - [`synthesize`] - [`NormalSynthesizer`] and its report
//! - [`split`] - Duplicating slots shared by several groups
//! - [`bounds`] - Bounding boxes and the scale-relative epsilon
//! - [`validation`] - Mesh checks run before synthesis

pub mod bounds;
pub mod groups;
pub mod split;
pub mod synthesize;
pub mod types;
pub mod validation;

pub use bounds::{Aabb, derive_epsilon};
pub use groups::groups_match;
pub use split::split_shared_vertices;
pub use synthesize::{NormalSynthesizer, SynthesisReport, compute_normals_with_smoothing_groups};
pub use types::{MeshWithSmoothingGroups, SmoothingGroup, TriangleWithGroup};
pub use validation::{MeshError, validate_mesh};

pub use smoothing_config::{
    EpsilonMode, GroupConflictPolicy, GroupMatch, NormalConfig, ProjectionPlane,
};
