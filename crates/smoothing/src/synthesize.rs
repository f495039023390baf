//! Vertex normal synthesis from smoothing groups.
//!
//! 1. Every triangle gets an area-weighted flat normal (edge cross product).
//! 2. The coincidence epsilon is derived from the model's bounding box.
//! 3. Every triangle corner is indexed by position, tagged with its
//!    triangle's smoothing group.
//! 4. For each position slot not yet done, all coincident corners of a
//!    matching group are gathered, their flat normals summed and normalized,
//!    and the result written to every slot they reference.

use crate::bounds::derive_epsilon;
use crate::groups::groups_match;
use crate::split::split_shared_vertices;
use crate::types::{MeshWithSmoothingGroups, SmoothingGroup, TriangleWithGroup};
use crate::validation::{MeshError, validate_mesh};
use glam::Vec3;
use proximity::{SpatialIndex, SpatialIndexBuilder};
use smoothing_config::{GroupConflictPolicy, NormalConfig};
use tracing::{debug, trace};

/// Summary of one synthesis run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SynthesisReport {
    /// Coincidence tolerance used for merging
    pub epsilon: f32,
    /// Position slots added to separate smoothing groups
    pub split_vertices: usize,
    /// Triangles whose cross product is exactly zero; they contribute to no normal
    pub zero_area_triangles: usize,
    /// Triangle corners in the spatial index
    pub index_entries: usize,
}

/// Computes smoothed vertex normals for meshes with smoothing groups.
#[derive(Debug, Clone, Default)]
pub struct NormalSynthesizer {
    config: NormalConfig,
}

impl NormalSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NormalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalConfig {
        &self.config
    }

    /// Fill `mesh.normals`, panicking on out-of-range triangle indices or a bad config.
    ///
    /// Use [`NormalSynthesizer::try_compute_normals`] for untrusted input.
    pub fn compute_normals(&self, mesh: &mut MeshWithSmoothingGroups) -> SynthesisReport {
        self.try_compute_normals(mesh)
            .unwrap_or_else(|err| panic!("normal synthesis on an invalid mesh: {err}"))
    }

    /// Fill `mesh.normals`, one normal per position slot.
    ///
    /// With [`GroupConflictPolicy::SplitVertices`] the mesh may gain
    /// positions; `normals` always ends up the same length as `positions`.
    pub fn try_compute_normals(
        &self,
        mesh: &mut MeshWithSmoothingGroups,
    ) -> Result<SynthesisReport, MeshError> {
        self.config.validate()?;
        validate_mesh(mesh)?;
        mesh.normals.resize(mesh.positions.len(), Vec3::ZERO);

        let split_vertices = match self.config.conflict_policy {
            GroupConflictPolicy::SplitVertices => {
                split_shared_vertices(mesh, self.config.group_match)
            }
            GroupConflictPolicy::FirstClaimWins => 0,
        };

        let flat_normals: Vec<Vec3> = mesh
            .triangles
            .iter()
            .map(|triangle| triangle.area_normal(&mesh.positions))
            .collect();
        let zero_area_triangles = flat_normals.iter().filter(|n| **n == Vec3::ZERO).count();
        if zero_area_triangles > 0 {
            trace!("{} zero-area triangles contribute no normal", zero_area_triangles);
        }

        let epsilon = derive_epsilon(&mesh.positions, self.config.epsilon);
        let index = self.build_corner_index(mesh);

        mesh.normals = self.merge_normals(mesh, &index, &flat_normals, epsilon);

        let report = SynthesisReport {
            epsilon,
            split_vertices,
            zero_area_triangles,
            index_entries: index.len(),
        };
        debug!(
            "synthesized {} vertex normals for {} triangles: {:?}",
            mesh.vertex_count(),
            mesh.triangle_count(),
            report
        );
        Ok(report)
    }

    /// Index every triangle corner as `triangle * 3 + corner`, keyed by its group.
    fn build_corner_index(&self, mesh: &MeshWithSmoothingGroups) -> SpatialIndex<SmoothingGroup> {
        let mut builder = SpatialIndexBuilder::with_config(self.config.index_config());
        builder.reserve(mesh.triangles.len() * 3);
        for (t, triangle) in mesh.triangles.iter().enumerate() {
            for (c, &slot) in triangle.indices.iter().enumerate() {
                builder.add(
                    mesh.positions[slot as usize],
                    (t * 3 + c) as u32,
                    triangle.smoothing_group,
                );
            }
        }
        builder.finalize()
    }

    fn merge_normals(
        &self,
        mesh: &MeshWithSmoothingGroups,
        index: &SpatialIndex<SmoothingGroup>,
        flat_normals: &[Vec3],
        epsilon: f32,
    ) -> Vec<Vec3> {
        let keep_first = self.config.conflict_policy == GroupConflictPolicy::FirstClaimWins;
        let group_match = self.config.group_match;
        let slot_of = |corner: u32| corner_slot(&mesh.triangles, corner);

        let mut normals = vec![Vec3::ZERO; mesh.positions.len()];
        let mut done = vec![false; mesh.positions.len()];
        let mut corners = Vec::new();

        for triangle in &mesh.triangles {
            let group = triangle.smoothing_group;
            for &slot in &triangle.indices {
                let slot = slot as usize;
                if done[slot] {
                    continue;
                }

                index.find_positions_where(
                    mesh.positions[slot],
                    epsilon,
                    |&other| groups_match(group, other, group_match),
                    &mut corners,
                );

                let normal = corners
                    .iter()
                    .map(|&corner| flat_normals[(corner / 3) as usize])
                    .sum::<Vec3>()
                    .normalize_or_zero();

                for &corner in &corners {
                    let target = slot_of(corner);
                    if keep_first && done[target] {
                        continue;
                    }
                    normals[target] = normal;
                    done[target] = true;
                }
            }
        }

        normals
    }
}

/// Position slot referenced by a corner id.
fn corner_slot(triangles: &[TriangleWithGroup], corner: u32) -> usize {
    triangles[(corner / 3) as usize].indices[(corner % 3) as usize] as usize
}

/// Compute smoothed normals with the default configuration.
pub fn compute_normals_with_smoothing_groups(
    mesh: &mut MeshWithSmoothingGroups,
) -> SynthesisReport {
    NormalSynthesizer::new().compute_normals(mesh)
}
