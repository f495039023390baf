//! Mesh types carrying smoothing groups.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Smoothing group of a triangle.
///
/// `None` is the implicit shared group of untagged faces; it never collides
/// with a real group id, including `Some(0)`.
pub type SmoothingGroup = Option<u32>;

/// A triangle referencing three position slots, tagged with a smoothing group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriangleWithGroup {
    pub indices: [u32; 3],
    pub smoothing_group: SmoothingGroup,
}

impl TriangleWithGroup {
    pub fn new(indices: [u32; 3], group: u32) -> Self {
        Self {
            indices,
            smoothing_group: Some(group),
        }
    }

    /// Triangle in the implicit shared group
    pub fn ungrouped(indices: [u32; 3]) -> Self {
        Self {
            indices,
            smoothing_group: None,
        }
    }

    /// Corner positions in winding order
    pub fn corners(&self, positions: &[Vec3]) -> [Vec3; 3] {
        self.indices.map(|i| positions[i as usize])
    }

    /// Unnormalized face normal; its length is twice the triangle area.
    pub fn area_normal(&self, positions: &[Vec3]) -> Vec3 {
        let [v1, v2, v3] = self.corners(positions);
        (v2 - v1).cross(v3 - v1)
    }
}

/// Positions, triangles and one normal slot per position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshWithSmoothingGroups {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<TriangleWithGroup>,
    /// Parallel to `positions`; filled by normal synthesis
    pub normals: Vec<Vec3>,
}

impl MeshWithSmoothingGroups {
    /// Create a mesh with zeroed normal slots
    pub fn new(positions: Vec<Vec3>, triangles: Vec<TriangleWithGroup>) -> Self {
        let normals = vec![Vec3::ZERO; positions.len()];
        Self {
            positions,
            triangles,
            normals,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}
