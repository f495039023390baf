//! Duplicating position slots shared by several smoothing groups.
//!
//! One slot can only hold one normal. When triangles from groups that do
//! not match reference the same slot, each extra group gets a copy of the
//! position so every group keeps its own normal.

use crate::groups::groups_match;
use crate::types::{MeshWithSmoothingGroups, SmoothingGroup};
use smoothing_config::GroupMatch;
use std::collections::HashMap;
use tracing::debug;

/// Give every (slot, group) pair its own position slot.
///
/// The first group seen at a slot, in triangle order, keeps the original
/// slot together with every group that matches it under `group_match`.
/// Other groups get copies appended to `positions` and `normals` and their
/// triangles are rewritten to use them. Returns the number of slots added.
pub fn split_shared_vertices(mesh: &mut MeshWithSmoothingGroups, group_match: GroupMatch) -> usize {
    let original_count = mesh.positions.len();
    let mut owner: Vec<Option<SmoothingGroup>> = vec![None; original_count];
    let mut copies: HashMap<(u32, SmoothingGroup), u32> = HashMap::new();

    for triangle in &mut mesh.triangles {
        let group = triangle.smoothing_group;
        for index in &mut triangle.indices {
            let slot = *index as usize;
            match owner[slot] {
                None => owner[slot] = Some(group),
                Some(first) if groups_match(first, group, group_match) => {}
                Some(_) => {
                    *index = *copies.entry((*index, group)).or_insert_with(|| {
                        mesh.positions.push(mesh.positions[slot]);
                        (mesh.positions.len() - 1) as u32
                    });
                }
            }
        }
    }

    let added = mesh.positions.len() - original_count;
    mesh.normals.resize(mesh.positions.len(), glam::Vec3::ZERO);
    if added > 0 {
        debug!(
            "split {} shared vertex slots across smoothing groups ({} -> {} positions)",
            added,
            original_count,
            mesh.positions.len()
        );
    }
    added
}
