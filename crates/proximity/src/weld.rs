//! Vertex welding on top of the mapping table.

use crate::index::SpatialIndex;
use glam::Vec3;
use tracing::debug;

/// Result of welding a position array.
#[derive(Debug, Clone, PartialEq)]
pub struct WeldResult {
    /// One position per unique id, taken from the lowest source index mapped to it
    pub positions: Vec<Vec3>,
    /// Original position index -> welded position index
    pub remap: Vec<u32>,
    pub unique_count: u32,
}

impl WeldResult {
    /// Number of positions removed by welding
    pub fn merged_count(&self) -> usize {
        self.remap.len() - self.positions.len()
    }
}

/// Merge all positions within `radius` of each other.
///
/// Unique positions are ordered by id, which follows the index's sorted
/// projection order and is reproducible for identical input.
pub fn weld_positions(positions: &[Vec3], radius: f32) -> WeldResult {
    let index = SpatialIndex::new(positions);
    let mut remap = Vec::new();
    let unique_count = index.generate_mapping_table(&mut remap, radius);

    let mut welded: Vec<Option<Vec3>> = vec![None; unique_count as usize];
    for (source, &id) in remap.iter().enumerate() {
        welded[id as usize].get_or_insert(positions[source]);
    }
    let welded: Vec<Vec3> = welded.into_iter().flatten().collect();

    debug!(
        "welded {} positions into {} (radius {})",
        positions.len(),
        welded.len(),
        radius
    );

    WeldResult {
        positions: welded,
        remap,
        unique_count,
    }
}

/// Rewrite vertex indices through a weld remap table.
///
/// Panics if an index is out of range of `remap`.
pub fn remap_indices(indices: &mut [u32], remap: &[u32]) {
    for index in indices {
        *index = remap[*index as usize];
    }
}
