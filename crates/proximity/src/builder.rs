//! Unfinalized spatial index state.
//!
//! Positions can be filled, appended and tagged here; queries only exist on
//! the [`SpatialIndex`] returned by [`SpatialIndexBuilder::finalize`].

use crate::index::SpatialIndex;
use crate::plane::select_normal;
use crate::strided::read_strided;
use crate::types::{IndexEntry, ProximityError};
use glam::Vec3;
use smoothing_config::IndexConfig;
use tracing::debug;

/// Collects positions for a [`SpatialIndex`].
#[derive(Debug, Clone)]
pub struct SpatialIndexBuilder<T = ()> {
    pub(crate) entries: Vec<IndexEntry<T>>,
    pub(crate) config: IndexConfig,
}

impl<T> Default for SpatialIndexBuilder<T> {
    fn default() -> Self {
        Self::with_config(IndexConfig::default())
    }
}

impl<T> SpatialIndexBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            entries: Vec::new(),
            config,
        }
    }

    /// Add one tagged position under an explicit source index.
    ///
    /// Source indices need not be unique; several entries may point back to
    /// the same slot with different tags.
    pub fn add(&mut self, position: Vec3, source_index: u32, tag: T) {
        self.entries.push(IndexEntry {
            source_index,
            position,
            distance: 0.0,
            tag,
        });
    }

    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project every entry onto the sorting plane and sort by distance.
    ///
    /// The sort is stable, so entries with equal distances keep insertion order.
    pub fn finalize(self) -> SpatialIndex<T> {
        let mut entries = self.entries;
        let plane_normal = select_normal(
            self.config.projection,
            entries.iter().map(|entry| entry.position),
        );
        for entry in &mut entries {
            entry.distance = entry.position.dot(plane_normal);
        }
        entries.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let source_count = entries
            .iter()
            .map(|entry| entry.source_index as usize + 1)
            .max()
            .unwrap_or(0);

        debug!(
            "finalized spatial index: {} entries, {} source slots, plane normal {:?}",
            entries.len(),
            source_count,
            plane_normal
        );

        SpatialIndex {
            plane_normal,
            entries,
            config: self.config,
            source_count,
        }
    }
}

impl SpatialIndexBuilder<()> {
    /// Replace all entries with `positions`, indexed `0..positions.len()`.
    pub fn fill(&mut self, positions: &[Vec3]) {
        self.entries.clear();
        self.append(positions);
    }

    /// Add `positions`, continuing the source indices after the existing entries.
    pub fn append(&mut self, positions: &[Vec3]) {
        self.append_iter(positions.len(), positions.iter().copied());
    }

    /// Replace all entries with positions read from an interleaved buffer.
    pub fn fill_strided(
        &mut self,
        bytes: &[u8],
        count: usize,
        stride: usize,
    ) -> Result<(), ProximityError> {
        let positions = read_strided(bytes, count, stride)?;
        self.entries.clear();
        self.append_iter(count, positions);
        Ok(())
    }

    /// Append positions read from an interleaved buffer.
    pub fn append_strided(
        &mut self,
        bytes: &[u8],
        count: usize,
        stride: usize,
    ) -> Result<(), ProximityError> {
        let positions = read_strided(bytes, count, stride)?;
        self.append_iter(count, positions);
        Ok(())
    }

    fn append_iter(&mut self, count: usize, positions: impl Iterator<Item = Vec3>) {
        let start = self.entries.len();
        assert!(
            start + count <= u32::MAX as usize,
            "spatial index cannot address more than {} positions",
            u32::MAX
        );
        self.entries.reserve(count);
        for (offset, position) in positions.enumerate() {
            self.add(position, (start + offset) as u32, ());
        }
    }
}
