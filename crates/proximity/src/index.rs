//! Finalized spatial index and its queries.
//!
//! Every entry stores its signed distance to a plane through the origin.
//! Entries are sorted by that distance, so a sphere query only has to look at
//! the band `[d - r, d + r]` found by binary search. Points in the band can
//! still be far apart in 3D, so every candidate is checked against the true
//! squared distance before it is reported.

use crate::builder::SpatialIndexBuilder;
use crate::types::{IndexEntry, ProximityError, UNASSIGNED};
use crate::ulps::within_ulps;
use glam::Vec3;
use smoothing_config::{IDENTICAL_TOLERANCE_ULPS, IndexConfig};
use std::ops::Range;
use tracing::trace;

/// Rounding slack added to both ends of a band, in multiples of `f32::EPSILON`.
const BAND_SLACK: f32 = 8.0;

/// Projection-sorted index over 3D positions.
///
/// Immutable between rebuilds, so shared references can be queried from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct SpatialIndex<T = ()> {
    pub(crate) plane_normal: Vec3,
    pub(crate) entries: Vec<IndexEntry<T>>,
    pub(crate) config: IndexConfig,
    /// One past the largest source index
    pub(crate) source_count: usize,
}

impl SpatialIndex<()> {
    /// Build a finalized index over `positions` with the default configuration.
    pub fn new(positions: &[Vec3]) -> Self {
        Self::with_config(positions, IndexConfig::default())
    }

    pub fn with_config(positions: &[Vec3], config: IndexConfig) -> Self {
        let mut builder = SpatialIndexBuilder::with_config(config);
        builder.fill(positions);
        builder.finalize()
    }

    /// Build a finalized index from an interleaved vertex buffer.
    pub fn from_strided(
        bytes: &[u8],
        count: usize,
        stride: usize,
        config: IndexConfig,
    ) -> Result<Self, ProximityError> {
        let mut builder = SpatialIndexBuilder::with_config(config);
        builder.fill_strided(bytes, count, stride)?;
        Ok(builder.finalize())
    }

    /// Replace the contents with `positions` and re-sort.
    pub fn fill(&mut self, positions: &[Vec3]) {
        self.rebuild(|builder| builder.fill(positions));
    }

    /// Append `positions` and re-sort.
    ///
    /// To append from several sources, use [`SpatialIndex::into_builder`] and
    /// finalize once at the end.
    pub fn append(&mut self, positions: &[Vec3]) {
        self.rebuild(|builder| builder.append(positions));
    }

    fn rebuild(&mut self, update: impl FnOnce(&mut SpatialIndexBuilder<()>)) {
        let mut builder = SpatialIndexBuilder {
            entries: std::mem::take(&mut self.entries),
            config: self.config,
        };
        update(&mut builder);
        *self = builder.finalize();
    }
}

impl<T> SpatialIndex<T> {
    /// Return to the unfinalized state to append more positions.
    pub fn into_builder(self) -> SpatialIndexBuilder<T> {
        SpatialIndexBuilder {
            entries: self.entries,
            config: self.config,
        }
    }

    /// No-op: a `SpatialIndex` is always sorted.
    pub fn finalize(&mut self) {}

    pub fn plane_normal(&self) -> Vec3 {
        self.plane_normal
    }

    /// Entries in ascending distance order
    pub fn entries(&self) -> &[IndexEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One past the largest source index; the length of a mapping table.
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    /// Indices of the entries whose distance lies in `center ± half_width`.
    ///
    /// The band is widened by a few ULPs so rounding in the projection never
    /// excludes a point that passes the exact 3D test.
    fn band(&self, query: Vec3, half_width: f32) -> Range<usize> {
        let center = query.dot(self.plane_normal);
        let slack = (query.abs().element_sum() + 2.0 * half_width) * BAND_SLACK * f32::EPSILON;
        let min = center - half_width - slack;
        let max = center + half_width + slack;

        let start = self.entries.partition_point(|entry| entry.distance < min);
        let len = self.entries[start..].partition_point(|entry| entry.distance <= max);
        start..start + len
    }

    /// Find the source indices of all positions within `radius` of `query`.
    ///
    /// `results` is cleared first. A radius of zero matches exact duplicates only.
    pub fn find_positions(&self, query: Vec3, radius: f32, results: &mut Vec<u32>) {
        self.find_positions_where(query, radius, |_| true, results);
    }

    /// Like [`SpatialIndex::find_positions`], keeping only entries whose tag passes `filter`.
    pub fn find_positions_where(
        &self,
        query: Vec3,
        radius: f32,
        filter: impl Fn(&T) -> bool,
        results: &mut Vec<u32>,
    ) {
        results.clear();
        let radius_sq = radius * radius;
        results.extend(
            self.entries[self.band(query, radius)]
                .iter()
                .filter(|entry| {
                    entry.position.distance_squared(query) <= radius_sq && filter(&entry.tag)
                })
                .map(|entry| entry.source_index),
        );
    }

    /// Find the source indices of all positions identical to `query`.
    ///
    /// Identical means every component lies within
    /// [`IDENTICAL_TOLERANCE_ULPS`] units in the last place, which absorbs
    /// the noise of a round trip through a text format but nothing more.
    pub fn find_identical_positions(&self, query: Vec3, results: &mut Vec<u32>) {
        results.clear();
        let tolerance = IDENTICAL_TOLERANCE_ULPS as f32 + 1.0;
        let half_width =
            (query.abs().element_sum() * tolerance * f32::EPSILON).max(f32::MIN_POSITIVE);
        results.extend(
            self.entries[self.band(query, half_width)]
                .iter()
                .filter(|entry| within_ulps(entry.position, query, IDENTICAL_TOLERANCE_ULPS))
                .map(|entry| entry.source_index),
        );
    }

    /// Map every source index to a compact id shared by all positions within `radius`.
    ///
    /// Entries are visited in sorted order; each one not yet mapped starts a
    /// new id (0, 1, 2, ...) that is given to every unmapped position in its
    /// neighborhood. `output` is resized to [`SpatialIndex::source_count`];
    /// slots never inserted stay [`UNASSIGNED`]. Returns the number of ids.
    pub fn generate_mapping_table(&self, output: &mut Vec<u32>, radius: f32) -> u32 {
        output.clear();
        output.resize(self.source_count, UNASSIGNED);

        let mut neighbors = Vec::new();
        let mut next_id = 0u32;
        for entry in &self.entries {
            if output[entry.source_index as usize] != UNASSIGNED {
                continue;
            }

            self.find_positions(entry.position, radius, &mut neighbors);
            output[entry.source_index as usize] = next_id;
            for &neighbor in &neighbors {
                let slot = &mut output[neighbor as usize];
                if *slot == UNASSIGNED {
                    *slot = next_id;
                }
            }
            next_id += 1;
        }

        trace!(
            "mapping table: {} source slots -> {} unique ids (radius {})",
            self.source_count, next_id, radius
        );
        next_id
    }
}

impl<T: Sync> SpatialIndex<T> {
    /// Run [`SpatialIndex::find_positions`] for many queries.
    ///
    /// With the `parallel` feature the queries are spread over the rayon pool;
    /// the result order always matches `queries`.
    pub fn find_positions_batch(&self, queries: &[Vec3], radius: f32) -> Vec<Vec<u32>> {
        #[cfg(feature = "parallel")]
        use rayon::prelude::*;

        #[cfg(feature = "parallel")]
        let iter = queries.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = queries.iter();

        iter.map(|&query| {
            let mut results = Vec::new();
            self.find_positions(query, radius, &mut results);
            results
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smoothing_config::ProjectionPlane;

    fn grid(n: i32, spacing: f32) -> Vec<Vec3> {
        let mut points = Vec::new();
        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    points.push(Vec3::new(x as f32, y as f32, z as f32) * spacing);
                }
            }
        }
        points
    }

    fn sorted(mut v: Vec<u32>) -> Vec<u32> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let index = SpatialIndex::new(&[]);
        let mut results = vec![7];
        index.find_positions(Vec3::ZERO, 10.0, &mut results);
        assert!(results.is_empty());
        index.find_identical_positions(Vec3::ZERO, &mut results);
        assert!(results.is_empty());

        let mut table = Vec::new();
        assert_eq!(index.generate_mapping_table(&mut table, 1.0), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_find_positions_in_grid() {
        let points = grid(5, 1.0);
        let index = SpatialIndex::new(&points);
        let center = Vec3::splat(2.0);

        let mut results = Vec::new();
        index.find_positions(center, 1.0, &mut results);

        // Center plus its six face neighbours
        assert_eq!(results.len(), 7);
        for &i in &results {
            assert!(points[i as usize].distance(center) <= 1.0);
        }
    }

    #[test]
    fn test_zero_radius_is_exact_match() {
        let points = vec![Vec3::ONE, Vec3::new(1.0, 1.0, 1.000001), Vec3::ONE];
        let index = SpatialIndex::new(&points);
        let mut results = Vec::new();
        index.find_positions(Vec3::ONE, 0.0, &mut results);
        assert_eq!(sorted(results), vec![0, 2]);
    }

    #[test]
    fn test_band_false_positives_are_filtered() {
        // Both points project onto the same distance as the query but lie far away in 3D
        let normal = crate::plane::fixed_normal();
        let tangent = normal.any_orthonormal_vector();
        let points = vec![Vec3::ZERO, tangent * 10.0, -tangent * 10.0];
        let index = SpatialIndex::new(&points);

        let mut results = Vec::new();
        index.find_positions(Vec3::ZERO, 0.5, &mut results);
        assert_eq!(results, vec![0]);
    }

    #[test]
    fn test_point_on_radius_is_included() {
        // Squared distances are exactly 25
        let points = vec![
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::new(0.0, 5.0, 0.1),
        ];
        let index = SpatialIndex::new(&points);

        let mut results = Vec::new();
        index.find_positions(Vec3::ZERO, 5.0, &mut results);
        assert_eq!(sorted(results), vec![0, 1]);
    }

    #[test]
    fn test_identical_positions_tolerate_few_ulps() {
        let base = Vec3::new(12.5, -3.25, 0.75);
        let nudged = Vec3::new(f32::from_bits(base.x.to_bits() + 3), base.y, base.z);
        let far = Vec3::new(f32::from_bits(base.x.to_bits() + 100), base.y, base.z);
        let index = SpatialIndex::new(&[base, nudged, far, Vec3::ZERO]);

        let mut results = Vec::new();
        index.find_identical_positions(base, &mut results);
        assert_eq!(sorted(results), vec![0, 1]);
    }

    #[test]
    fn test_identical_positions_at_origin() {
        let index = SpatialIndex::new(&[Vec3::ZERO, Vec3::new(-0.0, 0.0, -0.0), Vec3::X]);
        let mut results = Vec::new();
        index.find_identical_positions(Vec3::ZERO, &mut results);
        assert_eq!(sorted(results), vec![0, 1]);
    }

    #[test]
    fn test_mapping_table_merges_duplicates() {
        let points = vec![
            Vec3::ZERO,
            Vec3::X,
            Vec3::ZERO,
            Vec3::Y,
            Vec3::X,
            Vec3::Z,
        ];
        let index = SpatialIndex::new(&points);
        let mut table = Vec::new();
        let unique = index.generate_mapping_table(&mut table, 0.0);

        assert_eq!(unique, 4);
        assert_eq!(table.len(), points.len());
        assert_eq!(table[0], table[2]);
        assert_eq!(table[1], table[4]);
        assert_ne!(table[0], table[1]);
        assert!(table.iter().all(|&id| id < unique));
    }

    #[test]
    fn test_mapping_ids_follow_sorted_order() {
        let normal = crate::plane::fixed_normal();
        let points = vec![normal * 3.0, normal * 1.0, normal * 2.0];
        let index = SpatialIndex::new(&points);
        let mut table = Vec::new();
        index.generate_mapping_table(&mut table, 0.1);
        assert_eq!(table, vec![2, 0, 1]);
    }

    #[test]
    fn test_append_after_finalize_resorts() {
        let mut index = SpatialIndex::new(&[Vec3::splat(5.0)]);
        index.append(&[Vec3::splat(-5.0)]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.entries()[0].source_index, 1);

        index.finalize();
        assert_eq!(index.entries()[0].source_index, 1);
    }

    #[test]
    fn test_into_builder_round_trip() {
        let index = SpatialIndex::new(&[Vec3::ZERO]);
        let mut builder = index.into_builder();
        builder.append(&[Vec3::ONE]);
        builder.append(&[Vec3::ONE * 2.0]);
        let index = builder.finalize();

        let mut results = Vec::new();
        index.find_positions(Vec3::ONE * 2.0, 0.0, &mut results);
        assert_eq!(results, vec![2]);
    }

    #[test]
    fn test_tag_filter() {
        let mut builder = SpatialIndexBuilder::new();
        builder.add(Vec3::ZERO, 0, 1u32);
        builder.add(Vec3::ZERO, 1, 2u32);
        builder.add(Vec3::X * 0.01, 2, 1u32);
        let index = builder.finalize();

        let mut results = Vec::new();
        index.find_positions_where(Vec3::ZERO, 0.1, |&group| group == 1, &mut results);
        assert_eq!(sorted(results), vec![0, 2]);
    }

    #[test]
    fn test_principal_axis_index_matches_fixed() {
        let points = grid(4, 0.5);
        let fixed = SpatialIndex::new(&points);
        let principal =
            SpatialIndex::with_config(&points, IndexConfig::new(ProjectionPlane::PrincipalAxis));

        let mut a = Vec::new();
        let mut b = Vec::new();
        for &query in &points {
            fixed.find_positions(query, 0.6, &mut a);
            principal.find_positions(query, 0.6, &mut b);
            assert_eq!(sorted(a.clone()), sorted(b.clone()));
        }
    }

    #[test]
    fn test_batch_matches_single_queries() {
        let points = grid(3, 1.0);
        let index = SpatialIndex::new(&points);
        let batch = index.find_positions_batch(&points, 1.0);

        let mut single = Vec::new();
        for (query, batch_result) in points.iter().zip(&batch) {
            index.find_positions(*query, 1.0, &mut single);
            assert_eq!(&single, batch_result);
        }
    }

    #[test]
    fn test_from_strided_reads_positions() {
        let mut bytes = Vec::new();
        for p in [[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]] {
            bytes.extend_from_slice(bytemuck::bytes_of(&p));
            bytes.extend_from_slice(&[0u8; 4]);
        }
        let index = SpatialIndex::from_strided(&bytes, 2, 16, IndexConfig::default()).unwrap();
        assert_eq!(index.len(), 2);

        let mut results = Vec::new();
        index.find_positions(Vec3::new(4.0, 5.0, 6.0), 0.0, &mut results);
        assert_eq!(results, vec![1]);
    }

    #[test]
    fn test_from_strided_rejects_short_buffer() {
        let bytes = [0u8; 30];
        let result = SpatialIndex::from_strided(&bytes, 2, 20, IndexConfig::default());
        assert!(matches!(
            result,
            Err(ProximityError::BufferTooShort {
                len: 30,
                count: 2,
                needed: 32,
            })
        ));
    }

    #[test]
    fn test_from_strided_rejects_small_stride() {
        let result = SpatialIndex::from_strided(&[0u8; 64], 2, 8, IndexConfig::default());
        assert!(matches!(result, Err(ProximityError::StrideTooSmall { stride: 8 })));
    }
}
