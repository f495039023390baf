//! Type definitions for the spatial index.

use glam::Vec3;

/// Marker for mapping-table slots whose source index was never inserted.
pub const UNASSIGNED: u32 = u32::MAX;

/// Size of one position (`[f32; 3]`) in an interleaved buffer.
pub const POSITION_SIZE: usize = std::mem::size_of::<[f32; 3]>();

/// An entry in the projection-sorted position array.
///
/// Holds a copy of the position, never a reference into caller memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry<T = ()> {
    /// Index of the position in the array it was read from
    pub source_index: u32,
    pub position: Vec3,
    /// Signed distance of `position` to the sorting plane
    pub distance: f32,
    /// Extra key stored alongside the position (e.g. a smoothing group)
    pub tag: T,
}

/// Errors raised while reading positions into the index
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProximityError {
    #[error("Stride of {stride} bytes is smaller than one position ({} bytes)", POSITION_SIZE)]
    StrideTooSmall { stride: usize },
    #[error("Buffer of {len} bytes is too short for {count} positions (needs {needed})")]
    BufferTooShort {
        len: usize,
        count: usize,
        needed: usize,
    },
}
