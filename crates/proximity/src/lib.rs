//! Projection-sorted spatial index for 3D point sets
//!
//! Answers "which positions lie within `r` of `p`" in average O(log n + k)
//! by sorting all points by their signed distance to one plane and
//! scanning only the matching distance band:
//! - [`SpatialIndexBuilder`] - Unfinalized state; fill, append and tag positions
//! - [`SpatialIndex`] - Finalized, sorted index; all queries live here
//! - [`weld`] - Vertex welding built on the mapping table
//! - [`strided`] - Reading positions from interleaved vertex buffers
//!
//! Positions must be finite. The index copies every position it is given and
//! never refers back to caller memory.

pub mod builder;
pub mod index;
pub mod plane;
pub mod strided;
pub mod types;
pub mod ulps;
pub mod weld;

pub use builder::SpatialIndexBuilder;
pub use index::SpatialIndex;
pub use types::{IndexEntry, POSITION_SIZE, ProximityError, UNASSIGNED};
pub use weld::{WeldResult, remap_indices, weld_positions};
