//! Smoothing-group compatibility.

use crate::types::SmoothingGroup;
use smoothing_config::GroupMatch;

/// Whether triangles tagged `a` and `b` may share a vertex normal.
pub fn groups_match(a: SmoothingGroup, b: SmoothingGroup, mode: GroupMatch) -> bool {
    match (mode, a, b) {
        (GroupMatch::Exact, a, b) => a == b,
        (GroupMatch::Bitmask, Some(a), Some(b)) => a == b || a & b != 0,
        (GroupMatch::Bitmask, None, None) => true,
        (GroupMatch::Bitmask, _, _) => false,
    }
}
