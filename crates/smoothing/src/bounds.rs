//! Bounding boxes and scale-relative epsilon derivation.

use glam::Vec3;
use smoothing_config::EpsilonMode;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB that contains nothing (for accumulation).
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    /// Bounds of a point set, or `None` when it is empty.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut bounds = Self::empty();
        for &point in points {
            bounds.include_point(point);
        }
        Some(bounds)
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn diagonal_length(&self) -> f32 {
        self.size().length()
    }
}

/// Coincidence tolerance for a position array.
///
/// Relative mode scales with the bounding box diagonal, so the same model
/// at a different unit scale merges the same vertices. Empty input yields 0.
pub fn derive_epsilon(positions: &[Vec3], mode: EpsilonMode) -> f32 {
    match mode {
        EpsilonMode::Absolute(epsilon) => epsilon,
        EpsilonMode::Relative { scale } => Aabb::from_points(positions)
            .map(|bounds| bounds.diagonal_length() * scale)
            .unwrap_or(0.0),
    }
}
