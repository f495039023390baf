//! Selection of the sorting plane normal.
//!
//! All points are projected onto a single unit normal through the origin. A
//! good normal spreads the projected distances out; a plane that contains
//! many points collapses them into one band and degrades queries towards a
//! linear scan.

use glam::{DMat3, DVec3, Vec3};
use smoothing_config::{FIXED_PLANE_NORMAL, ProjectionPlane};
use tracing::warn;

/// Power iterations used to find the principal axis.
const POWER_ITERATIONS: usize = 32;

/// The fixed normal, normalized.
pub fn fixed_normal() -> Vec3 {
    Vec3::from_array(FIXED_PLANE_NORMAL).normalize()
}

/// Pick the plane normal for a point set.
pub fn select_normal(projection: ProjectionPlane, points: impl Iterator<Item = Vec3>) -> Vec3 {
    match projection {
        ProjectionPlane::Fixed => fixed_normal(),
        ProjectionPlane::PrincipalAxis => principal_axis(points).unwrap_or_else(|| {
            warn!("principal axis is degenerate, using the fixed plane normal");
            fixed_normal()
        }),
    }
}

/// Axis of maximum variance, or `None` when the points have no spread.
///
/// Accumulates in f64 to keep the covariance stable for large coordinates.
pub fn principal_axis(points: impl Iterator<Item = Vec3>) -> Option<Vec3> {
    let points: Vec<DVec3> = points.map(|p| p.as_dvec3()).collect();
    if points.len() < 2 {
        return None;
    }

    let mean = points.iter().copied().sum::<DVec3>() / points.len() as f64;
    let mut covariance = DMat3::ZERO;
    for p in &points {
        let d = *p - mean;
        covariance += DMat3::from_cols(d * d.x, d * d.y, d * d.z);
    }
    if !covariance.is_finite() || covariance.abs_diff_eq(DMat3::ZERO, 0.0) {
        return None;
    }

    // Start from the fixed normal so a tie between axes resolves the same way every run
    let mut axis = fixed_normal().as_dvec3();
    for _ in 0..POWER_ITERATIONS {
        let next = covariance * axis;
        if next.length_squared() == 0.0 {
            // Start vector orthogonal to every spread direction; restart on the dominant column
            let dominant = [covariance.x_axis, covariance.y_axis, covariance.z_axis]
                .into_iter()
                .max_by(|a, b| a.length_squared().total_cmp(&b.length_squared()))?;
            axis = dominant.try_normalize()?;
            continue;
        }
        axis = next.normalize();
    }

    // Sign is arbitrary; pin it so the sort order is reproducible
    let flip = if axis.dot(fixed_normal().as_dvec3()) < 0.0 {
        -1.0
    } else {
        1.0
    };
    (axis * flip).as_vec3().try_normalize()
}
