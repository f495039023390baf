//! Float comparison in units in the last place.

use glam::Vec3;

/// Map an f32 onto i32 so that integer order matches float order.
///
/// `-0.0` and `0.0` map to the same value.
#[inline]
fn ordered_bits(value: f32) -> i32 {
    let bits = value.to_bits() as i32;
    if bits < 0 { i32::MIN - bits } else { bits }
}

/// Number of representable f32 values between `a` and `b`.
#[inline]
pub fn ulps_between(a: f32, b: f32) -> u64 {
    (i64::from(ordered_bits(a)) - i64::from(ordered_bits(b))).unsigned_abs()
}

/// True when every component of `a` is within `tolerance` ULPs of `b`.
#[inline]
pub fn within_ulps(a: Vec3, b: Vec3, tolerance: u32) -> bool {
    let tolerance = u64::from(tolerance);
    ulps_between(a.x, b.x) <= tolerance
        && ulps_between(a.y, b.y) <= tolerance
        && ulps_between(a.z, b.z) <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_floats_are_one_ulp_apart() {
        let a = 1.0f32;
        let b = f32::from_bits(a.to_bits() + 1);
        assert_eq!(ulps_between(a, b), 1);
        assert_eq!(ulps_between(b, a), 1);
    }

    #[test]
    fn test_signed_zero_is_identical() {
        assert_eq!(ulps_between(0.0, -0.0), 0);
    }

    #[test]
    fn test_across_zero() {
        let tiny = f32::from_bits(1);
        assert_eq!(ulps_between(-tiny, tiny), 2);
    }

    #[test]
    fn test_within_ulps_per_component() {
        let a = Vec3::new(1.0, -2.0, 1000.0);
        let mut b = a;
        b.z = f32::from_bits(a.z.to_bits() + 4);
        assert!(within_ulps(a, b, 4));
        b.z = f32::from_bits(a.z.to_bits() + 5);
        assert!(!within_ulps(a, b, 4));
    }
}
