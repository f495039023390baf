//! Reading positions out of interleaved vertex buffers.

use crate::types::{POSITION_SIZE, ProximityError};
use glam::Vec3;

/// Check that `count` positions spaced `stride` bytes apart fit in `bytes`.
pub fn check_strided(bytes: &[u8], count: usize, stride: usize) -> Result<(), ProximityError> {
    if stride < POSITION_SIZE {
        return Err(ProximityError::StrideTooSmall { stride });
    }
    if count == 0 {
        return Ok(());
    }

    let needed = (count - 1)
        .checked_mul(stride)
        .and_then(|offset| offset.checked_add(POSITION_SIZE))
        .unwrap_or(usize::MAX);
    if bytes.len() < needed {
        return Err(ProximityError::BufferTooShort {
            len: bytes.len(),
            count,
            needed,
        });
    }
    Ok(())
}

/// Iterate the positions of an interleaved buffer.
///
/// The first position starts at byte 0; only the 12 position bytes of each
/// element are read. No alignment is required.
pub fn read_strided(
    bytes: &[u8],
    count: usize,
    stride: usize,
) -> Result<impl Iterator<Item = Vec3> + '_, ProximityError> {
    check_strided(bytes, count, stride)?;
    Ok((0..count).map(move |i| {
        let offset = i * stride;
        let [x, y, z]: [f32; 3] =
            bytemuck::pod_read_unaligned(&bytes[offset..offset + POSITION_SIZE]);
        Vec3::new(x, y, z)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interleaved(positions: &[[f32; 3]], padding: usize) -> Vec<u8> {
        let mut bytes = Vec::new();
        for p in positions {
            bytes.extend_from_slice(bytemuck::bytes_of(p));
            bytes.extend(std::iter::repeat_n(0xAB, padding));
        }
        bytes
    }

    #[test]
    fn test_read_with_padding() {
        let bytes = interleaved(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 8);
        let read: Vec<Vec3> = read_strided(&bytes, 2, 20).unwrap().collect();
        assert_eq!(read, vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
    }

    #[test]
    fn test_last_element_needs_no_padding() {
        let mut bytes = interleaved(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], 4);
        bytes.truncate(16 + POSITION_SIZE);
        assert_eq!(read_strided(&bytes, 2, 16).unwrap().count(), 2);
    }

    #[test]
    fn test_rejects_small_stride() {
        let bytes = vec![0u8; 64];
        assert_eq!(
            check_strided(&bytes, 2, 8),
            Err(ProximityError::StrideTooSmall { stride: 8 })
        );
    }

    #[test]
    fn test_rejects_short_buffer() {
        let bytes = vec![0u8; 20];
        assert_eq!(
            check_strided(&bytes, 2, 12),
            Err(ProximityError::BufferTooShort {
                len: 20,
                count: 2,
                needed: 24,
            })
        );
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert_eq!(read_strided(&[], 0, 12).unwrap().count(), 0);
    }
}
