//! Fixed-point to floating-point sample scaling.

use crate::capture::WordWidth;

/// Scales `dest.len()` raw samples from `source` into `dest`.
///
/// `source` is read as consecutive native-endian unsigned words of `width`
/// bytes, and each element becomes `sample as f32 * scale`. Elements are
/// processed in index order. `source` must hold at least
/// `dest.len() * width.bytes()` bytes; any excess is ignored.
pub fn scale_samples(dest: &mut [f32], source: &[u8], width: WordWidth, scale: f32) {
    debug_assert!(source.len() >= dest.len() * width.bytes());

    match width {
        WordWidth::One => {
            for (d, &s) in dest.iter_mut().zip(source) {
                *d = s as f32 * scale;
            }
        }
        WordWidth::Two => {
            for (d, c) in dest.iter_mut().zip(source.chunks_exact(2)) {
                *d = u16::from_ne_bytes([c[0], c[1]]) as f32 * scale;
            }
        }
        WordWidth::Four => {
            for (d, c) in dest.iter_mut().zip(source.chunks_exact(4)) {
                *d = u32::from_ne_bytes([c[0], c[1], c[2], c[3]]) as f32 * scale;
            }
        }
    }
}
