//! Portable backend: plain Rust over 4-lane chunks.
//!
//! Built as the active backend on targets without a supported instruction set
//! (or with the `force-fallback` feature), and compiled everywhere as the
//! reference the SIMD kernels are checked against. It mirrors a 128-bit
//! register: 4 lanes, 16-byte alignment, per-lane fused multiply-add
//! accumulators for `dot` reduced in the same order as the hardware kernels.

use crate::simd::Backend;

pub(crate) const LANE_COUNT: usize = 4;

type Chunk = [f32; LANE_COUNT];

/// Portable 4-lane backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fallback;

#[inline(always)]
unsafe fn load(ptr: *const f32) -> Chunk {
    ptr.cast::<Chunk>().read()
}

#[inline(always)]
unsafe fn store(ptr: *mut f32, chunk: Chunk) {
    ptr.cast::<Chunk>().write(chunk)
}

#[inline(always)]
unsafe fn zip_chunks(
    n: usize,
    x: *const f32,
    y: *const f32,
    z: *mut f32,
    op: impl Fn(f32, f32) -> f32,
) {
    debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

    for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
        let a = load(x.add(i));
        let b = load(y.add(i));
        store(z.add(i), std::array::from_fn(|lane| op(a[lane], b[lane])));
    }
}

impl Backend for Fallback {
    const NAME: &'static str = "fallback";

    #[inline(always)]
    fn lane_width() -> usize {
        LANE_COUNT
    }

    #[inline]
    unsafe fn add(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        zip_chunks(n, x, y, z, |a, b| a + b)
    }

    #[inline]
    unsafe fn sub(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        zip_chunks(n, x, y, z, |a, b| a - b)
    }

    #[inline]
    unsafe fn mul(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        zip_chunks(n, x, y, z, |a, b| a * b)
    }

    #[inline]
    unsafe fn div(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        zip_chunks(n, x, y, z, |a, b| a / b)
    }

    #[inline]
    unsafe fn scale(n: usize, x: *const f32, alpha: f32, z: *mut f32) {
        debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

        for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
            let a = load(x.add(i));
            store(z.add(i), a.map(|value| value * alpha));
        }
    }

    #[inline]
    unsafe fn dot(n: usize, x: *const f32, y: *const f32) -> f32 {
        debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

        let mut acc: Chunk = [0.0; LANE_COUNT];
        for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
            let a = load(x.add(i));
            let b = load(y.add(i));
            for lane in 0..LANE_COUNT {
                acc[lane] = a[lane].mul_add(b[lane], acc[lane]);
            }
        }

        (acc[0] + acc[2]) + (acc[1] + acc[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementwise() {
        let x = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let y = [2.0f32; 8];
        let mut z = [0.0f32; 8];

        unsafe { Fallback::add(8, x.as_ptr(), y.as_ptr(), z.as_mut_ptr()) };
        assert_eq!(z, [3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);

        unsafe { Fallback::sub(8, x.as_ptr(), y.as_ptr(), z.as_mut_ptr()) };
        assert_eq!(z, [-1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        unsafe { Fallback::mul(8, x.as_ptr(), y.as_ptr(), z.as_mut_ptr()) };
        assert_eq!(z, [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0]);

        unsafe { Fallback::div(8, x.as_ptr(), y.as_ptr(), z.as_mut_ptr()) };
        assert_eq!(z, [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0]);
    }

    #[test]
    fn test_dot_and_normalize() {
        let x = [3.0f32, 4.0, 0.0, 0.0];
        assert_eq!(unsafe { Fallback::dot(4, x.as_ptr(), x.as_ptr()) }, 25.0);

        let mut z = [0.0f32; 4];
        unsafe { Fallback::normalize(4, x.as_ptr(), z.as_mut_ptr()) };
        assert_eq!(z, [0.6, 0.8, 0.0, 0.0]);
    }

    #[test]
    fn test_normalize_zero_vector_leaves_output() {
        let x = [0.0f32; 4];
        let mut z = [9.0f32; 4];
        unsafe { Fallback::normalize(4, x.as_ptr(), z.as_mut_ptr()) };
        assert_eq!(z, [9.0; 4]);
    }

    #[test]
    fn test_in_place_scale() {
        let mut x = [1.0f32, -2.0, 3.0, -4.0];
        let ptr = x.as_mut_ptr();
        unsafe { Fallback::scale(4, ptr, 0.5, ptr) };
        assert_eq!(x, [0.5, -1.0, 1.5, -2.0]);
    }
}
