//! AVX-512F backend, 512-bit vectors.
//!
//! Opt-in through the `avx512` cargo feature; `build.rs` still falls back to
//! AVX2 when the target CPU lacks `avx512f`.

use crate::simd::Backend;

pub mod f32x16;

use f32x16::{F32x16, LANE_COUNT};

/// 512-bit fixed-width backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avx512;

impl Backend for Avx512 {
    const NAME: &'static str = "avx512";

    #[inline(always)]
    fn lane_width() -> usize {
        LANE_COUNT
    }

    #[inline]
    unsafe fn add(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        add(n, x, y, z)
    }

    #[inline]
    unsafe fn sub(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        sub(n, x, y, z)
    }

    #[inline]
    unsafe fn mul(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        mul(n, x, y, z)
    }

    #[inline]
    unsafe fn div(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        div(n, x, y, z)
    }

    #[inline]
    unsafe fn scale(n: usize, x: *const f32, alpha: f32, z: *mut f32) {
        scale(n, x, alpha, z)
    }

    #[inline]
    unsafe fn dot(n: usize, x: *const f32, y: *const f32) -> f32 {
        dot(n, x, y)
    }
}

#[inline(always)]
unsafe fn zip_chunks(
    n: usize,
    x: *const f32,
    y: *const f32,
    z: *mut f32,
    op: impl Fn(F32x16, F32x16) -> F32x16,
) {
    debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

    for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
        let a = F32x16::load_aligned(x.add(i));
        let b = F32x16::load_aligned(y.add(i));
        op(a, b).store_aligned_at(z.add(i));
    }
}

#[target_feature(enable = "avx512f")]
unsafe fn add(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a + b)
}

#[target_feature(enable = "avx512f")]
unsafe fn sub(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a - b)
}

#[target_feature(enable = "avx512f")]
unsafe fn mul(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a * b)
}

#[target_feature(enable = "avx512f")]
unsafe fn div(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a / b)
}

#[target_feature(enable = "avx512f")]
unsafe fn scale(n: usize, x: *const f32, alpha: f32, z: *mut f32) {
    debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

    let factor = F32x16::splat(alpha);
    for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
        (F32x16::load_aligned(x.add(i)) * factor).store_aligned_at(z.add(i));
    }
}

#[target_feature(enable = "avx512f")]
unsafe fn dot(n: usize, x: *const f32, y: *const f32) -> f32 {
    debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

    let mut acc = F32x16::zero();
    for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
        let a = F32x16::load_aligned(x.add(i));
        let b = F32x16::load_aligned(y.add(i));
        acc = acc.fmadd(a, b);
    }

    acc.reduce_add()
}
