//! ARM NEON backend, 128-bit vectors.
//!
//! NEON is part of every AArch64 core (Apple Silicon, AWS Graviton, Cortex-A),
//! so `build.rs` selects this backend for every aarch64 build unless the `sve`
//! feature asks for the scalable one. The SVE backend reuses these kernels for
//! the 128-bit granules of its runtime-sized chunks.
//!
//! - **Vector Width**: 128 bits (4 × f32)
//! - **Memory Alignment**: 16 bytes (the allocator guarantees it; NEON loads
//!   themselves only need f32 alignment)

use crate::simd::Backend;

pub mod f32x4;

use f32x4::{F32x4, LANE_COUNT};

/// 128-bit fixed-width backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neon;

impl Backend for Neon {
    const NAME: &'static str = "neon";

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
    op: impl Fn(F32x4, F32x4) -> F32x4,
) {
    debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

    for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
        let a = F32x4::load(x.add(i));
        let b = F32x4::load(y.add(i));
        op(a, b).store_at(z.add(i));
    }
}

#[target_feature(enable = "neon")]
unsafe fn add(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a + b)
}

#[target_feature(enable = "neon")]
unsafe fn sub(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a - b)
}

#[target_feature(enable = "neon")]
unsafe fn mul(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a * b)
}

#[target_feature(enable = "neon")]
unsafe fn div(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a / b)
}

#[target_feature(enable = "neon")]
unsafe fn scale(n: usize, x: *const f32, alpha: f32, z: *mut f32) {
    debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

    let factor = F32x4::splat(alpha);
    for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
        (F32x4::load(x.add(i)) * factor).store_at(z.add(i));
    }
}

#[target_feature(enable = "neon")]
unsafe fn dot(n: usize, x: *const f32, y: *const f32) -> f32 {
    debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

    let mut acc = F32x4::zero();
    for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
        let a = F32x4::load(x.add(i));
        let b = F32x4::load(y.add(i));
        acc = acc.fmadd(a, b);
    }

    acc.reduce_add()
}
