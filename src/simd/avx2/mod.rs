//! AVX2 + FMA backend, 256-bit vectors.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: Intel Haswell (2013+) or AMD Excavator (2015+)
//! - **Instruction Sets**: AVX, AVX2 and FMA
//! - **Selection**: `build.rs` picks this backend when the target (or, for
//!   native builds, the host CPU) has `avx2` and `fma`
//!
//! # Performance Characteristics
//!
//! - **Vector Width**: 256 bits (8 × f32)
//! - **Memory Alignment**: 32 bytes, every load and store is aligned

use crate::simd::Backend;

pub mod f32x8;

use f32x8::{F32x8, LANE_COUNT};

/// 256-bit fixed-width backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avx2;

impl Backend for Avx2 {
    const NAME: &'static str = "avx2";

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

/// Applies `op` to each pair of aligned 8-lane chunks of `x` and `y`.
#[inline(always)]
unsafe fn zip_chunks(
    n: usize,
    x: *const f32,
    y: *const f32,
    z: *mut f32,
    op: impl Fn(F32x8, F32x8) -> F32x8,
) {
    debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

    for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
        let a = F32x8::load_aligned(x.add(i));
        let b = F32x8::load_aligned(y.add(i));
        op(a, b).store_aligned_at(z.add(i));
    }
}

#[target_feature(enable = "avx2,fma")]
unsafe fn add(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a + b)
}

#[target_feature(enable = "avx2,fma")]
unsafe fn sub(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a - b)
}

#[target_feature(enable = "avx2,fma")]
unsafe fn mul(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a * b)
}

#[target_feature(enable = "avx2,fma")]
unsafe fn div(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
    zip_chunks(n, x, y, z, |a, b| a / b)
}

#[target_feature(enable = "avx2,fma")]
unsafe fn scale(n: usize, x: *const f32, alpha: f32, z: *mut f32) {
    debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

    let factor = F32x8::splat(alpha);
    for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
        let a = F32x8::load_aligned(x.add(i));
        (a * factor).store_aligned_at(z.add(i));
    }
}

#[target_feature(enable = "avx2,fma")]
unsafe fn dot(n: usize, x: *const f32, y: *const f32) -> f32 {
    debug_assert_eq!(n % LANE_COUNT, 0, "size must be a multiple of {LANE_COUNT}");

    let mut acc = F32x8::zero();
    for i in (0..n / LANE_COUNT).map(|chunk| chunk * LANE_COUNT) {
        let a = F32x8::load_aligned(x.add(i));
        let b = F32x8::load_aligned(y.add(i));
        acc = acc.fmadd(a, b);
    }

    acc.reduce_add()
}
