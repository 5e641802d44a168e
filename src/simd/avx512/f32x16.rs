//! AVX-512 16-lane f32 SIMD vector.
//!
//! `F32x16` wraps Intel's `__m512` register. Methods are `#[inline(always)]` so
//! they fold into the `#[target_feature(enable = "avx512f")]` kernels of the
//! parent module.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use std::ops::{Add, Div, Mul, Sub};

/// AVX-512 memory alignment requirement in bytes.
pub(crate) const AVX512_ALIGNMENT: usize = 64;

/// Number of f32 elements that fit in an AVX-512 register.
pub(crate) const LANE_COUNT: usize = 16;

/// AVX-512 SIMD vector containing 16 packed f32 values.
#[derive(Copy, Clone, Debug)]
pub struct F32x16 {
    pub elements: __m512,
}

impl F32x16 {
    #[inline(always)]
    pub fn is_aligned(ptr: *const f32) -> bool {
        (ptr as usize) % AVX512_ALIGNMENT == 0
    }

    #[inline(always)]
    pub fn splat(value: f32) -> Self {
        Self {
            elements: unsafe { _mm512_set1_ps(value) },
        }
    }

    #[inline(always)]
    pub fn zero() -> Self {
        Self {
            elements: unsafe { _mm512_setzero_ps() },
        }
    }

    /// # Safety
    ///
    /// Pointer must be 64-byte aligned and point to at least 16 valid f32 values.
    #[inline(always)]
    pub unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert!(Self::is_aligned(ptr), "pointer must be {AVX512_ALIGNMENT}-byte aligned");

        Self {
            elements: _mm512_load_ps(ptr),
        }
    }

    /// # Safety
    ///
    /// Pointer must be 64-byte aligned and valid for 16 f32 writes.
    #[inline(always)]
    pub unsafe fn store_aligned_at(&self, ptr: *mut f32) {
        debug_assert!(Self::is_aligned(ptr), "pointer must be {AVX512_ALIGNMENT}-byte aligned");

        _mm512_store_ps(ptr, self.elements)
    }

    /// Computes `self + a * b` with a single rounding step.
    #[inline(always)]
    pub fn fmadd(self, a: Self, b: Self) -> Self {
        Self {
            elements: unsafe { _mm512_fmadd_ps(a.elements, b.elements, self.elements) },
        }
    }

    #[inline(always)]
    pub fn reduce_add(self) -> f32 {
        unsafe { _mm512_reduce_add_ps(self.elements) }
    }
}

impl Add for F32x16 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm512_add_ps(self.elements, rhs.elements) },
        }
    }
}

impl Sub for F32x16 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm512_sub_ps(self.elements, rhs.elements) },
        }
    }
}

impl Mul for F32x16 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm512_mul_ps(self.elements, rhs.elements) },
        }
    }
}

impl Div for F32x16 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm512_div_ps(self.elements, rhs.elements) },
        }
    }
}
