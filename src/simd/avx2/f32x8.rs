//! AVX2 8-lane f32 SIMD vector.
//!
//! `F32x8` wraps Intel's `__m256` register. Every method is
//! `#[inline(always)]` so it folds into the `#[target_feature(enable = "avx2,fma")]`
//! kernels in the parent module; used on its own it still executes AVX
//! instructions, which `build.rs` only allows when the CPU has them.
//!
//! # Supported Operations
//!
//! - `load_aligned()` / `store_aligned_at()` - 32-byte aligned memory access
//! - `splat()`, `zero()` - broadcast constructors
//! - `fmadd()` - fused multiply-add
//! - `reduce_add()` - horizontal sum of all 8 lanes
//! - Element-wise `+`, `-`, `*`, `/`

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use std::ops::{Add, Div, Mul, Sub};

/// AVX2 memory alignment requirement in bytes.
///
/// `_mm256_load_ps` and `_mm256_store_ps` fault on addresses that are not
/// 32-byte aligned.
pub(crate) const AVX_ALIGNMENT: usize = 32;

/// Number of f32 elements that fit in an AVX2 256-bit vector.
pub(crate) const LANE_COUNT: usize = 8;

/// AVX2 SIMD vector containing 8 packed f32 values.
#[derive(Copy, Clone, Debug)]
pub struct F32x8 {
    /// AVX2 256-bit vector register containing 8 packed f32 values
    pub elements: __m256,
}

impl F32x8 {
    /// Checks if a pointer is properly aligned for AVX2 loads and stores.
    #[inline(always)]
    pub fn is_aligned(ptr: *const f32) -> bool {
        (ptr as usize) % AVX_ALIGNMENT == 0
    }

    /// Broadcasts `value` into all 8 lanes.
    #[inline(always)]
    pub fn splat(value: f32) -> Self {
        Self {
            elements: unsafe { _mm256_set1_ps(value) },
        }
    }

    /// A vector of zeros.
    #[inline(always)]
    pub fn zero() -> Self {
        Self {
            elements: unsafe { _mm256_setzero_ps() },
        }
    }

    /// Loads 8 elements from 32-byte aligned memory.
    ///
    /// # Safety
    ///
    /// Pointer must be 32-byte aligned and point to at least 8 valid f32 values.
    #[inline(always)]
    pub unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert!(Self::is_aligned(ptr), "pointer must be {AVX_ALIGNMENT}-byte aligned");

        Self {
            elements: _mm256_load_ps(ptr),
        }
    }

    /// Stores the 8 lanes into 32-byte aligned memory.
    ///
    /// # Safety
    ///
    /// Pointer must be 32-byte aligned and valid for 8 f32 writes.
    #[inline(always)]
    pub unsafe fn store_aligned_at(&self, ptr: *mut f32) {
        debug_assert!(Self::is_aligned(ptr), "pointer must be {AVX_ALIGNMENT}-byte aligned");

        _mm256_store_ps(ptr, self.elements)
    }

    /// Computes `self + a * b` with a single rounding step.
    #[inline(always)]
    pub fn fmadd(self, a: Self, b: Self) -> Self {
        Self {
            elements: unsafe { _mm256_fmadd_ps(a.elements, b.elements, self.elements) },
        }
    }

    /// Sums the 8 lanes.
    #[inline(always)]
    pub fn reduce_add(self) -> f32 {
        unsafe {
            let hi = _mm256_extractf128_ps::<1>(self.elements);
            let lo = _mm256_castps256_ps128(self.elements);
            let sum128 = _mm_add_ps(lo, hi);
            let shuf = _mm_movehdup_ps(sum128);
            let sums = _mm_add_ps(sum128, shuf);
            let shuf2 = _mm_movehl_ps(sums, sums);
            _mm_cvtss_f32(_mm_add_ss(sums, shuf2))
        }
    }
}

impl Add for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_add_ps(self.elements, rhs.elements) },
        }
    }
}

impl Sub for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_sub_ps(self.elements, rhs.elements) },
        }
    }
}

impl Mul for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_mul_ps(self.elements, rhs.elements) },
        }
    }
}

impl Div for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_div_ps(self.elements, rhs.elements) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(align(32))]
    struct Aligned([f32; LANE_COUNT]);

    fn to_array(v: F32x8) -> [f32; LANE_COUNT] {
        let mut out = Aligned([0.0; LANE_COUNT]);
        unsafe { v.store_aligned_at(out.0.as_mut_ptr()) };
        out.0
    }

    #[test]
    fn test_load_store_roundtrip() {
        let data = Aligned([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let v = unsafe { F32x8::load_aligned(data.0.as_ptr()) };
        assert_eq!(to_array(v), data.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Aligned([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let a = unsafe { F32x8::load_aligned(a.0.as_ptr()) };
        let b = F32x8::splat(2.0);

        assert_eq!(to_array(a + b), [3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(to_array(a - b), [-1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(to_array(a * b), [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0]);
        assert_eq!(to_array(a / b), [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0]);
    }

    #[test]
    fn test_fmadd_and_reduce() {
        let a = Aligned([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let a = unsafe { F32x8::load_aligned(a.0.as_ptr()) };
        let acc = F32x8::zero().fmadd(a, F32x8::splat(1.0));
        assert_eq!(acc.reduce_add(), 36.0);
        assert_eq!(F32x8::zero().reduce_add(), 0.0);
    }
}
