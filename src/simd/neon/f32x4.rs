#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use std::ops::{Add, Div, Mul, Sub};

pub const LANE_COUNT: usize = 4;

/// A SIMD vector of 4 32-bit floating point values
#[derive(Copy, Clone, Debug)]
pub struct F32x4 {
    elements: float32x4_t,
}

impl F32x4 {
    /// Creates a new vector with all elements set to the same value.
    #[inline(always)]
    pub fn splat(value: f32) -> Self {
        Self {
            elements: unsafe { vdupq_n_f32(value) },
        }
    }

    #[inline(always)]
    pub fn zero() -> Self {
        Self::splat(0.0)
    }

    /// Loads 4 elements. NEON loads accept any f32-aligned address.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for 4 f32 reads.
    #[inline(always)]
    pub unsafe fn load(ptr: *const f32) -> Self {
        Self {
            elements: vld1q_f32(ptr),
        }
    }

    /// # Safety
    ///
    /// `ptr` must be valid for 4 f32 writes.
    #[inline(always)]
    pub unsafe fn store_at(&self, ptr: *mut f32) {
        vst1q_f32(ptr, self.elements)
    }

    /// Computes `self + a * b` with a single rounding step.
    #[inline(always)]
    pub fn fmadd(self, a: Self, b: Self) -> Self {
        Self {
            elements: unsafe { vfmaq_f32(self.elements, a.elements, b.elements) },
        }
    }

    #[inline(always)]
    pub fn reduce_add(self) -> f32 {
        unsafe { vaddvq_f32(self.elements) }
    }
}

impl Add for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vaddq_f32(self.elements, rhs.elements) },
        }
    }
}

impl Sub for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vsubq_f32(self.elements, rhs.elements) },
        }
    }
}

impl Mul for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vmulq_f32(self.elements, rhs.elements) },
        }
    }
}

impl Div for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { vdivq_f32(self.elements, rhs.elements) },
        }
    }
}
