//! Kernels for vector registers whose width is only known at run time.
//!
//! A scalable register holds `vl` lanes, where `vl` is some multiple of a
//! fixed 128-bit granule chosen by the hardware. [`Scalable`] walks a buffer in
//! steps of `vl`, computes the active lane count of each step the way a
//! `whilelt` predicate would (`min(vl, n - i)`), and hands the whole granules
//! of the step to a fixed-width granule backend `G`. Lanes that do not fill a
//! granule are finished in scalar code.
//!
//! The width comes from a [`WidthSource`]; on SVE hardware that is a probe of
//! the register size cached in a [`LaneWidthCell`](crate::LaneWidthCell).

use std::marker::PhantomData;

use crate::simd::Backend;

/// Supplies the lane count of a scalable register.
pub trait WidthSource {
    /// Backend name reported for this width source.
    const NAME: &'static str;

    /// `f32` lanes per register. Must be positive and stable for the lifetime
    /// of the process.
    fn lanes() -> usize;
}

/// Scalable-width backend built from granule backend `G` and width source `W`.
pub struct Scalable<G, W> {
    _marker: PhantomData<(G, W)>,
}

/// Calls `body(offset, active)` for each register-sized step over `n` elements.
#[inline(always)]
fn for_each_step(vl: usize, n: usize, mut body: impl FnMut(usize, usize)) {
    debug_assert!(vl > 0, "vector length must be positive");

    let mut offset = 0;
    while offset < n {
        let active = vl.min(n - offset);
        body(offset, active);
        offset += vl;
    }
}

/// Splits `active` lanes into the part covered by whole granules and the rest.
#[inline(always)]
fn split_granules<G: Backend>(active: usize) -> (usize, usize) {
    let whole = active - active % G::lane_width();
    (whole, active - whole)
}

#[inline(always)]
unsafe fn zip_steps<G: Backend>(
    n: usize,
    vl: usize,
    x: *const f32,
    y: *const f32,
    z: *mut f32,
    kernel: unsafe fn(usize, *const f32, *const f32, *mut f32),
    op: impl Fn(f32, f32) -> f32,
) {
    for_each_step(vl, n, |offset, active| {
        let (whole, rest) = split_granules::<G>(active);
        let (x, y, z) = (x.add(offset), y.add(offset), z.add(offset));

        kernel(whole, x, y, z);
        for i in whole..whole + rest {
            *z.add(i) = op(*x.add(i), *y.add(i));
        }
    });
}

impl<G: Backend, W: WidthSource> Backend for Scalable<G, W> {
    const NAME: &'static str = W::NAME;

    #[inline]
    fn lane_width() -> usize {
        W::lanes()
    }

    /// Largest power of two dividing `lanes() * 4` bytes.
    ///
    /// Equals the register size whenever the register size is a power of two;
    /// granule loads never need more than their own 16 bytes.
    #[inline]
    fn alignment() -> usize {
        let bytes = W::lanes() * std::mem::size_of::<f32>();
        1 << bytes.trailing_zeros()
    }

    #[inline]
    unsafe fn add(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        zip_steps::<G>(n, W::lanes(), x, y, z, G::add, |a, b| a + b)
    }

    #[inline]
    unsafe fn sub(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        zip_steps::<G>(n, W::lanes(), x, y, z, G::sub, |a, b| a - b)
    }

    #[inline]
    unsafe fn mul(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        zip_steps::<G>(n, W::lanes(), x, y, z, G::mul, |a, b| a * b)
    }

    #[inline]
    unsafe fn div(n: usize, x: *const f32, y: *const f32, z: *mut f32) {
        zip_steps::<G>(n, W::lanes(), x, y, z, G::div, |a, b| a / b)
    }

    #[inline]
    unsafe fn scale(n: usize, x: *const f32, alpha: f32, z: *mut f32) {
        for_each_step(W::lanes(), n, |offset, active| {
            let (whole, rest) = split_granules::<G>(active);
            let (x, z) = (x.add(offset), z.add(offset));

            G::scale(whole, x, alpha, z);
            for i in whole..whole + rest {
                *z.add(i) = *x.add(i) * alpha;
            }
        });
    }

    #[inline]
    unsafe fn dot(n: usize, x: *const f32, y: *const f32) -> f32 {
        let mut sum = 0.0f32;
        for_each_step(W::lanes(), n, |offset, active| {
            let (whole, rest) = split_granules::<G>(active);
            let (x, y) = (x.add(offset), y.add(offset));

            sum += G::dot(whole, x, y);
            for i in whole..whole + rest {
                sum = (*x.add(i)).mul_add(*y.add(i), sum);
            }
        });
        sum
    }
}
