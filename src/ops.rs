//! Operations on aligned buffers, dispatched statically to [`Active`].
//!
//! Every operation takes the caller's logical `size`, rounds it up to the lane
//! width (so passing the padded size works too), checks that each operand holds
//! at least that many elements and then runs the backend kernel over the padded
//! range. Operands are [`SimdBuffer`]s, which only this crate constructs, so
//! their alignment is never checked at run time.
//!
//! # Numerical edge cases
//!
//! * `div` follows IEEE-754: `x / 0.0` is `±inf` and `0.0 / 0.0` is NaN, in the
//!   logical range as well as in the padding.
//! * `normalize` of a vector whose squared norm is exactly zero leaves the
//!   output untouched.
//! * `dot` and `normalize` include the padding, which is harmless while it is
//!   zero (see [`crate::buffer`]).

use crate::buffer::{SimdBuffer, SimdBufferMut};
use crate::error::{ensure_capacity, Result};
use crate::lanes::padded_len;
use crate::simd::{Active, Backend};

type BinaryKernel = unsafe fn(usize, *const f32, *const f32, *mut f32);

/// Lane-rounded size of an operation over `operands`, after checking capacities.
#[inline]
fn span(size: usize, operands: &[(&'static str, &[f32])]) -> Result<usize> {
    let n = padded_len(size);
    for &(name, data) in operands {
        ensure_capacity(name, n, data.len())?;
        debug_assert_eq!(
            data.as_ptr() as usize % Active::alignment(),
            0,
            "operand `{name}` is not {}-byte aligned",
            Active::alignment()
        );
    }
    Ok(n)
}

#[inline]
fn elementwise<X, Y, Z>(size: usize, x: &X, y: &Y, z: &mut Z, kernel: BinaryKernel) -> Result<()>
where
    X: SimdBuffer + ?Sized,
    Y: SimdBuffer + ?Sized,
    Z: SimdBufferMut + ?Sized,
{
    let n = span(
        size,
        &[("x", x.padded()), ("y", y.padded()), ("z", z.padded())],
    )?;

    // SAFETY: all operands hold `n` lane-aligned elements (checked above), and
    // `z` is borrowed mutably so it cannot alias `x` or `y`.
    unsafe {
        kernel(
            n,
            x.padded().as_ptr(),
            y.padded().as_ptr(),
            z.padded_mut().as_mut_ptr(),
        )
    };
    Ok(())
}

/// `z[i] = x[i] + y[i]`
///
/// # Example
///
/// ```rust
/// let x = vx::AlignedBuf::from_slice(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
/// let y = vx::AlignedBuf::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])?;
/// let mut z = vx::allocate(7)?;
///
/// vx::add(7, &x, &y, &mut z)?;
/// assert_eq!(z.logical(), &[1.0, 3.0, 5.0, 7.0, 9.0, 11.0, 13.0]);
/// # Ok::<(), vx::VxError>(())
/// ```
pub fn add<X, Y, Z>(size: usize, x: &X, y: &Y, z: &mut Z) -> Result<()>
where
    X: SimdBuffer + ?Sized,
    Y: SimdBuffer + ?Sized,
    Z: SimdBufferMut + ?Sized,
{
    elementwise(size, x, y, z, Active::add)
}

/// `z[i] = x[i] - y[i]`
pub fn sub<X, Y, Z>(size: usize, x: &X, y: &Y, z: &mut Z) -> Result<()>
where
    X: SimdBuffer + ?Sized,
    Y: SimdBuffer + ?Sized,
    Z: SimdBufferMut + ?Sized,
{
    elementwise(size, x, y, z, Active::sub)
}

/// `z[i] = x[i] * y[i]`
pub fn mul<X, Y, Z>(size: usize, x: &X, y: &Y, z: &mut Z) -> Result<()>
where
    X: SimdBuffer + ?Sized,
    Y: SimdBuffer + ?Sized,
    Z: SimdBufferMut + ?Sized,
{
    elementwise(size, x, y, z, Active::mul)
}

/// `z[i] = x[i] / y[i]`
///
/// Zero divisors are not an error; see the module docs.
pub fn div<X, Y, Z>(size: usize, x: &X, y: &Y, z: &mut Z) -> Result<()>
where
    X: SimdBuffer + ?Sized,
    Y: SimdBuffer + ?Sized,
    Z: SimdBufferMut + ?Sized,
{
    elementwise(size, x, y, z, Active::div)
}

/// `z[i] = x[i] * alpha`
pub fn scale<X, Z>(size: usize, x: &X, alpha: f32, z: &mut Z) -> Result<()>
where
    X: SimdBuffer + ?Sized,
    Z: SimdBufferMut + ?Sized,
{
    let n = span(size, &[("x", x.padded()), ("z", z.padded())])?;

    // SAFETY: both operands hold `n` lane-aligned elements and cannot alias.
    unsafe { Active::scale(n, x.padded().as_ptr(), alpha, z.padded_mut().as_mut_ptr()) };
    Ok(())
}

/// Sum of `x[i] * y[i]`, accumulated with fused multiply-add.
pub fn dot<X, Y>(size: usize, x: &X, y: &Y) -> Result<f32>
where
    X: SimdBuffer + ?Sized,
    Y: SimdBuffer + ?Sized,
{
    let n = span(size, &[("x", x.padded()), ("y", y.padded())])?;

    // SAFETY: both operands hold `n` lane-aligned elements; nothing is written.
    Ok(unsafe { Active::dot(n, x.padded().as_ptr(), y.padded().as_ptr()) })
}

/// Writes `x / ‖x‖` into `z`; leaves `z` untouched when `x` is all zeros.
///
/// # Example
///
/// ```rust
/// let x = vx::AlignedBuf::from_slice(&[3.0, 4.0])?;
/// let mut z = vx::allocate(2)?;
///
/// vx::normalize(2, &x, &mut z)?;
/// assert_eq!(z.logical(), &[0.6, 0.8]);
/// # Ok::<(), vx::VxError>(())
/// ```
pub fn normalize<X, Z>(size: usize, x: &X, z: &mut Z) -> Result<()>
where
    X: SimdBuffer + ?Sized,
    Z: SimdBufferMut + ?Sized,
{
    let n = span(size, &[("x", x.padded()), ("z", z.padded())])?;

    // SAFETY: both operands hold `n` lane-aligned elements and cannot alias.
    unsafe { Active::normalize(n, x.padded().as_ptr(), z.padded_mut().as_mut_ptr()) };
    Ok(())
}

/// Scales `x` to unit length in place; an all-zero `x` is left as it is.
pub fn normalize_in_place<X>(size: usize, x: &mut X) -> Result<()>
where
    X: SimdBufferMut + ?Sized,
{
    let n = span(size, &[("x", x.padded())])?;

    let ptr = x.padded_mut().as_mut_ptr();
    // SAFETY: `x` holds `n` lane-aligned elements; in and out being the same
    // pointer is allowed by the kernel contract.
    unsafe { Active::normalize(n, ptr, ptr) };
    Ok(())
}
