//! Lane-aligned, lane-padded `f32` buffers.
//!
//! [`AlignedBuf`] is the only 1D storage the kernels accept. Its base address
//! is aligned to [`alignment`] bytes and its length is the requested size
//! rounded up to a whole number of vector registers, with the extra tail
//! zeroed. Zero is the identity of `+`/`-` and contributes nothing to a dot
//! product, so kernels can run over the full padded length without masking.
//!
//! # Caller obligations
//!
//! The tail stays zero only while nothing writes to it. `add`, `sub`, `mul`
//! and `scale` keep a zero tail zero; `div` turns it into NaN (`0 / 0`), and so
//! does any direct write through the padded view. A `dot` or `normalize` over a
//! buffer whose tail is not zero silently includes the tail. Reset it with
//! [`AlignedBuf::clear_padding`] after such writes.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use tracing::{trace, warn};

use crate::error::{ensure_capacity, Result, VxError};
use crate::lanes::{alignment, lane_width, round_up};

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Storage the kernels may read: lane-aligned and a whole number of lanes long.
///
/// Implemented only by types this crate allocates ([`AlignedBuf`] and the
/// rows of an [`AlignedMatrix`](crate::AlignedMatrix)), which is what makes the
/// alignment precondition of the kernels hold by construction.
pub trait SimdBuffer: sealed::Sealed {
    /// The full storage including the zeroed padding.
    fn padded(&self) -> &[f32];
}

/// Storage the kernels may write.
pub trait SimdBufferMut: SimdBuffer {
    /// The full storage including the zeroed padding.
    fn padded_mut(&mut self) -> &mut [f32];
}

/// Allocates `len` zeroed `f32` aligned to `align` bytes.
///
/// Zero-length requests do not allocate and return a dangling pointer that
/// still honors `align`.
pub(crate) fn alloc_zeroed_f32(len: usize, align: usize) -> Result<NonNull<f32>> {
    if len == 0 {
        return NonNull::new(ptr::without_provenance_mut::<f32>(align))
            .ok_or(VxError::Layout { len, align });
    }

    let layout = f32_layout(len, align)?;

    // SAFETY: `layout` has a non-zero size, checked above.
    let ptr = unsafe { alloc_zeroed(layout) }.cast::<f32>();

    match NonNull::new(ptr) {
        Some(ptr) => Ok(ptr),
        None => {
            warn!(bytes = layout.size(), align, "aligned allocation failed");
            Err(VxError::Allocation {
                bytes: layout.size(),
                align,
            })
        }
    }
}

fn f32_layout(len: usize, align: usize) -> Result<Layout> {
    len.checked_mul(mem::size_of::<f32>())
        .and_then(|bytes| Layout::from_size_align(bytes, align).ok())
        .ok_or(VxError::Layout { len, align })
}

/// An owned, aligned, zero-padded run of `f32`.
///
/// `len()` and the slice view report the padded length; the size the buffer
/// was requested with is [`logical_len`](Self::logical_len).
///
/// # Example
///
/// ```rust
/// let mut x = vx::allocate(7)?;
/// assert_eq!(x.len() % vx::lane_width(), 0);
/// assert_eq!(x.logical_len(), 7);
///
/// x.logical_mut().copy_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
/// assert!(x[7..].iter().all(|&pad| pad == 0.0));
/// # Ok::<(), vx::VxError>(())
/// ```
pub struct AlignedBuf {
    ptr: NonNull<f32>,
    len: usize,
    logical: usize,
    align: usize,
}

// SAFETY: `AlignedBuf` uniquely owns plain `f32` memory, like `Vec<f32>`.
unsafe impl Send for AlignedBuf {}
unsafe impl Sync for AlignedBuf {}

impl AlignedBuf {
    /// Allocates room for `size` elements, padded to the active lane width.
    pub fn zeroed(size: usize) -> Result<Self> {
        Self::with_lanes(size, lane_width(), alignment())
    }

    /// Allocates a buffer holding a copy of `data`.
    pub fn from_slice(data: &[f32]) -> Result<Self> {
        let mut buf = Self::zeroed(data.len())?;
        buf.logical_mut().copy_from_slice(data);
        Ok(buf)
    }

    pub(crate) fn with_lanes(size: usize, lanes: usize, align: usize) -> Result<Self> {
        let len = size
            .checked_next_multiple_of(lanes)
            .ok_or(VxError::Layout { len: size, align })?;

        let ptr = alloc_zeroed_f32(len, align)?;
        trace!(logical = size, padded = len, align, "allocated aligned buffer");

        Ok(Self {
            ptr,
            len,
            logical: size,
            align,
        })
    }

    /// Padded length in elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The size this buffer was requested with.
    #[inline]
    pub fn logical_len(&self) -> usize {
        self.logical
    }

    /// Byte alignment of the base address.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.align
    }

    /// The caller's elements, without padding.
    #[inline]
    pub fn logical(&self) -> &[f32] {
        &self[..self.logical]
    }

    #[inline]
    pub fn logical_mut(&mut self) -> &mut [f32] {
        let logical = self.logical;
        &mut self[..logical]
    }

    /// Zeroes `[logical_len, len)` again.
    pub fn clear_padding(&mut self) {
        let logical = self.logical;
        self[logical..].fill(0.0);
    }

    #[inline]
    pub fn as_ptr(&self) -> *const f32 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut f32 {
        self.ptr.as_ptr()
    }
}

impl Drop for AlignedBuf {
    fn drop(&mut self) {
        if self.len == 0 {
            return;
        }

        // The layout was validated when the buffer was allocated.
        if let Ok(layout) = f32_layout(self.len, self.align) {
            // SAFETY: `ptr` came from `alloc_zeroed(layout)` and is freed only here.
            unsafe { dealloc(self.ptr.as_ptr().cast(), layout) };
        }
    }
}

impl Deref for AlignedBuf {
    type Target = [f32];

    #[inline]
    fn deref(&self) -> &[f32] {
        // SAFETY: `ptr` is valid for `len` initialized elements (zeroed at allocation).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for AlignedBuf {
    #[inline]
    fn deref_mut(&mut self) -> &mut [f32] {
        // SAFETY: as in `deref`, and `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Clone for AlignedBuf {
    fn clone(&self) -> Self {
        let ptr = match alloc_zeroed_f32(self.len, self.align) {
            Ok(ptr) => ptr,
            Err(err) => match f32_layout(self.len, self.align) {
                Ok(layout) => handle_alloc_error(layout),
                Err(_) => panic!("{err}"),
            },
        };

        let mut copy = Self {
            ptr,
            len: self.len,
            logical: self.logical,
            align: self.align,
        };
        copy.copy_from_slice(self);
        copy
    }
}

impl fmt::Debug for AlignedBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuf")
            .field("logical", &self.logical())
            .field("padded_len", &self.len)
            .field("alignment", &self.align)
            .finish()
    }
}

impl sealed::Sealed for AlignedBuf {}

impl SimdBuffer for AlignedBuf {
    #[inline]
    fn padded(&self) -> &[f32] {
        self
    }
}

impl SimdBufferMut for AlignedBuf {
    #[inline]
    fn padded_mut(&mut self) -> &mut [f32] {
        self
    }
}

/// Allocates an aligned buffer for `size` elements (see [`AlignedBuf`]).
pub fn allocate(size: usize) -> Result<AlignedBuf> {
    AlignedBuf::zeroed(size)
}

/// Releases a buffer produced by [`allocate`]. Dropping it does the same.
pub fn free(buf: AlignedBuf) {
    drop(buf);
}

/// Copies the first `n` elements of `src` into `dst`.
pub fn copy(dst: &mut [f32], src: &[f32], n: usize) -> Result<()> {
    ensure_capacity("dst", n, dst.len())?;
    ensure_capacity("src", n, src.len())?;

    dst[..n].copy_from_slice(&src[..n]);
    Ok(())
}
