//! Row-major `f32` matrices whose rows are individually lane-aligned.
//!
//! All rows live in one [`AlignedBuf`]. The row stride is `cols` rounded up to
//! the lane width, so every row starts on an aligned address and owns a zeroed
//! gap `[cols, stride)` the kernels may run over. Row views deref to the
//! logical `cols` elements only.
//!
//! The gaps follow the same rules as the tail of an [`AlignedBuf`]: `div` into
//! a row fills its gap with NaN, and a later `dot` or `normalize` on that row
//! picks it up. [`RowMut::clear_padding`] resets one gap,
//! [`AlignedMatrix::clear_padding`] resets all of them.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::buffer::{sealed, AlignedBuf, SimdBuffer, SimdBufferMut};
use crate::error::{Result, VxError};
use crate::lanes::{alignment, lane_width};

/// A `rows × cols` matrix with lane-padded rows.
///
/// # Example
///
/// ```rust
/// let mut m = vx::allocate_2d(3, 5)?;
/// assert_eq!(m.stride() % vx::lane_width(), 0);
///
/// m.row_mut(1).copy_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
/// assert_eq!(vx::dot(5, &m.row(1), &m.row(1))?, 55.0);
/// assert!(m.row(0).iter().all(|&v| v == 0.0));
/// # Ok::<(), vx::VxError>(())
/// ```
pub struct AlignedMatrix {
    buf: AlignedBuf,
    rows: usize,
    cols: usize,
    stride: usize,
}

impl AlignedMatrix {
    /// Allocates a zeroed matrix for the active lane width.
    pub fn zeroed(rows: usize, cols: usize) -> Result<Self> {
        let align = alignment();
        let stride = cols
            .checked_next_multiple_of(lane_width())
            .ok_or(VxError::Layout { len: cols, align })?;
        let len = rows
            .checked_mul(stride)
            .ok_or(VxError::Layout { len: usize::MAX, align })?;

        let buf = AlignedBuf::with_lanes(len, lane_width(), align)?;
        trace!(rows, cols, stride, "allocated aligned matrix");

        Ok(Self {
            buf,
            rows,
            cols,
            stride,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Distance in elements between the starts of consecutive rows.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// True when the matrix holds no elements (and owns no allocation).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The whole block, `rows * stride` elements including row gaps.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.buf
    }

    /// Row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows`.
    #[inline]
    pub fn row(&self, i: usize) -> Row<'_> {
        match self.get_row(i) {
            Some(row) => row,
            None => panic!("row index {i} out of range for matrix with {} rows", self.rows),
        }
    }

    /// Row `i`, mutable.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows`.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> RowMut<'_> {
        let rows = self.rows;
        match self.get_row_mut(i) {
            Some(row) => row,
            None => panic!("row index {i} out of range for matrix with {rows} rows"),
        }
    }

    pub fn get_row(&self, i: usize) -> Option<Row<'_>> {
        if i >= self.rows {
            return None;
        }
        let start = i * self.stride;
        Some(Row {
            data: &self.buf[start..start + self.stride],
            cols: self.cols,
        })
    }

    pub fn get_row_mut(&mut self, i: usize) -> Option<RowMut<'_>> {
        if i >= self.rows {
            return None;
        }
        let start = i * self.stride;
        let stride = self.stride;
        Some(RowMut {
            data: &mut self.buf[start..start + stride],
            cols: self.cols,
        })
    }

    /// Zeroes the gap `[cols, stride)` of every row.
    pub fn clear_padding(&mut self) {
        for mut row in self.iter_rows_mut() {
            row.clear_padding();
        }
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    pub fn iter_rows_mut(&mut self) -> impl Iterator<Item = RowMut<'_>> + '_ {
        let (stride, cols) = (self.stride, self.cols);
        let mut rest: &mut [f32] = &mut self.buf;

        (0..self.rows).map(move |_| {
            let (data, tail) = std::mem::take(&mut rest).split_at_mut(stride);
            rest = tail;
            RowMut { data, cols }
        })
    }
}

impl fmt::Debug for AlignedMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedMatrix")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("stride", &self.stride)
            .finish()
    }
}

/// Allocates a `rows × cols` matrix (see [`AlignedMatrix`]).
pub fn allocate_2d(rows: usize, cols: usize) -> Result<AlignedMatrix> {
    AlignedMatrix::zeroed(rows, cols)
}

/// Releases a matrix produced by [`allocate_2d`]; a no-op for empty matrices.
pub fn free_2d(matrix: AlignedMatrix) {
    drop(matrix);
}

/// Shared view of one matrix row.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    data: &'a [f32],
    cols: usize,
}

/// Exclusive view of one matrix row.
pub struct RowMut<'a> {
    data: &'a mut [f32],
    cols: usize,
}

impl RowMut<'_> {
    /// Zeroes the gap between the last logical element and the next row.
    pub fn clear_padding(&mut self) {
        self.data[self.cols..].fill(0.0);
    }
}

impl Deref for Row<'_> {
    type Target = [f32];

    #[inline]
    fn deref(&self) -> &[f32] {
        &self.data[..self.cols]
    }
}

impl Deref for RowMut<'_> {
    type Target = [f32];

    #[inline]
    fn deref(&self) -> &[f32] {
        &self.data[..self.cols]
    }
}

impl DerefMut for RowMut<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [f32] {
        &mut self.data[..self.cols]
    }
}

impl fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Debug for RowMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl sealed::Sealed for Row<'_> {}
impl sealed::Sealed for RowMut<'_> {}

impl SimdBuffer for Row<'_> {
    #[inline]
    fn padded(&self) -> &[f32] {
        self.data
    }
}

impl SimdBuffer for RowMut<'_> {
    #[inline]
    fn padded(&self) -> &[f32] {
        self.data
    }
}

impl SimdBufferMut for RowMut<'_> {
    #[inline]
    fn padded_mut(&mut self) -> &mut [f32] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_and_alignment() {
        let lanes = lane_width();
        let m = allocate_2d(3, 5).unwrap();

        assert_eq!(m.stride(), 5usize.next_multiple_of(lanes));
        assert_eq!(m.as_slice().len(), 3 * m.stride());
        for row in m.iter_rows() {
            assert_eq!(row.len(), 5);
            assert_eq!(row.padded().len(), m.stride());
            assert_eq!(row.padded().as_ptr() as usize % alignment(), 0);
        }
    }

    #[test]
    fn test_rows_are_independent() {
        let mut m = allocate_2d(3, 5).unwrap();
        m.row_mut(0).fill(1.0);

        assert!(m.row(0).iter().all(|&v| v == 1.0));
        assert!(m.row(1).iter().all(|&v| v == 0.0));
        assert!(m.row(2).iter().all(|&v| v == 0.0));
        assert!(m.row(0).padded()[5..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_iter_rows_mut() {
        let mut m = allocate_2d(4, 3).unwrap();
        for (i, mut row) in m.iter_rows_mut().enumerate() {
            row.fill(i as f32);
        }
        for i in 0..4 {
            assert!(m.row(i).iter().all(|&v| v == i as f32));
        }
    }

    #[test]
    fn test_clear_padding() {
        let mut m = allocate_2d(2, 3).unwrap();
        for mut row in m.iter_rows_mut() {
            row.padded_mut().fill(9.0);
        }

        m.row_mut(0).clear_padding();
        assert!(m.row(0).padded()[3..].iter().all(|&v| v == 0.0));
        assert!(m.row(1).padded()[3..].iter().all(|&v| v == 9.0));

        m.clear_padding();
        for row in m.iter_rows() {
            assert!(row.iter().all(|&v| v == 9.0));
            assert!(row.padded()[3..].iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_empty_matrices() {
        let m = allocate_2d(0, 7).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.iter_rows().count(), 0);
        free_2d(m);

        let mut m = allocate_2d(3, 0).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.stride(), 0);
        assert_eq!(m.iter_rows_mut().count(), 3);
        assert!(m.row(2).is_empty());
        free_2d(m);
    }

    #[test]
    fn test_row_out_of_range() {
        let m = allocate_2d(2, 2).unwrap();
        assert!(m.get_row(2).is_none());
        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| m.row(2).len()));
        assert!(caught.is_err());
    }

    #[test]
    fn test_overflowing_shape_is_layout_error() {
        assert!(matches!(
            allocate_2d(usize::MAX, 8),
            Err(VxError::Layout { .. })
        ));
    }
}
