/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::{MatrixError, Scalar};

use ::densemat_aligned::{AlignedBuf, DEFAULT_ALIGNMENT};
use ::densemat_slice_math::VectorMath;
use ::std::fmt;
use ::std::ops::{Index, IndexMut};

/// Owned matrix type with C layout.
///
/// Element `(i, j)` lives at flat offset `i * num_cols() + j` of
/// [`row_major_data`](Matrix::row_major_data).  The storage is aligned to
/// [`DEFAULT_ALIGNMENT`] unless constructed with
/// [`new_aligned`](Matrix::new_aligned).
///
/// The allocation only ever grows.  After a shrinking
/// [`resize`](Matrix::resize) the capacity exceeds the logical size, and
/// regrowing within that capacity does not reallocate.
// please resist the urge to go n-dimensional
pub struct Matrix<T: Scalar> {
    // every element of the capacity is initialized; the elements past
    // `height * width` are whatever the last larger shape left there
    buf: AlignedBuf<T>,
    // invariant: height * width <= buf.capacity()
    height: usize,
    width: usize,
}

fn checked_size(height: usize, width: usize) -> Result<usize, MatrixError> {
    height.checked_mul(width)
        .ok_or(MatrixError::SizeOverflow { rows: height, cols: width })
}

/// Construction.
///
/// Fresh storage is always zeroed, so [`new`](Matrix::new) and
/// [`new_zeros`](Matrix::new_zeros) produce the same matrix; the latter
/// exists to say so at the call site.
impl<T: Scalar> Matrix<T> {
    /// An `m x n` matrix with default alignment.
    pub fn new(m: usize, n: usize) -> Result<Self, MatrixError> {
        Self::new_aligned(m, n, DEFAULT_ALIGNMENT)
    }

    /// An `m x n` matrix whose storage is aligned to at least `align` bytes.
    pub fn new_aligned(m: usize, n: usize, align: usize) -> Result<Self, MatrixError> {
        let size = checked_size(m, n)?;
        let buf = AlignedBuf::zeroed_aligned(size, align)?;
        Ok(Matrix { buf, height: m, width: n })
    }

    pub fn new_zeros(m: usize, n: usize) -> Result<Self, MatrixError> {
        Self::new(m, n)
    }

    pub fn new_ones(m: usize, n: usize) -> Result<Self, MatrixError> {
        Self::new_value(m, n, T::one())
    }

    pub fn new_value(m: usize, n: usize, value: T) -> Result<Self, MatrixError> {
        let mut matrix = Self::new(m, n)?;
        matrix.fill(value);
        Ok(matrix)
    }

    /// An `m x n` matrix holding the first `m * n` elements of `values`.
    ///
    /// # Panics
    ///
    /// Panics if `values` is shorter than `m * n`.
    pub fn new_values(m: usize, n: usize, values: &[T]) -> Result<Self, MatrixError> {
        let mut matrix = Self::new(m, n)?;
        matrix.init_values(values);
        Ok(matrix)
    }

    /// A copy with its own storage (same shape, same alignment).
    pub fn new_copy(&self) -> Result<Self, MatrixError> {
        let mut matrix = Self::new_aligned(self.height, self.width, self.buf.alignment())?;
        matrix.row_major_data_mut().copy_from_slice(self.row_major_data());
        Ok(matrix)
    }
}

/// Shape and storage.
impl<T: Scalar> Matrix<T> {
    pub fn dims(&self) -> (usize, usize) { (self.height, self.width) }
    pub fn num_rows(&self) -> usize { self.height }
    pub fn num_cols(&self) -> usize { self.width }
    pub fn is_square(&self) -> bool { self.height == self.width }
    /// Logical number of elements, `num_rows() * num_cols()`.
    pub fn size(&self) -> usize { self.height * self.width }
    pub fn is_empty(&self) -> bool { self.size() == 0 }
    /// Number of elements the storage can hold without reallocating.
    pub fn capacity(&self) -> usize { self.buf.capacity() }
    pub fn alignment(&self) -> usize { self.buf.alignment() }
    /// Row stride of the flat data, which is always the column count.
    pub fn stride(&self) -> usize { self.width }

    pub fn row_major_data(&self) -> &[T] {
        let size = self.size();
        &self.buf[..size]
    }

    pub fn row_major_data_mut(&mut self) -> &mut [T] {
        let size = self.size();
        &mut self.buf[..size]
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        (0..self.height).map(move |r| self.get_row(r))
    }

    /// Change the logical shape to `m x n`.
    ///
    /// Storage is reallocated only when `m * n` exceeds the capacity.
    /// Either way, the flat data keeps its values at every offset below the
    /// old size, so growing the row count (with the column count fixed)
    /// keeps every element at its old `(i, j)`.  Offsets never written
    /// before read as zero.
    ///
    /// On error the matrix keeps its old shape and storage.
    pub fn resize(&mut self, m: usize, n: usize) -> Result<(), MatrixError> {
        let size = checked_size(m, n)?;
        if size > self.buf.capacity() {
            trace!("reallocating {}x{} matrix for {}x{}", self.height, self.width, m, n);
            self.buf.grow(size)?;
        } else if size > self.size() {
            debug!("reusing capacity {} for {}x{} matrix", self.buf.capacity(), m, n);
        }
        self.height = m;
        self.width = n;
        Ok(())
    }

    /// [`resize`](Matrix::resize), and zero any rows added past the old row count.
    ///
    /// Only row growth is zeroed.  When the column count changes, the
    /// retained rows are reinterpreted from the flat data as usual and are
    /// not cleared.
    pub fn resize_fill_zeros(&mut self, m: usize, n: usize) -> Result<(), MatrixError> {
        let old_height = self.height;
        self.resize(m, n)?;
        if m > old_height {
            let start = old_height * self.width;
            <T as VectorMath>::set(&mut self.row_major_data_mut()[start..], T::zero());
        }
        Ok(())
    }

    /// Set every element to zero.  The shape and capacity are unchanged.
    pub fn zero(&mut self) {
        self.fill(T::zero());
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        <T as VectorMath>::set(self.row_major_data_mut(), value);
    }

    /// Overwrite the matrix with the first `num_rows() * num_cols()` elements of `values`.
    ///
    /// # Panics
    ///
    /// Panics if `values` is too short.
    pub fn init_values(&mut self, values: &[T]) {
        let size = self.size();
        self.row_major_data_mut().copy_from_slice(&values[..size]);
    }

    /// Copy this matrix into `other`, which must have the same shape.
    pub fn copy(&self, other: &mut Matrix<T>) -> Result<(), MatrixError> {
        self.check_same_dims("copy", other)?;
        other.row_major_data_mut().copy_from_slice(self.row_major_data());
        Ok(())
    }

    pub(crate) fn check_same_dims(&self, op: &'static str, other: &Matrix<T>) -> Result<(), MatrixError> {
        if self.dims() != other.dims() {
            return Err(MatrixError::ShapeMismatch { op, left: self.dims(), right: other.dims() });
        }
        Ok(())
    }
}

/// Element and row access.
///
/// The default accessors compute `i * num_cols() + j` and nothing else:
/// a column index past the end silently addresses the next row.  The
/// flat offset is still checked against the logical size, so a bad index
/// panics instead of reading someone else's memory.  Use the `try_`
/// methods for a per-dimension check, or the `unsafe` ones to skip even
/// the flat check.
impl<T: Scalar> Matrix<T> {
    #[inline(always)]
    fn offset(&self, row: usize, col: usize) -> usize { row * self.width + col }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.row_major_data()[self.offset(row, col)]
    }

    #[inline]
    pub fn set_at_index(&mut self, row: usize, col: usize, value: T) {
        let k = self.offset(row, col);
        self.row_major_data_mut()[k] = value;
    }

    /// # Safety
    ///
    /// `row * num_cols() + col` must be less than `size()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        *self.buf.get_unchecked(self.offset(row, col))
    }

    /// # Safety
    ///
    /// `row * num_cols() + col` must be less than `size()`.
    #[inline]
    pub unsafe fn set_unchecked(&mut self, row: usize, col: usize, value: T) {
        let k = self.offset(row, col);
        *self.buf.get_unchecked_mut(k) = value;
    }

    pub fn try_get(&self, row: usize, col: usize) -> Result<T, MatrixError> {
        self.check_index(row, col)?;
        Ok(self.get(row, col))
    }

    pub fn try_set(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        self.check_index(row, col)?;
        self.set_at_index(row, col, value);
        Ok(())
    }

    fn check_index(&self, row: usize, col: usize) -> Result<(), MatrixError> {
        if row >= self.height || col >= self.width {
            return Err(MatrixError::OutOfBounds { index: (row, col), dims: self.dims() });
        }
        Ok(())
    }

    #[inline]
    pub fn add_at_index(&mut self, row: usize, col: usize, value: T) {
        self.modify_at(row, col, |x| x.plus(value));
    }

    #[inline]
    pub fn sub_at_index(&mut self, row: usize, col: usize, value: T) {
        self.modify_at(row, col, |x| x.minus(value));
    }

    #[inline]
    pub fn mul_at_index(&mut self, row: usize, col: usize, value: T) {
        self.modify_at(row, col, |x| x.times(value));
    }

    #[inline]
    pub fn div_at_index(&mut self, row: usize, col: usize, value: T) {
        self.modify_at(row, col, |x| x.over(value));
    }

    #[inline(always)]
    fn modify_at(&mut self, row: usize, col: usize, f: impl FnOnce(T) -> T) {
        let k = self.offset(row, col);
        let x = &mut self.row_major_data_mut()[k];
        *x = f(*x);
    }

    pub fn get_row(&self, row: usize) -> &[T] {
        let start = self.offset(row, 0);
        &self.row_major_data()[start..start + self.width]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let start = self.offset(row, 0);
        let end = start + self.width;
        &mut self.row_major_data_mut()[start..end]
    }

    /// Overwrite row `row` with the first `num_cols()` elements of `values`.
    pub fn set_row(&mut self, row: usize, values: &[T]) {
        let width = self.width;
        self.row_mut(row).copy_from_slice(&values[..width]);
    }
}

impl<T: Scalar> Clone for Matrix<T> {
    /// # Panics
    ///
    /// Panics if the copy cannot be allocated.  Use [`Matrix::new_copy`]
    /// to handle that instead.
    fn clone(&self) -> Self {
        self.new_copy().unwrap_or_else(|e| panic!("could not clone matrix: {}", e))
    }
}

impl<T: Scalar> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.dims() == other.dims() && self.row_major_data() == other.row_major_data()
    }
}

impl<T: Scalar> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline(always)] // inlining should often remove bounds checks
    fn index(&self, (r, c): (usize, usize)) -> &T
    { &self.row_major_data()[self.offset(r, c)] }
}

impl<T: Scalar> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline(always)]
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut T {
        let k = self.offset(r, c);
        &mut self.row_major_data_mut()[k]
    }
}

impl<T: Scalar> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("dims", &self.dims())
            .field("rows", &self.rows().collect::<Vec<_>>())
            .finish()
    }
}
