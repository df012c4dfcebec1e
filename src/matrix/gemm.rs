/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Matrix-matrix and matrix-vector products.
//!
//! Every product here is a case of `C = alpha * A * B + beta * C`.  How it
//! gets computed is up to a [`Gemm`] strategy:
//!
//! * [`Portable`] works for every scalar.  Each output row is an
//!   independent work item, and within a row the loop runs over `k` on the
//!   outside and `j` on the inside, so the innermost loop is a contiguous
//!   scaled add of one row of `B` into one row of `C`.
//! * [`Blas`] hands `f32` and `f64` to `?gemm` when the crate is built
//!   with `blas-support`.
//! * [`Backend`] picks between them at runtime, and is what the plain
//!   methods like [`Matrix::dot_matrix`] use (as `Backend::Auto`).
//!
//! All strategies agree on the meaning of `beta`: with `beta = 0` the
//! prior contents of `C` are ignored entirely, even if they are NaN.

use crate::{par, Matrix, MatrixError, Scalar};

use ::densemat_slice_math::VectorMath;
#[cfg(feature = "serde-support")]
use ::serde::{Deserialize, Serialize};

/// A way to compute `c = alpha * a * b + beta * c`.
pub trait Gemm<T: Scalar> {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Compute `c = alpha * a * b + beta * c`.
    ///
    /// Callers must have already checked that `a` is `m x k`, `b` is
    /// `k x n`, and `c` is `m x n`.  Use [`gemm_with`] to get that check.
    fn multiply_into(&self, alpha: T, a: &Matrix<T>, b: &Matrix<T>, beta: T, c: &mut Matrix<T>);
}

/// Row-parallel triple loop in (i, k, j) order.  Works for every scalar.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Portable;

impl<T: Scalar> Gemm<T> for Portable {
    fn name(&self) -> &'static str { "portable" }

    fn multiply_into(&self, alpha: T, a: &Matrix<T>, b: &Matrix<T>, beta: T, c: &mut Matrix<T>) {
        let width = b.num_cols();
        let b_data = b.row_major_data();

        par::for_each_row(c.row_major_data_mut(), width, |i, c_row| {
            if beta == T::zero() {
                <T as VectorMath>::set(c_row, T::zero());
            } else if beta != T::one() {
                <T as VectorMath>::mul(c_row, beta);
            }

            for (k, &a_ik) in a.get_row(i).iter().enumerate() {
                let b_row = &b_data[k * width..(k + 1) * width];
                <T as VectorMath>::add_vector_scaled(c_row, b_row, alpha.times(a_ik));
            }
        });
    }
}

/// `?gemm` from the linked BLAS.
///
/// This only implements [`Gemm`] for `f32` and `f64`, and only in builds
/// with `blas-support`.  [`Backend::Blas`] is the runtime-checked
/// alternative.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Blas;

#[cfg(feature = "blas-support")]
impl<T: Scalar + ::densemat_blas::BlasScalar> Gemm<T> for Blas {
    fn name(&self) -> &'static str { "blas" }

    fn multiply_into(&self, alpha: T, a: &Matrix<T>, b: &Matrix<T>, beta: T, c: &mut Matrix<T>) {
        let dims = ::densemat_blas::GemmDims {
            m: a.num_rows(),
            n: b.num_cols(),
            k: a.num_cols(),
        };
        T::gemm_row_major(dims, alpha, a.row_major_data(), b.row_major_data(), beta, c.row_major_data_mut());
    }
}

/// Runtime choice of strategy, usable with every scalar.
///
/// `Blas` quietly means `Portable` for scalars (or builds) that have no
/// BLAS routine; check [`Backend::is_accelerated`] if that matters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(rename_all = "kebab-case"))]
pub enum Backend {
    /// BLAS where available, else portable.
    Auto,
    Portable,
    Blas,
}

impl Default for Backend {
    fn default() -> Self { Backend::Auto }
}

impl Backend {
    pub const ALL: &'static [Backend] = &[Backend::Auto, Backend::Portable, Backend::Blas];

    /// Will products of `T` under this backend actually go through BLAS?
    pub fn is_accelerated<T: Scalar>(self) -> bool {
        match self {
            Backend::Portable => false,
            Backend::Auto | Backend::Blas => {
                T::BLAS_PRECISION.is_some() && ::densemat_blas::is_available()
            },
        }
    }
}

impl<T: Scalar> Gemm<T> for Backend {
    fn name(&self) -> &'static str {
        match (self, self.is_accelerated::<T>()) {
            (_, true) => "blas",
            (Backend::Auto, false) => "portable",
            (Backend::Portable, false) => "portable",
            (Backend::Blas, false) => "portable (blas unavailable)",
        }
    }

    fn multiply_into(&self, alpha: T, a: &Matrix<T>, b: &Matrix<T>, beta: T, c: &mut Matrix<T>) {
        if *self != Backend::Portable && T::try_blas_gemm(alpha, a, b, beta, c) {
            return;
        }
        Portable.multiply_into(alpha, a, b, beta, c)
    }
}

fn check_product_dims<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>, c: &Matrix<T>) -> Result<(), MatrixError> {
    let (m, k) = a.dims();
    let (k2, n) = b.dims();
    if k != k2 || c.dims() != (m, n) {
        return Err(MatrixError::ProductShape { lhs: a.dims(), rhs: b.dims(), out: c.dims() });
    }
    Ok(())
}

/// `c = alpha * a * b + beta * c` using the default backend.
///
/// Fails without touching `c` unless `a` is `m x k`, `b` is `k x n` and
/// `c` is `m x n`.
pub fn gemm<T: Scalar>(
    alpha: T,
    a: &Matrix<T>,
    b: &Matrix<T>,
    beta: T,
    c: &mut Matrix<T>,
) -> Result<(), MatrixError> {
    gemm_with(&Backend::Auto, alpha, a, b, beta, c)
}

/// [`gemm`] with an explicit strategy.
pub fn gemm_with<T: Scalar, G: Gemm<T> + ?Sized>(
    strategy: &G,
    alpha: T,
    a: &Matrix<T>,
    b: &Matrix<T>,
    beta: T,
    c: &mut Matrix<T>,
) -> Result<(), MatrixError> {
    check_product_dims(a, b, c)?;
    trace!(
        "gemm ({}): {:?} x {:?} -> {:?}",
        strategy.name(), a.dims(), b.dims(), c.dims(),
    );
    strategy.multiply_into(alpha, a, b, beta, c);
    Ok(())
}

impl<T: Scalar> Matrix<T> {
    /// `result += self * vec`.
    ///
    /// This accumulates; zero `result` first for a plain product.
    ///
    /// # Panics
    ///
    /// Panics unless `vec` has `num_cols()` elements and `result` has
    /// `num_rows()` elements.
    pub fn dot_vector(&self, vec: &[T], result: &mut [T]) {
        assert_eq!(vec.len(), self.num_cols(), "dot_vector: vector length does not match column count");
        assert_eq!(result.len(), self.num_rows(), "dot_vector: result length does not match row count");

        par::for_each_element(result, |i, out| {
            *out = out.plus(<T as VectorMath>::dot(self.get_row(i), vec));
        });
    }

    /// `result = self * other`.  Prior contents of `result` are ignored.
    pub fn dot_matrix(&self, other: &Matrix<T>, result: &mut Matrix<T>) -> Result<(), MatrixError> {
        gemm(T::one(), self, other, T::zero(), result)
    }

    /// `result += self * other`.
    pub fn dot_matrix_accumulate(&self, other: &Matrix<T>, result: &mut Matrix<T>) -> Result<(), MatrixError> {
        gemm(T::one(), self, other, T::one(), result)
    }

    /// [`dot_matrix`](Matrix::dot_matrix) with an explicit strategy.
    pub fn dot_matrix_with<G: Gemm<T> + ?Sized>(
        &self,
        strategy: &G,
        other: &Matrix<T>,
        result: &mut Matrix<T>,
    ) -> Result<(), MatrixError> {
        gemm_with(strategy, T::one(), self, other, T::zero(), result)
    }
}

impl<'a, T: Scalar> ::std::ops::Mul<&'a Matrix<T>> for &'a Matrix<T> {
    type Output = Matrix<T>;

    /// # Panics
    ///
    /// Panics if the inner dimensions differ, or on allocation failure.
    fn mul(self, rhs: &'a Matrix<T>) -> Matrix<T> {
        let mut out = Matrix::new(self.num_rows(), rhs.num_cols())
            .unwrap_or_else(|e| panic!("{}", e));
        self.dot_matrix(rhs, &mut out).unwrap_or_else(|e| panic!("{}", e));
        out
    }
}
