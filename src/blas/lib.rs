/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Thin adapter from a scalar type to its CBLAS `?gemm`.
//!
//! Without the `blas-support` feature this crate only knows the precision
//! tags; the matrix crate then never asks it to multiply anything.

#[cfg(feature = "blas-support")]
extern crate cblas;
#[cfg(feature = "blas-support")]
extern crate openblas_src;
#[cfg(feature = "blas-support")]
#[macro_use]
extern crate log;

use ::std::fmt;

/// Floating point precision of a BLAS routine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Precision { Single, Double }

impl Precision {
    /// The letter BLAS uses to prefix routines of this precision.
    pub fn prefix(self) -> char {
        match self {
            Precision::Single => 's',
            Precision::Double => 'd',
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}gemm", self.prefix())
    }
}

/// Is an accelerated gemm linked into this build?
pub fn is_available() -> bool { cfg!(feature = "blas-support") }

/// Dimensions of `C (m x n) = A (m x k) * B (k x n)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GemmDims {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

/// Scalars that BLAS has a general matrix multiply for.
///
/// This trait is sealed; it covers `f32` and `f64` only.
pub trait BlasScalar: Copy + private::Sealed {
    const PRECISION: Precision;

    /// `c = alpha * a * b + beta * c` for dense row-major data with no
    /// transposition.  The leading dimensions are the column counts.
    ///
    /// # Panics
    ///
    /// Panics if a slice length disagrees with `dims`, or if a dimension
    /// does not fit in the 32-bit integers CBLAS takes.
    #[cfg(feature = "blas-support")]
    fn gemm_row_major(
        dims: GemmDims,
        alpha: Self,
        a: &[Self],
        b: &[Self],
        beta: Self,
        c: &mut [Self],
    );
}

mod private {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

#[cfg(feature = "blas-support")]
fn checked_dims(GemmDims { m, n, k }: GemmDims, lens: (usize, usize, usize)) -> (i32, i32, i32) {
    assert_eq!(lens.0, m * k, "lhs has wrong length for gemm");
    assert_eq!(lens.1, k * n, "rhs has wrong length for gemm");
    assert_eq!(lens.2, m * n, "output has wrong length for gemm");

    let int = |x: usize| -> i32 {
        assert!(x <= i32::max_value() as usize, "dimension {} too large for CBLAS", x);
        x as i32
    };
    (int(m), int(n), int(k))
}

macro_rules! impl_blas_scalar {
    ($T:ty, $Precision:ident, $gemm:ident) => {
        impl BlasScalar for $T {
            const PRECISION: Precision = Precision::$Precision;

            #[cfg(feature = "blas-support")]
            fn gemm_row_major(
                dims: GemmDims,
                alpha: $T,
                a: &[$T],
                b: &[$T],
                beta: $T,
                c: &mut [$T],
            ) {
                let (m, n, k) = checked_dims(dims, (a.len(), b.len(), c.len()));
                // CBLAS rejects a zero output dimension outright
                if m == 0 || n == 0 {
                    return;
                }
                // and wants leading dimensions of at least 1 even when k == 0
                let lda = i32::max(k, 1);
                let ldb = i32::max(n, 1);
                let ldc = i32::max(n, 1);

                trace!("{}: {}x{} += {}x{} * {}x{}", Self::PRECISION, m, n, m, k, k, n);
                unsafe {
                    ::cblas::$gemm(
                        ::cblas::Layout::RowMajor,
                        ::cblas::Transpose::None,
                        ::cblas::Transpose::None,
                        m, n, k,
                        alpha,
                        a, lda,
                        b, ldb,
                        beta,
                        c, ldc,
                    );
                }
            }
        }
    };
}

impl_blas_scalar!(f32, Single, sgemm);
impl_blas_scalar!(f64, Double, dgemm);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_tags() {
        assert_eq!(<f32 as BlasScalar>::PRECISION, Precision::Single);
        assert_eq!(<f64 as BlasScalar>::PRECISION, Precision::Double);
        assert_eq!(Precision::Double.to_string(), "dgemm");
        assert_eq!(is_available(), cfg!(feature = "blas-support"));
    }

    #[cfg(feature = "blas-support")]
    #[test]
    fn small_product() {
        use ::densemat_assert_close::assert_close;

        // [1 2 3]   [1 0]   [ 4  5]
        // [4 5 6] * [0 1] = [10 11]
        //           [1 1]
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let mut c = [100.0; 4];
        f64::gemm_row_major(GemmDims { m: 2, n: 2, k: 3 }, 1.0, &a, &b, 0.0, &mut c);
        assert_close!(&c[..], &[4.0, 5.0, 10.0, 11.0][..]);

        let mut c = [1.0f32; 4];
        let a: Vec<f32> = a.iter().map(|&x| x as f32).collect();
        let b: Vec<f32> = b.iter().map(|&x| x as f32).collect();
        f32::gemm_row_major(GemmDims { m: 2, n: 2, k: 3 }, 2.0, &a, &b, 1.0, &mut c);
        assert_close!(&c[..], &[9.0f32, 11.0, 21.0, 23.0][..]);
    }

    #[cfg(feature = "blas-support")]
    #[test]
    fn empty_inner_dimension_scales_output() {
        let mut c = [3.0, 4.0];
        f64::gemm_row_major(GemmDims { m: 1, n: 2, k: 0 }, 1.0, &[], &[], 2.0, &mut c);
        assert_eq!(c, [6.0, 8.0]);
    }
}
