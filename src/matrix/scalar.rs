/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

// Traits exposed in public interfaces,
// implemented on a finite set of types rather than more general
//  generic bounds in order to reduce coupling with client crates.

use crate::Matrix;

use ::densemat_aligned::Zeroable;
use ::densemat_blas::Precision;
use ::densemat_slice_math::{FloatMath, VectorMath};

/// Element types a [`Matrix`] can hold.
///
/// You get `f32`, `f64`, `u32` and `u64`.  Every matrix operation is
/// written once against this trait; the per-type parts are the kernels
/// of [`VectorMath`] and the choice of multiply backend.
///
/// This trait is sealed to avoid accidental commitments.
pub trait Scalar
    : VectorMath
    + Zeroable
    + num_traits::Zero
    + num_traits::One
    + private::Sealed
{
    /// Which BLAS gemm this scalar maps to, if any.
    const BLAS_PRECISION: Option<Precision>;

    /// Multiply through BLAS if this build and this scalar support it.
    ///
    /// Returns `false` without touching anything otherwise.  Shapes have
    /// already been validated.
    #[doc(hidden)]
    fn try_blas_gemm(
        alpha: Self,
        a: &Matrix<Self>,
        b: &Matrix<Self>,
        beta: Self,
        c: &mut Matrix<Self>,
    ) -> bool;
}

/// Scalars with transcendental functions.
pub trait FloatScalar: Scalar + FloatMath + private::Sealed {}

mod private {
    pub trait Sealed {}
}

macro_rules! impl_float_scalar {
    ($($T:ty),*) => {$(
        impl private::Sealed for $T {}
        impl FloatScalar for $T {}

        impl Scalar for $T {
            const BLAS_PRECISION: Option<Precision> = Some(<$T as ::densemat_blas::BlasScalar>::PRECISION);

            #[cfg(feature = "blas-support")]
            fn try_blas_gemm(alpha: $T, a: &Matrix<$T>, b: &Matrix<$T>, beta: $T, c: &mut Matrix<$T>) -> bool {
                use crate::gemm::{Blas, Gemm};
                Blas.multiply_into(alpha, a, b, beta, c);
                true
            }

            #[cfg(not(feature = "blas-support"))]
            fn try_blas_gemm(_: $T, _: &Matrix<$T>, _: &Matrix<$T>, _: $T, _: &mut Matrix<$T>) -> bool {
                false
            }
        }
    )*};
}

macro_rules! impl_integer_scalar {
    ($($T:ty),*) => {$(
        impl private::Sealed for $T {}

        impl Scalar for $T {
            const BLAS_PRECISION: Option<Precision> = None;

            fn try_blas_gemm(_: $T, _: &Matrix<$T>, _: &Matrix<$T>, _: $T, _: &mut Matrix<$T>) -> bool {
                false
            }
        }
    )*};
}

impl_float_scalar!(f32, f64);
impl_integer_scalar!(u32, u64);
