/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Math kernels for variable length contiguous vectors.
//!
//! Everything here works in place on a `&mut [T]`, optionally reading a
//! second slice of the same length.  The kernels are plain loops over the
//! slices; with the bounds lifted out by the length assertion, LLVM
//! vectorizes them without any help.
//!
//! Unsigned integer arithmetic wraps on overflow.

use ::std::fmt;

pub use self::arith::Arith;

mod arith {
    /// Scalar arithmetic used to implement the kernels.
    ///
    /// Floats use the ordinary operators; unsigned integers use the
    /// wrapping ones.  This trait is sealed; you get `f32`, `f64`,
    /// `u32` and `u64`.
    pub trait Arith: Copy + Sealed {
        const ZERO: Self;
        const ONE: Self;

        fn plus(self, b: Self) -> Self;
        fn minus(self, b: Self) -> Self;
        fn times(self, b: Self) -> Self;
        fn over(self, b: Self) -> Self;
    }

    pub trait Sealed {}
}
use self::arith::Sealed;

macro_rules! impl_float_arith {
    ($($T:ty),*) => {$(
        impl Sealed for $T {}
        impl Arith for $T {
            const ZERO: $T = 0.0;
            const ONE: $T = 1.0;

            #[inline(always)] fn plus(self, b: $T) -> $T { self + b }
            #[inline(always)] fn minus(self, b: $T) -> $T { self - b }
            #[inline(always)] fn times(self, b: $T) -> $T { self * b }
            #[inline(always)] fn over(self, b: $T) -> $T { self / b }
        }
    )*};
}

macro_rules! impl_wrapping_arith {
    ($($T:ty),*) => {$(
        impl Sealed for $T {}
        impl Arith for $T {
            const ZERO: $T = 0;
            const ONE: $T = 1;

            #[inline(always)] fn plus(self, b: $T) -> $T { self.wrapping_add(b) }
            #[inline(always)] fn minus(self, b: $T) -> $T { self.wrapping_sub(b) }
            #[inline(always)] fn times(self, b: $T) -> $T { self.wrapping_mul(b) }
            // panics on division by zero, like the operator
            #[inline(always)] fn over(self, b: $T) -> $T { self.wrapping_div(b) }
        }
    )*};
}

impl_float_arith!(f32, f64);
impl_wrapping_arith!(u32, u64);

// Generates the scalar, vector, and scaled-vector kernels for one operator.
macro_rules! kernels {
    ($(
        $op:ident, $op_vector:ident, $op_vector_scaled:ident => $method:ident;
    )+) => {$(
        /// `xs[k] = xs[k] OP value` for every `k`.
        #[inline]
        fn $op(xs: &mut [Self], value: Self) {
            for x in xs {
                *x = x.$method(value);
            }
        }

        /// `xs[k] = xs[k] OP ys[k]`.
        ///
        /// # Panics
        /// Panics if the lengths differ.
        #[inline]
        fn $op_vector(xs: &mut [Self], ys: &[Self]) {
            assert_eq!(xs.len(), ys.len());
            for (x, &y) in xs.iter_mut().zip(ys) {
                *x = x.$method(y);
            }
        }

        /// `xs[k] = xs[k] OP (ys[k] * scale)`, in a single pass.
        ///
        /// # Panics
        /// Panics if the lengths differ.
        #[inline]
        fn $op_vector_scaled(xs: &mut [Self], ys: &[Self], scale: Self) {
            assert_eq!(xs.len(), ys.len());
            for (x, &y) in xs.iter_mut().zip(ys) {
                *x = x.$method(y.times(scale));
            }
        }
    )+};
}

/// Elementwise kernels over a flat run of `N` elements.
///
/// All methods have default definitions in terms of [`Arith`], so an
/// implementation for a new scalar is a one-liner.
pub trait VectorMath: Arith + Send + Sync + PartialEq + fmt::Debug + 'static {
    /// Overwrite every element with `value`.
    #[inline]
    fn set(xs: &mut [Self], value: Self) {
        for x in xs {
            *x = value;
        }
    }

    kernels! {
        add, add_vector, add_vector_scaled => plus;
        sub, sub_vector, sub_vector_scaled => minus;
        mul, mul_vector, mul_vector_scaled => times;
        div, div_vector, div_vector_scaled => over;
    }

    /// Inner product of two equal-length slices.
    #[inline]
    fn dot(xs: &[Self], ys: &[Self]) -> Self {
        assert_eq!(xs.len(), ys.len());
        xs.iter().zip(ys).fold(Self::ZERO, |acc, (&x, &y)| acc.plus(x.times(y)))
    }
}

impl VectorMath for f32 {}
impl VectorMath for f64 {}
impl VectorMath for u32 {}
impl VectorMath for u64 {}

/// Transcendental kernels, only for floating point scalars.
///
/// Domain errors are not reported; `log` of a negative number is NaN
/// and `log(0)` is negative infinity, as IEEE 754 says.
pub trait FloatMath: VectorMath {
    fn log(xs: &mut [Self]);
    fn exp(xs: &mut [Self]);
}

macro_rules! impl_float_math {
    ($($T:ty),*) => {$(
        impl FloatMath for $T {
            #[inline]
            fn log(xs: &mut [$T]) {
                for x in xs { *x = x.ln(); }
            }

            #[inline]
            fn exp(xs: &mut [$T]) {
                for x in xs { *x = x.exp(); }
            }
        }
    )*};
}

impl_float_math!(f32, f64);

//---------------------------
