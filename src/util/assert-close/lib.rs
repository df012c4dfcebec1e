/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! `assert_close!`, for comparing computed scalars and slices of them.
//!
//! Floats are compared with a relative and absolute tolerance (both default
//! to sensible values).  Unsigned integers are compared exactly, so the
//! same test body can be instantiated for every scalar type.

extern crate thiserror;

use ::std::fmt;
use ::thiserror::Error;

pub const DEFAULT_NONZERO_TOL: f64 = 1e-9;

/// `assert_close!([rel=TOL,] [abs=TOL,] left, right [, fmt...])`
#[macro_export]
macro_rules! assert_close {
    ($($t:tt)*) => {
        $crate::assert_close_impl!{@parsing [$($t)*] [[@rel $crate::DEFAULT_NONZERO_TOL] [@abs 0.0]]}
    };
}

#[macro_export]
macro_rules! debug_assert_close {
    ($($t:tt)*) => {{
        #[cfg(debug_assertions)] {
            $crate::assert_close!{$($t)*}
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! assert_close_impl {
    (@parsing [rel=$tol:expr, $($rest:tt)*] [$($assignment:tt)*]) => {
        $crate::assert_close_impl!(@parsing [$($rest)*] [$($assignment)* [@rel $tol]]);
    };
    (@parsing [abs=$tol:expr, $($rest:tt)*] [$($assignment:tt)*]) => {
        $crate::assert_close_impl!(@parsing [$($rest)*] [$($assignment)* [@abs $tol]]);
    };
    (@parsing [$a:expr, $b:expr $(,)*] $assignments:tt) => {
        $crate::assert_close_impl!(@expand $assignments [@comp $a, $b] [@fmt "not nearly equal!"])
    };
    (@parsing [$a:expr, $b:expr, $($fmt:tt)+] $assignments:tt) => {
        $crate::assert_close_impl!(@expand $assignments [@comp $a, $b] [@fmt $($fmt)+])
    };
    (@expand [$($assignment:tt)*] [@comp $a:expr, $b:expr] [@fmt $($fmt:tt)+]) => {
        #[allow(unused_mut)]
        #[allow(unused_assignments)]
        {
            // match keeps temporaries in the arguments alive, as in assert_eq!
            match (&$a, &$b) {
                (a, b) => {
                    let mut abs: f64;
                    let mut rel: f64;
                    $(
                        $crate::assert_close_impl!{@assign [abs, rel] $assignment}
                    )*

                    let tol = $crate::Tolerances { abs, rel };
                    if let Err(e) = $crate::CheckClose::check_close(a, b, tol) {
                        panic!("{} ({})\n{}", format!($($fmt)+), tol, e);
                    }
                }
            }
        }
    };
    (@assign [$abs:ident, $rel:ident] [@abs $tol:expr]) => { $abs = $tol; };
    (@assign [$abs:ident, $rel:ident] [@rel $tol:expr]) => { $rel = $tol; };
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl fmt::Display for Tolerances {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "tolerances: rel={}, abs={}", self.rel, self.abs)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckCloseError {
    #[error("  left: {left}\n right: {right}\n    at: index {index}")]
    Value { index: usize, left: String, right: String },
    #[error("length mismatch: {0} vs {1}")]
    Length(usize, usize),
}

/// Python 3.5's `math.isclose`.
#[doc(hidden)]
#[inline]
pub fn __is_close(a: f64, b: f64, Tolerances { abs, rel }: Tolerances) -> bool {
    assert!(rel >= 0.0);
    assert!(abs >= 0.0);

    // catch infinities of same sign
    if a == b { return true; }

    // catch infinities of opposite sign, avoiding infinite relative tolerance
    if a.is_infinite() || b.is_infinite() { return false; }

    (a - b).abs() < abs.max(rel * a.abs()).max(rel * b.abs())
}

pub trait CheckClose<Rhs: ?Sized = Self> {
    /// Test that all values of self and other are close.
    fn check_close(&self, other: &Rhs, tol: Tolerances) -> Result<(), CheckCloseError>;
}

/// Scalars that can be compared at a given index of a larger structure.
pub trait CloseScalar: Copy + fmt::Debug {
    fn is_close(self, other: Self, tol: Tolerances) -> bool;
}

impl CloseScalar for f64 {
    #[inline]
    fn is_close(self, other: f64, tol: Tolerances) -> bool { __is_close(self, other, tol) }
}

impl CloseScalar for f32 {
    #[inline]
    fn is_close(self, other: f32, tol: Tolerances) -> bool {
        __is_close(self as f64, other as f64, tol)
    }
}

impl CloseScalar for u32 {
    #[inline]
    fn is_close(self, other: u32, _: Tolerances) -> bool { self == other }
}

impl CloseScalar for u64 {
    #[inline]
    fn is_close(self, other: u64, _: Tolerances) -> bool { self == other }
}

fn check_slices<T: CloseScalar>(a: &[T], b: &[T], tol: Tolerances) -> Result<(), CheckCloseError> {
    if a.len() != b.len() {
        return Err(CheckCloseError::Length(a.len(), b.len()));
    }
    match a.iter().zip(b).position(|(&x, &y)| !x.is_close(y, tol)) {
        None => Ok(()),
        Some(index) => Err(CheckCloseError::Value {
            index,
            left: format!("{:?}", a[index]),
            right: format!("{:?}", b[index]),
        }),
    }
}

macro_rules! impl_check_close {
    ($($T:ty),*) => {$(
        impl CheckClose for $T {
            fn check_close(&self, other: &$T, tol: Tolerances) -> Result<(), CheckCloseError>
            { check_slices(&[*self], &[*other], tol) }
        }

        impl CheckClose for [$T] {
            fn check_close(&self, other: &[$T], tol: Tolerances) -> Result<(), CheckCloseError>
            { check_slices(self, other, tol) }
        }

        impl CheckClose for Vec<$T> {
            fn check_close(&self, other: &Vec<$T>, tol: Tolerances) -> Result<(), CheckCloseError>
            { check_slices(&self[..], &other[..], tol) }
        }

        impl CheckClose<[$T]> for Vec<$T> {
            fn check_close(&self, other: &[$T], tol: Tolerances) -> Result<(), CheckCloseError>
            { check_slices(&self[..], other, tol) }
        }
    )*};
}

impl_check_close!(f32, f64, u32, u64);

impl<'a, T: ?Sized + CheckClose> CheckClose for &'a T {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    { CheckClose::check_close(*self, *other, tol) }
}
