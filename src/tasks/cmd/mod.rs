/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

pub(crate) mod check;
pub(crate) mod bench;

use crate::FailResult;

use ::densemat_matrix::Scalar;
use ::num_traits::{FromPrimitive, ToPrimitive};
use ::std::fmt;

/// What the drivers need on top of [`Scalar`]: conversions for building
/// test data, and a name for output.
pub(crate) trait DriverScalar: Scalar + FromPrimitive + ToPrimitive + fmt::Display {
    const NAME: &'static str;
}

impl DriverScalar for f32 { const NAME: &'static str = "f32"; }
impl DriverScalar for f64 { const NAME: &'static str = "f64"; }
impl DriverScalar for u32 { const NAME: &'static str = "u32"; }
impl DriverScalar for u64 { const NAME: &'static str = "u64"; }

pub(crate) fn cast<T: DriverScalar>(x: usize) -> FailResult<T> {
    T::from_usize(x).ok_or_else(|| format_err!("{} does not fit in {}", x, T::NAME))
}
