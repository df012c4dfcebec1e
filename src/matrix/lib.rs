/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Dense row-major matrices over `f32`, `f64`, `u32` and `u64`.
//!
//! One generic [`Matrix`] type carries every algorithm; what differs per
//! scalar (the flat kernels, and whether BLAS can do the products) lives
//! behind the sealed [`Scalar`] trait.
//!
//! ```
//! use densemat_matrix::Matrix;
//!
//! # fn main() -> Result<(), densemat_matrix::MatrixError> {
//! let a = Matrix::new_values(2, 2, &[1.0, 2.0, 3.0, 4.0])?;
//! let b = Matrix::new_ones(2, 2)?;
//! let mut c = Matrix::new(2, 2)?;
//! a.dot_matrix(&b, &mut c)?;
//! assert_eq!(c.row_major_data(), &[3.0, 3.0, 7.0, 7.0]);
//! # Ok(())
//! # }
//! ```

#![deny(unused_must_use)]

#[macro_use]
extern crate log;

pub use crate::error::MatrixError;
mod error;

pub use crate::scalar::{FloatScalar, Scalar};
mod scalar;

pub use crate::matrix::Matrix;
mod matrix;

mod elementwise;

pub use crate::gemm::{gemm, gemm_with, Backend, Blas, Gemm, Portable};
mod gemm;

mod par;

pub use ::densemat_aligned::{AllocError, DEFAULT_ALIGNMENT};
pub use ::densemat_blas::Precision;
