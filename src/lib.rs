/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Generic dense row-major matrices.
//!
//! This crate only gathers the workspace members behind one name.
//! The matrix type itself lives in `densemat-matrix`.

pub use ::densemat_matrix::*;

/// The aligned allocator underneath [`Matrix`].
pub mod aligned {
    pub use ::densemat_aligned::*;
}

/// Flat kernels that the elementwise operations forward to.
pub mod slice_math {
    pub use ::densemat_slice_math::*;
}
