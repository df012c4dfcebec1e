/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use ::densemat_aligned::AllocError;
use ::thiserror::Error;

/// Everything a matrix operation can report instead of doing its job.
///
/// Every fallible operation checks for these before it mutates anything,
/// so an `Err` always means the operands are exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("could not allocate matrix storage: {0}")]
    Alloc(#[from] AllocError),

    #[error("a {rows}x{cols} matrix has more elements than fit in a usize")]
    SizeOverflow { rows: usize, cols: usize },

    #[error("{op}: shape {left:?} does not match shape {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("cannot multiply {lhs:?} by {rhs:?} into {out:?}")]
    ProductShape {
        lhs: (usize, usize),
        rhs: (usize, usize),
        out: (usize, usize),
    },

    #[error("index {index:?} is out of bounds for shape {dims:?}")]
    OutOfBounds {
        index: (usize, usize),
        dims: (usize, usize),
    },
}
