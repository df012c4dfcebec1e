/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Elementwise arithmetic, forwarded to the flat kernels of `VectorMath`.

use crate::{FloatScalar, Matrix, MatrixError, Scalar};

use ::densemat_slice_math::{FloatMath, VectorMath};

macro_rules! elementwise_ops {
    ($(
        [$op_name:expr]
        $op:ident, $op_matrix:ident, $op_matrix_scaled:ident,
        $op_vector:ident, $op_vector_scaled:ident;
    )+) => {
        impl<T: Scalar> Matrix<T> {$(
            /// Apply the operator with `value` to every element.
            pub fn $op(&mut self, value: T) {
                <T as VectorMath>::$op(self.row_major_data_mut(), value);
            }

            /// Apply the operator elementwise with `other` on the right.
            ///
            /// Fails without modifying anything if the shapes differ.
            pub fn $op_matrix(&mut self, other: &Matrix<T>) -> Result<(), MatrixError> {
                self.check_same_dims($op_name, other)?;
                <T as VectorMath>::$op_vector(self.row_major_data_mut(), other.row_major_data());
                Ok(())
            }

            /// Like the unscaled form, with every element of `other` first
            /// multiplied by `scale`.  This is a single pass.
            pub fn $op_matrix_scaled(&mut self, other: &Matrix<T>, scale: T) -> Result<(), MatrixError> {
                self.check_same_dims($op_name, other)?;
                <T as VectorMath>::$op_vector_scaled(self.row_major_data_mut(), other.row_major_data(), scale);
                Ok(())
            }
        )+}
    };
}

elementwise_ops! {
    ["add_matrix"] add, add_matrix, add_matrix_scaled, add_vector, add_vector_scaled;
    ["sub_matrix"] sub, sub_matrix, sub_matrix_scaled, sub_vector, sub_vector_scaled;
    ["mul_matrix"] mul, mul_matrix, mul_matrix_scaled, mul_vector, mul_vector_scaled;
    ["div_matrix"] div, div_matrix, div_matrix_scaled, div_vector, div_vector_scaled;
}

impl<T: FloatScalar> Matrix<T> {
    /// Natural log of every element.  Nonpositive values give NaN or `-inf`.
    pub fn log(&mut self) {
        <T as FloatMath>::log(self.row_major_data_mut());
    }

    pub fn exp(&mut self) {
        <T as FloatMath>::exp(self.row_major_data_mut());
    }
}

#[cfg(test)]
mod tests {
    use crate::{Matrix, MatrixError};
    use ::densemat_assert_close::assert_close;

    #[test]
    fn scalar_forms() {
        let mut mat = Matrix::new_values(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        mat.add(1.0);
        assert_close!(mat.row_major_data(), &[2.0, 3.0, 4.0, 5.0][..]);
        mat.mul(2.0);
        assert_close!(mat.row_major_data(), &[4.0, 6.0, 8.0, 10.0][..]);
        mat.sub(4.0);
        assert_close!(mat.row_major_data(), &[0.0, 2.0, 4.0, 6.0][..]);
        mat.div(2.0);
        assert_close!(mat.row_major_data(), &[0.0, 1.0, 2.0, 3.0][..]);
    }

    #[test]
    fn matrix_forms_keep_operand_order() {
        let a = Matrix::new_values(1, 3, &[8.0f32, 9.0, 10.0]).unwrap();
        let b = Matrix::new_values(1, 3, &[2.0f32, 3.0, 5.0]).unwrap();

        let mut c = a.clone();
        c.sub_matrix(&b).unwrap();
        assert_close!(c.row_major_data(), &[6.0f32, 6.0, 5.0][..]);

        let mut c = a.clone();
        c.div_matrix(&b).unwrap();
        assert_close!(c.row_major_data(), &[4.0f32, 3.0, 2.0][..]);

        let mut c = a.clone();
        c.add_matrix(&b).unwrap();
        c.mul_matrix(&b).unwrap();
        assert_close!(c.row_major_data(), &[20.0f32, 36.0, 75.0][..]);
    }

    #[test]
    fn scaled_forms() {
        let a = Matrix::new_values(2, 1, &[10.0, 20.0]).unwrap();
        let b = Matrix::new_values(2, 1, &[1.0, 2.0]).unwrap();

        let mut c = a.clone();
        c.add_matrix_scaled(&b, 3.0).unwrap();
        assert_close!(c.row_major_data(), &[13.0, 26.0][..]);

        let mut c = a.clone();
        c.sub_matrix_scaled(&b, 3.0).unwrap();
        assert_close!(c.row_major_data(), &[7.0, 14.0][..]);

        let mut c = a.clone();
        c.mul_matrix_scaled(&b, 0.5).unwrap();
        assert_close!(c.row_major_data(), &[5.0, 20.0][..]);

        let mut c = a.clone();
        c.div_matrix_scaled(&b, 2.0).unwrap();
        assert_close!(c.row_major_data(), &[5.0, 5.0][..]);
    }

    #[test]
    fn mismatched_shapes_fail_fast() {
        let orig = Matrix::new_values(2, 3, &[1u32, 2, 3, 4, 5, 6]).unwrap();
        let wrong_rows = Matrix::new_ones(3, 3).unwrap();
        let wrong_cols = Matrix::new_ones(2, 2).unwrap();
        let transposed = Matrix::new_ones(3, 2).unwrap();

        for other in &[wrong_rows, wrong_cols, transposed] {
            let mut a = orig.clone();
            assert!(a.add_matrix(other).is_err());
            assert!(a.sub_matrix(other).is_err());
            assert!(a.mul_matrix(other).is_err());
            assert!(a.div_matrix(other).is_err());
            assert!(a.add_matrix_scaled(other, 2).is_err());
            assert!(a.sub_matrix_scaled(other, 2).is_err());
            assert!(a.mul_matrix_scaled(other, 2).is_err());
            assert!(a.div_matrix_scaled(other, 2).is_err());
            assert_eq!(a, orig);
        }

        let mut a = orig.clone();
        assert_eq!(
            a.div_matrix(&Matrix::new_ones(3, 2).unwrap()),
            Err(MatrixError::ShapeMismatch { op: "div_matrix", left: (2, 3), right: (3, 2) }),
        );
    }

    #[test]
    fn unsigned_wraps() {
        let mut mat = Matrix::new_values(1, 2, &[0u32, u32::max_value()]).unwrap();
        mat.add(1);
        assert_eq!(mat.row_major_data(), &[1, 0]);
        mat.sub(2);
        assert_eq!(mat.row_major_data(), &[u32::max_value(), u32::max_value() - 1]);
    }

    #[test]
    #[should_panic]
    fn unsigned_division_by_zero() {
        let mut mat = Matrix::<u64>::new_ones(2, 2).unwrap();
        mat.div(0);
    }

    #[test]
    fn transcendentals() {
        let mut mat = Matrix::new_values(1, 3, &[1.0, ::std::f64::consts::E, 10.0]).unwrap();
        mat.log();
        assert_close!(mat.row_major_data(), &[0.0, 1.0, 10.0f64.ln()][..]);
        mat.exp();
        assert_close!(mat.row_major_data(), &[1.0, ::std::f64::consts::E, 10.0][..]);

        let mut mat = Matrix::new_values(1, 2, &[0.0f32, -1.0]).unwrap();
        mat.log();
        assert_eq!(mat.get(0, 0), ::std::f32::NEG_INFINITY);
        assert!(mat.get(0, 1).is_nan());
    }
}
