/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

// End-to-end use of the public API, the way a downstream crate sees it.

use ::densemat::{Backend, Gemm, Matrix, MatrixError, Portable, Scalar};
use ::densemat_assert_close::assert_close;
use ::rand::Rng;

#[test]
fn ten_by_ten_f64() {
    let n = 10;
    let mut m = Matrix::<f64>::new(n, n).unwrap();
    let mut nn = Matrix::<f64>::new(n, n).unwrap();
    for i in 0..n {
        for j in 0..n {
            m.set_at_index(i, j, i as f64 + 1.0);
            nn.set_at_index(i, j, j as f64 + 1.0);
        }
    }
    for i in 0..n {
        for j in 0..n {
            assert_eq!(m.get(i, j), i as f64 + 1.0);
        }
    }

    let mut p = Matrix::new(n, n).unwrap();
    m.dot_matrix(&nn, &mut p).unwrap();
    for i in 0..n {
        for j in 0..n {
            assert_eq!(p.get(i, j), ((i + 1) * (j + 1) * n) as f64);
        }
    }

    p.zero();
    for i in 0..n {
        for j in 0..n {
            assert_eq!(p.get(i, j), 0.0);
        }
    }

    nn.dot_matrix(&m, &mut p).unwrap();
    let expected: f64 = (1..=n).map(|k| (k * k) as f64).sum();
    for i in 0..n {
        for j in 0..n {
            assert_eq!(p.get(i, j), expected);
        }
    }
}

fn build_and_multiply<T: Scalar>(values: &[T]) -> Matrix<T> {
    let a = Matrix::new_values(2, 3, values).unwrap();
    let mut b = Matrix::new_ones(3, 1).unwrap();
    b.resize_fill_zeros(4, 1).unwrap();
    b.resize(3, 1).unwrap();
    let mut c = Matrix::new_value(2, 1, T::one()).unwrap();
    a.dot_matrix(&b, &mut c).unwrap();
    c
}

#[test]
fn generic_callers() {
    assert_eq!(build_and_multiply(&[1u32, 2, 3, 4, 5, 6]).row_major_data(), &[6, 15]);
    assert_eq!(build_and_multiply(&[1u64, 2, 3, 4, 5, 6]).row_major_data(), &[6, 15]);
    assert_close!(build_and_multiply(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).row_major_data(), &[6.0f32, 15.0][..]);
    assert_close!(build_and_multiply(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]).row_major_data(), &[6.0, 15.0][..]);
}

#[test]
fn grow_rows_then_fill() {
    let mut mat = Matrix::new_values(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    mat.resize_fill_zeros(4, 2).unwrap();
    assert_eq!(mat.row_major_data(), &[1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]);

    mat.set_row(3, &[7.0, 8.0]);
    mat.add_matrix_scaled(&Matrix::new_ones(4, 2).unwrap(), 0.5).unwrap();
    mat.log();
    mat.exp();
    assert_close!(mat.get_row(3), &[7.5, 8.5][..]);
    assert_close!(mat.get_row(2), &[0.5, 0.5][..]);
}

#[test]
fn errors_are_values() {
    let a = Matrix::<u32>::new(2, 3).unwrap();
    let mut b = Matrix::<u32>::new(3, 3).unwrap();

    let err = a.copy(&mut b).unwrap_err();
    assert_eq!(err, MatrixError::ShapeMismatch { op: "copy", left: (2, 3), right: (3, 3) });
    assert_eq!(err.to_string(), "copy: shape (2, 3) does not match shape (3, 3)");

    let err = Matrix::<u64>::new(usize::max_value(), usize::max_value()).unwrap_err();
    assert!(err.to_string().contains("more elements than fit"));

    // converts into the error types used by application code
    let _: failure::Error = err.into();
}

#[test]
fn injected_strategy() {
    // a strategy that runs the portable one and counts calls
    struct Counting<'a>(&'a ::std::cell::Cell<usize>);
    impl<'a, T: Scalar> Gemm<T> for Counting<'a> {
        fn name(&self) -> &'static str { "counting" }
        fn multiply_into(&self, alpha: T, a: &Matrix<T>, b: &Matrix<T>, beta: T, c: &mut Matrix<T>) {
            self.0.set(self.0.get() + 1);
            Portable.multiply_into(alpha, a, b, beta, c)
        }
    }

    let calls = ::std::cell::Cell::new(0);
    let a = Matrix::new_values(2, 2, &[1u64, 2, 3, 4]).unwrap();
    let mut c = Matrix::new(2, 2).unwrap();
    a.dot_matrix_with(&Counting(&calls), &a, &mut c).unwrap();
    assert_eq!(c.row_major_data(), &[7, 10, 15, 22]);

    // bad shapes never reach the strategy
    let mut wrong = Matrix::new(3, 2).unwrap();
    assert!(a.dot_matrix_with(&Counting(&calls), &a, &mut wrong).is_err());
    assert_eq!(calls.get(), 1);
}

#[test]
fn every_backend_matches_on_random_input() {
    let mut rng = ::rand::thread_rng();
    for _ in 0..10 {
        let (m, k, n) = (rng.gen_range(1, 40), rng.gen_range(1, 40), rng.gen_range(1, 40));
        let a_data: Vec<f32> = (0..m * k).map(|_| rng.gen_range(-1.0, 1.0)).collect();
        let b_data: Vec<f32> = (0..k * n).map(|_| rng.gen_range(-1.0, 1.0)).collect();
        let a = Matrix::new_values(m, k, &a_data).unwrap();
        let b = Matrix::new_values(k, n, &b_data).unwrap();

        let reference = &a * &b;
        for &backend in Backend::ALL {
            let mut c = Matrix::new(m, n).unwrap();
            a.dot_matrix_with(&backend, &b, &mut c).unwrap();
            assert_close!(rel=1e-4, abs=1e-5, c.row_major_data(), reference.row_major_data());
        }
    }
}
