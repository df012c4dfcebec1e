/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! End-to-end self-check of the matrix library.
//!
//! Every check runs for every scalar type, and the product checks run
//! under both the portable backend and the configured one.  A failing
//! check is logged and counted; the run only fails at the end.

use super::{cast, DriverScalar};
use crate::{FailResult, Settings};

use ::densemat_matrix::{Backend, Gemm, Matrix, MatrixError};
use ::rand::Rng;

type CheckFn = fn(&Settings) -> FailResult<()>;

pub(crate) fn run(settings: &Settings) -> FailResult<()> {
    let mut failures = 0;
    failures += run_for::<f32>(settings);
    failures += run_for::<f64>(settings);
    failures += run_for::<u32>(settings);
    failures += run_for::<u64>(settings);

    if failures > 0 {
        bail!("{} check(s) failed", failures);
    }
    info!("All checks passed.");
    Ok(())
}

fn run_for<T: DriverScalar>(settings: &Settings) -> usize {
    let checks: &[(&str, CheckFn)] = &[
        ("ramp products", ramp_products::<T> as CheckFn),
        ("backends agree", backends_agree::<T> as CheckFn),
        ("accumulate", accumulate::<T> as CheckFn),
        ("dot_vector", dot_vector::<T> as CheckFn),
        ("elementwise", elementwise::<T> as CheckFn),
        ("resize", resize::<T> as CheckFn),
        ("shape mismatch", shape_mismatch::<T> as CheckFn),
    ];

    let mut failures = 0;
    for &(label, check) in checks {
        match check(settings) {
            Ok(()) => info!("[{}] {}: ok", T::NAME, label),
            Err(e) => {
                error!("[{}] {}: {}", T::NAME, label, e);
                failures += 1;
            },
        }
    }
    failures
}

/// The backends a product check should run under.
fn backends(settings: &Settings) -> Vec<Backend> {
    let mut out = vec![Backend::Portable];
    if settings.backend != Backend::Portable {
        out.push(settings.backend);
    }
    out
}

// Exact for integers and for the small integer-valued floats used here.
fn same<T: DriverScalar>(a: T, b: T) -> bool {
    if a == b {
        return true;
    }
    match (a.to_f64(), b.to_f64()) {
        (Some(a), Some(b)) => (a - b).abs() <= 1e-6 * f64::max(a.abs(), b.abs()),
        _ => false,
    }
}

fn expect_matrix<T: DriverScalar>(
    what: &str,
    actual: &Matrix<T>,
    expected: impl Fn(usize, usize) -> T,
) -> FailResult<()> {
    for (i, row) in actual.rows().enumerate() {
        for (j, &x) in row.iter().enumerate() {
            let want = expected(i, j);
            if !same(x, want) {
                bail!("{}: element ({}, {}) is {}, expected {}", what, i, j, x, want);
            }
        }
    }
    Ok(())
}

fn random_matrix<T: DriverScalar>(rng: &mut impl Rng, m: usize, n: usize) -> FailResult<Matrix<T>> {
    let data = (0..m * n).map(|_| cast(rng.gen_range(0, 10))).collect::<FailResult<Vec<T>>>()?;
    Ok(Matrix::new_values(m, n, &data)?)
}

fn naive_product<T: DriverScalar>(a: &Matrix<T>, b: &Matrix<T>) -> FailResult<Matrix<T>> {
    let (m, k) = a.dims();
    let n = b.num_cols();
    let mut out = Matrix::new(m, n)?;
    for i in 0..m {
        for j in 0..n {
            let x = (0..k).fold(T::zero(), |acc, p| acc.plus(a.get(i, p).times(b.get(p, j))));
            out.set_at_index(i, j, x);
        }
    }
    Ok(out)
}

/// `M[i][j] = i + 1` and `N[i][j] = j + 1`.
///
/// `M N` is `(i + 1)(j + 1) n` and `N M` is the sum of squares up to `n`
/// everywhere, so the product must not commute.
fn ramp_products<T: DriverScalar>(settings: &Settings) -> FailResult<()> {
    let n = settings.check.size;
    let n_t: T = cast(n)?;
    let ramp = (1..=n).map(cast::<T>).collect::<FailResult<Vec<T>>>()?;

    let mut m = Matrix::<T>::new(n, n)?;
    let mut nn = Matrix::<T>::new(n, n)?;
    for i in 0..n {
        for j in 0..n {
            m.set_at_index(i, j, ramp[i]);
            nn.set_at_index(i, j, ramp[j]);
        }
    }
    expect_matrix("M", &m, |i, _| ramp[i])?;

    let sum_of_squares = ramp.iter().fold(T::zero(), |acc, &k| acc.plus(k.times(k)));

    for backend in backends(settings) {
        let what = format!("{} backend", Gemm::<T>::name(&backend));

        // start from garbage; the product overwrites
        let mut p = Matrix::new_value(n, n, T::one())?;
        m.dot_matrix_with(&backend, &nn, &mut p)?;
        expect_matrix(&what, &p, |i, j| ramp[i].times(ramp[j]).times(n_t))?;

        p.zero();
        expect_matrix("zeroed product", &p, |_, _| T::zero())?;

        nn.dot_matrix_with(&backend, &m, &mut p)?;
        expect_matrix(&what, &p, |_, _| sum_of_squares)?;
    }
    Ok(())
}

fn backends_agree<T: DriverScalar>(settings: &Settings) -> FailResult<()> {
    let mut rng = ::rand::thread_rng();
    let max = 2 * settings.check.size;
    for _ in 0..settings.check.random_trials {
        let (m, k, n) = (rng.gen_range(1, max + 1), rng.gen_range(1, max + 1), rng.gen_range(1, max + 1));
        let a = random_matrix::<T>(&mut rng, m, k)?;
        let b = random_matrix::<T>(&mut rng, k, n)?;
        let expected = naive_product(&a, &b)?;

        for backend in backends(settings) {
            let mut c = random_matrix::<T>(&mut rng, m, n)?;
            a.dot_matrix_with(&backend, &b, &mut c)?;
            let what = format!("{}x{} times {}x{} ({})", m, k, k, n, Gemm::<T>::name(&backend));
            expect_matrix(&what, &c, |i, j| expected.get(i, j))?;
        }
    }
    Ok(())
}

fn accumulate<T: DriverScalar>(settings: &Settings) -> FailResult<()> {
    let mut rng = ::rand::thread_rng();
    let n = settings.check.size;
    let a = random_matrix::<T>(&mut rng, n, n + 1)?;
    let b = random_matrix::<T>(&mut rng, n + 1, n)?;
    let c0 = random_matrix::<T>(&mut rng, n, n)?;
    let ab = naive_product(&a, &b)?;

    let mut c = c0.new_copy()?;
    a.dot_matrix_accumulate(&b, &mut c)?;
    expect_matrix("accumulated product", &c, |i, j| c0.get(i, j).plus(ab.get(i, j)))?;

    for backend in backends(settings) {
        let mut c = c0.new_copy()?;
        let two = T::one().plus(T::one());
        ::densemat_matrix::gemm_with(&backend, two, &a, &b, T::one(), &mut c)?;
        let what = format!("general gemm ({})", Gemm::<T>::name(&backend));
        expect_matrix(&what, &c, |i, j| c0.get(i, j).plus(two.times(ab.get(i, j))))?;
    }
    Ok(())
}

fn dot_vector<T: DriverScalar>(settings: &Settings) -> FailResult<()> {
    let mut rng = ::rand::thread_rng();
    let n = settings.check.size;
    let a = random_matrix::<T>(&mut rng, n + 2, n)?;
    let v = random_matrix::<T>(&mut rng, n, 1)?;
    let expected = naive_product(&a, &v)?;

    let mut result = vec![T::zero(); n + 2];
    a.dot_vector(v.row_major_data(), &mut result);
    a.dot_vector(v.row_major_data(), &mut result);
    for (i, &x) in result.iter().enumerate() {
        let want = expected.get(i, 0).plus(expected.get(i, 0));
        if !same(x, want) {
            bail!("two passes: element {} is {}, expected {}", i, x, want);
        }
    }
    Ok(())
}

fn elementwise<T: DriverScalar>(settings: &Settings) -> FailResult<()> {
    let mut rng = ::rand::thread_rng();
    let n = settings.check.size;
    let a = random_matrix::<T>(&mut rng, n, n + 1)?;
    let mut b = random_matrix::<T>(&mut rng, n, n + 1)?;
    // nonzero divisors
    b.add(T::one());
    let two = T::one().plus(T::one());

    let mut c = a.new_copy()?;
    c.add_matrix(&b)?;
    expect_matrix("add_matrix", &c, |i, j| a.get(i, j).plus(b.get(i, j)))?;

    let mut c = a.new_copy()?;
    c.div_matrix(&b)?;
    expect_matrix("div_matrix", &c, |i, j| a.get(i, j).over(b.get(i, j)))?;

    let mut c = a.new_copy()?;
    c.add_matrix_scaled(&b, two)?;
    expect_matrix("add_matrix_scaled", &c, |i, j| a.get(i, j).plus(b.get(i, j).times(two)))?;

    let mut c = a.new_copy()?;
    c.mul(two);
    c.sub_matrix(&a)?;
    expect_matrix("mul then sub_matrix", &c, |i, j| a.get(i, j))?;
    Ok(())
}

fn resize<T: DriverScalar>(settings: &Settings) -> FailResult<()> {
    let mut rng = ::rand::thread_rng();
    let n = settings.check.size;
    let orig = random_matrix::<T>(&mut rng, n, n)?;

    let mut mat = orig.new_copy()?;
    mat.resize(2 * n, n)?;
    if mat.dims() != (2 * n, n) {
        bail!("resize gave shape {:?}", mat.dims());
    }
    expect_matrix("rows kept by resize", &orig, |i, j| mat.get(i, j))?;

    // leave stale data in the spare capacity, then regrow over it
    let mut mat = random_matrix::<T>(&mut rng, 2 * n, n)?;
    mat.init_values(&vec![T::one(); 2 * n * n]);
    mat.resize(n, n)?;
    mat.resize_fill_zeros(2 * n, n)?;
    expect_matrix("resize_fill_zeros", &mat, |i, _| match i < n {
        true => T::one(),
        false => T::zero(),
    })?;

    mat.resize(1, 1)?;
    if mat.capacity() < 2 * n * n {
        bail!("shrinking resize released storage");
    }
    Ok(())
}

fn shape_mismatch<T: DriverScalar>(settings: &Settings) -> FailResult<()> {
    let mut rng = ::rand::thread_rng();
    let n = settings.check.size;
    let orig = random_matrix::<T>(&mut rng, n, n + 1)?;
    let other = random_matrix::<T>(&mut rng, n + 1, n)?;
    let two = T::one().plus(T::one());

    let mut a = orig.new_copy()?;
    let results: Vec<(&str, Result<(), MatrixError>)> = vec![
        ("add_matrix", a.add_matrix(&other)),
        ("sub_matrix", a.sub_matrix(&other)),
        ("mul_matrix", a.mul_matrix(&other)),
        ("div_matrix", a.div_matrix(&other)),
        ("add_matrix_scaled", a.add_matrix_scaled(&other, two)),
        ("sub_matrix_scaled", a.sub_matrix_scaled(&other, two)),
        ("mul_matrix_scaled", a.mul_matrix_scaled(&other, two)),
        ("div_matrix_scaled", a.div_matrix_scaled(&other, two)),
        ("copy", other.copy(&mut a)),
    ];
    for (op, result) in results {
        if result.is_ok() {
            bail!("{} accepted mismatched shapes", op);
        }
    }
    if a != orig {
        bail!("a failed operation modified its operand");
    }

    // n x (n + 1) times n x (n + 1)
    let mut c = Matrix::new_value(n, n + 1, two)?;
    if orig.dot_matrix(&orig, &mut c).is_ok() {
        bail!("dot_matrix accepted mismatched inner dimensions");
    }
    expect_matrix("result of failed product", &c, |_, _| two)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Check;

    fn small_settings(backend: Backend) -> Settings {
        Settings {
            backend,
            check: Check { size: 4, random_trials: 3 },
            ..Settings::default()
        }
    }

    #[test]
    fn everything_passes() {
        for &backend in Backend::ALL {
            assert_eq!(run_for::<f32>(&small_settings(backend)), 0);
            assert_eq!(run_for::<f64>(&small_settings(backend)), 0);
            assert_eq!(run_for::<u32>(&small_settings(backend)), 0);
            assert_eq!(run_for::<u64>(&small_settings(backend)), 0);
        }
    }

    #[test]
    fn default_size_passes() {
        run(&Settings::default()).unwrap();
    }

    #[test]
    fn expect_matrix_reports_position() {
        let mat = Matrix::new_values(2, 2, &[1u32, 2, 3, 5]).unwrap();
        let err = expect_matrix("m", &mat, |i, j| (2 * i + j + 1) as u32).unwrap_err();
        assert_eq!(err.to_string(), "m: element (1, 1) is 5, expected 4");
    }
}
